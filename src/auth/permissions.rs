use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    ViewOwnProfile,
    EditOwnProfile,
    SubmitCards,
    ViewOwnCards,
    CreateCourses,
    UploadAttachments,

    PublishNews,
    ManageQuotes,

    ViewAllPlayers,
    EditUserCredentials,
    EditUserRoles,
    DeleteUsers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Role {
    Player,
    Editor,
    Admin,
}

static PLAYER_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.insert(Permission::ViewOwnProfile);
    permissions.insert(Permission::EditOwnProfile);
    permissions.insert(Permission::SubmitCards);
    permissions.insert(Permission::ViewOwnCards);
    permissions.insert(Permission::CreateCourses);
    permissions.insert(Permission::UploadAttachments);

    permissions
});

static EDITOR_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(PLAYER_PERMISSIONS.iter().copied());

    permissions.insert(Permission::PublishNews);
    permissions.insert(Permission::ManageQuotes);

    permissions
});

static ADMIN_PERMISSIONS: Lazy<HashSet<Permission>> = Lazy::new(|| {
    let mut permissions = HashSet::new();

    permissions.extend(EDITOR_PERMISSIONS.iter().copied());

    permissions.insert(Permission::ViewAllPlayers);
    permissions.insert(Permission::EditUserCredentials);
    permissions.insert(Permission::EditUserRoles);
    permissions.insert(Permission::DeleteUsers);

    permissions
});

impl Role {
    pub fn permissions(&self) -> &'static HashSet<Permission> {
        match self {
            Role::Player => &PLAYER_PERMISSIONS,
            Role::Editor => &EDITOR_PERMISSIONS,
            Role::Admin => &ADMIN_PERMISSIONS,
        }
    }

    pub fn has_permission(&self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }

    /// The users table carries two flags rather than a role column; admin
    /// wins when both are set.
    pub fn from_flags(is_admin: bool, is_editor: bool) -> Self {
        if is_admin {
            Role::Admin
        } else if is_editor {
            Role::Editor
        } else {
            Role::Player
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Role::Player => "player",
            Role::Editor => "editor",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
