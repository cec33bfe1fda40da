use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::Deserialize;
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{
    delete_user, get_all_users, get_user, set_user_flags, update_user_display_name,
    update_user_password, update_username,
};
use crate::validation::{AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse};

use super::UserData;

#[get("/admin/users")]
pub async fn api_get_all_users(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<Vec<UserData>>, Status> {
    user.require_permission(Permission::EditUserRoles)?;

    let users = get_all_users(db).await?;

    Ok(Json(users.into_iter().map(UserData::from).collect()))
}

#[derive(Deserialize, Validate, Clone)]
pub struct UserUpdateRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    username: Option<String>,
    #[validate(length(min = 1, max = 64, message = "Display name must be 1 to 64 characters"))]
    display_name: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: Option<String>,
    is_admin: Option<bool>,
    is_editor: Option<bool>,
}

#[put("/admin/users/<id>", data = "<update>")]
pub async fn api_update_user(
    id: i64,
    update: Json<UserUpdateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::EditUserCredentials)
        .validate_custom()?;

    let validated = update.validate_custom()?;

    get_user(db, id).await.validate_custom()?;

    if let Some(username) = &validated.username {
        update_username(db, id, username).await.validate_custom()?;
    }

    if let Some(display_name) = &validated.display_name {
        update_user_display_name(db, id, display_name)
            .await
            .validate_custom()?;
    }

    if let Some(password) = &validated.password {
        update_user_password(db, id, password)
            .await
            .validate_custom()?;
    }

    if validated.is_admin.is_some() || validated.is_editor.is_some() {
        user.require_all_permissions(&[Permission::EditUserCredentials, Permission::EditUserRoles])
            .validate_custom()?;

        set_user_flags(db, id, validated.is_admin, validated.is_editor)
            .await
            .validate_custom()?;
    }

    Ok(Status::Ok)
}

#[delete("/admin/users/<id>")]
pub async fn api_delete_user(
    id: i64,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::DeleteUsers)
        .validate_custom()?;

    if id == user.id {
        return Err(Custom(
            Status::BadRequest,
            Json(ValidationResponse::with_error(
                "user",
                "You cannot delete your own account",
            )),
        ));
    }

    get_user(db, id).await.validate_custom()?;
    delete_user(db, id).await.validate_custom()?;

    Ok(Status::Ok)
}
