use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::db::{
    authenticate_user, create_user, delete_user, get_recent_differentials, update_user_details,
    update_user_display_name, update_user_email, update_user_password,
};
use crate::handicap;
use crate::validation::{
    AppErrorExt, JsonValidateExt, PermissionCheckExt, ToValidationResponse, ValidationResponse,
};

use super::UserData;

#[derive(Deserialize, Validate, Clone)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 32, message = "Username must be 3 to 32 characters"))]
    username: String,
    #[validate(email(message = "Email address is not valid"))]
    email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    password: String,
    display_name: Option<String>,
}

#[post("/auth/register", data = "<registration>")]
pub async fn api_register(
    registration: Json<RegisterRequest>,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    let validated = registration.validate_custom()?;

    create_user(
        db,
        &validated.username,
        &validated.email,
        &validated.password,
        validated.display_name.as_deref(),
    )
    .await
    .validate_custom()?;

    Ok(Status::Created)
}

#[derive(Deserialize, Validate)]
pub struct LoginRequest {
    username: String,
    password: String,
}

#[derive(Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserData,
}

#[post("/auth/login", data = "<login>")]
pub async fn api_login(
    login: Json<LoginRequest>,
    db: &State<Pool<Sqlite>>,
    config: &State<AppConfig>,
) -> Result<Json<LoginResponse>, Custom<Json<ValidationResponse>>> {
    let validated = login.validate_custom()?;

    match authenticate_user(db, &validated.username, &validated.password)
        .await
        .validate_custom()?
    {
        Some(user) => {
            let token = config.jwt.issue(user.id).validate_custom()?;

            Ok(Json(LoginResponse {
                token,
                user: UserData::from(user),
            }))
        }
        // Same response whether the username or the password was wrong.
        None => Err(Custom(
            Status::Unauthorized,
            Json(ValidationResponse::with_error(
                "credentials",
                "Invalid username or password",
            )),
        )),
    }
}

#[derive(Serialize, Deserialize)]
pub struct ProfileResponse {
    pub user: UserData,
    pub handicap_index: Option<f64>,
    pub rounds_recorded: usize,
}

#[get("/auth/profile")]
pub async fn api_get_profile(
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Json<ProfileResponse>, Status> {
    user.require_permission(Permission::ViewOwnProfile)?;

    let differentials =
        get_recent_differentials(db, user.id, handicap::WINDOW as i64).await?;

    Ok(Json(ProfileResponse {
        handicap_index: handicap::handicap_index(&differentials),
        rounds_recorded: differentials.len(),
        user: UserData::from(user),
    }))
}

#[derive(Deserialize, Validate, Clone)]
pub struct ProfileUpdateRequest {
    #[validate(length(min = 1, max = 64, message = "Display name must be 1 to 64 characters"))]
    display_name: Option<String>,
    #[validate(email(message = "Email address is not valid"))]
    email: Option<String>,
    gender: Option<String>,
    birthday: Option<chrono::NaiveDate>,
    current_password: Option<String>,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    new_password: Option<String>,
}

#[put("/auth/profile", data = "<profile>")]
pub async fn api_update_profile(
    profile: Json<ProfileUpdateRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Status, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::EditOwnProfile)
        .validate_custom()?;

    let validated = profile.validate_custom()?;

    if let Some(display_name) = &validated.display_name {
        update_user_display_name(db, user.id, display_name)
            .await
            .validate_custom()?;
    }

    if let Some(email) = &validated.email {
        update_user_email(db, user.id, email).await.validate_custom()?;
    }

    if validated.gender.is_some() || validated.birthday.is_some() {
        if let Some(gender) = &validated.gender {
            if !["male", "female", "other"].contains(&gender.as_str()) {
                return Err(AppError::Validation(
                    "Gender must be one of male, female or other".to_string(),
                )
                .to_validation_response());
            }
        }

        update_user_details(db, user.id, validated.gender.as_deref(), validated.birthday)
            .await
            .validate_custom()?;
    }

    if let Some(new_password) = &validated.new_password {
        let Some(current_password) = &validated.current_password else {
            return Err(Custom(
                Status::BadRequest,
                Json(ValidationResponse::with_error(
                    "current_password",
                    "Current password is required to set a new one",
                )),
            ));
        };

        let is_valid = authenticate_user(db, &user.username, current_password)
            .await
            .validate_custom()?;

        if is_valid.is_none() {
            return Err(Custom(
                Status::Unauthorized,
                Json(ValidationResponse::with_error(
                    "current_password",
                    "Current password is incorrect",
                )),
            ));
        }

        update_user_password(db, user.id, new_password)
            .await
            .validate_custom()?;
    }

    Ok(Status::Ok)
}

#[delete("/auth/profile")]
pub async fn api_delete_profile(user: User, db: &State<Pool<Sqlite>>) -> Result<Status, Status> {
    delete_user(db, user.id).await?;

    Ok(Status::Ok)
}
