use rocket::Request;
use rocket::http::Status;
use rocket::request::{FromRequest, Outcome};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde_json::{Value, json};
use sqlx::SqlitePool;

use crate::config::AppConfig;
use crate::db::get_user;

use super::User;

#[rocket::async_trait]
impl<'r> FromRequest<'r> for User {
    type Error = ();

    async fn from_request(request: &'r Request<'_>) -> Outcome<Self, Self::Error> {
        let auth_span = tracing::info_span!("bearer_auth_guard");
        let _guard = auth_span.enter();

        let token = request
            .headers()
            .get_one("Authorization")
            .and_then(|header| header.strip_prefix("Bearer "));

        let Some(token) = token else {
            return Outcome::Error((Status::Unauthorized, ()));
        };

        let config = match request.rocket().state::<AppConfig>() {
            Some(config) => config,
            _ => {
                tracing::error!("App config not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        let claims = match config.jwt.verify(token) {
            Ok(claims) => claims,
            Err(err) => {
                tracing::warn!(error = ?err, "Rejected bearer token");
                return Outcome::Error((Status::Unauthorized, ()));
            }
        };

        let user_id = match claims.user_id() {
            Ok(id) => id,
            Err(_) => return Outcome::Error((Status::Unauthorized, ())),
        };

        let db = match request.rocket().state::<SqlitePool>() {
            Some(pool) => pool,
            _ => {
                tracing::error!("Database pool not found in managed state");
                return Outcome::Error((Status::InternalServerError, ()));
            }
        };

        // Token subjects can outlive their account (e.g. deleted users).
        match get_user(db, user_id).await {
            Ok(user) => {
                tracing::info!(username = %user.username, role = %user.role.as_str(), "User authenticated via bearer token");
                Outcome::Success(user)
            }
            Err(err) => {
                tracing::warn!(user_id = %user_id, error = ?err, "No user for valid token");
                Outcome::Error((Status::Unauthorized, ()))
            }
        }
    }
}

#[catch(401)]
pub fn unauthorized_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unauthorized",
        "message": "Authentication required"
    });

    Custom(Status::Unauthorized, Json(error_json))
}

#[catch(403)]
pub fn forbidden_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Forbidden",
        "message": "You don't have permission to perform this action"
    });

    Custom(Status::Forbidden, Json(error_json))
}

#[catch(404)]
pub fn not_found_api(req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Not Found",
        "message": format!("No route or resource at {}", req.uri())
    });

    Custom(Status::NotFound, Json(error_json))
}

#[catch(422)]
pub fn unprocessable_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Unprocessable Entity",
        "message": "Request body could not be parsed"
    });

    Custom(Status::UnprocessableEntity, Json(error_json))
}

#[catch(500)]
pub fn internal_error_api(_req: &Request) -> Custom<Json<Value>> {
    let error_json = json!({
        "error": "Internal Server Error",
        "message": "Something went wrong"
    });

    Custom(Status::InternalServerError, Json(error_json))
}
