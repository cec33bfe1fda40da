use rocket::State;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};
use validator::Validate;

use crate::auth::{Permission, User};
use crate::db::{create_news, create_quote, latest_news, random_quote};
use crate::models::{NewsArticle, Quote};
use crate::validation::{AppErrorExt, JsonValidateExt, PermissionCheckExt, ValidationResponse};

pub const NEWS_FEED_LIMIT: i64 = 20;

#[get("/random-quote")]
pub async fn api_random_quote(db: &State<Pool<Sqlite>>) -> Result<Json<Quote>, Status> {
    match random_quote(db).await? {
        Some(quote) => Ok(Json(quote)),
        None => Err(Status::NotFound),
    }
}

#[derive(Deserialize, Validate, Clone)]
pub struct CreateQuoteRequest {
    #[validate(length(min = 1, max = 512, message = "Quote text must be 1 to 512 characters"))]
    text: String,
    #[validate(length(min = 1, max = 128, message = "Author must be 1 to 128 characters"))]
    author: Option<String>,
}

#[derive(Serialize, Deserialize)]
pub struct CreatedResponse {
    pub id: i64,
}

#[post("/quotes", data = "<request>")]
pub async fn api_create_quote(
    request: Json<CreateQuoteRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CreatedResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::ManageQuotes)
        .validate_custom()?;

    let validated = request.validate_custom()?;

    let id = create_quote(db, &validated.text, validated.author.as_deref())
        .await
        .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}

#[get("/golf-news")]
pub async fn api_golf_news(db: &State<Pool<Sqlite>>) -> Result<Json<Vec<NewsArticle>>, Status> {
    let articles = latest_news(db, NEWS_FEED_LIMIT).await?;

    Ok(Json(articles))
}

#[derive(Deserialize, Validate, Clone)]
pub struct CreateNewsRequest {
    #[validate(length(min = 1, max = 256, message = "Title must be 1 to 256 characters"))]
    title: String,
    #[validate(length(min = 1, message = "Body must not be empty"))]
    body: String,
    #[validate(url(message = "Source URL must be a valid URL"))]
    source_url: Option<String>,
}

#[post("/news", data = "<request>")]
pub async fn api_create_news(
    request: Json<CreateNewsRequest>,
    user: User,
    db: &State<Pool<Sqlite>>,
) -> Result<Custom<Json<CreatedResponse>>, Custom<Json<ValidationResponse>>> {
    user.require_permission(Permission::PublishNews)
        .validate_custom()?;

    let validated = request.validate_custom()?;

    let id = create_news(
        db,
        &validated.title,
        &validated.body,
        validated.source_url.as_deref(),
        user.id,
    )
    .await
    .validate_custom()?;

    Ok(Custom(Status::Created, Json(CreatedResponse { id })))
}
