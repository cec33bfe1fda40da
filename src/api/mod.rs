pub mod admin;
pub mod auth;
pub mod cards;
pub mod content;
pub mod courses;

pub use admin::*;
pub use auth::*;
pub use cards::*;
pub use content::*;
pub use courses::*;

use chrono::NaiveDate;
use rocket::State;
use rocket::http::Status;
use serde::{Deserialize, Serialize};
use sqlx::{Pool, Sqlite};

use crate::auth::User;
use crate::db;

#[derive(Serialize, Deserialize, Debug)]
pub struct UserData {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub gender: Option<String>,
    pub birthday: Option<NaiveDate>,
}

impl From<User> for UserData {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            display_name: user.display_name,
            role: user.role.to_string(),
            gender: user.gender,
            birthday: user.birthday,
        }
    }
}

#[get("/health")]
pub fn health() -> &'static str {
    "OK"
}

#[get("/test-db")]
pub async fn test_db(db: &State<Pool<Sqlite>>) -> Result<&'static str, Status> {
    db::ping(db).await?;
    Ok("Database connection OK")
}
