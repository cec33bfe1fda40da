#[macro_use]
extern crate rocket;

mod api;
mod auth;
mod config;
mod db;
mod env;
mod error;
mod handicap;
mod migrations;
mod models;
mod schema;
mod telemetry;
#[cfg(test)]
mod test;
mod validation;

use api::{
    api_create_course, api_create_news, api_create_quote, api_delete_profile, api_delete_user,
    api_get_all_users, api_get_cards, api_get_course, api_get_handicap, api_get_player_cards,
    api_get_player_handicap, api_get_profile, api_golf_news, api_list_courses, api_login,
    api_random_quote, api_register, api_submit_card, api_update_profile, api_update_user,
    api_upload_attachment, health, test_db,
};
use auth::{forbidden_api, internal_error_api, not_found_api, unauthorized_api, unprocessable_api};
use config::AppConfig;
use env::load_environment;
use migrations::sync_schema;
use rocket::{Build, Rocket};
use schema::CURRENT_SCHEMA;
use sqlx::SqlitePool;
use sqlx::sqlite::SqlitePoolOptions;
use telemetry::{TelemetryFairing, init_tracing};
use tracing::{error, info};

#[launch]
async fn rocket() -> _ {
    init_tracing();
    load_environment().expect("Failed to load environment files");

    let app_config = AppConfig::from_env().expect("Invalid application configuration");

    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite:fairway-tracker.db?mode=rwc".to_string());

    let pool = SqlitePoolOptions::new()
        .connect(&database_url)
        .await
        .expect("Failed to connect to SQLite database");

    info!("Synchronizing database schema...");
    match sync_schema(pool.clone(), CURRENT_SCHEMA, false).await {
        Ok(changes) => info!("Schema in sync ({} changes applied)", changes),
        Err(e) => {
            error!("Failed to synchronize schema: {}", e);
            panic!("Database schema synchronization failed: {}", e);
        }
    }

    std::fs::create_dir_all(&app_config.uploads_dir).expect("Failed to create uploads directory");

    init_rocket(pool, app_config).await
}

pub async fn init_rocket(pool: SqlitePool, app_config: AppConfig) -> Rocket<Build> {
    info!("Starting fairway tracker");

    rocket::build()
        .manage(pool)
        .manage(app_config)
        .mount(
            "/api",
            routes![
                api_register,
                api_login,
                api_get_profile,
                api_update_profile,
                api_delete_profile,
                api_list_courses,
                api_get_course,
                api_create_course,
                api_upload_attachment,
                api_submit_card,
                api_get_cards,
                api_get_player_cards,
                api_get_handicap,
                api_get_player_handicap,
                api_random_quote,
                api_create_quote,
                api_golf_news,
                api_create_news,
                api_get_all_users,
                api_update_user,
                api_delete_user,
            ],
        )
        .register(
            "/api",
            catchers![
                unauthorized_api,
                forbidden_api,
                not_found_api,
                unprocessable_api,
                internal_error_api,
            ],
        )
        .mount("/api", routes![health])
        .mount("/", routes![test_db])
        .attach(TelemetryFairing)
}
