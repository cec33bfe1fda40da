use std::path::PathBuf;

use anyhow::Context;

use crate::auth::JwtKeys;

const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Runtime configuration held in Rocket's managed state.
pub struct AppConfig {
    pub jwt: JwtKeys,
    pub uploads_dir: PathBuf,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let secret = dotenvy::var("JWT_SECRET").context("JWT_SECRET is not set")?;

        let ttl_hours = match dotenvy::var("TOKEN_TTL_HOURS") {
            Ok(raw) => raw
                .parse::<i64>()
                .context("TOKEN_TTL_HOURS is not a number")?,
            Err(_) => DEFAULT_TOKEN_TTL_HOURS,
        };

        let uploads_dir =
            PathBuf::from(dotenvy::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()));

        Ok(Self {
            jwt: JwtKeys::new(&secret, ttl_hours * 3600),
            uploads_dir,
        })
    }

    #[cfg(test)]
    pub fn for_tests() -> Self {
        Self {
            jwt: JwtKeys::new("test-secret-key-that-is-long-enough", 3600),
            uploads_dir: std::env::temp_dir().join("fairway-tracker-test-uploads"),
        }
    }
}
