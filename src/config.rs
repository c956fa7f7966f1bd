// src/config.rs

use std::env;

use dotenvy::dotenv;

use crate::{error::AppError, utils::text::Casing};

/// Question count used when a sheet is opened without one.
pub const DEFAULT_QUESTION_COUNT: u32 = 20;

/// Upper bound for a single optik sheet.
pub const MAX_QUESTION_COUNT: u32 = 200;

/// School grades served by the portal.
pub const GRADES: [i64; 4] = [5, 6, 7, 8];

/// Maximum length of a derived student key.
pub const PARTITION_KEY_MAX_LEN: usize = 120;

/// Length of generated temporary passwords.
pub const TEMP_PASSWORD_LEN: usize = 10;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub jwt_remember_expiration: u64,
    pub rust_log: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
    pub port: u16,
    pub partition_casing: Casing,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenv().ok();

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://optik.db?mode=rwc".to_string());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::InternalServerError("JWT_SECRET must be set".to_string()))?;

        let jwt_expiration = parse_var("JWT_EXPIRATION", 86_400)?;
        let jwt_remember_expiration = parse_var("JWT_REMEMBER_EXPIRATION", 2_592_000)?;
        let port = parse_var("PORT", 3000)?;

        let rust_log = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        let partition_casing = match env::var("PARTITION_CASING") {
            Ok(raw) => raw.parse::<Casing>().map_err(AppError::InternalServerError)?,
            Err(_) => Casing::Turkish,
        };

        Ok(Self {
            database_url,
            jwt_secret,
            jwt_expiration,
            jwt_remember_expiration,
            rust_log,
            admin_email: env::var("ADMIN_EMAIL").ok(),
            admin_password: env::var("ADMIN_PASSWORD").ok(),
            port,
            partition_casing,
        })
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, default: T) -> Result<T, AppError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| AppError::InternalServerError(format!("{} is not a valid value", name))),
        Err(_) => Ok(default),
    }
}
