// src/config.rs
use std::env;

use tracing::info;

pub struct Config {
    pub port: u16,
    pub database_url: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn load() -> Self {
        // Default to 3030 for local development
        let port = env::var("PORT").unwrap_or_else(|_| {
            info!("PORT not set, using default: 3030");
            "3030".to_string()
        });
        let port = port.parse::<u16>().expect("PORT must be a valid number");

        Self {
            port,
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            jwt_secret: env::var("JWT_SECRET").expect("JWT_SECRET must be set"),
        }
    }
}
