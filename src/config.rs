// src/config.rs

/// Runtime settings, read once at startup and carried in `AppState` so that
/// nothing else touches the process environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub jwt_ttl_minutes: i64,
    pub admin_key: String,
}

impl Config {
    pub fn from_env() -> Self {
        let database_url =
            std::env::var("DATABASE_URL").expect("DATABASE_URL must be set in .env");
        let jwt_secret =
            std::env::var("JWT_SECRET_KEY").expect("JWT_SECRET_KEY must be set in .env");
        let admin_key = std::env::var("ADMIN_KEY").expect("ADMIN_KEY must be set in .env");
        let jwt_ttl_minutes = std::env::var("JWT_ACCESS_TOKEN_EXPIRE_MINUTES")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(60);

        Config {
            database_url,
            jwt_secret,
            jwt_ttl_minutes,
            admin_key,
        }
    }
}
