//! Application settings loaded from environment variables.

use std::env;

use super::constants::{
    DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS, DEFAULT_PAYMENT_BASE_URL,
    DEFAULT_PAYMENT_FINISH_URL, DEFAULT_STATIC_DIR, MIN_JWT_SECRET_LENGTH,
};

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub static_dir: String,
    pub payment: PaymentConfig,
}

/// Payment gateway settings
#[derive(Clone)]
pub struct PaymentConfig {
    pub base_url: String,
    server_key: String,
    pub finish_url: String,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("jwt_secret", &"[REDACTED]")
            .field("jwt_expiration_hours", &self.jwt_expiration_hours)
            .field("static_dir", &self.static_dir)
            .field("payment", &self.payment)
            .finish()
    }
}

impl std::fmt::Debug for PaymentConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaymentConfig")
            .field("base_url", &self.base_url)
            .field("server_key", &"[REDACTED]")
            .field("finish_url", &self.finish_url)
            .finish()
    }
}

impl PaymentConfig {
    pub fn new(
        base_url: impl Into<String>,
        server_key: impl Into<String>,
        finish_url: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            server_key: server_key.into(),
            finish_url: finish_url.into(),
        }
    }

    /// Server key used for basic auth and notification signatures.
    pub fn server_key(&self) -> &str {
        &self.server_key
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Panics
    /// Panics if JWT_SECRET is not set or is too short (security requirement).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            if cfg!(debug_assertions) {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            } else {
                panic!("JWT_SECRET environment variable must be set in production");
            }
        });

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            panic!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LENGTH
            );
        }

        let server_key = env::var("PAYMENT_SERVER_KEY").unwrap_or_else(|_| {
            tracing::warn!("PAYMENT_SERVER_KEY not set, payment requests will be rejected");
            String::new()
        });

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            jwt_secret,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_JWT_EXPIRATION_HOURS),
            static_dir: env::var("STATIC_DIR").unwrap_or_else(|_| DEFAULT_STATIC_DIR.to_string()),
            payment: PaymentConfig {
                base_url: env::var("PAYMENT_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_PAYMENT_BASE_URL.to_string()),
                server_key,
                finish_url: env::var("PAYMENT_FINISH_URL")
                    .unwrap_or_else(|_| DEFAULT_PAYMENT_FINISH_URL.to_string()),
            },
        }
    }

    /// Build a configuration from explicit values (tests, embedding).
    pub fn new(database_url: impl Into<String>, jwt_secret: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            jwt_secret: jwt_secret.into(),
            jwt_expiration_hours: DEFAULT_JWT_EXPIRATION_HOURS,
            static_dir: DEFAULT_STATIC_DIR.to_string(),
            payment: PaymentConfig::new(
                DEFAULT_PAYMENT_BASE_URL,
                String::new(),
                DEFAULT_PAYMENT_FINISH_URL,
            ),
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn jwt_secret_bytes(&self) -> &[u8] {
        self.jwt_secret.as_bytes()
    }
}
