use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub uploads: UploadConfig,
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    /// Bearer tokens are short-lived; gated routes re-verify on every call.
    pub token_expiry_mins: u64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Spool directory for multipart intake before the host push
    pub temp_dir: String,
    pub max_files: usize,
    pub max_dev_files: usize,
    pub max_file_size_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    pub base_url: String,
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("TOKEN_EXPIRY_MINS") {
            self.security.token_expiry_mins = v.parse().unwrap_or(self.security.token_expiry_mins);
        }
        if let Ok(v) = env::var("BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_TEMP_DIR") {
            self.uploads.temp_dir = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILES") {
            self.uploads.max_files = v.parse().unwrap_or(self.uploads.max_files);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_DEV_FILES") {
            self.uploads.max_dev_files = v.parse().unwrap_or(self.uploads.max_dev_files);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_FILE_SIZE_BYTES") {
            self.uploads.max_file_size_bytes =
                v.parse().unwrap_or(self.uploads.max_file_size_bytes);
        }

        // Media host overrides
        if let Ok(v) = env::var("MEDIA_BASE_URL") {
            self.media.base_url = v;
        }
        if let Ok(v) = env::var("MEDIA_CLOUD_NAME") {
            self.media.cloud_name = v;
        }
        if let Ok(v) = env::var("MEDIA_API_KEY") {
            self.media.api_key = v;
        }
        if let Ok(v) = env::var("MEDIA_API_SECRET") {
            self.media.api_secret = v;
        }

        self
    }

    fn base() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 10,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                token_expiry_mins: 60,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            uploads: UploadConfig {
                temp_dir: "uploads/tmp".to_string(),
                max_files: 10,
                max_dev_files: 20,
                max_file_size_bytes: 50 * 1024 * 1024,
            },
            media: MediaConfig {
                base_url: "https://api.cloudinary.com/v1_1".to_string(),
                cloud_name: String::new(),
                api_key: String::new(),
                api_secret: String::new(),
            },
        }
    }

    fn development() -> Self {
        let mut cfg = Self::base();
        cfg.environment = Environment::Development;
        // Dev-only fallback so the server boots without a .env
        cfg.security.jwt_secret = "dev-insecure-secret".to_string();
        cfg
    }

    fn staging() -> Self {
        let mut cfg = Self::base();
        cfg.environment = Environment::Staging;
        cfg
    }

    fn production() -> Self {
        let mut cfg = Self::base();
        cfg.environment = Environment::Production;
        cfg.database.max_connections = 20;
        cfg
    }
}

static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

/// Global configuration singleton, loaded once from the environment
pub fn config() -> &'static AppConfig {
    &CONFIG
}
