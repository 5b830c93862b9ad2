use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub api: ApiConfig,
    pub security: SecurityConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub port: u16,
    pub enable_request_logging: bool,
    pub max_request_size_bytes: usize,
    pub default_list_limit: i64,
    pub max_list_limit: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub cors_origins: Vec<String>,
    #[serde(skip_serializing)]
    pub admin_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub max_archive_entries: usize,
    pub max_entry_bytes: u64,
    pub max_image_dimension: u32,
    pub max_total_pixels: u64,
    pub max_canvas_height: u32,
    pub jpeg_quality: u8,
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
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // API overrides
        if let Some(port) = env::var("MANHWA_API_PORT")
            .ok()
            .or_else(|| env::var("PORT").ok())
            .and_then(|s| s.parse::<u16>().ok())
        {
            self.api.port = port;
        }
        if let Ok(v) = env::var("API_ENABLE_REQUEST_LOGGING") {
            self.api.enable_request_logging = v.parse().unwrap_or(self.api.enable_request_logging);
        }
        if let Ok(v) = env::var("API_MAX_REQUEST_SIZE_BYTES") {
            self.api.max_request_size_bytes = v.parse().unwrap_or(self.api.max_request_size_bytes);
        }
        if let Ok(v) = env::var("API_DEFAULT_LIST_LIMIT") {
            self.api.default_list_limit = v.parse().unwrap_or(self.api.default_list_limit);
        }
        if let Ok(v) = env::var("API_MAX_LIST_LIMIT") {
            self.api.max_list_limit = v.parse().unwrap_or(self.api.max_list_limit);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("ADMIN_KEY") {
            self.security.admin_key = v;
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_MAX_ARCHIVE_ENTRIES") {
            self.upload.max_archive_entries = v.parse().unwrap_or(self.upload.max_archive_entries);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_ENTRY_BYTES") {
            self.upload.max_entry_bytes = v.parse().unwrap_or(self.upload.max_entry_bytes);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_IMAGE_DIMENSION") {
            self.upload.max_image_dimension = v.parse().unwrap_or(self.upload.max_image_dimension);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_TOTAL_PIXELS") {
            self.upload.max_total_pixels = v.parse().unwrap_or(self.upload.max_total_pixels);
        }
        if let Ok(v) = env::var("UPLOAD_MAX_CANVAS_HEIGHT") {
            self.upload.max_canvas_height = v.parse().unwrap_or(self.upload.max_canvas_height);
        }
        if let Ok(v) = env::var("UPLOAD_JPEG_QUALITY") {
            self.upload.jpeg_quality = v.parse().unwrap_or(self.upload.jpeg_quality);
        }

        self
    }

    /// Clamp a client-supplied list limit into `1..=max_list_limit`.
    /// A misconfigured maximum below 1 is treated as 1.
    pub fn list_limit(&self, requested: Option<i64>) -> i64 {
        let max = self.api.max_list_limit.max(1);
        requested.unwrap_or(self.api.default_list_limit).clamp(1, max)
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            api: ApiConfig {
                port: 3000,
                enable_request_logging: true,
                max_request_size_bytes: 100 * 1024 * 1024, // 100MB
                default_list_limit: 50,
                max_list_limit: 200,
            },
            security: SecurityConfig {
                cors_origins: vec!["*".to_string()],
                admin_key: "default_key".to_string(),
            },
            upload: UploadConfig {
                max_archive_entries: 500,
                max_entry_bytes: 32 * 1024 * 1024,
                max_image_dimension: 16_384,
                max_total_pixels: 200_000_000,
                max_canvas_height: 65_535,
                jpeg_quality: 85,
            },
        }
    }

    fn staging() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Staging;
        config.database.max_connections = 20;
        config.database.connection_timeout = 10;
        config.api.max_request_size_bytes = 64 * 1024 * 1024;
        config.api.max_list_limit = 100;
        config.security.cors_origins = vec!["https://staging.example.com".to_string()];
        config.security.admin_key = String::new();
        config
    }

    fn production() -> Self {
        let mut config = Self::development();
        config.environment = Environment::Production;
        config.database.max_connections = 50;
        config.database.connection_timeout = 5;
        config.database.enable_query_logging = false;
        config.api.enable_request_logging = false;
        config.api.max_request_size_bytes = 64 * 1024 * 1024;
        config.api.max_list_limit = 100;
        config.security.cors_origins = vec!["https://app.example.com".to_string()];
        // Must come from ADMIN_KEY; an empty key rejects every privileged call.
        config.security.admin_key = String::new();
        config.upload.max_archive_entries = 300;
        config.upload.max_total_pixels = 120_000_000;
        config
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
