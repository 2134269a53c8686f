use std::path::{Path, PathBuf};

use crate::error::AppError;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_FLASH_TTL_SECS: u64 = 600;
const DEFAULT_UPLOAD_LIMIT_BYTES: usize = 10 * 1024 * 1024;

/// Application configuration loaded explicitly from environment variables.
///
/// No defaults are assumed for paths; the caller must provide them.
/// Redis URL is optional; if absent, flash notices are kept in process memory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Address the HTTP server binds to, e.g. "0.0.0.0:3000".
    pub bind_addr: String,
    /// Filesystem path to the SQLite database file.
    pub db_path: String,
    /// Directory served as static assets; uploads land in its `uploads/` subdirectory.
    pub public_dir: String,
    /// Redis connection URL (e.g. "redis://127.0.0.1:6379").
    pub redis_url: Option<String>,
    /// How long an unread flash notice survives in Redis.
    pub flash_ttl_secs: u64,
    /// Largest accepted request body, which bounds image uploads.
    pub upload_limit_bytes: usize,
    /// Insert demo categories and recipes into an empty store at startup.
    pub seed_demo: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Required:
    /// - `BLOG_DB_PATH`: path to the SQLite database file (created if missing)
    /// - `BLOG_PUBLIC_DIR`: path to the static asset directory (must exist)
    ///
    /// Optional:
    /// - `BLOG_BIND_ADDR` (default: "0.0.0.0:3000")
    /// - `REDIS_URL`
    /// - `FLASH_TTL_SECS` (default: 600)
    /// - `BLOG_UPLOAD_LIMIT_BYTES` (default: 10 MiB)
    /// - `BLOG_SEED_DEMO` ("1" or "true" to enable)
    pub fn from_env() -> Result<Self, AppError> {
        let db_path = std::env::var("BLOG_DB_PATH")
            .map_err(|_| AppError::Config("BLOG_DB_PATH environment variable is required".to_string()))?;

        let public_dir = std::env::var("BLOG_PUBLIC_DIR").map_err(|_| {
            AppError::Config("BLOG_PUBLIC_DIR environment variable is required".to_string())
        })?;
        if !Path::new(&public_dir).is_dir() {
            return Err(AppError::Config(format!(
                "public directory not found at {public_dir}"
            )));
        }

        let bind_addr =
            std::env::var("BLOG_BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let flash_ttl_secs = parse_var("FLASH_TTL_SECS")?.unwrap_or(DEFAULT_FLASH_TTL_SECS);
        let upload_limit_bytes =
            parse_var("BLOG_UPLOAD_LIMIT_BYTES")?.unwrap_or(DEFAULT_UPLOAD_LIMIT_BYTES);

        let seed_demo = std::env::var("BLOG_SEED_DEMO")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        Ok(Self {
            bind_addr,
            db_path,
            public_dir,
            redis_url: std::env::var("REDIS_URL").ok(),
            flash_ttl_secs,
            upload_limit_bytes,
            seed_demo,
        })
    }

    pub fn public_dir(&self) -> PathBuf {
        PathBuf::from(&self.public_dir)
    }

    /// Returns the directory uploaded images are written to.
    pub fn uploads_dir(&self) -> PathBuf {
        self.public_dir().join("uploads")
    }
}

fn parse_var<T: std::str::FromStr>(key: &str) -> Result<Option<T>, AppError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| AppError::Config(format!("invalid {key} value '{raw}': {e}"))),
        Err(_) => Ok(None),
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
