use std::{env, path::PathBuf, str::FromStr, time::Duration};

use anyhow::{Context, Result};

const DEFAULT_DATABASE_URL: &str = "sqlite://data/edushare.db";
const DEFAULT_UPLOADS_PATH: &str = "storage/uploads";
const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;
const DEFAULT_CLEANUP_MINUTES: u64 = 30;
const DEFAULT_PORT: u16 = 3000;

/// Process-wide settings resolved once at startup.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub uploads_dir: PathBuf,
    pub max_upload_bytes: u64,
    pub session_cleanup_interval: Duration,
    pub port: u16,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
        let uploads_dir = env::var("UPLOADS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOADS_PATH));

        let max_upload_bytes = parse_var("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?;
        let cleanup_minutes = parse_var("SESSION_CLEANUP_MINUTES", DEFAULT_CLEANUP_MINUTES)?;
        let port = parse_var("PORT", DEFAULT_PORT)?;

        Ok(Self {
            database_url,
            uploads_dir,
            max_upload_bytes,
            session_cleanup_interval: Duration::from_secs(cleanup_minutes.max(1) * 60),
            port,
        })
    }
}

fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse()
            .with_context(|| format!("{name} must be a valid number, got `{raw}`")),
        _ => Ok(default),
    }
}
