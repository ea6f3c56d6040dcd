use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::SqlitePool;
use tracing::info;

use crate::{config::AppConfig, db, files::FileStore};

#[derive(Clone)]
pub struct AppState {
    pool: SqlitePool,
    files: FileStore,
    config: Arc<AppConfig>,
}

impl AppState {
    pub async fn new(config: AppConfig) -> Result<Self> {
        let pool = db::connect(&config.database_url)
            .await
            .context("failed to initialise database")?;

        let files = FileStore::open(
            pool.clone(),
            config.uploads_dir.clone(),
            config.max_upload_bytes,
        )
        .await?;

        info!(
            uploads = %config.uploads_dir.display(),
            max_upload_bytes = config.max_upload_bytes,
            "storage ready"
        );

        Ok(Self::from_parts(pool, files, config))
    }

    pub fn from_parts(pool: SqlitePool, files: FileStore, config: AppConfig) -> Self {
        Self {
            pool,
            files,
            config: Arc::new(config),
        }
    }

    pub fn pool(&self) -> SqlitePool {
        self.pool.clone()
    }

    pub fn pool_ref(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn files(&self) -> &FileStore {
        &self.files
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

/// State backed by an in-memory database and a temporary uploads directory.
#[cfg(test)]
pub async fn test_state() -> (AppState, tempfile::TempDir) {
    test_state_with_limit(10 * 1024 * 1024).await
}

#[cfg(test)]
pub async fn test_state_with_limit(max_upload_bytes: u64) -> (AppState, tempfile::TempDir) {
    use std::time::Duration;

    let pool = db::memory_pool().await;
    let dir = tempfile::tempdir().expect("temp dir");
    let config = AppConfig {
        database_url: "sqlite::memory:".to_string(),
        uploads_dir: dir.path().join("uploads"),
        max_upload_bytes,
        session_cleanup_interval: Duration::from_secs(60),
        port: 0,
    };

    let files = FileStore::open(pool.clone(), config.uploads_dir.clone(), config.max_upload_bytes)
        .await
        .expect("file store opens");

    (AppState::from_parts(pool, files, config), dir)
}
