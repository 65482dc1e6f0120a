pub mod app;
pub mod config;
pub mod domain;
pub mod http;
pub mod infra;

use anyhow::Result;

use crate::config::AppConfig;
use crate::infra::{db::Db, storage::LocalMediaStore};

#[derive(Clone)]
pub struct AppState {
    pub db: Db,
    pub media: LocalMediaStore,
    pub upload_max_bytes: usize,
    pub admin_token: Option<String>,
}

impl AppState {
    /// Opens the database (running migrations) and prepares the upload directory.
    pub async fn from_config(config: &AppConfig) -> Result<Self> {
        let db = Db::connect(config).await?;
        let media = LocalMediaStore::new(config.upload_dir.clone()).await?;

        Ok(Self {
            db,
            media,
            upload_max_bytes: config.upload_max_bytes,
            admin_token: config.admin_token.clone(),
        })
    }
}
