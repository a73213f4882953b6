pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod logging;
pub mod routes;
pub mod scraper;
pub mod services;

use std::sync::Arc;

use anyhow::Context as _;
use sqlx::SqlitePool;

pub use error::{ApiError, ApiResponse, ApiResult, AppError};

use crate::{
    config::AppConfig,
    entities::TitleRecord,
    scraper::{HttpFetcher, ImageStore, Resolver},
    services::CatalogAgent,
};

/// Shared state for the HTTP routes and the CLI commands
#[derive(Clone)]
pub struct Ctx {
    pub db: SqlitePool,
    pub catalog_agent: Arc<CatalogAgent>,
    pub config: Arc<AppConfig>,
}

impl Ctx {
    pub fn new(db: SqlitePool, catalog_agent: Arc<CatalogAgent>, config: AppConfig) -> Self {
        Self {
            db,
            catalog_agent,
            config: Arc::new(config),
        }
    }

    /// Wire the HTTP fetcher, image store, resolver and agent from configuration
    pub fn from_config(db: SqlitePool, config: AppConfig) -> crate::scraper::Result<Self> {
        let fetcher = HttpFetcher::new(
            &config.scraper.user_agent,
            config.scraper.request_timeout(),
        )?;
        let images = ImageStore::new(&config.media_root, &config.image_subdirectory);
        let resolver = Resolver::new(Arc::new(fetcher), images, &config.scraper.origin)?;
        let agent = CatalogAgent::from_settings(Arc::new(resolver), db.clone(), &config.scraper);

        Ok(Self::new(db, Arc::new(agent), config))
    }

    pub fn images(&self) -> &ImageStore {
        self.catalog_agent.resolver().images()
    }

    /// Delete every record; stored posters stay. Returns the records removed.
    pub async fn clear_db(&self) -> sqlx::Result<u64> {
        TitleRecord::delete_all(&self.db).await
    }

    /// Delete every record and every stored poster except `.gitignore`.
    ///
    /// Returns the records and images removed.
    pub async fn clear_data(&self) -> anyhow::Result<(u64, usize)> {
        let records = TitleRecord::delete_all(&self.db).await?;
        let images = self
            .images()
            .clear()
            .with_context(|| format!("Failed to clear {}", self.images().dir().display()))?;
        Ok((records, images))
    }
}
