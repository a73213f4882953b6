use crate::{
    config::{FailurePolicy, ScraperSettings},
    entities::{DetailsUpdate, NewTitle, TitleKind, TitleOrder, TitleRecord},
    scraper::{Resolver, ScraperError, TitleDetails},
    services::library_scanner::{LibraryError, LibraryScanner, TitleDir},
};
use serde::Serialize;
use sqlx::SqlitePool;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Keeps the catalog in step with the movie and TV directories
pub struct CatalogAgent {
    resolver: Arc<Resolver>,
    db: SqlitePool,
    pause: Duration,
    policy: FailurePolicy,
}

/// Summary of a batch run
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub scanned: usize,
    pub created: usize,
    pub existing: usize,
    pub removed: usize,
    pub failed: Vec<BatchFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    pub path: PathBuf,
    pub error: String,
}

impl BatchReport {
    pub fn merge(&mut self, other: Self) {
        self.scanned += other.scanned;
        self.created += other.created;
        self.existing += other.existing;
        self.removed += other.removed;
        self.failed.extend(other.failed);
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl CatalogAgent {
    #[must_use]
    pub const fn new(
        resolver: Arc<Resolver>,
        db: SqlitePool,
        pause: Duration,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            resolver,
            db,
            pause,
            policy,
        }
    }

    /// Agent paced and failing as the scraper settings say
    pub fn from_settings(resolver: Arc<Resolver>, db: SqlitePool, settings: &ScraperSettings) -> Self {
        Self::new(
            resolver,
            db,
            settings.request_delay(),
            settings.failure_policy,
        )
    }

    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Full refresh: drop records whose directories are gone, then catalog new ones
    pub async fn run(&self, movie_dir: &Path, tv_dir: &Path) -> Result<BatchReport, CatalogError> {
        let mut report = BatchReport {
            removed: self.remove_missing(movie_dir, TitleKind::Movie).await?
                + self.remove_missing(tv_dir, TitleKind::Tv).await?,
            ..BatchReport::default()
        };

        report.merge(self.process_directory(movie_dir, TitleKind::Movie).await?);
        report.merge(self.process_directory(tv_dir, TitleKind::Tv).await?);

        info!(
            "Catalog run complete: {} scanned, {} new, {} existing, {} removed, {} failed",
            report.scanned,
            report.created,
            report.existing,
            report.removed,
            report.failed.len()
        );
        Ok(report)
    }

    /// Delete records of `kind` whose title no longer has a directory in `directory`
    pub async fn remove_missing(
        &self,
        directory: &Path,
        kind: TitleKind,
    ) -> Result<usize, CatalogError> {
        let present = LibraryScanner::titles(directory)?;
        let mut removed = 0;

        for record in TitleRecord::list(&self.db, kind, TitleOrder::Title).await? {
            if present.contains(&record.title) {
                continue;
            }
            info!(
                "{} ({}) no longer in {}, removing",
                record.title,
                kind,
                directory.display()
            );
            if TitleRecord::delete(&self.db, record.id).await? {
                removed += 1;
            }
        }

        Ok(removed)
    }

    /// Catalog every entry of `directory` that has no record yet
    pub async fn process_directory(
        &self,
        directory: &Path,
        kind: TitleKind,
    ) -> Result<BatchReport, CatalogError> {
        info!("Processing {} directory: {}", kind, directory.display());
        let entries = LibraryScanner::scan(directory)?;
        let mut report = BatchReport {
            scanned: entries.len(),
            ..BatchReport::default()
        };

        for entry in &entries {
            debug!(
                "Processing {} (mtime {}, ctime {})",
                entry.path.display(),
                entry.mtime,
                entry.ctime
            );
            match self.catalog_entry(entry, kind).await {
                Ok(Some(_)) => {
                    report.created += 1;
                    if !self.pause.is_zero() {
                        tokio::time::sleep(self.pause).await;
                    }
                }
                Ok(None) => {
                    debug!("{} of same kind exists: {}", kind, entry.title);
                    report.existing += 1;
                }
                Err(e) => match self.policy {
                    FailurePolicy::Isolate => {
                        warn!("Failed to catalog {}: {}", entry.path.display(), e);
                        report.failed.push(BatchFailure {
                            path: entry.path.clone(),
                            error: e.to_string(),
                        });
                    }
                    FailurePolicy::FailFast => {
                        error!("Aborting at {}: {}", entry.path.display(), e);
                        return Err(CatalogError::Aborted {
                            path: entry.path.clone(),
                            source: Box::new(e),
                        });
                    }
                },
            }
        }

        Ok(report)
    }

    /// Resolve and store one directory entry. `None` when it is already cataloged.
    pub async fn catalog_entry(
        &self,
        entry: &TitleDir,
        kind: TitleKind,
    ) -> Result<Option<TitleRecord>, CatalogError> {
        if TitleRecord::exists(&self.db, &entry.title, kind).await? {
            return Ok(None);
        }

        let result = self.resolver.resolve(&entry.title).await?;
        let new = NewTitle {
            kind,
            title: entry.title.clone(),
            rating: result.details.rating.clone(),
            blurb: result.details.synopsis.clone(),
            imdb_title_url: result.picked_url().map(str::to_string),
            find_results: result.find_results_html(),
            image: self.media_path(&result.details),
            file_path: entry.path.to_string_lossy().to_string(),
            file_mtime: entry.mtime,
            file_ctime: entry.ctime,
        };

        let record = TitleRecord::create(&self.db, &new).await?;
        info!("Cataloged {} ({}): {}", record.title, kind, record.rating_or_na());
        Ok(Some(record))
    }

    /// Re-resolve the single record titled `title` against a chosen detail URL
    pub async fn refresh_title(
        &self,
        title: &str,
        kind: TitleKind,
        url: &str,
    ) -> Result<TitleRecord, CatalogError> {
        let records = TitleRecord::filter(&self.db, title, kind).await?;
        let record = match records.as_slice() {
            [record] => record,
            [] => {
                return Err(CatalogError::NoMatch {
                    title: title.to_string(),
                    kind,
                });
            }
            many => {
                return Err(CatalogError::Ambiguous {
                    title: title.to_string(),
                    kind,
                    count: many.len(),
                });
            }
        };

        let details = self.resolver.title_details(url).await?;
        let update = DetailsUpdate {
            rating: details.rating.clone(),
            blurb: details.synopsis.clone(),
            imdb_title_url: url.to_string(),
            image: self.media_path(&details),
        };

        let updated = TitleRecord::update_details(&self.db, record.id, &update).await?;
        info!("Refreshed {} ({}) from {}", title, kind, url);
        Ok(updated)
    }

    fn media_path(&self, details: &TitleDetails) -> Option<String> {
        details
            .image
            .as_deref()
            .and_then(|path| self.resolver.images().media_path(path))
    }
}

/// Catalog agent errors
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Scraper error: {0}")]
    Scraper(#[from] ScraperError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error(transparent)]
    Library(#[from] LibraryError),

    #[error("No record titled {title} of type {kind}")]
    NoMatch { title: String, kind: TitleKind },

    #[error("{count} records titled {title} of type {kind}")]
    Ambiguous {
        title: String,
        kind: TitleKind,
        count: usize,
    },

    #[error("Run aborted at {}: {source}", path.display())]
    Aborted {
        path: PathBuf,
        #[source]
        source: Box<CatalogError>,
    },
}
