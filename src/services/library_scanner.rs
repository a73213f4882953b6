use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;
use walkdir::WalkDir;

/// One direct child of a movie or TV directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDir {
    /// Entry name as found on disk
    pub name: String,
    /// Query title derived from the name
    pub title: String,
    pub path: PathBuf,
    /// Unix seconds
    pub mtime: i64,
    /// Unix seconds; creation time where the platform records it, else mtime
    pub ctime: i64,
}

/// Title to search for, given a directory name.
///
/// Names are hyphen-delimited (`The-Bourne-Legacy-2012`); hyphens become
/// spaces and nothing else changes, so `Tosh.0` stays `Tosh.0`.
pub fn query_title(name: &str) -> String {
    name.replace('-', " ")
}

/// Lists the titles in a media directory
pub struct LibraryScanner;

impl LibraryScanner {
    /// Direct children of `directory`, sorted by name, hidden entries skipped
    pub fn scan(directory: &Path) -> Result<Vec<TitleDir>, LibraryError> {
        if !directory.exists() {
            return Err(LibraryError::PathNotFound(directory.to_path_buf()));
        }
        if !directory.is_dir() {
            return Err(LibraryError::NotADirectory(directory.to_path_buf()));
        }

        let mut entries = Vec::new();
        for entry in WalkDir::new(directory)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') {
                debug!("Skipping hidden entry: {}", name);
                continue;
            }

            let metadata = entry.metadata()?;
            let modified = metadata.modified()?;
            let created = metadata.created().unwrap_or(modified);

            entries.push(TitleDir {
                title: query_title(&name),
                name,
                path: entry.into_path(),
                mtime: unix_seconds(modified),
                ctime: unix_seconds(created),
            });
        }

        Ok(entries)
    }

    /// Query titles of every entry currently in `directory`
    pub fn titles(directory: &Path) -> Result<HashSet<String>, LibraryError> {
        Ok(Self::scan(directory)?
            .into_iter()
            .map(|entry| entry.title)
            .collect())
    }
}

fn unix_seconds(time: SystemTime) -> i64 {
    DateTime::<Utc>::from(time).timestamp()
}

/// Library scanner errors
#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("Path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("Not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("Walk error: {0}")]
    WalkError(#[from] walkdir::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
