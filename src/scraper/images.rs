use crate::scraper::{PageFetcher, Result};
use reqwest::Url;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

const DEFAULT_EXTENSION: &str = "jpg";
const KEEP_FILE: &str = ".gitignore";

/// Local store for poster images.
///
/// Images live in `{root}/{subdirectory}/{stem}.{ext}`; records keep the
/// path relative to `root` so the media root can move.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(root: impl Into<PathBuf>, subdirectory: impl AsRef<Path>) -> Self {
        let root = root.into();
        let dir = root.join(subdirectory);
        Self { root, dir }
    }

    /// Directory the images are written to
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Download `image_url` and store it under `stem`.
    ///
    /// The bytes go to a temporary file in the image directory which is
    /// synced and then renamed over the target, so the returned path always
    /// names a complete file. On any failure nothing is left behind.
    pub async fn materialize(
        &self,
        fetcher: &dyn PageFetcher,
        image_url: &str,
        stem: &str,
    ) -> Result<PathBuf> {
        let bytes = fetcher.fetch_bytes(image_url).await?;
        let target = self
            .dir
            .join(format!("{stem}.{}", extension_from_url(image_url)));

        let dir = self.dir.clone();
        let path = target.clone();
        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &bytes))
            .await
            .map_err(io::Error::other)??;

        debug!("Stored poster {} -> {}", image_url, target.display());
        Ok(target)
    }

    /// Path of a stored image relative to the media root, `/`-separated
    pub fn media_path(&self, path: &Path) -> Option<String> {
        let relative = path.strip_prefix(&self.root).ok()?;
        let parts: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect();
        (!parts.is_empty()).then(|| parts.join("/"))
    }

    /// Remove every stored image, keeping `.gitignore`. Returns the number removed.
    pub fn clear(&self) -> io::Result<usize> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            if entry.file_name() == KEEP_FILE || !entry.file_type()?.is_file() {
                continue;
            }
            std::fs::remove_file(entry.path())?;
            removed += 1;
        }

        Ok(removed)
    }
}

fn write_atomic(dir: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(target).map_err(|e| e.error)?;
    Ok(())
}

/// File extension of the image URL's path, `jpg` when there is none
pub fn extension_from_url(image_url: &str) -> String {
    Url::parse(image_url)
        .ok()
        .and_then(|url| {
            Path::new(url.path())
                .extension()
                .and_then(|ext| ext.to_str())
                .filter(|ext| {
                    !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
                })
                .map(str::to_ascii_lowercase)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}
