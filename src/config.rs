use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File read when no `--config` is given, if it exists
pub const DEFAULT_CONFIG_FILE: &str = "reelshelf.toml";

/// Prefix for environment overrides, e.g. `REELSHELF__SERVER__PORT=8080`
pub const ENV_PREFIX: &str = "REELSHELF";

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub database_url: String,
    /// One subdirectory per movie
    pub movie_directory: PathBuf,
    /// One subdirectory per TV series
    pub tv_directory: PathBuf,
    /// Root that stored poster paths are relative to; served under `/media`
    pub media_root: PathBuf,
    pub image_subdirectory: String,
    pub scraper: ScraperSettings,
    pub server: ServerSettings,
    pub log: LogSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = data_dir();
        Self {
            database_url: format!("sqlite://{}", data_dir.join("reelshelf.db").display()),
            movie_directory: data_dir.join("movies"),
            tv_directory: data_dir.join("tv"),
            media_root: data_dir.join("media"),
            image_subdirectory: "title_images".to_string(),
            scraper: ScraperSettings::default(),
            server: ServerSettings::default(),
            log: LogSettings::default(),
        }
    }
}

fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("reelshelf")
}

/// What a batch run does when one directory fails to resolve
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Log the failure, keep going, report it at the end
    #[default]
    Isolate,
    /// Stop the run at the first failure
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperSettings {
    pub origin: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
    /// Pause after each newly cataloged title
    pub request_delay_ms: u64,
    pub failure_policy: FailurePolicy,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            origin: "https://www.imdb.com".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36".to_string(),
            request_timeout_secs: 30,
            request_delay_ms: 1000,
            failure_policy: FailurePolicy::Isolate,
        }
    }
}

impl ScraperSettings {
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub const fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
        }
    }
}

impl ServerSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    /// Default filter directive, `RUST_LOG` wins when set
    pub filter: String,
    pub json: bool,
    /// Write daily-rolling log files here as well as to stderr
    pub directory: Option<PathBuf>,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            filter: "reelshelf=info,tower_http=info".to_string(),
            json: false,
            directory: None,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, then the TOML file, then `REELSHELF__*` variables.
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}
