mod detail;
mod fetcher;
mod images;
mod resolver;
mod search;
mod selectors;
mod types;

#[cfg(test)]
pub(crate) mod testing;
#[cfg(test)]
mod tests;

pub use detail::{DetailFields, extract_details, missing_blurb, title_id_stem};
pub use fetcher::{HttpFetcher, Page, PageFetcher};
pub use images::ImageStore;
pub use resolver::Resolver;
pub use search::{ListLayout, SearchExtractor, SearchLayout, TableLayout};
pub use types::{
    NO_RATING, NO_TITLES_FOUND, ResolutionResult, SearchCandidate, TitleDetails,
    find_results_html,
};

/// Scraper result type
pub type Result<T> = std::result::Result<T, ScraperError>;

/// Failure talking to the catalog site. Never retried.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request to {url} failed: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// Scraper error types
#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// A results container was present but a row inside it was not shaped
    /// the way the layout expects.
    #[error("Layout drift in {layout} results: {detail}")]
    LayoutDrift { layout: &'static str, detail: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ScraperError {
    pub(crate) fn drift(layout: &'static str, detail: impl Into<String>) -> Self {
        Self::LayoutDrift {
            layout,
            detail: detail.into(),
        }
    }

    /// Whether the error came from the network rather than from parsing or disk
    #[must_use]
    pub const fn is_fetch(&self) -> bool {
        matches!(self, Self::Fetch(_))
    }
}
