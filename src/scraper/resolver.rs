use crate::scraper::{
    FetchError, ImageStore, PageFetcher, ResolutionResult, Result, SearchCandidate,
    SearchExtractor, TitleDetails, extract_details, title_id_stem,
};
use reqwest::Url;
use std::sync::Arc;
use tracing::{debug, info};

/// Turns a free-text title into catalog details.
///
/// Every round-trip (search page, detail page, poster) happens in sequence;
/// nothing is retried and fetch failures are returned to the caller.
pub struct Resolver {
    fetcher: Arc<dyn PageFetcher>,
    extractor: SearchExtractor,
    images: ImageStore,
    origin: Url,
}

impl Resolver {
    /// Create a resolver for the catalog at `origin`
    pub fn new(fetcher: Arc<dyn PageFetcher>, images: ImageStore, origin: &str) -> Result<Self> {
        let origin = Url::parse(origin).map_err(|e| FetchError::InvalidUrl {
            url: origin.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            fetcher,
            extractor: SearchExtractor::new(origin.clone()),
            images,
            origin,
        })
    }

    pub fn images(&self) -> &ImageStore {
        &self.images
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Search URL for a title: words percent-encoded and joined with `+`
    pub fn search_url(&self, title: &str) -> String {
        let query = title
            .split_whitespace()
            .map(|word| urlencoding::encode(word).into_owned())
            .collect::<Vec<_>>()
            .join("+");

        format!(
            "{}/find?q={}",
            self.origin.as_str().trim_end_matches('/'),
            query
        )
    }

    /// Fetch the search page and return its candidates in page order
    pub async fn search(&self, title: &str) -> Result<Vec<SearchCandidate>> {
        let url = self.search_url(title);
        let page = self.fetcher.fetch_page(&url).await?;
        self.extractor.extract_candidates(&page)
    }

    /// Fetch a detail page, extract its fields and store its poster
    pub async fn title_details(&self, detail_url: &str) -> Result<TitleDetails> {
        let page = self.fetcher.fetch_page(detail_url).await?;
        let fields = {
            let document = page.document();
            extract_details(&document, detail_url)
        };

        let image = match (fields.poster_url.as_deref(), title_id_stem(detail_url)) {
            (Some(poster_url), Some(stem)) => Some(
                self.images
                    .materialize(self.fetcher.as_ref(), poster_url, &stem)
                    .await?,
            ),
            (Some(_), None) => {
                debug!("No title id in {}, poster not stored", detail_url);
                None
            }
            (None, _) => {
                debug!("No poster on {}", detail_url);
                None
            }
        };

        Ok(TitleDetails {
            rating: fields.rating,
            synopsis: fields.synopsis,
            image,
        })
    }

    /// Search for `title`, commit to the first candidate and fetch its details
    pub async fn resolve(&self, title: &str) -> Result<ResolutionResult> {
        info!("Resolving: {}", title);

        let candidates = self.search(title).await?;
        let Some(picked) = candidates.first().map(|c| c.title_url.clone()) else {
            info!("No titles found for: {}", title);
            return Ok(ResolutionResult {
                title: title.to_string(),
                candidates,
                details: TitleDetails::not_found(),
            });
        };

        debug!(
            "Picked {} out of {} candidates for {}",
            picked,
            candidates.len(),
            title
        );
        let details = self.title_details(&picked).await?;

        Ok(ResolutionResult {
            title: title.to_string(),
            candidates,
            details,
        })
    }
}
