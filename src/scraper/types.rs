use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::path::PathBuf;

/// Display text for a title without a rating
pub const NO_RATING: &str = "N/A";

/// Synopsis stored when the search page has no candidates
pub const NO_TITLES_FOUND: &str = "No titles found in search";

/// One entry of a title search, before a match is committed to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchCandidate {
    /// Poster thumbnail URL
    pub image_url: String,
    /// Absolute URL of the title's detail page
    pub title_url: String,
    /// Display label
    pub text: String,
}

impl SearchCandidate {
    pub fn new(
        image_url: impl Into<String>,
        title_url: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            image_url: image_url.into(),
            title_url: title_url.into(),
            text: text.into(),
        }
    }
}

impl std::fmt::Display for SearchCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Rating, synopsis and local poster for one title
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDetails {
    /// `None` when the detail page carries no rating
    pub rating: Option<String>,
    /// Never empty
    pub synopsis: String,
    /// Fully written poster file, if one was found
    pub image: Option<PathBuf>,
}

impl TitleDetails {
    /// Details for a search that produced no candidates
    #[must_use]
    pub fn not_found() -> Self {
        Self {
            rating: None,
            synopsis: NO_TITLES_FOUND.to_string(),
            image: None,
        }
    }

    /// Rating for display, `N/A` when absent
    #[must_use]
    pub fn rating_or_na(&self) -> &str {
        self.rating.as_deref().unwrap_or(NO_RATING)
    }
}

impl std::fmt::Display for TitleDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.rating_or_na(), self.synopsis)
    }
}

/// Outcome of resolving one free-text title
#[derive(Debug, Clone)]
pub struct ResolutionResult {
    /// The title that was searched for
    pub title: String,
    /// Every candidate in page order; kept so a wrong pick can be corrected
    pub candidates: Vec<SearchCandidate>,
    pub details: TitleDetails,
}

impl ResolutionResult {
    /// Detail URL of the candidate that was picked
    #[must_use]
    pub fn picked_url(&self) -> Option<&str> {
        self.candidates.first().map(|c| c.title_url.as_str())
    }

    #[must_use]
    pub fn find_results_html(&self) -> String {
        find_results_html(&self.candidates)
    }
}

impl std::fmt::Display for ResolutionResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\n{}", self.title, self.details)
    }
}

/// Render candidates as the unordered list stored with each record
#[must_use]
pub fn find_results_html(candidates: &[SearchCandidate]) -> String {
    let mut html = String::from("<ul>");
    for candidate in candidates {
        let _ = writeln!(
            html,
            r#"<li><a href="{}">{}</a></li>"#,
            candidate.title_url, candidate.text
        );
    }
    html.push_str("</ul>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_results_html_single() {
        let candidates = vec![SearchCandidate::new(
            "https://m.media-amazon.com/images/M/archer.jpg",
            "https://example.test/title/tt123/",
            "Archer (2009) (TV Series)",
        )];

        assert_eq!(
            find_results_html(&candidates),
            "<ul><li><a href=\"https://example.test/title/tt123/\">Archer (2009) (TV Series)</a></li>\n</ul>"
        );
    }

    #[test]
    fn test_find_results_html_empty() {
        assert_eq!(find_results_html(&[]), "<ul></ul>");
    }

    #[test]
    fn test_not_found_details() {
        let details = TitleDetails::not_found();
        assert_eq!(details.rating, None);
        assert_eq!(details.rating_or_na(), "N/A");
        assert_eq!(details.synopsis, "No titles found in search");
        assert!(details.image.is_none());
    }

    #[test]
    fn test_empty_rating_is_not_absent() {
        let details = TitleDetails {
            rating: Some(String::new()),
            synopsis: "x".to_string(),
            image: None,
        };
        assert_eq!(details.rating_or_na(), "");
    }
}
