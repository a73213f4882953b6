use crate::scraper::selectors::{PATTERNS, SELECTORS, last_srcset_url};
use reqwest::Url;
use scraper::{ElementRef, Html};

/// Fields read from a title's detail page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailFields {
    pub rating: Option<String>,
    pub synopsis: String,
    /// Absolute poster URL, if the page has a poster
    pub poster_url: Option<String>,
}

/// Read rating, synopsis and poster location from a detail page.
///
/// Absent values are `None`; a missing synopsis becomes the
/// [`missing_blurb`] placeholder so the synopsis is never empty.
#[must_use]
pub fn extract_details(document: &Html, detail_url: &str) -> DetailFields {
    let rating = document
        .select(&SELECTORS.rating)
        .next()
        .and_then(element_text);

    let synopsis = SELECTORS
        .plot
        .iter()
        .find_map(|marker| document.select(marker).find_map(element_text))
        .unwrap_or_else(|| missing_blurb(detail_url));

    let poster_url = document
        .select(&SELECTORS.poster)
        .next()
        .and_then(|img| {
            let value = img.value();
            value
                .attr("src")
                .map(str::trim)
                .filter(|src| !src.is_empty())
                .or_else(|| value.attr("srcset").and_then(last_srcset_url))
        })
        .map(|src| absolutize(detail_url, src));

    DetailFields {
        rating,
        synopsis,
        poster_url,
    }
}

/// Synopsis placeholder for a detail page without a plot
#[must_use]
pub fn missing_blurb(detail_url: &str) -> String {
    format!(r#"No blurb for title_url: <a href="{detail_url}">{detail_url}</a>"#)
}

/// The `ttNNN` identifier of a detail URL, used as the poster file stem
#[must_use]
pub fn title_id_stem(detail_url: &str) -> Option<String> {
    PATTERNS
        .title_id
        .captures(detail_url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

fn absolutize(base: &str, src: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(src))
        .map_or_else(|_| src.to_string(), String::from)
}
