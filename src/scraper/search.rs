//! Search-result extraction.
//!
//! The catalog answers the same query with different markup over time, so
//! each known markup is a [`SearchLayout`]. Layouts are tried in priority
//! order; the first one whose results container is on the page does the
//! extraction. A page no layout recognizes has no results.

use crate::scraper::{
    Page, Result, ScraperError, SearchCandidate,
    selectors::{PATTERNS, SELECTORS, collapse_whitespace, last_srcset_url},
};
use reqwest::Url;
use scraper::{ElementRef, Html};
use tracing::{debug, warn};

/// One markup variant of the search results page
pub trait SearchLayout: Send + Sync {
    /// Layout identifier used in logs and errors
    fn name(&self) -> &'static str;

    /// Whether this layout's results container is present
    fn detect(&self, document: &Html) -> bool;

    /// Extract candidates in page order
    fn extract(&self, document: &Html, origin: &Url) -> Result<Vec<SearchCandidate>>;
}

/// Older results page: a `table.findList` with one row per title
#[derive(Debug, Clone, Copy, Default)]
pub struct TableLayout;

impl TableLayout {
    fn extract_row(
        &self,
        index: usize,
        row: ElementRef<'_>,
        origin: &Url,
    ) -> Result<SearchCandidate> {
        let cells: Vec<ElementRef<'_>> = row.select(&SELECTORS.table_cell).collect();

        let image_url = cells
            .first()
            .and_then(|cell| cell.select(&SELECTORS.image).next())
            .and_then(|img| img.value().attr("src"))
            .ok_or_else(|| {
                ScraperError::drift(self.name(), format!("row {index}: no poster image"))
            })?;

        let link_cell = cells.get(1).ok_or_else(|| {
            ScraperError::drift(self.name(), format!("row {index}: no title cell"))
        })?;

        let href = link_cell
            .select(&SELECTORS.anchor)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| {
                ScraperError::drift(self.name(), format!("row {index}: no title link"))
            })?;

        let title_url = origin.join(href).map_err(|e| {
            ScraperError::drift(self.name(), format!("row {index}: bad link {href}: {e}"))
        })?;

        let text = collapse_whitespace(&link_cell.text().collect::<String>());

        Ok(SearchCandidate::new(image_url, title_url.as_str(), text))
    }
}

impl SearchLayout for TableLayout {
    fn name(&self) -> &'static str {
        "table"
    }

    fn detect(&self, document: &Html) -> bool {
        document.select(&SELECTORS.results_table).next().is_some()
    }

    fn extract(&self, document: &Html, origin: &Url) -> Result<Vec<SearchCandidate>> {
        let Some(table) = document.select(&SELECTORS.results_table).next() else {
            return Ok(Vec::new());
        };

        table
            .select(&SELECTORS.table_row)
            .enumerate()
            .map(|(index, row)| self.extract_row(index, row, origin))
            .collect()
    }
}

/// Current results page: a titles section holding a list of items
#[derive(Debug, Clone, Copy, Default)]
pub struct ListLayout;

impl ListLayout {
    fn extract_item(item: ElementRef<'_>, origin: &Url) -> Option<SearchCandidate> {
        let image_url = item
            .select(&SELECTORS.srcset_image)
            .next()
            .and_then(|img| img.value().attr("srcset"))
            .and_then(last_srcset_url)?;

        let title_url = item
            .select(&SELECTORS.anchor)
            .filter_map(|a| a.value().attr("href"))
            .find_map(|href| detail_url(origin, href))?;

        let text = collapse_whitespace(&item.text().collect::<String>());

        Some(SearchCandidate::new(image_url, title_url, text))
    }
}

impl SearchLayout for ListLayout {
    fn name(&self) -> &'static str {
        "list"
    }

    fn detect(&self, document: &Html) -> bool {
        document.select(&SELECTORS.results_section).next().is_some()
    }

    fn extract(&self, document: &Html, origin: &Url) -> Result<Vec<SearchCandidate>> {
        let Some(section) = document.select(&SELECTORS.results_section).next() else {
            return Ok(Vec::new());
        };

        let mut candidates = Vec::new();
        for (index, item) in section
            .select(&SELECTORS.list_item)
            .filter(|item| is_result_item(section, *item))
            .enumerate()
        {
            match Self::extract_item(item, origin) {
                Some(candidate) => candidates.push(candidate),
                None => warn!(
                    "Skipping {} item {}: no poster srcset or title link",
                    self.name(),
                    index
                ),
            }
        }

        Ok(candidates)
    }
}

/// Top-level result item: no other `li` between it and the section
fn is_result_item(section: ElementRef<'_>, item: ElementRef<'_>) -> bool {
    !item
        .ancestors()
        .take_while(|node| node.id() != section.id())
        .filter_map(|node| node.value().as_element())
        .any(|element| element.name() == "li")
}

/// Canonical detail URL (`{origin}/title/ttNNN/`) for a link, if it points at a title
fn detail_url(origin: &Url, href: &str) -> Option<String> {
    let resolved = origin.join(href).ok()?;
    let path = PATTERNS.detail_path.find(resolved.path())?;
    origin
        .join(&format!("{}/", path.as_str()))
        .ok()
        .map(String::from)
}

/// Search-results extractor over an ordered set of layouts
pub struct SearchExtractor {
    origin: Url,
    layouts: Vec<Box<dyn SearchLayout>>,
}

impl SearchExtractor {
    /// Extractor with the built-in layouts, table first
    #[must_use]
    pub fn new(origin: Url) -> Self {
        Self {
            origin,
            layouts: vec![Box::new(TableLayout), Box::new(ListLayout)],
        }
    }

    /// Extractor with no layouts; add them with [`SearchExtractor::add_layout`]
    #[must_use]
    pub fn empty(origin: Url) -> Self {
        Self {
            origin,
            layouts: Vec::new(),
        }
    }

    /// Append a layout at the lowest priority
    pub fn add_layout<L: SearchLayout + 'static>(&mut self, layout: L) {
        self.layouts.push(Box::new(layout));
    }

    /// Layout names in priority order
    pub fn layout_names(&self) -> Vec<&'static str> {
        self.layouts.iter().map(|l| l.name()).collect()
    }

    /// Extract candidates from a fetched search page
    pub fn extract_candidates(&self, page: &Page) -> Result<Vec<SearchCandidate>> {
        let document = page.document();
        self.extract_from(&document).inspect_err(|e| {
            warn!("Search page {} could not be read: {}", page.url, e);
        })
    }

    /// Extract candidates from an already parsed search page
    pub fn extract_from(&self, document: &Html) -> Result<Vec<SearchCandidate>> {
        for layout in &self.layouts {
            if layout.detect(document) {
                let candidates = layout.extract(document, &self.origin)?;
                debug!(
                    "Layout {} produced {} candidates",
                    layout.name(),
                    candidates.len()
                );
                return Ok(candidates);
            }
        }

        debug!("No known results layout on page");
        Ok(Vec::new())
    }
}
