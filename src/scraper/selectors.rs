use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Pre-compiled CSS selectors for the catalog's markup
pub struct Selectors {
    // Tabular search results
    pub results_table: Selector, // table.findList
    pub table_row: Selector,
    pub table_cell: Selector,

    // List-based search results
    pub results_section: Selector, // section[data-testid=find-results-section-title]
    pub list_item: Selector,
    pub srcset_image: Selector,

    // Shared
    pub image: Selector,
    pub anchor: Selector,

    // Detail page markers
    pub rating: Selector,
    /// Plot markers, most complete first
    pub plot: Vec<Selector>,
    pub poster: Selector,
}

impl Selectors {
    pub fn new() -> Self {
        Self {
            results_table: parse("table.findList"),
            table_row: parse("tr"),
            table_cell: parse("td"),

            results_section: parse(r#"section[data-testid="find-results-section-title"]"#),
            list_item: parse("li"),
            srcset_image: parse("img[srcset]"),

            image: parse("img"),
            anchor: parse("a[href]"),

            rating: parse(r#"[data-testid="hero-rating-bar__aggregate-rating__score"]"#),
            plot: vec![
                parse(r#"[data-testid="plot-xl"]"#),
                parse(r#"[data-testid="plot-l"]"#),
                parse(r#"[data-testid="plot"]"#),
            ],
            poster: parse(r#"[data-testid="hero-media__poster"] img"#),
        }
    }
}

impl Default for Selectors {
    fn default() -> Self {
        Self::new()
    }
}

fn parse(selector: &str) -> Selector {
    Selector::parse(selector).unwrap_or_else(|e| panic!("Invalid selector {selector}: {e}"))
}

/// Pre-compiled URL path patterns
pub struct Patterns {
    /// Detail page path, e.g. `/title/tt1486217/`
    pub detail_path: Regex,
    /// Title identifier inside a detail path
    pub title_id: Regex,
    pub whitespace: Regex,
}

impl Patterns {
    pub fn new() -> Self {
        Self {
            detail_path: Regex::new(r"^/title/tt\d+").expect("Invalid detail_path regex"),
            title_id: Regex::new(r"/title/(tt\d+)").expect("Invalid title_id regex"),
            whitespace: Regex::new(r"\s+").expect("Invalid whitespace regex"),
        }
    }
}

impl Default for Patterns {
    fn default() -> Self {
        Self::new()
    }
}

pub static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);
pub static PATTERNS: LazyLock<Patterns> = LazyLock::new(Patterns::new);

/// Collapse every whitespace run to a single space and trim the ends
pub fn collapse_whitespace(text: &str) -> String {
    PATTERNS.whitespace.replace_all(text.trim(), " ").into_owned()
}

/// The last (largest) URL listed in a `srcset` attribute.
///
/// Candidates are separated by `", "`; a URL may itself contain commas
/// (`..._CR0,0,50,74_.jpg`), so a bare comma is not a separator.
pub fn last_srcset_url(srcset: &str) -> Option<&str> {
    srcset
        .trim()
        .trim_end_matches(',')
        .rsplit(", ")
        .next()
        .and_then(|candidate| candidate.split_whitespace().next())
        .filter(|url| !url.is_empty())
}
