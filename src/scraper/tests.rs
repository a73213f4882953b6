//! Scraper pipeline tests

#[cfg(test)]
mod resolver_tests {
    use crate::scraper::testing::StaticFetcher;
    use crate::scraper::{
        ImageStore, NO_TITLES_FOUND, Resolver, ScraperError, TitleDetails, missing_blurb,
    };
    use std::sync::Arc;
    use tempfile::TempDir;

    const ORIGIN: &str = "https://www.imdb.com";
    const SEARCH_TABLE: &str = include_str!("fixtures/search_table.html");
    const SEARCH_LIST: &str = include_str!("fixtures/search_list.html");
    const SEARCH_EMPTY: &str = include_str!("fixtures/search_empty.html");
    const TITLE_ARCHER: &str = include_str!("fixtures/title_archer.html");
    const TITLE_BARE: &str = include_str!("fixtures/title_bare.html");

    const ARCHER_SEARCH: &str = "https://www.imdb.com/find?q=Archer";
    const ARCHER_DETAIL: &str = "https://www.imdb.com/title/tt1486217/?ref_=fn_al_tt_1";
    const ARCHER_POSTER: &str =
        "https://m.media-amazon.com/images/M/archer_poster._V1_QL75_UX190_CR0,0,190,281_.jpg";

    fn resolver(fetcher: Arc<StaticFetcher>, media: &TempDir) -> Resolver {
        let images = ImageStore::new(media.path(), "title_images");
        Resolver::new(fetcher, images, ORIGIN).unwrap()
    }

    #[test]
    fn test_search_url_joins_words_with_plus() {
        let media = TempDir::new().unwrap();
        let resolver = resolver(Arc::new(StaticFetcher::new()), &media);

        assert_eq!(
            resolver.search_url("The Bourne Legacy 2012"),
            "https://www.imdb.com/find?q=The+Bourne+Legacy+2012"
        );
        assert_eq!(
            resolver.search_url("Tosh.0"),
            "https://www.imdb.com/find?q=Tosh.0"
        );
        assert_eq!(
            resolver.search_url("AT&T  Archives"),
            "https://www.imdb.com/find?q=AT%26T+Archives"
        );
    }

    #[tokio::test]
    async fn test_resolve_full_flow() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(ARCHER_SEARCH, SEARCH_TABLE)
                .with_page(ARCHER_DETAIL, TITLE_ARCHER)
                .with_bytes(ARCHER_POSTER, b"\xFF\xD8archer".to_vec()),
        );
        let resolver = resolver(fetcher.clone(), &media);

        let result = resolver.resolve("Archer").await.unwrap();

        assert_eq!(result.title, "Archer");
        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.picked_url(), Some(ARCHER_DETAIL));
        assert_eq!(result.details.rating.as_deref(), Some("8.6/10"));
        assert!(
            result
                .details
                .synopsis
                .starts_with("Covert black ops and espionage")
        );
        assert!(result.details.synopsis.ends_with("secret agents and drones."));

        let image = result.details.image.clone().unwrap();
        assert_eq!(image, media.path().join("title_images").join("tt1486217.jpg"));
        assert_eq!(std::fs::read(&image).unwrap(), b"\xFF\xD8archer");

        assert_eq!(fetcher.calls(), 3);
        assert_eq!(
            fetcher.requests(),
            vec![ARCHER_SEARCH, ARCHER_DETAIL, ARCHER_POSTER]
        );

        assert!(result.find_results_html().starts_with(
            "<ul><li><a href=\"https://www.imdb.com/title/tt1486217/?ref_=fn_al_tt_1\">Archer (2009) (TV Series)</a></li>\n"
        ));
        assert_eq!(result.candidates[1].text, "Archer (1985) (TV Movie)");
    }

    #[tokio::test]
    async fn test_resolve_list_layout() {
        let media = TempDir::new().unwrap();
        let detail = "https://www.imdb.com/title/tt1430587/";
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page("https://www.imdb.com/find?q=Tosh.0", SEARCH_LIST)
                .with_page(detail, TITLE_BARE),
        );
        let resolver = resolver(fetcher.clone(), &media);

        let result = resolver.resolve("Tosh.0").await.unwrap();

        assert_eq!(result.candidates.len(), 2);
        assert_eq!(result.candidates[0].title_url, detail);
        assert_eq!(
            result.candidates[0].image_url,
            "https://m.media-amazon.com/images/M/tosh._V1_QL75_UX100_CR0,0,100,148_.jpg"
        );
        assert_eq!(result.candidates[0].text, "Tosh.0 2009–2020 TV Series");
        assert_eq!(result.candidates[1].text, "Tosh.0 Hoodies 2011");
        assert_eq!(fetcher.page_calls(), 2);
    }

    #[tokio::test]
    async fn test_zero_candidates_is_single_fetch() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(
            StaticFetcher::new().with_page("https://www.imdb.com/find?q=qwzxv", SEARCH_EMPTY),
        );
        let resolver = resolver(fetcher.clone(), &media);

        let result = resolver.resolve("qwzxv").await.unwrap();

        assert!(result.candidates.is_empty());
        assert_eq!(result.details, TitleDetails::not_found());
        assert_eq!(result.details.synopsis, NO_TITLES_FOUND);
        assert_eq!(result.find_results_html(), "<ul></ul>");
        assert_eq!(fetcher.calls(), 1);
    }

    #[tokio::test]
    async fn test_bare_detail_page_has_no_rating_or_image() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::new().with_page(ARCHER_DETAIL, TITLE_BARE));
        let resolver = resolver(fetcher.clone(), &media);

        let details = resolver.title_details(ARCHER_DETAIL).await.unwrap();

        assert_eq!(details.rating, None);
        assert_eq!(details.rating_or_na(), "N/A");
        assert_eq!(details.synopsis, missing_blurb(ARCHER_DETAIL));
        assert_eq!(details.image, None);
        assert_eq!(fetcher.byte_calls(), 0);
    }

    #[tokio::test]
    async fn test_detail_fetch_failure_propagates() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::new().with_page(ARCHER_SEARCH, SEARCH_TABLE));
        let resolver = resolver(fetcher.clone(), &media);

        let err = resolver.resolve("Archer").await.unwrap_err();

        assert!(err.is_fetch());
        assert_eq!(fetcher.page_calls(), 2);
    }

    #[tokio::test]
    async fn test_poster_fetch_failure_propagates_without_file() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(
            StaticFetcher::new()
                .with_page(ARCHER_SEARCH, SEARCH_TABLE)
                .with_page(ARCHER_DETAIL, TITLE_ARCHER),
        );
        let resolver = resolver(fetcher.clone(), &media);

        let err = resolver.resolve("Archer").await.unwrap_err();

        assert!(matches!(err, ScraperError::Fetch(_)));
        assert!(!media.path().join("title_images").join("tt1486217.jpg").exists());
    }

    #[tokio::test]
    async fn test_search_page_failure_propagates() {
        let media = TempDir::new().unwrap();
        let fetcher = Arc::new(StaticFetcher::new());
        let resolver = resolver(fetcher.clone(), &media);

        assert!(resolver.resolve("Archer").await.unwrap_err().is_fetch());
        assert_eq!(fetcher.calls(), 1);
    }

    #[test]
    fn test_invalid_origin_is_rejected() {
        let media = TempDir::new().unwrap();
        let images = ImageStore::new(media.path(), "title_images");
        let err = Resolver::new(Arc::new(StaticFetcher::new()), images, "not an origin");
        assert!(err.is_err());
    }
}
