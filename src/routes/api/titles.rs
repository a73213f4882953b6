use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};

use crate::{
    ApiError, ApiResponse, ApiResult, Ctx,
    entities::{TitleKind, TitleOrder, TitleRecord},
    routes::media_url,
};

/// One catalog entry as shown to clients
#[derive(Debug, Serialize, Deserialize)]
pub struct TitleView {
    #[serde(flatten)]
    pub record: TitleRecord,
    /// Rating with `N/A` for unrated titles
    pub rating_display: String,
    /// Poster URL under `/media`
    pub image_url: Option<String>,
}

impl From<TitleRecord> for TitleView {
    fn from(record: TitleRecord) -> Self {
        Self {
            rating_display: record.rating_or_na().to_string(),
            image_url: record.image.as_deref().map(media_url),
            record,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TitleList {
    pub items: Vec<TitleView>,
    pub total: usize,
}

impl From<Vec<TitleRecord>> for TitleList {
    fn from(records: Vec<TitleRecord>) -> Self {
        let items: Vec<TitleView> = records.into_iter().map(TitleView::from).collect();
        Self {
            total: items.len(),
            items,
        }
    }
}

/// Query parameters for listings
#[derive(Debug, Deserialize)]
pub struct ListQuery {
    /// title (default), mtime or rating
    #[serde(default)]
    pub order: TitleOrder,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: String,
}

async fn list_kind(ctx: &Ctx, kind: TitleKind, order: TitleOrder) -> ApiResult<TitleList> {
    let records = TitleRecord::list(&ctx.db, kind, order).await?;
    Ok(ApiResponse::ok(
        format!("{} titles retrieved successfully", records.len()),
        TitleList::from(records),
    ))
}

/// Get movies
async fn get_movies(
    State(ctx): State<Ctx>,
    Query(params): Query<ListQuery>,
) -> ApiResult<TitleList> {
    list_kind(&ctx, TitleKind::Movie, params.order).await
}

/// Get TV series
async fn get_tv(State(ctx): State<Ctx>, Query(params): Query<ListQuery>) -> ApiResult<TitleList> {
    list_kind(&ctx, TitleKind::Tv, params.order).await
}

/// Search both libraries by title substring
async fn search_titles(
    State(ctx): State<Ctx>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<TitleList> {
    if params.q.trim().is_empty() {
        return Err(ApiError::BadRequest("Search query must not be empty".to_string()).into());
    }

    let records = TitleRecord::search(&ctx.db, &params.q).await?;
    Ok(ApiResponse::ok(
        format!("{} titles match {}", records.len(), params.q.trim()),
        TitleList::from(records),
    ))
}

pub fn mount() -> Router<Ctx> {
    Router::new()
        .route("/movies", get(get_movies))
        .route("/tv", get(get_tv))
        .route("/search", get(search_titles))
}

#[cfg(test)]
mod tests {
    use crate::{
        entities::{NewTitle, TitleKind, TitleRecord},
        routes::test_support,
        scraper::testing::StaticFetcher,
    };
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tempfile::TempDir;

    async fn seed(ctx: &crate::Ctx, kind: TitleKind, title: &str, rating: Option<&str>, mtime: i64) {
        TitleRecord::create(
            &ctx.db,
            &NewTitle {
                kind,
                title: title.to_string(),
                rating: rating.map(str::to_string),
                blurb: "blurb".to_string(),
                imdb_title_url: None,
                find_results: "<ul></ul>".to_string(),
                image: Some(format!("title_images/{title}.jpg")),
                file_path: String::new(),
                file_mtime: mtime,
                file_ctime: mtime,
            },
        )
        .await
        .unwrap();
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_list_movies_by_rating() {
        let media = TempDir::new().unwrap();
        let ctx = test_support::ctx(StaticFetcher::new(), media.path()).await;
        seed(&ctx, TitleKind::Movie, "Harper", Some("7.1/10"), 1).await;
        seed(&ctx, TitleKind::Movie, "Argo", Some("7.7/10"), 2).await;
        seed(&ctx, TitleKind::Movie, "Obscure", None, 3).await;
        seed(&ctx, TitleKind::Tv, "Archer", Some("8.6/10"), 4).await;

        let response = test_support::send(ctx, get("/api/movies?order=rating")).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = test_support::json(response).await;
        assert_eq!(body["code"], 200);
        assert_eq!(body["data"]["total"], 3);
        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items[0]["title"], "Argo");
        assert_eq!(items[0]["kind"], "MO");
        assert_eq!(items[0]["image_url"], "/media/title_images/Argo.jpg");
        assert_eq!(items[2]["title"], "Obscure");
        assert_eq!(items[2]["rating_display"], "N/A");
    }

    #[tokio::test]
    async fn test_list_tv_by_mtime() {
        let media = TempDir::new().unwrap();
        let ctx = test_support::ctx(StaticFetcher::new(), media.path()).await;
        seed(&ctx, TitleKind::Tv, "Archer", None, 10).await;
        seed(&ctx, TitleKind::Tv, "Tosh.0", None, 20).await;

        let body = test_support::json(test_support::send(ctx, get("/api/tv?order=mtime")).await).await;

        let items = body["data"]["items"].as_array().unwrap();
        assert_eq!(items[0]["title"], "Tosh.0");
        assert_eq!(items[1]["title"], "Archer");
    }

    #[tokio::test]
    async fn test_search() {
        let media = TempDir::new().unwrap();
        let ctx = test_support::ctx(StaticFetcher::new(), media.path()).await;
        seed(&ctx, TitleKind::Tv, "Archer", None, 1).await;
        seed(&ctx, TitleKind::Movie, "Argo", None, 1).await;

        let body =
            test_support::json(test_support::send(ctx.clone(), get("/api/search?q=arch")).await)
                .await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["items"][0]["title"], "Archer");

        let response = test_support::send(ctx, get("/api/search?q=%20")).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_health() {
        let media = TempDir::new().unwrap();
        let ctx = test_support::ctx(StaticFetcher::new(), media.path()).await;
        seed(&ctx, TitleKind::Tv, "Archer", None, 1).await;

        let body = test_support::json(test_support::send(ctx, get("/api/health")).await).await;
        assert_eq!(body["data"]["tv"], 1);
        assert_eq!(body["data"]["movies"], 0);
    }
}
