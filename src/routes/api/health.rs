use axum::{Router, extract::State, routing::get};
use serde::Serialize;

use crate::{
    ApiResponse, ApiResult, Ctx,
    entities::{TitleKind, TitleRecord},
};

#[derive(Debug, Serialize)]
pub struct Health {
    pub movies: i64,
    pub tv: i64,
}

/// Liveness plus catalog size
async fn health(State(ctx): State<Ctx>) -> ApiResult<Health> {
    let movies = TitleRecord::count(&ctx.db, TitleKind::Movie).await?;
    let tv = TitleRecord::count(&ctx.db, TitleKind::Tv).await?;

    Ok(ApiResponse::ok("OK", Health { movies, tv }))
}

pub fn mount() -> Router<Ctx> {
    Router::new().route("/health", get(health))
}
