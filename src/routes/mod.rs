use axum::Router;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::Ctx;

pub mod api;

/// Build the application router: JSON API under `/api`, stored posters under `/media`
pub fn router(ctx: Ctx) -> Router {
    let media = ServeDir::new(&ctx.config.media_root);

    Router::new()
        .nest("/api", api::mount())
        .nest_service("/media", media)
        .layer(TraceLayer::new_for_http())
        .with_state(ctx)
}

/// Public URL of a stored media-relative path
pub fn media_url(media_path: &str) -> String {
    format!("/media/{media_path}")
}
