use axum::Router;

use crate::Ctx;

pub mod health;
pub mod titles;
pub mod update;

/// Mount all API routes
pub fn mount() -> Router<Ctx> {
    Router::new()
        .merge(health::mount())
        .merge(titles::mount())
        .merge(update::mount())
}
