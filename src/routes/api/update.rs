use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::{AppError, Ctx, entities::TitleKind, routes::media_url};

/// Re-resolve a title against a detail URL the user picked
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateRequest {
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub title: String,
    /// `TV` or `MO` (also `tv`, `movie`)
    pub video_type: String,
    #[validate(url(message = "url must be an absolute URL"))]
    pub url: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum UpdateResponse {
    Updated {
        rating: String,
        blurb: String,
        #[serde(rename = "image-url")]
        image_url: Option<String>,
    },
    Failed {
        error: String,
    },
}

impl UpdateResponse {
    fn failed(status: StatusCode, error: impl Into<String>) -> (StatusCode, Json<Self>) {
        (
            status,
            Json(Self::Failed {
                error: error.into(),
            }),
        )
    }
}

async fn update_title(
    State(ctx): State<Ctx>,
    body: Result<Json<UpdateRequest>, JsonRejection>,
) -> (StatusCode, Json<UpdateResponse>) {
    let req = match body {
        Ok(Json(req)) => req,
        Err(rejection) => {
            return UpdateResponse::failed(rejection.status(), rejection.body_text());
        }
    };

    if let Err(e) = req.validate() {
        return UpdateResponse::failed(StatusCode::UNPROCESSABLE_ENTITY, e.to_string());
    }

    let kind = match req.video_type.parse::<TitleKind>() {
        Ok(kind) => kind,
        Err(e) => return UpdateResponse::failed(StatusCode::UNPROCESSABLE_ENTITY, e),
    };

    match ctx
        .catalog_agent
        .refresh_title(&req.title, kind, &req.url)
        .await
    {
        Ok(record) => (
            StatusCode::OK,
            Json(UpdateResponse::Updated {
                rating: record.rating_or_na().to_string(),
                blurb: record.blurb,
                image_url: record.image.as_deref().map(media_url),
            }),
        ),
        Err(e) => {
            let e = AppError::from(e);
            warn!("Update of {} ({}) failed: {}", req.title, kind, e);
            UpdateResponse::failed(e.status(), e.to_string())
        }
    }
}

pub fn mount() -> Router<Ctx> {
    Router::new().route("/update", post(update_title))
}
