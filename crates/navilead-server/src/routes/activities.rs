//! Dashboard activity routes

use axum::{Json, Router, extract::rejection::JsonRejection, routing::post};
use navilead::{ActivityFeed, build_feed};

use crate::{
    AppState,
    error::Result,
    models::{ActivityFeedRequest, ApiResponse},
};

pub fn router() -> Router<AppState> {
    Router::new().route("/feed", post(activity_feed))
}

async fn activity_feed(
    payload: std::result::Result<Json<ActivityFeedRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<ActivityFeed>>> {
    let Json(request) = payload?;
    Ok(Json(ApiResponse::new(build_feed(request.records, request.limit))))
}
