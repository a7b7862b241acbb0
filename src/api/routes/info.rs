//! Metadata lookup handler.

use crate::api::AppState;
use crate::error::Result;
use crate::types::MediaInfo;
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};

use super::{InfoRequest, bad_body, required_url};

/// POST /api/info - Look up media metadata without downloading
#[utoipa::path(
    post,
    path = "/api/info",
    tag = "media",
    request_body = InfoRequest,
    responses(
        (status = 200, description = "Media metadata", body = MediaInfo),
        (status = 400, description = "Missing URL or unsupported site", body = crate::error::ApiError),
        (status = 500, description = "Metadata lookup failed", body = crate::error::ApiError)
    )
)]
pub async fn get_info(
    State(state): State<AppState>,
    payload: std::result::Result<Json<InfoRequest>, JsonRejection>,
) -> Result<Json<MediaInfo>> {
    let Json(body) = payload.map_err(bad_body)?;
    let url = required_url(body.url)?;

    let info = state.downloader.lookup_info(&url).await?;
    Ok(Json(info))
}
