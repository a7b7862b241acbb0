//! Download task handlers: submit, poll, fetch the file.

use crate::api::AppState;
use crate::error::Result;
use crate::types::{Quality, TaskId, TaskSnapshot};
use axum::{
    Json,
    body::Body,
    extract::{Path, State, rejection::JsonRejection},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;

use super::{DownloadRequestBody, StartDownloadResponse, bad_body, required_url};

/// POST /api/download - Start a background download
#[utoipa::path(
    post,
    path = "/api/download",
    tag = "tasks",
    request_body = DownloadRequestBody,
    responses(
        (status = 200, description = "Download accepted", body = StartDownloadResponse),
        (status = 400, description = "Missing URL", body = crate::error::ApiError),
        (status = 503, description = "Server is shutting down", body = crate::error::ApiError)
    )
)]
pub async fn start_download(
    State(state): State<AppState>,
    payload: std::result::Result<Json<DownloadRequestBody>, JsonRejection>,
) -> Result<Json<StartDownloadResponse>> {
    let Json(body) = payload.map_err(bad_body)?;
    let url = required_url(body.url)?;
    let quality = Quality::parse(body.quality.as_deref());

    let task_id = state.downloader.submit(&url, quality)?;
    Ok(Json(StartDownloadResponse {
        task_id,
        status: "started".to_string(),
    }))
}

/// GET /api/status/:task_id - Poll a task
#[utoipa::path(
    get,
    path = "/api/status/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "Task ID returned by POST /api/download")
    ),
    responses(
        (status = 200, description = "Current task state", body = TaskSnapshot),
        (status = 404, description = "Unknown task", body = crate::error::ApiError)
    )
)]
pub async fn get_status(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Json<TaskSnapshot>> {
    let snapshot = state.downloader.status(&TaskId::from(task_id))?;
    Ok(Json(snapshot))
}

/// GET /api/download-file/:task_id - Stream a completed task's file
#[utoipa::path(
    get,
    path = "/api/download-file/{task_id}",
    tag = "tasks",
    params(
        ("task_id" = String, Path, description = "Task ID returned by POST /api/download")
    ),
    responses(
        (status = 200, description = "The downloaded file as an attachment", content_type = "application/octet-stream"),
        (status = 400, description = "Task has not completed", body = crate::error::ApiError),
        (status = 404, description = "Unknown task or file no longer on disk", body = crate::error::ApiError)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(task_id): Path<String>,
) -> Result<Response> {
    let id = TaskId::from(task_id);
    let (path, filename) = state.downloader.completed_file(&id).await?;

    let file = match tokio::fs::File::open(&path).await {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(crate::Error::FileMissing { id, path });
        }
        Err(e) => return Err(e.into()),
    };
    let len = file.metadata().await?.len();

    tracing::debug!(task_id = %id, filename = %filename, bytes = len, "Serving file");

    let mut response = Body::from_stream(ReaderStream::new(file)).into_response();
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));
    if let Ok(value) = HeaderValue::from_str(&content_disposition(&filename)) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
    Ok(response)
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    )
}
