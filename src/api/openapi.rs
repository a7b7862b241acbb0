//! OpenAPI documentation and schema generation
//!
//! This module defines the OpenAPI specification for the media-dl REST API
//! using utoipa for compile-time spec generation.

use utoipa::OpenApi;

/// OpenAPI documentation for the media-dl REST API
///
/// The spec can be accessed via:
/// - `/api/openapi.json` - JSON format OpenAPI specification
/// - `/swagger-ui` - Interactive Swagger UI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "media-dl REST API",
        version = "0.1.0",
        description = "Look up media metadata, start background downloads, poll their progress and fetch the finished files",
        license(
            name = "MIT OR Apache-2.0"
        )
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        // Media
        crate::api::routes::get_info,

        // Tasks
        crate::api::routes::start_download,
        crate::api::routes::get_status,
        crate::api::routes::download_file,

        // System
        crate::api::routes::health_check,
        crate::api::routes::openapi_spec,
        crate::api::routes::event_stream,
    ),
    components(schemas(
        // Core types from types.rs
        crate::types::TaskId,
        crate::types::TaskStatus,
        crate::types::Quality,
        crate::types::TaskSnapshot,
        crate::types::MediaInfo,
        crate::types::Event,

        // Config types from config.rs
        crate::config::Config,
        crate::config::DownloadConfig,
        crate::config::RetentionConfig,
        crate::config::FetcherConfig,
        crate::config::ApiConfig,

        // API request/response types from routes
        crate::api::routes::InfoRequest,
        crate::api::routes::DownloadRequestBody,
        crate::api::routes::StartDownloadResponse,

        // Error types from error.rs
        crate::error::ApiError,
        crate::error::ErrorDetail,
    )),
    tags(
        (name = "media", description = "Media metadata - Look up title, duration and uploader without downloading"),
        (name = "tasks", description = "Download tasks - Submit downloads, poll status, retrieve finished files"),
        (name = "system", description = "System endpoints - Health checks, OpenAPI spec, events"),
    )
)]
pub struct ApiDoc;
