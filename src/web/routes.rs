//! HTTP routes of the browser gateway.
//!
//! Every handler goes through the file service with the configured acquire
//! timeout; error kinds map to 503, 404, and 500.

use axum::extract::{DefaultBodyLimit, Multipart, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{info, warn};
use serde::Deserialize;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::time::sleep;

use crate::config::LimitsConfig;
use crate::error::FileServiceError;
use crate::error::handlers::error_to_status;
use crate::service::FileService;
use crate::web::page::{content_disposition, render_index};

/// Headroom for multipart boundaries and part headers on top of the file.
const MULTIPART_OVERHEAD: usize = 64 * 1024;

/// Shared server state injected into all handlers.
#[derive(Clone)]
pub struct WebState {
    pub service: FileService,
    pub limits: Arc<LimitsConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DownloadParams {
    filename: Option<String>,
}

pub fn router(service: FileService, limits: LimitsConfig) -> Router {
    let body_limit = usize::try_from(limits.max_upload_bytes())
        .unwrap_or(usize::MAX)
        .saturating_add(MULTIPART_OVERHEAD);

    let state = WebState {
        service,
        limits: Arc::new(limits),
    };

    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .route("/download", get(download))
        .route("/api/files", get(list_json))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Serve the browser gateway on an already bound listener.
pub async fn serve(
    listener: TcpListener,
    service: FileService,
    limits: LimitsConfig,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!("Starting web gateway on {}", addr);
    }
    axum::serve(listener, router(service, limits)).await
}

async fn index(State(state): State<WebState>) -> Response {
    match state
        .service
        .list_files(sleep(state.limits.acquire_timeout()))
        .await
    {
        Ok(listing) => Html(render_index(&listing)).into_response(),
        Err(e) => error_response(&e),
    }
}

async fn list_json(State(state): State<WebState>) -> Response {
    match state
        .service
        .list_files(sleep(state.limits.acquire_timeout()))
        .await
    {
        Ok(listing) => Json(listing).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Accepts the `file` field of a multipart form and redirects to the list.
async fn upload(State(state): State<WebState>, mut multipart: Multipart) -> Response {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read upload form: {}", e);
                return e.into_response();
            }
        };

        if field.name() != Some("file") {
            continue;
        }

        let filename = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => return (StatusCode::BAD_REQUEST, "Missing file name").into_response(),
        };

        let content = match field.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                warn!("Failed to read upload of {}: {}", filename, e);
                return e.into_response();
            }
        };

        return match state
            .service
            .upload(&filename, content, sleep(state.limits.acquire_timeout()))
            .await
        {
            Ok(_) => (StatusCode::FOUND, [(header::LOCATION, "/")]).into_response(),
            Err(e) => error_response(&e),
        };
    }

    (StatusCode::BAD_REQUEST, "Missing file field").into_response()
}

async fn download(
    State(state): State<WebState>,
    Query(params): Query<DownloadParams>,
) -> Response {
    let filename = match params.filename {
        Some(name) if !name.is_empty() => name,
        _ => return (StatusCode::BAD_REQUEST, "Missing filename").into_response(),
    };

    match state
        .service
        .download(&filename, sleep(state.limits.acquire_timeout()))
        .await
    {
        Ok(response) => (
            [
                (header::CONTENT_TYPE, "application/octet-stream".to_string()),
                (header::CONTENT_DISPOSITION, content_disposition(&filename)),
            ],
            response.content,
        )
            .into_response(),
        Err(e) => error_response(&e),
    }
}

fn error_response(err: &FileServiceError) -> Response {
    (error_to_status(err), err.to_string()).into_response()
}
