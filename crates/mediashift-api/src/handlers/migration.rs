//! Migration endpoints: batch invocation, connectivity probe, status.

use crate::error::{log_error, status_of, HttpAppError};
use crate::state::{AppState, Offload};
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use mediashift_core::{AppError, BatchResult, ItemId};
use mediashift_services::catalog_statistics;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct BatchRequest {
    /// Scan cursor from the previous response's `next_cursor`.
    #[serde(default)]
    pub after: Option<ItemId>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BatchResponse {
    pub success: bool,
    pub migrated: u64,
    pub total: u64,
    pub errors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<ItemId>,
}

impl BatchResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            migrated: 0,
            total: 0,
            errors: Vec::new(),
            message: Some(message.into()),
            next_cursor: None,
        }
    }
}

impl From<BatchResult> for BatchResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            success: true,
            migrated: result.migrated,
            total: result.total,
            errors: result.errors,
            message: result.message,
            next_cursor: result.next_cursor,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConnectionResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub total: u64,
    pub local: u64,
    pub remote: u64,
    pub percentage: f64,
    pub configured: bool,
}

fn not_configured_message(reason: &str) -> String {
    format!("Offload is not configured: {}", reason)
}

/// Run one batch with the configured batch size.
///
/// `success` is false only when offload is not configured or the catalog could not
/// be scanned; per-item failures are listed in `errors` of a successful response.
#[tracing::instrument(skip(state, body))]
pub async fn migrate_batch(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<impl IntoResponse, HttpAppError> {
    let request: BatchRequest = if body.iter().all(u8::is_ascii_whitespace) {
        BatchRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(AppError::from)?
    };

    let services = match &state.offload {
        Offload::Ready(services) => services,
        Offload::NotConfigured(reason) => {
            return Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(BatchResponse::failure(not_configured_message(reason))),
            ));
        }
    };

    match services
        .engine
        .migrate_batch_from(request.after, services.batch_size)
        .await
    {
        Ok(result) => Ok((StatusCode::OK, Json(BatchResponse::from(result)))),
        Err(e) => {
            log_error(&e);
            Ok((status_of(&e), Json(BatchResponse::failure(e.to_string()))))
        }
    }
}

/// Probe the object store with the configured credentials.
#[tracing::instrument(skip(state))]
pub async fn test_connection(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match &state.offload {
        Offload::Ready(services) => {
            let report = services.probe.probe().await;
            (
                StatusCode::OK,
                Json(ConnectionResponse {
                    success: report.success,
                    message: report.message,
                }),
            )
        }
        Offload::NotConfigured(reason) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ConnectionResponse {
                success: false,
                message: not_configured_message(reason),
            }),
        ),
    }
}

/// Catalog statistics plus whether offload is configured.
#[tracing::instrument(skip(state))]
pub async fn migration_status(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, HttpAppError> {
    let stats = catalog_statistics(state.scanner.as_ref()).await?;

    Ok(Json(StatusResponse {
        total: stats.total,
        local: stats.local,
        remote: stats.remote,
        percentage: stats.percentage,
        configured: state.offload.is_configured(),
    }))
}
