use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Form, Json,
};
use chrono::Utc;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    builder::HierarchyBuilder,
    document_store::save_document,
    error::AtlasError,
    models::{AddCliffRequest, AddCliffResponse, ErrorPayload},
    AppState,
};

pub async fn healthz() -> impl IntoResponse {
    Json(json!({ "ok": true, "timestamp": Utc::now() }))
}

pub async fn get_hierarchy(State(state): State<AppState>) -> impl IntoResponse {
    let hierarchy = state.hierarchy.lock().await;
    (StatusCode::OK, Json(hierarchy.clone())).into_response()
}

/// Adds one cliff and persists the document while holding the lock, so
/// concurrent adds cannot interleave their read-modify-write.
pub async fn add_cliff(
    State(state): State<AppState>,
    Form(payload): Form<AddCliffRequest>,
) -> impl IntoResponse {
    let mut hierarchy = state.hierarchy.lock().await;

    let mut updated = hierarchy.clone();
    let cliff_id = match HierarchyBuilder::new(&state.lookup, &mut updated).add_cliff(
        &state.config.country_id,
        &state.config.country_name,
        &payload,
    ) {
        Ok(id) => id,
        Err(err) => {
            if err.is_user_error() {
                warn!("Rejected cliff submission: {err}");
            } else {
                error!("Cliff submission failed: {err}");
            }
            return error_response(&err);
        }
    };

    if let Err(err) = save_document(&state.config.document_path, &updated).await {
        error!("Failed persisting document after adding {cliff_id}: {err:#}");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({
                "error": ErrorPayload {
                    code: "DOCUMENT_WRITE_FAILED".to_string(),
                    message: "Failed to save the climbing document.".to_string(),
                }
            })),
        )
            .into_response();
    }
    *hierarchy = updated;

    info!(cliff_id = %cliff_id, name = %payload.cliff_name, "Cliff added");
    let response = AddCliffResponse {
        message: format!("Cliff {} added", payload.cliff_name.trim()),
        cliff_id,
        created_at: Utc::now(),
    };
    (StatusCode::CREATED, Json(response)).into_response()
}

fn error_response(err: &AtlasError) -> Response {
    let status = if err.is_user_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (
        status,
        Json(json!({
            "error": ErrorPayload {
                code: err.code().to_string(),
                message: err.to_string(),
            }
        })),
    )
        .into_response()
}
