//! Per-scope filter state endpoints.

use axum::{
    extract::{Path, State},
    Json,
};

use super::{error, success, ApiResult};
use crate::errors::AppError;
use crate::models::{FilterStatePatch, FilterStateRecord};
use crate::AppState;

/// GET /api/filter-state/:scope - The remembered state for a scope.
pub async fn get_filter_state(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<FilterStateRecord> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let record = state.filter_state.read().await.get(&scope).cloned();
    match record {
        Some(record) => success(record, revision_id),
        None => error(
            AppError::NotFound(format!("No filter state for scope {}", scope)),
            revision_id,
        ),
    }
}

/// PUT /api/filter-state/:scope - Shallow-merge a partial record.
pub async fn update_filter_state(
    State(state): State<AppState>,
    Path(scope): Path<String>,
    Json(patch): Json<FilterStatePatch>,
) -> ApiResult<FilterStateRecord> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let record = state
        .filter_state
        .write()
        .await
        .update(&scope, patch)
        .clone();
    success(record, revision_id)
}

/// DELETE /api/filter-state/:scope - Reset a scope's state.
pub async fn clear_filter_state(
    State(state): State<AppState>,
    Path(scope): Path<String>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if state.filter_state.write().await.clear(&scope).is_some() {
        tracing::debug!("Cleared filter state for scope {}", scope);
    }
    success((), revision_id)
}
