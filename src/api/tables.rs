//! Generic table endpoints, including the server-computed list path.

use axum::{
    extract::{rejection::QueryRejection, Path, Query, State},
    Json,
};
use serde_json::json;

use super::{error, success, ApiResult};
use crate::engine::{decode_filters, evaluate, PageSpec};
use crate::errors::AppError;
use crate::models::{InsertRowsRequest, Row, SortSpec, TableSummary, TransportPage, WireParams};
use crate::AppState;

/// Longest accepted table name.
const MAX_TABLE_NAME_LEN: usize = 64;

/// Table names appear in URL paths, so keep them to a safe alphabet.
pub fn validate_table_name(name: &str) -> Result<(), AppError> {
    let valid = !name.is_empty()
        && name.len() <= MAX_TABLE_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid table name '{}'", name)))
    }
}

/// GET /api/tables - List tables with their row counts.
pub async fn list_tables(State(state): State<AppState>) -> ApiResult<Vec<TableSummary>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_tables().await {
        Ok(tables) => success(tables, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/tables/:table/rows - One filtered, sorted page of a table.
///
/// Responds with the bare transport envelope `{ data, totalCount, totalPages }`.
pub async fn list_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    params: Result<Query<WireParams>, QueryRejection>,
) -> Result<Json<TransportPage>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(e.body_text()))?;
    validate_table_name(&table)?;
    let filters = decode_filters(params.column_filters.as_deref())?;

    let page_size = match params.page_size {
        0 => state.codec.default_page_size(),
        size => size,
    };
    let sort = if params.sort_column.is_empty() {
        state.codec.default_sort().clone()
    } else {
        SortSpec::new(params.sort_column.clone(), params.sort_direction)
    };

    let date_filters = params.date_filters();
    let rows: Vec<Row> = state
        .repo
        .list_rows(&table)
        .await?
        .into_iter()
        .filter(|row| date_filters.matches(row))
        .collect();

    let outcome = evaluate(
        &rows,
        params.global_search.as_deref().unwrap_or_default(),
        &filters,
        PageSpec::new(params.page_index as usize + 1, page_size as usize),
        Some(&sort),
        None,
    );

    tracing::debug!(
        table = %table,
        page_index = params.page_index,
        page_size,
        total = outcome.total_count,
        "Served list page"
    );

    let mut page = TransportPage::new(outcome.data, outcome.total_count as u64);
    page.extra
        .insert("totalPages".to_string(), json!(outcome.total_pages));
    Ok(Json(page))
}

/// POST /api/tables/:table/rows - Insert or replace one row or a batch.
pub async fn insert_rows(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Json(request): Json<InsertRowsRequest>,
) -> ApiResult<Vec<Row>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = validate_table_name(&table) {
        return error(e, revision_id);
    }

    let rows = request.into_rows();
    if rows.is_empty() {
        return error(
            AppError::Validation("No rows provided".to_string()),
            revision_id,
        );
    }

    match state.repo.upsert_rows(&table, rows).await {
        Ok(stored) => {
            tracing::info!("Stored {} rows in table {}", stored.len(), table);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(stored, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}

/// DELETE /api/tables/:table/rows/:id - Delete one row.
pub async fn delete_row(
    State(state): State<AppState>,
    Path((table, id)): Path<(String, String)>,
) -> ApiResult<()> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = validate_table_name(&table) {
        return error(e, revision_id);
    }

    match state.repo.delete_row(&table, &id).await {
        Ok(()) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success((), new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
