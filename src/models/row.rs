//! Generic table rows.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A row of any table: field name to JSON value.
pub type Row = Map<String, Value>;

/// Body of a row insert: one object or a list of them.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum InsertRowsRequest {
    One(Row),
    Many(Vec<Row>),
}

impl InsertRowsRequest {
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            InsertRowsRequest::One(row) => vec![row],
            InsertRowsRequest::Many(rows) => rows,
        }
    }
}

/// A table known to the row store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TableSummary {
    pub name: String,
    pub row_count: i64,
}

