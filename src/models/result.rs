//! Transport payload and the normalized list result envelope.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::{ColumnFilter, Row, SortSpec};

/// What a list transport returns: rows, a total count, and any
/// domain-specific counters riding alongside.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TransportPage<T = Row> {
    pub data: Vec<T>,
    #[serde(default)]
    pub total_count: u64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl<T> TransportPage<T> {
    pub fn new(data: Vec<T>, total_count: u64) -> Self {
        Self {
            data,
            total_count,
            extra: Map::new(),
        }
    }
}

/// Pagination echoed back to the caller.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ResultPagination {
    /// The 1-based page index of the originating request
    pub start_index: u32,
    pub page_size: u32,
    pub total_count: u64,
}

/// The normalized result of a list fetch.
///
/// `loaded` is false only before the first fetch completes, so callers can
/// tell "no rows" apart from "not fetched yet".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListResult<T = Row> {
    pub rows: Vec<T>,
    pub pagination: ResultPagination,
    pub search_text: String,
    pub sorting: SortSpec,
    pub column_filters: Vec<ColumnFilter>,
    pub loaded: bool,
    /// Pass-through counters from the transport payload
    #[serde(flatten)]
    pub counters: Map<String, Value>,
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self {
            rows: Vec::new(),
            pagination: ResultPagination::default(),
            search_text: String::new(),
            sorting: SortSpec::default(),
            column_filters: Vec::new(),
            loaded: false,
            counters: Map::new(),
        }
    }
}
