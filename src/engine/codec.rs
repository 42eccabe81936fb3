//! Translation between logical list requests, wire parameters, and result envelopes.

use crate::config::Config;
use crate::models::{
    ColumnFilter, ListRequest, ListResult, ResultPagination, SortSpec, TransportPage, WireParams,
};

/// Encodes list requests and decodes transport payloads using caller defaults.
#[derive(Debug, Clone)]
pub struct QueryCodec {
    default_sort: SortSpec,
    default_page_size: u32,
}

impl QueryCodec {
    pub fn new(default_sort: SortSpec, default_page_size: u32) -> Self {
        Self {
            default_sort,
            default_page_size,
        }
    }

    /// A codec using the configured default sort and page size.
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.default_sort(), config.default_page_size)
    }

    pub fn default_sort(&self) -> &SortSpec {
        &self.default_sort
    }

    pub fn default_page_size(&self) -> u32 {
        self.default_page_size
    }

    /// Build wire parameters. The page index becomes 0-based; search and
    /// filters are only included when non-empty.
    pub fn encode(&self, request: &ListRequest) -> WireParams {
        let page_index = request
            .pagination
            .page_index
            .map(|i| i.saturating_sub(1))
            .unwrap_or(0);
        let page_size = request
            .pagination
            .page_size
            .filter(|s| *s > 0)
            .unwrap_or(self.default_page_size);

        let sort_column = request
            .sort_column
            .clone()
            .filter(|c| !c.is_empty())
            .or_else(|| self.default_sort.prop.clone())
            .unwrap_or_default();
        let sort_direction = request.sort_direction.unwrap_or(self.default_sort.dir);

        let global_search = request
            .global_search
            .as_ref()
            .filter(|s| !s.trim().is_empty())
            .cloned();

        let column_filters = if request.column_filters.is_empty() {
            None
        } else {
            encode_filters(&request.column_filters)
        };

        let dates = &request.date_filters;
        WireParams {
            page_index,
            page_size,
            sort_column,
            sort_direction,
            global_search,
            column_filters,
            modified_after: dates.modified_after.clone(),
            modified_before: dates.modified_before.clone(),
            created_after: dates.created_after.clone(),
            created_before: dates.created_before.clone(),
        }
    }

    /// Wrap a transport payload in a [`ListResult`] that echoes the request.
    ///
    /// `start_index` is the request's page, not anything the server reports,
    /// and `sorting` is the sort actually sent, defaults included.
    pub fn decode<T>(&self, payload: TransportPage<T>, request: &ListRequest) -> ListResult<T> {
        let wire = self.encode(request);
        ListResult {
            rows: payload.data,
            pagination: ResultPagination {
                start_index: request.page_index(),
                page_size: wire.page_size,
                total_count: payload.total_count,
            },
            search_text: request.global_search.clone().unwrap_or_default(),
            sorting: SortSpec {
                prop: Some(wire.sort_column).filter(|c| !c.is_empty()),
                dir: wire.sort_direction,
            },
            column_filters: request.column_filters.clone(),
            loaded: true,
            counters: payload.extra,
        }
    }
}

fn encode_filters(filters: &[ColumnFilter]) -> Option<String> {
    match serde_json::to_string(filters) {
        Ok(json) => Some(json),
        Err(e) => {
            // Plain data structs; serialization cannot fail in practice.
            tracing::warn!("Dropping column filters that failed to serialize: {}", e);
            None
        }
    }
}

/// Parse the JSON `columnFilters` wire parameter.
pub fn decode_filters(raw: Option<&str>) -> Result<Vec<ColumnFilter>, serde_json::Error> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        Some(json) => serde_json::from_str(json),
        None => Ok(Vec::new()),
    }
}
