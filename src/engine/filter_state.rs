//! Sticky search, sort and date-filter state per navigation scope.
//!
//! A scope is a table name, project id or persona name. Records are created on
//! first write and live for the session.

use std::collections::HashMap;

use crate::models::{FilterStatePatch, FilterStateRecord, ListRequest, PageRequest, SortSpec};

#[derive(Debug, Default)]
pub struct FilterStateStore {
    records: HashMap<String, FilterStateRecord>,
}

impl FilterStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, scope: &str) -> Option<&FilterStateRecord> {
        self.records.get(scope)
    }

    /// Merge `patch` into the scope's record, one top-level field at a time.
    ///
    /// A present `date_filters` replaces the stored date filters whole.
    pub fn update(&mut self, scope: &str, patch: FilterStatePatch) -> &FilterStateRecord {
        let record = self.records.entry(scope.to_string()).or_default();
        if let Some(global_search) = patch.global_search {
            record.global_search = global_search;
        }
        if let Some(date_filters) = patch.date_filters {
            record.date_filters = date_filters;
        }
        if let Some(sorting) = patch.sorting {
            record.sorting = sorting;
        }
        if let Some(item_count) = patch.item_count {
            record.item_count = Some(item_count);
        }
        record
    }

    /// Forget the scope, e.g. when the filter UI is reset.
    pub fn clear(&mut self, scope: &str) -> Option<FilterStateRecord> {
        self.records.remove(scope)
    }

    /// Remember the search, sort, date filters and page size of a request.
    pub fn remember(&mut self, scope: &str, request: &ListRequest) {
        let sorting = request.sort_column.as_ref().map(|prop| SortSpec {
            prop: Some(prop.clone()),
            dir: request.sort_direction.unwrap_or_default(),
        });
        self.update(
            scope,
            FilterStatePatch {
                global_search: Some(request.global_search.clone().unwrap_or_default()),
                date_filters: Some(request.date_filters.clone()),
                sorting,
                item_count: request.pagination.page_size,
            },
        );
    }

    /// Rebuild a first-page request from the scope's remembered state.
    pub fn restore(&self, scope: &str) -> Option<ListRequest> {
        let record = self.get(scope)?;
        let global_search = Some(record.global_search.clone()).filter(|s| !s.is_empty());
        let (sort_column, sort_direction) = if record.sorting.is_set() {
            (record.sorting.prop.clone(), Some(record.sorting.dir))
        } else {
            (None, None)
        };

        Some(ListRequest {
            global_search,
            sort_column,
            sort_direction,
            column_filters: Vec::new(),
            date_filters: record.date_filters.clone(),
            pagination: PageRequest {
                page_index: Some(1),
                page_size: record.item_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateFilters, SortDirection};

    #[test]
    fn test_get_unknown_scope() {
        let store = FilterStateStore::new();
        assert!(store.get("proj-1").is_none());
        assert!(store.restore("proj-1").is_none());
    }

    #[test]
    fn test_update_preserves_untouched_fields() {
        let mut store = FilterStateStore::new();
        store.update("proj-1", FilterStatePatch::search("q"));
        store.update(
            "proj-1",
            FilterStatePatch::sorting(SortSpec::new("name", SortDirection::Desc)),
        );

        let record = store.get("proj-1").unwrap();
        assert_eq!(record.global_search, "q");
        assert_eq!(record.sorting, SortSpec::new("name", SortDirection::Desc));
    }

    #[test]
    fn test_date_filters_replace_whole_object() {
        let mut store = FilterStateStore::new();
        store.update(
            "vendors",
            FilterStatePatch::date_filters(DateFilters {
                modified_after: Some("2024-01-01".to_string()),
                created_before: Some("2024-06-01".to_string()),
                ..DateFilters::default()
            }),
        );
        store.update(
            "vendors",
            FilterStatePatch::date_filters(DateFilters {
                modified_before: Some("2024-02-01".to_string()),
                ..DateFilters::default()
            }),
        );

        let dates = &store.get("vendors").unwrap().date_filters;
        assert!(dates.modified_after.is_none());
        assert!(dates.created_before.is_none());
        assert_eq!(dates.modified_before.as_deref(), Some("2024-02-01"));
    }

    #[test]
    fn test_scopes_are_independent_and_clearable() {
        let mut store = FilterStateStore::new();
        store.update("Home", FilterStatePatch::search("a"));
        store.update("Finance", FilterStatePatch::search("b"));

        assert!(store.clear("Home").is_some());
        assert!(store.get("Home").is_none());
        assert_eq!(store.get("Finance").unwrap().global_search, "b");
    }

    #[test]
    fn test_remember_and_restore_round_trip() {
        let mut store = FilterStateStore::new();
        let request = ListRequest::page(3, 50)
            .with_search("acme")
            .with_sort(SortSpec::new("name", SortDirection::Asc));
        store.remember("applications", &request);

        let restored = store.restore("applications").unwrap();
        assert_eq!(restored.global_search.as_deref(), Some("acme"));
        assert_eq!(restored.sort_column.as_deref(), Some("name"));
        assert_eq!(restored.sort_direction, Some(SortDirection::Asc));
        assert_eq!(restored.pagination.page_index, Some(1));
        assert_eq!(restored.pagination.page_size, Some(50));
    }

    #[test]
    fn test_remember_without_sort_keeps_previous_sort() {
        let mut store = FilterStateStore::new();
        store.update(
            "apps",
            FilterStatePatch::sorting(SortSpec::new("owner", SortDirection::Asc)),
        );
        store.remember("apps", &ListRequest::page(1, 25).with_search("x"));

        let record = store.get("apps").unwrap();
        assert_eq!(record.sorting, SortSpec::new("owner", SortDirection::Asc));
        assert_eq!(record.item_count, Some(25));
    }
}
