//! Client-side filter, sort and pagination over a dataset held in memory.
//!
//! The same evaluation backs the server-computed list endpoint, so both paths
//! agree on what a search term or column filter matches.

use std::cmp::Ordering;

use serde_json::Value;

use crate::models::{ColumnFilter, ConditionKind, FilterOperator, Row, SortDirection, SortSpec};

/// Message reported when the requested page has no rows.
pub const NO_RECORDS_MESSAGE: &str = "No records found";

/// Fields concatenated when a column holds an array of people.
const PERSON_FIELDS: [&str; 3] = ["fullname_preferred", "email", "network_id"];

/// Resolves a row's value for a column name. Supports computed columns.
pub type FieldResolver<'a> = &'a dyn Fn(&Row, &str) -> Value;

/// Which slice of the filtered rows to return. `page_number` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSpec {
    pub page_number: usize,
    pub page_size: usize,
}

impl PageSpec {
    pub fn new(page_number: usize, page_size: usize) -> Self {
        Self {
            page_number,
            page_size,
        }
    }
}

/// Result of [`evaluate`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    /// The requested page
    pub data: Vec<Row>,
    pub total_count: usize,
    pub total_pages: usize,
    /// Every row that passed search and filters, sorted, before paging
    pub completed_filter_data: Vec<Row>,
    /// Empty when `data` has rows, otherwise [`NO_RECORDS_MESSAGE`]
    pub error_message: String,
}

/// Normalize a value for matching: lowercase, trimmed text.
///
/// Arrays are treated as lists of people; each element contributes its
/// preferred name, email and network id, concatenated without separators.
pub fn normalize(value: &Value) -> String {
    let text = match value {
        Value::Array(items) => items.iter().map(person_text).collect::<String>(),
        other => scalar_text(other),
    };
    text.trim().to_lowercase()
}

fn person_text(item: &Value) -> String {
    match item {
        Value::Object(person) => PERSON_FIELDS
            .iter()
            .filter_map(|field| person.get(*field))
            .map(scalar_text)
            .collect(),
        other => scalar_text(other),
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn resolve(row: &Row, key: &str, resolver: Option<FieldResolver<'_>>) -> Value {
    match resolver {
        Some(resolve) => resolve(row, key),
        None => row.get(key).cloned().unwrap_or(Value::Null),
    }
}

/// A column filter with its tags normalized once up front.
struct PreparedFilter<'a> {
    column: &'a str,
    operator: FilterOperator,
    conditions: Vec<(ConditionKind, Vec<String>)>,
}

impl<'a> PreparedFilter<'a> {
    fn new(filter: &'a ColumnFilter) -> Self {
        Self {
            column: &filter.column_name,
            operator: filter.operator,
            conditions: filter
                .conditions
                .iter()
                .map(|c| {
                    let tags = c
                        .search_tags
                        .iter()
                        .map(|t| t.trim().to_lowercase())
                        .collect();
                    (c.kind, tags)
                })
                .collect(),
        }
    }

    fn matches(&self, field: &str) -> bool {
        let mut results = self
            .conditions
            .iter()
            .map(|(kind, tags)| condition_matches(*kind, tags, field));
        match self.operator {
            FilterOperator::And => results.all(|r| r),
            FilterOperator::Or => results.any(|r| r),
        }
    }
}

fn condition_matches(kind: ConditionKind, tags: &[String], field: &str) -> bool {
    match kind {
        ConditionKind::Contains => tags.iter().any(|t| field.contains(t.as_str())),
        ConditionKind::DoesNotContain => !tags.iter().any(|t| field.contains(t.as_str())),
        ConditionKind::Equals => tags.iter().any(|t| field == t),
        ConditionKind::DoesNotEqual => !tags.iter().any(|t| field == t),
        ConditionKind::BeginsWith => tags.iter().any(|t| field.starts_with(t.as_str())),
        ConditionKind::EndsWith => tags.iter().any(|t| field.ends_with(t.as_str())),
        ConditionKind::IsBlank => field.is_empty(),
        ConditionKind::IsNotBlank => !field.is_empty(),
    }
}

fn matches_search(row: &Row, term: &str, resolver: Option<FieldResolver<'_>>) -> bool {
    row.keys()
        .any(|key| normalize(&resolve(row, key, resolver)).contains(term))
}

/// Filter, sort and paginate `data`.
///
/// Never fails: absent fields normalize to an empty string and simply fail
/// substring predicates.
pub fn evaluate(
    data: &[Row],
    search_term: &str,
    column_filters: &[ColumnFilter],
    page: PageSpec,
    sort: Option<&SortSpec>,
    resolver: Option<FieldResolver<'_>>,
) -> FilterOutcome {
    let term = search_term.trim().to_lowercase();
    let filters: Vec<PreparedFilter<'_>> = column_filters
        .iter()
        .filter(|f| f.is_active())
        .map(PreparedFilter::new)
        .collect();

    let mut filtered: Vec<Row> = data
        .iter()
        .filter(|row| term.is_empty() || matches_search(row, &term, resolver))
        .filter(|row| {
            filters.iter().all(|filter| {
                let field = normalize(&resolve(row, filter.column, resolver));
                filter.matches(&field)
            })
        })
        .cloned()
        .collect();

    if let Some(sort) = sort.filter(|s| s.is_set()) {
        let prop = sort.prop.as_deref().unwrap_or_default();
        let mut keyed: Vec<(String, Row)> = filtered
            .into_iter()
            .map(|row| (normalize(&resolve(&row, prop, resolver)), row))
            .collect();
        keyed.sort_by(|(a, _), (b, _)| {
            let ordering: Ordering = a.cmp(b);
            match sort.dir {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            }
        });
        filtered = keyed.into_iter().map(|(_, row)| row).collect();
    }

    let total_count = filtered.len();
    let total_pages = if page.page_size == 0 {
        0
    } else {
        total_count.div_ceil(page.page_size)
    };

    let start = page
        .page_number
        .saturating_sub(1)
        .saturating_mul(page.page_size);
    let end = start.saturating_add(page.page_size).min(total_count);
    let page_rows = if start < end {
        filtered[start..end].to_vec()
    } else {
        Vec::new()
    };

    let error_message = if page_rows.is_empty() {
        NO_RECORDS_MESSAGE.to_string()
    } else {
        String::new()
    };

    FilterOutcome {
        data: page_rows,
        total_count,
        total_pages,
        completed_filter_data: filtered,
        error_message,
    }
}
