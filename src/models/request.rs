//! List request model and its wire form.

use serde::{Deserialize, Deserializer, Serialize};

use super::{ColumnFilter, DateFilters};

/// Sort direction. Anything that is not `asc` sorts descending.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse_lossy(raw: &str) -> Self {
        Self::parse_strict(raw).unwrap_or(SortDirection::Desc)
    }

    pub fn parse_strict(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }
}

impl<'de> Deserialize<'de> for SortDirection {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(SortDirection::parse_lossy)
            .unwrap_or_default())
    }
}

/// Sort column and direction. A missing `prop` means no explicit sort.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SortSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prop: Option<String>,
    #[serde(default)]
    pub dir: SortDirection,
}

impl SortSpec {
    pub fn new(prop: impl Into<String>, dir: SortDirection) -> Self {
        Self {
            prop: Some(prop.into()),
            dir,
        }
    }

    pub fn is_set(&self) -> bool {
        self.prop.as_deref().is_some_and(|p| !p.is_empty())
    }
}

/// Caller-facing pagination. `page_index` is 1-based.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
}

/// A logical list request, built fresh for every search, sort, page or filter change.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_column: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_direction: Option<SortDirection>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub column_filters: Vec<ColumnFilter>,
    #[serde(default, skip_serializing_if = "DateFilters::is_empty")]
    pub date_filters: DateFilters,
    #[serde(default)]
    pub pagination: PageRequest,
}

impl ListRequest {
    /// A request for one page with no search, sort or filters.
    pub fn page(page_index: u32, page_size: u32) -> Self {
        Self {
            pagination: PageRequest {
                page_index: Some(page_index),
                page_size: Some(page_size),
            },
            ..Self::default()
        }
    }

    pub fn with_search(mut self, term: impl Into<String>) -> Self {
        self.global_search = Some(term.into());
        self
    }

    pub fn with_sort(mut self, sort: SortSpec) -> Self {
        self.sort_column = sort.prop;
        self.sort_direction = Some(sort.dir);
        self
    }

    pub fn with_filters(mut self, filters: Vec<ColumnFilter>) -> Self {
        self.column_filters = filters;
        self
    }

    pub fn with_date_filters(mut self, date_filters: DateFilters) -> Self {
        self.date_filters = date_filters;
        self
    }

    /// The 1-based page the caller asked for, if any.
    pub fn page_index(&self) -> u32 {
        self.pagination.page_index.unwrap_or(1)
    }
}

/// Wire parameters sent to a list transport. `page_index` is 0-based.
///
/// Optional fields are omitted when empty so the transport's defaults apply.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WireParams {
    #[serde(default)]
    pub page_index: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub sort_column: String,
    #[serde(default)]
    pub sort_direction: SortDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_search: Option<String>,
    /// JSON-encoded `Vec<ColumnFilter>`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_filters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
}

impl WireParams {
    pub fn date_filters(&self) -> DateFilters {
        DateFilters {
            modified_after: self.modified_after.clone(),
            modified_before: self.modified_before.clone(),
            created_after: self.created_after.clone(),
            created_before: self.created_before.clone(),
        }
    }
}
