//! Sticky filter state remembered per navigation scope.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::{Row, SortSpec};

/// Row field compared against the `modified*` bounds.
pub const MODIFIED_FIELD: &str = "modified_at";
/// Row field compared against the `created*` bounds.
pub const CREATED_FIELD: &str = "created_at";

/// Inclusive date-range bounds on the modified and created timestamps.
///
/// Values are RFC 3339 timestamps or `YYYY-MM-DD` dates.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct DateFilters {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_before: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_before: Option<String>,
}

impl DateFilters {
    pub fn is_empty(&self) -> bool {
        self.modified_after.is_none()
            && self.modified_before.is_none()
            && self.created_after.is_none()
            && self.created_before.is_none()
    }

    /// Whether the row falls inside every bound that is set.
    ///
    /// A bound that cannot be parsed is ignored. A row whose date field is
    /// missing or unparseable fails any active bound on that field.
    pub fn matches(&self, row: &Row) -> bool {
        within(
            row,
            MODIFIED_FIELD,
            self.modified_after.as_deref(),
            self.modified_before.as_deref(),
        ) && within(
            row,
            CREATED_FIELD,
            self.created_after.as_deref(),
            self.created_before.as_deref(),
        )
    }
}

fn within(row: &Row, field: &str, after: Option<&str>, before: Option<&str>) -> bool {
    let after = after.and_then(parse_date);
    let before = before.and_then(parse_upper_bound);
    if after.is_none() && before.is_none() {
        return true;
    }

    let Some(value) = row.get(field).and_then(|v| v.as_str()).and_then(parse_date) else {
        return false;
    };

    after.map_or(true, |a| value >= a) && before.map_or(true, |b| value <= b)
}

/// Parse an RFC 3339 timestamp or a bare date (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Like [`parse_date`], but a bare date covers the whole day.
fn parse_upper_bound(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_nano_opt(23, 59, 59, 999_999_999))
        .map(|dt| dt.and_utc())
}

/// Last-used search, date filters, sort and item count for one scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterStateRecord {
    #[serde(default)]
    pub global_search: String,
    #[serde(default)]
    pub date_filters: DateFilters,
    #[serde(default)]
    pub sorting: SortSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
}

/// A partial record. Each present field replaces the stored one whole.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct FilterStatePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filters: Option<DateFilters>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sorting: Option<SortSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub item_count: Option<u32>,
}

impl FilterStatePatch {
    pub fn search(term: impl Into<String>) -> Self {
        Self {
            global_search: Some(term.into()),
            ..Self::default()
        }
    }

    pub fn sorting(sorting: SortSpec) -> Self {
        Self {
            sorting: Some(sorting),
            ..Self::default()
        }
    }

    pub fn date_filters(date_filters: DateFilters) -> Self {
        Self {
            date_filters: Some(date_filters),
            ..Self::default()
        }
    }
}
