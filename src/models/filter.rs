//! Column filter model shared by the client-computed and server-computed list paths.

use serde::{Deserialize, Deserializer, Serialize};

/// The predicate a single filter condition applies to a field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ConditionKind {
    Contains,
    DoesNotContain,
    Equals,
    DoesNotEqual,
    BeginsWith,
    EndsWith,
    IsBlank,
    IsNotBlank,
}

/// One condition of a column filter, matched against a set of tags.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterCondition {
    #[serde(rename = "type")]
    pub kind: ConditionKind,
    #[serde(default)]
    pub search_tags: Vec<String>,
}

impl FilterCondition {
    pub fn new<I, S>(kind: ConditionKind, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            search_tags: tags.into_iter().map(Into::into).collect(),
        }
    }
}

/// How the column's filter widget collects tags.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum FilterType {
    #[default]
    Text,
    MultiText,
}

/// How the conditions of one column filter are combined.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterOperator {
    And,
    #[default]
    Or,
}

impl FilterOperator {
    /// Anything other than exactly `"and"` combines with OR.
    pub fn parse_lossy(raw: &str) -> Self {
        if raw == "and" {
            FilterOperator::And
        } else {
            FilterOperator::Or
        }
    }
}

impl<'de> Deserialize<'de> for FilterOperator {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(FilterOperator::parse_lossy)
            .unwrap_or_default())
    }
}

/// A per-column predicate made of one or more conditions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ColumnFilter {
    pub column_name: String,
    #[serde(default)]
    pub filter_type: FilterType,
    #[serde(default)]
    pub conditions: Vec<FilterCondition>,
    #[serde(default)]
    pub operator: FilterOperator,
}

impl ColumnFilter {
    pub fn new(column_name: impl Into<String>, conditions: Vec<FilterCondition>) -> Self {
        Self {
            column_name: column_name.into(),
            filter_type: FilterType::Text,
            conditions,
            operator: FilterOperator::Or,
        }
    }

    pub fn with_operator(mut self, operator: FilterOperator) -> Self {
        self.operator = operator;
        self
    }

    /// A filter without conditions is ignored.
    pub fn is_active(&self) -> bool {
        !self.conditions.is_empty()
    }
}
