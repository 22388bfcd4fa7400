//! Search criteria construction and wire encoding.
//!
//! Canonical queries carry four optional temporal bounds, an offset/limit pair and a list
//! of equality or membership filters. The platform expects a `searchCriteria` structure:
//! AND-ed filter groups, sort orders and a 1-indexed page position.
//!
//! # Wire format
//!
//! ```text
//! searchCriteria[filterGroups][0][filters][0][field]=created_at
//! searchCriteria[filterGroups][0][filters][0][value]=2024-01-01 00:00:00
//! searchCriteria[filterGroups][0][filters][0][conditionType]=gteq
//! searchCriteria[sortOrders][0][field]=created_at
//! searchCriteria[sortOrders][0][direction]=DESC
//! searchCriteria[currentPage]=1
//! searchCriteria[pageSize]=10
//! ```
//!
//! # Examples
//!
//! ```
//! use m2_commerce_bridge::criteria::{QueryWindow, build_search_criteria, ids_filter};
//!
//! let window = QueryWindow { skip: Some(25), page_size: Some(10), ..Default::default() };
//! let filters = ids_filter("entity_id", &["a", "b", "c"]).into_iter().collect();
//! let criteria = build_search_criteria(&window, filters)?;
//!
//! assert_eq!(criteria.current_page, 3);
//! assert_eq!(criteria.filter_groups.as_ref().map(Vec::len), Some(1));
//! # Ok::<(), m2_commerce_bridge::BridgeError>(())
//! ```

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{BridgeError, Result};

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Native timestamp layout.
pub(crate) const NATIVE_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Filter condition understood by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionType {
    /// Equality.
    Eq,
    /// Inequality.
    Neq,
    /// Membership in a comma-separated list.
    In,
    /// Non-membership in a comma-separated list.
    Nin,
    /// Greater than.
    Gt,
    /// Greater than or equal.
    Gteq,
    /// Less than.
    Lt,
    /// Less than or equal.
    Lteq,
    /// SQL `LIKE` pattern.
    Like,
}

impl ConditionType {
    /// Returns the wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::In => "in",
            Self::Nin => "nin",
            Self::Gt => "gt",
            Self::Gteq => "gteq",
            Self::Lt => "lt",
            Self::Lteq => "lteq",
            Self::Like => "like",
        }
    }
}

impl fmt::Display for ConditionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Single native filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Filter {
    /// Native field name.
    pub field: String,
    /// Value, comma-joined for membership conditions.
    pub value: String,
    /// Condition.
    pub condition_type: ConditionType,
}

/// Filters inside a group are OR-ed; groups are AND-ed with each other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterGroup {
    /// Filters of this group. Groups built here always hold exactly one.
    pub filters: Vec<Filter>,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortDirection {
    /// Returns the wire token.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// Sort order entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Native field name.
    pub field: String,
    /// Direction.
    pub direction: SortDirection,
}

/// Native search criteria.
///
/// `filter_groups` is `None` rather than empty when nothing filters: the platform
/// treats an explicitly empty group list differently from no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchCriteria {
    /// AND-ed filter groups.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_groups: Option<Vec<FilterGroup>>,
    /// Sort orders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_orders: Option<Vec<SortOrder>>,
    /// 1-indexed page.
    pub current_page: u32,
    /// Page size.
    pub page_size: u32,
}

impl SearchCriteria {
    /// Criteria matching a single field, first page, default size.
    ///
    /// Used for by-id lookups.
    #[must_use]
    pub fn single(field: &str, value: impl Into<String>, condition: ConditionType) -> Self {
        Self {
            filter_groups: Some(vec![FilterGroup {
                filters: vec![Filter {
                    field: field.to_owned(),
                    value: value.into(),
                    condition_type: condition,
                }],
            }]),
            sort_orders: None,
            current_page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Returns the number of filter groups.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.filter_groups.as_ref().map_or(0, Vec::len)
    }

    /// Renames a field in every filter and sort order.
    ///
    /// Some resources name their timestamps differently (`date_requested` instead of
    /// `created_at`).
    #[must_use]
    pub fn with_field_renamed(mut self, from: &str, to: &str) -> Self {
        let filters = self.filter_groups.iter_mut().flatten().flat_map(|g| g.filters.iter_mut());
        for filter in filters.filter(|f| f.field == from) {
            to.clone_into(&mut filter.field);
        }
        for order in self.sort_orders.iter_mut().flatten().filter(|o| o.field == from) {
            to.clone_into(&mut order.field);
        }
        self
    }

    /// Encodes the criteria as ordered `(key, value)` query pairs.
    #[must_use]
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();

        for (g, group) in self.filter_groups.iter().flatten().enumerate() {
            for (f, filter) in group.filters.iter().enumerate() {
                let prefix = format!("searchCriteria[filterGroups][{g}][filters][{f}]");
                pairs.push((format!("{prefix}[field]"), filter.field.clone()));
                pairs.push((format!("{prefix}[value]"), filter.value.clone()));
                pairs.push((
                    format!("{prefix}[conditionType]"),
                    filter.condition_type.as_str().to_owned(),
                ));
            }
        }

        for (i, sort) in self.sort_orders.iter().flatten().enumerate() {
            pairs.push((format!("searchCriteria[sortOrders][{i}][field]"), sort.field.clone()));
            pairs.push((
                format!("searchCriteria[sortOrders][{i}][direction]"),
                sort.direction.as_str().to_owned(),
            ));
        }

        pairs.push(("searchCriteria[currentPage]".to_owned(), self.current_page.to_string()));
        pairs.push(("searchCriteria[pageSize]".to_owned(), self.page_size.to_string()));
        pairs
    }
}

/// Temporal bounds and paging shared by every canonical query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryWindow {
    /// Lower bound on creation time (ISO 8601).
    #[serde(default)]
    pub created_at_min: Option<String>,
    /// Upper bound on creation time (ISO 8601).
    #[serde(default)]
    pub created_at_max: Option<String>,
    /// Lower bound on update time (ISO 8601).
    #[serde(default)]
    pub updated_at_min: Option<String>,
    /// Upper bound on update time (ISO 8601).
    #[serde(default)]
    pub updated_at_max: Option<String>,
    /// Number of records to skip.
    #[serde(default)]
    pub skip: Option<u32>,
    /// Page size (default 10).
    #[serde(default)]
    pub page_size: Option<u32>,
}

/// Extra filter appended after the temporal bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtraFilter {
    /// Native field name.
    pub field: String,
    /// Value, or comma-joined values for membership.
    pub value: String,
    /// Condition.
    pub condition: ConditionType,
}

impl ExtraFilter {
    /// Equality filter.
    #[must_use]
    pub fn eq(field: &str, value: impl Into<String>) -> Self {
        Self { field: field.to_owned(), value: value.into(), condition: ConditionType::Eq }
    }
}

/// Membership filter over `ids`, comma-joined into a single filter.
///
/// Returns `None` for an empty list: an empty membership would match nothing, and
/// callers that require ids check that before building criteria.
///
/// # Examples
///
/// ```
/// use m2_commerce_bridge::criteria::{ConditionType, ids_filter};
///
/// let filter = ids_filter("entity_id", &["a", "b", "c"]).unwrap();
/// assert_eq!(filter.value, "a,b,c");
/// assert_eq!(filter.condition, ConditionType::In);
///
/// assert!(ids_filter::<&str>("entity_id", &[]).is_none());
/// ```
#[must_use]
pub fn ids_filter<S: AsRef<str>>(field: &str, ids: &[S]) -> Option<ExtraFilter> {
    if ids.is_empty() {
        return None;
    }
    let value = ids.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(",");
    Some(ExtraFilter { field: field.to_owned(), value, condition: ConditionType::In })
}

/// Builds native search criteria from a canonical query window and extra filters.
///
/// One filter group per present temporal bound, then one per extra filter, sorted
/// newest-created first, `current_page = skip / page_size + 1`.
///
/// # Errors
///
/// Returns [`BridgeError::Validation`] when `skip` lies beyond the last addressable page.
pub fn build_search_criteria(window: &QueryWindow, filters: Vec<ExtraFilter>) -> Result<SearchCriteria> {
    let bounds = [
        ("created_at", &window.created_at_min, ConditionType::Gteq),
        ("created_at", &window.created_at_max, ConditionType::Lteq),
        ("updated_at", &window.updated_at_min, ConditionType::Gteq),
        ("updated_at", &window.updated_at_max, ConditionType::Lteq),
    ];

    let mut groups: Vec<FilterGroup> = bounds
        .into_iter()
        .filter_map(|(field, bound, condition)| {
            bound.as_deref().map(|value| FilterGroup {
                filters: vec![Filter {
                    field: field.to_owned(),
                    value: normalize_timestamp(value),
                    condition_type: condition,
                }],
            })
        })
        .collect();

    groups.extend(filters.into_iter().map(|extra| FilterGroup {
        filters: vec![Filter {
            field: extra.field,
            value: extra.value,
            condition_type: extra.condition,
        }],
    }));

    let page_size = match window.page_size {
        Some(size) if size > 0 => size,
        _ => DEFAULT_PAGE_SIZE,
    };
    let skip = window.skip.unwrap_or(0);
    let current_page = (skip / page_size).checked_add(1).ok_or_else(|| {
        BridgeError::Validation(format!("skip {skip} is beyond the last page of size {page_size}"))
    })?;

    Ok(SearchCriteria {
        filter_groups: if groups.is_empty() { None } else { Some(groups) },
        sort_orders: Some(vec![SortOrder {
            field: "created_at".to_owned(),
            direction: SortDirection::Desc,
        }]),
        current_page,
        page_size,
    })
}

/// Converts an ISO 8601 datetime into the platform's `YYYY-MM-DD HH:MM:SS` UTC form.
///
/// Plain dates and unrecognised values pass through unchanged.
fn normalize_timestamp(value: &str) -> String {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return parsed.with_timezone(&Utc).format(NATIVE_DATETIME_FORMAT).to_string();
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return naive.format(NATIVE_DATETIME_FORMAT).to_string();
    }
    value.to_owned()
}

/// Appends encoded search criteria to a request path.
///
/// # Errors
///
/// Returns error if the path cannot be parsed as a URL path.
///
/// # Examples
///
/// ```
/// use m2_commerce_bridge::criteria::{ConditionType, SearchCriteria, build_path_with_criteria};
///
/// let criteria = SearchCriteria::single("sku", "MB01", ConditionType::Eq);
/// let path = build_path_with_criteria("/products", Some(&criteria))?;
/// assert!(path.starts_with("/products?searchCriteria%5BfilterGroups%5D%5B0%5D"));
/// # Ok::<(), m2_commerce_bridge::error::BridgeError>(())
/// ```
pub fn build_path_with_criteria(path: &str, criteria: Option<&SearchCriteria>) -> Result<String> {
    let Some(criteria) = criteria else {
        return Ok(path.to_owned());
    };

    let mut url = Url::parse(&format!("https://platform.invalid{path}"))
        .map_err(|e| BridgeError::InvalidInput(format!("invalid request path '{path}': {e}")))?;

    {
        let mut query_pairs = url.query_pairs_mut();
        for (key, value) in criteria.to_query_pairs() {
            query_pairs.append_pair(&key, &value);
        }
    }

    match url.query() {
        Some(query) if !query.is_empty() => Ok(format!("{}?{query}", url.path())),
        _ => Ok(url.path().to_owned()),
    }
}
