//! Filter, sort, and pagination vocabulary for stamp listings.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Default page size when neither the request nor the user's preferences
/// specify one.
pub const DEFAULT_PAGE_SIZE: i64 = 50;

/// Ownership filter for stamp listings.
///
/// A design is "owned" when it has at least one non-deleted instance and
/// "needed" otherwise.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnedFilter {
    #[default]
    Any,
    Owned,
    Needed,
}

impl OwnedFilter {
    /// Resolve the filter from request parameters.
    ///
    /// Accepts both the legacy `owned=true|false` flag and the newer
    /// `owned_filter=all|owned|needed` parameter; anything unrecognized
    /// means no filtering.
    pub fn from_params(owned: Option<&str>, owned_filter: Option<&str>) -> Self {
        match owned {
            Some("true") => return Self::Owned,
            Some("false") => return Self::Needed,
            _ => {}
        }
        match owned_filter {
            Some("owned") => Self::Owned,
            Some("needed") => Self::Needed,
            _ => Self::Any,
        }
    }
}

/// Sort key for stamp listings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    /// Catalog-number ordering: numeric prefixes sort numerically, the rest
    /// lexically after them. The default.
    #[default]
    ScottNumber,
    Name,
    IssueDate,
    DateAdded,
}

impl SortKey {
    /// Parse a sort key, falling back to the catalog-number default for
    /// unknown or missing values.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("name") => Self::Name,
            Some("issue_date") => Self::IssueDate,
            Some("date_added") => Self::DateAdded,
            _ => Self::ScottNumber,
        }
    }
}

/// Sort direction, clamped to ASC/DESC (default ASC).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a direction, case-insensitively; anything but DESC is ASC.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(value) if value.eq_ignore_ascii_case("desc") => Self::Desc,
            _ => Self::Asc,
        }
    }

    /// SQL keyword for this direction.
    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// All filter parameters for one stamp listing query.
#[derive(Clone, Debug)]
pub struct StampFilters {
    /// Case-insensitive substring match across name / scott_number / series.
    pub search: Option<String>,
    pub owned: OwnedFilter,
    /// Restrict to designs with a non-deleted instance in this box.
    pub box_id: Option<Uuid>,
    pub sort: SortKey,
    pub order: SortDirection,
    pub limit: i64,
    pub offset: i64,
}

impl Default for StampFilters {
    fn default() -> Self {
        Self::for_page(1, DEFAULT_PAGE_SIZE)
    }
}

impl StampFilters {
    /// Unfiltered listing for one page. `page` and `limit` are clamped to 1.
    pub fn for_page(page: i64, limit: i64) -> Self {
        let page = page.max(1);
        let limit = limit.max(1);
        Self {
            search: None,
            owned: OwnedFilter::Any,
            box_id: None,
            sort: SortKey::default(),
            order: SortDirection::default(),
            limit,
            offset: (page - 1) * limit,
        }
    }
}
