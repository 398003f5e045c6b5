use serde::{Deserialize, Deserializer, Serialize};

/// Smallest page size a list request may ask for.
pub const MIN_PAGE_LIMIT: i64 = 5;

/// Sort direction for queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Case-insensitive parse; anything other than `asc`/`desc` is `None`.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

impl std::fmt::Display for SortDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_sql())
    }
}

/// 1-based pagination request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginateReq {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_page() -> i64 {
    1
}

fn default_limit() -> i64 {
    MIN_PAGE_LIMIT
}

impl Default for PaginateReq {
    fn default() -> Self {
        Self {
            page: default_page(),
            limit: default_limit(),
        }
    }
}

impl PaginateReq {
    pub fn new(page: i64, limit: i64) -> Self {
        Self { page, limit }
    }

    /// Coerces `page` to at least 1 and `limit` to at least [`MIN_PAGE_LIMIT`].
    ///
    /// Request handlers call this before handing a filter to a repository;
    /// the query builder trusts the values it receives.
    pub fn normalized(self) -> Self {
        Self {
            page: self.page.max(1),
            limit: self.limit.max(MIN_PAGE_LIMIT),
        }
    }

    /// `(page - 1) * limit`, saturating at `i64::MAX` for absurd page numbers.
    pub fn offset(&self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Caller-facing sort request. Both fields are free text and are resolved
/// against a per-entity whitelist.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortReq {
    #[serde(default)]
    pub order_by: String,
    #[serde(default)]
    pub sort: String,
}

impl SortReq {
    pub fn new(order_by: impl Into<String>, sort: impl Into<String>) -> Self {
        Self {
            order_by: order_by.into(),
            sort: sort.into(),
        }
    }
}

/// One page of a list result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub limit: i64,
    pub total_item: i64,
    pub total_page: i64,
}

impl<T> Page<T> {
    pub fn new(data: Vec<T>, paginate: PaginateReq, total_item: i64) -> Self {
        Self {
            data,
            page: paginate.page,
            limit: paginate.limit,
            total_item,
            total_page: total_pages(total_item, paginate.limit),
        }
    }

    pub fn empty(paginate: PaginateReq) -> Self {
        Self::new(Vec::new(), paginate, 0)
    }
}

/// `ceil(total_item / limit)`; zero when `limit` is not positive.
pub fn total_pages(total_item: i64, limit: i64) -> i64 {
    if limit <= 0 || total_item <= 0 {
        return 0;
    }
    total_item / limit + i64::from(total_item % limit != 0)
}

/// Current UTC time in the store's `CURRENT_TIMESTAMP` format.
pub(crate) fn timestamp_now() -> String {
    chrono::Utc::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Treats an explicit JSON `null` the same as a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Returns the trimmed value when it is not blank.
pub(crate) fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
