//! Query criteria and paginated projections for the read side

use crate::{CustomerId, Folder, FolderStatus};

/// Page size used when a caller does not ask for one
pub const DEFAULT_PER_PAGE: u32 = 10;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    /// Smallest first
    Ascending,
    /// Largest first
    #[default]
    Descending,
}

impl SortDirection {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Ascending => "ASC",
            SortDirection::Descending => "DESC",
        }
    }
}

/// Which page of results to return
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-based page number
    pub page: u32,
    /// Items per page
    pub per_page: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
        }
    }
}

impl PageRequest {
    /// Request a specific page
    pub fn new(page: u32, per_page: u32) -> Self {
        Self { page, per_page }
    }

    /// Clamp to page >= 1 and 1 <= per_page <= max_per_page
    pub fn clamped(self, max_per_page: u32) -> Self {
        Self {
            page: self.page.max(1),
            per_page: self.per_page.clamp(1, max_per_page.max(1)),
        }
    }

    /// Number of rows to skip
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }
}

/// Columns a folder listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FolderSort {
    /// Folder number
    Number,
    /// Container number
    ContainerNumber,
    /// Total weight
    Weight,
    /// Harbor
    Harbor,
    /// Lifecycle position (Open first)
    Status,
    /// Opening date
    #[default]
    CreatedAt,
    /// Customer regulatory id
    Customer,
}

/// Criteria for folder listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FolderQuery {
    /// Only folders in this status
    pub status: Option<FolderStatus>,
    /// Only folders of this customer
    pub customer_id: Option<CustomerId>,
    /// Case-insensitive substring over folder number, harbor, container
    /// number and customer regulatory id
    pub search: Option<String>,
    /// Sort column
    pub sort: FolderSort,
    /// Sort direction
    pub direction: SortDirection,
    /// Page to return
    pub page: PageRequest,
}

impl FolderQuery {
    /// Search text, trimmed, or `None` when blank
    pub fn search_text(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

/// One row of a folder listing: Folder joined with its customer and
/// declaration
#[derive(Debug, Clone, PartialEq)]
pub struct FolderRow {
    /// The folder itself
    pub folder: Folder,
    /// Owning customer's regulatory id
    pub customer_regulatory_id: String,
    /// Owning customer's full name
    pub customer_name: String,
    /// Declaration number, once filed
    pub declaration_number: Option<String>,
}

/// Columns a customer listing can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CustomerSort {
    /// Regulatory id
    RegulatoryId,
    /// Last name, then first name
    Name,
    /// Phone number
    Phone,
    /// E-mail address
    Email,
    /// Active flag
    Active,
    /// Onboarding date
    #[default]
    CreatedAt,
}

/// Criteria for customer listings
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomerQuery {
    /// Case-insensitive substring over regulatory id, names, phone and e-mail
    pub search: Option<String>,
    /// Only active (`Some(true)`) or deactivated (`Some(false)`) customers
    pub active: Option<bool>,
    /// Sort column
    pub sort: CustomerSort,
    /// Sort direction
    pub direction: SortDirection,
    /// Page to return
    pub page: PageRequest,
}

impl CustomerQuery {
    /// Search text, trimmed, or `None` when blank
    pub fn search_text(&self) -> Option<&str> {
        non_blank(self.search.as_deref())
    }
}

/// A page of results
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows matching the query across all pages
    pub total: u64,
    /// 1-based page number
    pub page: u32,
    /// Page size used
    pub per_page: u32,
}

impl<T> Page<T> {
    /// Number of pages needed for `total` rows
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            return 0;
        }
        self.total.div_ceil(u64::from(self.per_page))
    }

    /// Whether a later page exists
    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}
