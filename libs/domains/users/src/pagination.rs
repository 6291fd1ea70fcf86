//! Page arithmetic shared by every paginated listing.
//!
//! Storage independent: the caller counts matching records, [`paginate`] turns
//! that count plus the requested page into skip/limit values and the response
//! envelope.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const DEFAULT_SIZE: u64 = 10;
pub const FIRST_PAGE: u64 = 1;

/// Requested page, as bound from the query string. Absent or non-positive
/// values fall back to [`FIRST_PAGE`] and [`DEFAULT_SIZE`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PaginationOptions {
    pub page: Option<i64>,
    pub size: Option<i64>,
}

impl PaginationOptions {
    pub fn new(page: i64, size: i64) -> Self {
        Self {
            page: Some(page),
            size: Some(size),
        }
    }

    pub fn page(&self) -> u64 {
        positive_or(self.page, FIRST_PAGE)
    }

    pub fn size(&self) -> u64 {
        positive_or(self.size, DEFAULT_SIZE)
    }
}

fn positive_or(value: Option<i64>, default: u64) -> u64 {
    match value {
        Some(v) if v > 0 => v as u64,
        _ => default,
    }
}

/// Response envelope describing one slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Paginated {
    /// Records matching the filters across all pages
    pub total_count: u64,
    pub total_pages: u64,
    pub current_page: u64,
    pub size: u64,
    /// True while `currentPage < totalPages`
    pub has_more: bool,
}

/// Page metadata plus the skip/limit needed to fetch the slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageDescriptor {
    pub envelope: Paginated,
    /// `(currentPage - 1) * size`, unclamped
    pub skip: u64,
}

impl PageDescriptor {
    pub fn limit(&self) -> u64 {
        self.envelope.size
    }

    /// The skip to hand to the store, never past the end of the result set.
    ///
    /// A page beyond the last one still runs the query and yields an empty
    /// slice, while the envelope keeps the unclamped numbers.
    pub fn effective_skip(&self) -> u64 {
        self.skip.min(self.envelope.total_count)
    }
}

/// Computes the page envelope for `total_count` matching records.
pub fn paginate(total_count: u64, opts: PaginationOptions) -> PageDescriptor {
    let current_page = opts.page();
    let size = opts.size();
    let total_pages = (total_count as f64 / size as f64).ceil() as u64;

    PageDescriptor {
        envelope: Paginated {
            total_count,
            total_pages,
            current_page,
            size,
            has_more: current_page < total_pages,
        },
        skip: (current_page - 1).saturating_mul(size),
    }
}
