//! Shared pagination utilities
//!
//! Pages are 1-indexed. The default and maximum page sizes come from
//! configuration through [`PageLimits`].
//!
//! ```rust,ignore
//! let params = PaginationParams::new(Some(2), Some(20));
//! params.validate(limits)?;
//! let offset = params.offset(limits);
//!
//! // After fetching data...
//! let metadata = PaginationMetadata::new(params.page(), params.per_page(limits), total);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Page size used when a request does not specify one
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest page size a request may ask for
pub const MAX_PAGE_SIZE: i64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLimits {
    pub default_per_page: i64,
    pub max_per_page: i64,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_per_page: DEFAULT_PAGE_SIZE,
            max_per_page: MAX_PAGE_SIZE,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PaginationError {
    #[error("Page can't be less than 1, was '{0}'")]
    InvalidPage(i64),

    #[error("Page size must be between 1 and {max}, was '{value}'")]
    InvalidPerPage { value: i64, max: i64 },
}

/// Page request parameters, usually taken from the query string
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PaginationParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<i64>,
}

impl PaginationParams {
    pub fn new(page: Option<i64>, per_page: Option<i64>) -> Self {
        Self { page, per_page }
    }

    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    pub fn per_page(&self, limits: PageLimits) -> i64 {
        self.per_page
            .unwrap_or(limits.default_per_page)
            .clamp(1, limits.max_per_page)
    }

    /// Offset for the SQL OFFSET clause
    pub fn offset(&self, limits: PageLimits) -> i64 {
        (self.page() - 1) * self.per_page(limits)
    }

    pub fn validate(&self, limits: PageLimits) -> Result<(), PaginationError> {
        if let Some(page) = self.page {
            if page < 1 {
                return Err(PaginationError::InvalidPage(page));
            }
        }
        if let Some(per_page) = self.per_page {
            if per_page < 1 || per_page > limits.max_per_page {
                return Err(PaginationError::InvalidPerPage {
                    value: per_page,
                    max: limits.max_per_page,
                });
            }
        }
        Ok(())
    }
}

/// Pagination metadata for list responses
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationMetadata {
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub pages: i64,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMetadata {
    pub fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total <= 0 {
            0
        } else {
            (total + per_page - 1) / per_page
        };

        Self {
            page,
            per_page,
            total,
            pages,
            has_next: page < pages,
            has_prev: page > 1,
        }
    }
}
