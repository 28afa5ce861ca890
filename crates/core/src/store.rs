//! Persistence boundary primitives shared by every store trait.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type returned by persistence adapters.
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistence operation error.
///
/// These are **infrastructure errors** (missing records, lost races, backend
/// failures) as opposed to domain errors. `Insufficient` is reported by the
/// atomic stock adjustment so the check and the write happen under one lock.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} {id} already exists")]
    Duplicate { entity: &'static str, id: String },

    #[error("write conflict: {0}")]
    Conflict(String),

    #[error("stock for {id} would go negative (requested {requested}, available {available})")]
    Insufficient {
        id: String,
        requested: i64,
        available: i64,
    },

    #[error("backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}

/// One-based page request.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(page: u32, limit: u32) -> Self {
        Self { page, limit }
    }

    /// Replace zero values with page 1 / the given default limit.
    pub fn normalized(self, default_limit: u32) -> Self {
        Self {
            page: self.page.max(1),
            limit: if self.limit == 0 {
                default_limit.max(1)
            } else {
                self.limit
            },
        }
    }

    /// Number of records to skip.
    pub fn offset(&self) -> usize {
        (self.page.max(1) as usize - 1) * self.limit as usize
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// A page of records plus the total number of matches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
}

impl<T> Page<T> {
    /// Slice an already filtered + ordered list.
    pub fn from_sorted(all: Vec<T>, request: PageRequest) -> Self {
        let total = all.len();
        let items = all
            .into_iter()
            .skip(request.offset())
            .take(request.limit as usize)
            .collect();
        Self { items, total }
    }
}
