//! Offset pagination primitives shared by the users backend.
//!
//! Inbound adapters receive raw `limit`/`offset` query parameters from
//! clients. [`PageRequest::from_query`] clamps those values into a window the
//! persistence layer can trust, so repositories never re-validate them.
//!
//! Clamping rules:
//!
//! - `limit` missing, unparsable, or `<= 0` falls back to [`DEFAULT_LIMIT`].
//! - `limit` above [`MAX_LIMIT`] is capped at [`MAX_LIMIT`].
//! - `offset` missing, unparsable, or negative falls back to `0`.
//!
//! # Examples
//!
//! ```
//! use pagination::{PageRequest, DEFAULT_LIMIT, MAX_LIMIT};
//!
//! let page = PageRequest::from_query(Some("250"), Some("-3"));
//! assert_eq!(page.limit(), MAX_LIMIT);
//! assert_eq!(page.offset(), 0);
//!
//! let page = PageRequest::from_query(None, Some("20"));
//! assert_eq!(page.limit(), DEFAULT_LIMIT);
//! assert_eq!(page.offset(), 20);
//! ```

use serde::{Deserialize, Serialize};

/// Page size used when the client does not supply a usable `limit`.
pub const DEFAULT_LIMIT: i64 = 10;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Errors raised when constructing a [`PageRequest`] from explicit values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PageRequestError {
    /// The requested limit was negative.
    #[error("page limit must not be negative (got {limit})")]
    NegativeLimit {
        /// Rejected limit value.
        limit: i64,
    },
    /// The requested offset was negative.
    #[error("page offset must not be negative (got {offset})")]
    NegativeOffset {
        /// Rejected offset value.
        offset: i64,
    },
}

/// A validated `limit`/`offset` window over an ordered result set.
///
/// ## Invariants
/// - `limit >= 0` and `offset >= 0`.
///
/// A zero limit is permitted and selects an empty page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PageRequestDto", into = "PageRequestDto")]
pub struct PageRequest {
    limit: i64,
    offset: i64,
}

impl PageRequest {
    /// Build a page request from explicit values.
    ///
    /// # Errors
    ///
    /// Returns [`PageRequestError`] when either value is negative.
    pub const fn new(limit: i64, offset: i64) -> Result<Self, PageRequestError> {
        if limit < 0 {
            return Err(PageRequestError::NegativeLimit { limit });
        }
        if offset < 0 {
            return Err(PageRequestError::NegativeOffset { offset });
        }
        Ok(Self { limit, offset })
    }

    /// Clamp already-parsed values into the accepted window.
    #[must_use]
    pub fn clamped(limit: Option<i64>, offset: Option<i64>) -> Self {
        let limit = match limit {
            Some(value) if value > 0 => value.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };
        let offset = offset.filter(|value| *value >= 0).unwrap_or(0);
        Self { limit, offset }
    }

    /// Clamp raw query-string values into the accepted window.
    ///
    /// Unparsable values are treated the same as missing ones.
    #[must_use]
    pub fn from_query(limit: Option<&str>, offset: Option<&str>) -> Self {
        Self::clamped(parse_param(limit), parse_param(offset))
    }

    /// Maximum number of rows in the page.
    #[must_use]
    pub const fn limit(&self) -> i64 {
        self.limit
    }

    /// Number of rows skipped before the page starts.
    #[must_use]
    pub const fn offset(&self) -> i64 {
        self.offset
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

fn parse_param(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct PageRequestDto {
    limit: i64,
    offset: i64,
}

impl From<PageRequest> for PageRequestDto {
    fn from(value: PageRequest) -> Self {
        Self {
            limit: value.limit,
            offset: value.offset,
        }
    }
}

impl TryFrom<PageRequestDto> for PageRequest {
    type Error = PageRequestError;

    fn try_from(value: PageRequestDto) -> Result<Self, Self::Error> {
        Self::new(value.limit, value.offset)
    }
}
