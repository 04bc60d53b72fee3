//! Error types for domain parsing.

use thiserror::Error;

/// Errors raised while parsing domain values from user or upstream input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// The asset string is neither `native` nor `CODE:ISSUER`.
    #[error("invalid asset identifier: {0}")]
    InvalidAsset(String),
    /// The pool sort order is not one of the supported orders.
    #[error("unknown sort order: {0}")]
    UnknownSortOrder(String),
    /// The chart metric is not one of the supported metrics.
    #[error("unknown chart metric: {0}")]
    UnknownMetric(String),
}
