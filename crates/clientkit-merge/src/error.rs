//! Merge error types.

/// Errors returned by [`crate::Merger::merge`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MergeError {
    /// Destination or a source is not a record. Raised before any mutation.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Deep merge nested past the configured limit.
    #[error("merge depth {depth} exceeds the limit of {limit}")]
    RecursionLimitExceeded { depth: usize, limit: usize },
}
