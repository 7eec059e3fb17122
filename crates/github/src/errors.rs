#[cfg(test)]
#[path = "errors_tests.rs"]
mod tests;

/// Error types for GitHub API operations.
///
/// These cover the transport-level failures that can occur while fetching
/// check-runs and commit statuses. They are deliberately never coerced to
/// a "not failed" verdict by callers: a broken fetch must surface, since
/// swallowing it would let broken CI merge silently.
///
/// # Examples
///
/// ```rust
/// use merge_sentinel_github::errors::Error;
///
/// let rate_limit = Error::RateLimitExceeded;
/// assert_eq!(rate_limit.to_string(), "Rate limit exceeded");
/// ```
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Generic API request failure.
    ///
    /// An API call to GitHub failed for an unspecified reason. Used as a
    /// fallback when more specific error information is not available.
    #[error("API request failed")]
    ApiError(),

    /// Authentication failed.
    ///
    /// The provided credentials (personal token or app credentials) are
    /// invalid, expired, or insufficient for the requested operation.
    /// The string parameter carries additional detail.
    #[error("Authentication failed: {0}")]
    AuthError(String),

    /// The operation was cancelled through its cancellation token.
    ///
    /// Raised when a caller cancels before a request is issued or while
    /// one is in flight. Pagination loops stop at the first cancelled
    /// page; nothing partial is returned.
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid response format from the GitHub API.
    ///
    /// The response was not in the expected shape. This can happen after
    /// API version changes, on malformed JSON, or when required fields
    /// are missing from the payload.
    #[error("Invalid response format")]
    InvalidResponse,

    /// GitHub rate limit exceeded.
    ///
    /// Retry/backoff is the caller's responsibility; this crate does not
    /// retry internally.
    #[error("Rate limit exceeded")]
    RateLimitExceeded,
}
