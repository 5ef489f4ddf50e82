//! Error Kind - Classification of errors
//!
//! Defines the [`ErrorKind`] enum shared by the storage, cache and history
//! components. Each kind maps to an HTTP status for the API binary.

use serde::Serialize;

/// Error classification
///
/// Components report their own error enums; this is the common
/// classification those enums collapse into.
///
/// ## Notes
/// * `non_exhaustive` - more kinds may be added later
///
/// ## Examples
/// ```rust
/// use kernel::error::kind::ErrorKind;
///
/// let kind = ErrorKind::QuotaExceeded;
/// assert_eq!(kind.status_code(), 507);
/// assert_eq!(kind.as_str(), "Quota Exceeded");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[non_exhaustive]
pub enum ErrorKind {
    /// Caller supplied something unusable (unknown operation label, bad id)
    InvalidInput,
    /// Requested record does not exist
    NotFound,
    /// Admission denied by a cooldown
    TooManyRequests,
    /// Persistent store has no room for the write
    QuotaExceeded,
    /// Persisted data could not be decoded
    Corrupted,
    /// Remote fetch failed
    Upstream,
    /// Backing resource temporarily unavailable
    Unavailable,
    /// Anything else
    Internal,
}

impl ErrorKind {
    /// HTTP status code for this kind
    ///
    /// ## Examples
    /// ```rust
    /// use kernel::error::kind::ErrorKind;
    /// assert_eq!(ErrorKind::InvalidInput.status_code(), 400);
    /// assert_eq!(ErrorKind::Upstream.status_code(), 502);
    /// ```
    #[inline]
    pub const fn status_code(&self) -> u16 {
        match self {
            ErrorKind::InvalidInput => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::TooManyRequests => 429,
            ErrorKind::Internal | ErrorKind::Corrupted => 500,
            ErrorKind::Upstream => 502,
            ErrorKind::Unavailable => 503,
            ErrorKind::QuotaExceeded => 507,
        }
    }

    /// Human-readable label
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidInput => "Invalid Input",
            ErrorKind::NotFound => "Not Found",
            ErrorKind::TooManyRequests => "Too Many Requests",
            ErrorKind::QuotaExceeded => "Quota Exceeded",
            ErrorKind::Corrupted => "Corrupted Data",
            ErrorKind::Upstream => "Upstream Failure",
            ErrorKind::Unavailable => "Unavailable",
            ErrorKind::Internal => "Internal Error",
        }
    }

    /// Whether the failure is on our side (5xx)
    ///
    /// Server-side kinds should be logged.
    #[inline]
    pub const fn is_server_error(&self) -> bool {
        self.status_code() >= 500
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
