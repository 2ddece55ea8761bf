//! Store error taxonomy.
//!
//! Every failure at the store boundary carries a machine-readable
//! [`ErrorCode`]. The split that matters operationally is
//! [`ErrorCode::retryable`]: quota and transient conditions are worth
//! retrying with backoff, everything else must fail fast so a
//! misconfigured sheet id does not burn the rate budget on hopeless
//! attempts.

use std::fmt;

/// Machine-readable error codes for the store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The store rejected the call for quota reasons (HTTP 429,
    /// "resource exhausted").
    RateLimited,
    /// The transport reported a per-attempt timeout.
    Timeout,
    /// The store is temporarily unreachable or returned a 5xx.
    Unavailable,
    /// The credential lacks access to the spreadsheet.
    PermissionDenied,
    /// The spreadsheet id does not resolve.
    SourceNotFound,
    /// None of the configured worksheet title candidates exist.
    WorksheetNotFound,
    /// The store answered with something the schema mapper cannot use.
    MalformedResponse,
    /// The store configuration file failed to parse or validate.
    ConfigInvalid,
    /// A Number/Text item was marked without its required note value.
    NoteRequired,
}

impl ErrorCode {
    /// Stable code identifier (`S####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::RateLimited => "S1001",
            Self::Timeout => "S1002",
            Self::Unavailable => "S1003",
            Self::PermissionDenied => "S2001",
            Self::SourceNotFound => "S2002",
            Self::WorksheetNotFound => "S2003",
            Self::MalformedResponse => "S3001",
            Self::ConfigInvalid => "S4001",
            Self::NoteRequired => "S5001",
        }
    }

    /// Short human-facing summary for logs and error surfaces.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::RateLimited => "Store rate limit hit",
            Self::Timeout => "Store call timed out",
            Self::Unavailable => "Store temporarily unavailable",
            Self::PermissionDenied => "No permission on spreadsheet",
            Self::SourceNotFound => "Spreadsheet not found",
            Self::WorksheetNotFound => "Worksheet not found",
            Self::MalformedResponse => "Malformed store response",
            Self::ConfigInvalid => "Invalid store configuration",
            Self::NoteRequired => "Item requires a note value",
        }
    }

    /// Optional remediation hint surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::RateLimited | Self::Timeout | Self::Unavailable => {
                Some("Transient; retried automatically. If persistent, lower the refresh rate.")
            }
            Self::PermissionDenied => {
                Some("Share the spreadsheet with the service account email as Editor.")
            }
            Self::SourceNotFound => Some("Check the spreadsheet id in the store configuration."),
            Self::WorksheetNotFound => {
                Some("Add the worksheet, or extend the title candidates in the configuration.")
            }
            Self::MalformedResponse => None,
            Self::ConfigInvalid => Some("Fix the store configuration file and retry."),
            Self::NoteRequired => Some("Fill in the measured value before marking the item."),
        }
    }

    /// Whether the condition is worth retrying with backoff.
    #[must_use]
    pub const fn retryable(self) -> bool {
        matches!(self, Self::RateLimited | Self::Timeout | Self::Unavailable)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A store-boundary failure: a code plus call-site detail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{} {}: {detail}", .code.code(), .code.message())]
pub struct StoreError {
    code: ErrorCode,
    detail: String,
}

impl StoreError {
    #[must_use]
    pub fn new(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self {
            code,
            detail: detail.into(),
        }
    }

    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        self.code
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Whether the caller may retry this failure.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.retryable()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
