// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// Two kinds of failure exist and they are handled very differently:
// - FetchError: one page could not be retrieved. The task that asked for it
//   logs it and moves on; the rest of the crawl never notices.
// - CrawlError: the crawl as a whole cannot continue (or never started).
//
// Rust concepts:
// - thiserror: derives std::error::Error and Display from attributes
// - Enums: one variant per failure mode
// =============================================================================

use thiserror::Error;

use crate::crawl::Address;

/// A single page could not be fetched.
///
/// Carries the address so it can be reported after the task that hit it has
/// already finished.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("failed to fetch {address}: {cause}")]
pub struct FetchError {
    /// The address that could not be retrieved
    pub address: Address,
    /// Human-readable reason (HTTP status, network error, "not found", ...)
    pub cause: String,
}

impl FetchError {
    pub fn new(address: Address, cause: impl Into<String>) -> Self {
        Self {
            address,
            cause: cause.into(),
        }
    }

    /// Short stable label for log fields.
    pub fn as_label(&self) -> &'static str {
        "fetch_failed"
    }
}

/// Errors that end a whole crawl run.
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CrawlError {
    /// The visit authority stopped answering claims, so uniqueness can no
    /// longer be guaranteed.
    #[error("visit authority is unavailable; crawl aborted")]
    AuthorityUnavailable,

    /// The root address was rejected before any task started.
    #[error("invalid root address '{address}': {reason}")]
    InvalidRoot { address: String, reason: String },
}

impl CrawlError {
    /// Short stable label for log fields.
    pub fn as_label(&self) -> &'static str {
        match self {
            CrawlError::AuthorityUnavailable => "authority_unavailable",
            CrawlError::InvalidRoot { .. } => "invalid_root",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_error_display_names_address() {
        let err = FetchError::new(Address::from("http://golang.org/cmd/"), "not found");
        assert_eq!(
            err.to_string(),
            "failed to fetch http://golang.org/cmd/: not found"
        );
        assert_eq!(err.as_label(), "fetch_failed");
    }

    #[test]
    fn test_crawl_error_labels() {
        assert_eq!(
            CrawlError::AuthorityUnavailable.as_label(),
            "authority_unavailable"
        );
        let err = CrawlError::InvalidRoot {
            address: "nope".into(),
            reason: "relative URL without a base".into(),
        };
        assert_eq!(err.as_label(), "invalid_root");
        assert!(err.to_string().contains("nope"));
    }
}
