//! Error types for the GitHub contents client.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors that can occur when talking to the GitHub contents API.
#[derive(Debug, Error)]
pub enum GitHubError {
    /// Credential rejected or missing permission (401/403).
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Client configuration is unusable (empty owner/repo).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Requested object does not exist (404 on a required object).
    #[error("not found: {path}")]
    NotFound { path: String },

    /// Write precondition failed: the supplied blob SHA is stale (409).
    #[error("conflict writing {path}: file was modified by another process")]
    Conflict { path: String },

    /// API rate limit exhausted (429).
    #[error("rate limited{}", match reset_at {
        Some(at) => format!(" (resets at {})", at.to_rfc3339()),
        None => String::new(),
    })]
    RateLimited {
        /// When the quota resets, from the `x-ratelimit-reset` header.
        reset_at: Option<DateTime<Utc>>,
    },

    /// GitHub server-side failure (5xx).
    #[error("GitHub server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// Any other API failure, wrapping the original status and message.
    #[error("GitHub API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API response body could not be parsed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport encoding failure (base64 or UTF-8).
    #[error("encoding error: {0}")]
    Encoding(String),
}
