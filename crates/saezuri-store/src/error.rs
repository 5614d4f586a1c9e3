//! Error types for the schedule store.

use thiserror::Error;

/// Errors that can occur in store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport-level failure from the GitHub client.
    #[error("GitHub error: {0}")]
    GitHub(#[from] saezuri_github::GitHubError),

    /// The stored document could not be decoded or serialized.
    #[error("invalid schedule document: {0}")]
    InvalidDocument(String),

    /// A post or config failed validation; nothing was written.
    #[error("invalid post data: {0}")]
    InvalidPost(String),

    /// No post with the given ID exists.
    #[error("post not found: {0}")]
    PostNotFound(String),

    /// The document changed between read and write.
    #[error("schedule was modified by another writer; re-fetch and retry")]
    ConcurrentUpdate,
}
