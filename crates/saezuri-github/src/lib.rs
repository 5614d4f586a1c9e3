//! GitHub contents API client for the saezuri schedule store.
//!
//! One JSON file in a GitHub repository is the database. This crate wraps the
//! two contents-API operations the store needs — read a file together with its
//! blob SHA, and write it back guarded by that SHA — and translates HTTP
//! failures into a typed error taxonomy. The SHA is the optimistic-concurrency
//! token: a write with a stale SHA is rejected by GitHub with a 409, surfaced
//! here as [`GitHubError::Conflict`].

mod client;
pub mod encoding;
mod error;

pub use client::{FileContent, GitHubClient, GitHubConfig};
pub use error::GitHubError;
