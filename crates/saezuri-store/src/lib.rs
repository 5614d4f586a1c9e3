//! Optimistic-concurrency document store for the saezuri post schedule.
//!
//! One JSON file in a GitHub repository holds the whole schedule: config,
//! posts, history and stats. Every mutation is a read-modify-write of that
//! file guarded by the blob SHA from the read; a stale SHA surfaces as
//! [`StoreError::ConcurrentUpdate`] for the caller to re-fetch and retry.
//!
//! ## Modules
//!
//! - [`PostStore`]: the CRUD layer over the document
//! - [`session`]: the Idle → Loading → {Ready | Failed} layer a UI drives
//! - [`repeat`]: recurrence calculation for repeat posts
//! - [`limits`]: daily/monthly posting counter rollover

mod error;
pub mod limits;
pub mod repeat;
pub mod session;
mod store;
mod types;
mod validate;

pub use error::StoreError;
pub use session::{FetchState, PostsSession};
pub use store::{DEFAULT_FILE_PATH, PostStore, Snapshot};
pub use types::*;
pub use validate::{validate_config, validate_post};
