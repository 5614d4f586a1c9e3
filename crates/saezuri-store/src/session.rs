//! UI-facing session layer over the store.
//!
//! Mirrors the state machine a frontend drives around each store call:
//! Idle → Loading → {Ready | Failed}. The session holds no retry logic; a
//! failed call stays failed until the caller refreshes.

use saezuri_github::GitHubError;

use crate::error::StoreError;
use crate::store::PostStore;
use crate::types::{Config, ConfigPatch, NewPost, Post, PostPatch};

const NOT_CONFIGURED: &str = "GitHub connection is not configured";

/// Lifecycle of one fetched value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum FetchState<T> {
    /// Nothing requested yet.
    #[default]
    Idle,
    /// A request is in flight.
    Loading,
    /// The last request succeeded.
    Ready(T),
    /// The last request failed with a user-facing message.
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Self::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Session over an optional store: "configured" iff credentials were supplied.
///
/// Mutations go through the store and refresh the cached post list on
/// success, so the caller always renders the post-write state of the world.
pub struct PostsSession {
    store: Option<PostStore>,
    posts: FetchState<Vec<Post>>,
}

impl PostsSession {
    pub fn new(store: Option<PostStore>) -> Self {
        Self {
            store,
            posts: FetchState::Idle,
        }
    }

    /// Whether credentials and repository settings are present.
    pub fn is_configured(&self) -> bool {
        self.store.is_some()
    }

    /// The cached post list state.
    pub fn posts(&self) -> &FetchState<Vec<Post>> {
        &self.posts
    }

    /// Re-fetch the post list, driving Loading → {Ready | Failed}.
    pub async fn refresh(&mut self) {
        let Some(store) = self.store.clone() else {
            self.posts = FetchState::Failed(NOT_CONFIGURED.to_string());
            return;
        };

        self.posts = FetchState::Loading;
        self.posts = match store.list_posts().await {
            Ok(posts) => FetchState::Ready(posts),
            Err(e) => FetchState::Failed(describe_error(&e)),
        };
    }

    /// Create a post and refresh the cached list on success.
    pub async fn create(&mut self, new: NewPost) -> Result<Post, String> {
        let store = self.store.clone().ok_or_else(|| NOT_CONFIGURED.to_string())?;
        match store.create_post(new).await {
            Ok(post) => {
                self.refresh().await;
                Ok(post)
            }
            Err(e) => Err(describe_error(&e)),
        }
    }

    /// Update a post and refresh the cached list on success.
    pub async fn update(&mut self, id: &str, patch: PostPatch) -> Result<Post, String> {
        let store = self.store.clone().ok_or_else(|| NOT_CONFIGURED.to_string())?;
        match store.update_post(id, patch).await {
            Ok(post) => {
                self.refresh().await;
                Ok(post)
            }
            Err(e) => Err(describe_error(&e)),
        }
    }

    /// Delete a post and refresh the cached list on success.
    pub async fn delete(&mut self, id: &str) -> Result<(), String> {
        let store = self.store.clone().ok_or_else(|| NOT_CONFIGURED.to_string())?;
        match store.delete_post(id).await {
            Ok(()) => {
                self.refresh().await;
                Ok(())
            }
            Err(e) => Err(describe_error(&e)),
        }
    }

    /// Update the config; does not touch the cached post list.
    pub async fn update_config(&mut self, patch: ConfigPatch) -> Result<Config, String> {
        let store = self.store.clone().ok_or_else(|| NOT_CONFIGURED.to_string())?;
        store
            .update_config(patch)
            .await
            .map_err(|e| describe_error(&e))
    }
}

/// Stable user-facing message for each error kind.
pub fn describe_error(err: &StoreError) -> String {
    match err {
        StoreError::GitHub(GitHubError::Auth(_)) => {
            "Authentication failed: check your GitHub token".to_string()
        }
        StoreError::GitHub(GitHubError::RateLimited { .. }) => {
            "GitHub API rate limit exceeded; try again later".to_string()
        }
        StoreError::ConcurrentUpdate => {
            "The schedule was modified elsewhere; refresh and retry".to_string()
        }
        other => other.to_string(),
    }
}
