//! Optimistic-concurrency CRUD over the schedule document.
//!
//! Every operation is one read-modify-write transaction against the whole
//! document. The blob SHA from the read is the write precondition; a stale
//! SHA surfaces as [`StoreError::ConcurrentUpdate`] and retrying is the
//! caller's decision — the store never retries or merges on its own.

use saezuri_github::{GitHubClient, GitHubError};
use tracing::debug;
use uuid::Uuid;

use crate::error::StoreError;
use crate::types::{
    Config, ConfigPatch, HistoryEntry, NewPost, Post, PostPatch, ScheduleData, Stats, now_iso,
};
use crate::validate::{validate_config, validate_post};

/// Default repository path of the schedule document.
pub const DEFAULT_FILE_PATH: &str = "posts.json";

/// A decoded document plus the SHA that guards the next write.
///
/// `sha` is `None` when the remote file does not exist yet; the first write
/// omits the precondition and lets GitHub create the file.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub data: ScheduleData,
    pub sha: Option<String>,
}

/// Document store over one schedule file in a GitHub repository.
#[derive(Clone)]
pub struct PostStore {
    client: GitHubClient,
    file_path: String,
}

impl PostStore {
    /// Create a store over the given file path.
    pub fn new(client: GitHubClient, file_path: impl Into<String>) -> Self {
        Self {
            client,
            file_path: file_path.into(),
        }
    }

    /// Create a store over the default `posts.json` path.
    pub fn with_default_path(client: GitHubClient) -> Self {
        Self::new(client, DEFAULT_FILE_PATH)
    }

    /// Read the current document; a missing file bootstraps a default.
    pub async fn get_document(&self) -> Result<Snapshot, StoreError> {
        match self.client.get_file(&self.file_path).await {
            Ok(Some(file)) => {
                let data = serde_json::from_str(&file.content).map_err(|e| {
                    StoreError::InvalidDocument(format!(
                        "failed to parse {}: {}",
                        self.file_path, e
                    ))
                })?;
                Ok(Snapshot {
                    data,
                    sha: Some(file.sha),
                })
            }
            Ok(None) | Err(GitHubError::NotFound { .. }) => {
                debug!(path = %self.file_path, "schedule file absent, using default document");
                Ok(Snapshot {
                    data: ScheduleData::bootstrap(),
                    sha: None,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// All posts, in insertion order.
    pub async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        Ok(self.get_document().await?.data.posts)
    }

    /// A single post by ID; an absent post is `Ok(None)`.
    pub async fn get_post(&self, id: &str) -> Result<Option<Post>, StoreError> {
        let snapshot = self.get_document().await?;
        Ok(snapshot.data.posts.into_iter().find(|p| p.id == id))
    }

    /// Create a post. Validates before any remote call.
    pub async fn create_post(&self, new: NewPost) -> Result<Post, StoreError> {
        let now = now_iso();
        let post = Post {
            id: Uuid::new_v4().to_string(),
            kind: new.kind,
            status: new.status,
            scheduled_at: new.scheduled_at,
            created_at: now.clone(),
            updated_at: now,
            text: new.text,
            media: new.media,
            thread: new.thread,
            target_tweet_id: new.target_tweet_id,
            repeat: new.repeat,
            retry_count: None,
            error_message: None,
            posted_tweet_id: None,
        };
        validate_post(&post)?;

        let mut snapshot = self.get_document().await?;
        snapshot.data.posts.push(post.clone());

        let message = format!("Add post: {}", post.id);
        self.write(&snapshot.data, snapshot.sha.as_deref(), &message)
            .await?;

        Ok(post)
    }

    /// Update a post by ID and return the merged result.
    pub async fn update_post(&self, id: &str, patch: PostPatch) -> Result<Post, StoreError> {
        let mut snapshot = self.get_document().await?;
        let post = snapshot
            .data
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::PostNotFound(id.to_string()))?;

        post.apply(patch);
        post.updated_at = now_iso();
        validate_post(post)?;
        let updated = post.clone();

        let message = format!("Update post: {}", id);
        self.write(&snapshot.data, snapshot.sha.as_deref(), &message)
            .await?;

        Ok(updated)
    }

    /// Delete a post by ID.
    pub async fn delete_post(&self, id: &str) -> Result<(), StoreError> {
        let mut snapshot = self.get_document().await?;
        let index = snapshot
            .data
            .posts
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| StoreError::PostNotFound(id.to_string()))?;
        snapshot.data.posts.remove(index);

        let message = format!("Delete post: {}", id);
        self.write(&snapshot.data, snapshot.sha.as_deref(), &message)
            .await?;

        Ok(())
    }

    /// The execution history, oldest first.
    pub async fn get_history(&self) -> Result<Vec<HistoryEntry>, StoreError> {
        Ok(self.get_document().await?.data.history)
    }

    /// The current scheduling config.
    pub async fn get_config(&self) -> Result<Config, StoreError> {
        Ok(self.get_document().await?.data.config)
    }

    /// The current posting counters.
    pub async fn get_stats(&self) -> Result<Stats, StoreError> {
        Ok(self.get_document().await?.data.stats)
    }

    /// Merge the supplied fields over the config and write it back.
    pub async fn update_config(&self, patch: ConfigPatch) -> Result<Config, StoreError> {
        let mut snapshot = self.get_document().await?;
        let config = &mut snapshot.data.config;

        if let Some(timezone) = patch.timezone {
            config.timezone = timezone;
        }
        if let Some(v) = patch.interval_minutes {
            config.interval_minutes = v;
        }
        if let Some(v) = patch.daily_limit {
            config.daily_limit = v;
        }
        if let Some(v) = patch.monthly_limit {
            config.monthly_limit = v;
        }
        if let Some(v) = patch.retry_max {
            config.retry_max = v;
        }

        validate_config(config)?;
        let updated = config.clone();

        self.write(&snapshot.data, snapshot.sha.as_deref(), "Update config")
            .await?;

        Ok(updated)
    }

    /// Serialize and write the document; a stale SHA becomes `ConcurrentUpdate`.
    async fn write(
        &self,
        data: &ScheduleData,
        sha: Option<&str>,
        message: &str,
    ) -> Result<String, StoreError> {
        let content = serde_json::to_string_pretty(data).map_err(|e| {
            StoreError::InvalidDocument(format!("failed to serialize document: {}", e))
        })?;

        match self
            .client
            .put_file(&self.file_path, &content, sha, message)
            .await
        {
            Ok(new_sha) => Ok(new_sha),
            Err(GitHubError::Conflict { .. }) => Err(StoreError::ConcurrentUpdate),
            Err(e) => Err(e.into()),
        }
    }
}
