//! Document types for the schedule file.
//!
//! Timestamps are kept as ISO-8601 strings rather than parsed datetimes so a
//! document written by another client re-serializes byte-identically; parsing
//! happens only where a calculation needs it.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Current UTC time in the millisecond ISO-8601 form the document uses.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Scheduling parameters stored in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// IANA timezone name, e.g. "Asia/Tokyo".
    pub timezone: String,
    /// Minimum minutes between posts.
    pub interval_minutes: u32,
    /// Maximum posts per day.
    pub daily_limit: u32,
    /// Maximum posts per month.
    pub monthly_limit: u32,
    /// How many times a failed post may be retried.
    pub retry_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            timezone: "Asia/Tokyo".to_string(),
            interval_minutes: 30,
            daily_limit: 50,
            monthly_limit: 1500,
            retry_max: 3,
        }
    }
}

/// What kind of content a post publishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostType {
    Tweet,
    Thread,
    Repost,
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Tweet => "tweet",
            Self::Thread => "thread",
            Self::Repost => "repost",
        })
    }
}

/// Lifecycle status of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Posting,
    Posted,
    Failed,
    Cancelled,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(match self {
            Self::Pending => "pending",
            Self::Posting => "posting",
            Self::Posted => "posted",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        })
    }
}

/// Attached media kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Gif,
}

/// One piece of attached media.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    /// Path of the media file within the repository.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<String>,
}

/// One entry of a thread post, in posting order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadItem {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_tweet_id: Option<String>,
}

/// Recurrence cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatKind {
    Daily,
    Weekly,
    Monthly,
}

/// Recurrence rule attached to a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepeatRule {
    #[serde(rename = "type")]
    pub kind: RepeatKind,
    /// Weekday names for weekly rules, e.g. ["monday", "friday"].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<String>>,
    /// Day of month for monthly rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<u32>,
    /// Time of day as "HH:MM".
    pub time: String,
    /// No occurrences at or after this instant.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Stop after this many occurrences.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_count: Option<u32>,
    /// How many occurrences have already been generated.
    #[serde(default)]
    pub executed_count: u32,
}

/// One schedulable unit of content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    /// Opaque unique ID, assigned on create and never changed.
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PostType,
    pub status: PostStatus,
    /// ISO-8601 instant, kept exactly as the caller supplied it.
    pub scheduled_at: String,
    /// Assigned by the store on create.
    pub created_at: String,
    /// Refreshed by the store on every successful update.
    pub updated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<ThreadItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatRule>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub posted_tweet_id: Option<String>,
}

impl Post {
    /// Merge a patch over this post. The ID is never touched.
    ///
    /// `kind`, `status` and `scheduled_at` change only when supplied; the
    /// payload fields replace the stored values wholesale, clearing included.
    pub(crate) fn apply(&mut self, patch: PostPatch) {
        if let Some(kind) = patch.kind {
            self.kind = kind;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(scheduled_at) = patch.scheduled_at {
            self.scheduled_at = scheduled_at;
        }
        self.text = patch.text;
        self.media = patch.media;
        self.thread = patch.thread;
        self.target_tweet_id = patch.target_tweet_id;
        self.repeat = patch.repeat;
    }
}

/// Terminal outcome recorded for an executed post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Posted,
    Failed,
    Cancelled,
}

/// Append-only audit record; the store only reads these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub id: String,
    pub post_id: String,
    pub action: HistoryAction,
    pub executed_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Posting counters with their reset deadlines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    pub daily_count: u32,
    pub daily_reset_at: String,
    pub monthly_count: u32,
    pub monthly_reset_at: String,
}

/// The whole persisted document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleData {
    pub config: Config,
    pub posts: Vec<Post>,
    pub history: Vec<HistoryEntry>,
    pub stats: Stats,
}

impl ScheduleData {
    /// Fresh document used when the remote file does not exist yet.
    pub fn bootstrap() -> Self {
        let now = now_iso();
        Self {
            config: Config::default(),
            posts: Vec::new(),
            history: Vec::new(),
            stats: Stats {
                daily_count: 0,
                daily_reset_at: now.clone(),
                monthly_count: 0,
                monthly_reset_at: now,
            },
        }
    }
}

/// Fields a caller supplies to create a post; the store assigns the rest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPost {
    #[serde(rename = "type")]
    pub kind: PostType,
    pub status: PostStatus,
    pub scheduled_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<ThreadItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatRule>,
}

impl NewPost {
    /// A pending tweet.
    pub fn tweet(text: impl Into<String>, scheduled_at: impl Into<String>) -> Self {
        Self {
            kind: PostType::Tweet,
            status: PostStatus::Pending,
            scheduled_at: scheduled_at.into(),
            text: Some(text.into()),
            media: None,
            thread: None,
            target_tweet_id: None,
            repeat: None,
        }
    }

    /// A pending thread.
    pub fn thread(items: Vec<ThreadItem>, scheduled_at: impl Into<String>) -> Self {
        Self {
            kind: PostType::Thread,
            status: PostStatus::Pending,
            scheduled_at: scheduled_at.into(),
            text: None,
            media: None,
            thread: Some(items),
            target_tweet_id: None,
            repeat: None,
        }
    }

    /// A pending repost.
    pub fn repost(target_tweet_id: impl Into<String>, scheduled_at: impl Into<String>) -> Self {
        Self {
            kind: PostType::Repost,
            status: PostStatus::Pending,
            scheduled_at: scheduled_at.into(),
            text: None,
            media: None,
            thread: None,
            target_tweet_id: Some(target_tweet_id.into()),
            repeat: None,
        }
    }
}

/// Partial update for a post.
///
/// `kind`, `status` and `scheduled_at` are replaced only when supplied. The
/// payload fields (`text`, `media`, `thread`, `target_tweet_id`, `repeat`)
/// always replace the stored values wholesale, clearing included — callers
/// resubmit the full payload on every update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostPatch {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<PostType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<PostStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<MediaItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thread: Option<Vec<ThreadItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_tweet_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repeat: Option<RepeatRule>,
}

/// Partial update for the config; only supplied fields replace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub daily_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_max: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tweet(id: &str) -> Post {
        Post {
            id: id.to_string(),
            kind: PostType::Tweet,
            status: PostStatus::Pending,
            scheduled_at: "2026-02-01T09:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            text: Some("hello".to_string()),
            media: None,
            thread: None,
            target_tweet_id: None,
            repeat: None,
            retry_count: None,
            error_message: None,
            posted_tweet_id: None,
        }
    }

    #[test]
    fn post_serializes_with_renamed_type_field() {
        let json = serde_json::to_value(tweet("p1")).unwrap();
        assert_eq!(json["type"], "tweet");
        assert_eq!(json["status"], "pending");
        // absent optionals are omitted entirely
        assert!(json.get("media").is_none());
        assert!(json.get("thread").is_none());
    }

    #[test]
    fn post_round_trips_through_json() {
        let post = tweet("p1");
        let json = serde_json::to_string(&post).unwrap();
        let back: Post = serde_json::from_str(&json).unwrap();
        assert_eq!(back, post);
    }

    #[test]
    fn unknown_status_fails_deserialization() {
        let mut json = serde_json::to_value(tweet("p1")).unwrap();
        json["status"] = serde_json::json!("bogus");
        assert!(serde_json::from_value::<Post>(json).is_err());
    }

    #[test]
    fn unknown_type_fails_deserialization() {
        let mut json = serde_json::to_value(tweet("p1")).unwrap();
        json["type"] = serde_json::json!("poll");
        assert!(serde_json::from_value::<Post>(json).is_err());
    }

    #[test]
    fn apply_replaces_payload_wholesale() {
        let mut post = tweet("p1");
        post.media = Some(vec![MediaItem {
            kind: MediaKind::Image,
            path: "img/one.png".to_string(),
            media_id: None,
        }]);

        post.apply(PostPatch {
            text: Some("rewritten".to_string()),
            ..Default::default()
        });

        assert_eq!(post.text.as_deref(), Some("rewritten"));
        // media was not supplied, so it is cleared
        assert_eq!(post.media, None);
        // unsupplied identity fields are untouched
        assert_eq!(post.kind, PostType::Tweet);
        assert_eq!(post.status, PostStatus::Pending);
        assert_eq!(post.scheduled_at, "2026-02-01T09:00:00.000Z");
    }

    #[test]
    fn apply_keeps_id_and_created_at() {
        let mut post = tweet("p1");
        post.apply(PostPatch {
            status: Some(PostStatus::Cancelled),
            text: Some("hello".to_string()),
            ..Default::default()
        });
        assert_eq!(post.id, "p1");
        assert_eq!(post.created_at, "2026-01-01T00:00:00.000Z");
        assert_eq!(post.status, PostStatus::Cancelled);
    }

    #[test]
    fn bootstrap_document_is_empty_with_default_config() {
        let data = ScheduleData::bootstrap();
        assert!(data.posts.is_empty());
        assert!(data.history.is_empty());
        assert_eq!(data.stats.daily_count, 0);
        assert_eq!(data.stats.monthly_count, 0);
        assert_eq!(data.config, Config::default());
    }

    #[test]
    fn bootstrap_document_round_trips_pretty_printed() {
        let data = ScheduleData::bootstrap();
        let json = serde_json::to_string_pretty(&data).unwrap();
        let back: ScheduleData = serde_json::from_str(&json).unwrap();
        assert_eq!(back, data);
        // re-serialization of an unmodified document is a no-op diff
        assert_eq!(serde_json::to_string_pretty(&back).unwrap(), json);
    }

    #[test]
    fn now_iso_is_valid_rfc3339_with_millis() {
        let now = now_iso();
        assert!(chrono::DateTime::parse_from_rfc3339(&now).is_ok());
        assert!(now.ends_with('Z'));
        assert_eq!(now.len(), "2026-01-01T00:00:00.000Z".len());
    }
}
