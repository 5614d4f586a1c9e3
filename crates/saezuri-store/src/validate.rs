//! Pre-write validation for posts and config.
//!
//! Runs before any remote call so a bad input never costs a network write.
//! Enum values are checked at the serde boundary; these rules cover what the
//! type system cannot express.

use chrono::DateTime;

use crate::error::StoreError;
use crate::types::{Config, Post, PostType};

/// Check the type-specific required-field rules for a post.
pub fn validate_post(post: &Post) -> Result<(), StoreError> {
    if DateTime::parse_from_rfc3339(&post.scheduled_at).is_err() {
        return Err(StoreError::InvalidPost(format!(
            "scheduled_at must be a valid ISO 8601 instant: {}",
            post.scheduled_at
        )));
    }

    match post.kind {
        PostType::Tweet => {
            if post.text.as_deref().map_or(true, str::is_empty) {
                return Err(StoreError::InvalidPost("tweet must have text".to_string()));
            }
        }
        PostType::Thread => {
            if post.thread.as_deref().map_or(true, <[_]>::is_empty) {
                return Err(StoreError::InvalidPost(
                    "thread must have at least one item".to_string(),
                ));
            }
        }
        PostType::Repost => {
            if post.target_tweet_id.as_deref().map_or(true, str::is_empty) {
                return Err(StoreError::InvalidPost(
                    "repost must have target_tweet_id".to_string(),
                ));
            }
        }
    }

    Ok(())
}

/// Check the numeric bounds and timezone of a config.
pub fn validate_config(config: &Config) -> Result<(), StoreError> {
    if config.timezone.is_empty() {
        return Err(StoreError::InvalidPost(
            "timezone must be a non-empty string".to_string(),
        ));
    }
    if config.interval_minutes == 0 {
        return Err(StoreError::InvalidPost(
            "interval_minutes must be positive".to_string(),
        ));
    }
    if config.daily_limit == 0 {
        return Err(StoreError::InvalidPost(
            "daily_limit must be positive".to_string(),
        ));
    }
    if config.monthly_limit == 0 {
        return Err(StoreError::InvalidPost(
            "monthly_limit must be positive".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PostStatus, ThreadItem};

    fn base_post(kind: PostType) -> Post {
        Post {
            id: "p1".to_string(),
            kind,
            status: PostStatus::Pending,
            scheduled_at: "2026-02-01T00:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            text: None,
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
    fn tweet_requires_text() {
        let mut post = base_post(PostType::Tweet);
        assert!(validate_post(&post).is_err());

        post.text = Some(String::new());
        assert!(validate_post(&post).is_err());

        post.text = Some("hello".to_string());
        assert!(validate_post(&post).is_ok());
    }

    #[test]
    fn thread_requires_items() {
        let mut post = base_post(PostType::Thread);
        assert!(validate_post(&post).is_err());

        post.thread = Some(vec![]);
        assert!(validate_post(&post).is_err());

        post.thread = Some(vec![ThreadItem {
            text: "first".to_string(),
            media: None,
            posted_tweet_id: None,
        }]);
        assert!(validate_post(&post).is_ok());
    }

    #[test]
    fn repost_requires_target() {
        let mut post = base_post(PostType::Repost);
        assert!(validate_post(&post).is_err());

        post.target_tweet_id = Some("42".to_string());
        assert!(validate_post(&post).is_ok());
    }

    #[test]
    fn scheduled_at_must_parse() {
        let mut post = base_post(PostType::Tweet);
        post.text = Some("hello".to_string());
        post.scheduled_at = "tomorrow-ish".to_string();

        let err = validate_post(&post).unwrap_err();
        assert!(matches!(err, StoreError::InvalidPost(_)));
    }

    #[test]
    fn scheduled_at_accepts_offset_form() {
        let mut post = base_post(PostType::Tweet);
        post.text = Some("hello".to_string());
        post.scheduled_at = "2026-02-01T09:00:00+09:00".to_string();
        assert!(validate_post(&post).is_ok());
    }

    #[test]
    fn config_bounds() {
        let mut config = Config::default();
        assert!(validate_config(&config).is_ok());

        config.interval_minutes = 0;
        assert!(validate_config(&config).is_err());

        config = Config::default();
        config.timezone = String::new();
        assert!(validate_config(&config).is_err());

        config = Config::default();
        config.daily_limit = 0;
        assert!(validate_config(&config).is_err());

        config = Config::default();
        config.monthly_limit = 0;
        assert!(validate_config(&config).is_err());

        // retry_max of zero is allowed
        config = Config::default();
        config.retry_max = 0;
        assert!(validate_config(&config).is_ok());
    }
}
