//! Recurrence handling for repeat posts.
//!
//! A repeat rule describes daily, weekly (on named weekdays) or monthly (on a
//! fixed day) recurrence with optional end conditions. Calculations are done
//! in UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc, Weekday};

use crate::error::StoreError;
use crate::types::{NewPost, Post, PostStatus, RepeatKind, RepeatRule};

/// Next occurrence strictly after `after`, or `None` when the rule has ended.
pub fn next_occurrence(
    rule: &RepeatRule,
    after: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, StoreError> {
    if let Some(end_date) = &rule.end_date {
        let end = DateTime::parse_from_rfc3339(end_date)
            .map_err(|_| StoreError::InvalidPost(format!("invalid repeat end_date: {}", end_date)))?
            .with_timezone(&Utc);
        if after >= end {
            return Ok(None);
        }
    }
    if let Some(end_count) = rule.end_count {
        if rule.executed_count >= end_count {
            return Ok(None);
        }
    }

    let time = parse_time(&rule.time)?;

    let next = match rule.kind {
        RepeatKind::Daily => at(after.date_naive() + Duration::days(1), time),
        RepeatKind::Weekly => {
            let Some(days) = rule.days.as_ref().filter(|d| !d.is_empty()) else {
                return Ok(None);
            };
            let targets: Vec<Weekday> = days.iter().filter_map(|d| parse_weekday(d)).collect();
            if targets.is_empty() {
                return Err(StoreError::InvalidPost(format!(
                    "invalid repeat days: {:?}",
                    days
                )));
            }

            let mut next = None;
            for offset in 1..=7 {
                let date = after.date_naive() + Duration::days(offset);
                if targets.contains(&date.weekday()) {
                    next = Some(at(date, time));
                    break;
                }
            }
            match next {
                Some(v) => v,
                None => return Ok(None),
            }
        }
        RepeatKind::Monthly => {
            let Some(day) = rule.day_of_month else {
                return Ok(None);
            };
            let (year, month) = next_month(after.year(), after.month());
            match NaiveDate::from_ymd_opt(year, month, day) {
                Some(date) => at(date, time),
                // the month has no such day; fall back to its last day
                None => at(last_day_of_month(year, month), time),
            }
        }
    };

    Ok(Some(next))
}

/// Build the successor post for a completed repeat post.
///
/// Returns `None` when the post has no repeat rule or the rule has ended.
/// The successor carries the same payload, a bumped `executed_count`, and
/// `pending` status.
pub fn next_repeat_post(post: &Post) -> Result<Option<NewPost>, StoreError> {
    let Some(rule) = &post.repeat else {
        return Ok(None);
    };
    let after = DateTime::parse_from_rfc3339(&post.scheduled_at)
        .map_err(|_| {
            StoreError::InvalidPost(format!("invalid scheduled_at: {}", post.scheduled_at))
        })?
        .with_timezone(&Utc);

    let Some(next) = next_occurrence(rule, after)? else {
        return Ok(None);
    };

    let mut successor_rule = rule.clone();
    successor_rule.executed_count += 1;

    Ok(Some(NewPost {
        kind: post.kind,
        status: PostStatus::Pending,
        scheduled_at: next.to_rfc3339_opts(SecondsFormat::Millis, true),
        text: post.text.clone(),
        media: post.media.clone(),
        thread: post.thread.clone(),
        target_tweet_id: post.target_tweet_id.clone(),
        repeat: Some(successor_rule),
    }))
}

fn parse_time(value: &str) -> Result<NaiveTime, StoreError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|_| StoreError::InvalidPost(format!("invalid repeat time: {}", value)))
}

fn parse_weekday(name: &str) -> Option<Weekday> {
    match name.to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}

fn at(date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(time))
}

fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let (ny, nm) = next_month(year, month);
    NaiveDate::from_ymd_opt(ny, nm, 1).expect("first of month is always valid") - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utc(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn daily(time: &str) -> RepeatRule {
        RepeatRule {
            kind: RepeatKind::Daily,
            days: None,
            day_of_month: None,
            time: time.to_string(),
            end_date: None,
            end_count: None,
            executed_count: 0,
        }
    }

    #[test]
    fn daily_next_is_tomorrow_at_time() {
        let next = next_occurrence(&daily("09:30"), utc("2026-02-01T12:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc("2026-02-02T09:30:00Z"));
    }

    #[test]
    fn weekly_picks_next_named_weekday() {
        let rule = RepeatRule {
            kind: RepeatKind::Weekly,
            days: Some(vec!["monday".to_string(), "friday".to_string()]),
            ..daily("08:00")
        };
        // 2026-02-03 is a Tuesday; next match is Friday the 6th
        let next = next_occurrence(&rule, utc("2026-02-03T10:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc("2026-02-06T08:00:00Z"));
    }

    #[test]
    fn weekly_without_days_has_no_occurrence() {
        let rule = RepeatRule {
            kind: RepeatKind::Weekly,
            ..daily("08:00")
        };
        let next = next_occurrence(&rule, utc("2026-02-03T10:00:00Z")).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn weekly_with_unknown_day_names_is_invalid() {
        let rule = RepeatRule {
            kind: RepeatKind::Weekly,
            days: Some(vec!["caturday".to_string()]),
            ..daily("08:00")
        };
        let result = next_occurrence(&rule, utc("2026-02-03T10:00:00Z"));
        assert!(matches!(result, Err(StoreError::InvalidPost(_))));
    }

    #[test]
    fn monthly_lands_on_day_of_month() {
        let rule = RepeatRule {
            kind: RepeatKind::Monthly,
            day_of_month: Some(15),
            ..daily("07:00")
        };
        let next = next_occurrence(&rule, utc("2026-02-20T10:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc("2026-03-15T07:00:00Z"));
    }

    #[test]
    fn monthly_day_31_falls_back_to_last_day() {
        let rule = RepeatRule {
            kind: RepeatKind::Monthly,
            day_of_month: Some(31),
            ..daily("07:00")
        };
        // next month is April, which has 30 days
        let next = next_occurrence(&rule, utc("2026-03-05T10:00:00Z"))
            .unwrap()
            .unwrap();
        assert_eq!(next, utc("2026-04-30T07:00:00Z"));
    }

    #[test]
    fn end_count_stops_recurrence() {
        let mut rule = daily("09:00");
        rule.end_count = Some(3);
        rule.executed_count = 3;
        let next = next_occurrence(&rule, utc("2026-02-01T12:00:00Z")).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn end_date_stops_recurrence() {
        let mut rule = daily("09:00");
        rule.end_date = Some("2026-02-01T00:00:00Z".to_string());
        let next = next_occurrence(&rule, utc("2026-02-01T12:00:00Z")).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn invalid_time_is_rejected() {
        let result = next_occurrence(&daily("9:99"), utc("2026-02-01T12:00:00Z"));
        assert!(matches!(result, Err(StoreError::InvalidPost(_))));
    }

    #[test]
    fn next_repeat_post_bumps_executed_count() {
        let mut post = Post {
            id: "p1".to_string(),
            kind: crate::types::PostType::Tweet,
            status: PostStatus::Posted,
            scheduled_at: "2026-02-01T09:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            text: Some("good morning".to_string()),
            media: None,
            thread: None,
            target_tweet_id: None,
            repeat: Some(daily("09:00")),
            retry_count: None,
            error_message: None,
            posted_tweet_id: Some("111".to_string()),
        };
        post.repeat.as_mut().unwrap().executed_count = 2;

        let successor = next_repeat_post(&post).unwrap().unwrap();
        assert_eq!(successor.status, PostStatus::Pending);
        assert_eq!(successor.text.as_deref(), Some("good morning"));
        assert_eq!(successor.scheduled_at, "2026-02-02T09:00:00.000Z");
        assert_eq!(successor.repeat.unwrap().executed_count, 3);
    }

    #[test]
    fn next_repeat_post_without_rule_is_none() {
        let post = Post {
            id: "p1".to_string(),
            kind: crate::types::PostType::Tweet,
            status: PostStatus::Posted,
            scheduled_at: "2026-02-01T09:00:00.000Z".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
            updated_at: "2026-01-01T00:00:00.000Z".to_string(),
            text: Some("once only".to_string()),
            media: None,
            thread: None,
            target_tweet_id: None,
            repeat: None,
            retry_count: None,
            error_message: None,
            posted_tweet_id: None,
        };
        assert!(next_repeat_post(&post).unwrap().is_none());
    }
}
