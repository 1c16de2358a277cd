//! Naming and timing of the deferred applicant email.

use chrono::{DateTime, Datelike, Duration, Timelike, Utc};
use sha2::{Digest, Sha256};

pub const RULE_PREFIX: &str = "send-email";
/// EventBridge rule names are limited to 64 characters.
const MAX_RULE_NAME_LEN: usize = 64;
const DIGEST_LEN: usize = 8;

/// A one-time deferred invocation of the email function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub id: String,
    pub trigger_time: DateTime<Utc>,
}

impl ScheduleEntry {
    /// `cron(min hour day month ? year)`; fires once at minute granularity.
    pub fn cron_expression(&self) -> String {
        let t = self.trigger_time;
        format!(
            "cron({} {} {} {} ? {})",
            t.minute(),
            t.hour(),
            t.day(),
            t.month(),
            t.year()
        )
    }
}

/// Computes the schedule entry for an upload.
///
/// The id combines a sanitized key slug, the upload's unix timestamp and a
/// digest of the raw key, so two keys uploaded within the same second never
/// collide even when their slugs are truncated to the same prefix.
pub fn compute_schedule(key: &str, now: DateTime<Utc>, delay: Duration) -> ScheduleEntry {
    let timestamp = now.timestamp().to_string();
    let digest = key_digest(key);

    let fixed = RULE_PREFIX.len() + timestamp.len() + digest.len() + 3;
    let budget = MAX_RULE_NAME_LEN.saturating_sub(fixed);
    let slug: String = sanitize_key(key).chars().take(budget).collect();

    let id = if slug.is_empty() {
        format!("{RULE_PREFIX}-{timestamp}-{digest}")
    } else {
        format!("{RULE_PREFIX}-{slug}-{timestamp}-{digest}")
    };

    ScheduleEntry {
        id,
        trigger_time: now + delay,
    }
}

fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

fn key_digest(key: &str) -> String {
    let hash = Sha256::digest(key.as_bytes());
    let hex = format!("{hash:x}");
    hex[..DIGEST_LEN].to_string()
}
