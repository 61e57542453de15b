// crates/core/src/fixtures.rs
//! Cutting a small demo dataset out of a full export.
//!
//! Works on raw `serde_json::Value`s so that every field of the original
//! export, known or not, survives into the fixture.

use chrono::{DateTime, Months, Utc};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct DemoOptions {
    /// Keep conversations created within this many calendar months.
    pub months: u32,
    /// Keep at most this many conversations, newest first.
    pub max_conversations: usize,
    /// Cut string parts longer than this many characters.
    pub truncate_chars: usize,
}

impl Default for DemoOptions {
    fn default() -> Self {
        Self {
            months: 3,
            max_conversations: 200,
            truncate_chars: 500,
        }
    }
}

fn create_time(conv: &Value) -> Option<f64> {
    conv.get("create_time").and_then(Value::as_f64)
}

/// Unix seconds `months` calendar months before `now`.
pub fn months_ago(now: DateTime<Utc>, months: u32) -> f64 {
    now.checked_sub_months(Months::new(months))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
        .timestamp() as f64
}

/// Conversations created at or after `cutoff`. Conversations without a
/// timestamp are dropped.
pub fn recent_since(conversations: Vec<Value>, cutoff: f64) -> Vec<Value> {
    conversations
        .into_iter()
        .filter(|c| create_time(c).is_some_and(|t| t > 0.0 && t >= cutoff))
        .collect()
}

/// Sort newest first and keep at most `max`.
pub fn newest_first(mut conversations: Vec<Value>, max: usize) -> Vec<Value> {
    conversations.sort_by(|a, b| {
        let (ta, tb) = (create_time(a).unwrap_or(0.0), create_time(b).unwrap_or(0.0));
        tb.partial_cmp(&ta).unwrap_or(std::cmp::Ordering::Equal)
    });
    conversations.truncate(max);
    conversations
}

/// Cut every string content part longer than `max_chars` characters down to
/// `max_chars` and append `...`. Returns the number of parts cut.
pub fn truncate_parts(conversation: &mut Value, max_chars: usize) -> usize {
    let Some(mapping) = conversation.get_mut("mapping").and_then(Value::as_object_mut) else {
        return 0;
    };

    let mut cut = 0;
    for node in mapping.values_mut() {
        let parts = node
            .get_mut("message")
            .and_then(|m| m.get_mut("content"))
            .and_then(|c| c.get_mut("parts"))
            .and_then(Value::as_array_mut);
        let Some(parts) = parts else { continue };

        for part in parts.iter_mut() {
            if let Value::String(s) = part {
                if s.chars().count() > max_chars {
                    let mut short: String = s.chars().take(max_chars).collect();
                    short.push_str("...");
                    *s = short;
                    cut += 1;
                }
            }
        }
    }
    cut
}

/// Filter, sample and shrink an export into a demo dataset.
pub fn prepare_demo(conversations: Vec<Value>, options: &DemoOptions, now: DateTime<Utc>) -> Vec<Value> {
    let cutoff = months_ago(now, options.months);
    let recent = recent_since(conversations, cutoff);
    let mut sampled = newest_first(recent, options.max_conversations);
    let truncated: usize = sampled
        .iter_mut()
        .map(|c| truncate_parts(c, options.truncate_chars))
        .sum();

    tracing::debug!(
        cutoff,
        kept = sampled.len(),
        truncated_parts = truncated,
        "Prepared demo dataset"
    );
    sampled
}
