// crates/core/src/charts.rs
//! Chart-ready views over [`ConversationData`].
//!
//! The frontend renders these structures directly: an area chart of recent
//! daily activity, monthly line/bar charts, and two pie charts (message
//! distribution and model usage).

use crate::types::{ConversationData, DailyStat, LongestConversation, MonthlyStat};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Pie slice colors, cycled for model usage.
pub const PALETTE: [&str; 6] = [
    "#0088FE", "#00C49F", "#FFBB28", "#FF8042", "#8884D8", "#82CA9D",
];

/// Number of trailing days shown in the daily activity chart.
pub const RECENT_DAYS: usize = 30;

/// Model slices at or below this share (percent) get no inline label.
pub const MODEL_LABEL_MIN_PERCENT: f64 = 5.0;

/// `2024-01-05` -> `Jan 5`. Unparseable input is returned unchanged.
pub fn format_day_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%b %-d").to_string())
        .unwrap_or_else(|_| date.to_string())
}

/// `2024-01` -> `Jan 2024`. Unparseable input is returned unchanged.
pub fn format_month_label(month: &str) -> String {
    NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
        .map(|d| d.format("%b %Y").to_string())
        .unwrap_or_else(|_| month.to_string())
}

fn percent_of(value: i64, total: i64) -> f64 {
    if total <= 0 {
        return 0.0;
    }
    let percent = value as f64 / total as f64 * 100.0;
    (percent * 10.0).round() / 10.0
}

/// One x-axis point of a time series chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct ActivityPoint {
    /// Bucket key (`YYYY-MM-DD` or `YYYY-MM`).
    pub key: String,
    /// Axis label (`Jan 5` or `Jan 2024`).
    pub label: String,
    #[ts(type = "number")]
    pub conversations: i64,
    #[ts(type = "number")]
    pub messages: i64,
    #[ts(type = "number")]
    pub user_messages: i64,
    #[ts(type = "number")]
    pub assistant_messages: i64,
}

impl From<&DailyStat> for ActivityPoint {
    fn from(s: &DailyStat) -> Self {
        Self {
            key: s.date.clone(),
            label: format_day_label(&s.date),
            conversations: s.conversations,
            messages: s.messages,
            user_messages: s.user_messages,
            assistant_messages: s.assistant_messages,
        }
    }
}

impl From<&MonthlyStat> for ActivityPoint {
    fn from(s: &MonthlyStat) -> Self {
        Self {
            key: s.month.clone(),
            label: format_month_label(&s.month),
            conversations: s.conversations,
            messages: s.messages,
            user_messages: s.user_messages,
            assistant_messages: s.assistant_messages,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct PieSlice {
    pub name: String,
    #[ts(type = "number")]
    pub value: i64,
    /// Share of the pie, 0-100, one decimal.
    pub percent: f64,
    pub color: String,
    /// Inline label; empty when the slice is too small to label.
    pub label: String,
}

/// Headline numbers shown above the charts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct SummaryCards {
    #[ts(type = "number")]
    pub total_conversations: i64,
    #[ts(type = "number")]
    pub total_messages: i64,
    /// Rounded to one decimal.
    pub average_messages_per_conversation: f64,
    pub longest_conversation: LongestConversation,
    /// `2024-01-05 to 2024-03-01`, absent when no conversation has a timestamp.
    pub date_range_label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct DashboardCharts {
    pub summary: SummaryCards,
    pub recent_activity: Vec<ActivityPoint>,
    pub monthly_trends: Vec<ActivityPoint>,
    pub message_distribution: Vec<PieSlice>,
    pub model_usage: Vec<PieSlice>,
}

impl DashboardCharts {
    pub fn from_data(data: &ConversationData) -> Self {
        let recent_start = data.daily_stats.len().saturating_sub(RECENT_DAYS);

        Self {
            summary: summary_cards(data),
            recent_activity: data.daily_stats[recent_start..]
                .iter()
                .map(ActivityPoint::from)
                .collect(),
            monthly_trends: data.monthly_stats.iter().map(ActivityPoint::from).collect(),
            message_distribution: message_distribution(data),
            model_usage: model_usage(data),
        }
    }
}

fn summary_cards(data: &ConversationData) -> SummaryCards {
    let date_range_label = match (&data.date_range.earliest, &data.date_range.latest) {
        (Some(earliest), Some(latest)) => Some(format!(
            "{} to {}",
            earliest.format("%Y-%m-%d"),
            latest.format("%Y-%m-%d")
        )),
        _ => None,
    };

    SummaryCards {
        total_conversations: data.total_conversations,
        total_messages: data.total_messages,
        average_messages_per_conversation: (data.average_messages_per_conversation * 10.0)
            .round()
            / 10.0,
        longest_conversation: data.longest_conversation.clone(),
        date_range_label,
    }
}

fn message_distribution(data: &ConversationData) -> Vec<PieSlice> {
    let total = data.total_user_messages + data.total_assistant_messages;
    [
        ("Your Messages", data.total_user_messages, PALETTE[0]),
        ("Assistant Messages", data.total_assistant_messages, PALETTE[1]),
    ]
    .into_iter()
    .map(|(name, value, color)| {
        let percent = percent_of(value, total);
        PieSlice {
            name: name.to_string(),
            value,
            percent,
            color: color.to_string(),
            label: format!("{}: {:.0}%", name, percent),
        }
    })
    .collect()
}

fn model_usage(data: &ConversationData) -> Vec<PieSlice> {
    let total: i64 = data.model_stats.iter().map(|m| m.count).sum();
    data.model_stats
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let percent = percent_of(m.count, total);
            let label = if percent > MODEL_LABEL_MIN_PERCENT {
                format!("{}: {:.0}%", m.model, percent)
            } else {
                String::new()
            };
            PieSlice {
                name: m.model.clone(),
                value: m.count,
                percent,
                color: PALETTE[i % PALETTE.len()].to_string(),
                label,
            }
        })
        .collect()
}
