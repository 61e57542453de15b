// crates/server/src/report.rs
//! Plain-text rendering of an analysis for the `report` command.

use chat_analytics_core::flatten::{active_thread, is_countable, message_text};
use chat_analytics_core::{Conversation, DashboardCharts};
use std::fmt;

/// Monthly rows shown in the text report, most recent last.
const MAX_MONTHS: usize = 12;

/// Messages of the closing exchange shown for the longest conversation.
const LAST_EXCHANGE_LEN: usize = 2;

const EXCERPT_CHARS: usize = 160;

fn excerpt(text: &str) -> String {
    let flat = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if flat.chars().count() <= EXCERPT_CHARS {
        return flat;
    }
    let mut short: String = flat.chars().take(EXCERPT_CHARS).collect();
    short.push_str("...");
    short
}

/// The final countable messages on a conversation's active branch, as
/// `(role, excerpt)` pairs, oldest first.
pub fn last_exchange(conv: &Conversation) -> Vec<(String, String)> {
    let thread: Vec<_> = active_thread(conv)
        .into_iter()
        .filter(|m| is_countable(m))
        .collect();
    let start = thread.len().saturating_sub(LAST_EXCHANGE_LEN);
    thread[start..]
        .iter()
        .map(|m| {
            let role = m.role().map(|r| r.to_string()).unwrap_or_default();
            (role, excerpt(&message_text(m)))
        })
        .collect()
}

/// Text report over an analysis. `longest`, when given, adds the last
/// exchange of that conversation.
pub struct TextReport<'a> {
    pub charts: &'a DashboardCharts,
    pub longest: Option<&'a Conversation>,
}

impl fmt::Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let charts = self.charts;
        let s = &charts.summary;

        writeln!(f, "ChatGPT usage summary")?;
        writeln!(f, "=====================")?;
        writeln!(f, "{:<22}{}", "Conversations:", s.total_conversations)?;
        writeln!(f, "{:<22}{}", "Messages:", s.total_messages)?;
        for slice in &charts.message_distribution {
            writeln!(f, "  {:<20}{} ({:.1}%)", slice.name, slice.value, slice.percent)?;
        }
        writeln!(
            f,
            "{:<22}{:.1}",
            "Avg per conversation:", s.average_messages_per_conversation
        )?;
        writeln!(
            f,
            "{:<22}{} ({} messages)",
            "Longest:", s.longest_conversation.title, s.longest_conversation.message_count
        )?;
        writeln!(
            f,
            "{:<22}{}",
            "Date range:",
            s.date_range_label.as_deref().unwrap_or("n/a")
        )?;

        if let Some(conv) = self.longest {
            let exchange = last_exchange(conv);
            if !exchange.is_empty() {
                writeln!(f, "\nLast exchange in \"{}\"", conv.title_or_empty())?;
                for (role, text) in exchange {
                    writeln!(f, "  {:<10}{}", format!("{role}:"), text)?;
                }
            }
        }

        if !charts.model_usage.is_empty() {
            writeln!(f, "\nModels")?;
            for slice in &charts.model_usage {
                writeln!(f, "  {:<20}{} ({:.1}%)", slice.name, slice.value, slice.percent)?;
            }
        }

        if !charts.monthly_trends.is_empty() {
            writeln!(f, "\nMonthly activity")?;
            let start = charts.monthly_trends.len().saturating_sub(MAX_MONTHS);
            for point in &charts.monthly_trends[start..] {
                writeln!(
                    f,
                    "  {:<10}{:>6} conversations {:>8} messages",
                    point.label, point.conversations, point.messages
                )?;
            }
        }

        Ok(())
    }
}

pub fn render_text(charts: &DashboardCharts, longest: Option<&Conversation>) -> String {
    TextReport { charts, longest }.to_string()
}
