// crates/server/src/commands.rs
//! Offline commands: `report` and `demo`.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result};
use chat_analytics_core::csv::daily_stats_csv;
use chat_analytics_core::fixtures::{prepare_demo, DemoOptions};
use chat_analytics_core::{
    flatten_conversation, parse_export_file, parse_export_values, read_export_file, Conversation,
    DashboardCharts,
};
use chrono::Utc;

use crate::cli::ReportFormat;
use crate::report::render_text;

/// Conversation with the most countable messages. Ties go to the earliest
/// `create_time`, then the smallest id, the same order the database uses.
/// A repeated id counts only at its first occurrence, as in ingest.
fn longest(conversations: &[Conversation]) -> Option<&Conversation> {
    let mut seen = HashSet::new();
    conversations
        .iter()
        .filter(|c| seen.insert(c.key()))
        .map(|c| (c, flatten_conversation(c).len()))
        .filter(|(_, count)| *count > 0)
        .max_by(|(a, a_count), (b, b_count)| {
            a_count
                .cmp(b_count)
                .then_with(|| {
                    let a_time = a.create_time.unwrap_or(0.0);
                    let b_time = b.create_time.unwrap_or(0.0);
                    b_time.partial_cmp(&a_time).unwrap_or(Ordering::Equal)
                })
                .then_with(|| b.key().cmp(a.key()))
        })
        .map(|(c, _)| c)
}

/// Analyze an export file and render it in `format`.
pub async fn run_report(path: &Path, format: ReportFormat) -> Result<String> {
    let conversations = parse_export_file(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    let data = chat_analytics_db::analyze(&conversations).await?;

    let output = match format {
        ReportFormat::Text => {
            render_text(&DashboardCharts::from_data(&data), longest(&conversations))
        }
        ReportFormat::Json => serde_json::to_string_pretty(&data)?,
        ReportFormat::Csv => daily_stats_csv(&data.daily_stats),
    };
    Ok(output)
}

/// Write a trimmed copy of `input` to `output`. Returns the number of
/// conversations kept.
pub async fn run_demo(input: &Path, output: &Path, options: &DemoOptions) -> Result<usize> {
    let bytes = read_export_file(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let conversations = parse_export_values(&bytes)?;
    let total = conversations.len();

    let demo = prepare_demo(conversations, options, Utc::now());
    let json = serde_json::to_vec_pretty(&demo)?;
    tokio::fs::write(output, json)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;

    tracing::info!(
        input = %input.display(),
        output = %output.display(),
        total,
        kept = demo.len(),
        "Demo export written"
    );
    Ok(demo.len())
}
