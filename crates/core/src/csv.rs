// crates/core/src/csv.rs
//! CSV export of the daily and monthly activity tables.

use crate::types::{DailyStat, MonthlyStat};

/// Download file name used by the export endpoint.
pub const EXPORT_FILENAME: &str = "chatgpt-analytics.csv";

const DAILY_HEADER: &str = "Date,Conversations,Messages,User Messages,Assistant Messages";
const MONTHLY_HEADER: &str = "Month,Conversations,Messages,User Messages,Assistant Messages";

/// Escape a CSV field per RFC 4180.
///
/// If the field contains a comma, double quote or line break, wrap it in
/// double quotes and double any internal quotes.
pub fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn build_csv<'a>(header: &str, rows: impl Iterator<Item = (&'a str, [i64; 4])>) -> String {
    let mut lines = vec![header.to_string()];
    for (key, [conversations, messages, user, assistant]) in rows {
        lines.push(format!(
            "{},{},{},{},{}",
            escape_csv_field(key),
            conversations,
            messages,
            user,
            assistant
        ));
    }
    lines.join("\n")
}

/// One line per day: `Date,Conversations,Messages,User Messages,Assistant Messages`.
pub fn daily_stats_csv(stats: &[DailyStat]) -> String {
    build_csv(
        DAILY_HEADER,
        stats.iter().map(|s| {
            (
                s.date.as_str(),
                [
                    s.conversations,
                    s.messages,
                    s.user_messages,
                    s.assistant_messages,
                ],
            )
        }),
    )
}

pub fn monthly_stats_csv(stats: &[MonthlyStat]) -> String {
    build_csv(
        MONTHLY_HEADER,
        stats.iter().map(|s| {
            (
                s.month.as_str(),
                [
                    s.conversations,
                    s.messages,
                    s.user_messages,
                    s.assistant_messages,
                ],
            )
        }),
    )
}
