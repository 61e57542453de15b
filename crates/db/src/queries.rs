// crates/db/src/queries.rs
// Aggregate queries over an ingested export.

use crate::{Database, DbError, DbResult};
use chat_analytics_core::{
    ConversationData, DailyStat, DateRange, LongestConversation, ModelUsage, MonthlyStat, Role,
};
use chrono::{DateTime, Utc};

/// (bucket, conversations, messages, user_messages, assistant_messages)
type BucketRow = (String, i64, i64, i64, i64);

/// Upper bound (exclusive) of a usable creation time: 10000-01-01T00:00:00Z,
/// the first instant SQLite's `strftime` cannot format. The date range and
/// both bucket queries share the window `0 < create_time < MAX_TIMESTAMP`,
/// so a bogus timestamp drops out everywhere, the way a missing one does.
pub(crate) const MAX_TIMESTAMP: f64 = 253_402_300_800.0;

/// Activity bucketed by the conversation's UTC creation day.
const DAILY_SQL: &str = r#"
    SELECT strftime('%Y-%m-%d', c.create_time, 'unixepoch') AS bucket,
           COUNT(DISTINCT c.id),
           COUNT(m.id),
           COALESCE(SUM(CASE WHEN m.author_role = 'user' THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN m.author_role = 'assistant' THEN 1 ELSE 0 END), 0)
    FROM conversations c
    LEFT JOIN messages m ON m.conversation_id = c.id
    WHERE c.create_time > 0 AND c.create_time < 253402300800
    GROUP BY bucket
    HAVING bucket IS NOT NULL
    ORDER BY bucket ASC
"#;

const MONTHLY_SQL: &str = r#"
    SELECT strftime('%Y-%m', c.create_time, 'unixepoch') AS bucket,
           COUNT(DISTINCT c.id),
           COUNT(m.id),
           COALESCE(SUM(CASE WHEN m.author_role = 'user' THEN 1 ELSE 0 END), 0),
           COALESCE(SUM(CASE WHEN m.author_role = 'assistant' THEN 1 ELSE 0 END), 0)
    FROM conversations c
    LEFT JOIN messages m ON m.conversation_id = c.id
    WHERE c.create_time > 0 AND c.create_time < 253402300800
    GROUP BY bucket
    HAVING bucket IS NOT NULL
    ORDER BY bucket ASC
"#;

fn to_datetime(ts: f64) -> DbResult<DateTime<Utc>> {
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9) as u32;
    if !secs.is_finite() || secs < i64::MIN as f64 || secs > i64::MAX as f64 {
        return Err(DbError::InvalidTimestamp(ts));
    }
    DateTime::from_timestamp(secs as i64, nanos).ok_or(DbError::InvalidTimestamp(ts))
}

impl Database {
    pub async fn total_conversations(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    pub async fn total_messages(&self) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    pub async fn count_messages_by_role(&self, role: &Role) -> DbResult<i64> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages WHERE author_role = ?")
            .bind(role.as_str())
            .fetch_one(self.pool())
            .await?;
        Ok(row.0)
    }

    /// Earliest and latest conversation creation time. Both are `None` when
    /// no conversation carries a usable timestamp.
    pub async fn date_range(&self) -> DbResult<DateRange> {
        let (min, max): (Option<f64>, Option<f64>) = sqlx::query_as(
            r#"SELECT MIN(create_time), MAX(create_time)
               FROM conversations
               WHERE create_time > 0 AND create_time < 253402300800"#,
        )
        .fetch_one(self.pool())
        .await?;

        Ok(DateRange {
            earliest: min.map(to_datetime).transpose()?,
            latest: max.map(to_datetime).transpose()?,
        })
    }

    async fn bucket_rows(&self, sql: &'static str) -> DbResult<Vec<BucketRow>> {
        let rows: Vec<BucketRow> = sqlx::query_as(sql).fetch_all(self.pool()).await?;
        Ok(rows)
    }

    /// Activity per UTC day of conversation creation, oldest first.
    pub async fn daily_stats(&self) -> DbResult<Vec<DailyStat>> {
        let rows = self.bucket_rows(DAILY_SQL).await?;
        Ok(rows
            .into_iter()
            .map(|(date, conversations, messages, user_messages, assistant_messages)| DailyStat {
                date,
                conversations,
                messages,
                user_messages,
                assistant_messages,
            })
            .collect())
    }

    /// Activity per UTC month of conversation creation, oldest first.
    pub async fn monthly_stats(&self) -> DbResult<Vec<MonthlyStat>> {
        let rows = self.bucket_rows(MONTHLY_SQL).await?;
        Ok(rows
            .into_iter()
            .map(|(month, conversations, messages, user_messages, assistant_messages)| MonthlyStat {
                month,
                conversations,
                messages,
                user_messages,
                assistant_messages,
            })
            .collect())
    }

    /// Conversations per default model, most used first.
    pub async fn model_stats(&self) -> DbResult<Vec<ModelUsage>> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"SELECT default_model_slug, COUNT(*) AS n
               FROM conversations
               WHERE default_model_slug != ''
               GROUP BY default_model_slug
               ORDER BY n DESC, default_model_slug ASC"#,
        )
        .fetch_all(self.pool())
        .await?;

        Ok(rows
            .into_iter()
            .map(|(model, count)| ModelUsage { model, count })
            .collect())
    }

    /// Mean row count over conversations that have at least one row.
    pub async fn average_messages_per_conversation(&self) -> DbResult<f64> {
        let row: (Option<f64>,) = sqlx::query_as(
            r#"SELECT AVG(n) FROM (
                   SELECT COUNT(*) AS n FROM messages GROUP BY conversation_id
               )"#,
        )
        .fetch_one(self.pool())
        .await?;
        Ok(row.0.unwrap_or(0.0))
    }

    /// Conversation with the most rows. Ties go to the earliest created,
    /// then the smallest id.
    pub async fn longest_conversation(&self) -> DbResult<LongestConversation> {
        let row: Option<(String, i64)> = sqlx::query_as(
            r#"SELECT c.title, COUNT(m.id) AS n
               FROM conversations c
               JOIN messages m ON m.conversation_id = c.id
               GROUP BY c.id
               ORDER BY n DESC, c.create_time ASC, c.id ASC
               LIMIT 1"#,
        )
        .fetch_optional(self.pool())
        .await?;

        Ok(match row {
            Some((title, message_count)) if !title.is_empty() => LongestConversation {
                title,
                message_count,
            },
            Some((_, message_count)) => LongestConversation {
                message_count,
                ..Default::default()
            },
            None => LongestConversation::default(),
        })
    }

    /// Run every aggregate and assemble the dashboard payload.
    pub async fn conversation_data(&self) -> DbResult<ConversationData> {
        Ok(ConversationData {
            total_conversations: self.total_conversations().await?,
            total_messages: self.total_messages().await?,
            total_user_messages: self.count_messages_by_role(&Role::User).await?,
            total_assistant_messages: self.count_messages_by_role(&Role::Assistant).await?,
            date_range: self.date_range().await?,
            daily_stats: self.daily_stats().await?,
            monthly_stats: self.monthly_stats().await?,
            model_stats: self.model_stats().await?,
            average_messages_per_conversation: self.average_messages_per_conversation().await?,
            longest_conversation: self.longest_conversation().await?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_datetime_keeps_fraction() {
        let dt = to_datetime(1704412800.5).unwrap();
        assert_eq!(dt.timestamp(), 1704412800);
        assert_eq!(dt.timestamp_subsec_millis(), 500);
    }

    #[test]
    fn test_to_datetime_out_of_range() {
        assert!(matches!(
            to_datetime(1e20),
            Err(DbError::InvalidTimestamp(_))
        ));
    }

    #[test]
    fn test_timestamp_window_matches_sql() {
        let bound = format!("{}", MAX_TIMESTAMP as i64);
        assert!(DAILY_SQL.contains(&bound));
        assert!(MONTHLY_SQL.contains(&bound));

        let last = to_datetime(MAX_TIMESTAMP - 1.0).unwrap();
        assert_eq!(last.format("%Y-%m-%d").to_string(), "9999-12-31");
    }
}
