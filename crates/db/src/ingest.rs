// crates/db/src/ingest.rs
//! Loading parsed conversations and their flattened rows.

use crate::{Database, DbResult};
use chat_analytics_core::{flatten_conversation, Conversation, FlattenSummary};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, warn};

/// What one call to [`Database::ingest`] wrote.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub conversations: usize,
    pub messages: usize,
    /// Conversations whose tree has at least one edited or regenerated turn.
    pub branched_conversations: usize,
    /// Conversations dropped because their id was already loaded.
    pub duplicates_skipped: usize,
}

impl Database {
    /// Insert every conversation and its flattened message rows in one
    /// transaction. Either the whole export lands or nothing does.
    ///
    /// A conversation whose id repeats an earlier one is skipped.
    pub async fn ingest(&self, conversations: &[Conversation]) -> DbResult<IngestSummary> {
        let mut summary = IngestSummary::default();
        let mut seen: HashSet<&str> = HashSet::with_capacity(conversations.len());
        let mut tx = self.pool().begin().await?;

        for conv in conversations {
            let key = conv.key();
            if !seen.insert(key) {
                warn!(conversation_id = key, "Skipping duplicate conversation id");
                summary.duplicates_skipped += 1;
                continue;
            }

            sqlx::query(
                r#"INSERT INTO conversations
                   (id, title, create_time, update_time, is_archived, is_starred, default_model_slug)
                   VALUES (?, ?, ?, ?, ?, ?, ?)"#,
            )
            .bind(key)
            .bind(conv.title_or_empty())
            .bind(conv.create_time.unwrap_or(0.0))
            .bind(conv.update_time.unwrap_or(0.0))
            .bind(conv.is_archived.unwrap_or(false))
            .bind(conv.is_starred.unwrap_or(false))
            .bind(conv.model_slug().unwrap_or(""))
            .execute(&mut *tx)
            .await?;

            let rows = flatten_conversation(conv);
            for row in &rows {
                sqlx::query(
                    r#"INSERT INTO messages
                       (id, conversation_id, author_role, create_time, content_type, content_text, message_index)
                       VALUES (?, ?, ?, ?, ?, ?, ?)"#,
                )
                .bind(&row.id)
                .bind(&row.conversation_id)
                .bind(row.author_role.as_str())
                .bind(row.create_time)
                .bind(&row.content_type)
                .bind(&row.content_text)
                .bind(row.message_index)
                .execute(&mut *tx)
                .await?;
            }

            let shape = FlattenSummary::new(conv, &rows);
            debug!(
                conversation_id = key,
                nodes = shape.nodes,
                rows = shape.rows,
                branch_points = shape.branch_points,
                active_thread = shape.active_thread_len,
                "Conversation flattened"
            );

            summary.conversations += 1;
            summary.messages += rows.len();
            if shape.is_branched() {
                summary.branched_conversations += 1;
            }
        }

        tx.commit().await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_analytics_core::Message;

    #[tokio::test]
    async fn test_ingest_counts_rows() {
        let db = Database::new_in_memory().await.unwrap();
        let conv = Conversation::new("c1", "One")
            .with_create_time(1704412800.0)
            .with_message(None, Message::new("m1", "user", "hi"))
            .with_message(Some("m1"), Message::new("m2", "assistant", "hello"));

        let summary = db.ingest(&[conv]).await.unwrap();
        assert_eq!(
            summary,
            IngestSummary {
                conversations: 1,
                messages: 2,
                branched_conversations: 0,
                duplicates_skipped: 0,
            }
        );

        let stored: (String, f64, String) =
            sqlx::query_as("SELECT title, create_time, default_model_slug FROM conversations")
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(stored, ("One".to_string(), 1704412800.0, String::new()));
    }

    #[tokio::test]
    async fn test_ingest_skips_duplicate_ids() {
        let db = Database::new_in_memory().await.unwrap();
        let a = Conversation::new("dup", "first").with_message(None, Message::new("m1", "user", "x"));
        let b = Conversation::new("dup", "second").with_message(None, Message::new("m9", "user", "y"));

        let summary = db.ingest(&[a, b]).await.unwrap();
        assert_eq!(summary.conversations, 1);
        assert_eq!(summary.duplicates_skipped, 1);

        let title: (String,) = sqlx::query_as("SELECT title FROM conversations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(title.0, "first");
    }

    #[tokio::test]
    async fn test_ingest_absent_timestamp_stored_as_zero() {
        let db = Database::new_in_memory().await.unwrap();
        db.ingest(&[Conversation::new("c", "t")]).await.unwrap();

        let row: (f64, f64) = sqlx::query_as("SELECT create_time, update_time FROM conversations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(row, (0.0, 0.0));
    }
}
