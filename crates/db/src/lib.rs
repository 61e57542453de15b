// crates/db/src/lib.rs
// In-memory SQLite aggregation layer for uploaded chat exports.

mod ingest;
mod migrations;
mod queries;

pub use ingest::IngestSummary;

use chat_analytics_core::{Conversation, ConversationData};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("Timestamp out of range: {0}")]
    InvalidTimestamp(f64),
}

pub type DbResult<T> = Result<T, DbError>;

/// Handle to one upload's in-memory database.
///
/// Every call to [`Database::new_in_memory`] yields an isolated database;
/// it lives as long as the pool's single connection.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create an empty in-memory database and run migrations.
    ///
    /// The pool holds exactly one connection that is never closed for being
    /// idle or old. Closing the last connection would discard the data.
    pub async fn new_in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?
            .busy_timeout(std::time::Duration::from_secs(5));
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        let db = Self { pool };
        db.run_migrations().await?;
        debug!("In-memory database ready");
        Ok(db)
    }

    /// Run all inline migrations not yet recorded in `_migrations`.
    async fn run_migrations(&self) -> DbResult<()> {
        sqlx::query("CREATE TABLE IF NOT EXISTS _migrations (version INTEGER PRIMARY KEY)")
            .execute(&self.pool)
            .await?;

        let row: (i64,) = sqlx::query_as("SELECT COALESCE(MAX(version), 0) FROM _migrations")
            .fetch_one(&self.pool)
            .await?;
        let current_version = row.0 as usize;

        for (i, migration) in migrations::MIGRATIONS.iter().enumerate() {
            let version = i + 1; // 1-based
            if version > current_version {
                sqlx::query(migration).execute(&self.pool).await?;
                sqlx::query("INSERT INTO _migrations (version) VALUES (?)")
                    .bind(version as i64)
                    .execute(&self.pool)
                    .await?;
            }
        }

        Ok(())
    }

    /// Get a reference to the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

/// Load `conversations` into a fresh database and compute every aggregate.
pub async fn analyze(conversations: &[Conversation]) -> DbResult<ConversationData> {
    let db = Database::new_in_memory().await?;
    let summary = db.ingest(conversations).await?;
    let data = db.conversation_data().await?;

    info!(
        conversations = summary.conversations,
        messages = summary.messages,
        branched = summary.branched_conversations,
        "Export analyzed"
    );
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_database() {
        let db = Database::new_in_memory()
            .await
            .expect("should create in-memory database");

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(db.pool())
            .await
            .expect("conversations table should exist");
        assert_eq!(count.0, 0);

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM messages")
            .fetch_one(db.pool())
            .await
            .expect("messages table should exist");
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_migrations_idempotent() {
        let db = Database::new_in_memory()
            .await
            .expect("first open should succeed");

        db.run_migrations()
            .await
            .expect("second migration run should succeed");

        let applied: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(applied.0 as usize, migrations::MIGRATIONS.len());
    }

    #[tokio::test]
    async fn test_databases_are_isolated() {
        let a = Database::new_in_memory().await.unwrap();
        let b = Database::new_in_memory().await.unwrap();

        sqlx::query("INSERT INTO conversations (id) VALUES ('only-in-a')")
            .execute(a.pool())
            .await
            .unwrap();

        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM conversations")
            .fetch_one(b.pool())
            .await
            .unwrap();
        assert_eq!(count.0, 0);
    }

    #[tokio::test]
    async fn test_analyze_empty_export() {
        let data = analyze(&[]).await.unwrap();
        assert_eq!(data.total_conversations, 0);
        assert_eq!(data.longest_conversation.title, "N/A");
        assert!(data.date_range.earliest.is_none());
    }
}
