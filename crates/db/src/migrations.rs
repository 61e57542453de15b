// crates/db/src/migrations.rs
/// Inline SQL migrations for the per-upload analytics database.
///
/// The schema is small and lives only in memory, so inline statements are
/// simpler than sqlx migration files.

pub const MIGRATIONS: &[&str] = &[
    // Migration 1: conversations table
    r#"
CREATE TABLE IF NOT EXISTS conversations (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL DEFAULT '',
    create_time REAL NOT NULL DEFAULT 0,
    update_time REAL NOT NULL DEFAULT 0,
    is_archived BOOLEAN NOT NULL DEFAULT 0,
    is_starred BOOLEAN NOT NULL DEFAULT 0,
    default_model_slug TEXT NOT NULL DEFAULT ''
);
"#,
    // Migration 2: messages table, one row per countable message
    r#"
CREATE TABLE IF NOT EXISTS messages (
    id TEXT NOT NULL,
    conversation_id TEXT NOT NULL REFERENCES conversations(id),
    author_role TEXT NOT NULL,
    create_time REAL NOT NULL DEFAULT 0,
    content_type TEXT NOT NULL DEFAULT '',
    content_text TEXT NOT NULL DEFAULT '',
    message_index INTEGER NOT NULL,
    PRIMARY KEY (conversation_id, message_index)
);
"#,
    // Migration 3: messages indexes
    r#"CREATE INDEX IF NOT EXISTS idx_messages_conversation ON messages(conversation_id);"#,
    r#"CREATE INDEX IF NOT EXISTS idx_messages_role ON messages(author_role);"#,
    // Migration 4: bucket scans filter on creation time
    r#"CREATE INDEX IF NOT EXISTS idx_conversations_create_time ON conversations(create_time);"#,
];
