// crates/core/src/types.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

// ============================================================================
// Export schema (conversations.json)
// ============================================================================

/// Author role of an exported message.
///
/// Unknown roles are preserved as `Other` so newer exports still parse.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    User,
    Assistant,
    System,
    Tool,
    Other(String),
}

impl Role {
    pub fn as_str(&self) -> &str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::System => "system",
            Role::Tool => "tool",
            Role::Other(s) => s,
        }
    }

    /// Only user and assistant turns count toward usage statistics.
    pub fn is_countable(&self) -> bool {
        matches!(self, Role::User | Role::Assistant)
    }
}

impl From<String> for Role {
    fn from(s: String) -> Self {
        match s.as_str() {
            "user" => Role::User,
            "assistant" => Role::Assistant,
            "system" => Role::System,
            "tool" => Role::Tool,
            _ => Role::Other(s),
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        Role::from(s.to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(s) => s,
            other => other.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Author {
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Message body. `parts` may hold non-string items (images, attachments),
/// which carry no text.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub content_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<serde_json::Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    #[serde(default)]
    pub author: Option<Author>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update_time: Option<f64>,
    #[serde(default)]
    pub content: Option<Content>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_turn: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
}

impl Message {
    /// A message whose content is a single text part.
    pub fn new(id: impl Into<String>, role: impl Into<Role>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            author: Some(Author {
                role: role.into(),
                name: None,
            }),
            create_time: None,
            update_time: None,
            content: Some(Content {
                content_type: "text".to_string(),
                parts: Some(vec![serde_json::Value::String(text.into())]),
                text: None,
            }),
            status: None,
            end_turn: None,
            weight: None,
            recipient: None,
            channel: None,
        }
    }

    pub fn with_create_time(mut self, ts: f64) -> Self {
        self.create_time = Some(ts);
        self
    }

    pub fn with_content(mut self, content: Option<Content>) -> Self {
        self.content = content;
        self
    }

    pub fn role(&self) -> Option<&Role> {
        self.author.as_ref().map(|a| &a.role)
    }

    pub fn content_type(&self) -> &str {
        self.content
            .as_ref()
            .map(|c| c.content_type.as_str())
            .unwrap_or("")
    }
}

/// One node of a conversation's message tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageNode {
    pub id: String,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// One exported chat session.
///
/// `mapping` is a `BTreeMap` so every traversal of it is ordered by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub create_time: Option<f64>,
    #[serde(default)]
    pub update_time: Option<f64>,
    pub mapping: BTreeMap<String, MessageNode>,
    #[serde(default)]
    pub current_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub is_archived: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_starred: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversation_origin: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gizmo_id: Option<String>,
}

impl Conversation {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_create_time(mut self, ts: f64) -> Self {
        self.create_time = Some(ts);
        self
    }

    pub fn with_model(mut self, slug: impl Into<String>) -> Self {
        self.default_model_slug = Some(slug.into());
        self
    }

    /// Append `message` as a child of `parent` (or as a root when `parent` is
    /// `None`) and make it the current node.
    pub fn with_message(mut self, parent: Option<&str>, message: Message) -> Self {
        let node_id = message.id.clone();
        self.push_node(node_id.clone(), parent, Some(message));
        self.current_node = Some(node_id);
        self
    }

    /// Insert a node without a message (export roots usually look like this).
    pub fn with_empty_node(mut self, node_id: &str, parent: Option<&str>) -> Self {
        self.push_node(node_id.to_string(), parent, None);
        self
    }

    fn push_node(&mut self, node_id: String, parent: Option<&str>, message: Option<Message>) {
        if let Some(parent_node) = parent.and_then(|p| self.mapping.get_mut(p)) {
            parent_node.children.push(node_id.clone());
        }
        self.mapping.insert(
            node_id.clone(),
            MessageNode {
                id: node_id,
                message,
                parent: parent.map(String::from),
                children: Vec::new(),
            },
        );
    }

    /// Stable identifier: `id`, falling back to `conversation_id` for exports
    /// that only carry the latter.
    pub fn key(&self) -> &str {
        if !self.id.is_empty() {
            return &self.id;
        }
        self.conversation_id.as_deref().unwrap_or("")
    }

    pub fn title_or_empty(&self) -> &str {
        self.title.as_deref().unwrap_or("")
    }

    pub fn model_slug(&self) -> Option<&str> {
        self.default_model_slug.as_deref().filter(|s| !s.is_empty())
    }
}

// ============================================================================
// Flattened rows
// ============================================================================

/// One countable message, flattened out of a conversation's node tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub author_role: Role,
    /// Seconds since epoch; 0.0 when the export has no timestamp.
    pub create_time: f64,
    pub content_type: String,
    pub content_text: String,
    pub message_index: i64,
}

// ============================================================================
// Aggregate results
// ============================================================================

/// Activity counters for one UTC calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    /// `YYYY-MM-DD`
    pub date: String,
    #[ts(type = "number")]
    pub conversations: i64,
    #[ts(type = "number")]
    pub messages: i64,
    #[ts(type = "number")]
    pub user_messages: i64,
    #[ts(type = "number")]
    pub assistant_messages: i64,
}

/// Activity counters for one UTC calendar month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct MonthlyStat {
    /// `YYYY-MM`
    pub month: String,
    #[ts(type = "number")]
    pub conversations: i64,
    #[ts(type = "number")]
    pub messages: i64,
    #[ts(type = "number")]
    pub user_messages: i64,
    #[ts(type = "number")]
    pub assistant_messages: i64,
}

/// Number of conversations whose default model was `model`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct ModelUsage {
    pub model: String,
    #[ts(type = "number")]
    pub count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[ts(type = "string | null")]
    pub earliest: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub latest: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct LongestConversation {
    pub title: String,
    #[ts(type = "number")]
    pub message_count: i64,
}

impl Default for LongestConversation {
    fn default() -> Self {
        Self {
            title: "N/A".to_string(),
            message_count: 0,
        }
    }
}

/// Everything the dashboard shows for one uploaded export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "codegen", ts(export, export_to = "../../web/src/types/generated/"))]
#[serde(rename_all = "camelCase")]
pub struct ConversationData {
    #[ts(type = "number")]
    pub total_conversations: i64,
    #[ts(type = "number")]
    pub total_messages: i64,
    #[ts(type = "number")]
    pub total_user_messages: i64,
    #[ts(type = "number")]
    pub total_assistant_messages: i64,
    pub date_range: DateRange,
    pub daily_stats: Vec<DailyStat>,
    pub monthly_stats: Vec<MonthlyStat>,
    /// Sorted by count, most used first.
    pub model_stats: Vec<ModelUsage>,
    pub average_messages_per_conversation: f64,
    pub longest_conversation: LongestConversation,
}
