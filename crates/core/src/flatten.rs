// crates/core/src/flatten.rs
//! Flattening of a conversation's message tree into tabular rows.
//!
//! An export stores every conversation as a `mapping` of node id to node,
//! linked through `parent` / `children`. Editing or regenerating a turn adds
//! a sibling branch, so the mapping is a tree rather than a chain. Statistics
//! count every countable message in the tree, not only the active branch.

use crate::types::{Conversation, Message, MessageNode, MessageRow};
use serde::Serialize;
use std::collections::HashSet;

/// Text of a message: string `parts` joined with a space, or `text` when
/// there are no parts. Non-string parts contribute nothing.
pub fn message_text(message: &Message) -> String {
    let Some(content) = &message.content else {
        return String::new();
    };

    match content.parts.as_deref() {
        Some(parts) if !parts.is_empty() => parts
            .iter()
            .filter_map(|p| p.as_str())
            .collect::<Vec<_>>()
            .join(" "),
        _ => content.text.clone().unwrap_or_default(),
    }
}

/// A message counts toward statistics when it has a user or assistant author
/// and non-empty content.
pub fn is_countable(message: &Message) -> bool {
    message.role().is_some_and(|r| r.is_countable()) && !message_text(message).is_empty()
}

/// Node visit order: depth-first from each root, following `children` order.
///
/// Roots are nodes without a parent or whose parent is missing from the
/// mapping. Nodes that no root reaches (cycles, dangling links) are visited
/// afterwards, starting from each unvisited node in id order. Every node is
/// returned exactly once.
fn traversal_order(conv: &Conversation) -> Vec<&MessageNode> {
    let mapping = &conv.mapping;
    let mut visited: HashSet<&str> = HashSet::with_capacity(mapping.len());
    let mut order = Vec::with_capacity(mapping.len());
    let mut stack: Vec<&str> = Vec::new();

    let roots = mapping
        .iter()
        .filter(|(_, node)| {
            node.parent
                .as_deref()
                .map_or(true, |p| !mapping.contains_key(p))
        })
        .map(|(id, _)| id.as_str());
    let starts = roots.chain(mapping.keys().map(String::as_str));

    for start in starts {
        stack.push(start);
        while let Some(id) = stack.pop() {
            if !visited.insert(id) {
                continue;
            }
            let Some(node) = mapping.get(id) else {
                continue;
            };
            order.push(node);
            for child in node.children.iter().rev() {
                if mapping.contains_key(child) && !visited.contains(child.as_str()) {
                    stack.push(child);
                }
            }
        }
    }

    order
}

/// Emit one row per countable message in the conversation.
///
/// `message_index` numbers the emitted rows in traversal order starting at 0.
pub fn flatten_conversation(conv: &Conversation) -> Vec<MessageRow> {
    let conversation_id = conv.key();

    traversal_order(conv)
        .into_iter()
        .filter_map(|node| node.message.as_ref())
        .filter_map(|message| {
            let role = message.role()?;
            if !role.is_countable() {
                return None;
            }
            let text = message_text(message);
            (!text.is_empty()).then(|| (message, role.clone(), text))
        })
        .enumerate()
        .map(|(index, (message, role, text))| MessageRow {
            id: message.id.clone(),
            conversation_id: conversation_id.to_string(),
            author_role: role,
            create_time: message.create_time.unwrap_or(0.0),
            content_type: message.content_type().to_string(),
            content_text: text,
            message_index: index as i64,
        })
        .collect()
}

/// Flatten every conversation, concatenating the rows in input order.
pub fn flatten_all(conversations: &[Conversation]) -> Vec<MessageRow> {
    conversations.iter().flat_map(flatten_conversation).collect()
}

/// Messages on the active branch, root first.
///
/// Walks parent links from `current_node`; stops at a missing node or on the
/// first repeated id. Nodes without a message (the usual export root) are
/// skipped.
pub fn active_thread(conv: &Conversation) -> Vec<&Message> {
    let mut thread = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut cursor = conv.current_node.as_deref();

    while let Some(id) = cursor {
        if !seen.insert(id) {
            break;
        }
        let Some(node) = conv.mapping.get(id) else {
            break;
        };
        if let Some(message) = &node.message {
            thread.push(message);
        }
        cursor = node.parent.as_deref();
    }

    thread.reverse();
    thread
}

/// Shape of one conversation's tree, for logging and the text report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlattenSummary {
    pub nodes: usize,
    pub rows: usize,
    /// Nodes with more than one child (an edited or regenerated turn).
    pub branch_points: usize,
    pub active_thread_len: usize,
}

impl FlattenSummary {
    pub fn new(conv: &Conversation, rows: &[MessageRow]) -> Self {
        Self {
            nodes: conv.mapping.len(),
            rows: rows.len(),
            branch_points: conv
                .mapping
                .values()
                .filter(|n| n.children.len() > 1)
                .count(),
            active_thread_len: active_thread(conv)
                .into_iter()
                .filter(|m| is_countable(m))
                .count(),
        }
    }

    pub fn is_branched(&self) -> bool {
        self.branch_points > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Content, Role};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn text_content(text: Option<&str>, parts: Option<Vec<serde_json::Value>>) -> Option<Content> {
        Some(Content {
            content_type: "text".into(),
            parts,
            text: text.map(String::from),
        })
    }

    /// root -> system -> user -> assistant, plus an edited user branch.
    fn branched_conversation() -> Conversation {
        Conversation::new("conv-1", "Branched")
            .with_empty_node("root", None)
            .with_message(Some("root"), Message::new("sys", "system", "You are helpful"))
            .with_message(Some("sys"), Message::new("u1", "user", "first try"))
            .with_message(Some("u1"), Message::new("a1", "assistant", "answer one"))
            .with_message(Some("sys"), Message::new("u2", "user", "edited question"))
            .with_message(Some("u2"), Message::new("a2", "assistant", "answer two"))
    }

    #[test]
    fn test_message_text_joins_string_parts() {
        let msg = Message::new("m", "user", "")
            .with_content(text_content(None, Some(vec![json!("hello"), json!("world")])));
        assert_eq!(message_text(&msg), "hello world");
    }

    #[test]
    fn test_message_text_skips_non_string_parts() {
        let msg = Message::new("m", "user", "").with_content(text_content(
            None,
            Some(vec![json!({"asset_pointer": "file-1"}), json!("caption")]),
        ));
        assert_eq!(message_text(&msg), "caption");
    }

    #[test]
    fn test_message_text_falls_back_to_text_field() {
        let msg = Message::new("m", "assistant", "")
            .with_content(text_content(Some("code output"), None));
        assert_eq!(message_text(&msg), "code output");

        let msg = Message::new("m", "assistant", "")
            .with_content(text_content(Some("from text"), Some(vec![])));
        assert_eq!(message_text(&msg), "from text");
    }

    #[test]
    fn test_message_text_absent_content() {
        let msg = Message::new("m", "user", "").with_content(None);
        assert_eq!(message_text(&msg), "");
        assert!(!is_countable(&msg));
    }

    #[test]
    fn test_flatten_skips_system_and_empty_nodes() {
        let conv = branched_conversation();
        let rows = flatten_conversation(&conv);

        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "a1", "u2", "a2"]);
        assert!(rows.iter().all(|r| r.author_role != Role::System));
        assert!(rows.iter().all(|r| r.conversation_id == "conv-1"));
    }

    #[test]
    fn test_flatten_numbers_rows_sequentially() {
        let rows = flatten_conversation(&branched_conversation());
        let indexes: Vec<i64> = rows.iter().map(|r| r.message_index).collect();
        assert_eq!(indexes, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_flatten_preserves_content_and_time() {
        let conv = Conversation::new("c", "t").with_message(
            None,
            Message::new("m1", "assistant", "").with_create_time(1704412800.25).with_content(
                text_content(None, Some(vec![json!("a"), json!("b")])),
            ),
        );
        let rows = flatten_conversation(&conv);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].content_text, "a b");
        assert_eq!(rows[0].content_type, "text");
        assert_eq!(rows[0].create_time, 1704412800.25);
    }

    #[test]
    fn test_flatten_missing_timestamp_is_zero() {
        let conv = Conversation::new("c", "t").with_message(None, Message::new("m1", "user", "x"));
        assert_eq!(flatten_conversation(&conv)[0].create_time, 0.0);
    }

    #[test]
    fn test_flatten_excludes_tool_and_unknown_roles() {
        let conv = Conversation::new("c", "t")
            .with_message(None, Message::new("t1", "tool", "search results"))
            .with_message(Some("t1"), Message::new("x1", "critic", "hmm"))
            .with_message(Some("x1"), Message::new("u1", "user", "ok"));
        let rows = flatten_conversation(&conv);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "u1");
    }

    #[test]
    fn test_flatten_message_without_author() {
        let mut msg = Message::new("m1", "user", "orphan");
        msg.author = None;
        let conv = Conversation::new("c", "t").with_message(None, msg);
        assert!(flatten_conversation(&conv).is_empty());
    }

    #[test]
    fn test_flatten_survives_parent_cycle() {
        let mut conv = Conversation::new("c", "t")
            .with_message(None, Message::new("a", "user", "one"))
            .with_message(Some("a"), Message::new("b", "assistant", "two"));
        // a <-> b: no root remains
        conv.mapping.get_mut("a").unwrap().parent = Some("b".into());
        conv.mapping.get_mut("b").unwrap().children.push("a".into());

        let rows = flatten_conversation(&conv);
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_flatten_dangling_child_and_orphan_parent() {
        let mut conv = Conversation::new("c", "t")
            .with_message(Some("gone"), Message::new("m1", "user", "parent was pruned"));
        conv.mapping
            .get_mut("m1")
            .unwrap()
            .children
            .push("does-not-exist".into());
        let rows = flatten_conversation(&conv);
        assert_eq!(rows.len(), 1);
    }

    #[test]
    fn test_flatten_all_concatenates() {
        let a = branched_conversation();
        let b = Conversation::new("conv-2", "Other")
            .with_message(None, Message::new("x", "user", "q"));
        let rows = flatten_all(&[a, b]);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.last().unwrap().conversation_id, "conv-2");
    }

    #[test]
    fn test_active_thread_follows_current_node() {
        let conv = branched_conversation();
        let ids: Vec<&str> = active_thread(&conv).iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["sys", "u2", "a2"]);
    }

    #[test]
    fn test_active_thread_without_current_node() {
        let mut conv = branched_conversation();
        conv.current_node = None;
        assert!(active_thread(&conv).is_empty());
    }

    #[test]
    fn test_active_thread_stops_on_cycle() {
        let mut conv = branched_conversation();
        conv.mapping.get_mut("root").unwrap().parent = Some("a2".into());
        let thread = active_thread(&conv);
        assert_eq!(thread.len(), 3);
    }

    #[test]
    fn test_flatten_summary() {
        let conv = branched_conversation();
        let rows = flatten_conversation(&conv);
        let summary = FlattenSummary::new(&conv, &rows);
        assert_eq!(
            summary,
            FlattenSummary {
                nodes: 6,
                rows: 4,
                branch_points: 1,
                active_thread_len: 2,
            }
        );
        assert!(summary.is_branched());
    }
}
