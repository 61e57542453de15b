//! Shared builders for the aggregate query tests.

#![allow(dead_code)]

use chat_analytics_core::{Content, Conversation, Message};

pub const JAN_5_10AM: f64 = 1704448800.0;
pub const JAN_5_11PM: f64 = 1704497400.0;
pub const JAN_6_8AM: f64 = 1704528000.0;
pub const FEB_10_NOON: f64 = 1707566400.0;

pub fn user(id: &str, text: &str) -> Message {
    Message::new(id, "user", text)
}

pub fn assistant(id: &str, text: &str) -> Message {
    Message::new(id, "assistant", text)
}

/// Five conversations covering the shapes a real export contains:
///
/// | id  | created      | model  | rows | notes                         |
/// |-----|--------------|--------|------|-------------------------------|
/// | c1  | Jan 5 10:00  | gpt-4o | 4    | system prompt under the root  |
/// | c2  | Jan 5 23:30  | gpt-4o | 2    |                               |
/// | c3  | Jan 6 08:00  | gpt-4  | 4    | edited turn, two branches     |
/// | c4  | Feb 10 12:00 | none   | 0    | empty user turn, tool output  |
/// | c5  | none         | o1     | 2    | no timestamps at all          |
pub fn sample_export() -> Vec<Conversation> {
    let c1 = Conversation::new("c1", "Trip planning")
        .with_create_time(JAN_5_10AM)
        .with_model("gpt-4o")
        .with_empty_node("c1-root", None)
        .with_message(Some("c1-root"), Message::new("c1-sys", "system", "Be brief"))
        .with_message(Some("c1-sys"), user("c1-u1", "Plan a trip").with_create_time(JAN_5_10AM))
        .with_message(Some("c1-u1"), assistant("c1-a1", "Where to?"))
        .with_message(Some("c1-a1"), user("c1-u2", "Lisbon"))
        .with_message(Some("c1-u2"), assistant("c1-a2", "Great choice"));

    let c2 = Conversation::new("c2", "Rust question")
        .with_create_time(JAN_5_11PM)
        .with_model("gpt-4o")
        .with_message(None, user("c2-u1", "What is a borrow?"))
        .with_message(Some("c2-u1"), assistant("c2-a1", "A reference"));

    let c3 = Conversation::new("c3", "Edited")
        .with_create_time(JAN_6_8AM)
        .with_model("gpt-4")
        .with_empty_node("c3-root", None)
        .with_message(Some("c3-root"), user("c3-u1", "first wording"))
        .with_message(Some("c3-u1"), assistant("c3-a1", "reply one"))
        .with_message(Some("c3-root"), user("c3-u1b", "second wording"))
        .with_message(Some("c3-u1b"), assistant("c3-a1b", "reply two"));

    let c4 = Conversation::new("c4", "")
        .with_create_time(FEB_10_NOON)
        .with_message(
            None,
            user("c4-u1", "").with_content(Some(Content {
                content_type: "text".into(),
                parts: Some(vec![serde_json::json!({"asset_pointer": "file-1"})]),
                text: None,
            })),
        )
        .with_message(Some("c4-u1"), Message::new("c4-t1", "tool", "search results"));

    let c5 = Conversation::new("c5", "No time")
        .with_model("o1")
        .with_message(None, user("c5-u1", "hello"))
        .with_message(Some("c5-u1"), assistant("c5-a1", "hi"));

    vec![c1, c2, c3, c4, c5]
}
