//! Property tests for message-tree flattening.

use chat_analytics_core::{flatten_all, flatten_conversation, Conversation, Message, Role};
use proptest::prelude::*;

const ROLES: [&str; 4] = ["user", "assistant", "system", "tool"];

/// One generated node: role index, text (maybe empty), whether content is
/// present at all, and a parent pick among earlier nodes.
type GenNode = (usize, String, bool, Option<usize>);

fn gen_node() -> impl Strategy<Value = GenNode> {
    (
        0..ROLES.len(),
        prop_oneof![Just(String::new()), "[a-z]{1,8}( [a-z]{1,8})?"],
        prop::bool::weighted(0.9),
        prop::option::of(any::<usize>()),
    )
}

fn build(conv_id: &str, nodes: &[GenNode]) -> Conversation {
    let mut conv = Conversation::new(conv_id, conv_id);
    for (i, (role, text, has_content, parent)) in nodes.iter().enumerate() {
        let id = format!("{conv_id}-n{i}");
        let parent_id = match parent {
            Some(p) if i > 0 => Some(format!("{conv_id}-n{}", p % i)),
            _ => None,
        };
        let mut message = Message::new(id, ROLES[*role], text.clone());
        if !has_content {
            message = message.with_content(None);
        }
        conv = conv.with_message(parent_id.as_deref(), message);
    }
    conv
}

/// `(id, role, text)` for every node that should produce a row, sorted.
fn expected_rows(conv_id: &str, nodes: &[GenNode]) -> Vec<(String, String, String)> {
    let mut rows: Vec<_> = nodes
        .iter()
        .enumerate()
        .filter(|(_, (role, text, has_content, _))| *role < 2 && *has_content && !text.is_empty())
        .map(|(i, (role, text, _, _))| {
            (format!("{conv_id}-n{i}"), ROLES[*role].to_string(), text.clone())
        })
        .collect();
    rows.sort();
    rows
}

fn role_counts(conversations: &[Conversation]) -> (usize, usize) {
    let rows = flatten_all(conversations);
    let users = rows.iter().filter(|r| r.author_role == Role::User).count();
    (users, rows.len() - users)
}

proptest! {
    #[test]
    fn rows_match_eligible_messages(nodes in prop::collection::vec(gen_node(), 0..24)) {
        let conv = build("c", &nodes);
        let rows = flatten_conversation(&conv);

        let mut actual: Vec<_> = rows
            .iter()
            .map(|r| (r.id.clone(), r.author_role.to_string(), r.content_text.clone()))
            .collect();
        actual.sort();

        prop_assert_eq!(actual, expected_rows("c", &nodes));
    }

    #[test]
    fn excluded_rows_never_appear(nodes in prop::collection::vec(gen_node(), 0..24)) {
        let rows = flatten_conversation(&build("c", &nodes));
        for row in &rows {
            prop_assert!(row.author_role.is_countable());
            prop_assert!(!row.content_text.is_empty());
            prop_assert_eq!(row.conversation_id.as_str(), "c");
        }
    }

    #[test]
    fn message_index_is_dense(nodes in prop::collection::vec(gen_node(), 0..24)) {
        let rows = flatten_conversation(&build("c", &nodes));
        let indexes: Vec<i64> = rows.iter().map(|r| r.message_index).collect();
        let dense: Vec<i64> = (0..rows.len() as i64).collect();
        prop_assert_eq!(indexes, dense);
    }

    #[test]
    fn disjoint_conversations_flatten_to_union(
        a in prop::collection::vec(gen_node(), 0..16),
        b in prop::collection::vec(gen_node(), 0..16),
    ) {
        let first = build("a", &a);
        let second = build("b", &b);

        let mut union = flatten_conversation(&first);
        union.extend(flatten_conversation(&second));
        let all = flatten_all(&[first.clone(), second.clone()]);
        prop_assert_eq!(&all, &union);

        prop_assert_eq!(
            role_counts(&[first.clone(), second.clone()]),
            role_counts(&[second, first])
        );
    }
}

#[test]
fn system_root_with_user_reply() {
    let conv = Conversation::new("c", "t")
        .with_message(None, Message::new("sys", "system", "You are helpful"))
        .with_message(Some("sys"), Message::new("u", "user", "hello"));

    let rows = flatten_conversation(&conv);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].id, "u");
    assert_eq!(rows[0].message_index, 0);
}
