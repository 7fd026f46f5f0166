//! Wire-format adapters: pure functions from the message IR to one
//! provider's message schema. All three share a skeleton (render, resolve
//! wrap-user against the caller's history, map) with format-specific leaf
//! mappers.

pub mod aisdk;
pub mod anthropic;
pub mod openai;

use serde_json::Value;

use crate::models::message::Message;
use crate::models::role::Role;
use crate::render::wrap_user::HistoryView;

/// Reduce a provider-native history array to the view the wrap-user
/// evaluator consumes. The schema is opaque beyond "has a user role" and
/// "extract text content" (a plain string or typed parts with a `text`
/// field).
pub(crate) fn history_view(history: Option<&[Value]>) -> HistoryView {
    let Some(history) = history else {
        return HistoryView::default();
    };
    let mut view = HistoryView::default();
    for message in history {
        if message.get("role").and_then(Value::as_str) == Some("user") {
            view.has_user = true;
            view.last_user_text = message_text(message);
        }
    }
    view
}

fn message_text(message: &Value) -> Option<String> {
    match message.get("content") {
        Some(Value::String(text)) => Some(text.clone()),
        Some(Value::Array(blocks)) => {
            let texts: Vec<&str> = blocks
                .iter()
                .filter_map(|block| block.get("text").and_then(Value::as_str))
                .collect();
            if texts.is_empty() {
                None
            } else {
                Some(texts.join("\n"))
            }
        }
        _ => None,
    }
}

/// Stable partition: all system messages first, relative order preserved
/// within each group.
pub(crate) fn systems_first(messages: Vec<Message>) -> Vec<Message> {
    let (systems, rest): (Vec<_>, Vec<_>) = messages
        .into_iter()
        .partition(|message| message.role == Role::System);
    systems.into_iter().chain(rest).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_history_view_last_user_wins() {
        let history = vec![
            json!({"role": "user", "content": "first"}),
            json!({"role": "assistant", "content": "reply"}),
            json!({"role": "user", "content": [{"type": "text", "text": "second"}]}),
        ];
        let view = history_view(Some(&history));
        assert!(view.has_user);
        assert_eq!(view.last_user_text.as_deref(), Some("second"));
    }

    #[test]
    fn test_history_view_without_user_turns() {
        let history = vec![json!({"role": "assistant", "content": "reply"})];
        let view = history_view(Some(&history));
        assert!(!view.has_user);
        assert_eq!(view.last_user_text, None);

        let empty = history_view(None);
        assert!(!empty.has_user);
    }

    #[test]
    fn test_systems_first_is_stable() {
        let messages = vec![
            Message::text(Role::User, "u1"),
            Message::text(Role::System, "s1"),
            Message::text(Role::Assistant, "a1"),
            Message::text(Role::System, "s2"),
        ];
        let sorted = systems_first(messages);
        let contents: Vec<&str> = sorted.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["s1", "s2", "u1", "a1"]);
    }
}
