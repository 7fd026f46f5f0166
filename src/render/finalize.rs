use super::builder::{MessageBuilder, PendingMessage};
use crate::models::content::ContentPart;
use crate::models::message::{Message, WrapUser};
use crate::models::role::Role;

/// Collapse each in-progress message into the immutable IR record.
pub(crate) fn finalize(builder: MessageBuilder) -> Vec<Message> {
    builder.messages.into_iter().map(finalize_message).collect()
}

fn finalize_message(pending: PendingMessage) -> Message {
    let mut message = Message::new(pending.role);

    // Native passthrough skips all other processing.
    if let Some(native) = pending.native {
        message.native = Some(native);
        return message;
    }

    // Only the outermost whitespace of the whole message is trimmed;
    // interior separators (e.g. a block's trailing newline) survive.
    message.content = pending.fragments.concat().trim().to_string();

    if !pending.file_parts.is_empty() {
        let mut parts = Vec::with_capacity(pending.file_parts.len() + 1);
        if !message.content.is_empty() {
            parts.push(ContentPart::text(&message.content));
        }
        parts.extend(pending.file_parts.into_iter().map(ContentPart::from_file));
        message.parts = Some(parts);
    }

    if !pending.tool_calls.is_empty() {
        message.tool_calls = Some(pending.tool_calls);
    }

    if pending.tool_call_id.is_some() {
        message.tool_is_error = Some(pending.tool_is_error);
    }
    message.tool_call_id = pending.tool_call_id;
    message.tool_name = pending.tool_name;
    message.tool_output = pending.tool_output;

    message.wrap_user = pending.wrap_user.map(|state| WrapUser {
        tag: state.tag,
        mode: state.mode,
        conditions: state.conditions,
    });

    message
}

/// Concatenate all system-role messages into one logical system prompt.
/// A single system message yields exactly its content, with no separator.
pub(crate) fn combined_system(messages: &[Message]) -> Option<String> {
    let texts: Vec<&str> = messages
        .iter()
        .filter(|message| message.role == Role::System && !message.content.is_empty())
        .map(|message| message.content.as_str())
        .collect();
    if texts.is_empty() {
        None
    } else {
        Some(texts.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combined_system() {
        let messages = vec![
            Message::text(Role::System, "S1"),
            Message::text(Role::User, "hi"),
            Message::text(Role::System, "S2"),
        ];
        assert_eq!(combined_system(&messages), Some("S1\n\nS2".to_string()));

        let single = vec![Message::text(Role::System, "S1")];
        assert_eq!(combined_system(&single), Some("S1".to_string()));

        assert_eq!(combined_system(&[]), None);
    }
}
