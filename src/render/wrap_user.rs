use tracing::debug;

use super::builder::placeholder_token;
use super::walker;
use crate::models::content::{ContentPart, FilePart};
use crate::models::message::{Message, WrapMode, WrapUser};
use crate::models::node::RenderContext;
use crate::models::role::Role;

/// The caller-supplied conversation history reduced to what the evaluator
/// needs: whether a user turn exists and the last user turn's text.
#[derive(Debug, Clone, Default)]
pub(crate) struct HistoryView {
    pub has_user: bool,
    pub last_user_text: Option<String>,
}

/// Evaluate deferred conditionals and fold all wrap-user messages into one
/// user message merged with the history's last user turn. Messages without
/// wrap-user metadata pass through in order; the merged message replaces the
/// wrap-user messages at the position of the first one.
pub(crate) fn resolve(messages: Vec<Message>, history: &HistoryView) -> Vec<Message> {
    if !messages.iter().any(Message::is_wrap_user) {
        return messages;
    }
    let ctx = RenderContext {
        has_user: history.has_user,
    };
    debug!(has_user = history.has_user, "resolving wrap-user messages");

    let mut out = Vec::with_capacity(messages.len());
    let mut insert_at = None;
    let mut prefixes = Vec::new();
    let mut suffixes = Vec::new();
    let mut file_parts: Vec<FilePart> = Vec::new();
    let mut tag = String::from("user");

    for message in messages {
        let Some(wrap) = message.wrap_user.clone() else {
            out.push(message);
            continue;
        };
        if insert_at.is_none() {
            insert_at = Some(out.len());
        }
        // Last tag wins across multiple wrap-user fragments.
        tag = wrap.tag.clone();

        // Parts attached while walking the marker's children come before
        // parts discovered during conditional evaluation.
        if let Some(parts) = &message.parts {
            file_parts.extend(parts.iter().filter_map(|p| p.as_file().cloned()));
        }

        let (content, evaluated_parts) = substitute(&message, &wrap, &ctx);
        file_parts.extend(evaluated_parts);

        match wrap.mode {
            WrapMode::Prefix => prefixes.push(content),
            WrapMode::Suffix => suffixes.push(content),
        }
    }

    let mut pieces = prefixes;
    if let Some(original) = &history.last_user_text {
        pieces.push(format!("<{tag}>\n{original}\n</{tag}>"));
    }
    pieces.extend(suffixes);

    let content = pieces
        .iter()
        .filter(|piece| !piece.is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join("\n\n");

    let mut merged = Message::text(Role::User, content);
    if !file_parts.is_empty() {
        let mut parts = Vec::with_capacity(file_parts.len() + 1);
        if !merged.content.is_empty() {
            parts.push(ContentPart::text(&merged.content));
        }
        parts.extend(file_parts.into_iter().map(ContentPart::from_file));
        merged.parts = Some(parts);
    }

    out.insert(insert_at.unwrap_or(out.len()), merged);
    out
}

/// Two-pass template fill: the walk left indexed placeholder tokens in the
/// content; each stored conditional runs exactly once and its rendered
/// output is spliced back into position.
fn substitute(message: &Message, wrap: &WrapUser, ctx: &RenderContext) -> (String, Vec<FilePart>) {
    let mut content = message.content.clone();
    let mut parts = Vec::new();
    for (index, condition) in wrap.conditions.iter().enumerate() {
        let node = condition(ctx);
        let fragment = walker::render_fragment(&node, ctx);
        content = content.replace(&placeholder_token(index), &fragment.content);
        parts.extend(fragment.parts);
    }
    (content.trim().to_string(), parts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{conditional, file_data, wrap_user, wrap_user_with};
    use crate::models::node::Node;
    use crate::nodes;
    use crate::render::render;

    fn with_user(text: &str) -> HistoryView {
        HistoryView {
            has_user: true,
            last_user_text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_no_history_synthesizes_a_plain_user_message() {
        let resolved = resolve(render(wrap_user("A")), &HistoryView::default());
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].role, Role::User);
        assert_eq!(resolved[0].content, "A");
        assert!(!resolved[0].is_wrap_user());
    }

    #[test]
    fn test_suffix_mode_places_content_after_the_wrapped_original() {
        let resolved = resolve(render(wrap_user("A")), &with_user("Q"));
        assert_eq!(resolved[0].content, "<user>\nQ\n</user>\n\nA");
    }

    #[test]
    fn test_prefix_mode_places_content_before_the_wrapped_original() {
        let tree = wrap_user_with("user", WrapMode::Prefix, "A");
        let resolved = resolve(render(tree), &with_user("Q"));
        assert_eq!(resolved[0].content, "A\n\n<user>\nQ\n</user>");
    }

    #[test]
    fn test_last_tag_wins_across_fragments() {
        let tree = nodes![
            wrap_user_with("context", WrapMode::Prefix, "P"),
            wrap_user_with("question", WrapMode::Suffix, "S"),
        ];
        let resolved = resolve(render(tree), &with_user("Q"));
        assert_eq!(resolved.len(), 1);
        assert_eq!(
            resolved[0].content,
            "P\n\n<question>\nQ\n</question>\n\nS"
        );
    }

    #[test]
    fn test_placeholders_keep_authored_interleaving() {
        let tree = wrap_user(nodes![
            "before ",
            conditional(|ctx: &RenderContext| {
                if ctx.has_user {
                    Node::from("[seen]")
                } else {
                    Node::from("[first]")
                }
            }),
            " after",
        ]);

        let resolved = resolve(render(tree.clone()), &with_user("Q"));
        assert_eq!(
            resolved[0].content,
            "<user>\nQ\n</user>\n\nbefore [seen] after"
        );

        let fresh = resolve(render(tree), &HistoryView::default());
        assert_eq!(fresh[0].content, "before [first] after");
    }

    #[test]
    fn test_file_parts_from_evaluation_append_in_discovery_order() {
        let tree = wrap_user(nodes![
            "body",
            conditional(|_ctx: &RenderContext| file_data("image/png", "QUJD")),
        ]);
        let resolved = resolve(render(tree), &with_user("Q"));

        let parts = resolved[0].parts.as_ref().expect("parts");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some(resolved[0].content.as_str()));
        assert_eq!(parts[1].as_file().expect("file").mime_type, "image/png");
    }

    #[test]
    fn test_merged_message_replaces_wrap_users_at_first_position() {
        let tree = nodes![
            crate::dsl::system("S"),
            wrap_user("A"),
            crate::dsl::assistant("done"),
        ];
        let resolved = resolve(render(tree), &with_user("Q"));
        let roles: Vec<Role> = resolved.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::System, Role::User, Role::Assistant]);
        assert!(resolved.iter().all(|m| !m.is_wrap_user()));
    }
}
