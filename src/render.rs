//! The rendering pipeline: tree walker, message segmentation, block
//! formatting, and finalization into the message IR.

mod block;
mod builder;
mod finalize;
mod walker;
pub(crate) mod wrap_user;

use tracing::debug;

use crate::models::content::FilePart;
use crate::models::message::Message;
use crate::models::node::{Node, RenderContext};

pub(crate) use finalize::combined_system;

/// A node fragment rendered in isolation: plain text plus any file parts
/// discovered along the way.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    pub content: String,
    pub parts: Vec<FilePart>,
}

/// Render a node tree into the role-tagged message IR. Pure: each call owns
/// its accumulator, so concurrent renders never share state.
pub fn render(nodes: impl Into<Node>) -> Vec<Message> {
    render_with_context(&nodes.into(), &RenderContext::default())
}

pub(crate) fn render_with_context(node: &Node, ctx: &RenderContext) -> Vec<Message> {
    let mut messages = builder::MessageBuilder::new();
    walker::walk(&mut messages, node, None, ctx);
    let finalized = finalize::finalize(messages);
    debug!(count = finalized.len(), "rendered prompt tree");
    finalized
}

/// Render a node fragment (not a full message tree) to plain text and parts.
/// Used by the wrap-user evaluator and by callers needing isolated rendering.
pub fn render_to_text(node: impl Into<Node>) -> Fragment {
    walker::render_fragment(&node.into(), &RenderContext::default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{
        assistant, component, conditional, each, file_data, json as json_node, native, system,
        tag, tag_inline, tool_call_with_id, user, when, wrap_user,
    };
    use crate::models::content::ContentPart;
    use crate::models::role::Role;
    use crate::nodes;
    use anyhow::Result;
    use indoc::indoc;
    use serde_json::json;

    #[test]
    fn test_sibling_text_preserves_source_order() {
        let messages = render(user(nodes!["a", "b", "c"]));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "abc");
    }

    #[test]
    fn test_stray_text_has_no_destination() {
        assert!(render("floating").is_empty());

        // Text following a nested role marker no longer matches the active
        // role and is dropped.
        let messages = render(user(nodes!["a", system("s"), "b"]));
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, "a");
        assert_eq!(messages[1].role, Role::System);
        assert_eq!(messages[1].content, "s");
    }

    #[test]
    fn test_block_and_inline_duality() {
        let block = render(user(tag("x", "V")));
        assert_eq!(block[0].content, "<x>\n  V\n</x>");

        let inline = render(user(tag_inline("x", "V")));
        assert_eq!(inline[0].content, "<x>V</x>");
    }

    #[test]
    fn test_block_trailing_newline_separates_siblings() {
        let messages = render(user(nodes![tag("x", "V"), "after"]));
        assert_eq!(messages[0].content, "<x>\n  V\n</x>\nafter");
    }

    #[test]
    fn test_nested_blocks_indent_additively() {
        let messages = render(user(tag("outer", tag("inner", "W"))));
        let expected = indoc! {"
            <outer>
              <inner>
                W
              </inner>
            </outer>"};
        assert_eq!(messages[0].content, expected);
    }

    #[test]
    fn test_consecutive_tool_calls_collapse() {
        let messages = render(nodes![
            tool_call_with_id("a", "one", json!({})),
            tool_call_with_id("b", "two", json!({})),
            tool_call_with_id("c", "three", json!({})),
        ]);

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::Assistant);
        assert_eq!(messages[0].content, "");
        let calls = messages[0].tool_calls.as_ref().expect("calls");
        assert_eq!(calls.len(), 3);
        let ids: Vec<&str> = calls.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_component_is_transparent_to_boundaries() {
        let shout = component(
            |children| {
                nodes![Node::List(children), "!"]
            },
            vec!["hello".into()],
        );
        let messages = render(user(shout));
        assert_eq!(messages[0].content, "hello!");
    }

    #[test]
    fn test_show_marker_gates_children() {
        let messages = render(user(nodes![when(true, "yes"), when(false, "no")]));
        assert_eq!(messages[0].content, "yes");
    }

    #[test]
    fn test_each_preserves_iteration_order() {
        let messages = render(user(each(1..=3, |n| format!("[{n}]").into())));
        assert_eq!(messages[0].content, "[1][2][3]");
    }

    #[test]
    fn test_native_passthrough() {
        let payload = json!({"role": "assistant", "content": "raw"});
        let messages = render(native(Role::Assistant, payload.clone()));

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "");
        assert_eq!(messages[0].native, Some(payload));
    }

    #[test]
    fn test_tool_call_after_native_opens_a_fresh_assistant_message() {
        let payload = json!({"role": "assistant", "content": "raw"});
        let messages = render(nodes![
            native(Role::Assistant, payload.clone()),
            tool_call_with_id("call_1", "lookup", json!({})),
        ]);

        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].native, Some(payload));
        assert_eq!(messages[0].tool_calls, None);
        let calls = messages[1].tool_calls.as_ref().expect("calls");
        assert_eq!(calls[0].id, "call_1");
    }

    #[test]
    fn test_wrap_user_yields_exactly_one_tagged_message() {
        let messages = render(wrap_user("A"));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, Role::User);
        assert!(messages[0].is_wrap_user());
        assert_eq!(messages[0].content, "A");
    }

    #[test]
    fn test_conditional_outside_wrap_user_runs_immediately() {
        let messages = render(user(conditional(|ctx: &RenderContext| {
            if ctx.has_user {
                Node::from("with history")
            } else {
                Node::from("fresh")
            }
        })));
        assert_eq!(messages[0].content, "fresh");
    }

    #[test]
    fn test_json_marker_renders_pretty_text() -> Result<()> {
        let messages = render(user(json_node(json!({"n": 1}))));
        let parsed: serde_json::Value = serde_json::from_str(&messages[0].content)?;
        assert_eq!(parsed, json!({"n": 1}));
        assert!(messages[0].content.contains('\n'));
        Ok(())
    }

    #[test]
    fn test_file_parts_follow_the_text_part() {
        let messages = render(user(nodes!["caption", file_data("image/png", "QUJD")]));
        let parts = messages[0].parts.as_ref().expect("parts");
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[0].as_text(), Some("caption"));
        assert!(matches!(parts[1], ContentPart::Image(_)));

        // No text part when the trimmed text is empty.
        let messages = render(user(file_data("image/png", "QUJD")));
        let parts = messages[0].parts.as_ref().expect("parts");
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_assistant_then_user_order_is_kept() {
        let messages = render(nodes![assistant("a"), user("u"), assistant("b")]);
        let roles: Vec<Role> = messages.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::Assistant, Role::User, Role::Assistant]);
    }

    #[test]
    fn test_empty_input_renders_no_messages() {
        assert!(render(nodes![]).is_empty());
        assert!(render(Node::Empty).is_empty());
    }

    #[test]
    fn test_render_to_text_collects_text_and_parts() {
        let fragment = render_to_text(nodes![
            "look: ",
            tag_inline("b", "here"),
            file_data("image/png", "QUJD"),
        ]);
        assert_eq!(fragment.content, "look: <b>here</b>");
        assert_eq!(fragment.parts.len(), 1);
        assert_eq!(fragment.parts[0].mime_type, "image/png");
    }
}
