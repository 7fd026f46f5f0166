use tracing::trace;

use super::block;
use super::builder::{placeholder_token, MessageBuilder, PendingMessage, WrapUserState};
use super::Fragment;
use crate::models::content::FilePart;
use crate::models::node::{ConditionalFn, Element, Kind, Node, RenderContext};
use crate::models::role::Role;

/// Recursively interpret a node tree, appending to the builder. `role` is
/// the active role context; text outside any message-opening marker has no
/// destination and is dropped.
pub(crate) fn walk(
    builder: &mut MessageBuilder,
    node: &Node,
    role: Option<Role>,
    ctx: &RenderContext,
) {
    match node {
        Node::Empty => {}
        Node::Text(text) => builder.append_text(role, text),
        Node::List(children) => {
            for child in children {
                walk(builder, child, role, ctx);
            }
        }
        Node::Conditional(f) => {
            if capture_condition(builder, role, f) {
                return;
            }
            // Outside a wrap-user message the conditional runs against the
            // ambient context.
            let resolved = f(ctx);
            walk(builder, &resolved, role, ctx);
        }
        Node::Element(element) => walk_element(builder, element, role, ctx),
    }
}

fn walk_element(
    builder: &mut MessageBuilder,
    element: &Element,
    role: Option<Role>,
    ctx: &RenderContext,
) {
    match &element.kind {
        Kind::Fragment => walk_children(builder, element, role, ctx),
        Kind::Show(true) => walk_children(builder, element, role, ctx),
        Kind::Show(false) => {}
        Kind::Component(f) => {
            // Invocation is substitution: the result is walked under the
            // same role context, so components never affect boundaries.
            let produced = f(element.children.clone());
            walk(builder, &produced, role, ctx);
        }
        Kind::System => open_role(builder, Role::System, element, ctx),
        Kind::User => open_role(builder, Role::User, element, ctx),
        Kind::Assistant => open_role(builder, Role::Assistant, element, ctx),
        Kind::ToolCall(call) => match builder.messages.last_mut() {
            // Adjacent tool calls collapse into one assistant turn. Native
            // passthrough messages are closed to merging; their payload is
            // already final, so a call lands in a fresh message.
            Some(message) if message.role == Role::Assistant && message.native.is_none() => {
                message.tool_calls.push(call.clone());
            }
            _ => {
                let mut message = PendingMessage::new(Role::Assistant);
                message.tool_calls.push(call.clone());
                builder.push(message);
            }
        },
        Kind::ToolResult(attrs) => {
            let mut message = PendingMessage::new(Role::Tool);
            message.tool_call_id = Some(attrs.id.clone());
            message.tool_name = Some(attrs.name.clone());
            message.tool_is_error = attrs.is_error;
            message.tool_output = attrs
                .output
                .clone()
                .or_else(|| detect_structured_result(&element.children));
            builder.push(message);
            walk_children(builder, element, Some(Role::Tool), ctx);
        }
        Kind::Tag(attrs) => {
            let (raw, parts) = render_raw_children(&element.children, ctx);
            for part in parts {
                builder.append_file(role, part);
            }
            let text = if attrs.inline {
                format!("<{0}>{1}</{0}>", attrs.name, raw)
            } else {
                block::format_block(&attrs.name, attrs.indent, &raw)
            };
            builder.append_text(role, &text);
        }
        Kind::Json(value) => {
            let text = serde_json::to_string_pretty(value).unwrap_or_default();
            builder.append_text(role, &text);
        }
        Kind::File(part) => builder.append_file(role, part.clone()),
        Kind::Native(native_role, value) => {
            let mut message = PendingMessage::new(*native_role);
            message.native = Some(value.clone());
            builder.push(message);
        }
        Kind::WrapUser(attrs) => {
            trace!(tag = %attrs.tag, "opening wrap-user message");
            let mut message = PendingMessage::new(Role::User);
            message.wrap_user = Some(WrapUserState {
                tag: attrs.tag.clone(),
                mode: attrs.mode,
                conditions: Vec::new(),
            });
            builder.push(message);
            walk_children(builder, element, Some(Role::User), ctx);
        }
    }
}

fn walk_children(
    builder: &mut MessageBuilder,
    element: &Element,
    role: Option<Role>,
    ctx: &RenderContext,
) {
    for child in &element.children {
        walk(builder, child, role, ctx);
    }
}

fn open_role(builder: &mut MessageBuilder, role: Role, element: &Element, ctx: &RenderContext) {
    builder.push(PendingMessage::new(role));
    walk_children(builder, element, Some(role), ctx);
}

/// When the active message is a wrap-user message, a conditional child is
/// not invoked: its position is recorded as an opaque placeholder and the
/// function stored in order for adapter-time evaluation.
fn capture_condition(
    builder: &mut MessageBuilder,
    role: Option<Role>,
    f: &ConditionalFn,
) -> bool {
    if role != Some(Role::User) {
        return false;
    }
    let Some(message) = builder.messages.last_mut() else {
        return false;
    };
    if message.role != Role::User {
        return false;
    }
    let Some(state) = message.wrap_user.as_mut() else {
        return false;
    };
    let token = placeholder_token(state.conditions.len());
    state.conditions.push(f.clone());
    message.fragments.push(token);
    true
}

/// Heuristic for tool results without an explicit structured output: after
/// filtering whitespace-only text, exactly one `json` child means its value
/// is adopted; any additional meaningful sibling falls back to plain text.
/// Order-sensitive by design; preserved as observed behavior.
fn detect_structured_result(children: &[Node]) -> Option<serde_json::Value> {
    let meaningful = collect_meaningful(children);
    match meaningful.as_slice() {
        [Node::Element(element)] => match &element.kind {
            Kind::Json(value) => Some(value.clone()),
            _ => None,
        },
        _ => None,
    }
}

fn collect_meaningful(children: &[Node]) -> Vec<&Node> {
    let mut found = Vec::new();
    for child in children {
        match child {
            Node::Empty => {}
            Node::Text(text) if text.trim().is_empty() => {}
            Node::List(inner) => found.extend(collect_meaningful(inner)),
            other => found.push(other),
        }
    }
    found
}

/// Render children into an isolated buffer: raw concatenated text (no outer
/// trimming, so block formatting sees the real line structure) plus parts.
pub(crate) fn render_raw_children(
    children: &[Node],
    ctx: &RenderContext,
) -> (String, Vec<FilePart>) {
    let mut builder = MessageBuilder::new();
    builder.push(PendingMessage::new(Role::User));
    for child in children {
        walk(&mut builder, child, Some(Role::User), ctx);
    }
    let root = builder
        .messages
        .into_iter()
        .next()
        .unwrap_or_else(|| PendingMessage::new(Role::User));
    (root.fragments.concat(), root.file_parts)
}

/// Render a node fragment in isolation to trimmed text and file parts.
pub(crate) fn render_fragment(node: &Node, ctx: &RenderContext) -> Fragment {
    let (raw, parts) = render_raw_children(std::slice::from_ref(node), ctx);
    Fragment {
        content: raw.trim().to_string(),
        parts,
    }
}
