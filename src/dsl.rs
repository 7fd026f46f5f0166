//! Tree-construction front-end: typed constructors for every marker kind.
//! The rendering core treats the produced tree as opaque; these exist so
//! prompts can be composed without hand-assembling elements.

use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::Value;
use uuid::Uuid;

use crate::errors::{RenderError, RenderResult};
use crate::models::content::FilePart;
use crate::models::message::{ToolCall, WrapMode};
use crate::models::node::{
    Kind, Node, RenderContext, TagAttrs, ToolResultAttrs, WrapUserAttrs,
};
use crate::models::role::Role;

fn marker(kind: Kind, body: Node) -> Node {
    Node::element(kind, vec![body])
}

pub fn fragment<I: IntoIterator<Item = Node>>(children: I) -> Node {
    Node::element(Kind::Fragment, children.into_iter().collect())
}

pub fn system(body: impl Into<Node>) -> Node {
    marker(Kind::System, body.into())
}

pub fn user(body: impl Into<Node>) -> Node {
    marker(Kind::User, body.into())
}

pub fn assistant(body: impl Into<Node>) -> Node {
    marker(Kind::Assistant, body.into())
}

/// A tool invocation with a generated id.
pub fn tool_call<N: Into<String>>(name: N, input: Value) -> Node {
    tool_call_with_id(Uuid::new_v4().to_string(), name, input)
}

pub fn tool_call_with_id<I: Into<String>, N: Into<String>>(id: I, name: N, input: Value) -> Node {
    Node::element(Kind::ToolCall(ToolCall::new(id, name, input)), Vec::new())
}

/// A tool result whose body renders to text. A lone `json` child is adopted
/// as the structured output.
pub fn tool_result<I: Into<String>, N: Into<String>>(id: I, name: N, body: impl Into<Node>) -> Node {
    marker(
        Kind::ToolResult(ToolResultAttrs {
            id: id.into(),
            name: name.into(),
            output: None,
            is_error: false,
        }),
        body.into(),
    )
}

/// A tool result with an explicit structured output value.
pub fn tool_output<I: Into<String>, N: Into<String>>(id: I, name: N, output: Value) -> Node {
    Node::element(
        Kind::ToolResult(ToolResultAttrs {
            id: id.into(),
            name: name.into(),
            output: Some(output),
            is_error: false,
        }),
        Vec::new(),
    )
}

/// A failed tool result.
pub fn tool_error<I: Into<String>, N: Into<String>>(id: I, name: N, body: impl Into<Node>) -> Node {
    marker(
        Kind::ToolResult(ToolResultAttrs {
            id: id.into(),
            name: name.into(),
            output: None,
            is_error: true,
        }),
        body.into(),
    )
}

/// A block-mode labeled group with the default indent of 2.
pub fn tag<N: Into<String>>(name: N, body: impl Into<Node>) -> Node {
    marker(
        Kind::Tag(TagAttrs {
            name: name.into(),
            ..TagAttrs::default()
        }),
        body.into(),
    )
}

pub fn tag_indent<N: Into<String>>(name: N, indent: usize, body: impl Into<Node>) -> Node {
    marker(
        Kind::Tag(TagAttrs {
            name: name.into(),
            indent,
            inline: false,
        }),
        body.into(),
    )
}

pub fn tag_inline<N: Into<String>>(name: N, body: impl Into<Node>) -> Node {
    marker(
        Kind::Tag(TagAttrs {
            name: name.into(),
            indent: 0,
            inline: true,
        }),
        body.into(),
    )
}

/// Structured data rendered as pretty-printed JSON text.
pub fn json(value: Value) -> Node {
    Node::element(Kind::Json(value), Vec::new())
}

/// A file marker from optional sources. Fails when neither a url nor inline
/// data is supplied, before the tree ever reaches the walker.
pub fn file(mime_type: &str, url: Option<&str>, data: Option<&str>) -> RenderResult<Node> {
    match (url, data) {
        (Some(url), _) => Ok(file_url(mime_type, url)),
        (None, Some(data)) => Ok(file_data(mime_type, data)),
        (None, None) => Err(RenderError::MissingFileSource(mime_type.to_string())),
    }
}

pub fn file_url<M: Into<String>, U: Into<String>>(mime_type: M, url: U) -> Node {
    file_part(FilePart::url(mime_type, url))
}

/// A file from base64-encoded data.
pub fn file_data<M: Into<String>, D: Into<String>>(mime_type: M, data: D) -> Node {
    file_part(FilePart::inline(mime_type, data))
}

/// A file from raw bytes, base64-encoded on construction.
pub fn file_bytes<M: Into<String>>(mime_type: M, bytes: &[u8]) -> Node {
    file_part(FilePart::inline(mime_type, STANDARD.encode(bytes)))
}

pub fn file_part(part: FilePart) -> Node {
    Node::element(Kind::File(part), Vec::new())
}

/// A provider-native message passed through to adapter output verbatim.
pub fn native(role: Role, value: Value) -> Node {
    Node::element(Kind::Native(role, value), Vec::new())
}

/// Content merged at adapter time with the last user turn of the caller's
/// history. Defaults: tag "user", suffix mode.
pub fn wrap_user(body: impl Into<Node>) -> Node {
    marker(Kind::WrapUser(WrapUserAttrs::default()), body.into())
}

pub fn wrap_user_with<T: Into<String>>(tag: T, mode: WrapMode, body: impl Into<Node>) -> Node {
    marker(
        Kind::WrapUser(WrapUserAttrs {
            tag: tag.into(),
            mode,
        }),
        body.into(),
    )
}

/// Render the body only when the condition holds.
pub fn when(condition: bool, body: impl Into<Node>) -> Node {
    marker(Kind::Show(condition), body.into())
}

/// Map a collection into sibling nodes, preserving iteration order.
pub fn each<I, F>(items: I, f: F) -> Node
where
    I: IntoIterator,
    F: FnMut(I::Item) -> Node,
{
    Node::element(Kind::Fragment, items.into_iter().map(f).collect())
}

/// A component function invoked with its children during the walk.
pub fn component<F>(f: F, children: Vec<Node>) -> Node
where
    F: Fn(Vec<Node>) -> Node + Send + Sync + 'static,
{
    Node::element(Kind::Component(Arc::new(f)), children)
}

/// A deferred conditional, evaluated against the render context.
pub fn conditional<F>(f: F) -> Node
where
    F: Fn(&RenderContext) -> Node + Send + Sync + 'static,
{
    Node::Conditional(Arc::new(f))
}
