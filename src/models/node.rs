use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::content::FilePart;
use super::message::{ToolCall, WrapMode};
use super::role::Role;

/// Render-time facts a deferred conditional can branch on.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderContext {
    /// True when the caller-supplied history contains at least one user turn.
    pub has_user: bool,
}

/// A component function: invoked with its children during the walk, its
/// result is recursed into under the same role context. Attributes live in
/// the closure's captures.
pub type ComponentFn = Arc<dyn Fn(Vec<Node>) -> Node + Send + Sync>;

/// A deferred conditional. Inside a wrap-user marker these are captured as
/// ordered placeholders and evaluated at adapter time; anywhere else they run
/// immediately against the ambient context.
pub type ConditionalFn = Arc<dyn Fn(&RenderContext) -> Node + Send + Sync>;

/// A value in the author-facing prompt tree.
#[derive(Clone, Default)]
pub enum Node {
    #[default]
    Empty,
    Text(String),
    List(Vec<Node>),
    Element(Box<Element>),
    Conditional(ConditionalFn),
}

impl Node {
    pub fn element(kind: Kind, children: Vec<Node>) -> Self {
        Node::Element(Box::new(Element { kind, children }))
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Empty => write!(f, "Empty"),
            Node::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Node::List(children) => f.debug_tuple("List").field(children).finish(),
            Node::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Node::Conditional(_) => write!(f, "Conditional(..)"),
        }
    }
}

/// A tagged node carrying a marker kind and children.
#[derive(Debug, Clone)]
pub struct Element {
    pub kind: Kind,
    pub children: Vec<Node>,
}

/// The closed set of marker kinds the tree walker dispatches on.
#[derive(Clone)]
pub enum Kind {
    System,
    User,
    Assistant,
    ToolCall(ToolCall),
    ToolResult(ToolResultAttrs),
    Tag(TagAttrs),
    Json(Value),
    File(FilePart),
    Native(Role, Value),
    WrapUser(WrapUserAttrs),
    Show(bool),
    Fragment,
    Component(ComponentFn),
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::System => write!(f, "System"),
            Kind::User => write!(f, "User"),
            Kind::Assistant => write!(f, "Assistant"),
            Kind::ToolCall(call) => f.debug_tuple("ToolCall").field(call).finish(),
            Kind::ToolResult(attrs) => f.debug_tuple("ToolResult").field(attrs).finish(),
            Kind::Tag(attrs) => f.debug_tuple("Tag").field(attrs).finish(),
            Kind::Json(value) => f.debug_tuple("Json").field(value).finish(),
            Kind::File(part) => f.debug_tuple("File").field(part).finish(),
            Kind::Native(role, value) => {
                f.debug_tuple("Native").field(role).field(value).finish()
            }
            Kind::WrapUser(attrs) => f.debug_tuple("WrapUser").field(attrs).finish(),
            Kind::Show(condition) => f.debug_tuple("Show").field(condition).finish(),
            Kind::Fragment => write!(f, "Fragment"),
            Kind::Component(_) => write!(f, "Component(..)"),
        }
    }
}

/// Attributes of a tool-result marker. `output` is the explicit structured
/// result; when absent the walker may adopt a lone json child instead.
#[derive(Debug, Clone)]
pub struct ToolResultAttrs {
    pub id: String,
    pub name: String,
    pub output: Option<Value>,
    pub is_error: bool,
}

/// Attributes of a labeled group marker.
#[derive(Debug, Clone)]
pub struct TagAttrs {
    pub name: String,
    pub indent: usize,
    pub inline: bool,
}

impl Default for TagAttrs {
    fn default() -> Self {
        // A missing tag name degrades to a generic label.
        Self {
            name: "group".to_string(),
            indent: 2,
            inline: false,
        }
    }
}

/// Attributes of a wrap-user marker.
#[derive(Debug, Clone)]
pub struct WrapUserAttrs {
    pub tag: String,
    pub mode: WrapMode,
}

impl Default for WrapUserAttrs {
    fn default() -> Self {
        Self {
            tag: "user".to_string(),
            mode: WrapMode::Suffix,
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::Text(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::Text(text)
    }
}

impl From<&String> for Node {
    fn from(text: &String) -> Self {
        Node::Text(text.clone())
    }
}

// Booleans are ignored, mirroring how bare `cond && <node>` expressions
// evaluate in the authoring layer.
impl From<bool> for Node {
    fn from(_: bool) -> Self {
        Node::Empty
    }
}

macro_rules! node_from_number {
    ($($ty:ty),+) => {
        $(impl From<$ty> for Node {
            fn from(value: $ty) -> Self {
                Node::Text(value.to_string())
            }
        })+
    };
}

node_from_number!(i32, i64, u32, u64, usize, f32, f64);

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(inner) => inner.into(),
            None => Node::Empty,
        }
    }
}

impl From<Vec<Node>> for Node {
    fn from(children: Vec<Node>) -> Self {
        Node::List(children)
    }
}

/// Build a `Node::List` from a mixed sequence of node-convertible values.
#[macro_export]
macro_rules! nodes {
    () => { $crate::models::node::Node::Empty };
    ($($child:expr),+ $(,)?) => {
        $crate::models::node::Node::List(vec![
            $($crate::models::node::Node::from($child)),+
        ])
    };
}
