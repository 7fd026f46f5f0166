use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::content::ContentPart;
use super::node::ConditionalFn;
use super::role::Role;

/// A tool invocation authored into the prompt tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    pub input: Value,
}

impl ToolCall {
    pub fn new<I: Into<String>, N: Into<String>>(id: I, name: N, input: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Where evaluated wrap-user content lands relative to the wrapped original
/// user turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WrapMode {
    Prefix,
    Suffix,
}

/// Wrap-user metadata carried on an IR message until an adapter consumes it.
/// Never serialized and never present in adapter output.
#[derive(Clone)]
pub struct WrapUser {
    pub tag: String,
    pub mode: WrapMode,
    pub conditions: Vec<ConditionalFn>,
}

impl fmt::Debug for WrapUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WrapUser")
            .field("tag", &self.tag)
            .field("mode", &self.mode)
            .field("conditions", &self.conditions.len())
            .finish()
    }
}

impl PartialEq for WrapUser {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
            && self.mode == other.mode
            && self.conditions.len() == other.conditions.len()
    }
}

/// A finalized message in the IR: created once per render call, never
/// mutated after return. Optional fields are omitted from serialization
/// rather than nulled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parts: Option<Vec<ContentPart>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_output: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_is_error: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub native: Option<Value>,
    #[serde(skip)]
    pub wrap_user: Option<WrapUser>,
}

impl Message {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            content: String::new(),
            parts: None,
            tool_calls: None,
            tool_call_id: None,
            tool_name: None,
            tool_output: None,
            tool_is_error: None,
            native: None,
            wrap_user: None,
        }
    }

    pub fn text<S: Into<String>>(role: Role, content: S) -> Self {
        let mut message = Self::new(role);
        message.content = content.into();
        message
    }

    pub fn is_wrap_user(&self) -> bool {
        self.wrap_user.is_some()
    }

    pub fn is_native(&self) -> bool {
        self.native.is_some()
    }

    pub fn has_tool_calls(&self) -> bool {
        self.tool_calls.as_ref().is_some_and(|calls| !calls.is_empty())
    }
}
