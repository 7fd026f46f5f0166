use serde_json::Value;

use crate::models::content::FilePart;
use crate::models::message::{ToolCall, WrapMode};
use crate::models::node::ConditionalFn;
use crate::models::role::Role;

/// Delimiter for wrap-user placeholder tokens. A private-use codepoint, so
/// it cannot collide with authored text.
const PLACEHOLDER_DELIM: char = '\u{E000}';

/// The opaque marker holding a deferred conditional's position in the text
/// stream until adapter-time evaluation fills it.
pub(crate) fn placeholder_token(index: usize) -> String {
    format!("{PLACEHOLDER_DELIM}{index}{PLACEHOLDER_DELIM}")
}

/// Wrap-user bookkeeping accumulated while walking the marker's children.
#[derive(Clone)]
pub(crate) struct WrapUserState {
    pub tag: String,
    pub mode: WrapMode,
    pub conditions: Vec<ConditionalFn>,
}

/// A mutable in-progress message, owned by one render call.
pub(crate) struct PendingMessage {
    pub role: Role,
    pub fragments: Vec<String>,
    pub file_parts: Vec<FilePart>,
    pub tool_calls: Vec<ToolCall>,
    pub tool_call_id: Option<String>,
    pub tool_name: Option<String>,
    pub tool_output: Option<Value>,
    pub tool_is_error: bool,
    pub native: Option<Value>,
    pub wrap_user: Option<WrapUserState>,
}

impl PendingMessage {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            fragments: Vec::new(),
            file_parts: Vec::new(),
            tool_calls: Vec::new(),
            tool_call_id: None,
            tool_name: None,
            tool_output: None,
            tool_is_error: false,
            native: None,
            wrap_user: None,
        }
    }
}

/// Ordered accumulator threaded through the walk. Messages are only ever
/// appended; role transitions push a new entry, never reorder.
pub(crate) struct MessageBuilder {
    pub messages: Vec<PendingMessage>,
}

impl MessageBuilder {
    pub fn new() -> Self {
        Self {
            messages: Vec::new(),
        }
    }

    pub fn push(&mut self, message: PendingMessage) {
        self.messages.push(message);
    }

    /// The last message, but only when it matches the active role context.
    pub fn active(&mut self, role: Option<Role>) -> Option<&mut PendingMessage> {
        let role = role?;
        match self.messages.last_mut() {
            Some(message) if message.role == role => Some(message),
            _ => None,
        }
    }

    /// Append text to the active message. Stray text with no destination is
    /// silently dropped.
    pub fn append_text(&mut self, role: Option<Role>, text: &str) {
        if let Some(message) = self.active(role) {
            message.fragments.push(text.to_string());
        }
    }

    /// Attach a file part to the active message, or drop it like stray text.
    pub fn append_file(&mut self, role: Option<Role>, part: FilePart) {
        if let Some(message) = self.active(role) {
            message.file_parts.push(part);
        }
    }
}
