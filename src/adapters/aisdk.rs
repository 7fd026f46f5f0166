use serde_json::{json, Value};
use tracing::debug;

use super::{history_view, systems_first};
use crate::models::content::{ContentPart, FilePart};
use crate::models::message::Message;
use crate::models::node::{Node, RenderContext};
use crate::models::role::Role;
use crate::render;
use crate::render::wrap_user;

/// Convert a prompt tree to the Vercel AI SDK message array: same ordering
/// rule as the openai adapter, but tool traffic travels as camelCase typed
/// content parts instead of flat fields.
pub fn to_ai_sdk(nodes: impl Into<Node>, history: Option<&[Value]>) -> Vec<Value> {
    let view = history_view(history);
    let ctx = RenderContext {
        has_user: view.has_user,
    };
    let messages = wrap_user::resolve(render::render_with_context(&nodes.into(), &ctx), &view);
    let messages = systems_first(messages);
    debug!(count = messages.len(), "mapping IR to ai-sdk format");
    messages.iter().map(message_to_ai_sdk).collect()
}

fn message_to_ai_sdk(message: &Message) -> Value {
    if let Some(native) = &message.native {
        return native.clone();
    }

    match message.role {
        Role::System => json!({
            "role": "system",
            "content": message.content,
        }),
        Role::Tool => json!({
            "role": "tool",
            "content": [{
                "type": "tool-result",
                "toolCallId": message.tool_call_id.clone().unwrap_or_default(),
                "toolName": message.tool_name.clone().unwrap_or_default(),
                "output": output_value(message),
            }],
        }),
        Role::Assistant => {
            let mut parts = typed_parts(message);
            if let Some(calls) = &message.tool_calls {
                for call in calls {
                    parts.push(json!({
                        "type": "tool-call",
                        "toolCallId": call.id,
                        "toolName": call.name,
                        "input": call.input,
                    }));
                }
            }
            json!({"role": "assistant", "content": parts})
        }
        Role::User => json!({
            "role": "user",
            "content": typed_parts(message),
        }),
    }
}

/// Select among the four tool-output shapes based on whether a structured
/// result was supplied and whether the result is flagged as an error.
fn output_value(message: &Message) -> Value {
    let is_error = message.tool_is_error == Some(true);
    match (&message.tool_output, is_error) {
        (Some(value), false) => json!({"type": "json", "value": value}),
        (Some(value), true) => json!({"type": "error-json", "value": value}),
        (None, false) => json!({"type": "text", "value": message.content}),
        (None, true) => json!({"type": "error-text", "value": message.content}),
    }
}

fn typed_parts(message: &Message) -> Vec<Value> {
    let Some(parts) = &message.parts else {
        if message.content.is_empty() {
            return Vec::new();
        }
        return vec![json!({"type": "text", "text": message.content})];
    };
    parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({"type": "text", "text": text}),
            ContentPart::Image(file) => json!({
                "type": "image",
                "image": source(file),
                "mimeType": file.mime_type,
            }),
            ContentPart::File(file) => {
                let mut value = json!({
                    "type": "file",
                    "data": source(file),
                    "mimeType": file.mime_type,
                });
                if let Some(filename) = &file.filename {
                    value["filename"] = json!(filename);
                }
                value
            }
        })
        .collect()
}

fn source(file: &FilePart) -> String {
    if file.is_url {
        file.data.clone()
    } else {
        format!("data:{};base64,{}", file.mime_type, file.data)
    }
}
