use serde::Serialize;
use serde_json::{json, Value};
use tracing::debug;

use super::history_view;
use crate::models::content::{ContentPart, FilePart};
use crate::models::message::Message;
use crate::models::node::{Node, RenderContext};
use crate::models::role::Role;
use crate::render;
use crate::render::wrap_user;

/// The anthropic wire shape: the system prompt travels as a side field, not
/// as a message in the array.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnthropicPrompt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    pub messages: Vec<Value>,
}

/// Convert a prompt tree to the anthropic messages format. System messages
/// are extracted and double-newline joined; tool results come back under a
/// user-role message as `tool_result` blocks.
pub fn to_anthropic(nodes: impl Into<Node>, history: Option<&[Value]>) -> AnthropicPrompt {
    let view = history_view(history);
    let ctx = RenderContext {
        has_user: view.has_user,
    };
    let messages = wrap_user::resolve(render::render_with_context(&nodes.into(), &ctx), &view);
    let system = render::combined_system(&messages);
    debug!(count = messages.len(), "mapping IR to anthropic format");
    let wire = messages
        .iter()
        .filter(|message| message.role != Role::System)
        .map(message_to_anthropic)
        .collect();
    AnthropicPrompt {
        system,
        messages: wire,
    }
}

fn message_to_anthropic(message: &Message) -> Value {
    if let Some(native) = &message.native {
        return native.clone();
    }

    match message.role {
        Role::Tool => {
            let mut block = json!({
                "type": "tool_result",
                "tool_use_id": message.tool_call_id.clone().unwrap_or_default(),
                "content": tool_result_text(message),
            });
            if message.tool_is_error == Some(true) {
                block["is_error"] = json!(true);
            }
            json!({"role": "user", "content": [block]})
        }
        Role::Assistant => {
            let mut blocks = Vec::new();
            if !message.content.is_empty() {
                blocks.push(json!({"type": "text", "text": message.content}));
            }
            if let Some(calls) = &message.tool_calls {
                for call in calls {
                    blocks.push(json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.input,
                    }));
                }
            }
            json!({"role": "assistant", "content": blocks})
        }
        // System messages are filtered out before this point.
        Role::System | Role::User => json!({
            "role": "user",
            "content": content_value(message),
        }),
    }
}

fn tool_result_text(message: &Message) -> String {
    match &message.tool_output {
        Some(value) => value.to_string(),
        None => message.content.clone(),
    }
}

fn content_value(message: &Message) -> Value {
    let Some(parts) = &message.parts else {
        return json!(message.content);
    };
    let blocks: Vec<Value> = parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({"type": "text", "text": text}),
            ContentPart::Image(file) => json!({"type": "image", "source": source(file)}),
            ContentPart::File(file) if file.mime_type == "application/pdf" => {
                json!({"type": "document", "source": source(file)})
            }
            // No block type exists for this mime; degrade to a description.
            ContentPart::File(file) => json!({
                "type": "text",
                "text": format!(
                    "[attachment {} of type {} could not be included]",
                    file.filename.as_deref().unwrap_or("file"),
                    file.mime_type,
                ),
            }),
        })
        .collect();
    Value::Array(blocks)
}

fn source(file: &FilePart) -> Value {
    if file.is_url {
        json!({"type": "url", "url": file.data})
    } else {
        json!({
            "type": "base64",
            "media_type": file.mime_type,
            "data": file.data,
        })
    }
}
