use serde_json::{json, Map, Value};
use tracing::debug;

use super::{history_view, systems_first};
use crate::models::content::{ContentPart, FilePart};
use crate::models::message::Message;
use crate::models::node::{Node, RenderContext};
use crate::models::role::Role;
use crate::render;
use crate::render::wrap_user;

/// Convert a prompt tree to the OpenAI chat-completions message array.
/// `history`, when present, supplies the prior conversation consumed by the
/// wrap-user mechanism; it is never echoed into the output.
pub fn to_openai(nodes: impl Into<Node>, history: Option<&[Value]>) -> Vec<Value> {
    let view = history_view(history);
    let ctx = RenderContext {
        has_user: view.has_user,
    };
    let messages = wrap_user::resolve(render::render_with_context(&nodes.into(), &ctx), &view);
    let messages = systems_first(messages);
    debug!(count = messages.len(), "mapping IR to openai format");
    messages.iter().map(message_to_openai).collect()
}

fn message_to_openai(message: &Message) -> Value {
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
            "content": tool_result_text(message),
            "tool_call_id": message.tool_call_id.clone().unwrap_or_default(),
        }),
        Role::Assistant => {
            let mut converted = Map::new();
            converted.insert("role".to_string(), json!("assistant"));
            // Null content when the message carries calls but no text.
            let content = if message.content.is_empty() && message.has_tool_calls() {
                Value::Null
            } else {
                content_value(message)
            };
            converted.insert("content".to_string(), content);
            if let Some(calls) = &message.tool_calls {
                let wire_calls: Vec<Value> = calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.input.to_string(),
                            }
                        })
                    })
                    .collect();
                converted.insert("tool_calls".to_string(), Value::Array(wire_calls));
            }
            Value::Object(converted)
        }
        Role::User => json!({
            "role": "user",
            "content": content_value(message),
        }),
    }
}

fn tool_result_text(message: &Message) -> String {
    let text = match &message.tool_output {
        Some(value) => value.to_string(),
        None => message.content.clone(),
    };
    if message.tool_is_error == Some(true) {
        format!("The tool call returned the following error:\n{text}")
    } else {
        text
    }
}

fn content_value(message: &Message) -> Value {
    let Some(parts) = &message.parts else {
        return json!(message.content);
    };
    let wire_parts: Vec<Value> = parts
        .iter()
        .map(|part| match part {
            ContentPart::Text { text } => json!({"type": "text", "text": text}),
            ContentPart::Image(file) => json!({
                "type": "image_url",
                "image_url": {"url": file_url(file)},
            }),
            ContentPart::File(file) => json!({
                "type": "file",
                "file": {
                    "filename": file.filename.clone().unwrap_or_else(|| "file".to_string()),
                    "file_data": file_url(file),
                }
            }),
        })
        .collect();
    Value::Array(wire_parts)
}

fn file_url(file: &FilePart) -> String {
    if file.is_url {
        file.data.clone()
    } else {
        format!("data:{};base64,{}", file.mime_type, file.data)
    }
}
