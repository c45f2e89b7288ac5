use serde_json::{json, Value};

use super::types::{ChatMessage, MessageContent, Role};
use crate::error::PipeError;

/// The native request shape: an optional system instruction plus the
/// role-tagged turn list for `contents`.
pub struct NativeTurns {
    pub system_instruction: Option<Value>,
    pub contents: Vec<Value>,
}

/// Shape host messages for the native `generateContent` schema.
///
/// The last system message with plain string content becomes the system
/// instruction; every other message becomes a turn with `assistant` mapped
/// to `model` and anything else to `user`. Messages whose content yields no
/// text parts are dropped outright.
pub fn to_native(messages: &[ChatMessage]) -> Result<NativeTurns, PipeError> {
    let mut system_instruction = None;
    let mut contents = Vec::new();

    for msg in messages {
        if msg.role == Role::System {
            if let MessageContent::Text(text) = &msg.content {
                if !text.is_empty() {
                    system_instruction = Some(json!({ "parts": [{ "text": text }] }));
                    continue;
                }
            }
        }
        let role = if msg.role == Role::Assistant { "model" } else { "user" };
        let parts = text_parts(&msg.content);
        if parts.is_empty() {
            continue;
        }
        contents.push(json!({ "role": role, "parts": parts }));
    }

    if contents.is_empty() {
        return Err(PipeError::NoParsableContent);
    }
    Ok(NativeTurns {
        system_instruction,
        contents,
    })
}

fn text_parts(content: &MessageContent) -> Vec<Value> {
    match content {
        MessageContent::Text(text) => vec![json!({ "text": text })],
        MessageContent::Parts(parts) => parts
            .iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.as_ref())
            .map(|text| json!({ "text": text }))
            .collect(),
    }
}

/// Shape host messages for the chat-completions schema: every message is
/// kept (system included) and part lists collapse to one space-joined
/// string.
pub fn to_compat(messages: &[ChatMessage]) -> Result<Vec<Value>, PipeError> {
    let out: Vec<Value> = messages
        .iter()
        .map(|msg| {
            let flat = match &msg.content {
                MessageContent::Text(text) => text.clone(),
                MessageContent::Parts(parts) => parts
                    .iter()
                    .filter(|part| part.kind == "text")
                    .filter_map(|part| part.text.as_deref())
                    .collect::<Vec<_>>()
                    .join(" "),
            };
            json!({ "role": msg.role.as_str(), "content": flat })
        })
        .collect();

    if out.is_empty() {
        return Err(PipeError::NoParsableContent);
    }
    Ok(out)
}
