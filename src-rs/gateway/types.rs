use serde::{Deserialize, Serialize};

use super::sse::SseTextStream;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

/// One entry of a structured content list. Only `"text"` parts carry
/// meaning for the gateway; anything else is dropped during normalization.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ContentPart {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Message content as hosts send it: either a bare string or a list of
/// typed parts.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: MessageContent,
}

/// The host-facing chat request body.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
}

/// A finished answer, or a forward-only fragment producer for streamed
/// replies. Dropping the stream releases the gateway connection.
pub enum Completion {
    Text(String),
    Stream(SseTextStream<reqwest::blocking::Response>),
}

impl Completion {
    /// Drain a streamed reply into a single string; a text reply passes
    /// through unchanged.
    pub fn into_text(self) -> String {
        match self {
            Completion::Text(text) => text,
            Completion::Stream(parts) => parts.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_deserializes_from_string_or_parts() {
        let msg: ChatMessage =
            serde_json::from_str(r#"{"role":"user","content":"hi"}"#).unwrap();
        assert!(matches!(msg.content, MessageContent::Text(ref t) if t == "hi"));

        let msg: ChatMessage = serde_json::from_str(
            r#"{"role":"assistant","content":[{"type":"text","text":"hello"},{"type":"image_url"}]}"#,
        )
        .unwrap();
        match msg.content {
            MessageContent::Parts(parts) => {
                assert_eq!(parts.len(), 2);
                assert_eq!(parts[0].kind, "text");
                assert_eq!(parts[1].text, None);
            }
            MessageContent::Text(_) => panic!("expected a part list"),
        }
    }

    #[test]
    fn optional_sampling_fields_default_to_none() {
        let request: ChatRequest =
            serde_json::from_str(r#"{"model":"m","messages":[]}"#).unwrap();
        assert_eq!(request.temperature, None);
        assert_eq!(request.top_k, None);
    }
}
