use reqwest::blocking::Client;
use serde_json::{json, Map, Value};

use super::normalize;
use super::types::ChatRequest;
use crate::config::PipeConfig;
use crate::error::PipeError;

/// Fixed reply when the gateway answers 2xx but carries no usable parts.
pub(crate) const NO_RESPONSE: &str = "no valid response";

/// Call the native `generateContent` endpoint and reduce the reply to text.
pub fn send(
    client: &Client,
    cfg: &PipeConfig,
    api_key: &str,
    model: &str,
    request: &ChatRequest,
) -> Result<String, PipeError> {
    let payload = build_payload(cfg, request)?;
    let url = format!(
        "{}/{}/models/{}:generateContent",
        cfg.base_url.trim_end_matches('/'),
        cfg.api_version,
        model
    );
    let response = client
        .post(&url)
        .query(&[("key", api_key)])
        .header("OE-Key", &cfg.oe_key)
        .header("OE-Gateway-Name", &cfg.gateway_name)
        .header("OE-AI-Provider", &cfg.ai_provider)
        .json(&payload)
        .send()
        .map_err(|err| PipeError::from_transport(err, cfg.timeout_secs))?;

    let status = response.status();
    let body = response
        .text()
        .map_err(|err| PipeError::from_transport(err, cfg.timeout_secs))?;
    if !status.is_success() {
        return Err(PipeError::Upstream {
            status: status.as_u16(),
            message: body,
        });
    }
    let raw: Value = serde_json::from_str(&body)
        .map_err(|err| PipeError::Unexpected(format!("invalid gateway JSON: {err}")))?;
    parse_response(&raw)
}

fn build_payload(cfg: &PipeConfig, request: &ChatRequest) -> Result<Value, PipeError> {
    let turns = normalize::to_native(&request.messages)?;
    let mut payload = json!({ "contents": turns.contents });
    if let Some(instruction) = turns.system_instruction {
        payload["systemInstruction"] = instruction;
    }
    let generation = generation_config(cfg, request);
    if !generation.is_empty() {
        payload["generationConfig"] = Value::Object(generation);
    }
    Ok(payload)
}

fn generation_config(cfg: &PipeConfig, request: &ChatRequest) -> Map<String, Value> {
    let mut out = Map::new();
    if let Some(temperature) = request.temperature {
        out.insert("temperature".to_string(), json!(temperature));
    }
    if let Some(max_tokens) = request.max_tokens {
        out.insert("maxOutputTokens".to_string(), json!(max_tokens));
    }
    if let Some(top_p) = request.top_p {
        out.insert("topP".to_string(), json!(top_p));
    }
    if let Some(top_k) = request.top_k {
        out.insert("topK".to_string(), json!(top_k));
    }
    if cfg.experimental {
        out.insert("thinkingConfig".to_string(), thinking_config(cfg));
        out.insert(
            "mediaResolution".to_string(),
            json!(format!("media_resolution_{}", cfg.media_resolution)),
        );
    }
    out
}

fn thinking_config(cfg: &PipeConfig) -> Value {
    if cfg.thinking_budget != 0 {
        // -1 means a dynamic budget and passes through verbatim.
        json!({ "thinkingBudget": cfg.thinking_budget, "includeThoughts": true })
    } else {
        json!({ "thinkingLevel": cfg.reasoning_level.as_str(), "includeThoughts": true })
    }
}

fn parse_response(raw: &Value) -> Result<String, PipeError> {
    if let Some(error) = raw.get("error") {
        let status = error.get("code").and_then(Value::as_u64).unwrap_or(0) as u16;
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown gateway error")
            .to_string();
        return Err(PipeError::Upstream { status, message });
    }

    let parts = match raw["candidates"][0]["content"]["parts"].as_array() {
        Some(parts) if !parts.is_empty() => parts,
        _ => return Ok(NO_RESPONSE.to_string()),
    };

    let mut text = String::new();
    for part in parts {
        let Some(chunk) = part.get("text").and_then(Value::as_str) else {
            continue;
        };
        // Only the explicit thought flag marks reasoning content.
        if part.get("thought").and_then(Value::as_bool).unwrap_or(false) {
            text.push_str("<think>");
            text.push_str(chunk);
            text.push_str("</think>");
        } else {
            text.push_str(chunk);
        }
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::types::{ChatMessage, MessageContent, Role};

    fn request_with(text: &str) -> ChatRequest {
        ChatRequest {
            model: "gemini-pro".to_string(),
            messages: vec![ChatMessage {
                role: Role::User,
                content: MessageContent::Text(text.to_string()),
            }],
            temperature: None,
            max_tokens: None,
            top_p: None,
            top_k: None,
        }
    }

    #[test]
    fn minimal_payload_has_no_generation_config() {
        let payload = build_payload(&PipeConfig::default(), &request_with("hi")).unwrap();
        assert_eq!(
            payload,
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "hi" }] }] })
        );
    }

    #[test]
    fn sampling_fields_use_upstream_names() {
        let mut request = request_with("hi");
        request.temperature = Some(0.2);
        request.max_tokens = Some(512);
        request.top_p = Some(0.9);
        request.top_k = Some(40);
        let payload = build_payload(&PipeConfig::default(), &request).unwrap();
        assert_eq!(
            payload["generationConfig"],
            json!({ "temperature": 0.2, "maxOutputTokens": 512, "topP": 0.9, "topK": 40 })
        );
    }

    #[test]
    fn nonzero_budget_emits_budget_config_only() {
        let mut cfg = PipeConfig::default();
        cfg.experimental = true;
        cfg.thinking_budget = 5;
        let payload = build_payload(&cfg, &request_with("hi")).unwrap();
        let thinking = &payload["generationConfig"]["thinkingConfig"];
        assert_eq!(thinking["thinkingBudget"], 5);
        assert_eq!(thinking["includeThoughts"], true);
        assert!(thinking.get("thinkingLevel").is_none());
    }

    #[test]
    fn dynamic_budget_passes_through_verbatim() {
        let mut cfg = PipeConfig::default();
        cfg.experimental = true;
        cfg.thinking_budget = -1;
        let payload = build_payload(&cfg, &request_with("hi")).unwrap();
        assert_eq!(
            payload["generationConfig"]["thinkingConfig"]["thinkingBudget"],
            -1
        );
    }

    #[test]
    fn zero_budget_falls_back_to_the_level_config() {
        let mut cfg = PipeConfig::default();
        cfg.experimental = true;
        cfg.thinking_budget = 0;
        let payload = build_payload(&cfg, &request_with("hi")).unwrap();
        let thinking = &payload["generationConfig"]["thinkingConfig"];
        assert_eq!(thinking["thinkingLevel"], "medium");
        assert_eq!(thinking["includeThoughts"], true);
        assert!(thinking.get("thinkingBudget").is_none());
    }

    #[test]
    fn experimental_config_carries_the_media_resolution() {
        let mut cfg = PipeConfig::default();
        cfg.experimental = true;
        cfg.media_resolution = "high".to_string();
        let payload = build_payload(&cfg, &request_with("hi")).unwrap();
        assert_eq!(
            payload["generationConfig"]["mediaResolution"],
            "media_resolution_high"
        );
    }

    #[test]
    fn plain_text_survives_the_round_trip() {
        let original = "Héllo \"quoted\" text\nwith a newline ✓";
        let payload = build_payload(&PipeConfig::default(), &request_with(original)).unwrap();
        let echoed = json!({
            "candidates": [{ "content": { "parts": payload["contents"][0]["parts"] } }]
        });
        assert_eq!(parse_response(&echoed).unwrap(), original);
    }

    #[test]
    fn thought_parts_are_wrapped_in_markers() {
        let raw = json!({
            "candidates": [{ "content": { "parts": [
                { "text": "planning", "thought": true },
                { "text": "answer" },
            ]}}]
        });
        assert_eq!(
            parse_response(&raw).unwrap(),
            "<think>planning</think>answer"
        );
    }

    #[test]
    fn missing_parts_yield_the_sentinel() {
        assert_eq!(parse_response(&json!({})).unwrap(), NO_RESPONSE);
        let raw = json!({ "candidates": [{ "content": { "parts": [] } }] });
        assert_eq!(parse_response(&raw).unwrap(), NO_RESPONSE);
    }

    #[test]
    fn in_body_error_object_fails_the_call() {
        let raw = json!({ "error": { "code": 429, "message": "quota exhausted" } });
        match parse_response(&raw) {
            Err(PipeError::Upstream { status, message }) => {
                assert_eq!(status, 429);
                assert_eq!(message, "quota exhausted");
            }
            other => panic!("expected an upstream error, got {other:?}"),
        }
    }
}
