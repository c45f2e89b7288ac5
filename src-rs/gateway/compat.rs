use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};

use super::native::NO_RESPONSE;
use super::normalize;
use super::sse::SseTextStream;
use super::types::ChatRequest;
use crate::config::PipeConfig;
use crate::error::PipeError;

/// Call the chat-completions endpoint and return the whole answer.
pub fn send(
    client: &Client,
    cfg: &PipeConfig,
    api_key: &str,
    model: &str,
    request: &ChatRequest,
) -> Result<String, PipeError> {
    let response = post(client, cfg, api_key, model, request, false)?;
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

/// Call the chat-completions endpoint with `stream: true` and hand back the
/// fragment decoder over the live response body.
pub fn send_stream(
    client: &Client,
    cfg: &PipeConfig,
    api_key: &str,
    model: &str,
    request: &ChatRequest,
) -> Result<SseTextStream<Response>, PipeError> {
    let response = post(client, cfg, api_key, model, request, true)?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().unwrap_or_default();
        return Err(PipeError::Upstream {
            status: status.as_u16(),
            message: body,
        });
    }
    Ok(SseTextStream::new(response))
}

fn post(
    client: &Client,
    cfg: &PipeConfig,
    api_key: &str,
    model: &str,
    request: &ChatRequest,
    stream: bool,
) -> Result<Response, PipeError> {
    let messages = normalize::to_compat(&request.messages)?;
    let mut payload = json!({ "model": model, "messages": messages, "stream": stream });
    if let Some(temperature) = request.temperature {
        payload["temperature"] = json!(temperature);
    }
    if let Some(max_tokens) = request.max_tokens {
        payload["max_tokens"] = json!(max_tokens);
    }
    let url = format!(
        "{}/{}/openai/chat/completions",
        cfg.base_url.trim_end_matches('/'),
        cfg.api_version
    );
    client
        .post(&url)
        .header("OE-Key", &cfg.oe_key)
        .header("OE-Gateway-Name", &cfg.gateway_name)
        .header("OE-AI-Provider", &cfg.ai_provider)
        .header("Authorization", format!("Bearer {api_key}"))
        .json(&payload)
        .send()
        .map_err(|err| PipeError::from_transport(err, cfg.timeout_secs))
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
    match raw["choices"][0]["message"]["content"].as_str() {
        Some(content) => Ok(content.to_string()),
        None => Ok(NO_RESPONSE.to_string()),
    }
}
