use serde::{Deserialize, Serialize};

/// Which upstream schema the gateway call is shaped for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiFormat {
    Native,
    Compat,
}

impl ApiFormat {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "compat" | "openai" | "chat" => ApiFormat::Compat,
            _ => ApiFormat::Native,
        }
    }
}

/// Reasoning-depth hint used when no explicit thinking budget is set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReasoningLevel {
    Minimal,
    Low,
    Medium,
    High,
}

impl ReasoningLevel {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minimal" => ReasoningLevel::Minimal,
            "low" => ReasoningLevel::Low,
            "high" => ReasoningLevel::High,
            _ => ReasoningLevel::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReasoningLevel::Minimal => "minimal",
            ReasoningLevel::Low => "low",
            ReasoningLevel::Medium => "medium",
            ReasoningLevel::High => "high",
        }
    }
}

#[derive(Clone, Debug)]
pub struct PipeConfig {
    pub base_url: String,
    pub api_version: String,
    pub api_format: ApiFormat,
    /// Raw comma-delimited key list; parsed lazily by the rotator.
    pub api_keys: String,
    pub oe_key: String,
    pub gateway_name: String,
    pub ai_provider: String,
    pub available_models: String,
    pub stream: bool,
    pub timeout_secs: u64,
    pub experimental: bool,
    pub reasoning_level: ReasoningLevel,
    pub thinking_budget: i32,
    pub media_resolution: String,
}

impl Default for PipeConfig {
    fn default() -> Self {
        Self {
            base_url: "https://ai-gateway.eo-edgefunctions7.com".to_string(),
            api_version: "v1".to_string(),
            api_format: ApiFormat::Native,
            api_keys: String::new(),
            oe_key: String::new(),
            gateway_name: String::new(),
            ai_provider: "gemini".to_string(),
            available_models: "gemini-pro,gemini-1.5-pro-latest".to_string(),
            stream: false,
            timeout_secs: 180,
            experimental: false,
            reasoning_level: ReasoningLevel::Medium,
            thinking_budget: 0,
            media_resolution: "medium".to_string(),
        }
    }
}
