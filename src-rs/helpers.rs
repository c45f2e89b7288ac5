use std::env;

use crate::config::{ApiFormat, PipeConfig, ReasoningLevel};

/// Split a delimited list, tolerating full-width commas, newlines and
/// semicolons as separators.
pub fn split_list(raw: &str) -> Vec<String> {
    raw.replace(|c| c == '，' || c == '\n' || c == ';', ",")
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn env_or(name: &str, fallback: &str) -> String {
    match env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => fallback.to_string(),
    }
}

fn env_flag(name: &str) -> bool {
    matches!(
        env::var(name).unwrap_or_default().trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

fn env_parse<T: std::str::FromStr>(name: &str, fallback: T) -> T {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse().ok())
        .unwrap_or(fallback)
}

/// Build a [`PipeConfig`] from `EO_*` environment variables, falling back to
/// the defaults for anything unset.
pub fn load_config_from_env() -> PipeConfig {
    let defaults = PipeConfig::default();
    PipeConfig {
        base_url: env_or("EO_BASE_URL", &defaults.base_url),
        api_version: env_or("EO_API_VERSION", &defaults.api_version),
        api_format: ApiFormat::parse(&env_or("EO_API_FORMAT", "native")),
        api_keys: env::var("EO_API_KEYS").unwrap_or_default(),
        oe_key: env::var("EO_KEY").unwrap_or_default(),
        gateway_name: env::var("EO_GATEWAY_NAME").unwrap_or_default(),
        ai_provider: env_or("EO_AI_PROVIDER", &defaults.ai_provider),
        available_models: env_or("EO_AVAILABLE_MODELS", &defaults.available_models),
        stream: env_flag("EO_STREAM"),
        timeout_secs: env_parse("EO_TIMEOUT_SECS", defaults.timeout_secs),
        experimental: env_flag("EO_EXPERIMENTAL"),
        reasoning_level: ReasoningLevel::parse(&env_or("EO_REASONING_LEVEL", "medium")),
        thinking_budget: env_parse("EO_THINKING_BUDGET", defaults.thinking_budget),
        media_resolution: env_or("EO_MEDIA_RESOLUTION", &defaults.media_resolution),
    }
}
