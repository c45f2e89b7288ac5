use std::time::Duration;

use reqwest::blocking::Client;

use crate::config::{ApiFormat, PipeConfig};
use crate::error::PipeError;
use crate::gateway::rotation::KeyRotator;
use crate::gateway::types::{ChatRequest, Completion, ModelEntry};
use crate::gateway::{compat, native};
use crate::helpers;

/// The host entry point: owns the configuration, the key rotator and the
/// HTTP client, and dispatches each chat request to the configured upstream
/// format.
pub struct Pipe {
    cfg: PipeConfig,
    rotator: KeyRotator,
    client: Client,
}

impl Pipe {
    pub fn new(cfg: PipeConfig) -> Result<Self, PipeError> {
        let client = build_client(cfg.timeout_secs)?;
        Ok(Self {
            cfg,
            rotator: KeyRotator::new(),
            client,
        })
    }

    pub fn config(&self) -> &PipeConfig {
        &self.cfg
    }

    /// Swap in a new configuration. Rotation state survives, so an unchanged
    /// key string keeps its cursor and a changed one reloads on the next
    /// call.
    pub fn set_config(&mut self, cfg: PipeConfig) -> Result<(), PipeError> {
        if cfg.timeout_secs != self.cfg.timeout_secs {
            self.client = build_client(cfg.timeout_secs)?;
        }
        self.cfg = cfg;
        Ok(())
    }

    /// The models offered to the host, parsed from the configured
    /// allow-list.
    pub fn models(&self) -> Vec<ModelEntry> {
        helpers::split_list(&self.cfg.available_models)
            .into_iter()
            .map(|id| ModelEntry {
                name: id.clone(),
                id,
            })
            .collect()
    }

    pub fn dispatch(&self, request: &ChatRequest) -> Result<Completion, PipeError> {
        if self.cfg.api_keys.is_empty() {
            return Err(PipeError::ConfigIncomplete("api_keys"));
        }
        if self.cfg.oe_key.is_empty() {
            return Err(PipeError::ConfigIncomplete("oe_key"));
        }
        if self.cfg.gateway_name.is_empty() {
            return Err(PipeError::ConfigIncomplete("gateway_name"));
        }

        let api_key = self
            .rotator
            .next(&self.cfg.api_keys)
            .ok_or(PipeError::NoKeyAvailable)?;
        let model = bare_model_id(&request.model);
        tracing::debug!(model, format = ?self.cfg.api_format, "dispatching chat request");

        match self.cfg.api_format {
            ApiFormat::Native => {
                native::send(&self.client, &self.cfg, &api_key, model, request)
                    .map(Completion::Text)
            }
            ApiFormat::Compat if self.cfg.stream => {
                compat::send_stream(&self.client, &self.cfg, &api_key, model, request)
                    .map(Completion::Stream)
            }
            ApiFormat::Compat => {
                compat::send(&self.client, &self.cfg, &api_key, model, request)
                    .map(Completion::Text)
            }
        }
    }

    /// The error boundary for the host: failures come back as text, never as
    /// raw errors or panics.
    pub fn run(&self, request: &ChatRequest) -> Completion {
        match self.dispatch(request) {
            Ok(completion) => completion,
            Err(err) => {
                match &err {
                    PipeError::Unexpected(detail) => {
                        tracing::error!("dispatch failed unexpectedly: {detail}")
                    }
                    other => tracing::warn!("dispatch failed: {other}"),
                }
                Completion::Text(err.user_message())
            }
        }
    }
}

/// Host model ids may be namespaced (`pipe-id.model`); the gateway wants the
/// bare id after the last separator.
fn bare_model_id(model: &str) -> &str {
    match model.rsplit_once('.') {
        Some((_, bare)) => bare,
        None => model,
    }
}

fn build_client(timeout_secs: u64) -> Result<Client, PipeError> {
    Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|err| PipeError::Unexpected(format!("failed to build HTTP client: {err}")))
}
