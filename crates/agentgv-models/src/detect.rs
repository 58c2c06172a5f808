//! Current-model detection from the host's agent configuration

use crate::sync::{AgentConfig, ROUTER_AGENT};
use agentgv_types::Result;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// Canonical model names and the spellings that map to them, checked in order
const MODEL_ALIASES: &[(&str, &[&str])] = &[
    ("qwen3.5-plus", &["qwen3.5-plus", "qwen3.5+", "qwen3.5", "qwen-plus"]),
    (
        "qwen3-max-2026-01-23",
        &["qwen3-max", "qwen-max", "qwen3-max-2026-01-23"],
    ),
    (
        "qwen3-coder-plus",
        &["qwen3-coder-plus", "qwen-coder-plus", "coder-plus"],
    ),
    (
        "qwen3-coder-next",
        &["qwen3-coder-next", "qwen-coder-next", "coder-next"],
    ),
    ("minimax/m2.5", &["minimax/m2.5", "minimax-m2.5", "m2.5"]),
    (
        "opencode/glm-5-free",
        &["opencode/glm-5-free", "glm-5-free", "glm-5", "glm5"],
    ),
    (
        "bailian-coding-plan/qwen3.5-plus",
        &["bailian-coding-plan/qwen3.5-plus", "bailian/qwen3.5-plus"],
    ),
];

const VISION_MODELS: &[&str] = &["qwen3.5-plus", "bailian-coding-plan/qwen3.5-plus"];

const MINIMAX_MODELS: &[&str] = &[
    "minimax/m2.5",
    "minimax/m1",
    "minimax/MiniMax-M2.5",
    "minimax/MiniMax-M1",
];

/// Map a model id to its canonical name; unknown ids are returned unchanged
pub fn normalize_model_name(model: &str) -> String {
    let lower = model.to_lowercase();
    MODEL_ALIASES
        .iter()
        .find(|(_, aliases)| aliases.iter().any(|alias| lower.contains(&alias.to_lowercase())))
        .map_or_else(|| model.to_string(), |(canonical, _)| (*canonical).to_string())
}

/// MiniMax models never support vision
pub fn supports_vision(model: &str) -> bool {
    if MINIMAX_MODELS.iter().any(|m| model.contains(m)) {
        return false;
    }
    VISION_MODELS.iter().any(|m| model.contains(m))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelProvider {
    Minimax,
    Bailian,
    OpenAI,
    Anthropic,
    Unknown,
}

impl ModelProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minimax => "minimax",
            Self::Bailian => "bailian",
            Self::OpenAI => "openai",
            Self::Anthropic => "anthropic",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ModelProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn model_provider(model: &str) -> ModelProvider {
    if model.contains("minimax") {
        ModelProvider::Minimax
    } else if model.contains("bailian") || model.contains("qwen") {
        ModelProvider::Bailian
    } else if model.contains("openai") {
        ModelProvider::OpenAI
    } else if model.contains("anthropic") {
        ModelProvider::Anthropic
    } else {
        ModelProvider::Unknown
    }
}

/// A model found in the agent configuration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectedModel {
    pub model: String,
    pub normalized_model: String,
    /// Which config entry supplied the model
    pub source: String,
    pub path: PathBuf,
    pub provider: ModelProvider,
    pub vision_capable: bool,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Pick the active model out of a parsed config
///
/// Later sources override earlier ones: top-level `model`, then the active
/// agent's entry, then the router's entry.
pub fn detect_in_config(config: &AgentConfig, active_agent: Option<&str>) -> Option<(String, String)> {
    let mut found = config
        .global_model()
        .map(|m| (m.to_string(), "global default".to_string()));

    if let Some(agent) = active_agent {
        if let Some(model) = config.role_model(agent) {
            found = Some((model.to_string(), format!("agent config ({})", agent)));
        }
    }

    if let Some(model) = config.role_model(ROUTER_AGENT) {
        found = Some((model.to_string(), "router config".to_string()));
    }

    found
}

/// Read the agent config file and report the model it runs
///
/// `Ok(None)` means the file exists but names no model.
pub fn detect_current_model(config_path: &Path, active_agent: Option<&str>) -> Result<Option<DetectedModel>> {
    let config = AgentConfig::load(config_path)?;
    let modified = fs::metadata(config_path).and_then(|m| m.modified()).ok();
    Ok(detect_with_mtime(&config, config_path, active_agent, modified))
}

pub(crate) fn detect_with_mtime(
    config: &AgentConfig,
    config_path: &Path,
    active_agent: Option<&str>,
    modified: Option<SystemTime>,
) -> Option<DetectedModel> {
    let (model, source) = detect_in_config(config, active_agent)?;
    let normalized_model = normalize_model_name(&model);
    debug!("Detected model {} ({}) from {}", model, normalized_model, source);

    Some(DetectedModel {
        provider: model_provider(&model),
        vision_capable: VISION_MODELS.contains(&normalized_model.as_str()),
        normalized_model,
        model,
        source,
        path: config_path.to_path_buf(),
        last_modified: modified.map(DateTime::<Utc>::from),
    })
}
