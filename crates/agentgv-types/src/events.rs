use crate::{MatchResult, PreferenceMode, TaskType};
use serde::{Deserialize, Serialize};

/// Token counts reported for a request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt: u64,
    #[serde(default)]
    pub total: u64,
}

/// A completed routing event handed to the usage tracker
///
/// Every field is optional; the tracker only counts the dimensions present.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UsageEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// Kept as a raw tag so unrecognized values can fall back to `other`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preference: Option<PreferenceMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tokens: Option<TokenUsage>,
}

impl UsageEvent {
    pub fn new() -> Self {
        Self::default()
    }

    /// Event describing a routed task
    pub fn from_match(result: &MatchResult, task_type: TaskType, preference: PreferenceMode) -> Self {
        Self {
            skill: Some(result.skill().id.clone()),
            category: Some(result.category().to_string()),
            model: Some(result.skill().model.clone()),
            task_type: Some(task_type.as_str().to_string()),
            preference: Some(preference),
            ..Self::default()
        }
    }

    pub fn with_agent(mut self, agent: impl Into<String>) -> Self {
        self.agent = Some(agent.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = Some(success);
        self
    }

    pub fn with_tokens(mut self, prompt: u64, total: u64) -> Self {
        self.tokens = Some(TokenUsage { prompt, total });
        self
    }
}
