use crate::AgentGvError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Global policy biasing model selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceMode {
    #[default]
    QualityPriority,
    Balanced,
    CostSaving,
}

impl PreferenceMode {
    pub const ALL: [Self; 3] = [Self::QualityPriority, Self::Balanced, Self::CostSaving];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::QualityPriority => "quality_priority",
            Self::Balanced => "balanced",
            Self::CostSaving => "cost_saving",
        }
    }
}

impl fmt::Display for PreferenceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PreferenceMode {
    type Err = AgentGvError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quality_priority" | "quality" => Ok(Self::QualityPriority),
            "balanced" => Ok(Self::Balanced),
            "cost_saving" | "cost" => Ok(Self::CostSaving),
            _ => Err(AgentGvError::InvalidPreference(s.to_string())),
        }
    }
}
