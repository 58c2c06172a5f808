use serde::{Deserialize, Serialize};
use std::fmt;

/// Task-type tag used only for usage analytics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Architecture,
    Research,
    Coding,
    Review,
    Documentation,
    Coordination,
    Other,
}

impl TaskType {
    pub const ALL: [Self; 7] = [
        Self::Architecture,
        Self::Research,
        Self::Coding,
        Self::Review,
        Self::Documentation,
        Self::Coordination,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Architecture => "architecture",
            Self::Research => "research",
            Self::Coding => "coding",
            Self::Review => "review",
            Self::Documentation => "documentation",
            Self::Coordination => "coordination",
            Self::Other => "other",
        }
    }

    /// Parse a stored tag; unknown tags yield `None`
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == tag)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
