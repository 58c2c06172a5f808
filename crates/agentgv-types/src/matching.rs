use crate::{Skill, GENERAL_CATEGORY};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse match strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl Confidence {
    /// 1 → low, 2 → medium, 3+ → high
    pub fn from_score(score: usize) -> Self {
        match score {
            0 | 1 => Self::Low,
            2 => Self::Medium,
            _ => Self::High,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A skill that scored above zero for a task description
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCandidate {
    pub skill: Skill,
    pub category: String,
    pub score: usize,
    pub matched_keywords: Vec<String>,
}

/// Outcome of routing a task description
#[derive(Debug, Clone, PartialEq)]
pub enum MatchResult {
    /// A catalog skill won
    Matched {
        candidate: MatchCandidate,
        confidence: Confidence,
    },
    /// Nothing scored; the general-purpose skill is used
    Fallback { skill: Skill },
}

impl MatchResult {
    pub fn matched(candidate: MatchCandidate) -> Self {
        let confidence = Confidence::from_score(candidate.score);
        Self::Matched {
            candidate,
            confidence,
        }
    }

    pub fn fallback() -> Self {
        Self::Fallback {
            skill: Skill::general(),
        }
    }

    pub fn skill(&self) -> &Skill {
        match self {
            Self::Matched { candidate, .. } => &candidate.skill,
            Self::Fallback { skill } => skill,
        }
    }

    pub fn category(&self) -> &str {
        match self {
            Self::Matched { candidate, .. } => &candidate.category,
            Self::Fallback { .. } => GENERAL_CATEGORY,
        }
    }

    pub fn confidence(&self) -> Confidence {
        match self {
            Self::Matched { confidence, .. } => *confidence,
            Self::Fallback { .. } => Confidence::Low,
        }
    }

    pub fn score(&self) -> usize {
        match self {
            Self::Matched { candidate, .. } => candidate.score,
            Self::Fallback { .. } => 0,
        }
    }

    pub fn matched_keywords(&self) -> &[String] {
        match self {
            Self::Matched { candidate, .. } => &candidate.matched_keywords,
            Self::Fallback { .. } => &[],
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    /// Human-readable note attached to degraded results
    pub fn warning(&self) -> Option<&'static str> {
        self.is_fallback()
            .then_some("No specific skill matched, using general purpose")
    }

    /// Flatten into the record printed by the CLI
    pub fn to_summary(&self, timestamp: DateTime<Utc>) -> MatchSummary {
        let skill = self.skill();
        MatchSummary {
            skill_id: skill.id.clone(),
            skill_name: skill.name.clone(),
            category: self.category().to_string(),
            model: skill.model.clone(),
            temperature: skill.temperature,
            confidence: self.confidence(),
            matched_keywords: self.matched_keywords().to_vec(),
            timestamp,
        }
    }
}

/// Serialized match record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSummary {
    pub skill_id: String,
    pub skill_name: String,
    pub category: String,
    pub model: String,
    pub temperature: f64,
    pub confidence: Confidence,
    pub matched_keywords: Vec<String>,
    pub timestamp: DateTime<Utc>,
}
