//! AgentGV Types - Core types for the AgentGV task router
//!
//! This module defines the skill catalog, match results and the shared error
//! type used throughout the workspace.

pub mod error;
pub mod events;
pub mod matching;
pub mod preference;
pub mod task;

pub use error::{AgentGvError, Result};
pub use events::{TokenUsage, UsageEvent};
pub use matching::{Confidence, MatchCandidate, MatchResult, MatchSummary};
pub use preference::PreferenceMode;
pub use task::TaskType;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Id of the synthetic skill used when nothing in the catalog matches
pub const GENERAL_SKILL_ID: &str = "general";
/// Category reported for the general-purpose fallback
pub const GENERAL_CATEGORY: &str = "general";
/// Model assigned to the general-purpose fallback
pub const GENERAL_MODEL: &str = "bailian-coding-plan/qwen3.5-plus";
/// Temperature assigned to the general-purpose fallback
pub const GENERAL_TEMPERATURE: f64 = 0.3;

/// Category names the catalog is expected to use
pub const KNOWN_CATEGORIES: &[&str] = &["software", "hardware", "simulation", "creative", "research"];

/// A task-handling profile the router can select
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub model: String,
    pub temperature: f64,
    #[serde(default)]
    pub system_prompt: String,
}

impl Skill {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        keywords: Vec<String>,
        model: impl Into<String>,
        temperature: f64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            keywords,
            model: model.into(),
            temperature,
            system_prompt: String::new(),
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// The general-purpose skill returned when no catalog skill matches
    pub fn general() -> Self {
        Self {
            id: GENERAL_SKILL_ID.to_string(),
            name: "General Purpose".to_string(),
            keywords: Vec::new(),
            model: GENERAL_MODEL.to_string(),
            temperature: GENERAL_TEMPERATURE,
            system_prompt: "You are a general-purpose AI assistant.".to_string(),
        }
    }
}

/// A group of skills, keyed by name inside [`SkillCatalog`]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCategory {
    #[serde(default)]
    pub skills: Vec<Skill>,
    /// Fields such as `description` that the router does not interpret
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SkillCategory {
    pub fn new(skills: Vec<Skill>) -> Self {
        Self {
            skills,
            extra: Map::new(),
        }
    }
}

/// The `skills.json` document: ordered categories of skills
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SkillCatalog {
    #[serde(default)]
    pub skill_categories: IndexMap<String, SkillCategory>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SkillCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a category, keeping insertion order
    pub fn with_category(mut self, name: impl Into<String>, skills: Vec<Skill>) -> Self {
        self.skill_categories
            .insert(name.into(), SkillCategory::new(skills));
        self
    }

    /// Iterate `(category, skill)` pairs in catalog order
    pub fn iter_skills(&self) -> impl Iterator<Item = (&str, &Skill)> {
        self.skill_categories
            .iter()
            .flat_map(|(name, category)| category.skills.iter().map(move |s| (name.as_str(), s)))
    }

    /// Look up a skill and its category by id
    pub fn find(&self, id: &str) -> Option<(&str, &Skill)> {
        self.iter_skills().find(|(_, skill)| skill.id == id)
    }

    /// Total number of skills across categories
    pub fn len(&self) -> usize {
        self.skill_categories.values().map(|c| c.skills.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_preserves_category_order() {
        let json = r#"{
            "skill_categories": {
                "software": {"skills": [{"id": "python", "name": "Python", "keywords": ["python"], "model": "m", "temperature": 0.2, "system_prompt": ""}]},
                "creative": {"description": "Writing", "skills": [{"id": "fiction", "name": "Fiction", "keywords": ["小说"], "model": "m", "temperature": 0.8, "system_prompt": ""}]}
            }
        }"#;

        let catalog: SkillCatalog = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = catalog.iter_skills().map(|(c, s)| (c, s.id.as_str())).collect();
        assert_eq!(ids, vec![("software", "python"), ("creative", "fiction")]);
        assert_eq!(
            catalog.skill_categories["creative"].extra.get("description"),
            Some(&Value::String("Writing".into()))
        );
    }

    #[test]
    fn test_find_and_len() {
        let catalog = SkillCatalog::new()
            .with_category("software", vec![Skill::new("rust", "Rust", vec![], "m", 0.1)])
            .with_category("hardware", vec![Skill::new("pcb", "PCB", vec![], "m", 0.1)]);

        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.find("pcb").map(|(c, _)| c), Some("hardware"));
        assert!(catalog.find("missing").is_none());
    }

    #[test]
    fn test_general_skill_literal() {
        let general = Skill::general();
        assert_eq!(general.id, "general");
        assert_eq!(general.model, GENERAL_MODEL);
        assert!((general.temperature - 0.3).abs() < f64::EPSILON);
    }
}
