//! AgentGV Skills System
//!
//! Routes free-text task descriptions to keyword-tagged skills.
//!
//! ## Features
//!
//! - `skills.json` catalog loading with duplicate-id detection
//! - Substring keyword matching with a stable, score-ordered ranking
//! - Confidence labels and a general-purpose fallback skill
//! - Task-type tagging for usage analytics
//! - `SKILL.md` discovery for building a catalog from a skills directory
//!
//! ## Routing
//!
//! 1. Lowercase the description and count keyword hits per skill
//! 2. Keep skills that scored, ordered by score (ties keep catalog order)
//! 3. Take the first candidate, or the general skill when none scored

#![deny(unsafe_code, dead_code, unused_imports, unused_variables, missing_docs)]

pub mod catalog;
pub mod classifier;
pub mod matcher;
pub mod registry;
pub mod skill;

pub use catalog::{load_catalog, parse_catalog, validate_catalog};
pub use classifier::classify_task_type;
pub use matcher::{match_skills, route, select_best};
pub use registry::{IndexedSkill, SkillIndex, SkillsRegistry};
pub use skill::SkillDocument;
