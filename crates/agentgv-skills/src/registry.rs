//! Skills registry built from `SKILL.md` folders
//!
//! Scans skills directories recursively and turns the documents found into
//! either a [`SkillIndex`] (written to `skills-index.json`) or a
//! [`SkillCatalog`] the matcher can route against.

use agentgv_types::{AgentGvError, Result, SkillCatalog, SkillCategory};
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::skill::SkillDocument;

/// Version written into generated indexes
pub const INDEX_VERSION: &str = "1.0.0";

const SKILL_FILE: &str = "SKILL.md";

/// Skills registry holding every discovered document
#[derive(Debug, Default)]
pub struct SkillsRegistry {
    /// Discovered skills, in scan order
    skills: Vec<SkillDocument>,
    /// Skills directories to scan
    directories: Vec<PathBuf>,
}

impl SkillsRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a skills directory to scan
    pub fn add_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.directories.push(dir.into());
        self
    }

    /// Scan all configured directories
    ///
    /// Missing directories are skipped. A skill id seen twice keeps its first
    /// occurrence.
    pub fn discover(&mut self) -> Result<()> {
        info!(
            "Starting skills discovery in {} directories",
            self.directories.len()
        );

        let directories = self.directories.clone();
        let mut found = Vec::new();

        for dir in &directories {
            if !dir.exists() {
                debug!("Skills directory does not exist: {:?}", dir);
                continue;
            }

            if !dir.is_dir() {
                warn!("Skills path is not a directory: {:?}", dir);
                continue;
            }

            scan_directory(dir, "", &mut found)?;
        }

        let mut seen: HashSet<String> = self.skills.iter().map(|s| s.id.clone()).collect();
        for doc in found {
            if seen.insert(doc.id.clone()) {
                self.skills.push(doc);
            } else {
                warn!("Duplicate skill id '{}' at {:?}, skipping", doc.id, doc.file);
            }
        }

        info!("Discovered {} skills", self.skills.len());
        Ok(())
    }

    /// Get number of skills
    pub fn len(&self) -> usize {
        self.skills.len()
    }

    /// Check if registry is empty
    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    /// Build an index document stamped with `generated`
    pub fn to_index(&self, generated: DateTime<Utc>) -> SkillIndex {
        let mut categories: IndexMap<String, Vec<String>> = IndexMap::new();
        for doc in &self.skills {
            categories
                .entry(doc.category().to_string())
                .or_default()
                .push(doc.id.clone());
        }

        SkillIndex {
            version: INDEX_VERSION.to_string(),
            generated,
            total: self.skills.len(),
            categories,
            skills: self.skills.iter().map(IndexedSkill::from).collect(),
        }
    }

    /// Group discovered skills into a routable catalog
    pub fn to_catalog(&self) -> SkillCatalog {
        let mut catalog = SkillCatalog::new();
        for doc in &self.skills {
            catalog
                .skill_categories
                .entry(doc.category().to_string())
                .or_insert_with(SkillCategory::default)
                .skills
                .push(doc.to_skill());
        }
        catalog
    }
}

/// Depth-first scan; entries are visited in name order so results are stable
fn scan_directory(dir: &Path, relative: &str, found: &mut Vec<SkillDocument>) -> Result<()> {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .map_err(|e| AgentGvError::io(dir, e))?
        .collect::<std::io::Result<_>>()
        .map_err(|e| AgentGvError::io(dir, e))?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().to_string();

        if path.is_dir() {
            if name.starts_with('.') {
                continue;
            }
            let child = if relative.is_empty() {
                name
            } else {
                format!("{}/{}", relative, name)
            };
            scan_directory(&path, &child, found)?;
        } else if name == SKILL_FILE {
            match SkillDocument::from_file(&path, relative) {
                Ok(doc) => {
                    debug!("Discovered skill: {} at {:?}", doc.id, path);
                    found.push(doc);
                }
                Err(e) => {
                    warn!("Skipping skill at {:?}: {}", path, e);
                }
            }
        }
    }

    Ok(())
}

/// The `skills-index.json` document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillIndex {
    /// Index format version
    pub version: String,
    /// Generation time
    pub generated: DateTime<Utc>,
    /// Number of skills
    pub total: usize,
    /// Category name to skill ids
    pub categories: IndexMap<String, Vec<String>>,
    /// Skill summaries
    pub skills: Vec<IndexedSkill>,
}

/// One skill entry of a [`SkillIndex`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexedSkill {
    /// Skill id
    pub id: String,
    /// Description from frontmatter
    pub description: String,
    /// Category, `other` when unset
    pub category: String,
    /// Match terms
    pub keywords: Vec<String>,
    /// Model identifier, if pinned
    pub model: Option<String>,
    /// Temperature, if pinned
    pub temperature: Option<f64>,
    /// Folder relative to the scan root
    pub path: String,
}

impl From<&SkillDocument> for IndexedSkill {
    fn from(doc: &SkillDocument) -> Self {
        Self {
            id: doc.id.clone(),
            description: doc.metadata.description.clone(),
            category: doc.category().to_string(),
            keywords: doc.metadata.keywords.clone(),
            model: doc.metadata.model.clone(),
            temperature: doc.metadata.temperature,
            path: doc.path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_new() {
        let registry = SkillsRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
        assert!(registry.to_catalog().is_empty());
    }

    #[test]
    fn test_missing_directory_is_skipped() {
        let mut registry = SkillsRegistry::new().add_directory("/nonexistent/skills");
        registry.discover().unwrap();
        assert!(registry.is_empty());
    }
}
