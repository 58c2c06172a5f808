//! Skill catalog loading and validation

use agentgv_types::{AgentGvError, Result, SkillCatalog, KNOWN_CATEGORIES};
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Load `skills.json` from disk
///
/// A missing file is [`AgentGvError::ConfigNotFound`], malformed JSON is
/// [`AgentGvError::ConfigParse`].
pub fn load_catalog(path: &Path) -> Result<SkillCatalog> {
    if !path.exists() {
        return Err(AgentGvError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| AgentGvError::io(path, e))?;
    let catalog = parse_catalog(&content).map_err(|e| AgentGvError::parse(path, e))?;
    validate_catalog(&catalog)?;

    info!(
        "Loaded {} skills in {} categories from {}",
        catalog.len(),
        catalog.skill_categories.len(),
        path.display()
    );
    Ok(catalog)
}

/// Parse catalog JSON without touching the filesystem
pub fn parse_catalog(content: &str) -> serde_json::Result<SkillCatalog> {
    serde_json::from_str(content)
}

/// Enforce catalog-wide skill id uniqueness
///
/// Unknown category names and keyword-less skills only produce warnings.
pub fn validate_catalog(catalog: &SkillCatalog) -> Result<()> {
    let mut seen: HashMap<&str, &str> = HashMap::new();

    for (category, skill) in catalog.iter_skills() {
        if let Some(first) = seen.insert(skill.id.as_str(), category) {
            return Err(AgentGvError::DuplicateSkillId {
                id: skill.id.clone(),
                first: first.to_string(),
                second: category.to_string(),
            });
        }

        if skill.keywords.is_empty() {
            warn!("Skill '{}' has no keywords and can never match", skill.id);
        }
    }

    for name in catalog.skill_categories.keys() {
        if !KNOWN_CATEGORIES.contains(&name.as_str()) {
            warn!("Unknown skill category '{}'", name);
        }
    }

    debug!("Catalog validated: {} unique skill ids", seen.len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentgv_types::Skill;

    #[test]
    fn test_duplicate_ids_across_categories() {
        let catalog = SkillCatalog::new()
            .with_category("software", vec![Skill::new("dup", "A", vec!["a".into()], "m", 0.1)])
            .with_category("creative", vec![Skill::new("dup", "B", vec!["b".into()], "m", 0.1)]);

        match validate_catalog(&catalog) {
            Err(AgentGvError::DuplicateSkillId { id, first, second }) => {
                assert_eq!(id, "dup");
                assert_eq!(first, "software");
                assert_eq!(second, "creative");
            }
            other => panic!("Expected duplicate id error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_category_is_not_fatal() {
        let catalog = SkillCatalog::new()
            .with_category("cooking", vec![Skill::new("soup", "Soup", vec!["soup".into()], "m", 0.5)]);
        assert!(validate_catalog(&catalog).is_ok());
    }

    #[test]
    fn test_missing_file() {
        let result = load_catalog(Path::new("/nonexistent/skills.json"));
        assert!(matches!(result, Err(AgentGvError::ConfigNotFound { .. })));
    }
}
