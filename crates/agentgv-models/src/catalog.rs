use agentgv_persistence::{load_json, save_json};
use agentgv_types::{AgentGvError, PreferenceMode, Result};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One entry of the `models` list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub short_id: String,
    #[serde(default)]
    pub cost_level: String,
    #[serde(default)]
    pub best_for: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Model policy attached to a preference mode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PreferenceProfile {
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub default_model: String,
    /// Model used when a task is judged complex
    #[serde(default)]
    pub complex_upgrade: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The `models.json` document
///
/// Unknown top-level fields are kept so a rewrite never drops them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelCatalog {
    #[serde(default)]
    pub models: Vec<ModelInfo>,
    #[serde(default)]
    pub user_preferences: IndexMap<String, PreferenceProfile>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_preference: Option<PreferenceMode>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ModelCatalog {
    /// Active mode, `quality_priority` when unset
    pub fn preference(&self) -> PreferenceMode {
        self.current_preference.unwrap_or_default()
    }

    pub fn profile(&self, mode: PreferenceMode) -> Option<&PreferenceProfile> {
        self.user_preferences.get(mode.as_str())
    }

    pub fn short_ids(&self) -> impl Iterator<Item = &str> {
        self.models.iter().map(|m| m.short_id.as_str())
    }
}

/// Reads and writes the preference mode stored in `models.json`
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<ModelCatalog> {
        load_json(&self.path)
    }

    /// Active mode; a missing catalog means the default mode
    pub fn current(&self) -> Result<PreferenceMode> {
        match self.load() {
            Ok(catalog) => Ok(catalog.preference()),
            Err(AgentGvError::ConfigNotFound { .. }) => {
                debug!(
                    "No model catalog at {}, using default preference",
                    self.path.display()
                );
                Ok(PreferenceMode::default())
            }
            Err(e) => Err(e),
        }
    }

    /// Persist a new mode and return the updated catalog
    pub fn set(&self, mode: PreferenceMode) -> Result<ModelCatalog> {
        let mut catalog = self.load()?;
        catalog.current_preference = Some(mode);
        save_json(&self.path, &catalog)?;
        info!("Model preference set to: {}", mode);
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const MODELS_JSON: &str = r#"{
  "version": "2.1",
  "models": [
    {"name": "Qwen3.5 Plus", "short_id": "qwen3.5-plus", "cost_level": "medium", "best_for": ["vision", "general"]},
    {"name": "Qwen3 Coder Next", "short_id": "qwen3-coder-next", "cost_level": "low", "best_for": ["coding"]}
  ],
  "user_preferences": {
    "quality_priority": {"description": "Best quality", "default_model": "qwen3-max-2026-01-23", "complex_upgrade": "qwen3-max-2026-01-23"},
    "balanced": {"description": "Balanced", "default_model": "qwen3.5-plus", "complex_upgrade": "qwen3-max-2026-01-23"},
    "cost_saving": {"description": "Cheapest", "default_model": "qwen3-coder-next", "complex_upgrade": "qwen3.5-plus"}
  }
}"#;

    #[test]
    fn test_default_preference_when_absent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models.json");
        fs::write(&path, MODELS_JSON).unwrap();

        let store = PreferenceStore::new(&path);
        assert_eq!(store.current().unwrap(), PreferenceMode::QualityPriority);
        assert_eq!(
            PreferenceStore::new(dir.path().join("missing.json")).current().unwrap(),
            PreferenceMode::QualityPriority
        );
    }

    #[test]
    fn test_set_preserves_unknown_fields() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("models.json");
        fs::write(&path, MODELS_JSON).unwrap();

        let store = PreferenceStore::new(&path);
        let catalog = store.set(PreferenceMode::CostSaving).unwrap();
        assert_eq!(
            catalog.profile(PreferenceMode::CostSaving).unwrap().default_model,
            "qwen3-coder-next"
        );

        let reloaded = store.load().unwrap();
        assert_eq!(reloaded.preference(), PreferenceMode::CostSaving);
        assert_eq!(reloaded.extra.get("version"), Some(&Value::String("2.1".into())));
        assert_eq!(
            reloaded.short_ids().collect::<Vec<_>>(),
            vec!["qwen3.5-plus", "qwen3-coder-next"]
        );
    }

    #[test]
    fn test_set_requires_catalog() {
        let dir = TempDir::new().unwrap();
        let store = PreferenceStore::new(dir.path().join("models.json"));
        assert!(matches!(
            store.set(PreferenceMode::Balanced),
            Err(AgentGvError::ConfigNotFound { .. })
        ));
    }
}
