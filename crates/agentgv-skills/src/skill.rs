//! `SKILL.md` document parsing
//!
//! Each skill is a folder containing SKILL.md with YAML frontmatter

use agentgv_types::{AgentGvError, Result, Skill, GENERAL_MODEL, GENERAL_TEMPERATURE};
use regex::Regex;
use serde::{Deserialize, Deserializer};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Maximum allowed skill id length
const MAX_ID_LENGTH: usize = 64;

/// Skill metadata extracted from YAML frontmatter
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillMetadata {
    /// Skill id; derived from the folder path when absent
    #[serde(default)]
    pub name: Option<String>,
    /// What the skill does and when to use it
    #[serde(default)]
    pub description: String,
    /// Catalog category, `other` when absent
    #[serde(default)]
    pub category: Option<String>,
    /// Match terms, as a YAML list or a comma-separated string
    #[serde(default, deserialize_with = "keyword_list")]
    pub keywords: Vec<String>,
    /// Model identifier
    #[serde(default)]
    pub model: Option<String>,
    /// Sampling temperature
    #[serde(default)]
    pub temperature: Option<f64>,
}

/// A parsed SKILL.md with its location
#[derive(Debug, Clone)]
pub struct SkillDocument {
    /// Frontmatter fields
    pub metadata: SkillMetadata,
    /// Resolved skill id
    pub id: String,
    /// Folder path relative to the scanned root, `/`-separated
    pub path: String,
    /// Full path of the SKILL.md file
    pub file: PathBuf,
    /// Markdown body after the frontmatter
    pub body: String,
}

impl SkillDocument {
    /// Load a SKILL.md file; `relative` is its folder relative to the scan root
    pub fn from_file(file: &Path, relative: &str) -> Result<Self> {
        let content = fs::read_to_string(file).map_err(|e| AgentGvError::io(file, e))?;
        Self::parse(&content, file, relative)
    }

    /// Parse SKILL.md content
    pub fn parse(content: &str, file: &Path, relative: &str) -> Result<Self> {
        let (metadata, body) =
            parse_skill_content(content).map_err(|message| AgentGvError::parse(file, message))?;

        let id = metadata
            .name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| relative.replace('/', "-"));

        validate_id(&id).map_err(|message| AgentGvError::parse(file, message))?;

        Ok(Self {
            metadata,
            id,
            path: relative.to_string(),
            file: file.to_path_buf(),
            body,
        })
    }

    /// Category for catalog grouping
    pub fn category(&self) -> &str {
        self.metadata.category.as_deref().unwrap_or("other")
    }

    /// Convert into a catalog skill; the markdown body becomes the system prompt
    pub fn to_skill(&self) -> Skill {
        Skill::new(
            self.id.clone(),
            self.id.clone(),
            self.metadata.keywords.clone(),
            self.metadata
                .model
                .clone()
                .unwrap_or_else(|| GENERAL_MODEL.to_string()),
            self.metadata.temperature.unwrap_or(GENERAL_TEMPERATURE),
        )
        .with_system_prompt(self.body.trim())
    }
}

/// Parse skill content to extract frontmatter metadata and body
fn parse_skill_content(content: &str) -> std::result::Result<(SkillMetadata, String), String> {
    let frontmatter_re = Regex::new(r"^---\s*\r?\n([\s\S]*?)\r?\n---\s*(?:\r?\n([\s\S]*))?$")
        .map_err(|e| format!("Failed to compile regex: {}", e))?;

    let captures = frontmatter_re
        .captures(content)
        .ok_or_else(|| "No valid YAML frontmatter found".to_string())?;

    let yaml_str = captures
        .get(1)
        .ok_or_else(|| "Failed to extract frontmatter".to_string())?
        .as_str();

    let body = captures.get(2).map(|m| m.as_str()).unwrap_or("");

    let metadata = match serde_yaml::from_str::<SkillMetadata>(yaml_str) {
        Ok(metadata) => metadata,
        Err(e) => {
            debug!("Frontmatter is not strict YAML ({}), reading it line by line", e);
            parse_frontmatter_lines(yaml_str)
        }
    };

    Ok((metadata, body.to_string()))
}

/// Lenient `key: value` reader for frontmatter that YAML rejects,
/// e.g. unquoted values containing `: `
fn parse_frontmatter_lines(yaml: &str) -> SkillMetadata {
    let mut metadata = SkillMetadata::default();
    let mut in_keyword_list = false;

    for line in yaml.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        if in_keyword_list {
            if let Some(item) = trimmed.strip_prefix('-') {
                let item = unquote(item.trim());
                if !item.is_empty() {
                    metadata.keywords.push(item.to_string());
                }
                continue;
            }
            in_keyword_list = false;
        }

        let Some((key, value)) = trimmed.split_once(':') else {
            continue;
        };
        let value = unquote(value.trim());

        match key.trim() {
            "name" => metadata.name = Some(value.to_string()).filter(|v| !v.is_empty()),
            "description" => metadata.description = value.to_string(),
            "category" => metadata.category = Some(value.to_string()).filter(|v| !v.is_empty()),
            "model" => metadata.model = Some(value.to_string()).filter(|v| !v.is_empty()),
            "temperature" => metadata.temperature = value.parse().ok(),
            "keywords" if value.is_empty() => in_keyword_list = true,
            "keywords" => metadata.keywords = split_keywords(value),
            _ => {}
        }
    }

    metadata
}

/// `[a, b]` or `a, b`
fn split_keywords(value: &str) -> Vec<String> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .unwrap_or(value);
    inner
        .split(',')
        .map(|k| unquote(k.trim()).to_string())
        .filter(|k| !k.is_empty())
        .collect()
}

fn unquote(value: &str) -> &str {
    ['"', '\'']
        .iter()
        .find_map(|q| value.strip_prefix(*q).and_then(|v| v.strip_suffix(*q)))
        .unwrap_or(value)
}

/// Ids only need to be non-empty; unusual ones are reported but kept
fn validate_id(id: &str) -> std::result::Result<(), String> {
    if id.trim().is_empty() {
        return Err("Skill id cannot be empty".to_string());
    }

    if id.chars().count() > MAX_ID_LENGTH {
        warn!("Skill id '{}' exceeds {} characters", id, MAX_ID_LENGTH);
    }

    if id.chars().any(|c| c.is_whitespace() || c == '/') {
        warn!("Skill id '{}' contains whitespace or '/'", id);
    }

    Ok(())
}

fn keyword_list<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<serde_yaml::Value>::deserialize(deserializer)? {
        Some(serde_yaml::Value::Sequence(items)) => items.iter().filter_map(scalar_text).collect(),
        Some(serde_yaml::Value::String(csv)) => split_keywords(&csv),
        Some(other) => scalar_text(&other).into_iter().collect(),
        None => Vec::new(),
    })
}

/// Text of a scalar keyword; `2` and `true` count as keywords too
fn scalar_text(value: &serde_yaml::Value) -> Option<String> {
    match value {
        serde_yaml::Value::String(s) => Some(s.trim().to_string()).filter(|s| !s.is_empty()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        serde_yaml::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
