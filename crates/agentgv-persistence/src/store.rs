//! Atomic JSON file helpers

use agentgv_types::{AgentGvError, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Read and deserialize a JSON file
///
/// Missing files map to [`AgentGvError::ConfigNotFound`], malformed content to
/// [`AgentGvError::ConfigParse`].
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(AgentGvError::ConfigNotFound {
            path: path.to_path_buf(),
        });
    }

    let content = fs::read_to_string(path).map_err(|e| AgentGvError::io(path, e))?;
    serde_json::from_str(&content).map_err(|e| AgentGvError::parse(path, e))
}

/// Serialize with two-space indentation and write atomically
pub fn save_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    save_json_indented(path, value, b"  ")
}

/// Serialize with a custom indent and write atomically
pub fn save_json_indented<T: Serialize>(path: &Path, value: &T, indent: &[u8]) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent);
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;

    atomic_write(path, &buf)
}

/// Write content atomically:
/// - ensure parent directory exists
/// - write to a temp file in the same directory
/// - fsync file + rename into place
fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent).map_err(|e| AgentGvError::io(parent, e))?;

    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty())
        .unwrap_or("state.json");
    let temp_path = parent.join(format!(".{}.{}.tmp", file_name, uuid::Uuid::new_v4()));

    let written = File::create(&temp_path)
        .and_then(|mut file| {
            file.write_all(content)?;
            file.sync_all()
        })
        .and_then(|()| fs::rename(&temp_path, path));

    if let Err(e) = written {
        let _ = fs::remove_file(&temp_path);
        return Err(AgentGvError::io(path, e));
    }

    debug!("Wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};
    use tempfile::TempDir;

    #[test]
    fn test_round_trip_creates_parent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("state.json");

        save_json(&path, &json!({"b": 1, "a": 2})).unwrap();
        let value: Value = load_json(&path).unwrap();
        assert_eq!(value["a"], 2);

        // key order survives a rewrite
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.find("\"b\"").unwrap() < text.find("\"a\"").unwrap());
    }

    #[test]
    fn test_no_temp_files_left() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        save_json_indented(&path, &json!({"k": "v"}), b"    ").unwrap();

        let names: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["config.json".to_string()]);
        assert!(fs::read_to_string(&path).unwrap().contains("    \"k\""));
    }

    #[test]
    fn test_missing_and_malformed() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(
            load_json::<Value>(&missing),
            Err(AgentGvError::ConfigNotFound { .. })
        ));

        let bad = dir.path().join("bad.json");
        fs::write(&bad, "{").unwrap();
        assert!(matches!(
            load_json::<Value>(&bad),
            Err(AgentGvError::ConfigParse { .. })
        ));
    }
}
