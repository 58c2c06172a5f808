//! End-to-end tests running the `agentgv` binary against a temporary home

use serde_json::Value;
use std::fs;
use std::process::{Command, Output};
use tempfile::TempDir;

const SKILLS_JSON: &str = r#"{
  "skill_categories": {
    "software": {"skills": [
      {"id": "python_dev", "name": "Python Development", "keywords": ["python", "script", "pandas"],
       "model": "bailian-coding-plan/qwen3-coder-next", "temperature": 0.2, "system_prompt": "Code."}
    ]}
  }
}"#;

fn agentgv(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_agentgv"))
        .args(args)
        .current_dir(home.path())
        .env("HOME", home.path())
        .env("AGENTGV_HOME", home.path().join("data"))
        .env("OPENCODE_CONFIG", home.path().join("opencode.json"))
        .env_remove("OPENCODE_AGENT")
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn setup() -> TempDir {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("data")).unwrap();
    fs::write(home.path().join("data").join("skills.json"), SKILLS_JSON).unwrap();
    home
}

#[test]
fn test_match_exit_codes() {
    let home = setup();

    let medium = agentgv(&home, &["match", "python", "script"]);
    assert_eq!(medium.status.code(), Some(0));
    let summary: Value = serde_json::from_slice(&medium.stdout).unwrap();
    assert_eq!(summary["skill_id"], "python_dev");
    assert_eq!(summary["confidence"], "medium");

    let low = agentgv(&home, &["match", "python"]);
    assert_eq!(low.status.code(), Some(2));

    let fallback = agentgv(&home, &["match", "plan", "a", "wedding"]);
    assert_eq!(fallback.status.code(), Some(2));
    let summary: Value = serde_json::from_slice(&fallback.stdout).unwrap();
    assert_eq!(summary["skill_id"], "general");

    let missing = agentgv(&home, &["match"]);
    assert_eq!(missing.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&missing.stderr).contains("Code: INVALID_INPUT"));

    assert!(home.path().join(".agentgv").join("agentgv.toml").exists());
}

#[test]
fn test_track_then_stats() {
    let home = setup();

    let tracked = agentgv(&home, &["match", "pandas", "python", "script", "--track", "--agent", "operations"]);
    assert_eq!(tracked.status.code(), Some(0));

    let stats = agentgv(&home, &["stats"]);
    assert_eq!(stats.status.code(), Some(0));
    let stats: Value = serde_json::from_slice(&stats.stdout).unwrap();
    assert_eq!(stats["total_requests"], 1);
    assert_eq!(stats["by_agent"]["operations"]["count"], 1);
    assert_eq!(stats["by_model"]["qwen3-coder-next"]["count"], 1);

    let reset = agentgv(&home, &["stats", "--reset", "--keep-keys"]);
    let reset: Value = serde_json::from_slice(&reset.stdout).unwrap();
    assert_eq!(reset["total_requests"], 0);
    assert!(reset["by_skill"].get("python_dev").is_some());
}

#[test]
fn test_sync_and_detect() {
    let home = setup();
    fs::write(
        home.path().join("opencode.json"),
        r#"{"model": "bailian-coding-plan/qwen3.5-plus", "theme": "dark"}"#,
    )
    .unwrap();

    let synced = agentgv(&home, &["sync"]);
    assert_eq!(synced.status.code(), Some(0));
    let report: Value = serde_json::from_slice(&synced.stdout).unwrap();
    assert_eq!(report["synced"], true);
    assert_eq!(report["outcome"]["updated_roles"].as_array().unwrap().len(), 6);

    let detected = agentgv(&home, &["detect"]);
    let detected: Value = serde_json::from_slice(&detected.stdout).unwrap();
    assert_eq!(detected["source"], "router config");
    assert_eq!(detected["normalized_model"], "qwen3.5-plus");

    let config: Value =
        serde_json::from_str(&fs::read_to_string(home.path().join("opencode.json")).unwrap()).unwrap();
    assert_eq!(config["theme"], "dark");
    assert_eq!(config["agentgv-quality"]["model"], "bailian-coding-plan/qwen3.5-plus");
}
