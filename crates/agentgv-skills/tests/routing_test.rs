//! Routing against catalogs loaded from disk

use agentgv_skills::{classify_task_type, load_catalog, route, SkillsRegistry};
use agentgv_types::{AgentGvError, Confidence, TaskType};
use chrono::Utc;
use std::fs;
use tempfile::TempDir;

const SKILLS_JSON: &str = r#"{
  "skill_categories": {
    "software": {
      "skills": [
        {"id": "python", "name": "Python Developer", "keywords": ["python", "爬虫", "web"],
         "model": "bailian-coding-plan/qwen3-coder-plus", "temperature": 0.2,
         "system_prompt": "You are a Python expert."}
      ]
    },
    "hardware": {
      "skills": [
        {"id": "pcb", "name": "PCB Designer", "keywords": ["pcb", "电路板", "layout"],
         "model": "bailian-coding-plan/qwen3-max-2026-01-23", "temperature": 0.3,
         "system_prompt": "You design circuit boards."}
      ]
    },
    "creative": {
      "skills": [
        {"id": "fiction", "name": "Fiction Writer", "keywords": ["科幻小说", "小说", "故事"],
         "model": "bailian-coding-plan/qwen3.5-plus", "temperature": 0.8,
         "system_prompt": "You write fiction."}
      ]
    }
  }
}"#;

#[test]
fn test_route_from_skills_json() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skills.json");
    fs::write(&path, SKILLS_JSON).unwrap();

    let catalog = load_catalog(&path).unwrap();
    assert_eq!(catalog.len(), 3);

    let result = route("设计一个 PCB 电路板", &catalog).unwrap();
    assert_eq!(result.skill().id, "pcb");
    assert_eq!(result.confidence(), Confidence::Medium);
    assert_eq!(classify_task_type("设计一个 PCB 电路板"), TaskType::Architecture);

    let summary = result.to_summary(Utc::now());
    assert_eq!(summary.model, "bailian-coding-plan/qwen3-max-2026-01-23");
    assert!((summary.temperature - 0.3).abs() < f64::EPSILON);
}

#[test]
fn test_malformed_catalog_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("skills.json");
    fs::write(&path, "{ not json").unwrap();

    assert!(matches!(
        load_catalog(&path),
        Err(AgentGvError::ConfigParse { .. })
    ));
}

#[test]
fn test_catalog_from_skill_documents() {
    let dir = TempDir::new().unwrap();
    let fiction = dir.path().join("creative").join("fiction");
    let hidden = dir.path().join(".drafts").join("secret");
    fs::create_dir_all(&fiction).unwrap();
    fs::create_dir_all(&hidden).unwrap();

    fs::write(
        fiction.join("SKILL.md"),
        "---\nname: fiction\ncategory: creative\nkeywords: [科幻小说, 小说]\n---\nWrite stories.\n",
    )
    .unwrap();
    fs::write(
        hidden.join("SKILL.md"),
        "---\nname: secret\nkeywords: [小说]\n---\nHidden.\n",
    )
    .unwrap();

    let mut registry = SkillsRegistry::new().add_directory(dir.path());
    registry.discover().unwrap();
    assert_eq!(registry.len(), 1);

    let index = registry.to_index(Utc::now());
    assert_eq!(index.total, 1);
    assert_eq!(index.categories["creative"], vec!["fiction".to_string()]);
    assert_eq!(index.skills[0].path, "creative/fiction");

    let catalog = registry.to_catalog();
    let result = route("写一篇科幻小说", &catalog).unwrap();
    assert_eq!(result.skill().id, "fiction");
    assert_eq!(result.skill().system_prompt, "Write stories.");
    assert_eq!(result.confidence(), Confidence::Medium);
}

#[test]
fn test_scan_keeps_unusual_names_and_loose_frontmatter() {
    let dir = TempDir::new().unwrap();
    let docs = [
        ("novel", "---\nname: 小说写作\ncategory: creative\nkeywords: [小说, 故事]\n---\n写小说。\n"),
        ("python", "---\nname: Python_Dev\ncategory: software\nkeywords: python, script\n---\nCode.\n"),
        (
            "research",
            "---\nname: web-research\ndescription: Use when: researching\ncategory: research\nkeywords: [调研, 3d, 2]\n---\nSearch.\n",
        ),
        ("plain", "---\nname: plain\n---\nPlain.\n"),
    ];
    for (folder, content) in docs {
        let skill_dir = dir.path().join(folder);
        fs::create_dir_all(&skill_dir).unwrap();
        fs::write(skill_dir.join("SKILL.md"), content).unwrap();
    }

    let mut registry = SkillsRegistry::new().add_directory(dir.path());
    registry.discover().unwrap();
    assert_eq!(registry.len(), 4);

    let index = registry.to_index(Utc::now());
    let ids: Vec<_> = index.skills.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(ids, vec!["小说写作", "plain", "Python_Dev", "web-research"]);
    assert_eq!(index.skills[3].description, "Use when: researching");
    assert_eq!(index.skills[3].keywords, vec!["调研", "3d", "2"]);

    let catalog = registry.to_catalog();
    let result = route("帮我写一篇小说故事", &catalog).unwrap();
    assert_eq!(result.skill().id, "小说写作");
    assert_eq!(result.confidence(), Confidence::Medium);
}
