use agentgv_logging::LogFormat;
use agentgv_persistence::RolloverPolicy;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Default config template created when no config exists
const DEFAULT_CONFIG: &str = r#"
[paths]
# data_dir = "~/.agentgv"            # Set via AGENTGV_HOME env var
# agent_config = "~/.opencode/config.json"  # Set via OPENCODE_CONFIG env var
# skills_catalog = "~/.agentgv/skills.json"
# models_catalog = "~/.agentgv/models.json"
# usage_stats = "~/.agentgv/usage-stats.json"
# sync_state = "~/.agentgv/sync-state.json"
# skills_dir = "~/.agentgv/skills"
# skill_index = "~/.agentgv/skills-index.json"

[sync]
agents = [
    "agentgv-router",
    "agentgv-planning",
    "agentgv-operations",
    "agentgv-quality",
    "agentgv-communications",
    "agentgv-administration",
]
recency_window_secs = 5
watch_interval_secs = 2

[stats]
rollover = "keep"  # keep or reset

[logging]
level = "warn"  # trace, debug, info, warn, error
format = "pretty"  # pretty or json
"#;

/// File locations; unset entries resolve under `data_dir`
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct PathsConfig {
    pub data_dir: Option<PathBuf>,
    pub agent_config: Option<PathBuf>,
    pub skills_catalog: Option<PathBuf>,
    pub models_catalog: Option<PathBuf>,
    pub usage_stats: Option<PathBuf>,
    pub sync_state: Option<PathBuf>,
    pub skills_dir: Option<PathBuf>,
    pub skill_index: Option<PathBuf>,
}

impl PathsConfig {
    pub fn data_dir(&self) -> PathBuf {
        self.data_dir
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| home_dir().join(".agentgv"))
    }

    pub fn agent_config(&self) -> PathBuf {
        self.agent_config
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| home_dir().join(".opencode").join("config.json"))
    }

    pub fn skills_catalog(&self) -> PathBuf {
        self.in_data_dir(&self.skills_catalog, "skills.json")
    }

    pub fn models_catalog(&self) -> PathBuf {
        self.in_data_dir(&self.models_catalog, "models.json")
    }

    pub fn usage_stats(&self) -> PathBuf {
        self.in_data_dir(&self.usage_stats, "usage-stats.json")
    }

    pub fn sync_state(&self) -> PathBuf {
        self.in_data_dir(&self.sync_state, "sync-state.json")
    }

    pub fn skills_dir(&self) -> PathBuf {
        self.in_data_dir(&self.skills_dir, "skills")
    }

    pub fn skill_index(&self) -> PathBuf {
        self.in_data_dir(&self.skill_index, "skills-index.json")
    }

    fn in_data_dir(&self, value: &Option<PathBuf>, file: &str) -> PathBuf {
        value
            .as_deref()
            .map(expand_tilde)
            .unwrap_or_else(|| self.data_dir().join(file))
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SyncConfig {
    /// Roles updated by sync; empty means the built-in list
    pub agents: Vec<String>,
    pub recency_window_secs: u64,
    pub watch_interval_secs: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            agents: Vec::new(),
            recency_window_secs: 5,
            watch_interval_secs: 2,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct StatsConfig {
    pub rollover: RolloverPolicy,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub paths: PathsConfig,
    pub sync: SyncConfig,
    pub stats: StatsConfig,
    pub logging: LoggingConfig,
}

/// Every path after defaults are applied, as shown by `agentgv config`
#[derive(Debug, Serialize)]
pub struct ResolvedPaths {
    pub data_dir: PathBuf,
    pub agent_config: PathBuf,
    pub skills_catalog: PathBuf,
    pub models_catalog: PathBuf,
    pub usage_stats: PathBuf,
    pub sync_state: PathBuf,
    pub skills_dir: PathBuf,
    pub skill_index: PathBuf,
}

impl AppConfig {
    /// Get the global config path: ~/.agentgv/agentgv.toml
    fn global_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".agentgv").join("agentgv.toml"))
    }

    /// Ensure global config directory and file exist, creating defaults if needed
    fn ensure_global_config() -> anyhow::Result<Option<PathBuf>> {
        let Some(config_path) = Self::global_config_path() else {
            return Ok(None);
        };

        if let Some(config_dir) = config_path.parent() {
            if !config_dir.exists() {
                fs::create_dir_all(config_dir)?;
                eprintln!("Created config directory: {}", config_dir.display());
            }
        }

        if !config_path.exists() {
            fs::write(&config_path, DEFAULT_CONFIG.trim())?;
            eprintln!("Created default config: {}", config_path.display());
        }

        Ok(Some(config_path))
    }

    /// Load configuration with layered approach:
    /// 1. Global config: ~/.agentgv/agentgv.toml (auto-created if missing)
    /// 2. Local override: ./agentgv.toml (workspace, optional)
    /// 3. Explicit file passed with --config
    /// 4. Environment variables (highest priority)
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        // Load .env file from current directory
        dotenvy::dotenv().ok();

        let global_config_path = Self::ensure_global_config()?;
        Self::from_sources(global_config_path.as_deref(), explicit)
    }

    /// Build from the given files plus the environment, without touching the home directory
    pub fn from_sources(global: Option<&Path>, explicit: Option<&Path>) -> anyhow::Result<Self> {
        let mut config_builder = config::Config::builder();

        if let Some(path) = global {
            config_builder = config_builder.add_source(config::File::from(path.to_path_buf()));
        }

        config_builder = config_builder.add_source(config::File::with_name("agentgv").required(false));

        if let Some(path) = explicit {
            config_builder = config_builder.add_source(config::File::from(path.to_path_buf()).required(true));
        }

        config_builder = config_builder.add_source(
            config::Environment::with_prefix("AGENTGV")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("sync.agents")
                .try_parsing(true),
        );

        if let Ok(path) = env::var("OPENCODE_CONFIG") {
            config_builder = config_builder.set_override("paths.agent_config", path)?;
        }

        if let Ok(home) = env::var("AGENTGV_HOME") {
            config_builder = config_builder.set_override("paths.data_dir", home)?;
        }

        let config: Self = config_builder.build()?.try_deserialize()?;
        Ok(config)
    }

    pub fn resolved_paths(&self) -> ResolvedPaths {
        ResolvedPaths {
            data_dir: self.paths.data_dir(),
            agent_config: self.paths.agent_config(),
            skills_catalog: self.paths.skills_catalog(),
            models_catalog: self.paths.models_catalog(),
            usage_stats: self.paths.usage_stats(),
            sync_state: self.paths.sync_state(),
            skills_dir: self.paths.skills_dir(),
            skill_index: self.paths.skill_index(),
        }
    }
}

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Expand a leading `~` to the home directory
fn expand_tilde(path: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home_dir().join(rest),
        Err(_) => path.to_path_buf(),
    }
}
