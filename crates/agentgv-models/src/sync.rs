//! Model propagation across agent roles
//!
//! The host keeps one config document (`opencode.json`) with a section per
//! agent role. When the user switches model, every AgentGV role is pointed at
//! the new model so routing stays consistent. [`ModelSync`] remembers what it
//! last synced in a small state file and skips work when nothing changed.

use crate::detect::{detect_with_mtime, DetectedModel};
use agentgv_persistence::{load_json, save_json, save_json_indented};
use agentgv_types::{AgentGvError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tracing::{debug, info, warn};

/// Router role, whose model wins during detection
pub const ROUTER_AGENT: &str = "agentgv-router";

/// Roles updated by a sync unless configured otherwise
pub const DEFAULT_AGENTS: &[&str] = &[
    ROUTER_AGENT,
    "agentgv-planning",
    "agentgv-operations",
    "agentgv-quality",
    "agentgv-communications",
    "agentgv-administration",
];

/// A config edited within this window triggers a sync even if the model is unchanged
pub const DEFAULT_RECENCY_WINDOW: Duration = Duration::from_secs(5);

/// Host agent configuration, kept as an ordered JSON object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentConfig(Map<String, Value>);

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load(path: &Path) -> Result<Self> {
        load_json(path)
    }

    /// Written with four-space indentation to match the host's formatting
    pub fn save(&self, path: &Path) -> Result<()> {
        save_json_indented(path, self, b"    ")
    }

    pub fn global_model(&self) -> Option<&str> {
        self.0.get("model").and_then(Value::as_str)
    }

    pub fn role_model(&self, role: &str) -> Option<&str> {
        self.0.get(role)?.get("model")?.as_str()
    }

    /// Set `role.model`, creating the role section when missing
    ///
    /// Other keys of an existing section are preserved.
    pub fn set_role_model(&mut self, role: &str, model: &str) {
        let entry = self
            .0
            .entry(role.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        if let Value::Object(section) = entry {
            section.insert("model".to_string(), Value::String(model.to_string()));
        }
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

/// Result of pointing roles at a model
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncOutcome {
    pub model: String,
    /// Roles whose model actually changed
    pub updated_roles: Vec<String>,
}

impl SyncOutcome {
    pub fn changed(&self) -> bool {
        !self.updated_roles.is_empty()
    }
}

/// Point every role at `target`; roles already on it are left alone
pub fn sync_agents<S: AsRef<str>>(target: &str, roles: &[S], config: &mut AgentConfig) -> SyncOutcome {
    let mut updated_roles = Vec::new();

    for role in roles {
        let role = role.as_ref();
        if config.role_model(role) == Some(target) {
            continue;
        }
        config.set_role_model(role, target);
        updated_roles.push(role.to_string());
    }

    SyncOutcome {
        model: target.to_string(),
        updated_roles,
    }
}

/// What the last sync did, persisted between runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    #[serde(default)]
    pub last_model: Option<String>,
    #[serde(default)]
    pub last_sync: Option<DateTime<Utc>>,
    #[serde(default)]
    pub sync_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SyncReason {
    FirstSync,
    ModelChanged { from: String, to: String },
    RecentlyModified,
    AlreadySynced,
    Forced,
    NotDetected,
}

impl fmt::Display for SyncReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FirstSync => f.write_str("first sync"),
            Self::ModelChanged { from, to } => write!(f, "model changed: {} -> {}", from, to),
            Self::RecentlyModified => f.write_str("config recently modified"),
            Self::AlreadySynced => f.write_str("already synced"),
            Self::Forced => f.write_str("forced"),
            Self::NotDetected => f.write_str("no model configured"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDecision {
    pub needed: bool,
    pub reason: SyncReason,
}

/// Decide whether a sync is due
///
/// A modification time in the future counts as recent. An edit at or before
/// `last_sync` is the previous sync's own write and never counts.
pub fn needs_sync(
    state: &SyncState,
    current_model: &str,
    config_modified: Option<SystemTime>,
    now: SystemTime,
    window: Duration,
) -> SyncDecision {
    let Some(last) = state.last_model.as_deref() else {
        return SyncDecision {
            needed: true,
            reason: SyncReason::FirstSync,
        };
    };

    if last != current_model {
        return SyncDecision {
            needed: true,
            reason: SyncReason::ModelChanged {
                from: last.to_string(),
                to: current_model.to_string(),
            },
        };
    }

    let recent = config_modified
        .filter(|modified| {
            state
                .last_sync
                .map_or(true, |synced| DateTime::<Utc>::from(*modified) > synced)
        })
        .is_some_and(|modified| match now.duration_since(modified) {
            Ok(age) => age < window,
            Err(_) => true,
        });
    if recent {
        return SyncDecision {
            needed: true,
            reason: SyncReason::RecentlyModified,
        };
    }

    SyncDecision {
        needed: false,
        reason: SyncReason::AlreadySynced,
    }
}

/// Report of one [`ModelSync::auto_sync`] run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AutoSyncReport {
    pub synced: bool,
    pub reason: SyncReason,
    pub detected: Option<DetectedModel>,
    pub outcome: Option<SyncOutcome>,
    pub sync_count: u64,
}

/// Keeps agent roles on the model the host is running
#[derive(Debug, Clone)]
pub struct ModelSync {
    config_path: PathBuf,
    state_path: PathBuf,
    roles: Vec<String>,
    window: Duration,
    active_agent: Option<String>,
}

impl ModelSync {
    pub fn new(config_path: impl Into<PathBuf>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            state_path: state_path.into(),
            roles: DEFAULT_AGENTS.iter().map(|r| r.to_string()).collect(),
            window: DEFAULT_RECENCY_WINDOW,
            active_agent: None,
        }
    }

    /// Replace the role list; an empty list keeps the defaults
    pub fn with_roles(mut self, roles: Vec<String>) -> Self {
        if !roles.is_empty() {
            self.roles = roles;
        }
        self
    }

    pub fn with_recency_window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn with_active_agent(mut self, agent: Option<String>) -> Self {
        self.active_agent = agent;
        self
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Last persisted state; unreadable state starts over
    pub fn load_state(&self) -> SyncState {
        match load_json(&self.state_path) {
            Ok(state) => state,
            Err(AgentGvError::ConfigNotFound { .. }) => SyncState::default(),
            Err(e) => {
                warn!("Ignoring unreadable sync state: {}", e);
                SyncState::default()
            }
        }
    }

    pub fn detect(&self) -> Result<Option<DetectedModel>> {
        let config = AgentConfig::load(&self.config_path)?;
        Ok(detect_with_mtime(
            &config,
            &self.config_path,
            self.active_agent.as_deref(),
            self.config_modified(),
        ))
    }

    /// Detect the running model and propagate it to every role if needed
    pub fn auto_sync(&self, force: bool) -> Result<AutoSyncReport> {
        let mut config = AgentConfig::load(&self.config_path)?;
        let modified = self.config_modified();
        let state = self.load_state();

        let Some(detected) =
            detect_with_mtime(&config, &self.config_path, self.active_agent.as_deref(), modified)
        else {
            warn!("No model configured in {}", self.config_path.display());
            return Ok(AutoSyncReport {
                synced: false,
                reason: SyncReason::NotDetected,
                detected: None,
                outcome: None,
                sync_count: state.sync_count,
            });
        };

        let decision = needs_sync(&state, &detected.model, modified, SystemTime::now(), self.window);
        if !decision.needed && !force {
            debug!("Sync skipped: {}", decision.reason);
            return Ok(AutoSyncReport {
                synced: false,
                reason: decision.reason,
                detected: Some(detected),
                outcome: None,
                sync_count: state.sync_count,
            });
        }
        let reason = if decision.needed {
            decision.reason
        } else {
            SyncReason::Forced
        };

        let outcome = sync_agents(&detected.model, &self.roles, &mut config);
        if outcome.changed() {
            config.save(&self.config_path)?;
        }

        let next = SyncState {
            last_model: Some(detected.model.clone()),
            last_sync: Some(Utc::now()),
            sync_count: state.sync_count + 1,
        };
        save_json(&self.state_path, &next)?;

        info!(
            "Synced {} ({}), {} roles updated",
            detected.model,
            reason,
            outcome.updated_roles.len()
        );

        Ok(AutoSyncReport {
            synced: true,
            reason,
            detected: Some(detected),
            outcome: Some(outcome),
            sync_count: next.sync_count,
        })
    }

    /// Explicitly point one role, or every configured role, at `model`
    pub fn assign(&self, model: &str, role: Option<&str>) -> Result<SyncOutcome> {
        let model = model.trim();
        if model.is_empty() {
            return Err(AgentGvError::InvalidInput("model must not be empty".to_string()));
        }

        let mut config = AgentConfig::load(&self.config_path)?;
        let outcome = match role {
            Some(role) => sync_agents(model, &[role], &mut config),
            None => sync_agents(model, &self.roles, &mut config),
        };

        if outcome.changed() {
            config.save(&self.config_path)?;
            info!("Assigned {} to {:?}", model, outcome.updated_roles);
        }
        Ok(outcome)
    }

    fn config_modified(&self) -> Option<SystemTime> {
        fs::metadata(&self.config_path).and_then(|m| m.modified()).ok()
    }
}
