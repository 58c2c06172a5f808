use crate::cli::TrackArgs;
use crate::config::AppConfig;
use agentgv_models::{
    detect_current_model, normalize_model_name, ModelSync, PreferenceStore,
};
use agentgv_persistence::{save_json, UsageStats, UsageTracker};
use agentgv_skills::{classify_task_type, load_catalog, route, SkillsRegistry};
use agentgv_types::{
    AgentGvError, Confidence, MatchResult, PreferenceMode, SkillCatalog, TokenUsage, UsageEvent,
};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use std::env;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio::signal;
use tracing::{debug, error, info, warn};

/// Exit code for low-confidence or fallback routing
const EXIT_LOW_CONFIDENCE: u8 = 2;

/// Router service - runs each CLI command against the configured files
pub struct RouterService {
    config: AppConfig,
}

impl RouterService {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    /// Routing catalog: `skills.json`, or a scan of the skills directory when it is absent
    pub fn load_catalog(&self) -> Result<SkillCatalog> {
        let catalog_path = self.config.paths.skills_catalog();
        let skills_dir = self.config.paths.skills_dir();

        if !catalog_path.exists() && skills_dir.is_dir() {
            info!(
                "No skills catalog at {}, scanning {}",
                catalog_path.display(),
                skills_dir.display()
            );
            let mut registry = SkillsRegistry::new().add_directory(skills_dir);
            registry.discover()?;
            return Ok(registry.to_catalog());
        }

        load_catalog(&catalog_path)
            .with_context(|| format!("Failed to load skills catalog {}", catalog_path.display()))
    }

    /// Route `description`, optionally tracking the decision
    pub fn route_task(&self, description: &str, track: bool, agent: Option<String>) -> Result<MatchResult> {
        let catalog = self.load_catalog()?;
        let result = route(description, &catalog)?;

        if let Some(warning) = result.warning() {
            warn!("{}", warning);
        }
        debug!(
            "Routed to {} (score {}, {})",
            result.skill().id,
            result.score(),
            result.confidence()
        );

        if track {
            let preference = self.preference_store().current()?;
            let mut event = UsageEvent::from_match(&result, classify_task_type(description), preference)
                .with_model(normalize_model_name(&result.skill().model));
            if let Some(agent) = agent {
                event = event.with_agent(agent);
            }
            self.tracker().track(&event)?;
        }

        Ok(result)
    }

    pub fn run_match(&self, task: &[String], track: bool, agent: Option<String>) -> Result<ExitCode> {
        let description = task.join(" ");
        let result = self.route_task(&description, track, agent)?;
        print_json(&result.to_summary(Utc::now()))?;
        Ok(exit_code_for(&result))
    }

    pub fn run_task_type(&self, task: &[String]) -> Result<ExitCode> {
        let task_type = classify_task_type(&task.join(" "));
        print_json(&json!({ "task_type": task_type }))?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn track_event(&self, args: TrackArgs) -> Result<UsageStats> {
        let preference = args
            .preference
            .as_deref()
            .map(str::parse::<PreferenceMode>)
            .transpose()?;

        let event = UsageEvent {
            agent: args.agent,
            skill: args.skill,
            category: args.category,
            model: args.model.as_deref().map(normalize_model_name),
            task_type: args.task_type,
            preference,
            success: args.success,
            tokens: args.total_tokens.map(|total| TokenUsage {
                prompt: args.prompt_tokens.unwrap_or(0),
                total,
            }),
        };

        Ok(self.tracker().track(&event)?)
    }

    pub fn run_track(&self, args: TrackArgs) -> Result<ExitCode> {
        let stats = self.track_event(args)?;
        print_json(&json!({ "total_requests": stats.total_requests }))?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_stats(&self, reset: bool, keep_keys: bool) -> Result<ExitCode> {
        let tracker = self.tracker();
        let stats = if reset {
            tracker.reset(keep_keys)?
        } else {
            tracker.load()?
        };
        print_json(&stats)?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_preference_set(&self, mode: &str) -> Result<ExitCode> {
        let mode: PreferenceMode = mode.parse()?;
        let store = self.preference_store();
        let catalog = store
            .set(mode)
            .with_context(|| format!("Failed to update {}", store.path().display()))?;
        print_json(&json!({
            "current_preference": mode,
            "profile": catalog.profile(mode),
        }))?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_preference_show(&self) -> Result<ExitCode> {
        let store = self.preference_store();
        let (mode, profile) = match store.load() {
            Ok(catalog) => {
                let mode = catalog.preference();
                (mode, catalog.profile(mode).cloned())
            }
            Err(AgentGvError::ConfigNotFound { .. }) => (PreferenceMode::default(), None),
            Err(e) => return Err(e.into()),
        };
        print_json(&json!({ "current_preference": mode, "profile": profile }))?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_models(&self) -> Result<ExitCode> {
        let store = self.preference_store();
        let catalog = store
            .load()
            .with_context(|| format!("Failed to load model catalog {}", store.path().display()))?;
        print_json(&json!({
            "current_preference": catalog.preference(),
            "models": catalog.models,
        }))?;
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_detect(&self) -> Result<ExitCode> {
        let path = self.config.paths.agent_config();
        let agent = env::var("OPENCODE_AGENT").ok();
        match detect_current_model(&path, agent.as_deref())? {
            Some(detected) => {
                print_json(&detected)?;
                Ok(ExitCode::SUCCESS)
            }
            None => anyhow::bail!("No model configured in {}", path.display()),
        }
    }

    pub fn run_sync(&self, force: bool, model: Option<String>, role: Option<String>) -> Result<ExitCode> {
        let sync = self.model_sync();
        match model {
            Some(model) => print_json(&sync.assign(&model, role.as_deref())?)?,
            None => print_json(&sync.auto_sync(force)?)?,
        }
        Ok(ExitCode::SUCCESS)
    }

    /// Poll the agent config until Ctrl+C, syncing whenever it changes
    pub async fn run_watch(&self) -> Result<ExitCode> {
        let sync = self.model_sync();
        let interval = Duration::from_secs(self.config.sync.watch_interval_secs.max(1));
        let mut ticker = tokio::time::interval(interval);

        info!(
            "Watching {} every {}s",
            sync.config_path().display(),
            interval.as_secs()
        );

        // Setup signal handler for graceful shutdown
        let shutdown = async {
            if let Err(e) = signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
            }
            info!("Received shutdown signal");
        };
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    match sync.auto_sync(false) {
                        Ok(report) if report.synced => {
                            println!("{}", serde_json::to_string(&report)?);
                        }
                        Ok(report) => debug!("No sync needed: {}", report.reason),
                        Err(e) => warn!("Sync failed: {}", e),
                    }
                }
                _ = &mut shutdown => {
                    info!("Shutting down gracefully...");
                    break;
                }
            }
        }

        Ok(ExitCode::SUCCESS)
    }

    pub fn run_scan(&self, dir: Option<PathBuf>, write: bool) -> Result<ExitCode> {
        let dir = dir.unwrap_or_else(|| self.config.paths.skills_dir());
        let mut registry = SkillsRegistry::new().add_directory(&dir);
        registry.discover()?;
        let index = registry.to_index(Utc::now());

        if write {
            let path = self.config.paths.skill_index();
            save_json(&path, &index)?;
            info!("Wrote {} skills to {}", index.total, path.display());
            print_json(&json!({ "index": path, "total": index.total, "categories": index.categories }))?;
        } else {
            print_json(&index)?;
        }
        Ok(ExitCode::SUCCESS)
    }

    pub fn run_config(&self) -> Result<ExitCode> {
        let rendered = toml::to_string_pretty(&self.config.resolved_paths())?;
        print!("{}", rendered);
        Ok(ExitCode::SUCCESS)
    }

    fn preference_store(&self) -> PreferenceStore {
        PreferenceStore::new(self.config.paths.models_catalog())
    }

    /// Tracker seeded with the models listed in `models.json`, when readable
    fn tracker(&self) -> UsageTracker {
        let models = match self.preference_store().load() {
            Ok(catalog) => catalog.short_ids().map(str::to_string).collect(),
            Err(e) => {
                debug!("Not seeding model buckets: {}", e);
                Vec::new()
            }
        };

        UsageTracker::new(self.config.paths.usage_stats())
            .with_rollover(self.config.stats.rollover)
            .with_models(models)
    }

    fn model_sync(&self) -> ModelSync {
        ModelSync::new(self.config.paths.agent_config(), self.config.paths.sync_state())
            .with_roles(self.config.sync.agents.clone())
            .with_recency_window(Duration::from_secs(self.config.sync.recency_window_secs))
            .with_active_agent(env::var("OPENCODE_AGENT").ok())
    }
}

/// 0 for a confident match, 2 for a weak or fallback one
pub fn exit_code_for(result: &MatchResult) -> ExitCode {
    if result.is_fallback() || result.confidence() == Confidence::Low {
        ExitCode::from(EXIT_LOW_CONFIDENCE)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
