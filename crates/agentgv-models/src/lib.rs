//! AgentGV Models - model catalog, preference mode and agent model sync
//!
//! - [`catalog`]: `models.json` and the active preference mode
//! - [`detect`]: which model the host currently runs, alias normalization
//! - [`sync`]: propagate a model into every agent role configuration

pub mod catalog;
pub mod detect;
pub mod sync;

pub use catalog::{ModelCatalog, ModelInfo, PreferenceProfile, PreferenceStore};
pub use detect::{
    detect_current_model, detect_in_config, model_provider, normalize_model_name,
    supports_vision, DetectedModel, ModelProvider,
};
pub use sync::{
    needs_sync, sync_agents, AgentConfig, AutoSyncReport, ModelSync, SyncDecision, SyncOutcome,
    SyncReason, SyncState, DEFAULT_AGENTS, DEFAULT_RECENCY_WINDOW,
};
