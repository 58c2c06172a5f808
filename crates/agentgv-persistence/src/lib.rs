//! AgentGV Persistence - JSON file storage
//!
//! Every write goes through [`store::save_json`], which replaces the target
//! file atomically. Usage statistics live in [`stats`].

pub mod stats;
pub mod store;

pub use stats::{
    AgentUsage, Counter, DailyCount, ModelUsage, RolloverPolicy, SkillUsage, UsageStats,
    UsageTracker, DAILY_RETENTION,
};
pub use store::{load_json, save_json, save_json_indented};
