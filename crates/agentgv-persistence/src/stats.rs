//! Usage statistics
//!
//! [`UsageStats`] is the `usage-stats.json` document; [`UsageTracker`] owns its
//! load → record → save cycle. The file is rewritten after every event.

use crate::store::{load_json, save_json};
use agentgv_types::{AgentGvError, PreferenceMode, Result, TaskType, UsageEvent};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Timelike, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Number of calendar days kept in `daily_requests`
pub const DAILY_RETENTION: usize = 30;

const DEFAULT_MODELS: &[&str] = &[
    "qwen3-max-2026-01-23",
    "qwen3.5-plus",
    "qwen3-coder-plus",
    "qwen3-coder-next",
];
const DEFAULT_AGENTS: &[&str] = &["router", "planning", "operations", "quality"];
const DEFAULT_CATEGORIES: &[&str] = &["software", "hardware", "simulation", "creative", "research"];

/// What happens to the monthly counters when the period changes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RolloverPolicy {
    /// Only move the period marker; counters keep accumulating
    #[default]
    Keep,
    /// Zero the monthly counters, keeping hourly and daily history
    Reset,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counter {
    pub count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelUsage {
    pub count: u64,
    #[serde(default)]
    pub tokens_used: u64,
    #[serde(default)]
    pub tokens_prompt: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentUsage {
    pub count: u64,
    #[serde(default)]
    pub success: u64,
    #[serde(default)]
    pub failure: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUsage {
    pub count: u64,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

/// Cumulative usage counters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UsageStats {
    /// Current `YYYY-MM` period (UTC)
    pub period: String,
    pub last_updated: DateTime<Utc>,
    #[serde(default)]
    pub total_requests: u64,
    #[serde(default)]
    pub by_model: IndexMap<String, ModelUsage>,
    #[serde(default)]
    pub by_agent: IndexMap<String, AgentUsage>,
    #[serde(default)]
    pub by_skill: IndexMap<String, SkillUsage>,
    #[serde(default)]
    pub by_task_type: IndexMap<String, Counter>,
    #[serde(default)]
    pub by_category: IndexMap<String, Counter>,
    #[serde(default)]
    pub by_preference: IndexMap<String, Counter>,
    /// Requests per local hour of day
    #[serde(default)]
    pub hourly_distribution: [u64; 24],
    /// Requests per UTC calendar day, oldest first
    #[serde(default)]
    pub daily_requests: VecDeque<DailyCount>,
}

fn period_of(now: &DateTime<Utc>) -> String {
    now.format("%Y-%m").to_string()
}

fn keyed<T: Default>(keys: impl IntoIterator<Item = &'static str>) -> IndexMap<String, T> {
    keys.into_iter()
        .map(|k| (k.to_string(), T::default()))
        .collect()
}

impl UsageStats {
    /// Fresh stats with the default key sets seeded
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            period: period_of(&now),
            last_updated: now,
            total_requests: 0,
            by_model: keyed(DEFAULT_MODELS.iter().copied()),
            by_agent: keyed(DEFAULT_AGENTS.iter().copied()),
            by_skill: IndexMap::new(),
            by_task_type: keyed(TaskType::ALL.iter().map(|t| t.as_str())),
            by_category: keyed(DEFAULT_CATEGORIES.iter().copied()),
            by_preference: keyed(PreferenceMode::ALL.iter().map(|p| p.as_str())),
            hourly_distribution: [0; 24],
            daily_requests: VecDeque::new(),
        }
    }

    /// Add model buckets that are not tracked yet
    pub fn seed_models<I, S>(&mut self, models: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for model in models {
            self.by_model.entry(model.into()).or_default();
        }
    }

    /// Record one event at `now`
    ///
    /// Model, agent and category are only counted when their bucket exists.
    /// Skills get a bucket on first sight. Missing or unknown task types count
    /// as `other`; a missing preference counts as `quality_priority`.
    pub fn record<Tz: TimeZone>(&mut self, event: &UsageEvent, now: &DateTime<Tz>, policy: RolloverPolicy) {
        let utc = now.with_timezone(&Utc);

        let period = period_of(&utc);
        if self.period != period {
            info!("Usage period rolled over from {} to {}", self.period, period);
            if policy == RolloverPolicy::Reset {
                self.reset_monthly_counters();
            }
            self.period = period;
        }

        self.total_requests += 1;

        if let Some(usage) = event.model.as_deref().and_then(|m| self.by_model.get_mut(m)) {
            usage.count += 1;
            if let Some(tokens) = event.tokens {
                usage.tokens_used += tokens.total;
                usage.tokens_prompt += tokens.prompt;
            }
        }

        if let Some(usage) = event.agent.as_deref().and_then(|a| self.by_agent.get_mut(a)) {
            usage.count += 1;
            match event.success {
                Some(true) => usage.success += 1,
                Some(false) => usage.failure += 1,
                None => {}
            }
        }

        if let Some(skill) = &event.skill {
            self.by_skill
                .entry(skill.clone())
                .or_insert_with(|| SkillUsage {
                    count: 0,
                    category: event
                        .category
                        .clone()
                        .unwrap_or_else(|| "unknown".to_string()),
                })
                .count += 1;
        }

        let task_type = event
            .task_type
            .as_deref()
            .and_then(TaskType::from_tag)
            .unwrap_or(TaskType::Other);
        self.by_task_type
            .entry(task_type.as_str().to_string())
            .or_default()
            .count += 1;

        if let Some(counter) = event
            .category
            .as_deref()
            .and_then(|c| self.by_category.get_mut(c))
        {
            counter.count += 1;
        }

        let preference = event.preference.unwrap_or_default();
        if let Some(counter) = self.by_preference.get_mut(preference.as_str()) {
            counter.count += 1;
        }

        self.hourly_distribution[now.hour() as usize] += 1;

        let today = utc.date_naive();
        match self.daily_requests.iter_mut().find(|d| d.date == today) {
            Some(day) => day.count += 1,
            None => {
                self.daily_requests.push_back(DailyCount {
                    date: today,
                    count: 1,
                });
                while self.daily_requests.len() > DAILY_RETENTION {
                    self.daily_requests.pop_front();
                }
            }
        }
    }

    /// Zero every counter while keeping key sets; clears hourly and daily history
    pub fn reset_counts(&mut self) {
        self.reset_monthly_counters();
        self.hourly_distribution = [0; 24];
        self.daily_requests.clear();
    }

    fn reset_monthly_counters(&mut self) {
        self.total_requests = 0;
        self.by_model.values_mut().for_each(|u| *u = ModelUsage::default());
        self.by_agent.values_mut().for_each(|u| *u = AgentUsage::default());
        self.by_skill.values_mut().for_each(|u| u.count = 0);
        for counters in [
            &mut self.by_task_type,
            &mut self.by_category,
            &mut self.by_preference,
        ] {
            counters.values_mut().for_each(|c| c.count = 0);
        }
    }
}

/// Load-record-save wrapper around `usage-stats.json`
#[derive(Debug, Clone)]
pub struct UsageTracker {
    path: PathBuf,
    rollover: RolloverPolicy,
    models: Vec<String>,
}

impl UsageTracker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            rollover: RolloverPolicy::default(),
            models: Vec::new(),
        }
    }

    pub fn with_rollover(mut self, rollover: RolloverPolicy) -> Self {
        self.rollover = rollover;
        self
    }

    /// Extra model buckets seeded into new or loaded stats
    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.models = models;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load stats, creating and persisting a fresh file when none exists
    pub fn load(&self) -> Result<UsageStats> {
        let mut stats = match load_json::<UsageStats>(&self.path) {
            Ok(stats) => stats,
            Err(AgentGvError::ConfigNotFound { .. }) => {
                info!("Initializing usage stats at {}", self.path.display());
                let mut stats = UsageStats::new(Utc::now());
                stats.seed_models(self.models.iter().cloned());
                self.save(&mut stats)?;
                return Ok(stats);
            }
            Err(e) => return Err(e),
        };
        stats.seed_models(self.models.iter().cloned());
        Ok(stats)
    }

    /// Stamp `last_updated` and write the stats
    pub fn save(&self, stats: &mut UsageStats) -> Result<()> {
        stats.last_updated = Utc::now();
        save_json(&self.path, stats)
    }

    /// Record an event now and persist
    pub fn track(&self, event: &UsageEvent) -> Result<UsageStats> {
        self.track_at(event, &Local::now())
    }

    /// Record an event at a given time and persist
    pub fn track_at<Tz: TimeZone>(&self, event: &UsageEvent, now: &DateTime<Tz>) -> Result<UsageStats> {
        let mut stats = self.load()?;
        stats.record(event, now, self.rollover);
        self.save(&mut stats)?;
        debug!(
            "Tracked request #{} (skill={:?}, model={:?})",
            stats.total_requests, event.skill, event.model
        );
        Ok(stats)
    }

    /// Reset the stats file
    ///
    /// With `keep_keys` the counters are zeroed in place; otherwise the file is
    /// replaced by a freshly seeded structure for the current period.
    pub fn reset(&self, keep_keys: bool) -> Result<UsageStats> {
        let mut stats = if keep_keys {
            let mut stats = self.load()?;
            stats.reset_counts();
            stats
        } else {
            let mut stats = UsageStats::new(Utc::now());
            stats.seed_models(self.models.iter().cloned());
            stats
        };
        self.save(&mut stats)?;
        info!("Usage stats reset (keep_keys={})", keep_keys);
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_total_increments_once_per_event() {
        let now = at(2026, 3, 1, 9);
        let mut stats = UsageStats::new(now);
        stats.record(&UsageEvent::new(), &now, RolloverPolicy::Keep);
        assert_eq!(stats.total_requests, 1);
        // empty event counts as `other` and default preference
        assert_eq!(stats.by_task_type["other"].count, 1);
        assert_eq!(stats.by_preference["quality_priority"].count, 1);
        assert_eq!(stats.hourly_distribution[9], 1);
    }

    #[test]
    fn test_model_bucket_counts_and_tokens() {
        let now = at(2026, 3, 1, 9);
        let mut stats = UsageStats::new(now);
        let event = UsageEvent::new()
            .with_model("qwen3.5-plus")
            .with_tokens(10, 40);
        for _ in 0..5 {
            stats.record(&event, &now, RolloverPolicy::Keep);
        }
        let usage = &stats.by_model["qwen3.5-plus"];
        assert_eq!(usage.count, 5);
        assert_eq!(usage.tokens_used, 200);
        assert_eq!(usage.tokens_prompt, 50);

        stats.record(&UsageEvent::new().with_model("gpt-x"), &now, RolloverPolicy::Keep);
        assert!(!stats.by_model.contains_key("gpt-x"));
        assert_eq!(stats.total_requests, 6);
    }

    #[test]
    fn test_agent_skill_category_and_task_type() {
        let now = at(2026, 3, 1, 9);
        let mut stats = UsageStats::new(now);
        let event = UsageEvent {
            agent: Some("router".into()),
            skill: Some("fiction".into()),
            category: Some("creative".into()),
            task_type: Some("refactoring".into()),
            preference: Some(PreferenceMode::CostSaving),
            success: Some(false),
            ..UsageEvent::default()
        };
        stats.record(&event, &now, RolloverPolicy::Keep);
        stats.record(&event.clone().with_success(true), &now, RolloverPolicy::Keep);

        assert_eq!(stats.by_agent["router"], AgentUsage { count: 2, success: 1, failure: 1 });
        assert_eq!(stats.by_skill["fiction"].count, 2);
        assert_eq!(stats.by_skill["fiction"].category, "creative");
        assert_eq!(stats.by_category["creative"].count, 2);
        assert_eq!(stats.by_task_type["other"].count, 2);
        assert_eq!(stats.by_preference["cost_saving"].count, 2);

        let coding = UsageEvent {
            skill: Some("orphan".into()),
            task_type: Some("coding".into()),
            ..UsageEvent::default()
        };
        stats.record(&coding, &now, RolloverPolicy::Keep);
        assert_eq!(stats.by_task_type["coding"].count, 1);
        assert_eq!(stats.by_skill["orphan"].category, "unknown");
    }

    #[test]
    fn test_daily_series_keeps_latest_thirty() {
        let start = at(2026, 1, 1, 12);
        let mut stats = UsageStats::new(start);
        for day in 0..35 {
            let now = start + Duration::days(day);
            stats.record(&UsageEvent::new(), &now, RolloverPolicy::Keep);
            stats.record(&UsageEvent::new(), &now, RolloverPolicy::Keep);
        }

        assert_eq!(stats.daily_requests.len(), DAILY_RETENTION);
        let first = stats.daily_requests.front().unwrap();
        let last = stats.daily_requests.back().unwrap();
        assert_eq!(first.date, (start + Duration::days(5)).date_naive());
        assert_eq!(last.date, (start + Duration::days(34)).date_naive());
        assert!(stats.daily_requests.iter().all(|d| d.count == 2));
    }

    #[test]
    fn test_rollover_keep_retains_counters() {
        let march = at(2026, 3, 31, 23);
        let mut stats = UsageStats::new(march);
        stats.record(&UsageEvent::new().with_model("qwen3.5-plus"), &march, RolloverPolicy::Keep);

        let april = at(2026, 4, 1, 1);
        stats.record(&UsageEvent::new(), &april, RolloverPolicy::Keep);
        assert_eq!(stats.period, "2026-04");
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.by_model["qwen3.5-plus"].count, 1);
    }

    #[test]
    fn test_rollover_reset_zeroes_monthly_counters_only() {
        let march = at(2026, 3, 31, 23);
        let mut stats = UsageStats::new(march);
        stats.record(&UsageEvent::new().with_model("qwen3.5-plus"), &march, RolloverPolicy::Reset);

        let april = at(2026, 4, 1, 1);
        stats.record(&UsageEvent::new(), &april, RolloverPolicy::Reset);
        assert_eq!(stats.period, "2026-04");
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.by_model["qwen3.5-plus"].count, 0);
        assert_eq!(stats.daily_requests.len(), 2);
        assert_eq!(stats.hourly_distribution[23], 1);
    }

    #[test]
    fn test_reset_counts_preserves_keys() {
        let now = at(2026, 3, 1, 9);
        let mut stats = UsageStats::new(now);
        stats.record(
            &UsageEvent { skill: Some("python".into()), ..UsageEvent::default() },
            &now,
            RolloverPolicy::Keep,
        );
        stats.reset_counts();

        assert_eq!(stats.total_requests, 0);
        assert_eq!(stats.by_skill["python"].count, 0);
        assert_eq!(stats.by_model.len(), DEFAULT_MODELS.len());
        assert!(stats.daily_requests.is_empty());
        assert_eq!(stats.hourly_distribution.iter().sum::<u64>(), 0);
    }
}
