use std::path::PathBuf;

use agentgv_logging::LogFormat;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "agentgv")]
#[command(author, version, about = "Keyword task router, usage tracker and model sync for agent teams", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Extra config file layered over ~/.agentgv/agentgv.toml and ./agentgv.toml
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Log at debug level regardless of the configured level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log line format (pretty or json), overriding [logging] format
    #[arg(long, global = true)]
    pub log_format: Option<LogFormat>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Route a task description to the best skill
    Match {
        /// Task description
        task: Vec<String>,

        /// Record the routing decision in the usage stats
        #[arg(long)]
        track: bool,

        /// Agent name recorded with --track
        #[arg(long, requires = "track")]
        agent: Option<String>,
    },

    /// Classify a task description into a task type
    TaskType {
        /// Task description
        task: Vec<String>,
    },

    /// Record one usage event
    Track(TrackArgs),

    /// Show usage statistics
    Stats {
        /// Reset the statistics file
        #[arg(long)]
        reset: bool,

        /// Zero the counters but keep every bucket
        #[arg(long, requires = "reset")]
        keep_keys: bool,
    },

    /// Show or change the model preference mode
    Preference {
        #[command(subcommand)]
        action: PreferenceAction,
    },

    /// List the models in models.json
    Models,

    /// Detect the model the agent host currently runs
    Detect,

    /// Propagate the current model to every agent role
    Sync {
        /// Sync even when nothing changed
        #[arg(long)]
        force: bool,

        /// Assign this model instead of the detected one
        #[arg(long)]
        model: Option<String>,

        /// Only update this role (with --model)
        #[arg(long, requires = "model")]
        role: Option<String>,
    },

    /// Keep syncing whenever the agent config changes, until Ctrl+C
    Watch,

    /// Scan SKILL.md folders and build the skill index
    Scan {
        /// Directory to scan (default: configured skills_dir)
        #[arg(long)]
        dir: Option<PathBuf>,

        /// Write skills-index.json instead of printing it
        #[arg(long)]
        write: bool,
    },

    /// Print the effective file locations
    Config,
}

#[derive(Args, Debug, Default)]
pub struct TrackArgs {
    #[arg(long)]
    pub agent: Option<String>,

    #[arg(long)]
    pub skill: Option<String>,

    #[arg(long)]
    pub category: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long)]
    pub task_type: Option<String>,

    /// quality_priority, balanced or cost_saving
    #[arg(long)]
    pub preference: Option<String>,

    /// Outcome of the request
    #[arg(long)]
    pub success: Option<bool>,

    #[arg(long, requires = "total_tokens")]
    pub prompt_tokens: Option<u64>,

    #[arg(long)]
    pub total_tokens: Option<u64>,
}

#[derive(Subcommand)]
pub enum PreferenceAction {
    /// Set the preference mode (quality_priority, balanced, cost_saving)
    Set { mode: String },

    /// Show the active preference mode
    Show,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_match_with_track() {
        let cli = Cli::parse_from(["agentgv", "match", "write", "a", "novel", "--track", "--agent", "router"]);
        match cli.command {
            Commands::Match { task, track, agent } => {
                assert_eq!(task.join(" "), "write a novel");
                assert!(track);
                assert_eq!(agent.as_deref(), Some("router"));
            }
            _ => panic!("expected match command"),
        }
    }

    #[test]
    fn test_keep_keys_requires_reset() {
        assert!(Cli::try_parse_from(["agentgv", "stats", "--keep-keys"]).is_err());
        assert!(Cli::try_parse_from(["agentgv", "stats", "--reset", "--keep-keys"]).is_ok());
    }

    #[test]
    fn test_log_format_flag() {
        let cli = Cli::parse_from(["agentgv", "detect", "--log-format", "json"]);
        assert_eq!(cli.log_format, Some(LogFormat::Json));
        assert!(Cli::try_parse_from(["agentgv", "detect", "--log-format", "xml"]).is_err());
    }

    #[test]
    fn test_role_requires_model() {
        assert!(Cli::try_parse_from(["agentgv", "sync", "--role", "agentgv-router"]).is_err());
    }
}
