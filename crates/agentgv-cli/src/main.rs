mod cli;
mod config;
mod service;

use std::process::ExitCode;

use agentgv_types::AgentGvError;
use clap::Parser;
use cli::{Cli, Commands, PreferenceAction};
use config::AppConfig;
use service::RouterService;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if let Some(code) = error_code(&e) {
                eprintln!("Code: {}", code);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    // Load configuration
    let config = AppConfig::load(cli.config.as_deref())?;

    let level = if cli.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let format = cli.log_format.unwrap_or(config.logging.format);
    agentgv_logging::init_logging(level, format)?;

    let service = RouterService::new(config);

    match cli.command {
        Commands::Match { task, track, agent } => service.run_match(&task, track, agent),
        Commands::TaskType { task } => service.run_task_type(&task),
        Commands::Track(args) => service.run_track(args),
        Commands::Stats { reset, keep_keys } => service.run_stats(reset, keep_keys),
        Commands::Preference { action } => match action {
            PreferenceAction::Set { mode } => service.run_preference_set(&mode),
            PreferenceAction::Show => service.run_preference_show(),
        },
        Commands::Models => service.run_models(),
        Commands::Detect => service.run_detect(),
        Commands::Sync { force, model, role } => service.run_sync(force, model, role),
        Commands::Watch => service.run_watch().await,
        Commands::Scan { dir, write } => service.run_scan(dir, write),
        Commands::Config => service.run_config(),
    }
}

/// Machine-readable code of the first domain error in the chain
fn error_code(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AgentGvError>())
        .map(AgentGvError::code)
}
