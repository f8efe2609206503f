//! Template Audit CLI
//!
//! Verifies that prompt templates reference their number inputs through
//! placeholders, and repairs templates and id sequences that drifted.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use template_audit::cli::{Cli, Command};
use template_audit::commands;
use template_audit::config::{Backend, Config, ConfigLoader};
use template_audit::db::{self, TemplateStore};
use template_audit::logging::{self, LogTarget};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(&LogTarget::parse(&cli.log), cli.verbose) {
        eprintln!("Error: failed to initialize logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!(error = %format!("{:#}", e), "Command failed");
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    debug!(config = ?config, "Configuration loaded");

    let store = db::connect(&config.database).await?;
    debug!(backend = store.backend(), "Store ready");
    let result = dispatch(store.as_ref(), &config, &cli.command).await;
    store.close().await;
    result
}

/// Configuration tiers, then CLI overrides.
fn load_config(cli: &Cli) -> Result<Config> {
    let mut loader = ConfigLoader::load(cli.config.clone())?;
    for (tier, path) in loader.sources() {
        debug!(tier = ?tier, path = %path.display(), "Config file applied");
    }

    let config = loader.config_mut();
    if let Some(backend) = cli.backend {
        config.database.backend = backend;
    }
    if let Some(path) = &cli.sqlite {
        config.database.sqlite_path = path.clone();
        config.database.backend = Backend::Sqlite;
    }
    Ok(loader.into_config())
}

async fn dispatch(store: &dyn TemplateStore, config: &Config, command: &Command) -> Result<ExitCode> {
    let code = match command {
        Command::Check(args) => {
            let summary = commands::run_check(store, config, args).await?;
            failure_if(args.fail_on_issues && !summary.all_correct())
        }
        Command::Scan(args) => {
            commands::run_scan(store, config, args).await?;
            ExitCode::SUCCESS
        }
        Command::Show(args) => {
            commands::run_show(store, config, args).await?;
            ExitCode::SUCCESS
        }
        Command::Fix(args) => {
            let summary = commands::run_fix(store, config, args).await?;
            failure_if(summary.failed > 0)
        }
        Command::Replace(args) => {
            commands::run_replace(store, config, args).await?;
            ExitCode::SUCCESS
        }
        Command::RepairSequence(args) => {
            commands::run_repair_sequence(store, config, args).await?;
            ExitCode::SUCCESS
        }
        Command::DumpSql(args) => {
            commands::run_dump_sql(store, config, args).await?;
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}

fn failure_if(failed: bool) -> ExitCode {
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
