//! Main entry point for the botops binary

use anyhow::Context;
use clap::Parser;
use std::io::{self, IsTerminal};
use std::process::ExitCode;

use launcher::cli::{Cli, Command};
use launcher::commands::{self, CommandOutcome};
use launcher::services::{RealCommandRunner, RealDisplaySource, RealHttpProbe, RealPortProbe, RealProcessTable};
use launcher::{ConsoleReporter, LauncherConfig, LauncherResult};
use shared::{logging, step_debug, CommandId};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // Load environment variables from .env file before clap reads them
    dotenv::dotenv().ok();

    let cli = Cli::parse();

    // Initialize command identity singleton before the first log line
    CommandId::init(cli.command.id());
    logging::init_tracing(&cli.log_level);
    logging::log_startup(CommandId::current(), CommandId::current().as_str());

    let mut config = LauncherConfig::load(cli.config.as_deref(), cli.project_dir.as_deref())
        .context("Failed to load configuration")?;
    cli.apply_overrides(&mut config);
    config.validate().context("Invalid configuration")?;
    step_debug!(CommandId::current(), "Project root: {:?}", config.project_root()?);

    let outcome = match dispatch(&cli, &config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            logging::log_error(CommandId::current(), CommandId::current().as_str(), &e);
            return Err(e.into());
        }
    };

    let mut reporter = ConsoleReporter::stdout();
    reporter.report(&outcome.report)?;

    if cli.command.pauses() && !cli.no_pause && io::stdin().is_terminal() {
        reporter.pause_for_operator(&mut io::stdin().lock())?;
    }

    if outcome.failed {
        logging::log_shutdown(CommandId::current(), "checks failed");
    } else {
        logging::log_success(CommandId::current(), "Done");
    }
    Ok(outcome.exit_code())
}

async fn dispatch(cli: &Cli, config: &LauncherConfig) -> LauncherResult<CommandOutcome> {
    let runner = RealCommandRunner::new();

    match &cli.command {
        Command::Preflight => commands::run_preflight(config),
        Command::DebugStartup => commands::run_debug_startup(config, &runner).await,
        Command::Start(_) => {
            let http = RealHttpProbe::new(config.backend.request_timeout())?;
            let interrupted = async {
                if let Err(err) = tokio::signal::ctrl_c().await {
                    logging::log_error(CommandId::current(), "Signal handling", &err);
                }
            };
            commands::run_start(config, &runner, http, interrupted).await
        }
        Command::Stop(args) => {
            commands::run_stop(config, RealProcessTable::new(), RealPortProbe::new(), args.request()).await
        }
        Command::Screenshot(args) => {
            commands::run_screenshot(config, RealDisplaySource::new(), runner, args.file_name.clone()).await
        }
        Command::Launch(args) => {
            let http = RealHttpProbe::new(config.backend.request_timeout())?;
            commands::run_launch(config, &runner, http, !args.no_viewer).await
        }
        Command::Readiness(_) => {
            let http = RealHttpProbe::new(config.backend.request_timeout())?;
            commands::run_readiness(config, http).await
        }
    }
}
