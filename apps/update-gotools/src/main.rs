//! update-gotools - install and update Go tools in parallel
//!
//! Loads the tool list, then hands the run to the ops crate while logging
//! the events it emits.

mod cli;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, LogLevel};
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use gotools_config::Config;
use gotools_events::EventReceiver;
use gotools_net::NetClient;
use gotools_ops::{OpsContextBuilder, Orchestrator, RunPlan, RunReport};
use std::future::Future;
use std::process;
use std::sync::Arc;
use tokio::select;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// What a finished invocation produced
enum Outcome {
    Installed(RunReport),
    Planned(RunPlan),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.log_level, cli.json);

    if let Err(e) = run(cli).await {
        error!("{e}");
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting update-gotools");

    // Precedence: file, then environment, then CLI flags
    let mut config = Config::load_or_default(Some(&cli.config)).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli);

    let (event_sender, event_receiver) = gotools_events::channel();
    let cancel = CancellationToken::new();
    watch_interrupt(cancel.clone());

    let ctx = OpsContextBuilder::new()
        .with_config(Arc::new(config))
        .with_net(NetClient::with_defaults()?)
        .with_event_sender(event_sender)
        .with_cancellation(cancel)
        .build()?;
    let orchestrator = Orchestrator::new(ctx);
    let limits = orchestrator.limits();
    info!(
        num_cpu = limits.cpus,
        concurrency = limits.parallel,
        "Concurrency configured"
    );

    let dry_run = cli.dry_run;
    let json_mode = cli.json;
    let mut event_handler = EventHandler::new();
    let outcome = execute_with_events(
        async move {
            if dry_run {
                orchestrator.dry_run().await.map(Outcome::Planned)
            } else {
                orchestrator.run().await.map(Outcome::Installed)
            }
        },
        event_receiver,
        &mut event_handler,
    )
    .await;

    match outcome {
        Ok(Outcome::Installed(report)) => {
            for phase in &report.phases {
                info!(
                    phase = %phase.kind,
                    concurrency = phase.concurrency,
                    packages = phase.packages.len(),
                    duration_ms = phase.duration.as_millis(),
                    "Phase summary"
                );
            }
            info!(
                packages = report.packages_installed(),
                duration_ms = report.duration.as_millis(),
                "Installation successful"
            );
            Ok(())
        }
        Ok(Outcome::Planned(plan)) => {
            if json_mode {
                println!("{}", plan.to_json()?);
            } else {
                log_plan(&plan);
            }
            Ok(())
        }
        Err(e) => {
            if !event_handler.failed().is_empty() || !event_handler.cancelled().is_empty() {
                warn!(
                    installed = event_handler.installed().len(),
                    failed = ?event_handler.failed(),
                    cancelled = ?event_handler.cancelled(),
                    "Installation incomplete"
                );
            }
            Err(e.into())
        }
    }
}

/// Drive `work` to completion while logging every event it emits
async fn execute_with_events<F, T>(
    work: F,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<T, gotools_errors::Error>
where
    F: Future<Output = Result<T, gotools_errors::Error>>,
{
    let mut work = Box::pin(work);

    loop {
        select! {
            result = &mut work => {
                // Drain any remaining events
                while let Ok(message) = event_receiver.try_recv() {
                    event_handler.handle_event(&message);
                }
                return result;
            }

            message = event_receiver.recv() => {
                match message {
                    Some(message) => event_handler.handle_event(&message),
                    None => { /* Channel closed: keep waiting for the run to finish */ }
                }
            }
        }
    }
}

/// Cancel the run on Ctrl-C; running commands are killed and the run fails
fn watch_interrupt(cancel: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping running commands");
            cancel.cancel();
        }
    });
}

fn apply_cli_config(config: &mut Config, cli: &Cli) {
    if let Some(jobs) = cli.jobs {
        config.jobs = jobs;
    }
}

fn log_plan(plan: &RunPlan) {
    for (index, command) in plan.pre_commands.iter().enumerate() {
        info!(step = "pre_commands", cmd_id = index, command = %command, "Planned command");
    }
    for phase in &plan.phases {
        info!(
            phase = %phase.kind,
            concurrency = phase.concurrency,
            packages = phase.packages.len(),
            "Planned phase"
        );
        for package in &phase.packages {
            info!(
                phase = %phase.kind,
                pkg = %package.name,
                ver = logging::log_ver(&package.version),
                commands = ?package.commands,
                "Planned package"
            );
        }
    }
    for (index, command) in plan.post_commands.iter().enumerate() {
        info!(step = "post_commands", cmd_id = index, command = %command, "Planned command");
    }
}

fn init_tracing(level: LogLevel, json_mode: bool) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_filter()));

    if json_mode {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}
