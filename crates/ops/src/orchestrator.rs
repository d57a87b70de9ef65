//! Run orchestration
//!
//! A run is four stages in strict sequence: pre-commands, the parallel
//! build phase, the single build phase, post-commands. The first failure in
//! any stage ends the run.

use gotools_errors::{Error, OpsError};
use gotools_events::{
    AppEvent, CommandEvent, EventEmitter, FailureContext, ProcessOrigin, RunEvent,
};
use gotools_install::{PackageInstaller, PackageSpec};
use gotools_platform::{PlatformCommand, PlatformContext};
use gotools_resources::PhaseLimits;
use std::time::Instant;

use crate::context::OpsCtx;
use crate::phase::{run_phase, BuildPhase};
use crate::types::{HookStep, PhaseKind, PhasePlan, PlannedPackage, RunPlan, RunReport};

/// Drives one complete run
#[derive(Debug, Clone)]
pub struct Orchestrator {
    ctx: OpsCtx,
    limits: PhaseLimits,
    installer: PackageInstaller,
    packages: Vec<PackageSpec>,
    inherited_path: String,
}

impl Orchestrator {
    /// Create an orchestrator for the configuration in `ctx`
    ///
    /// Phase capacities come from the CPU count unless the configuration
    /// sets `jobs`.
    #[must_use]
    pub fn new(ctx: OpsCtx) -> Self {
        let limits = PhaseLimits::from_system(ctx.config.jobs);
        let installer = PackageInstaller::new(
            ctx.config.clone(),
            ctx.platform.clone(),
            ctx.net.clone(),
            ctx.tx.clone(),
        );
        let packages = ctx.config.packages.iter().map(PackageSpec::from).collect();

        Self {
            ctx,
            limits,
            installer,
            packages,
            inherited_path: std::env::var("PATH").unwrap_or_default(),
        }
    }

    /// Override the phase capacities
    #[must_use]
    pub fn with_limits(mut self, limits: PhaseLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Override the `PATH` handed to every child process
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        let path = path.into();
        self.installer = self.installer.with_path(path.clone());
        self.inherited_path = path;
        self
    }

    #[must_use]
    pub fn limits(&self) -> PhaseLimits {
        self.limits
    }

    /// The two build phases, in execution order
    #[must_use]
    pub fn phases(&self) -> [BuildPhase; 2] {
        let (single, parallel): (Vec<_>, Vec<_>) =
            self.packages.iter().cloned().partition(PackageSpec::is_single);

        [
            BuildPhase::new(PhaseKind::Parallel, self.limits.parallel, parallel),
            BuildPhase::new(PhaseKind::Single, self.limits.single, single),
        ]
    }

    /// Run every stage
    ///
    /// # Errors
    ///
    /// Returns the first failing hook command or package install.
    pub async fn run(&self) -> Result<RunReport, Error> {
        let start = Instant::now();

        self.ctx.emit(AppEvent::Run(RunEvent::Started {
            version: env!("CARGO_PKG_VERSION").to_string(),
            num_cpu: self.limits.cpus,
            packages: self.packages.len(),
        }));

        match self.run_stages(start).await {
            Ok(report) => {
                self.ctx.emit(AppEvent::Run(RunEvent::Completed {
                    packages_installed: report.packages_installed(),
                    duration: report.duration,
                }));
                Ok(report)
            }
            Err(e) => {
                self.ctx.emit(AppEvent::Run(RunEvent::Failed {
                    failure: FailureContext::from_error(&e),
                }));
                Err(e)
            }
        }
    }

    async fn run_stages(&self, start: Instant) -> Result<RunReport, Error> {
        let pre_commands = self
            .run_commands(HookStep::PreCommands, &self.ctx.config.pre_commands)
            .await?;

        let mut phases = Vec::with_capacity(2);
        for phase in self.phases() {
            let report = run_phase(&phase, &self.ctx.tx, &self.ctx.cancel, |spec, cancel| {
                let installer = self.installer.clone();
                async move { installer.install(&spec, cancel).await }
            })
            .await?;
            phases.push(report);
        }

        let post_commands = self
            .run_commands(HookStep::PostCommands, &self.ctx.config.post_commands)
            .await?;

        Ok(RunReport {
            pre_commands,
            phases,
            post_commands,
            duration: start.elapsed(),
        })
    }

    /// Run hook commands one after another in the configured working directory
    async fn run_commands(
        &self,
        step: HookStep,
        commands: &[Vec<String>],
    ) -> Result<usize, Error> {
        if commands.is_empty() {
            return Ok(0);
        }

        self.ctx.emit(AppEvent::Command(CommandEvent::StepStarted {
            step: step.to_string(),
            commands: commands.len(),
        }));

        for (index, tokens) in commands.iter().enumerate() {
            let started = Instant::now();
            self.ctx.emit(AppEvent::Command(CommandEvent::Started {
                step: step.to_string(),
                index,
                command: tokens.clone(),
            }));

            let result = match self.hook_command(tokens) {
                Ok(cmd) => {
                    let pctx = PlatformContext::new(Some(self.ctx.tx.clone()))
                        .with_origin(ProcessOrigin::Command {
                            step: step.to_string(),
                            index,
                        })
                        .with_cancellation(self.ctx.cancel.clone());
                    self.ctx.platform.execute_command(&pctx, cmd).await
                }
                Err(e) => Err(e),
            };

            if let Err(e) = result {
                let err: Error = OpsError::CommandFailed {
                    step: step.to_string(),
                    index,
                    message: e.to_string(),
                }
                .into();
                self.ctx.emit(AppEvent::Command(CommandEvent::Failed {
                    step: step.to_string(),
                    index,
                    failure: FailureContext::from_error(&err),
                }));
                return Err(err);
            }

            self.ctx.emit(AppEvent::Command(CommandEvent::Completed {
                step: step.to_string(),
                index,
                duration: started.elapsed(),
            }));
        }

        Ok(commands.len())
    }

    fn hook_command(&self, tokens: &[String]) -> Result<PlatformCommand, Error> {
        let mut cmd = PlatformCommand::from_tokens(tokens)?;
        cmd.current_dir(&self.ctx.config.cwd)
            .env_clear()
            .env("GOPATH", self.ctx.config.gopath.display().to_string())
            .env("PATH", self.inherited_path.clone());
        Ok(cmd)
    }

    /// Resolve versions and describe every command a run would execute
    ///
    /// Version URLs are fetched; no command is started.
    ///
    /// # Errors
    ///
    /// Returns an error if a hook command is empty or a version cannot be
    /// resolved.
    pub async fn dry_run(&self) -> Result<RunPlan, Error> {
        let describe = |commands: &[Vec<String>]| -> Result<Vec<String>, Error> {
            commands
                .iter()
                .map(|tokens| self.hook_command(tokens).map(|cmd| cmd.display()))
                .collect()
        };

        let pre_commands = describe(&self.ctx.config.pre_commands)?;
        let post_commands = describe(&self.ctx.config.post_commands)?;

        let mut phases = Vec::with_capacity(2);
        for phase in self.phases() {
            let mut packages = Vec::with_capacity(phase.packages.len());
            for spec in &phase.packages {
                let version = self.installer.resolve_version(spec).await?;
                let commands = self
                    .installer
                    .plan(spec, &version)
                    .iter()
                    .map(|(_, cmd)| cmd.display())
                    .collect();
                packages.push(PlannedPackage {
                    name: spec.name().to_string(),
                    version,
                    commands,
                });
            }
            phases.push(PhasePlan {
                kind: phase.kind,
                concurrency: phase.concurrency,
                packages,
            });
        }

        Ok(RunPlan {
            pre_commands,
            phases,
            post_commands,
        })
    }
}
