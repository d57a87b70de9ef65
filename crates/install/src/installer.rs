//! Package installer

use gotools_config::Config;
use gotools_errors::{Error, InstallError};
use gotools_events::{
    AppEvent, EventEmitter, EventSender, FailureContext, PackageEvent, ProcessOrigin,
};
use gotools_net::NetClient;
use gotools_platform::{Platform, PlatformCommand, PlatformContext};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::spec::{is_unpinned, PackageSpec};
use crate::step::InstallStep;

/// Installs single packages with the configured toolchain
///
/// Every command runs with an environment of exactly `GOPATH` (the install
/// root) and `PATH` (inherited from this process).
#[derive(Clone)]
pub struct PackageInstaller {
    config: Arc<Config>,
    platform: Platform,
    net: NetClient,
    tx: EventSender,
    inherited_path: String,
}

impl std::fmt::Debug for PackageInstaller {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackageInstaller")
            .field("gopath", &self.config.gopath)
            .field("cwd", &self.config.cwd)
            .finish_non_exhaustive()
    }
}

impl EventEmitter for PackageInstaller {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

impl PackageInstaller {
    #[must_use]
    pub fn new(config: Arc<Config>, platform: Platform, net: NetClient, tx: EventSender) -> Self {
        Self {
            config,
            platform,
            net,
            tx,
            inherited_path: std::env::var("PATH").unwrap_or_default(),
        }
    }

    /// Override the `PATH` handed to child processes
    #[must_use]
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.inherited_path = path.into();
        self
    }

    /// Resolve a package's version without installing it
    ///
    /// # Errors
    ///
    /// Returns an error if the version source cannot be used.
    pub async fn resolve_version(&self, spec: &PackageSpec) -> Result<String, Error> {
        spec.resolved_version(&self.net, &self.tx)
            .await
            .map(str::to_string)
    }

    /// Commands the installation of `spec` at `version` would run, in order
    #[must_use]
    pub fn plan(&self, spec: &PackageSpec, version: &str) -> Vec<(InstallStep, PlatformCommand)> {
        let name = spec.name();
        let mut steps = vec![(
            InstallStep::Fetch,
            self.command(&self.config.go_binary, ["get", "-d", name], &self.config.cwd),
        )];

        if !is_unpinned(version) {
            let source_dir = self.config.package_source_dir(name);
            steps.push((
                InstallStep::FetchRef,
                self.command(
                    &self.config.git_binary,
                    ["fetch", "-q", "--tags", "origin", version],
                    &source_dir,
                ),
            ));
            steps.push((
                InstallStep::Reset,
                self.command(&self.config.git_binary, ["reset", "--hard", version], &source_dir),
            ));
        }

        steps.push((
            InstallStep::Install,
            self.command(&self.config.go_binary, ["install", name], &self.config.cwd),
        ));
        steps
    }

    /// Install one package
    ///
    /// Any step's failure skips the remaining steps. When `cancel` fires the
    /// running command is killed and the package reports itself cancelled.
    ///
    /// # Errors
    ///
    /// Returns the version resolution error, `InstallError::PackageFailed`
    /// naming the failing step, or `InstallError::PackageCancelled`.
    pub async fn install(
        &self,
        spec: &PackageSpec,
        cancel: CancellationToken,
    ) -> Result<(), Error> {
        let start = Instant::now();
        let name = spec.name().to_string();

        let version = match self.resolve_version(spec).await {
            Ok(version) => version,
            Err(e) => {
                self.emit_failed(&name, spec.display_version(), &e);
                return Err(e);
            }
        };

        self.emit(AppEvent::Package(PackageEvent::Started {
            package: name.clone(),
            version: version.clone(),
        }));

        let ctx = PlatformContext::new(Some(self.tx.clone()))
            .with_origin(ProcessOrigin::Package {
                package: name.clone(),
                version: version.clone(),
            })
            .with_cancellation(cancel);

        for (step, cmd) in self.plan(spec, &version) {
            self.emit(AppEvent::Package(PackageEvent::StepStarted {
                package: name.clone(),
                version: version.clone(),
                step: step.to_string(),
            }));

            if let Err(e) = self.platform.execute_command(&ctx, cmd).await {
                let err = Self::step_error(&name, &version, step, &e);
                if err.is_cancellation() {
                    self.emit(AppEvent::Package(PackageEvent::Cancelled {
                        package: name,
                        version,
                    }));
                } else {
                    self.emit_failed(&name, &version, &err);
                }
                return Err(err);
            }
        }

        self.emit(AppEvent::Package(PackageEvent::Completed {
            package: name,
            version,
            duration: start.elapsed(),
        }));
        Ok(())
    }

    fn step_error(name: &str, version: &str, step: InstallStep, source: &Error) -> Error {
        if source.is_cancellation() {
            InstallError::PackageCancelled {
                package: name.to_string(),
                version: version.to_string(),
            }
            .into()
        } else {
            InstallError::PackageFailed {
                package: name.to_string(),
                version: version.to_string(),
                step: step.to_string(),
                message: source.to_string(),
            }
            .into()
        }
    }

    fn emit_failed(&self, name: &str, version: &str, err: &Error) {
        self.emit(AppEvent::Package(PackageEvent::Failed {
            package: name.to_string(),
            version: version.to_string(),
            failure: FailureContext::from_error(err),
        }));
    }

    fn command<'a>(
        &self,
        program: &str,
        args: impl IntoIterator<Item = &'a str>,
        dir: &Path,
    ) -> PlatformCommand {
        let mut cmd = self.platform.command(program);
        cmd.args(args)
            .current_dir(dir)
            .env_clear()
            .env("GOPATH", self.config.gopath.display().to_string())
            .env("PATH", self.inherited_path.clone());
        cmd
    }
}
