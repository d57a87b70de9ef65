//! Build phase driver
//!
//! Runs every package of one phase under a fresh [`Limiter`]. The first
//! failure stops further submissions, cancels the packages still running and
//! is returned once every admitted package has released its permit.

use gotools_errors::{Error, OpsError};
use gotools_events::{AppEvent, EventEmitter, EventSender, FailureContext, PhaseEvent};
use gotools_install::PackageSpec;
use gotools_resources::Limiter;
use std::future::Future;
use std::time::Instant;
use tokio::task::{JoinError, JoinSet};
use tokio_util::sync::CancellationToken;

use crate::types::{PhaseKind, PhaseReport};

/// One build phase: which packages, and how many at a time
#[derive(Debug, Clone)]
pub struct BuildPhase {
    pub kind: PhaseKind,
    pub concurrency: usize,
    pub packages: Vec<PackageSpec>,
}

impl BuildPhase {
    #[must_use]
    pub fn new(kind: PhaseKind, concurrency: usize, packages: Vec<PackageSpec>) -> Self {
        Self {
            kind,
            concurrency: concurrency.max(1),
            packages,
        }
    }

    #[must_use]
    pub fn package_names(&self) -> Vec<String> {
        self.packages.iter().map(|p| p.name().to_string()).collect()
    }
}

/// Run every package of `phase` through `install`
///
/// `install` receives each package and a token that fires when the phase is
/// being torn down after a failure (or `cancel` fires); it should stop
/// promptly and report cancellation.
///
/// # Errors
///
/// Returns the first package failure, or `OpsError::PhaseFailed` if an
/// install task panicked.
pub async fn run_phase<F, Fut>(
    phase: &BuildPhase,
    tx: &EventSender,
    cancel: &CancellationToken,
    install: F,
) -> Result<PhaseReport, Error>
where
    F: Fn(PackageSpec, CancellationToken) -> Fut,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    let start = Instant::now();
    let limiter = Limiter::new(phase.kind.as_str(), phase.concurrency);
    let phase_cancel = cancel.child_token();
    let mut tasks: JoinSet<Result<String, Error>> = JoinSet::new();
    let mut completed = Vec::with_capacity(phase.packages.len());
    let mut first_error: Option<Error> = None;
    let mut cancelled = 0usize;
    let mut stopped = false;

    tx.emit(AppEvent::Phase(PhaseEvent::Started {
        phase: phase.kind.to_string(),
        concurrency: limiter.capacity(),
        packages: phase.package_names(),
    }));

    'submit: for spec in &phase.packages {
        let permit = loop {
            tokio::select! {
                biased;

                () = phase_cancel.cancelled() => {
                    stopped = true;
                    break 'submit;
                }

                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    match task_result(phase.kind, joined) {
                        Ok(name) => completed.push(name),
                        Err(e) => {
                            record_failure(&mut first_error, &mut cancelled, e);
                            break 'submit;
                        }
                    }
                }

                acquired = limiter.acquire() => match acquired {
                    Ok(permit) => break permit,
                    Err(e) => {
                        first_error = Some(e);
                        break 'submit;
                    }
                },
            }
        };

        // A sibling may have failed while the permit was being handed over.
        if phase_cancel.is_cancelled() {
            drop(permit);
            stopped = true;
            break;
        }

        let name = spec.name().to_string();
        let work = install(spec.clone(), phase_cancel.clone());
        let failed = phase_cancel.clone();
        tasks.spawn(async move {
            let _permit = permit;
            let result = work.await.map(|()| name);
            // Cancel before the permit is released so the freed slot is
            // never handed to another package.
            if result.is_err() {
                failed.cancel();
            }
            result
        });
    }

    if first_error.is_some() || stopped {
        phase_cancel.cancel();
    }

    while let Some(joined) = tasks.join_next().await {
        match task_result(phase.kind, joined) {
            Ok(name) => completed.push(name),
            Err(e) => {
                phase_cancel.cancel();
                record_failure(&mut first_error, &mut cancelled, e);
            }
        }
    }

    limiter.join().await;

    if first_error.is_none() && stopped {
        first_error = Some(Error::Cancelled);
    }

    if let Some(err) = first_error {
        tx.emit(AppEvent::Phase(PhaseEvent::Failed {
            phase: phase.kind.to_string(),
            failure: FailureContext::from_error(&err),
            cancelled,
        }));
        return Err(err);
    }

    let duration = start.elapsed();
    tx.emit(AppEvent::Phase(PhaseEvent::Completed {
        phase: phase.kind.to_string(),
        packages: completed.len(),
        duration,
    }));

    Ok(PhaseReport {
        kind: phase.kind,
        concurrency: limiter.capacity(),
        packages: completed,
        duration,
    })
}

/// Keep the first real failure; cancellations only count as cancelled packages
fn record_failure(first_error: &mut Option<Error>, cancelled: &mut usize, e: Error) {
    let replace = match first_error {
        None => true,
        Some(current) => current.is_cancellation() && !e.is_cancellation(),
    };

    if replace {
        if first_error.is_some() {
            *cancelled += 1;
        }
        *first_error = Some(e);
    } else if e.is_cancellation() {
        *cancelled += 1;
    }
}

fn task_result(
    kind: PhaseKind,
    joined: Result<Result<String, Error>, JoinError>,
) -> Result<String, Error> {
    joined.map_err(|e| -> Error {
        OpsError::PhaseFailed {
            phase: kind.to_string(),
            message: format!("install task failed: {e}"),
        }
        .into()
    })?
}
