//! Structured logging of application events
//!
//! Every event received from the library crates ends up here and is turned
//! into one `tracing` record. Field names are stable so JSON output can be
//! filtered: `step`, `cmd_id`, `pkg`, `ver`, `phase`, `concurrency`,
//! `stream`.

use gotools_events::{
    AppEvent, CommandEvent, EventMessage, GeneralEvent, OutputStream, PackageEvent, PhaseEvent,
    ProcessEvent, ProcessOrigin, RunEvent,
};
use tracing::{debug, error, info, warn};

/// Log an event through tracing with structured fields
#[allow(clippy::too_many_lines)]
pub fn log_event_with_tracing(message: &EventMessage) {
    let meta = &message.meta;
    let event = &message.event;

    match event {
        AppEvent::Run(run_event) => match run_event {
            RunEvent::Started {
                version,
                num_cpu,
                packages,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    version = %version,
                    num_cpu = num_cpu,
                    packages = packages,
                    "update-gotools started"
                );
            }
            RunEvent::Completed {
                packages_installed,
                duration,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    packages = packages_installed,
                    duration_ms = duration.as_millis(),
                    "Run completed"
                );
            }
            RunEvent::Failed { failure } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Run failed"
                );
            }
        },

        AppEvent::Command(command_event) => match command_event {
            CommandEvent::StepStarted { step, commands } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    step = %step,
                    commands = commands,
                    "Running commands"
                );
            }
            CommandEvent::Started {
                step,
                index,
                command,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    step = %step,
                    cmd_id = index,
                    command = %command.join(" "),
                    "Command started"
                );
            }
            CommandEvent::Completed {
                step,
                index,
                duration,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    step = %step,
                    cmd_id = index,
                    duration_ms = duration.as_millis(),
                    "Command completed"
                );
            }
            CommandEvent::Failed {
                step,
                index,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    step = %step,
                    cmd_id = index,
                    code = ?failure.code,
                    message = %failure.message,
                    "Command failed"
                );
            }
        },

        AppEvent::Phase(phase_event) => match phase_event {
            PhaseEvent::Started {
                phase,
                concurrency,
                packages,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    phase = %phase,
                    concurrency = concurrency,
                    packages = packages.len(),
                    "Phase started"
                );
            }
            PhaseEvent::Completed {
                phase,
                packages,
                duration,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    phase = %phase,
                    packages = packages,
                    duration_ms = duration.as_millis(),
                    "Phase completed"
                );
            }
            PhaseEvent::Failed {
                phase,
                failure,
                cancelled,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    phase = %phase,
                    cancelled = cancelled,
                    code = ?failure.code,
                    message = %failure.message,
                    "Phase failed"
                );
            }
        },

        AppEvent::Package(package_event) => match package_event {
            PackageEvent::VersionResolved {
                package,
                version,
                source_url,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    url = %source_url,
                    "Version resolved"
                );
            }
            PackageEvent::Started { package, version } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    "Installing package"
                );
            }
            PackageEvent::StepStarted {
                package,
                version,
                step,
            } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    step = %step,
                    "Install step"
                );
            }
            PackageEvent::Completed {
                package,
                version,
                duration,
            } => {
                info!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    duration_ms = duration.as_millis(),
                    "Package installed"
                );
            }
            PackageEvent::Failed {
                package,
                version,
                failure,
            } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    retryable = failure.retryable,
                    code = ?failure.code,
                    message = %failure.message,
                    hint = ?failure.hint,
                    "Package failed"
                );
            }
            PackageEvent::Cancelled { package, version } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    pkg = %package,
                    ver = log_ver(version),
                    "Package cancelled"
                );
            }
        },

        AppEvent::Process(process_event) => log_process_event(message, process_event),

        AppEvent::General(general_event) => match general_event {
            GeneralEvent::Warning { message, context } => {
                warn!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Warning"
                );
            }
            GeneralEvent::Error { message, details } => {
                error!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    details = ?details,
                    "Error"
                );
            }
            GeneralEvent::DebugLog { message, context } => {
                debug!(
                    source = meta.source.as_str(),
                    event_id = %meta.event_id,
                    correlation = ?meta.correlation_id,
                    message = %message,
                    context = ?context,
                    "Debug log"
                );
            }
        },
    }
}

fn log_process_event(message: &EventMessage, event: &ProcessEvent) {
    let meta = &message.meta;

    match event {
        ProcessEvent::Spawned {
            origin,
            program,
            args,
            cwd,
        } => {
            let (step, cmd_id, pkg, ver) = origin_fields(origin);
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                step = ?step,
                cmd_id = ?cmd_id,
                pkg = ?pkg,
                ver = ?ver,
                program = %program,
                args = %args.join(" "),
                cwd = ?cwd,
                "Process spawned"
            );
        }
        ProcessEvent::Output {
            origin,
            stream,
            line,
        } => {
            let (step, cmd_id, pkg, ver) = origin_fields(origin);
            match stream {
                OutputStream::Stdout => info!(
                    step = ?step,
                    cmd_id = ?cmd_id,
                    pkg = ?pkg,
                    ver = ?ver,
                    stream = stream.as_str(),
                    "{line}"
                ),
                OutputStream::Stderr => error!(
                    step = ?step,
                    cmd_id = ?cmd_id,
                    pkg = ?pkg,
                    ver = ?ver,
                    stream = stream.as_str(),
                    "{line}"
                ),
            }
        }
        ProcessEvent::Exited {
            origin,
            program,
            exit_code,
            duration,
        } => {
            let (step, cmd_id, pkg, ver) = origin_fields(origin);
            debug!(
                source = meta.source.as_str(),
                event_id = %meta.event_id,
                step = ?step,
                cmd_id = ?cmd_id,
                pkg = ?pkg,
                ver = ?ver,
                program = %program,
                exit_code = ?exit_code,
                duration_ms = duration.as_millis(),
                "Process exited"
            );
        }
    }
}

/// Unpinned packages build whatever the default branch points at
pub(crate) fn log_ver(version: &str) -> &str {
    if version.is_empty() {
        "HEAD"
    } else {
        version
    }
}

/// Split a process origin into the `step`, `cmd_id`, `pkg` and `ver` fields
fn origin_fields(
    origin: &ProcessOrigin,
) -> (Option<&str>, Option<usize>, Option<&str>, Option<&str>) {
    match origin {
        ProcessOrigin::Command { step, index } => {
            (Some(step.as_str()), Some(*index), None, None)
        }
        ProcessOrigin::Package { package, version } => {
            (None, None, Some(package.as_str()), Some(log_ver(version)))
        }
        ProcessOrigin::Unattributed => (None, None, None, None),
    }
}
