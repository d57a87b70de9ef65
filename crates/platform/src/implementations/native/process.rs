//! Native process operations implementation
//!
//! Spawns the child with piped output, forwards every line as a
//! `ProcessEvent::Output`, and kills the child when the context's
//! cancellation token fires.

use async_trait::async_trait;
use gotools_errors::{Error, PlatformError};
use gotools_events::{AppEvent, OutputStream, ProcessEvent};
use std::process::{ExitStatus, Stdio};
use std::time::Instant;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use crate::core::PlatformContext;
use crate::process::{PlatformCommand, ProcessOperations};

/// Process operations backed by `tokio::process`
#[derive(Debug, Default, Clone, Copy)]
pub struct NativeProcessOperations;

impl NativeProcessOperations {
    pub fn new() -> Self {
        Self
    }
}

fn build_command(cmd: &PlatformCommand) -> Command {
    let mut command = Command::new(cmd.program());
    command
        .args(cmd.get_args())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    if let Some(dir) = cmd.get_current_dir() {
        command.current_dir(dir);
    }

    if cmd.clears_env() {
        command.env_clear();
    }

    for (key, value) in cmd.get_env_vars() {
        command.env(key, value);
    }

    command
}

/// Forward each line of `reader` as an output event until EOF.
async fn forward_lines<R>(reader: Option<R>, stream: OutputStream, ctx: &PlatformContext)
where
    R: AsyncRead + Unpin,
{
    let Some(reader) = reader else {
        return;
    };

    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        match reader.read_until(b'\n', &mut buf).await {
            Ok(0) | Err(_) => break,
            Ok(_) => {
                let line = String::from_utf8_lossy(&buf);
                let line = line.trim_end_matches(['\n', '\r']);
                ctx.emit_event(AppEvent::Process(ProcessEvent::Output {
                    origin: ctx.origin().clone(),
                    stream,
                    line: line.to_string(),
                }));
            }
        }
    }
}

#[async_trait]
impl ProcessOperations for NativeProcessOperations {
    async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<(), Error> {
        let display = cmd.display();

        if ctx.is_cancelled() {
            return Err(PlatformError::Cancelled { command: display }.into());
        }

        let start = Instant::now();
        let mut child =
            build_command(&cmd)
                .spawn()
                .map_err(|e| PlatformError::ProcessExecutionFailed {
                    command: display.clone(),
                    message: e.to_string(),
                })?;

        ctx.emit_event(AppEvent::Process(ProcessEvent::Spawned {
            origin: ctx.origin().clone(),
            program: cmd.program().to_string(),
            args: cmd.get_args().to_vec(),
            cwd: cmd.get_current_dir().cloned(),
        }));

        let stdout = child.stdout.take();
        let stderr = child.stderr.take();

        let run = async {
            let (_, _, status) = tokio::join!(
                forward_lines(stdout, OutputStream::Stdout, ctx),
                forward_lines(stderr, OutputStream::Stderr, ctx),
                child.wait(),
            );
            status
        };

        let waited: Option<std::io::Result<ExitStatus>> = tokio::select! {
            () = ctx.cancellation().cancelled() => None,
            status = run => Some(status),
        };

        let Some(status) = waited else {
            // Best effort: kill_on_drop covers the case where this fails.
            let _ = child.kill().await;
            return Err(PlatformError::Cancelled { command: display }.into());
        };

        let status = status.map_err(|e| PlatformError::ProcessExecutionFailed {
            command: display.clone(),
            message: e.to_string(),
        })?;

        ctx.emit_event(AppEvent::Process(ProcessEvent::Exited {
            origin: ctx.origin().clone(),
            program: cmd.program().to_string(),
            exit_code: status.code(),
            duration: start.elapsed(),
        }));

        if status.success() {
            Ok(())
        } else {
            Err(PlatformError::CommandFailed {
                command: display,
                exit_code: status.code(),
            }
            .into())
        }
    }
}
