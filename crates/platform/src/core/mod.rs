//! Core platform abstractions and context management

use gotools_events::{AppEvent, EventEmitter, EventSender, ProcessOrigin};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::implementations::native::NativeProcessOperations;
use crate::process::{PlatformCommand, ProcessOperations};

/// Context for process operations: where events go, who the process runs
/// for, and the token that cancels it.
#[derive(Clone)]
pub struct PlatformContext {
    event_sender: Option<EventSender>,
    origin: ProcessOrigin,
    cancel: CancellationToken,
}

impl PlatformContext {
    /// Create a new platform context with event emission capabilities
    pub fn new(event_sender: Option<EventSender>) -> Self {
        Self {
            event_sender,
            origin: ProcessOrigin::Unattributed,
            cancel: CancellationToken::new(),
        }
    }

    /// Attribute processes started with this context to `origin`
    #[must_use]
    pub fn with_origin(mut self, origin: ProcessOrigin) -> Self {
        self.origin = origin;
        self
    }

    /// Kill processes started with this context once `cancel` fires
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn origin(&self) -> &ProcessOrigin {
        &self.origin
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Emit an event if an event sender is available
    pub fn emit_event(&self, event: AppEvent) {
        self.emit(event);
    }
}

impl EventEmitter for PlatformContext {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

/// Entry point to platform operations
#[derive(Clone)]
pub struct Platform {
    process_ops: Arc<dyn ProcessOperations>,
}

impl Platform {
    /// Create a new platform instance with the specified implementation
    pub fn new(process_ops: Arc<dyn ProcessOperations>) -> Self {
        Self { process_ops }
    }

    /// The platform backed by real processes
    pub fn current() -> Self {
        Self::new(Arc::new(NativeProcessOperations::new()))
    }

    /// Convenience method: run a command to completion
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot start, exits unsuccessfully,
    /// or is cancelled.
    pub async fn execute_command(
        &self,
        ctx: &PlatformContext,
        cmd: PlatformCommand,
    ) -> Result<(), gotools_errors::Error> {
        self.process_ops.execute_command(ctx, cmd).await
    }

    /// Convenience method: start building a command
    pub fn command(&self, program: &str) -> PlatformCommand {
        self.process_ops.create_command(program)
    }
}
