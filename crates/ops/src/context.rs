//! Operations context for dependency injection

use gotools_config::Config;
use gotools_errors::{Error, OpsError};
use gotools_events::{EventEmitter, EventSender};
use gotools_net::NetClient;
use gotools_platform::Platform;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Everything an orchestrated run needs
#[derive(Clone)]
pub struct OpsCtx {
    /// Loaded configuration, shared read-only
    pub config: Arc<Config>,
    /// Process layer
    pub platform: Platform,
    /// Network client used for version URLs
    pub net: NetClient,
    /// Event sender for progress reporting
    pub tx: EventSender,
    /// Cancels the whole run
    pub cancel: CancellationToken,
}

impl std::fmt::Debug for OpsCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpsCtx")
            .field("config", &self.config)
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl EventEmitter for OpsCtx {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(&self.tx)
    }
}

/// Builder for [`OpsCtx`]
#[derive(Default)]
pub struct OpsContextBuilder {
    config: Option<Arc<Config>>,
    platform: Option<Platform>,
    net: Option<NetClient>,
    tx: Option<EventSender>,
    cancel: Option<CancellationToken>,
}

impl OpsContextBuilder {
    /// Create new context builder
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set configuration
    #[must_use]
    pub fn with_config(mut self, config: Arc<Config>) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the process layer
    #[must_use]
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set network client
    #[must_use]
    pub fn with_net(mut self, net: NetClient) -> Self {
        self.net = Some(net);
        self
    }

    /// Set event sender
    #[must_use]
    pub fn with_event_sender(mut self, tx: EventSender) -> Self {
        self.tx = Some(tx);
        self
    }

    /// Set the token that cancels the run; a fresh one is used otherwise
    #[must_use]
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Build the context
    ///
    /// The platform defaults to native processes.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration, network client or event sender
    /// is missing.
    pub fn build(self) -> Result<OpsCtx, Error> {
        let config = self.config.ok_or_else(|| OpsError::MissingComponent {
            component: "config".to_string(),
        })?;

        let net = self.net.ok_or_else(|| OpsError::MissingComponent {
            component: "net".to_string(),
        })?;

        let tx = self.tx.ok_or_else(|| OpsError::MissingComponent {
            component: "event_sender".to_string(),
        })?;

        Ok(OpsCtx {
            config,
            platform: self.platform.unwrap_or_else(Platform::current),
            net,
            tx,
            cancel: self.cancel.unwrap_or_default(),
        })
    }
}
