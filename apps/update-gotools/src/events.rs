//! Event handling and run summary

use gotools_events::{AppEvent, EventMessage, PackageEvent};

use crate::logging::log_event_with_tracing;

/// Logs every event and keeps track of package outcomes for the final summary
#[derive(Debug, Default)]
pub struct EventHandler {
    installed: Vec<String>,
    failed: Vec<String>,
    cancelled: Vec<String>,
}

impl EventHandler {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle incoming event
    pub fn handle_event(&mut self, message: &EventMessage) {
        log_event_with_tracing(message);

        if let AppEvent::Package(event) = &message.event {
            match event {
                PackageEvent::Completed { package, .. } => self.installed.push(package.clone()),
                PackageEvent::Failed { package, .. } => self.failed.push(package.clone()),
                PackageEvent::Cancelled { package, .. } => self.cancelled.push(package.clone()),
                _ => {}
            }
        }
    }

    /// Packages installed so far, in completion order
    #[must_use]
    pub fn installed(&self) -> &[String] {
        &self.installed
    }

    /// Packages whose install failed
    #[must_use]
    pub fn failed(&self) -> &[String] {
        &self.failed
    }

    /// Packages stopped because another package failed or the run was interrupted
    #[must_use]
    pub fn cancelled(&self) -> &[String] {
        &self.cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gotools_events::FailureContext;
    use std::time::Duration;

    fn package(event: PackageEvent) -> EventMessage {
        EventMessage::from_event(AppEvent::Package(event))
    }

    #[test]
    fn tracks_package_outcomes() {
        let mut handler = EventHandler::new();
        handler.handle_event(&package(PackageEvent::Started {
            package: "a".to_string(),
            version: String::new(),
        }));
        handler.handle_event(&package(PackageEvent::Completed {
            package: "a".to_string(),
            version: String::new(),
            duration: Duration::from_millis(5),
        }));
        handler.handle_event(&package(PackageEvent::Failed {
            package: "b".to_string(),
            version: "v1.0.0".to_string(),
            failure: FailureContext::new(None::<String>, "boom", None::<String>, false),
        }));
        handler.handle_event(&package(PackageEvent::Cancelled {
            package: "c".to_string(),
            version: String::new(),
        }));

        assert_eq!(handler.installed(), ["a".to_string()]);
        assert_eq!(handler.failed(), ["b".to_string()]);
        assert_eq!(handler.cancelled(), ["c".to_string()]);
    }
}
