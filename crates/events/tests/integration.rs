//! Integration tests for events

#[cfg(test)]
mod tests {
    use gotools_events::*;

    #[tokio::test]
    async fn test_event_sender_emit() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Error { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Error);

        let second = rx.recv().await.unwrap();
        assert!(matches!(
            second.event,
            AppEvent::General(GeneralEvent::DebugLog { .. })
        ));
        assert_eq!(second.meta.level, EventLevel::Debug);
    }

    #[tokio::test]
    async fn test_dropped_receiver() {
        let (tx, rx) = channel();
        drop(rx);

        // Should not panic when receiver is dropped
        tx.emit_warning("ignored");
    }

    #[test]
    fn test_none_emitter_is_silent() {
        let emitter: Option<EventSender> = None;
        emitter.emit_error("nobody listens");
    }

    #[test]
    fn test_package_events_carry_correlation() {
        let message = EventMessage::from_event(AppEvent::Package(PackageEvent::Started {
            package: "github.com/foo/bar".into(),
            version: "HEAD".into(),
        }));
        assert_eq!(
            message.meta.correlation_id.as_deref(),
            Some("github.com/foo/bar")
        );
        assert_eq!(message.meta.source, EventSource::PACKAGE);
    }

    #[test]
    fn test_stderr_output_is_error_level() {
        let event = AppEvent::Process(ProcessEvent::Output {
            origin: ProcessOrigin::Command {
                step: "pre_commands".into(),
                index: 0,
            },
            stream: OutputStream::Stderr,
            line: "oops".into(),
        });
        assert_eq!(event.log_level(), tracing::Level::ERROR);
        assert_eq!(event.correlation_id().as_deref(), Some("pre_commands"));
    }

    #[test]
    fn test_event_serialization_is_tagged() {
        let event = AppEvent::Phase(PhaseEvent::Started {
            phase: "parallel".into(),
            concurrency: 3,
            packages: vec!["a".into()],
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "phase");
        assert_eq!(json["event"]["type"], "Started");
    }
}
