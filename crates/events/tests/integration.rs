//! Integration tests for events

#[cfg(test)]
mod tests {
    use smrv_errors::NetworkError;
    use smrv_events::*;

    #[tokio::test]
    async fn test_event_emitter_helpers() {
        let (tx, mut rx) = channel();

        tx.emit_error("test error");
        tx.emit_debug("test debug");

        let first = rx.recv().await.unwrap();
        assert!(matches!(
            first.event,
            AppEvent::General(GeneralEvent::Error { .. })
        ));
        assert_eq!(first.meta.level, EventLevel::Error);
        assert_eq!(first.meta.source, EventSource::GENERAL);

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

    #[tokio::test]
    async fn test_correlated_emission() {
        let (tx, mut rx) = channel();
        tx.emit_correlated(
            "version-1",
            AppEvent::Approval(ApprovalEvent::ManualReviewRequired {
                version_id: "version-1".into(),
                version: "Mod@1.0.0 (version-1)".into(),
            }),
        );

        let message = rx.recv().await.unwrap();
        assert_eq!(message.meta.correlation_id.as_deref(), Some("version-1"));
        assert_eq!(message.meta.source, EventSource::APPROVAL);
        assert_eq!(message.meta.level, EventLevel::Warn);
    }

    #[test]
    fn test_failure_context_from_error() {
        let err = NetworkError::HttpError {
            status: 400,
            message: "400 Bad Request".into(),
        };
        let failure = FailureContext::from_error(&err);
        assert_eq!(failure.code.as_deref(), Some("network.http_error"));
        assert!(failure.retryable);
        assert_eq!(failure.message, "HTTP error 400: 400 Bad Request");
    }

    #[test]
    fn test_event_serialization() {
        let event = AppEvent::Queue(QueueEvent::EpochStarted { epoch: 3, quota: 240 });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["domain"], "queue");
        assert_eq!(json["event"]["type"], "EpochStarted");
        assert_eq!(json["event"]["quota"], 240);
    }

    #[test]
    fn test_meta_serialization() {
        let message = EventMessage::from_event(AppEvent::General(GeneralEvent::warning("slow")));
        let json = serde_json::to_value(&message.meta).unwrap();

        assert_eq!(json["level"], "warn");
        assert_eq!(json["source"], "general");
        assert!(json["correlationId"].is_null());
        assert_eq!(json.as_object().unwrap().len(), 5);
    }
}
