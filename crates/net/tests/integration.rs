//! Integration tests for net crate

#[cfg(test)]
mod tests {
    use gotools_errors::{Error, NetworkError};
    use gotools_events::{channel, AppEvent, GeneralEvent};
    use gotools_net::*;
    use httpmock::prelude::*;

    #[tokio::test]
    async fn test_fetch_text() {
        let server = MockServer::start();
        let (tx, mut rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/tool.version");
            then.status(200).body("v1.4.2\n");
        });

        let client = NetClient::with_defaults().unwrap();
        let body = fetch_text(&client, &server.url("/tool.version"), &tx)
            .await
            .unwrap();

        mock.assert();
        assert_eq!(body, "v1.4.2\n");

        let mut saw_debug = false;
        while let Ok(message) = rx.try_recv() {
            if let AppEvent::General(GeneralEvent::DebugLog { .. }) = message.event {
                saw_debug = true;
            }
        }
        assert!(saw_debug);
    }

    #[tokio::test]
    async fn test_http_error_status() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let client = NetClient::with_defaults().unwrap();
        let url = server.url("/missing");
        let err = fetch_text(&client, &url, &tx).await.unwrap_err();

        mock.assert();
        match err {
            Error::Network(NetworkError::HttpError { status, url: got }) => {
                assert_eq!(status, 404);
                assert_eq!(got, url);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_request_per_fetch() {
        let server = MockServer::start();
        let (tx, _rx) = channel();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/flaky");
            then.status(503);
        });

        let client = NetClient::with_defaults().unwrap();
        assert!(fetch_text(&client, &server.url("/flaky"), &tx).await.is_err());
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let (tx, _rx) = channel();
        let client = NetClient::with_defaults().unwrap();

        // Port 9 (discard) is essentially never listening on loopback.
        let err = fetch_text(&client, "http://127.0.0.1:9/version", &tx)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Network(NetworkError::RequestFailed { .. } | NetworkError::Timeout { .. })
        ));
    }

    #[test]
    fn test_default_config() {
        let config = NetConfig::default();
        assert!(config.user_agent.starts_with("update-gotools/"));
        let client = NetClient::new(config).unwrap();
        assert_eq!(client.config().pool_max_idle_per_host, 4);
    }
}
