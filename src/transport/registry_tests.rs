//! Tests for the scheme transport registry.

use super::registry::{SchemeHandler, TransportRegistry};
use super::test_fixtures::{MockClient, NtlmServer, ntlm_token, response};
use super::{HttpRequest, RegistryError};
use crate::config::Credentials;

fn request(url: &str) -> HttpRequest {
    HttpRequest::get(url::Url::parse(url).unwrap())
}

mod overrides {
    use super::*;

    #[test]
    fn schemes_default_to_plain() {
        let registry = TransportRegistry::new();

        assert_eq!(registry.handler("http"), SchemeHandler::Plain);
        assert!(!registry.is_overridden("http"));
    }

    #[test]
    fn override_installs_ntlm_handler() {
        let registry = TransportRegistry::new();
        let credentials = Credentials::new("u", "p");

        let guard = registry.scoped_override("http", credentials.clone()).unwrap();

        assert_eq!(guard.scheme(), "http");
        assert_eq!(registry.handler("http"), SchemeHandler::Ntlm(credentials));
        assert!(registry.is_overridden("http"));
    }

    #[test]
    fn override_is_scoped_to_its_scheme() {
        let registry = TransportRegistry::new();

        let _guard = registry
            .scoped_override("https", Credentials::new("u", "p"))
            .unwrap();

        assert_eq!(registry.handler("http"), SchemeHandler::Plain);
    }

    #[test]
    fn scheme_lookup_ignores_case() {
        let registry = TransportRegistry::new();

        let _guard = registry
            .scoped_override("HTTP", Credentials::new("u", "p"))
            .unwrap();

        assert!(registry.is_overridden("http"));
    }

    #[test]
    fn dropping_guard_restores_plain() {
        let registry = TransportRegistry::new();

        drop(registry.scoped_override("http", Credentials::new("u", "p")).unwrap());

        assert_eq!(registry.handler("http"), SchemeHandler::Plain);
        assert!(!registry.is_overridden("http"));
    }

    #[test]
    fn second_override_conflicts() {
        let registry = TransportRegistry::new();
        let first = Credentials::new("first", "p");
        let _guard = registry.scoped_override("http", first.clone()).unwrap();

        let result = registry.scoped_override("http", Credentials::new("second", "p"));

        assert_eq!(
            result.unwrap_err(),
            RegistryError::Conflict {
                scheme: "http".to_string()
            }
        );
        // The active override is left in place
        assert_eq!(registry.handler("http"), SchemeHandler::Ntlm(first));
    }

    #[test]
    fn override_is_available_again_after_restore() {
        let registry = TransportRegistry::new();
        drop(registry.scoped_override("http", Credentials::new("u", "p")).unwrap());

        assert!(registry.scoped_override("http", Credentials::new("u", "p")).is_ok());
    }

    #[test]
    fn conflict_converts_to_config_error() {
        let error: crate::config::ConfigError = RegistryError::Conflict {
            scheme: "http".to_string(),
        }
        .into();

        assert!(error.to_string().contains("HTTP"));
    }
}

mod fetch {
    use super::*;

    #[tokio::test]
    async fn plain_scheme_sends_request_unchanged() {
        let registry = TransportRegistry::new();
        let mock = MockClient::replying(200, "<definitions/>");

        let resp = registry
            .fetch(&mock, request("http://svc/test?wsdl"))
            .await
            .unwrap();

        assert_eq!(resp.body_text(), Some("<definitions/>"));
        assert_eq!(mock.calls(), 1);
        assert!(
            mock.captured_requests()[0]
                .headers
                .get(http::header::AUTHORIZATION)
                .is_none()
        );
    }

    #[tokio::test]
    async fn overridden_scheme_authenticates() {
        let registry = TransportRegistry::new();
        let server = NtlmServer::new("u", "p");
        let _guard = registry
            .scoped_override("http", Credentials::new("u", "p"))
            .unwrap();

        let resp = registry
            .fetch(&server, request("http://svc/test?wsdl"))
            .await
            .unwrap();

        assert_eq!(resp.status, http::StatusCode::OK);
        assert_eq!(server.authenticated(), 1);
    }

    #[tokio::test]
    async fn restored_scheme_no_longer_authenticates() {
        let registry = TransportRegistry::new();
        let mock = MockClient::replying(200, "");
        drop(
            registry
                .scoped_override("http", Credentials::new("u", "p"))
                .unwrap(),
        );

        registry.fetch(&mock, request("http://svc/test")).await.unwrap();

        assert_eq!(mock.calls(), 1);
        assert!(ntlm_token(&mock.captured_requests()[0]).is_none());
    }

    #[tokio::test]
    async fn other_scheme_is_not_affected_by_override() {
        let registry = TransportRegistry::new();
        let mock = MockClient::new(vec![Ok(response(200, ""))]);
        let _guard = registry
            .scoped_override("https", Credentials::new("u", "p"))
            .unwrap();

        registry.fetch(&mock, request("http://svc/test")).await.unwrap();

        assert!(ntlm_token(&mock.captured_requests()[0]).is_none());
    }
}

mod construction_lock {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn construction_windows_are_serialized() {
        let registry = Arc::new(TransportRegistry::new());
        let held = registry.lock_construction().await;

        let waiter = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                let _lock = registry.lock_construction().await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(held);
        waiter.await.unwrap();
    }
}
