// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for `lister.rs`
//!
//! These run `KubeServiceLister` against a mock Kubernetes API server.

#[cfg(test)]
mod tests {
    use crate::constants::KUBE_LIST_PAGE_SIZE;
    use crate::errors::ListError;
    use crate::lister::{KubeServiceLister, ServiceLister};
    use kube::Client;
    use serde_json::{json, Value};
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    const SELECTOR: &str = "router.deis.io/routable=true";

    /// Matches requests that carry no label selector.
    struct NoLabelSelector;

    impl Match for NoLabelSelector {
        fn matches(&self, request: &Request) -> bool {
            request.url.query_pairs().all(|(key, _)| key != "labelSelector")
        }
    }

    fn client_for(uri: &str) -> Client {
        let config = kube::Config::new(uri.parse().expect("mock server URI should parse"));
        Client::try_from(config).expect("client should build")
    }

    fn service_list(items: &[(&str, &str, Option<&str>)], continue_token: Option<&str>) -> Value {
        let items: Vec<Value> = items
            .iter()
            .map(|(namespace, name, domains)| {
                let mut metadata = json!({ "name": name, "namespace": namespace });
                if let Some(domains) = domains {
                    metadata["annotations"] = json!({ "router.deis.io/domains": domains });
                }
                json!({ "metadata": metadata })
            })
            .collect();

        let mut metadata = json!({ "resourceVersion": "1" });
        if let Some(token) = continue_token {
            metadata["continue"] = json!(token);
        }

        json!({
            "apiVersion": "v1",
            "kind": "ServiceList",
            "metadata": metadata,
            "items": items,
        })
    }

    #[tokio::test]
    async fn test_lists_services_matching_selector() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .and(query_param("labelSelector", SELECTOR))
            .and(query_param("limit", KUBE_LIST_PAGE_SIZE.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(service_list(
                &[
                    ("apps", "web", Some("www")),
                    ("apps", "api", None),
                ],
                None,
            )))
            .expect(1)
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()));
        let services = lister
            .list_services(SELECTOR)
            .await
            .expect("listing should succeed");

        assert_eq!(services.len(), 2);
        assert_eq!(services[0].name, "web");
        assert_eq!(services[0].namespace.as_deref(), Some("apps"));
        assert_eq!(services[0].annotation("router.deis.io/domains"), Some("www"));
        assert_eq!(services[1].name, "api");
        assert!(services[1].annotations.is_empty());
    }

    #[tokio::test]
    async fn test_empty_selector_lists_all_services() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .and(NoLabelSelector)
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(service_list(&[("default", "kubernetes", None)], None)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()));
        let services = lister.list_services("").await.expect("listing should succeed");

        assert_eq!(services.len(), 1);
        assert_eq!(services[0].name, "kubernetes");
    }

    #[tokio::test]
    async fn test_follows_continue_tokens() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .and(query_param("continue", "page-2"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(service_list(&[("apps", "second", None)], None)),
            )
            .with_priority(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(service_list(&[("apps", "first", None)], Some("page-2"))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()));
        let services = lister
            .list_services(SELECTOR)
            .await
            .expect("listing should succeed");

        let names: Vec<&str> = services.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["first", "second"]);
    }

    #[tokio::test]
    async fn test_non_success_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "kind": "Status",
                "apiVersion": "v1",
                "metadata": {},
                "status": "Failure",
                "message": "services is forbidden",
                "reason": "Forbidden",
                "code": 403
            })))
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()));
        let err = lister
            .list_services(SELECTOR)
            .await
            .expect_err("listing should fail");

        match err {
            ListError::ApiStatus { code, message, .. } => {
                assert_eq!(code, 403);
                assert!(message.contains("forbidden"));
            }
            other => panic!("expected ApiStatus, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_undecodable_body_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .respond_with(ResponseTemplate::new(200).set_body_string("this is not json"))
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()));
        let err = lister
            .list_services(SELECTOR)
            .await
            .expect_err("listing should fail");

        assert!(
            matches!(err, ListError::Decode { .. }),
            "expected Decode, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let lister = KubeServiceLister::new(client_for("http://127.0.0.1:1"));
        let err = lister
            .list_services(SELECTOR)
            .await
            .expect_err("listing should fail");

        assert!(
            matches!(err, ListError::Transport { .. }),
            "expected Transport, got {err:?}"
        );
    }

    #[tokio::test]
    async fn test_slow_api_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v1/services"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(service_list(&[], None))
                    .set_delay(Duration::from_secs(5)),
            )
            .mount(&server)
            .await;

        let lister = KubeServiceLister::new(client_for(&server.uri()))
            .with_timeout(Duration::from_millis(100));
        let err = lister
            .list_services(SELECTOR)
            .await
            .expect_err("listing should time out");

        assert!(
            matches!(err, ListError::Timeout { timeout } if timeout == Duration::from_millis(100)),
            "expected Timeout, got {err:?}"
        );
    }
}
