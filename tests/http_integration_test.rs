// Integration tests for the host registry HTTP surface.

#[cfg(test)]
mod http_integration_tests {
    use std::sync::Arc;

    use axum::{body::Body, http::Request};
    use hostreg::api;
    use hostreg::registry::driver::MockRuntimeDriver;
    use hostreg::registry::model::HostRecord;
    use hostreg::registry::Core;
    use tower::ServiceExt;

    fn router() -> axum::Router {
        let core = Arc::new(Core::new(Arc::new(MockRuntimeDriver::default())));
        api::build_router(core)
    }

    async fn get(router: &axum::Router, uri: &str) -> axum::http::Response<Body> {
        router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn body_json<T: serde::de::DeserializeOwned>(response: axum::http::Response<Body>) -> T {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_host_is_placed_in_lee_class_four() {
        let router = router();

        let create = get(&router, "/host/createhost/10.0.0.1&1073741824&4").await;
        assert_eq!(create.status(), axum::http::StatusCode::CREATED);

        let list = get(&router, "/host/list/4&1").await;
        assert_eq!(list.status(), axum::http::StatusCode::OK);
        let hosts: Vec<HostRecord> = body_json(list).await;
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].host_ip, "10.0.0.1");
        assert_eq!(hosts[0].total_cpus, 4096);
    }

    #[tokio::test]
    async fn updateclass_tightens_then_list_reflects_new_class() {
        let router = router();
        get(&router, "/host/createhost/10.0.0.2&1073741824&2").await;

        let update = get(&router, "/host/updateclass/1&10.0.0.2").await;
        assert_eq!(update.status(), axum::http::StatusCode::OK);

        // No longer visible under a class-4 NORMAL query...
        let list = get(&router, "/host/list/4&1").await;
        let hosts: Vec<HostRecord> = body_json(list).await;
        assert!(hosts.is_empty());

        // ...but is visible once the requested class reaches class 1.
        let list = get(&router, "/host/list/1&1").await;
        let hosts: Vec<HostRecord> = body_json(list).await;
        assert_eq!(hosts.len(), 1);
    }

    #[tokio::test]
    async fn unknown_host_update_returns_404() {
        let router = router();
        let response = get(&router, "/host/updateclass/2&10.0.0.99").await;
        assert_eq!(response.status(), axum::http::StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn malformed_numeric_field_is_treated_as_zero_not_rejected() {
        let router = router();
        get(&router, "/host/createhost/10.0.0.3&1073741824&2").await;

        // "not-a-number" cpu utilization coerces to 0.0 rather than 400ing.
        let response = get(&router, "/host/updatecpu/10.0.0.3&not-a-number").await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }

    #[tokio::test]
    async fn killtask_relaxes_class_when_confirmed() {
        let router = router();
        get(&router, "/host/createhost/10.0.0.4&1073741824&2").await;
        get(&router, "/host/updateclass/1&10.0.0.4").await;

        let body = serde_json::json!({
            "cpu": 100,
            "memory": 1024,
            "previousclass": "1",
            "newclass": "4",
            "update": true,
            "ip": "10.0.0.4",
        });

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/host/killtask")
                    .header("content-type", "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), axum::http::StatusCode::OK);

        let list = get(&router, "/host/list/4&1").await;
        let hosts: Vec<HostRecord> = body_json(list).await;
        assert_eq!(hosts.len(), 1);
        assert_eq!(hosts[0].host_ip, "10.0.0.4");
    }

    #[tokio::test]
    async fn health_endpoint_reports_healthy() {
        let router = router();
        let response = get(&router, "/health").await;
        assert_eq!(response.status(), axum::http::StatusCode::OK);
    }
}
