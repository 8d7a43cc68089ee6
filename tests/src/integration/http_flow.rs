//! # HTTP Flow
//!
//! Gateway router over a file-backed engine, driven through `tower::oneshot`.

#[cfg(test)]
mod tests {
    use crate::fixtures::{file_engine, small_pool, FileEngine};
    use axum::body::{to_bytes, Body};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{header, Request, StatusCode};
    use axum::response::Response;
    use axum::Router;
    use lp_api_gateway::middleware::RateLimitLayer;
    use lp_api_gateway::{build_router, AppState, GatewayConfig, CLAIM_PATH};
    use lp_pool_engine::AllocationApi;
    use serde_json::{json, Value};
    use std::net::SocketAddr;
    use std::sync::Arc;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(engine: &Arc<FileEngine>) -> Router {
        let mut config = GatewayConfig::default();
        config.rate_limit.enabled = false;
        config.static_files.enabled = false;
        let state = AppState {
            engine: Arc::clone(engine) as Arc<dyn AllocationApi>,
        };
        build_router(state, &config, RateLimitLayer::new(config.rate_limit.clone()))
            .layer(MockConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50000))))
    }

    fn claim(name: &str, forwarded_for: &str) -> Request<Body> {
        let body = json!({ "name": name, "accountNumber": "123", "bank": "MB" });
        Request::builder()
            .method("POST")
            .uri(CLAIM_PATH)
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-forwarded-for", forwarded_for)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_claims_drain_pool_and_are_listed() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));
        let app = app(&engine);

        for n in 0..7 {
            let response = app
                .clone()
                .oneshot(claim(&format!("N{n}"), &format!("10.2.0.{n}")))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let body = json_body(response).await;
            assert_eq!(body["remainingCount"], 6 - n);
        }

        let response = app.clone().oneshot(claim("Late", "10.2.0.99")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(Request::builder().uri("/recipients").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["totalRecipients"], 7);
        assert_eq!(body["remainingCount"], 0);
        assert_eq!(body["recipients"][0]["ip"], "10.2.0.0");

        let log = std::fs::read_to_string(dir.path().join("lixi.log")).unwrap();
        assert!(log.contains("IP: 10.2.0.6"));
    }

    #[tokio::test]
    async fn test_forwarded_origin_is_first_entry() {
        let dir = TempDir::new().unwrap();
        let engine = Arc::new(file_engine(dir.path(), small_pool()));
        let app = app(&engine);

        let response = app
            .clone()
            .oneshot(claim("A", "203.0.113.7, 10.0.0.1"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app.oneshot(claim("B", "203.0.113.7")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(engine.view().records[0].origin_address, "203.0.113.7");
    }
}
