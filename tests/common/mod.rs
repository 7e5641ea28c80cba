use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use sales_leaderboard::{Config, Server, test_utils::TestServerBuilder};
use serde_json::Value;
use tower::ServiceExt;

/// Test harness wrapping an application backed by an in-memory store
pub struct TestHarness {
    #[allow(dead_code)]
    pub server: Server,
    pub app: Router,
}

impl TestHarness {
    pub async fn new() -> Self {
        Self::with_config(Config::default()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let server = TestServerBuilder::new().with_config(config).build().await;
        let app = server.create_app();
        Self { server, app }
    }

    /// Make request using the test app
    pub async fn make_request(&self, request: Request<Body>) -> axum::response::Response {
        self.app.clone().oneshot(request).await.unwrap()
    }

    /// Send a request and decode the JSON response body
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.make_request(request).await;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    #[allow(dead_code)]
    pub async fn add_sale(&self, agent: &str, amount: f64, deals: i64) -> (StatusCode, Value) {
        self.send(RequestBuilder::json(
            Method::POST,
            "/api/sales",
            &serde_json::json!({"agentName": agent, "amount": amount, "numberOfSales": deals}),
        ))
        .await
    }

    #[allow(dead_code)]
    pub async fn leaderboard(&self) -> Value {
        let (status, body) = self.send(RequestBuilder::get("/api/sales/leaderboard")).await;
        assert_eq!(status, StatusCode::OK);
        body
    }
}

pub struct RequestBuilder;

impl RequestBuilder {
    pub fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[allow(dead_code)]
    pub fn delete(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::DELETE)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[allow(dead_code)]
    pub fn json(method: Method, uri: &str, body: &Value) -> Request<Body> {
        Self::raw(method, uri, body.to_string())
    }

    #[allow(dead_code)]
    pub fn raw(method: Method, uri: &str, body: impl Into<Body>) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("Content-Type", "application/json")
            .body(body.into())
            .unwrap()
    }
}
