use crate::{health::HealthReport, server::Server};
use axum::{
    Router,
    extract::{Query, State},
    http::StatusCode,
    response::Json,
    routing::get,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct HealthCheckQuery {
    #[serde(default)]
    check: Option<String>,
}

/// Create health check routes
///
/// `GET /health` reports liveness; `?check=all` or `?check=<name>` also runs
/// the registered component checks.
pub fn create_health_routes() -> Router<Server> {
    Router::new().route("/", get(health_check))
}

async fn health_check(
    State(server): State<Server>,
    Query(params): Query<HealthCheckQuery>,
) -> (StatusCode, Json<HealthReport>) {
    let report = server
        .health_service
        .check_health(params.check.as_deref())
        .await;

    let status = if report.success {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestServerBuilder;
    use axum::{
        body::{Body, to_bytes},
        http::Request,
    };
    use serde_json::Value;
    use tower::ServiceExt;

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let server = TestServerBuilder::new().build().await;
        let app = create_health_routes().with_state(server);

        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_check_basic() {
        let (status, body) = get_json("/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert!(body["checks"].as_object().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_health_check_all_runs_database_check() {
        let (status, body) = get_json("/?check=all").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"]["database"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_health_check_with_unknown_query() {
        let (status, body) = get_json("/?check=unknown").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["checks"].as_object().unwrap().is_empty());
    }
}
