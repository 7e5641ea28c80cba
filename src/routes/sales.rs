use crate::{
    database::entities::SaleRecord,
    error::AppError,
    ingestion::SaleInput,
    leaderboard::RankedEntry,
    routes::response::ApiResponse,
    server::Server,
};
use axum::{
    Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

/// Create sales and leaderboard routes, mounted under `/api/sales`
pub fn create_sales_routes() -> Router<Server> {
    Router::new()
        .route(
            "/",
            post(add_sale).get(get_all_sales).delete(delete_all_sales),
        )
        .route("/bulk", post(add_bulk_sales))
        .route("/leaderboard", get(get_leaderboard))
}

/// Body of a bulk upload. `sales` is left untyped so a non-array value is a
/// validation failure instead of a body parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct BulkSalesRequest {
    #[serde(default)]
    pub sales: Option<Value>,
}

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(body)| body).map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge(rejection.body_text())
        } else {
            AppError::BadRequest(rejection.body_text())
        }
    })
}

async fn add_sale(
    State(server): State<Server>,
    payload: Result<Json<SaleInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<SaleRecord>>), AppError> {
    let input = json_body(payload)?;

    let record = server
        .ingestion
        .add_sale(input)
        .await
        .map_err(AppError::from_sales("Server error while adding sale"))?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::data(record).with_message("Sale added successfully")),
    ))
}

async fn add_bulk_sales(
    State(server): State<Server>,
    payload: Result<Json<BulkSalesRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<Vec<SaleRecord>>>), AppError> {
    let request = json_body(payload)?;

    let records = server
        .ingestion
        .add_bulk_sales(request.sales.as_ref())
        .await
        .map_err(AppError::from_sales("Server error while adding bulk sales"))?;

    let message = format!("{} sales added successfully", records.len());
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::list(records).with_message(message)),
    ))
}

async fn get_all_sales(
    State(server): State<Server>,
) -> Result<Json<ApiResponse<Vec<SaleRecord>>>, AppError> {
    let records = server
        .database
        .sales()
        .list_all()
        .await
        .map_err(AppError::storage("Server error while fetching sales"))?;

    Ok(Json(ApiResponse::list(records)))
}

async fn delete_all_sales(
    State(server): State<Server>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let removed = server
        .database
        .sales()
        .delete_all()
        .await
        .map_err(AppError::storage("Server error while deleting sales"))?;

    info!(removed, "All sales deleted");
    Ok(Json(
        ApiResponse::message("All sales deleted successfully").with_count(removed as usize),
    ))
}

async fn get_leaderboard(
    State(server): State<Server>,
) -> Result<Json<ApiResponse<Vec<RankedEntry>>>, AppError> {
    let leaderboard = server
        .leaderboard
        .get_leaderboard()
        .await
        .map_err(AppError::leaderboard("Server error while fetching leaderboard"))?;

    Ok(Json(ApiResponse::list(leaderboard)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{TestServerBuilder, insert_unchecked_sale};
    use rust_decimal::Decimal;
    use axum::{
        body::{Body, to_bytes},
        http::{Method, Request},
    };
    use serde_json::json;
    use tower::ServiceExt;

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header("content-type", "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_test_app() -> Router {
        let server = TestServerBuilder::new().build().await;
        create_sales_routes().with_state(server)
    }

    #[tokio::test]
    async fn test_add_sale_created() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/",
            Some(json!({"agentName": " Alice ", "amount": 99.5, "numberOfSales": 2})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["message"], json!("Sale added successfully"));
        assert_eq!(body["data"]["agentName"], json!("Alice"));
        assert_eq!(body["data"]["amount"], json!(99.5));
        assert_eq!(body["data"]["numberOfSales"], json!(2));
        assert!(body["data"]["recordedAt"].is_string());
    }

    #[tokio::test]
    async fn test_add_sale_validation_failure() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/",
            Some(json!({"agentName": "X", "amount": -5})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body,
            json!({"success": false, "message": "Amount cannot be negative"})
        );
    }

    #[tokio::test]
    async fn test_malformed_json_is_structured_bad_request() {
        let app = create_test_app().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], json!(false));
        assert!(body["message"].is_string());
    }

    #[tokio::test]
    async fn test_bulk_reports_count() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/bulk",
            Some(json!({"sales": [{"agentName": "A", "amount": 10}, {"amount": 20}]})),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], json!("1 sales added successfully"));
        assert_eq!(body["count"], json!(1));
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bulk_requires_array() {
        let app = create_test_app().await;

        let (status, body) = send(&app, Method::POST, "/bulk", Some(json!({"sales": []}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Please provide an array of sales"));

        let (status, body) = send(&app, Method::POST, "/bulk", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], json!("Please provide an array of sales"));
    }

    #[tokio::test]
    async fn test_list_delete_and_leaderboard() {
        let app = create_test_app().await;

        for (agent, amount, deals) in [("A", 100, 1), ("B", 200, 2), ("C", 200, 1)] {
            let (status, _) = send(
                &app,
                Method::POST,
                "/",
                Some(json!({"agentName": agent, "amount": amount, "numberOfSales": deals})),
            )
            .await;
            assert_eq!(status, StatusCode::CREATED);
        }

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(3));

        let (status, body) = send(&app, Method::GET, "/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "success": true,
                "count": 3,
                "data": [
                    {"rank": 1, "agentName": "B", "totalSales": 200.0, "totalDeals": 2},
                    {"rank": 1, "agentName": "C", "totalSales": 200.0, "totalDeals": 1},
                    {"rank": 3, "agentName": "A", "totalSales": 100.0, "totalDeals": 1}
                ]
            })
        );

        let (status, body) = send(&app, Method::DELETE, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], json!("All sales deleted successfully"));
        assert_eq!(body["count"], json!(3));

        let (_, body) = send(&app, Method::GET, "/leaderboard", None).await;
        assert_eq!(body, json!({"success": true, "count": 0, "data": []}));
    }

    #[tokio::test]
    async fn test_oversized_amounts_are_rejected_and_store_stays_readable() {
        let app = create_test_app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/",
            Some(json!({"agentName": "B", "amount": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        for amount in [
            "50000000000000000000000000000",
            "50000000000000000000000000000",
            "79228162514264337593543950335",
        ] {
            let (status, body) = send(
                &app,
                Method::POST,
                "/",
                Some(json!({"agentName": "Whale", "amount": amount})),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(
                body,
                json!({"success": false, "message": "Amount cannot exceed 999999999999.99"})
            );
        }

        let (status, body) = send(&app, Method::GET, "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], json!(1));

        let (status, body) = send(&app, Method::GET, "/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["data"],
            json!([{"rank": 1, "agentName": "B", "totalSales": 10.0, "totalDeals": 1}])
        );
    }

    #[tokio::test]
    async fn test_bulk_drops_oversized_amounts() {
        let app = create_test_app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/bulk",
            Some(json!({"sales": [
                {"agentName": "A", "amount": "999999999999.99"},
                {"agentName": "B", "amount": "79228162514264337593543950335"}
            ]})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["count"], json!(1));

        let (status, body) = send(&app, Method::GET, "/leaderboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["agentName"], json!("A"));
        assert_eq!(body["data"][0]["totalSales"], json!(999999999999.99));
    }

    #[tokio::test]
    async fn test_leaderboard_overflow_is_structured_server_error() {
        let server = TestServerBuilder::new().build().await;
        let huge: Decimal = "50000000000000000000000000000".parse().unwrap();
        insert_unchecked_sale(&server.database, "Whale", huge).await;
        insert_unchecked_sale(&server.database, "Whale", huge).await;
        let app = create_sales_routes().with_state(server);

        let (status, body) = send(&app, Method::GET, "/leaderboard", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], json!(false));
        assert_eq!(
            body["message"],
            json!("Server error while fetching leaderboard")
        );
        assert_eq!(
            body["error"],
            json!("Total sales for agent 'Whale' overflowed")
        );
    }
}
