use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use std::time::Duration;

use crate::api::handlers;
use crate::api::middleware::request_logging;
use crate::config::ServerConfig;
use crate::error::AppError;
use crate::AppState;

const BODY_LIMIT_BYTES: usize = 10 * 1024 * 1024;

pub fn create_router(state: AppState) -> Router {
    // Public routes
    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api/health", get(handlers::api_health))
        .with_state(state.clone());

    let mut app = Router::new().merge(public_routes);

    // BillDesk redirect routes
    if let Some(billdesk) = &state.billdesk {
        let billdesk_routes = Router::new()
            .route("/createOrder", post(handlers::create_redirect))
            .route("/api/createOrder", post(handlers::create_redirect))
            .with_state(billdesk.clone());
        app = app.merge(billdesk_routes);
    } else {
        tracing::info!("BillDesk not configured, redirect routes disabled");
    }

    // Razorpay order and verification routes
    if let Some(razorpay) = &state.razorpay {
        let razorpay_routes = Router::new()
            .route("/create-order", post(handlers::create_order))
            .route("/verify-payment", post(handlers::verify_payment))
            .with_state(razorpay.clone());
        app = app.merge(razorpay_routes);
    } else {
        tracing::info!("Razorpay not configured, order routes disabled");
    }

    with_layers(app.fallback(not_found), &state.config.server)
}

/// Request logging sits inside the request-id layers so its span carries
/// the same id the client gets back.
fn with_layers(router: Router, config: &ServerConfig) -> Router {
    router
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(cors_layer(config))
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
        .layer(middleware::from_fn(request_logging))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn not_found() -> AppError {
    AppError::NotFound("The requested resource was not found".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::repositories::InMemoryOrderRepository;
    use crate::db::{OrderRepository, SharedOrderRepository};
    use crate::models::OrderStatus;
    use crate::services::billdesk::tests::{config as billdesk_config, FailingRepository, BASE_URL};
    use crate::services::billdesk::BillDeskService;
    use crate::services::razorpay::tests::{service as razorpay_service, RecordingGateway, KEY_SECRET};
    use crate::services::razorpay::RazorpaySignature;
    use crate::api::middleware::RequestId;
    use axum::body::Body;
    use axum::Extension;
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct TestApp {
        router: Router,
        gateway: Arc<RecordingGateway>,
    }

    fn app_with(orders: SharedOrderRepository) -> TestApp {
        let gateway = Arc::new(RecordingGateway::default());
        let billdesk = BillDeskService::new(billdesk_config(Some("shared-secret")), orders.clone());
        let razorpay = razorpay_service(gateway.clone(), orders.clone());

        let state = AppState::from_parts(
            Config::default(),
            orders,
            Some(Arc::new(billdesk)),
            Some(Arc::new(razorpay)),
        );

        TestApp {
            router: create_router(state),
            gateway,
        }
    }

    async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        let request = match body {
            Some(body) => request.body(Body::from(body.to_string())).unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn echo_request_id(Extension(id): Extension<RequestId>) -> String {
        id.0
    }

    #[tokio::test]
    async fn test_logged_request_id_matches_response_header() {
        let router = with_layers(
            Router::new().route("/echo", get(echo_request_id)),
            &ServerConfig::default(),
        );

        let response = router
            .clone()
            .oneshot(Request::builder().uri("/echo").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let header = response.headers()["x-request-id"].to_str().unwrap().to_string();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(std::str::from_utf8(&bytes).unwrap(), header);

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/echo")
                    .header("x-request-id", "req-from-client")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.headers()["x-request-id"], "req-from-client");
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"req-from-client");
    }

    #[tokio::test]
    async fn test_health_endpoints() {
        let app = app_with(Arc::new(InMemoryOrderRepository::new()));

        let (status, body) = send(&app.router, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "OK");
        assert!(body["uptime"].is_number());

        let (status, body) = send(&app.router, Method::GET, "/api/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "UP" }));
    }

    #[tokio::test]
    async fn test_unknown_route_is_json_404() {
        let app = app_with(Arc::new(InMemoryOrderRepository::new()));

        let (status, body) = send(&app.router, Method::GET, "/payment-status", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_billdesk_redirect() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        for uri in ["/createOrder", "/api/createOrder"] {
            let (status, body) =
                send(&app.router, Method::POST, uri, Some(json!({ "amount": 100 }))).await;
            assert_eq!(status, StatusCode::OK);

            let redirect_url = body["redirectUrl"].as_str().unwrap();
            let message = redirect_url.strip_prefix(BASE_URL).unwrap();
            let fields: Vec<&str> = message.split('|').collect();
            assert_eq!(fields.len(), 22);
            assert_eq!(fields[3], "100");
        }
        assert_eq!(orders.len(), 2);
    }

    #[tokio::test]
    async fn test_billdesk_invalid_amount() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (status, body) =
            send(&app.router, Method::POST, "/createOrder", Some(json!({ "amount": "abc" }))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to create encoded redirect");
        assert_eq!(body["details"], "Amount must be a positive number");
        assert!(orders.is_empty());
    }

    #[tokio::test]
    async fn test_billdesk_redirect_survives_storage_failure() {
        let app = app_with(Arc::new(FailingRepository));

        let (status, body) =
            send(&app.router, Method::POST, "/createOrder", Some(json!({ "amount": "499.00" }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["redirectUrl"].as_str().unwrap().starts_with(BASE_URL));
    }

    #[tokio::test]
    async fn test_create_order_minor_units() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/create-order",
            Some(json!({ "amount": 100, "currency": "INR" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["amount"], 10000);
        assert_eq!(body["currency"], "INR");
        assert!(body["key_id"].is_string());
        assert_eq!(app.gateway.requests.lock()[0].amount, 10000);

        let order_id = body["order_id"].as_str().unwrap();
        let stored = orders.find_by_id(order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_create_order_rejects_bad_amount_without_remote_call() {
        let app = app_with(Arc::new(InMemoryOrderRepository::new()));

        for amount in [json!(0), json!("abc"), json!(-10)] {
            let (status, body) = send(
                &app.router,
                Method::POST,
                "/create-order",
                Some(json!({ "amount": amount })),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "VALIDATION_ERROR");
            assert_eq!(body["message"], "Amount must be a positive number");
        }

        let (status, _) =
            send(&app.router, Method::POST, "/create-order", Some(json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(app.gateway.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_create_order_survives_storage_failure() {
        let app = app_with(Arc::new(FailingRepository));

        let (status, body) =
            send(&app.router, Method::POST, "/create-order", Some(json!({ "amount": 250 }))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["order_id"].as_str().unwrap().starts_with("order_"));
    }

    #[tokio::test]
    async fn test_verify_payment_flow() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (_, created) =
            send(&app.router, Method::POST, "/create-order", Some(json!({ "amount": 100 }))).await;
        let order_id = created["order_id"].as_str().unwrap().to_string();
        let signature = RazorpaySignature::sign_payment(&order_id, "pay_29QQoUBi66xm2f", KEY_SECRET).unwrap();

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/verify-payment",
            Some(json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_29QQoUBi66xm2f",
                "razorpay_signature": signature,
            })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({ "status": "ok", "order_id": order_id, "payment_id": "pay_29QQoUBi66xm2f" })
        );
        let stored = orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Paid);
    }

    #[tokio::test]
    async fn test_verify_payment_bad_signature() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (_, created) =
            send(&app.router, Method::POST, "/create-order", Some(json!({ "amount": 100 }))).await;
        let order_id = created["order_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/verify-payment",
            Some(json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_29QQoUBi66xm2f",
                "razorpay_signature": "0".repeat(64),
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["status"], "verification_failed");
        let stored = orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
    }

    #[tokio::test]
    async fn test_verify_payment_missing_signature() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (_, created) =
            send(&app.router, Method::POST, "/create-order", Some(json!({ "amount": 100 }))).await;
        let order_id = created["order_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app.router,
            Method::POST,
            "/verify-payment",
            Some(json!({
                "razorpay_order_id": order_id,
                "razorpay_payment_id": "pay_29QQoUBi66xm2f",
            })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "MISSING_PARAMETERS");
        let stored = orders.find_by_id(&order_id).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Created);
        assert!(stored.payment_id.is_none());
    }

    async fn send_raw(router: &Router, uri: &str, content_type: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut request = Request::builder().method(Method::POST).uri(uri);
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request.body(Body::from(body.to_string())).unwrap();

        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_unreadable_bodies_get_json_errors() {
        let orders = Arc::new(InMemoryOrderRepository::new());
        let app = app_with(orders.clone());

        let (status, body) = send_raw(&app.router, "/createOrder", Some("application/json"), "amount=100").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Failed to create encoded redirect");
        assert!(body["details"].is_string());

        let (status, body) = send_raw(&app.router, "/create-order", None, r#"{"amount":100}"#).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "VALIDATION_ERROR");

        let (status, body) = send_raw(
            &app.router,
            "/verify-payment",
            Some("application/json"),
            r#"{"razorpay_order_id":"order_1","razorpay_payment_id":"pay_1","razorpay_signature":5}"#,
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "MISSING_PARAMETERS");

        assert!(orders.is_empty());
        assert!(app.gateway.requests.lock().is_empty());
    }

    #[tokio::test]
    async fn test_unconfigured_gateways_have_no_routes() {
        let state = AppState::from_parts(
            Config::default(),
            Arc::new(InMemoryOrderRepository::new()),
            None,
            None,
        );
        let router = create_router(state);

        let (status, _) = send(&router, Method::POST, "/create-order", Some(json!({ "amount": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&router, Method::POST, "/createOrder", Some(json!({ "amount": 1 }))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
