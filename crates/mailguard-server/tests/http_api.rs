//! HTTP API Tests
//!
//! Drives the router in-process with `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use metrics_exporter_prometheus::PrometheusBuilder;
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

use mailguard_classifiers::{normalize, EmailPipeline, LabelCodec, PiiMasker, TextClassifier};
use mailguard_server::{create_router, AppState, ServerConfig};

fn pipeline() -> EmailPipeline {
    let masker = PiiMasker::new().unwrap();
    let emails = [
        ("My card 4111 1111 1111 1111 was charged twice, refund please", "Billing"),
        ("Refund the duplicate payment on my invoice", "Billing"),
        ("I cannot login, my password reset link expired", "Account"),
        ("Account locked after too many password attempts", "Account"),
    ];

    let labels = LabelCodec::fit(emails.iter().map(|(_, label)| *label)).unwrap();
    let docs: Vec<String> = emails
        .iter()
        .map(|(body, _)| normalize(&masker.mask(body).masked_text))
        .collect();
    let codes = labels
        .encode_all(&emails.iter().map(|(_, label)| *label).collect::<Vec<_>>())
        .unwrap();

    let mut model = TextClassifier::default();
    model.fit(&docs, &codes).unwrap();

    EmailPipeline::new(Arc::new(masker), Arc::new(model), Arc::new(labels)).unwrap()
}

fn state_with(config: ServerConfig, pipeline: Option<EmailPipeline>) -> AppState {
    let handle = PrometheusBuilder::new().build_recorder().handle();
    AppState::from_parts(config, Arc::new(PiiMasker::new().unwrap()), pipeline, handle)
}

fn app() -> Router {
    create_router(state_with(ServerConfig::default(), Some(pipeline())))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"OK");
}

#[tokio::test]
async fn test_classify_email() {
    let (status, body) = send(
        app(),
        post_json(
            "/classify",
            json!({ "input_email_body": "Please refund my payment, call me on 9876543210" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["category_of_the_email"], "Billing");
    assert_eq!(body["masked_email"], "Please refund my payment, call me on [phone_number]");
    assert_eq!(
        body["input_email_body"],
        "Please refund my payment, call me on 9876543210"
    );
    assert_eq!(
        body["list_of_masked_entities"],
        json!([{
            "position": [37, 47],
            "classification": "phone_number",
            "entity": "9876543210"
        }])
    );
}

#[tokio::test]
async fn test_blank_email_rejected() {
    let (status, body) = send(app(), post_json("/classify", json!({ "input_email_body": "   " }))).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["type"], "invalid_input");
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let request = Request::builder()
        .method("POST")
        .uri("/classify")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "invalid_request");

    let (status, _) = send(app(), post_json("/classify", json!({ "body": "hi" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_classify_without_model() {
    let app = create_router(state_with(ServerConfig::default(), None));
    let (status, body) = send(
        app.clone(),
        post_json("/classify", json!({ "input_email_body": "refund please" })),
    )
    .await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"]["type"], "model_unavailable");

    // Masking does not need the model.
    let (status, body) = send(
        app,
        post_json("/mask", json!({ "input_email_body": "CVV 123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["masked_email"], "CVV [cvv_no]");
}

#[tokio::test]
async fn test_mask_then_demask() {
    let original = "Hi, my name is John Smith, my email is john@x.com";
    let (status, masked) = send(app(), post_json("/mask", json!({ "input_email_body": original }))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(masked["masked_email"], "Hi, my name is [full_name], my email is [email]");
    assert_eq!(masked["list_of_masked_entities"].as_array().unwrap().len(), 2);

    let (status, restored) = send(app(), post_json("/demask", masked)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(restored["demasked_email"], original);
}

#[tokio::test]
async fn test_body_limit() {
    let config = ServerConfig {
        max_body_bytes: 32,
        ..ServerConfig::default()
    };
    let app = create_router(state_with(config, Some(pipeline())));

    let body = json!({ "input_email_body": "x".repeat(100) }).to_string();
    let request = Request::builder()
        .method("POST")
        .uri("/mask")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::CONTENT_LENGTH, body.len())
        .body(Body::from(body))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_stats_track_requests() {
    let app = app();

    send(
        app.clone(),
        post_json("/classify", json!({ "input_email_body": "Refund my invoice, CVV 123" })),
    )
    .await;
    send(app.clone(), post_json("/classify", json!({ "input_email_body": "" }))).await;

    let (status, stats) = send(
        app,
        Request::builder().uri("/stats").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_requests"], 2);
    assert_eq!(stats["total_errors"], 1);
    assert_eq!(stats["entities_masked"]["cvv_no"], 1);
    assert_eq!(stats["categories"]["Billing"], 1);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let response = app()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route() {
    let response = app()
        .oneshot(Request::builder().uri("/v1/unknown").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
