use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use navilead::{Currency, MemoryStorage};
use navilead_server::{AppState, config::ServerConfig, create_router};
use serde_json::{Value, json};
use tower::ServiceExt; // for .oneshot()

const TEMPLATE_HTML: &str = r#"<h1>{quotestitle}</h1>
<table><tr id="services-row"><td>{servicename}</td><td>{servicetotal}</td></tr></table>
<p id="discount-row">-{discountamount}</p>
<p>{Subtotalprice} {Vatprice} <b>{Totalprice}</b></p>"#;

fn app() -> Router {
    create_router(AppState::new(MemoryStorage::new(), ServerConfig::default()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn sample_quote() -> Value {
    json!({
        "id": "q-1",
        "title": "Roof <repair>",
        "services": [
            { "id": "s1", "name": "Service", "pricePerUnit": 100, "quantity": 1, "discountPercent": 10, "selected": true },
            { "id": "s2", "name": "Optional", "pricePerUnit": 40, "quantity": 1, "selected": false }
        ]
    })
}

#[tokio::test]
async fn test_health_check() {
    let (status, body) = send(&app(), "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_price_quote() {
    let (status, body) = send(&app(), "POST", "/api/pricing/quote", Some(sample_quote())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["subtotal"], 90.0);
    assert_eq!(body["data"]["vatAmount"], 22.5);
    assert_eq!(body["data"]["total"], 112.5);
}

#[tokio::test]
async fn test_price_quote_rejects_bad_percent() {
    let mut quote = sample_quote();
    quote["overallDiscount"] = json!(150);

    let (status, body) = send(&app(), "POST", "/api/pricing/quote", Some(quote)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["status"], 422);
    assert!(body["error"].as_str().unwrap().contains("overallDiscount"));
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = app();
    let request = Request::builder()
        .method("POST")
        .uri("/api/pricing/quote")
        .header("content-type", "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_billing_endpoints_use_default_vat() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/pricing/subscription",
        Some(json!({ "plan": { "id": "pro", "name": "Pro", "monthlyPrice": 299 }, "interval": "monthly" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["gross"], 373.75);

    let (status, body) = send(
        &app,
        "POST",
        "/api/pricing/sms-credits",
        Some(json!({ "package": { "id": "sms-100", "credits": 100, "price": 49 }, "quantity": 2, "vatPercent": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["creditsGranted"], 200);
    assert_eq!(body["data"]["charge"]["gross"], 98.0);
}

#[tokio::test]
async fn test_billing_endpoints_use_default_currency() {
    let config = ServerConfig {
        default_currency: Currency::Eur,
        ..ServerConfig::default()
    };
    let app = create_router(AppState::new(MemoryStorage::new(), config));

    let (status, body) = send(
        &app,
        "POST",
        "/api/pricing/subscription",
        Some(json!({ "plan": { "id": "pro", "name": "Pro", "monthlyPrice": 299 } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["currency"], "EUR");

    let (status, body) = send(
        &app,
        "POST",
        "/api/pricing/sms-credits",
        Some(json!({ "package": { "id": "sms-100", "credits": 100, "price": 49, "currency": "SEK" } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["charge"]["currency"], "SEK");
}

#[tokio::test]
async fn test_oversized_amounts_are_unprocessable() {
    let quote = json!({
        "title": "Huge",
        "services": [{ "id": "s1", "name": "Big", "pricePerUnit": 1e20, "quantity": 1e20, "selected": true }]
    });
    let (status, body) = send(&app(), "POST", "/api/pricing/quote", Some(quote)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("too large"));

    let (status, _) = send(
        &app(),
        "POST",
        "/api/pricing/subscription",
        Some(json!({ "plan": { "id": "pro", "name": "Pro", "monthlyPrice": 1e30 } })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_template_lifecycle() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/templates",
        Some(json!({ "id": "classic", "name": "Classic", "content": TEMPLATE_HTML })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["id"], "classic");

    let (status, body) = send(&app, "GET", "/api/templates", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        "/api/templates/classic/render",
        Some(json!({ "quote": sample_quote(), "offerDate": "2024-09-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let html = body["data"]["html"].as_str().unwrap();
    assert!(html.contains("<h1>Roof &lt;repair&gt;</h1>"));
    assert!(html.contains("<tr><td>Service</td><td>90,00 kr.</td></tr>"));
    assert!(!html.contains("Optional"));
    assert!(!html.contains("discount-row"));
    assert!(html.contains("<b>112,50 kr.</b>"));
    assert_eq!(body["data"]["breakdown"]["total"], 112.5);

    let (status, _) = send(&app, "DELETE", "/api/templates/classic", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, "GET", "/api/templates/classic", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn test_invalid_template_is_refused() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/templates",
        Some(json!({ "id": "broken", "name": "Broken", "content": "<p>{quotestitle}</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("#services-row"));
}

#[tokio::test]
async fn test_validate_and_preview() {
    let app = app();

    let (status, body) = send(
        &app,
        "POST",
        "/api/templates/validate",
        Some(json!({ "content": "<p>{quotestitle} {mystery}</p>" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["valid"], false);
    assert_eq!(body["data"]["unknown"], json!(["{mystery}"]));

    let (status, body) = send(
        &app,
        "POST",
        "/api/templates/preview",
        Some(json!({ "content": TEMPLATE_HTML, "quote": sample_quote() })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["html"].as_str().unwrap().contains("112,50 kr."));
}

#[tokio::test]
async fn test_activity_feed() {
    let (status, body) = send(
        &app(),
        "POST",
        "/api/activities/feed",
        Some(json!({
            "records": [
                { "type": "lead", "id": "l1", "createdAt": "2024-01-01T10:00:00Z", "name": "Anna" },
                { "type": "sms", "id": "s1", "createdAt": "2024-01-02T10:00:00Z", "recipient": "+45", "message": "Hi" }
            ],
            "limit": 1
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["counts"]["leads"], 1);
    assert_eq!(body["data"]["feed"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["feed"][0]["id"], "s1");
}

#[tokio::test]
async fn test_email_preview() {
    let app = app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/emails/preview",
        Some(json!({
            "kind": "password_reset",
            "user": { "name": "Jens", "email": "jens@example.dk" },
            "resetUrl": "https://app.example.dk/reset/abc",
            "expiresInMinutes": 15
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["text"].as_str().unwrap().contains("15 minutes"));

    let (status, _) = send(
        &app,
        "POST",
        "/api/emails/preview",
        Some(json!({
            "kind": "subscription_confirmation",
            "user": { "name": "Jens", "email": "jens@example.dk" },
            "plan": { "id": "pro", "name": "Pro", "monthlyPrice": 299 },
            "charge": { "description": "Pro (monthly)", "net": 299, "vatPercent": 25, "vat": 74.75, "gross": 373.75, "currency": "DKK" },
            "nextBillingDate": "01-07-2024"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
