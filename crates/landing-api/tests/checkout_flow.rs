//! End-to-end checkout flow against mocked MailerLite and Conversions API servers.

use axum::http::{header::USER_AGENT, HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use landing_api::{create_router, AppConfig, AppState};
use landing_core::{Currency, LandingConfig, Offering, Price, WhatsappContact};
use landing_notify::{
    hash_email, MailerLiteClient, MailerLiteConfig, MetaPixelTracker, OutcomeNotifier, PixelConfig,
};
use landing_wompi::{MerchantConfig, SessionLauncher, WIDGET_SCRIPT_URL};
use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// sha256("ORDER-4245000000COPtest_integrity_s3cr3t")
const ORDER_42_SIGNATURE: &str =
    "9ecedf9650dcb4ff91458936c4cd321ca1443e444265a6d159d2e154a13eff3d";

const PIXEL_EVENTS_PATH: &str = "/v19.0/123456/events";

struct Harness {
    server: TestServer,
    // Dropping a MockServer verifies its `.expect(n)` counts
    mailerlite: MockServer,
    pixel: MockServer,
}

async fn harness() -> Harness {
    let mailerlite = MockServer::start().await;
    let pixel = MockServer::start().await;

    let offering = Offering::new(
        "experiencia-completa",
        "Experiencia Completa",
        Price::from_cents(45_000_000, Currency::COP),
    )
    .with_promo(25, Some("Bono para primeros valientes".into()))
    .with_seats(20);

    let landing = LandingConfig {
        offering: offering.clone(),
        contact: Some(WhatsappContact {
            number: "573001234567".into(),
            message: "Hola, quiero más info".into(),
        }),
    };

    let http = reqwest::Client::new();
    let offering = Arc::new(offering);

    let tracker = Arc::new(MetaPixelTracker::new(
        PixelConfig::new("123456", "px-token").with_api_base_url(pixel.uri()),
        http.clone(),
    ));
    let subscribers = Arc::new(MailerLiteClient::new(
        MailerLiteConfig::new("ml-key").with_api_base_url(mailerlite.uri()),
        http,
    ));

    let merchant = MerchantConfig::new("pub_test_abc", "test_integrity_s3cr3t", offering.price)
        .unwrap()
        .with_redirect_url("https://example.com/gracias");
    let launcher = SessionLauncher::new(Arc::new(merchant), offering.clone(), tracker.clone())
        .unwrap();
    let notifier = OutcomeNotifier::new(subscribers, tracker, offering);

    let config = AppConfig {
        host: "127.0.0.1".into(),
        port: 0,
        environment: "test".into(),
        offering_path: None,
    };
    let state = AppState::from_parts(config, landing, launcher, Arc::new(notifier));

    Harness {
        server: TestServer::new(create_router(state)).unwrap(),
        mailerlite,
        pixel,
    }
}

fn callback(status: &str, reference: Option<&str>) -> Value {
    let mut transaction = json!({
        "id": "1234-1610641025-49201",
        "status": status,
        "customerEmail": "ana@example.com",
        "amountInCents": 45000000,
        "currency": "COP",
        "paymentMethodType": "CARD"
    });
    if let Some(reference) = reference {
        transaction["reference"] = json!(reference);
    }
    json!({ "transaction": transaction })
}

#[tokio::test]
async fn test_health() {
    let h = harness().await;

    let response = h.server.get("/health").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["status"], "healthy");
}

#[tokio::test]
async fn test_price_card() {
    let h = harness().await;

    let card: Value = h.server.get("/api/v1/offering").await.json();
    assert_eq!(card["name"], "Experiencia Completa");
    assert_eq!(card["price"], "450.000");
    assert_eq!(card["list_price"], "600.000");
    assert_eq!(card["discount_percentage"], 25);
    assert_eq!(card["promo_label"], "Bono para primeros valientes");
    assert_eq!(card["seats"], 20);
}

#[tokio::test]
async fn test_checkout_returns_signed_descriptor_and_reports_intent() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .and(body_partial_json(json!({
            "data": [{ "event_name": "InitiateCheckout", "event_id": "InitiateCheckout-ORDER-42" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"events_received": 1})))
        .expect(1)
        .mount(&h.pixel)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&h.mailerlite)
        .await;

    let response = h
        .server
        .post("/api/v1/checkout")
        .json(&json!({
            "reference": "ORDER-42",
            "customer": {
                "email": "ana@example.com",
                "full_name": "Ana Pérez",
                "phone_number": "3001234567",
                "phone_number_prefix": "+57"
            }
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["widget_script_url"], WIDGET_SCRIPT_URL);

    let session = &body["session"];
    assert_eq!(session["reference"], "ORDER-42");
    assert_eq!(session["currency"], "COP");
    assert_eq!(session["amountInCents"], 45000000);
    assert_eq!(session["publicKey"], "pub_test_abc");
    assert_eq!(session["signature"]["integrity"], ORDER_42_SIGNATURE);
    assert_eq!(session["redirectUrl"], "https://example.com/gracias");
    assert_eq!(session["customerData"]["phoneNumber"], "3001234567");
    assert_eq!(session["customerData"]["phoneNumberPrefix"], "+57");
    assert_eq!(session["customerData"]["fullName"], "Ana Pérez");

    // The secret itself never reaches the browser
    assert!(!body.to_string().contains("test_integrity_s3cr3t"));
}

#[tokio::test]
async fn test_checkout_without_phone_is_anonymous() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.pixel)
        .await;

    let response = h
        .server
        .post("/api/v1/checkout")
        .json(&json!({ "customer": { "email": "ana@example.com", "phone_number": "3001234567" } }))
        .await;
    response.assert_status_ok();

    let session = &response.json::<Value>()["session"];
    assert!(session.get("customerData").is_none());
    assert!(!session["reference"].as_str().unwrap().is_empty());
    assert_eq!(session["signature"]["integrity"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn test_checkout_survives_pixel_outage() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
        .expect(1)
        .mount(&h.pixel)
        .await;

    let response = h
        .server
        .post("/api/v1/checkout")
        .json(&json!({ "reference": "ORDER-42" }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>()["session"]["signature"]["integrity"],
        ORDER_42_SIGNATURE
    );
}

#[tokio::test]
async fn test_checkout_rejects_blank_reference() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/v1/checkout")
        .json(&json!({ "reference": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(response.json::<Value>()["code"], 400);
}

#[tokio::test]
async fn test_approved_outcome_notifies_list_and_pixel_once() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .and(header("authorization", "Bearer ml-key"))
        .and(body_partial_json(json!({
            "email": "ana@example.com",
            "fields": {
                "purchase_id": "ORDER-42",
                "purchase_amount": 450000.0,
                "purchase_currency": "COP"
            }
        })))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&h.mailerlite)
        .await;
    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .and(body_partial_json(json!({
            "data": [{
                "event_name": "Purchase",
                "event_id": "Purchase-ORDER-42",
                "user_data": { "em": [hash_email("ana@example.com")] },
                "custom_data": { "content_ids": ["ORDER-42"], "value": 450000.0, "currency": "COP" }
            }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.pixel)
        .await;

    let response = h
        .server
        .post("/api/v1/checkout/outcome")
        .json(&callback("APPROVED", Some("ORDER-42")))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["disposition"], "notified");
    assert_eq!(body["subscriber"]["status"], "sent");
    assert_eq!(body["conversion"]["status"], "sent");
}

#[tokio::test]
async fn test_declined_outcome_notifies_nobody() {
    let h = harness().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&h.mailerlite)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.pixel)
        .await;

    for status in ["DECLINED", "VOIDED", "ERROR"] {
        let response = h
            .server
            .post("/api/v1/checkout/outcome")
            .json(&callback(status, Some("ORDER-42")))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["disposition"], "ignored");
        assert_eq!(body["status"], status);
    }
}

#[tokio::test]
async fn test_subscriber_failure_still_reports_purchase() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(
            ResponseTemplate::new(422).set_body_json(json!({"message": "Invalid email"})),
        )
        .expect(1)
        .mount(&h.mailerlite)
        .await;
    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.pixel)
        .await;

    let response = h
        .server
        .post("/api/v1/checkout/outcome")
        .json(&callback("APPROVED", Some("ORDER-42")))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["subscriber"]["status"], "failed");
    assert_eq!(
        body["subscriber"]["error"],
        "Provider error [mailerlite]: Invalid email"
    );
    assert_eq!(body["conversion"]["status"], "sent");
}

#[tokio::test]
async fn test_outcome_rejects_malformed_callbacks() {
    let h = harness().await;

    let response = h
        .server
        .post("/api/v1/checkout/outcome")
        .text("not json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h
        .server
        .post("/api/v1/checkout/outcome")
        .json(&json!({ "transaction": { "status": "APPROVED" } }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = h
        .server
        .post("/api/v1/checkout/outcome")
        .json(&callback("APPROVED", None))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert_eq!(
        response.json::<Value>()["error"],
        "Invalid request: transaction.reference is required"
    );
}

#[tokio::test]
async fn test_whatsapp_redirect() {
    let h = harness().await;

    let response = h.server.get("/contact/whatsapp").await;
    response.assert_status(StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        response.header("location"),
        "https://wa.me/573001234567?text=Hola%2C+quiero+m%C3%A1s+info"
    );
}

#[tokio::test]
async fn test_outcome_with_foreign_charge_is_rejected() {
    let h = harness().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&h.mailerlite)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&h.pixel)
        .await;

    let mut other_amount = callback("APPROVED", Some("ORDER-42"));
    other_amount["transaction"]["amountInCents"] = json!(100);

    let mut other_currency = callback("APPROVED", Some("ORDER-42"));
    other_currency["transaction"]["currency"] = json!("USD");

    for body in [other_amount, other_currency] {
        let response = h.server.post("/api/v1/checkout/outcome").json(&body).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"]
            .as_str()
            .unwrap()
            .contains("does not match"));
    }
}

#[tokio::test]
async fn test_events_carry_browser_details() {
    let h = harness().await;

    let user_data = json!({
        "client_user_agent": "Mozilla/5.0 (X11; Linux x86_64)",
        "client_ip_address": "203.0.113.7"
    });

    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .and(body_partial_json(json!({
            "data": [{ "event_name": "InitiateCheckout", "user_data": user_data }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.pixel)
        .await;
    Mock::given(method("POST"))
        .and(path(PIXEL_EVENTS_PATH))
        .and(body_partial_json(json!({
            "data": [{ "event_name": "Purchase", "user_data": user_data }]
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&h.pixel)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/subscribers"))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&h.mailerlite)
        .await;

    let user_agent = HeaderValue::from_static("Mozilla/5.0 (X11; Linux x86_64)");
    let forwarded_for = HeaderName::from_static("x-forwarded-for");
    let hops = HeaderValue::from_static("203.0.113.7, 10.0.0.1");

    h.server
        .post("/api/v1/checkout")
        .add_header(USER_AGENT, user_agent.clone())
        .add_header(forwarded_for.clone(), hops.clone())
        .json(&json!({ "reference": "ORDER-42" }))
        .await
        .assert_status_ok();

    h.server
        .post("/api/v1/checkout/outcome")
        .add_header(USER_AGENT, user_agent)
        .add_header(forwarded_for, hops)
        .json(&callback("APPROVED", Some("ORDER-42")))
        .await
        .assert_status_ok();
}
