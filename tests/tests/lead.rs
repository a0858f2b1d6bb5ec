//! Tests for lead capture: rate limiting, spam gates, recaptcha, the sink,
//! and notifications.

use std::time::Duration;

use axum::http::StatusCode;
use integration_tests::fixtures::{self, lead_payload, lead_with, lead_without};
use integration_tests::setup::{TestContext, TestOptions, START_MS};
use serde_json::json;

fn with_recaptcha() -> TestOptions {
    TestOptions {
        recaptcha_secret: Some("server-secret".to_string()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_valid_lead_is_stored() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post("/api/lead")
        .add_header("X-Forwarded-For", "198.51.100.7, 10.0.0.1")
        .json(&lead_payload())
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body, json!({ "ok": true }));

    let records = ctx.sink.records();
    assert_eq!(records.len(), 1);
    let record = &records[0];
    assert_eq!(record.lead.name, "Ada Lovelace");
    assert_eq!(record.lead.email, "ada@example.com");
    assert_eq!(record.lead.source, "widget:en");
    assert_eq!(record.client_id, "198.51.100.7");
    assert_eq!(record.submitted_at.timestamp_millis(), START_MS as i64);
}

#[tokio::test]
async fn test_remaining_header_counts_down() {
    let ctx = TestContext::with_options(TestOptions {
        max_requests: 3,
        ..Default::default()
    })
    .await;
    let server = ctx.server();

    for expected in ["2", "1", "0"] {
        let response = server
            .post("/api/lead")
            .add_header("X-Forwarded-For", "203.0.113.1")
            .json(&lead_payload())
            .await;
        response.assert_status_ok();
        assert_eq!(response.header("X-RateLimit-Remaining"), expected);
    }
}

/// N submissions pass, the next one is 429 with a retry hint
#[tokio::test]
async fn test_rate_limit_after_max() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    for _ in 0..10 {
        server
            .post("/api/lead")
            .add_header("X-Forwarded-For", "203.0.113.5")
            .json(&lead_payload())
            .await
            .assert_status_ok();
    }

    let response = server
        .post("/api/lead")
        .add_header("X-Forwarded-For", "203.0.113.5")
        .json(&lead_payload())
        .await;

    response.assert_status(StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.header("Retry-After"), "600");
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "RATE_001");
    assert_eq!(ctx.sink.count(), 10);

    // A different client is unaffected
    server
        .post("/api/lead")
        .add_header("X-Forwarded-For", "203.0.113.6")
        .json(&lead_payload())
        .await
        .assert_status_ok();
}

/// Rejected submissions still use up the window
#[tokio::test]
async fn test_rate_limit_counts_invalid_submissions() {
    let ctx = TestContext::with_options(TestOptions {
        max_requests: 2,
        ..Default::default()
    })
    .await;
    let server = ctx.server();

    for _ in 0..2 {
        server
            .post("/api/lead")
            .add_header("X-Forwarded-For", "203.0.113.9")
            .json(&lead_with("website", json!("http://spam.example")))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server
        .post("/api/lead")
        .add_header("X-Forwarded-For", "203.0.113.9")
        .json(&lead_payload())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_rate_limit_resets_after_window() {
    let ctx = TestContext::with_options(TestOptions {
        max_requests: 1,
        window_ms: 60_000,
        ..Default::default()
    })
    .await;
    let server = ctx.server();

    let post = || {
        server
            .post("/api/lead")
            .add_header("X-Forwarded-For", "192.0.2.44")
            .json(&lead_payload())
    };

    post().await.assert_status_ok();
    post().await.assert_status(StatusCode::TOO_MANY_REQUESTS);

    ctx.clock.advance_ms(59_999);
    post().await.assert_status(StatusCode::TOO_MANY_REQUESTS);

    ctx.clock.advance_ms(1);
    post().await.assert_status_ok();
}

/// Clients without any address share one bucket
#[tokio::test]
async fn test_unidentified_clients_share_a_bucket() {
    let ctx = TestContext::with_options(TestOptions {
        max_requests: 1,
        ..Default::default()
    })
    .await;
    let server = ctx.server();

    server.post("/api/lead").json(&lead_payload()).await.assert_status_ok();
    server
        .post("/api/lead")
        .json(&lead_payload())
        .await
        .assert_status(StatusCode::TOO_MANY_REQUESTS);

    assert_eq!(ctx.sink.records()[0].client_id, "unknown");
}

#[tokio::test]
async fn test_honeypot_is_spam() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    for (field, value) in [
        ("website", "http://spam.example"),
        ("companyUrl", "acme.example"),
        ("fax", "555-0100"),
    ] {
        let response = server
            .post("/api/lead")
            .json(&lead_with(field, json!(value)))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], "VALID_002", "honeypot {}", field);
        assert_eq!(body["error"], "Spam detected");
    }

    assert_eq!(ctx.sink.count(), 0);
}

#[tokio::test]
async fn test_fast_submission_is_rejected() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post("/api/lead")
        .json(&lead_with("ageMs", json!(100)))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_003");
    assert_eq!(ctx.sink.count(), 0);
}

/// Timing falls back to the render timestamp against the server clock
#[tokio::test]
async fn test_rendered_at_timing_gate() {
    let ctx = TestContext::new().await;
    let server = ctx.server();

    let mut recent = lead_without("ageMs");
    recent["renderedAt"] = json!(START_MS - 200);
    let response = server.post("/api/lead").json(&recent).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_003");

    ctx.clock.advance_ms(5_000);
    server.post("/api/lead").json(&recent).await.assert_status_ok();
}

#[tokio::test]
async fn test_missing_age_skips_timing_gate() {
    let ctx = TestContext::new().await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_without("ageMs"))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn test_field_errors_are_collected() {
    let ctx = TestContext::new().await;

    let mut payload = lead_with("name", json!("A"));
    payload["email"] = json!("not-an-email");

    let response = ctx.server().post("/api/lead").json(&payload).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_004");
    assert!(body["details"]["name"].is_array());
    assert_eq!(body["details"]["email"], json!(["Invalid email address"]));
    assert_eq!(ctx.sink.count(), 0);
}

#[tokio::test]
async fn test_two_character_name_passes() {
    let ctx = TestContext::new().await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_with("name", json!("Al")))
        .await
        .assert_status_ok();
    assert_eq!(ctx.sink.records()[0].lead.name, "Al");
}

#[tokio::test]
async fn test_long_source_is_truncated() {
    let ctx = TestContext::new().await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_with("source", json!("x".repeat(500))))
        .await
        .assert_status_ok();
    assert_eq!(ctx.sink.records()[0].lead.source.chars().count(), 120);
}

#[tokio::test]
async fn test_malformed_body() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post("/api/lead")
        .content_type("application/json")
        .bytes("not json".into())
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
}

#[tokio::test]
async fn test_recaptcha_disabled_ignores_token() {
    let ctx = TestContext::new().await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_payload())
        .await
        .assert_status_ok();
    assert!(ctx.upstream.siteverify_calls().is_empty());
}

#[tokio::test]
async fn test_recaptcha_missing_token() {
    let ctx = TestContext::with_options(with_recaptcha()).await;

    let response = ctx.server().post("/api/lead").json(&lead_payload()).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CAPTCHA_001");
    assert!(ctx.upstream.siteverify_calls().is_empty());
}

#[tokio::test]
async fn test_recaptcha_success_sends_secret_and_ip() {
    let ctx = TestContext::with_options(with_recaptcha()).await;

    ctx.server()
        .post("/api/lead")
        .add_header("X-Real-IP", "192.0.2.10")
        .json(&lead_with("recaptchaToken", json!("tok-abc")))
        .await
        .assert_status_ok();

    let calls = ctx.upstream.siteverify_calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["secret"], "server-secret");
    assert_eq!(calls[0]["response"], "tok-abc");
    assert_eq!(calls[0]["remoteip"], "192.0.2.10");
    assert_eq!(ctx.sink.count(), 1);
}

#[tokio::test]
async fn test_recaptcha_rejections() {
    let cases = [
        (fixtures::siteverify(false, 0.9, "lead"), "CAPTCHA_002"),
        (fixtures::siteverify(true, 0.2, "lead"), "CAPTCHA_003"),
        (fixtures::siteverify(true, 0.9, "login"), "CAPTCHA_004"),
    ];

    for (verdict, code) in cases {
        let ctx = TestContext::with_options(with_recaptcha()).await;
        ctx.upstream.reply_siteverify(StatusCode::OK, verdict);

        let response = ctx
            .server()
            .post("/api/lead")
            .json(&lead_with("recaptchaToken", json!("tok")))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["code"], code);
        assert_eq!(ctx.sink.count(), 0);
    }
}

#[tokio::test]
async fn test_recaptcha_unavailable_is_500() {
    let ctx = TestContext::with_options(with_recaptcha()).await;
    ctx.upstream
        .reply_siteverify(StatusCode::SERVICE_UNAVAILABLE, json!({}));

    let response = ctx
        .server()
        .post("/api/lead")
        .json(&lead_with("recaptchaToken", json!("tok")))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CAPTCHA_005");
}

#[tokio::test]
async fn test_sink_failure_is_502() {
    let ctx = TestContext::new().await;
    ctx.sink.set_should_fail(true);

    let response = ctx.server().post("/api/lead").json(&lead_payload()).await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_003");
    assert_eq!(body["details"]["error"], "Sheet is locked");
    assert!(ctx.notifier.seen().is_empty());
}

#[tokio::test]
async fn test_notification_follows_stored_lead() {
    let ctx = TestContext::new().await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_payload())
        .await
        .assert_status_ok();

    tokio::time::timeout(Duration::from_secs(5), ctx.notifier.wait_for_call())
        .await
        .expect("notification was not sent");

    let seen = ctx.notifier.seen();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].id, ctx.sink.records()[0].id);
}

/// A failing notifier never changes the submitter's response
#[tokio::test]
async fn test_notification_failure_is_swallowed() {
    let ctx = TestContext::new().await;
    ctx.notifier.set_should_fail(true);

    let response = ctx.server().post("/api/lead").json(&lead_payload()).await;
    response.assert_status_ok();

    tokio::time::timeout(Duration::from_secs(5), ctx.notifier.wait_for_call())
        .await
        .expect("notification was not attempted");
    assert_eq!(ctx.sink.count(), 1);
}

#[tokio::test]
async fn test_without_notifier() {
    let ctx = TestContext::with_options(TestOptions {
        with_notifier: false,
        ..Default::default()
    })
    .await;

    ctx.server()
        .post("/api/lead")
        .json(&lead_payload())
        .await
        .assert_status_ok();
    assert!(ctx.notifier.seen().is_empty());
}
