//! Tests for the text-to-speech proxy and WAV framing.

use axum::http::{header, StatusCode};
use integration_tests::fixtures;
use integration_tests::setup::{TestContext, TestOptions};
use serde_json::json;

fn u32_le(buf: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([buf[offset], buf[offset + 1], buf[offset + 2], buf[offset + 3]])
}

#[tokio::test]
async fn test_tts_returns_wav() {
    let ctx = TestContext::new().await;
    let pcm = fixtures::pcm(4800);
    ctx.upstream
        .reply_generate(StatusCode::OK, fixtures::gemini_audio(&pcm));

    let response = ctx
        .server()
        .post("/api/tts")
        .json(&json!({ "text": "Welcome to Bold Horizons" }))
        .await;

    response.assert_status_ok();
    assert_eq!(response.header(header::CONTENT_TYPE), "audio/wav");
    assert_eq!(response.header(header::CACHE_CONTROL), "no-store");

    let wav = response.as_bytes();
    assert_eq!(wav.len(), pcm.len() + 44);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(u32_le(wav, 4), (pcm.len() + 36) as u32);
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(u32_le(wav, 24), 24_000);
    assert_eq!(&wav[36..40], b"data");
    assert_eq!(u32_le(wav, 40), pcm.len() as u32);
    assert_eq!(&wav[44..], &pcm[..]);
}

#[tokio::test]
async fn test_tts_request_uses_configured_model_and_voice() {
    let ctx = TestContext::new().await;
    ctx.upstream
        .reply_generate(StatusCode::OK, fixtures::gemini_audio(&fixtures::pcm(10)));

    ctx.server()
        .post("/api/tts")
        .json(&json!({ "text": "Hola" }))
        .await
        .assert_status_ok();

    let calls = ctx.upstream.generate_calls();
    assert_eq!(calls[0].call, "gemini-2.5-flash-preview-tts:generateContent");
    let config = &calls[0].body["generationConfig"];
    assert_eq!(config["responseModalities"], json!(["AUDIO"]));
    assert_eq!(
        config["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Kore"
    );
    assert_eq!(calls[0].body["contents"][0]["parts"][0]["text"], "Hola");
}

#[tokio::test]
async fn test_tts_voice_and_model_override() {
    let ctx = TestContext::new().await;
    ctx.upstream
        .reply_generate(StatusCode::OK, fixtures::gemini_audio(&fixtures::pcm(10)));

    ctx.server()
        .post("/api/tts")
        .json(&json!({ "text": "Hi", "voice": "Puck", "model": "custom-tts" }))
        .await
        .assert_status_ok();

    let calls = ctx.upstream.generate_calls();
    assert_eq!(calls[0].call, "custom-tts:generateContent");
    assert_eq!(
        calls[0].body["generationConfig"]["speechConfig"]["voiceConfig"]["prebuiltVoiceConfig"]["voiceName"],
        "Puck"
    );
}

#[tokio::test]
async fn test_tts_no_audio_is_500() {
    let ctx = TestContext::new().await;
    ctx.upstream
        .reply_generate(StatusCode::OK, fixtures::gemini_text("I cannot speak"));

    let response = ctx
        .server()
        .post("/api/tts")
        .json(&json!({ "text": "Hello" }))
        .await;

    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_004");
    assert_eq!(body["error"], "No audio in response");
}

#[tokio::test]
async fn test_tts_upstream_error_is_502() {
    let ctx = TestContext::new().await;
    let payload = fixtures::gemini_error(400, "INVALID_ARGUMENT", "Unknown voice");
    ctx.upstream
        .reply_generate(StatusCode::BAD_REQUEST, payload.clone());

    let response = ctx
        .server()
        .post("/api/tts")
        .json(&json!({ "text": "Hello", "voice": "Nobody" }))
        .await;

    response.assert_status(StatusCode::BAD_GATEWAY);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "UPSTREAM_002");
    assert_eq!(body["error"], "Gemini TTS error");
    assert_eq!(body["details"], payload);
}

#[tokio::test]
async fn test_tts_empty_text() {
    let ctx = TestContext::new().await;

    let response = ctx.server().post("/api/tts").json(&json!({ "text": "" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
    assert_eq!(body["error"], "Empty text");
    assert!(ctx.upstream.generate_calls().is_empty());
}

#[tokio::test]
async fn test_tts_missing_key() {
    let ctx = TestContext::with_options(TestOptions {
        api_key: None,
        ..Default::default()
    })
    .await;

    let response = ctx.server().post("/api/tts").json(&json!({ "text": "Hi" })).await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "CONFIG_001");
}

#[tokio::test]
async fn test_tts_rejects_model_outside_path_segment() {
    let ctx = TestContext::new().await;

    let response = ctx
        .server()
        .post("/api/tts")
        .json(&json!({ "text": "Hi", "model": "../../files?x=" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let body: serde_json::Value = response.json();
    assert_eq!(body["code"], "VALID_001");
    assert_eq!(body["error"], "Invalid model name");
    assert!(ctx.upstream.generate_calls().is_empty());
}
