//! Request bodies and canned upstream replies.

use base64::Engine;
use serde_json::{json, Value};

/// A lead that passes every gate with the default policy.
pub fn lead_payload() -> Value {
    json!({
        "name": "  Ada Lovelace ",
        "email": "ada@example.com",
        "message": "Interested in a 401k rollover.",
        "source": "widget:en",
        "website": "",
        "ageMs": 2000
    })
}

/// `lead_payload` with `key` replaced.
pub fn lead_with(key: &str, value: Value) -> Value {
    let mut payload = lead_payload();
    payload[key] = value;
    payload
}

/// `lead_payload` without `key`.
pub fn lead_without(key: &str) -> Value {
    let mut payload = lead_payload();
    if let Some(map) = payload.as_object_mut() {
        map.remove(key);
    }
    payload
}

/// Successful text completion.
pub fn gemini_text(text: &str) -> Value {
    json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

/// Successful speech completion carrying `pcm`.
pub fn gemini_audio(pcm: &[u8]) -> Value {
    let data = base64::engine::general_purpose::STANDARD.encode(pcm);
    json!({
        "candidates": [
            {
                "content": {
                    "role": "model",
                    "parts": [ { "inlineData": { "mimeType": "audio/L16;rate=24000", "data": data } } ]
                }
            }
        ]
    })
}

/// Error body in the provider's shape.
pub fn gemini_error(code: u16, status: &str, message: &str) -> Value {
    json!({ "error": { "code": code, "status": status, "message": message } })
}

/// Verification endpoint verdict.
pub fn siteverify(success: bool, score: f64, action: &str) -> Value {
    json!({
        "success": success,
        "score": score,
        "action": action,
        "hostname": "boldhorizons.example",
        "error-codes": []
    })
}

/// Deterministic PCM samples.
pub fn pcm(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
