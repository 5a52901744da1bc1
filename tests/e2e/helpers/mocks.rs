use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// 100 ms of a quiet ramp at 24 kHz, 16-bit little-endian
pub fn sample_pcm() -> Vec<u8> {
    (0..2_400i16).flat_map(|i| (i % 200 - 100).to_le_bytes()).collect()
}

pub fn gemini_audio_body(pcm: &[u8], sample_rate: u32) -> Value {
    json!({
        "candidates": [{
            "content": {
                "role": "model",
                "parts": [{
                    "inlineData": {
                        "mimeType": format!("audio/L16;codec=pcm;rate={}", sample_rate),
                        "data": STANDARD.encode(pcm)
                    }
                }]
            },
            "finishReason": "STOP"
        }]
    })
}

fn generate_content() -> wiremock::MockBuilder {
    Mock::given(method("POST")).and(path_regex(r"^/v1beta/models/[^/]+:generateContent$"))
}

/// Provider answers `api_key` with valid 24 kHz audio
pub async fn mount_gemini_audio(server: &MockServer, api_key: &str) {
    generate_content()
        .and(header("x-goog-api-key", api_key))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_audio_body(&sample_pcm(), 24_000)))
        .mount(server)
        .await;
}

/// Provider answers `api_key` with a bare error status
pub async fn mount_gemini_status(server: &MockServer, api_key: &str, status: u16) {
    generate_content()
        .and(header("x-goog-api-key", api_key))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": { "code": status, "message": "mocked failure" }
        })))
        .mount(server)
        .await;
}

/// Storage accepts every upload
pub async fn mount_storage_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Key": "uploaded" })))
        .mount(server)
        .await;
}

/// Storage rejects every upload
pub async fn mount_storage_failure(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path_regex(r"^/storage/v1/object/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage offline"))
        .mount(server)
        .await;
}
