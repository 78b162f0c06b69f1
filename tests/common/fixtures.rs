//! Provider response fixtures and mock mounting helpers

use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::config::TEST_API_KEY;

/// Bytes served as the finished audio
pub const FAKE_MP3: &[u8] = b"ID3\x03\x00fake-mp3-frames";

/// Successful submission returning the given clip objects as an array
pub fn submit_ok_array(ids: &[&str]) -> Value {
    let clips: Vec<Value> = ids.iter().map(|id| json!({"id": id})).collect();
    json!({"code": 200, "msg": "success", "data": clips})
}

/// Successful submission returning a single clip object
pub fn submit_ok_single(id: &str) -> Value {
    json!({"code": 200, "msg": "success", "data": {"id": id}})
}

/// Feed response for a clip that is still rendering
pub fn feed_pending(id: &str) -> Value {
    json!({"code": 200, "msg": "success", "data": {"id": id, "status": "streaming"}})
}

/// Feed response for a finished clip
pub fn feed_complete(id: &str, audio_url: &str, metadata: Option<Value>) -> Value {
    let mut clip = json!({"id": id, "status": "complete", "audio_url": audio_url});
    if let Some(metadata) = metadata {
        clip["metadata"] = metadata;
    }
    json!({"code": 200, "msg": "success", "data": clip})
}

/// Feed response for a failed clip
pub fn feed_error(id: &str, message: &str) -> Value {
    json!({
        "code": 200,
        "msg": "success",
        "data": {"id": id, "status": "error", "error_message": message}
    })
}

/// Mount the generate endpoint with a JSON body
pub async fn mount_submit(server: &MockServer, status: u16, body: Value) {
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(header("Authorization", format!("Bearer {}", TEST_API_KEY).as_str()))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount one feed response for `id`, served at most `times` times
///
/// Mocks mounted earlier take precedence, so mount the early
/// responses of a sequence first.
pub async fn mount_feed_times(server: &MockServer, id: &str, body: Value, times: u64) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/feed/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(times)
        .mount(server)
        .await;
}

/// Mount a feed response for `id` that is served forever
pub async fn mount_feed(server: &MockServer, id: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/api/v1/feed/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

/// Mount the audio file at `/audio/{name}` and return its absolute URL
pub async fn mount_audio(server: &MockServer, name: &str) -> String {
    Mock::given(method("GET"))
        .and(path(format!("/audio/{}", name)))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Content-Type", "audio/mpeg")
                .set_body_bytes(FAKE_MP3),
        )
        .mount(server)
        .await;
    format!("{}/audio/{}", server.uri(), name)
}

/// Number of requests the server received for `request_path`
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}
