use super::*;
use serde_json::json;

// =============================================================================
// GenError::error_code / retryable
// =============================================================================

#[test]
fn error_codes_are_grepable() {
    assert_eq!(GenError::ConfigParse("x".into()).error_code(), "E_CONFIG_PARSE");
    assert_eq!(GenError::MissingApiKey { var: "K".into() }.error_code(), "E_MISSING_API_KEY");
    assert_eq!(GenError::ApiRequest("t".into()).error_code(), "E_API_REQUEST");
    assert_eq!(GenError::ApiResponse { status: 500, body: String::new() }.error_code(), "E_API_RESPONSE");
    assert_eq!(GenError::ApiParse("j".into()).error_code(), "E_API_PARSE");
    assert_eq!(GenError::HttpClientBuild("tls".into()).error_code(), "E_HTTP_CLIENT_BUILD");
    assert_eq!(GenError::JobFailed("quota".into()).error_code(), "E_JOB_FAILED");
    assert_eq!(GenError::Cancelled.error_code(), "E_CANCELLED");
    assert_eq!(GenError::PollTimeout { attempts: 60 }.error_code(), "E_POLL_TIMEOUT");
}

#[test]
fn transient_errors_are_retryable() {
    assert!(GenError::ApiRequest("timeout".into()).retryable());
    assert!(GenError::ApiResponse { status: 429, body: String::new() }.retryable());
    assert!(GenError::ApiResponse { status: 503, body: String::new() }.retryable());
    assert!(GenError::PollTimeout { attempts: 3 }.retryable());
}

#[test]
fn terminal_errors_are_not_retryable() {
    assert!(!GenError::ApiResponse { status: 400, body: String::new() }.retryable());
    assert!(!GenError::JobFailed("safety".into()).retryable());
    assert!(!GenError::Cancelled.retryable());
    assert!(!GenError::MissingApiKey { var: "K".into() }.retryable());
}

// =============================================================================
// request builders
// =============================================================================

#[test]
fn request_builders_set_kind_and_constraints() {
    let text = GenRequest::text("describe this product").with_schema(json!({"type": "object"}));
    assert_eq!(text.kind, GenKind::Text);
    assert!(text.constraints.response_schema.is_some());

    let image = GenRequest::image("product photo").with_aspect_ratio("1:1");
    assert_eq!(image.kind, GenKind::Image);
    assert_eq!(image.constraints.aspect_ratio.as_deref(), Some("1:1"));

    let video = GenRequest::video("30s ad").with_duration_secs(8);
    assert_eq!(video.kind, GenKind::Video);
    assert_eq!(video.constraints.duration_secs, Some(8));
}

#[test]
fn request_serde_omits_empty_constraints() {
    let value = serde_json::to_value(GenRequest::text("hi")).unwrap();
    assert_eq!(value, json!({"kind": "text", "prompt": "hi", "constraints": {}}));
}

// =============================================================================
// payload serde
// =============================================================================

#[test]
fn media_payload_serde_shape() {
    let payload = GenPayload::Media {
        mime_type: "video/mp4".into(),
        reference: MediaRef::Url { url: "https://cdn.example/clip.mp4".into() },
    };
    let value = serde_json::to_value(&payload).unwrap();
    assert_eq!(
        value,
        json!({
            "type": "media",
            "mime_type": "video/mp4",
            "reference": {"kind": "url", "url": "https://cdn.example/clip.mp4"}
        })
    );
}
