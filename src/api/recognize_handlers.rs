// src/api/recognize_handlers.rs
use crate::{
    error::RecognizeError,
    models::attendance::RecognizeResponse,
    recognition::intake,
    services::uploads::remove_quietly,
    state::RecognizerState,
};
use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::header::CONTENT_TYPE,
    response::Json,
};
use chrono::Local;
use serde_json::{json, Value};

/// POST /api/recognize
///
/// Takes either a multipart body with a `frame` file part or a JSON body
/// with an `image` (base64 or data URL). An optional `time` is logged
/// instead of the server clock.
pub async fn handle_recognize(
    State(state): State<RecognizerState>,
    request: Request,
) -> Result<Json<RecognizeResponse>, RecognizeError> {
    let now = Local::now().naive_local();
    let uploads_dir = state.config.uploads_dir.clone();

    let is_multipart = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let probe = if is_multipart {
        let multipart = Multipart::from_request(request, &state).await.map_err(|e| {
            tracing::warn!("Rejected multipart body: {}", e);
            RecognizeError::NoImage
        })?;
        intake::probe_from_multipart(multipart, &uploads_dir, now).await?
    } else {
        let body = axum::body::to_bytes(request.into_body(), state.config.max_upload_bytes)
            .await
            .map_err(|e| {
                tracing::warn!("Could not read request body: {}", e);
                RecognizeError::NoImage
            })?;
        intake::probe_from_json(&body, &uploads_dir, now).await?
    };

    tracing::debug!("Probe stored at {}", probe.path.display());
    let response = state.recognizer().recognize(&probe.path, probe.time.as_deref(), now).await;
    remove_quietly(&probe.path).await;

    tracing::info!("Recognition result: success={} message={}", response.success, response.message);
    Ok(Json(response))
}

/// GET /health
pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        api::routes::create_router,
        config::{MatcherConfig, RecognizerConfig},
        recognition::{intake::tests::tiny_png, matcher::FixedMatcher},
        services::attendance_log::{path_for, read_records},
    };
    use axum::{body::Body, http::StatusCode, Router};
    use base64::Engine;
    use std::{path::PathBuf, sync::Arc};
    use tower::ServiceExt;

    struct Harness {
        root: PathBuf,
        router: Router,
    }

    impl Drop for Harness {
        fn drop(&mut self) {
            std::fs::remove_dir_all(&self.root).ok();
        }
    }

    fn harness(matcher: FixedMatcher) -> Harness {
        let root = std::env::temp_dir().join(format!("recognize_api_test_{}", uuid::Uuid::new_v4()));
        let config = RecognizerConfig {
            addr: "127.0.0.1:0".parse().unwrap(),
            images_dir: root.join("images"),
            uploads_dir: root.join("uploads"),
            attendance_dir: root.join("attendance"),
            threshold: 0.6,
            dedup_window: std::time::Duration::from_secs(3600),
            max_upload_bytes: 1024 * 1024,
            matcher: MatcherConfig::default(),
        };
        config.ensure_dirs().unwrap();
        let router = create_router(RecognizerState::new(config, Arc::new(matcher)));
        Harness { root, router }
    }

    async fn call(router: &Router, request: axum::http::Request<Body>) -> (StatusCode, Value) {
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn json_request(body: Value) -> axum::http::Request<Body> {
        axum::http::Request::post("/api/recognize")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn multipart_request(file_name: &str, bytes: &[u8], time: Option<&str>) -> axum::http::Request<Body> {
        let boundary = "XBOUNDARYX";
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{boundary}\r\nContent-Disposition: form-data; name=\"frame\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
        if let Some(time) = time {
            body.extend_from_slice(
                format!("--{boundary}\r\nContent-Disposition: form-data; name=\"time\"\r\n\r\n{time}\r\n").as_bytes(),
            );
        }
        body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        axum::http::Request::post("/api/recognize")
            .header(CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
            .body(Body::from(body))
            .unwrap()
    }

    fn uploads_left(h: &Harness) -> usize {
        std::fs::read_dir(h.root.join("uploads")).unwrap().count()
    }

    #[tokio::test]
    async fn test_json_probe_match_is_logged() {
        let h = harness(FixedMatcher::best("images/Ada_Lovelace_7.jpg", Some(0.25)));
        let encoded = base64::engine::general_purpose::STANDARD.encode(tiny_png());
        let (status, body) = call(&h.router, json_request(json!({ "image": format!("data:image/png;base64,{encoded}") }))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["name"], "Ada_Lovelace");
        assert_eq!(body["roll"], "7");
        assert_eq!(body["distance"], 0.25);
        assert_eq!(uploads_left(&h), 0);

        let today = path_for(&h.root.join("attendance"), Local::now().date_naive());
        let records = read_records(&today).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Ada_Lovelace");
    }

    #[tokio::test]
    async fn test_multipart_probe_with_time() {
        let h = harness(FixedMatcher::best("images/Grace_Hopper_9.png", Some(0.1)));
        let (status, body) = call(&h.router, multipart_request("cam.png", &tiny_png(), Some("07:45:00"))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(uploads_left(&h), 0);
    }

    #[tokio::test]
    async fn test_multipart_rejects_bad_extension_and_empty_name() {
        let h = harness(FixedMatcher::default());

        let (status, body) = call(&h.router, multipart_request("cam.gif", &tiny_png(), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body, json!({ "success": false, "message": "File type not allowed" }));

        let (status, body) = call(&h.router, multipart_request("", &tiny_png(), None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "No selected file");
    }

    #[tokio::test]
    async fn test_malformed_payloads_are_400() {
        let h = harness(FixedMatcher::default());
        for payload in [json!({}), json!({ "image": "!!!not-base64!!!" }), json!({ "image": "aGVsbG8=" })] {
            let (status, body) = call(&h.router, json_request(payload)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["success"], false);
            assert_eq!(body["message"], "No image provided or failed to decode");
        }

        let (status, _) = call(&h.router, multipart_request("cam.jpg", b"not an image", None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(uploads_left(&h), 0);
    }

    #[tokio::test]
    async fn test_health() {
        let h = harness(FixedMatcher::default());
        let request = axum::http::Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = call(&h.router, request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }
}
