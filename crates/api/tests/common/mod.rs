#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::header::CONTENT_TYPE;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use nanomerch_api::config::ServerConfig;
use nanomerch_api::router::build_app_router;
use nanomerch_api::state::AppState;
use nanomerch_core::export::{DocumentExporter, PdfDocumentExporter};
use nanomerch_core::gateway::{GatewayError, ImageGateway};
use nanomerch_core::media::ImagePayload;
use nanomerch_core::studio::Studio;

/// Boundary used by [`multipart_body`].
pub const BOUNDARY: &str = "nanomerch-test-boundary";

/// A 1x1 PNG, small enough to inline.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1F,
    0x15, 0xC4, 0x89, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x44, 0x41, 0x54, 0x78, 0xDA, 0x63, 0xFC,
    0xCF, 0xC0, 0x50, 0x0F, 0x00, 0x04, 0x85, 0x01, 0x80, 0x84, 0xA9, 0x8C, 0x21, 0x00, 0x00,
    0x00, 0x00, 0x49, 0x45, 0x4E, 0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// Gateway double that replays scripted outcomes and records prompts.
///
/// When the script runs out it answers with a small PNG.
#[derive(Default)]
pub struct FakeGateway {
    outcomes: Mutex<VecDeque<Result<ImagePayload, GatewayError>>>,
    prompts: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn push(&self, outcome: Result<ImagePayload, GatewayError>) {
        self.outcomes.lock().unwrap().push_back(outcome);
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ImageGateway for FakeGateway {
    async fn generate(
        &self,
        _source: &ImagePayload,
        prompt: &str,
    ) -> Result<ImagePayload, GatewayError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(ImagePayload::new("image/png", TINY_PNG.to_vec())))
    }
}

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        max_upload_bytes: 1024 * 1024,
    }
}

/// Build the full application router backed by the given gateway and the
/// production PDF exporter.
///
/// Uses the same `build_app_router` as production, so the middleware stack
/// (CORS, request ID, timeout, tracing, body limit) is exercised too.
pub fn build_test_app_with(gateway: Arc<dyn ImageGateway>) -> Router {
    build_test_app_with_exporter(gateway, Arc::new(PdfDocumentExporter))
}

/// Like [`build_test_app_with`], with a chosen document exporter.
pub fn build_test_app_with_exporter(
    gateway: Arc<dyn ImageGateway>,
    exporter: Arc<dyn DocumentExporter>,
) -> Router {
    let config = test_config();
    let state = AppState::new(config.clone(), Studio::default(), gateway, true, exporter);
    build_app_router(state, &config)
}

/// Build the application with a fresh [`FakeGateway`].
pub fn build_test_app() -> (Router, Arc<FakeGateway>) {
    let gateway = Arc::new(FakeGateway::default());
    (build_test_app_with(gateway.clone()), gateway)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

/// Send one request through a clone of the router.
pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn delete(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn post_empty(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

/// Send a JSON body with the given method.
pub async fn send_json(
    app: &Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Build a multipart body with a single `file` field.
pub fn multipart_body(content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        b"Content-Disposition: form-data; name=\"file\"; filename=\"design.png\"\r\n",
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

/// Upload a source image through `PUT /api/v1/session/source-image`.
pub async fn upload_source(app: &Router, content_type: &str, data: &[u8]) -> Response<Body> {
    let request = Request::builder()
        .method(Method::PUT)
        .uri("/api/v1/session/source-image")
        .header(
            CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(content_type, data)))
        .unwrap();
    send(app, request).await
}

/// Upload the built-in tiny PNG as source image.
pub async fn upload_png(app: &Router) {
    let response = upload_source(app, "image/png", TINY_PNG).await;
    assert!(response.status().is_success(), "upload failed: {}", response.status());
}

pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    response
        .into_body()
        .collect()
        .await
        .unwrap()
        .to_bytes()
        .to_vec()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = body_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
