//! Integration tests for `POST /api/v1/generations` and the results gallery.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::{Method, StatusCode};
use common::{body_bytes, body_json, get, post_empty, send_json, upload_png, TINY_PNG};
use nanomerch_core::gateway::{GatewayError, ImageGateway};
use nanomerch_core::media::ImagePayload;
use nanomerch_core::session::GENERATION_FAILED_MESSAGE;
use serde_json::json;
use tokio::sync::Notify;

// ---------------------------------------------------------------------------
// Preconditions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn generation_without_source_image_is_rejected_silently() {
    let (app, gateway) = common::build_test_app();

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(gateway.prompts().is_empty());

    // No user-visible error is recorded.
    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert!(json["data"]["error"].is_null());
    assert_eq!(json["data"]["status"], "idle");
}

// ---------------------------------------------------------------------------
// Preset prompts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn preset_generation_substitutes_selected_color() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;
    send_json(&app, Method::PUT, "/api/v1/session/color", json!({ "value": "navy blue" })).await;

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    let data = &json["data"];
    assert_eq!(data["kind"], "preset");
    assert_eq!(data["origin"]["scenario_id"], "t-shirt");
    assert_eq!(data["origin"]["color"], "navy blue");
    assert_eq!(data["mime_type"], "image/png");

    let prompts = gateway.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("a navy blue Gildan 5000"));
    assert!(!prompts[0].contains("{color}"));
    assert_eq!(data["prompt"], prompts[0].as_str());
}

#[tokio::test]
async fn template_without_placeholder_is_sent_verbatim() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;
    send_json(
        &app,
        Method::PUT,
        "/api/v1/session/scenario",
        json!({ "scenario_id": "coffee-mug" }),
    )
    .await;

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    assert!(gateway.prompts()[0].starts_with("Create a photorealistic image"));
}

// ---------------------------------------------------------------------------
// Custom prompts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn custom_prompt_is_wrapped_as_typed_and_has_no_origin() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;
    send_json(&app, Method::PUT, "/api/v1/session/mode", json!({ "mode": "custom" })).await;
    send_json(
        &app,
        Method::PUT,
        "/api/v1/session/custom-prompt",
        json!({ "text": "  on a skateboard deck  " }),
    )
    .await;

    let json = body_json(post_empty(&app, "/api/v1/generations").await).await;
    assert_eq!(json["data"]["kind"], "custom");
    assert!(json["data"]["origin"].is_null());
    assert_eq!(
        gateway.prompts(),
        ["Edit this image:   on a skateboard deck  . Maintain product consistency. \
          Output a high quality image."]
    );
}

#[tokio::test]
async fn blank_custom_prompt_surfaces_generic_error() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;
    send_json(&app, Method::PUT, "/api/v1/session/mode", json!({ "mode": "custom" })).await;
    send_json(
        &app,
        Method::PUT,
        "/api/v1/session/custom-prompt",
        json!({ "text": "   " }),
    )
    .await;

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert!(gateway.prompts().is_empty());

    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert_eq!(json["data"]["error"], GENERATION_FAILED_MESSAGE);
    assert_eq!(json["data"]["status"], "idle");
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn gateway_failure_records_error_and_keeps_results() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;

    // One success, then a failure.
    post_empty(&app, "/api/v1/generations").await;
    gateway.push(Err(GatewayError::Api {
        status: 500,
        body: "upstream".into(),
    }));

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "GENERATION_FAILED");
    assert_eq!(json["error"], GENERATION_FAILED_MESSAGE);

    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert_eq!(json["data"]["error"], GENERATION_FAILED_MESSAGE);
    assert_eq!(json["data"]["status"], "idle");
    assert_eq!(json["data"]["result_count"], 1);

    // The next attempt clears the error.
    post_empty(&app, "/api/v1/generations").await;
    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert!(json["data"]["error"].is_null());
    assert_eq!(json["data"]["result_count"], 2);
}

#[tokio::test]
async fn missing_image_in_response_is_a_failure() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;
    gateway.push(Err(GatewayError::MissingImage));

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = body_json(get(&app, "/api/v1/results").await).await;
    assert_eq!(json["data"], json!([]));
}

// ---------------------------------------------------------------------------
// Results gallery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn results_are_listed_newest_first_and_downloadable() {
    let (app, gateway) = common::build_test_app();
    upload_png(&app).await;

    gateway.push(Ok(ImagePayload::new("image/jpeg", vec![0xFF, 0xD8, 0xFF])));
    let first = body_json(post_empty(&app, "/api/v1/generations").await).await;
    let second = body_json(post_empty(&app, "/api/v1/generations").await).await;

    let json = body_json(get(&app, "/api/v1/results").await).await;
    let ids: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        [
            second["data"]["id"].as_str().unwrap(),
            first["data"]["id"].as_str().unwrap()
        ]
    );

    let first_id = first["data"]["id"].as_str().unwrap();
    let response = get(&app, &format!("/api/v1/results/{first_id}/image")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    assert_eq!(
        response.headers()["content-disposition"],
        format!("attachment; filename=\"nanomerch-{first_id}.jpg\"").as_str()
    );
    assert_eq!(body_bytes(response).await, [0xFF, 0xD8, 0xFF]);

    let second_url = second["data"]["image_url"].as_str().unwrap();
    let response = get(&app, second_url).await;
    assert_eq!(body_bytes(response).await, TINY_PNG);
}

#[tokio::test]
async fn unknown_result_image_returns_404() {
    let (app, _) = common::build_test_app();
    let response = get(
        &app,
        "/api/v1/results/00000000-0000-0000-0000-000000000000/image",
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Concurrency
// ---------------------------------------------------------------------------

/// Gateway that parks every call until released.
#[derive(Default)]
struct ParkedGateway {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ImageGateway for ParkedGateway {
    async fn generate(
        &self,
        _source: &ImagePayload,
        _prompt: &str,
    ) -> Result<ImagePayload, GatewayError> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(ImagePayload::new("image/png", TINY_PNG.to_vec()))
    }
}

#[tokio::test]
async fn second_generation_while_in_flight_is_rejected() {
    let gateway = Arc::new(ParkedGateway::default());
    let app = common::build_test_app_with(gateway.clone());
    upload_png(&app).await;

    let in_flight = {
        let app = app.clone();
        tokio::spawn(async move { post_empty(&app, "/api/v1/generations").await })
    };
    gateway.started.notified().await;

    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert_eq!(json["data"]["status"], "generating");

    let response = post_empty(&app, "/api/v1/generations").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    gateway.release.notify_one();
    let response = in_flight.await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(get(&app, "/api/v1/session").await).await;
    assert_eq!(json["data"]["status"], "idle");
    assert_eq!(json["data"]["result_count"], 1);
}
