mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{FakeChat, FakeExtractor, FakeModel, harness, signed_headers, test_config};
use lucidlayer::ai::ModelProfiles;
use lucidlayer::api::{AppState, build_router};
use lucidlayer::core::models::RewriteMode;
use lucidlayer::worker::{EventProcessor, HttpCallbackSink, RewriteWorker, TaskSupervisor};

fn command_body(text: &str, response_url: &str) -> Vec<u8> {
    format!(
        "team_id=T1&channel_id=C1&user_id=U123&user_name=ada&command=%2Flucidlayer&text={}&response_url={}&trigger_id=1.2",
        utf8_percent_encode(text, NON_ALPHANUMERIC),
        utf8_percent_encode(response_url, NON_ALPHANUMERIC)
    )
    .into_bytes()
}

async fn post_command(state: &AppState, body: &[u8]) -> (StatusCode, Value) {
    let headers = signed_headers(body);
    let mut builder = Request::builder().method("POST").uri("/slack/lucidlayer");
    for (name, value) in &headers {
        builder = builder.header(name, value);
    }
    let response = build_router(state.clone())
        .oneshot(builder.body(Body::from(body.to_vec())).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_genz_rewrite_posts_exactly_once_to_response_url() {
    let server = MockServer::start().await;
    let model = FakeModel::replying("no cap, this report slaps");

    Mock::given(method("POST"))
        .and(path("/commands/T1/999"))
        .and(body_json(json!({
            "response_type": "ephemeral",
            "text": "<@U123>\n*GENZ version:*\nno cap, this report slaps"
        })))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let (supervisor, _failures) = TaskSupervisor::new();
    let processor = EventProcessor::new(
        FakeChat::new(),
        ModelProfiles::new(model.clone(), model.clone()),
        Arc::new(FakeExtractor {
            text: String::new(),
        }),
        3000,
    );
    let rewriter = RewriteWorker::new(model.clone(), Arc::new(HttpCallbackSink::default()));
    let state = AppState::new(test_config(), supervisor, processor, rewriter);

    let response_url = format!("{}/commands/T1/999", server.uri());
    let (status, ack) = post_command(&state, &command_body("genz check out my report", &response_url)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["response_type"], "ephemeral");
    assert_eq!(
        ack["text"],
        "Working on your *genz* rewrite... you'll see it shortly!"
    );

    tokio::time::timeout(Duration::from_secs(5), state.supervisor.wait_idle())
        .await
        .unwrap();

    let prompt = model.last_prompt().unwrap();
    assert!(prompt.contains("Gen Z"));
    assert!(prompt.ends_with("check out my report"));
    assert!(!prompt.contains("genz check"));
    // MockServer verifies the single POST on drop.
}

#[tokio::test]
async fn test_model_failure_posts_error_payload() {
    let mut h = harness(FakeModel::failing("rate limited"), FakeChat::new());

    let (status, ack) =
        post_command(&h.state, &command_body("corporate ship it", "https://hooks.example/r/1")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(ack["text"].as_str().unwrap().contains("*corporate*"));

    h.state.supervisor.wait_idle().await;

    let posts = h.sink.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].0, "https://hooks.example/r/1");
    assert_eq!(posts[0].1["response_type"], "ephemeral");
    assert_eq!(
        posts[0].1["text"],
        "Error generating response: Failed to access watsonx API: rate limited"
    );
    // Delivered to the caller, so the task itself succeeded.
    assert!(h.failures.try_recv().is_err());
}

#[tokio::test]
async fn test_untagged_text_defaults_to_simple() {
    let h = harness(FakeModel::replying("plain words"), FakeChat::new());

    let (_, ack) = post_command(&h.state, &command_body("Genzzz is not a mode", "https://hooks.example/r/2")).await;
    assert!(ack["text"].as_str().unwrap().contains("*simple*"));

    h.state.supervisor.wait_idle().await;
    assert!(h.model.last_prompt().unwrap().ends_with("Genzzz is not a mode"));

    let posts = h.sink.posts();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].1["text"], "<@U123>\n*SIMPLE version:*\nplain words");
}

#[tokio::test]
async fn test_missing_response_url_schedules_nothing() {
    let h = harness(FakeModel::replying("x"), FakeChat::new());
    let body = b"team_id=T1&user_id=U123&command=%2Flucidlayer&text=humor+hi".to_vec();

    let (status, ack) = post_command(&h.state, &body).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["response_type"], "ephemeral");
    assert_eq!(h.state.supervisor.scheduled(), 0);
}

#[tokio::test]
async fn test_unsigned_command_is_rejected() {
    let h = harness(FakeModel::replying("x"), FakeChat::new());
    let response = build_router(h.state.clone())
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/slack/lucidlayer")
                .body(Body::from(command_body("hi", "https://hooks.example/r/3")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(h.state.supervisor.scheduled(), 0);
}

#[test]
fn test_mode_tags_are_case_insensitive() {
    for (input, mode, body) in [
        ("genz check out my report", RewriteMode::GenZ, "check out my report"),
        ("GENZ hi", RewriteMode::GenZ, "hi"),
        ("Humor my manager", RewriteMode::Humor, "my manager"),
        ("corporate", RewriteMode::Corporate, ""),
        ("simple  spaced out", RewriteMode::Simple, "spaced out"),
        ("please simplify", RewriteMode::Simple, "please simplify"),
        ("", RewriteMode::Simple, ""),
    ] {
        let (parsed_mode, parsed_body) = RewriteMode::split_command_text(input);
        assert_eq!(parsed_mode, mode, "mode for {input:?}");
        assert_eq!(parsed_body, body, "body for {input:?}");
    }
}
