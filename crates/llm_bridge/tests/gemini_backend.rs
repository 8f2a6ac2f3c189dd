//! GeminiBackend against a local stub of the generateContent endpoint

use axum::{
    extract::Path,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use core_pipeline::UploadedImage;
use llm_bridge::{
    ApiKey, ConfigProvider, GeminiBackend, ModelBackend, ModelClient, ModelInvocationError,
    ModelRequest, ModelSettings, Orchestrator, PipelineStage,
};
use serde_json::{json, Value};
use std::sync::Arc;

const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

fn candidate(text: &str) -> Value {
    json!({
        "candidates": [{
            "content": { "role": "model", "parts": [{ "text": text }] },
            "finishReason": "STOP"
        }]
    })
}

/// Answers like Gemini: vision requests get an identification, text
/// requests get recipes. Requires the key "test-key".
async fn generate_content(
    Path(model_action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if headers.get("x-goog-api-key").and_then(|v| v.to_str().ok()) != Some("test-key") {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": {"code": 401, "message": "API key not valid", "status": "UNAUTHENTICATED"}})),
        )
            .into_response();
    }
    if !model_action.ends_with(":generateContent") {
        return StatusCode::NOT_FOUND.into_response();
    }

    let parts = body["contents"][0]["parts"].as_array().cloned().unwrap_or_default();
    let has_image = parts.iter().any(|p| p.get("inlineData").is_some());

    let text = if has_image {
        "```json\n{\"name\":\"Margherita Pizza\",\"description\":\"Classic tomato and mozzarella pizza\",\"confidence\":0.92}\n```"
    } else {
        r#"[{"name":"Quick Pizza","description":"Fast","ingredients":["dough","tomato","cheese"]}]"#
    };
    Json(candidate(text)).into_response()
}

async fn spawn_stub(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/v1beta", addr)
}

fn settings(base_url: String) -> ModelSettings {
    ModelSettings {
        base_url,
        timeout_secs: 5,
        ..ModelSettings::default()
    }
}

fn text_request() -> ModelRequest {
    ModelRequest {
        model: "gemini-2.0-flash".to_string(),
        prompt: "hello".to_string(),
        image: None,
        temperature: None,
        max_output_tokens: None,
    }
}

fn key(value: &str) -> ApiKey {
    ConfigProvider::new(None, Some(value.to_string()))
        .api_key()
        .unwrap()
}

#[tokio::test]
async fn test_pipeline_end_to_end_over_http() {
    let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(generate_content))).await;
    let settings = settings(base);
    let backend = Arc::new(GeminiBackend::new(&settings).unwrap());
    let client = ModelClient::new(
        backend,
        ConfigProvider::new(None, Some("test-key".to_string())),
        settings,
    );

    let image = UploadedImage::from_bytes(PNG.to_vec(), None).unwrap();
    let outcome = Orchestrator::new(client).run(&image).await.unwrap();

    assert_eq!(outcome.identification.name, "Margherita Pizza");
    assert_eq!(outcome.recipes.len(), 1);
    assert_eq!(outcome.recipes[0].ingredients, vec!["dough", "tomato", "cheese"]);
}

#[tokio::test]
async fn test_rejected_key_is_unauthorized() {
    let base = spawn_stub(Router::new().route("/v1beta/models/:model", post(generate_content))).await;
    let settings = settings(base);
    let backend = Arc::new(GeminiBackend::new(&settings).unwrap());
    let client = ModelClient::new(
        backend,
        ConfigProvider::new(None, Some("wrong-key".to_string())),
        settings,
    );

    let image = UploadedImage::from_bytes(PNG.to_vec(), None).unwrap();
    let err = Orchestrator::new(client).run(&image).await.unwrap_err();

    assert_eq!(err.stage(), Some(PipelineStage::Identify));
    assert_eq!(
        err.invocation_error(),
        Some(&ModelInvocationError::Unauthorized {
            status: 401,
            message: "API key not valid".to_string(),
        })
    );
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let router = Router::new().route(
        "/v1beta/models/:model",
        post(|| async { (StatusCode::TOO_MANY_REQUESTS, [("retry-after", "30")], "quota") }),
    );
    let base = spawn_stub(router).await;
    let backend = GeminiBackend::new(&settings(base)).unwrap();

    let err = backend
        .generate(&key("test-key"), &text_request())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ModelInvocationError::RateLimited {
            retry_after_secs: Some(30)
        }
    );
}

#[tokio::test]
async fn test_server_error_keeps_body() {
    let router = Router::new().route(
        "/v1beta/models/:model",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "backend exploded") }),
    );
    let base = spawn_stub(router).await;
    let backend = GeminiBackend::new(&settings(base)).unwrap();

    let err = backend
        .generate(&key("test-key"), &text_request())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ModelInvocationError::Api {
            status: 500,
            message: "backend exploded".to_string(),
        }
    );
}

#[tokio::test]
async fn test_blocked_prompt_is_empty_response() {
    let router = Router::new().route(
        "/v1beta/models/:model",
        post(|| async { Json(json!({"promptFeedback": {"blockReason": "SAFETY"}})) }),
    );
    let base = spawn_stub(router).await;
    let backend = GeminiBackend::new(&settings(base)).unwrap();

    let err = backend
        .generate(&key("test-key"), &text_request())
        .await
        .unwrap_err();
    assert_eq!(err, ModelInvocationError::EmptyResponse);
}

#[tokio::test]
async fn test_unreachable_host_is_network_error() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let backend = GeminiBackend::new(&settings(format!("http://{}/v1beta", addr))).unwrap();
    let err = backend
        .generate(&key("test-key"), &text_request())
        .await
        .unwrap_err();
    assert!(matches!(err, ModelInvocationError::Network(_)));
}
