use anyhow::Result;
use serde_json::{Value, json};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use template_service::{
    config::Config,
    function::{FunctionEvent, handle, handle_products},
};

fn test_config(base_url: &str) -> Config {
    Config {
        openai_api_key: "test-key".to_string(),
        openai_base_url: base_url.to_string(),
        openai_model: "gpt-3.5-turbo".to_string(),
        openai_product_model: "gpt-4o-mini".to_string(),
        cors_allowed_origins: "*".to_string(),
        server_port: 0,
    }
}

fn completion_body(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "model": "gpt-3.5-turbo",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

fn post_event(body: Value) -> FunctionEvent {
    FunctionEvent {
        http_method: "POST".to_string(),
        body: body.to_string(),
    }
}

/// Test: OPTIONS yields 200, an empty body and the three CORS headers
#[tokio::test]
async fn test_preflight_response() -> Result<()> {
    let event = FunctionEvent {
        http_method: "OPTIONS".to_string(),
        body: String::new(),
    };

    let response = handle(event, &test_config("http://127.0.0.1:1")).await;

    assert_eq!(response.status_code, 200);
    assert!(response.body.is_empty());
    assert_eq!(
        response.headers.get("Access-Control-Allow-Origin").map(String::as_str),
        Some("*")
    );
    assert_eq!(
        response.headers.get("Access-Control-Allow-Headers").map(String::as_str),
        Some("Content-Type")
    );
    assert_eq!(
        response.headers.get("Access-Control-Allow-Methods").map(String::as_str),
        Some("POST, OPTIONS")
    );

    Ok(())
}

/// Test: A successful invocation yields 200 and the generated content
#[tokio::test]
async fn test_successful_invocation() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Hi {1}, enjoy {2}% off!",
        )))
        .mount(&mock_server)
        .await;

    let event = post_event(json!({
        "category": "Promo",
        "goal": "Announce sale",
        "tone": "Friendly",
        "language": "English",
        "variables": ["name", "discount"]
    }));

    let response = handle(event, &test_config(&mock_server.uri())).await;

    assert_eq!(response.status_code, 200);
    assert_eq!(
        response.headers.get("Access-Control-Allow-Origin").map(String::as_str),
        Some("*")
    );
    assert_eq!(
        response.headers.get("Content-Type").map(String::as_str),
        Some("application/json")
    );

    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body["content"], "Hi {1}, enjoy {2}% off!");
    assert!(body.get("error").is_none());

    Ok(())
}

/// Test: A body missing the goal key yields 500 and the standard envelope
#[tokio::test]
async fn test_missing_key_yields_500() -> Result<()> {
    let event = post_event(json!({
        "category": "Promo",
        "tone": "Friendly",
        "language": "English",
        "variables": []
    }));

    let response = handle(event, &test_config("http://127.0.0.1:1")).await;

    assert_eq!(response.status_code, 500);

    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body["content"], "Error generating template. Please try again.");
    assert!(body["error"].as_str().unwrap().contains("goal"));
    assert_eq!(
        response.headers.get("Access-Control-Allow-Origin").map(String::as_str),
        Some("*")
    );

    Ok(())
}

/// Test: An upstream failure yields 500, unlike the HTTP service's 200
#[tokio::test]
async fn test_upstream_failure_yields_500() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream exploded"))
        .mount(&mock_server)
        .await;

    let event = post_event(json!({
        "category": "Promo",
        "goal": "Announce sale",
        "tone": "Friendly",
        "language": "English",
        "variables": []
    }));

    let response = handle(event, &test_config(&mock_server.uri())).await;

    assert_eq!(response.status_code, 500);

    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body["content"], "Error generating template. Please try again.");
    assert!(body["error"].as_str().unwrap().contains("500"));

    Ok(())
}

/// Test: Product invocation validates before calling upstream
#[tokio::test]
async fn test_product_invocation_validation() -> Result<()> {
    let config = test_config("http://127.0.0.1:1");

    let event = post_event(json!({
        "products": [],
        "goal": "Upsell",
        "tone": "Friendly",
        "language": "English"
    }));

    let response = handle_products(event, &config).await;

    assert_eq!(response.status_code, 400);

    let body: Value = serde_json::from_str(&response.body)?;
    assert_eq!(body["success"], false);

    // Malformed event body is a 500, not a 400.
    let event = FunctionEvent {
        http_method: "POST".to_string(),
        body: "{ not json".to_string(),
    };

    let response = handle_products(event, &config).await;
    assert_eq!(response.status_code, 500);

    Ok(())
}

/// Test: Product invocation generates one template per product
#[tokio::test]
async fn test_product_invocation_success() -> Result<()> {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Hi {{1}}, your favorite is back! ✨",
        )))
        .mount(&mock_server)
        .await;

    let event = post_event(json!({
        "products": [
            {"name": "Glow Serum", "description": "Vitamin C serum for radiant skin"}
        ],
        "goal": "Restock Alert",
        "tone": "Friendly",
        "language": "English",
        "variables": ["Customer Name"]
    }));

    let response = handle_products(event, &test_config(&mock_server.uri())).await;

    assert_eq!(response.status_code, 200);

    let body: Value = serde_json::from_str(&response.body)?;
    let templates = body.as_array().unwrap();

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0]["product"], "Glow Serum");
    assert_eq!(templates[0]["variables"]["{{1}}"], "Customer Name");

    Ok(())
}
