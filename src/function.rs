//! Single-invocation entry point for function-platform deployments.
//!
//! Receives a generic event record (`httpMethod` + JSON-encoded `body`)
//! instead of a framework request, and answers with an explicit status code,
//! header map and serialized body. Unlike the HTTP service, failures on this
//! path are reported with status 500; both conventions are load-bearing for
//! their respective callers and are deliberately kept distinct.

use std::collections::HashMap;

use anyhow::{Error, Result};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    clients::openai::OpenAiClient,
    config::Config,
    models::{
        product::{ProductTemplate, ProductTemplateRequest},
        response::{ProductErrorResponse, TemplateResponse},
        template::TemplateRequest,
        validation::validate_product_request,
    },
    prompt::{
        build_prompt,
        product::{
            build_product_prompt, fallback_template, parse_product_response,
            product_completion_request,
        },
    },
};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionEvent {
    #[serde(rename = "httpMethod")]
    pub http_method: String,

    #[serde(default)]
    pub body: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,

    pub headers: HashMap<String, String>,

    pub body: String,
}

/// Handles one template-generation invocation.
pub async fn handle(event: FunctionEvent, config: &Config) -> FunctionResponse {
    if event.http_method == "OPTIONS" {
        return preflight_response();
    }

    match generate(&event.body, config).await {
        Ok(content) => {
            info!("Template generated");
            respond(200, &TemplateResponse::success(content))
        }
        Err(e) => {
            warn!(error = %e, "Template generation failed");
            respond(500, &TemplateResponse::failure(e.to_string()))
        }
    }
}

/// Handles one product-aware invocation. Validation failures answer 400 and
/// malformed events 500, both with the `{error, success}` envelope; a failed
/// completion for a single product substitutes its fallback template.
pub async fn handle_products(event: FunctionEvent, config: &Config) -> FunctionResponse {
    if event.http_method == "OPTIONS" {
        return preflight_response();
    }

    let request: ProductTemplateRequest = match serde_json::from_str(&event.body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Malformed product template event");
            return respond(500, &ProductErrorResponse::new(e.to_string()));
        }
    };

    if let Err(e) = validate_product_request(&request) {
        return respond(400, &ProductErrorResponse::new(e.to_string()));
    }

    let client = OpenAiClient::new(config);
    let mut templates: Vec<ProductTemplate> = Vec::with_capacity(request.products.len());

    for product in &request.products {
        let prompt = build_product_prompt(product, &request);
        let completion_request =
            product_completion_request(&config.openai_product_model, prompt);

        match client.chat(completion_request).await {
            Ok(content) => {
                templates.push(parse_product_response(
                    &content,
                    &product.name,
                    &request.variables,
                ));
            }
            Err(e) => {
                warn!(
                    product = %product.name,
                    error = %e,
                    "Product template generation failed, using fallback"
                );
                templates.push(fallback_template(product, &request.variables));
            }
        }
    }

    respond(200, &templates)
}

async fn generate(body: &str, config: &Config) -> Result<String, Error> {
    let request: TemplateRequest = serde_json::from_str(body)?;

    let prompt = build_prompt(
        &request.category,
        &request.goal,
        &request.tone,
        &request.language,
        &request.variables,
    );

    // Constructed per invocation; function platforms give no process to pin
    // a shared client to.
    let client = OpenAiClient::new(config);
    client.complete(&prompt).await
}

fn preflight_response() -> FunctionResponse {
    let mut headers = HashMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert(
        "Access-Control-Allow-Headers".to_string(),
        "Content-Type".to_string(),
    );
    headers.insert(
        "Access-Control-Allow-Methods".to_string(),
        "POST, OPTIONS".to_string(),
    );

    FunctionResponse {
        status_code: 200,
        headers,
        body: String::new(),
    }
}

fn respond<T: Serialize>(status_code: u16, body: &T) -> FunctionResponse {
    let mut headers = HashMap::new();
    headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
    headers.insert("Content-Type".to_string(), "application/json".to_string());

    FunctionResponse {
        status_code,
        headers,
        body: serde_json::to_string(body).unwrap_or_default(),
    }
}
