use std::sync::Arc;

use anyhow::{Error, Result};
use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    clients::openai::OpenAiClient,
    config::Config,
    models::{
        health::HealthCheckResponse,
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

pub struct AppState {
    openai: OpenAiClient,
    config: Config,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        Self {
            openai: OpenAiClient::new(config),
            config: config.clone(),
        }
    }
}

pub fn router(config: &Config) -> Router {
    let state = Arc::new(AppState::new(config));

    Router::new()
        .route("/generate_template", post(generate_template))
        .route("/generate_product_templates", post(generate_product_templates))
        .route("/health", get(health_check))
        .layer(cors_layer(config))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn run_api_server(config: Config) -> Result<(), Error> {
    let app = router(&config);

    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = TcpListener::bind(&addr).await?;

    info!(address = %addr, "Template generation server started");

    axum::serve(listener, app).await?;

    Ok(())
}

// A literal wildcard cannot be combined with allow_credentials, so the open
// default mirrors whatever origin, method and headers the request carries.
fn cors_layer(config: &Config) -> CorsLayer {
    if config.cors_allowed_origins.trim() == "*" {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(AllowMethods::mirror_request())
            .allow_headers(AllowHeaders::mirror_request())
            .allow_credentials(true)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .split(',')
            .filter_map(|origin| origin.trim().parse().ok())
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

/// Generates one template body. Failures keep status 200 and are signalled
/// through the `error` key of the envelope; callers on this path expect the
/// status code to never change.
async fn generate_template(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TemplateRequest>,
) -> Json<TemplateResponse> {
    let request_id = Uuid::new_v4();

    info!(
        request_id = %request_id,
        category = %request.category,
        language = %request.language,
        variable_count = request.variables.len(),
        "Generating template"
    );

    let prompt = build_prompt(
        &request.category,
        &request.goal,
        &request.tone,
        &request.language,
        &request.variables,
    );

    match state.openai.complete(&prompt).await {
        Ok(content) => {
            info!(request_id = %request_id, "Template generated");
            Json(TemplateResponse::success(content))
        }
        Err(e) => {
            warn!(request_id = %request_id, error = %e, "Template generation failed");
            Json(TemplateResponse::failure(e.to_string()))
        }
    }
}

/// Generates one template per product. A failed completion for a single
/// product substitutes a deterministic fallback instead of failing the
/// request.
async fn generate_product_templates(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ProductTemplateRequest>,
) -> Response {
    let request_id = Uuid::new_v4();

    if let Err(e) = validate_product_request(&request) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ProductErrorResponse::new(e.to_string())),
        )
            .into_response();
    }

    info!(
        request_id = %request_id,
        product_count = request.products.len(),
        goal = %request.goal,
        "Generating product templates"
    );

    let mut templates: Vec<ProductTemplate> = Vec::with_capacity(request.products.len());

    for product in &request.products {
        let prompt = build_product_prompt(product, &request);
        let completion_request =
            product_completion_request(&state.config.openai_product_model, prompt);

        match state.openai.chat(completion_request).await {
            Ok(content) => {
                templates.push(parse_product_response(
                    &content,
                    &product.name,
                    &request.variables,
                ));
            }
            Err(e) => {
                warn!(
                    request_id = %request_id,
                    product = %product.name,
                    error = %e,
                    "Product template generation failed, using fallback"
                );
                templates.push(fallback_template(product, &request.variables));
            }
        }
    }

    Json(templates).into_response()
}

async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse::healthy())
}
