use serde::{Deserialize, Serialize};

/// Fallback body returned to callers whenever generation fails.
pub const FALLBACK_CONTENT: &str = "Error generating template. Please try again.";

/// Response envelope for template generation. `content` is always present;
/// callers distinguish failure by the presence of `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub content: String,
}

impl TemplateResponse {
    pub fn success(content: String) -> Self {
        Self {
            error: None,
            content,
        }
    }

    pub fn failure(error: String) -> Self {
        Self {
            error: Some(error),
            content: FALLBACK_CONTENT.to_string(),
        }
    }
}

/// Validation-error envelope for the product-aware endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductErrorResponse {
    pub error: String,
    pub success: bool,
}

impl ProductErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            success: false,
        }
    }
}
