use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ButtonConfig {
    #[serde(rename = "type")]
    pub button_type: String,
    pub text: String,
}

/// Parameters for product-aware generation. One template is produced per
/// product; `variables` carries the same ordinal placeholder mapping as
/// [`TemplateRequest`](crate::models::template::TemplateRequest), rendered
/// with double braces (`{{1}}`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplateRequest {
    pub products: Vec<Product>,
    pub goal: String,
    pub tone: String,
    pub language: String,

    #[serde(default)]
    pub variables: Vec<String>,

    #[serde(default)]
    pub custom_prompt: String,

    #[serde(default)]
    pub add_buttons: bool,

    #[serde(default)]
    pub button_config: Option<ButtonConfig>,
}

/// One generated template. `variables` maps each approved placeholder token
/// (`"{{1}}"`) back to the label it stands for.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductTemplate {
    pub product: String,
    pub content: String,
    pub variables: HashMap<String, String>,
}

/// Placeholder map for the approved variable list, keyed `{{1}}..{{N}}`.
pub fn variable_map(variables: &[String]) -> HashMap<String, String> {
    variables
        .iter()
        .enumerate()
        .map(|(i, label)| (format!("{{{{{}}}}}", i + 1), label.clone()))
        .collect()
}
