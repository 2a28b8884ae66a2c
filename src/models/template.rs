use serde::{Deserialize, Serialize};

/// Parameters for one template generation. The order of `variables` is
/// significant: the Nth label maps to placeholder `{N}` in the prompt and in
/// the generated body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateRequest {
    pub category: String,
    pub goal: String,
    pub tone: String,
    pub language: String,
    pub variables: Vec<String>,
}
