use anyhow::{Result, anyhow};

use crate::models::product::ProductTemplateRequest;

pub fn validate_product_request(request: &ProductTemplateRequest) -> Result<()> {
    if request.products.is_empty() {
        return Err(anyhow!("Products array is required and must not be empty"));
    }

    if request.goal.trim().is_empty()
        || request.tone.trim().is_empty()
        || request.language.trim().is_empty()
    {
        return Err(anyhow!("Goal, tone, and language are required"));
    }

    Ok(())
}
