//! Product-aware prompt assembly and model-output sanitization.
//!
//! Product templates use double-brace placeholders (`{{1}}`) and a strict
//! allow-list: the model may only use the placeholders derived from the
//! caller's variable list, and anything else is stripped from its output.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::models::openai::{ChatCompletionRequest, ChatMessage};
use crate::models::product::{Product, ProductTemplate, ProductTemplateRequest, variable_map};

/// System message sent with every product-aware completion request.
pub const PRODUCT_SYSTEM_PROMPT: &str = "You are an expert WhatsApp Business template writer \
     specializing in product-specific messaging. Create engaging, personalized templates that \
     highlight product benefits and drive action. Always include strategic emoji usage and \
     proper formatting for WhatsApp.";

static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\d+\}\}").expect("Invalid placeholder regex"));

fn placeholder_token(n: usize) -> String {
    format!("{{{{{}}}}}", n)
}

fn approved_placeholders(variables: &[String]) -> Vec<String> {
    (1..=variables.len()).map(placeholder_token).collect()
}

/// Builds the generation prompt for a single product.
pub fn build_product_prompt(product: &Product, request: &ProductTemplateRequest) -> String {
    let variables = &request.variables;
    let approved = approved_placeholders(variables).join(", ");

    let variable_section = if variables.is_empty() {
        format!(
            "CRITICAL: NO VARIABLES SELECTED\n\
             - Do NOT use any {{{{1}}}}, {{{{2}}}}, {{{{3}}}} or ANY variable placeholders\n\
             - Generate PLAIN TEXT content only\n\
             - Any use of {{{{}}}} will result in IMMEDIATE REJECTION\n\
             - Example: \"Your {name} is ready!\" NOT \"{{{{1}}}}, your {name} is ready!\"",
            name = product.name
        )
    } else {
        let mapping = variables
            .iter()
            .enumerate()
            .map(|(i, label)| format!("{} = {}", placeholder_token(i + 1), label))
            .collect::<Vec<_>>()
            .join(", ");

        format!(
            "CRITICAL VARIABLE RESTRICTIONS:\n\
             - MAXIMUM {count} variables allowed: {approved}\n\
             - Variable mapping: {mapping}\n\
             - You CANNOT use {next}, {next_next} or any higher numbers\n\
             - You CANNOT create new variables beyond the approved list\n\
             - Each approved variable MUST be used at least once\n\
             - Using unauthorized variables = IMMEDIATE TEMPLATE REJECTION\n\
             \n\
             APPROVED VARIABLES ONLY: {approved}\n\
             FORBIDDEN: Any variable not in the above list",
            count = variables.len(),
            approved = approved,
            mapping = mapping,
            next = placeholder_token(variables.len() + 1),
            next_next = placeholder_token(variables.len() + 2),
        )
    };

    let (audience, context) = goal_guidance(&request.goal, product);

    let custom_instructions = if request.custom_prompt.trim().is_empty() {
        "None".to_string()
    } else {
        request.custom_prompt.clone()
    };

    let button_instructions = match (&request.button_config, request.add_buttons) {
        (Some(button), true) => format!(
            "\nBUTTON REQUIREMENTS:\n\
             - Add a {} button with text: \"{}\"\n\
             - Button should be relevant to the {} context\n\
             - Include button in the BUTTONS section of your response\n",
            button.button_type, button.text, request.goal
        ),
        _ => String::new(),
    };

    let usage_patterns = match variables.len() {
        0 => String::new(),
        1 => format!(
            "\nVARIABLE USAGE PATTERNS (MANDATORY):\n\
             - Start with: \"Hi {{{{1}}}}, your {}...\"\n",
            product.name
        ),
        2 => "\nVARIABLE USAGE PATTERNS (MANDATORY):\n\
              - Pattern: \"Hi {{1}}, your {{2}} is...\"\n"
            .to_string(),
        3 => "\nVARIABLE USAGE PATTERNS (MANDATORY):\n\
              - Pattern: \"Hi {{1}}, your {{2}} order {{3}}...\"\n"
            .to_string(),
        _ => "\nVARIABLE USAGE PATTERNS (MANDATORY):\n\
              - Pattern: \"Hi {{1}}, your {{2}} with {{3}} expires {{4}}...\"\n"
            .to_string(),
    };

    format!(
        "You are creating a WhatsApp Business template for a specific product. Generate \
         engaging, emoji-rich content that follows Meta's guidelines.\n\
         \n\
         PRODUCT INFORMATION:\n\
         - Name: {name}\n\
         - Description: {description}\n\
         \n\
         TEMPLATE REQUIREMENTS:\n\
         - Use Case: {goal}\n\
         - Tone: {tone} ({tone_guidance})\n\
         - Language: {language} ({language_guidance})\n\
         \n\
         TARGET AUDIENCE:\n\
         - {audience}\n\
         - {context}\n\
         \n\
         {variable_section}\n\
         \n\
         CUSTOM INSTRUCTIONS:\n\
         {custom_instructions}\n\
         {button_instructions}\
         \n\
         CRITICAL FORMATTING REQUIREMENTS:\n\
         - Include 3-5 relevant emojis strategically placed\n\
         - MUST use proper line breaks (\\n\\n for paragraph separation)\n\
         - MUST be under 1000 characters total (WhatsApp limit)\n\
         - Sound natural and {tone_lower}, NOT robotic\n\
         - Highlight {name} benefits from description\n\
         - Create appropriate urgency for {goal}\n\
         - Follow Meta's WhatsApp Business guidelines\n\
         - Include product-specific details and benefits\n\
         {usage_patterns}\
         \n\
         FINAL VALIDATION CHECKLIST:\n\
         - Used exactly {count} variables (no more, no less)\n\
         - Only used approved variables: {approved}\n\
         - Product name \"{name}\" mentioned\n\
         - Under 1000 characters\n\
         - 3-5 emojis included\n\
         - Proper line breaks used\n\
         \n\
         Generate ONLY the WhatsApp message content. Use EXACTLY {count} variables: {approved}",
        name = product.name,
        description = product.description,
        goal = request.goal,
        tone = request.tone,
        tone_guidance = tone_guidance(&request.tone),
        language = request.language,
        language_guidance = language_guidance(&request.language),
        audience = audience,
        context = context,
        variable_section = variable_section,
        custom_instructions = custom_instructions,
        button_instructions = button_instructions,
        usage_patterns = usage_patterns,
        tone_lower = request.tone.to_lowercase(),
        count = variables.len(),
        approved = approved,
    )
}

/// The completion request for one product: fixed system message plus the
/// product prompt, with the sampling profile tuned for template writing.
pub fn product_completion_request(model: &str, prompt: String) -> ChatCompletionRequest {
    ChatCompletionRequest {
        model: model.to_string(),
        messages: vec![
            ChatMessage::system(PRODUCT_SYSTEM_PROMPT),
            ChatMessage::user(prompt),
        ],
        max_tokens: Some(400),
        temperature: Some(0.8),
        top_p: Some(0.9),
        frequency_penalty: Some(0.3),
        presence_penalty: Some(0.4),
    }
}

/// Sanitizes one generated template. Placeholders outside the approved set
/// are replaced with `[VARIABLE_REMOVED]`; a count mismatch is logged only.
pub fn parse_product_response(
    content: &str,
    product_name: &str,
    variables: &[String],
) -> ProductTemplate {
    let clean_content = content.trim();
    let approved = approved_placeholders(variables);

    let mut found = Vec::new();
    for token in PLACEHOLDER_REGEX.find_iter(clean_content) {
        let token = token.as_str().to_string();
        if !found.contains(&token) {
            found.push(token);
        }
    }

    let unauthorized: Vec<String> = found
        .iter()
        .filter(|token| !approved.contains(token))
        .cloned()
        .collect();

    let final_content = if unauthorized.is_empty() {
        if !variables.is_empty() && found.len() != variables.len() {
            warn!(
                product = %product_name,
                expected = variables.len(),
                found = found.len(),
                "Placeholder count mismatch in generated template"
            );
        }
        clean_content.to_string()
    } else {
        warn!(
            product = %product_name,
            unauthorized = ?unauthorized,
            "Removing unauthorized placeholders from generated template"
        );

        let mut sanitized = clean_content.to_string();
        for token in &unauthorized {
            sanitized = sanitized.replace(token, "[VARIABLE_REMOVED]");
        }
        sanitized
    };

    ProductTemplate {
        product: product_name.to_string(),
        content: final_content,
        variables: variable_map(variables),
    }
}

/// Deterministic template used when the completion call for a product fails.
/// The body pattern is keyed on the variable count so it never references a
/// placeholder outside the approved set.
pub fn fallback_template(product: &Product, variables: &[String]) -> ProductTemplate {
    debug!(
        product = %product.name,
        variable_count = variables.len(),
        "Using fallback template"
    );

    let snippet = |limit: usize| product.description.chars().take(limit).collect::<String>();

    let content = match variables.len() {
        0 => format!(
            "Your {} is waiting for you! 🌟\n\n{}...\n\nComplete your purchase now! ✨\n\nDon't miss out! 💫",
            product.name,
            snippet(100)
        ),
        1 => format!(
            "{{{{1}}}}, your {} is waiting! 🌟\n\n{}...\n\nComplete your purchase now! ✨\n\nDon't miss out! 💫",
            product.name,
            snippet(80)
        ),
        2 => format!(
            "{{{{1}}}}, your {{{{2}}}} is waiting! 🌟\n\n{}...\n\nComplete your purchase now! ✨\n\nDon't miss out! 💫",
            snippet(70)
        ),
        3 => format!(
            "{{{{1}}}}, your {{{{2}}}} order {{{{3}}}} is ready! 🌟\n\n{}...\n\nComplete your purchase! ✨\n\nDon't miss out! 💫",
            snippet(60)
        ),
        4 => format!(
            "{{{{1}}}}, your {{{{2}}}} with {{{{3}}}} expires {{{{4}}}}! 🌟\n\n{}...\n\nAct now! ✨\n\nDon't miss out! 💫",
            snippet(50)
        ),
        _ => format!(
            "{{{{1}}}}, get {{{{5}}}} off {{{{2}}}}! Order {{{{3}}}} delivers {{{{4}}}}! 🌟\n\n{}...\n\nAct now! ✨",
            snippet(40)
        ),
    };

    ProductTemplate {
        product: product.name.clone(),
        content,
        variables: variable_map(variables),
    }
}

fn goal_guidance(goal: &str, product: &Product) -> (&'static str, String) {
    match goal {
        "Abandoned Checkout" => (
            "Customers who left products in cart",
            format!(
                "Gently remind about {} left in cart. Highlight product benefits from \
                 description: \"{}\". Create mild urgency without being pushy. Focus on value \
                 and results they'll get.",
                product.name, product.description
            ),
        ),
        "Order Confirmation" => (
            "Customers who just purchased",
            format!(
                "Confirm {} purchase. Reference product benefits: \"{}\". Show excitement and \
                 gratitude. Provide reassurance about their choice.",
                product.name, product.description
            ),
        ),
        "Cross-sell" => (
            "Customers viewing related products",
            format!(
                "Suggest {} as perfect addition. Use product description: \"{}\" to show \
                 complementary benefits. Create desire for complete solution.",
                product.name, product.description
            ),
        ),
        "Product Launch" => (
            "Interested customers and subscribers",
            format!(
                "Introduce new {} with excitement. Highlight innovative features: \"{}\". \
                 Create anticipation and early-bird urgency.",
                product.name, product.description
            ),
        ),
        "Restock Alert" => (
            "Customers waiting for product",
            format!(
                "Notify that {} is back in stock. Remind of benefits: \"{}\". Create urgency \
                 due to high demand and limited quantity.",
                product.name, product.description
            ),
        ),
        "Review Request" => (
            "Customers who purchased recently",
            format!(
                "Request review for {}. Reference their experience with product benefits: \
                 \"{}\". Make it easy and show appreciation.",
                product.name, product.description
            ),
        ),
        // "Upsell" and anything unrecognized
        _ => (
            "Existing customers",
            format!(
                "Recommend {} as complementary product. Highlight unique benefits: \"{}\". \
                 Show how it enhances their current routine/purchase.",
                product.name, product.description
            ),
        ),
    }
}

fn tone_guidance(tone: &str) -> &'static str {
    match tone {
        "Persuasive" => "Compelling but not aggressive. Focus on benefits and create desire.",
        "Informative" => "Clear, factual, helpful. Provide value through information.",
        "Promotional" => "Exciting, offer-focused. Highlight deals and limited-time opportunities.",
        "Friendly" => "Warm, approachable, supportive. Make customer feel valued and cared for.",
        // "Conversational" and anything unrecognized
        _ => "Friendly, natural, like talking to a friend. Use contractions and casual language.",
    }
}

fn language_guidance(language: &str) -> &'static str {
    match language {
        "Hindi" => "Use simple Hindi with appropriate honorifics (आप, जी). Cultural sensitivity.",
        // "English" and anything unrecognized
        _ => "Use clear, professional English. Modern business communication style.",
    }
}
