pub mod product;

/// Builds the instruction prompt for one WhatsApp template generation.
///
/// Variable order is load-bearing: the label at index `i` becomes the
/// definition line for placeholder `{i+1}`, and the placeholder list is
/// emitted in the same ascending order.
pub fn build_prompt(
    category: &str,
    goal: &str,
    tone: &str,
    language: &str,
    variables: &[String],
) -> String {
    let variable_definitions = variables
        .iter()
        .enumerate()
        .map(|(i, label)| format!("- {{{}}} → {}", i + 1, label))
        .collect::<Vec<_>>()
        .join("\n");

    let placeholder_list = (1..=variables.len())
        .map(|n| format!("{{{}}}", n))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a WhatsApp messaging expert trained in Meta's Template Guidelines.\n\
         \n\
         Generate a Meta-compliant WhatsApp message body only (no footer, no buttons).\n\
         \n\
         Context:\n\
         - Category: {category}\n\
         - Goal: {goal}\n\
         - Tone: {tone}\n\
         - Language: {language}\n\
         \n\
         Include the following variables in numerical order using double curly braces:\n\
         {variable_definitions}\n\
         \n\
         Rules:\n\
         - Use placeholders in order: {placeholder_list}\n\
         - Avoid overly promotional phrases like 'Buy now', 'Click here', etc.\n\
         - Stay under 1024 characters\n\
         - Avoid buttons, footers, emojis excessively, or formatting like *bold* or _italics_\n\
         - Do not include shortened URLs or previews\n\
         - Follow Meta's Business and Messaging policies strictly\n\
         \n\
         Output only the message body. No explanation or formatting."
    )
}
