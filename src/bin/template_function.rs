//! Stdin/stdout shim around the function handlers: reads one event record,
//! writes one response record. The handler is selected by function name.

use std::io::Read;

use anyhow::{Error, Result, anyhow};
use tracing_subscriber::EnvFilter;

use template_service::{
    config::Config,
    function::{self, FunctionEvent},
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Logs go to stderr; stdout carries only the response record.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let function_name = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "generate_template".to_string());

    let mut input = String::new();
    std::io::stdin().read_to_string(&mut input)?;

    let event: FunctionEvent = serde_json::from_str(&input)?;
    let config = Config::load()?;

    let response = match function_name.as_str() {
        "generate_template" => function::handle(event, &config).await,
        "generate_product_templates" => function::handle_products(event, &config).await,
        other => return Err(anyhow!("Unknown function: {}", other)),
    };

    println!("{}", serde_json::to_string(&response)?);

    Ok(())
}
