use anyhow::{Error, Result};
use tracing_subscriber::EnvFilter;

use template_service::{api::run_api_server, config::Config};

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    run_api_server(config).await
}
