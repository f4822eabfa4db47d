//! FlavoursVerse
//!
//! An MCP server for ingredient substitutes, flavor profiles, dietary
//! analysis and recipe nutrition.

use std::sync::Arc;

use flavoursverse::api::HttpApiClient;
use flavoursverse::build_info;
use flavoursverse::config::Config;
use flavoursverse::mcp::FlavoursVerseService;
use rmcp::ServiceExt;
use tokio::io::{stdin, stdout};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging (output to stderr to not interfere with MCP stdio)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("flavoursverse=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    // Print startup banner to stderr
    build_info::print_startup_banner();
    eprintln!("Starting MCP server on stdio...");

    let config = Config::from_env()?;
    eprintln!("API URL: {}", config.api_url);
    eprintln!("Export directory: {}", config.export_dir.display());

    let api = HttpApiClient::builder(config.api_url.clone())
        .timeout(config.api_timeout)
        .build()?;

    // Create the FlavoursVerse service
    let service = FlavoursVerseService::new(&config, Arc::new(api));

    // Create stdio transport
    let transport = (stdin(), stdout());

    // Start the MCP server
    let server = service.serve(transport).await?;

    // Wait for the server to complete
    server.waiting().await?;

    Ok(())
}
