use rmcp::ServiceExt as _;
use rmcp::transport::stdio;
use tracing_subscriber::EnvFilter;
use yapi_mcp_client::{YapiClient, load_config};
use yapi_mcp_server::YapiServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // stdout carries MCP frames; logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{e}");
            std::process::exit(2);
        }
    };
    tracing::info!(
        yapi_host = %config.yapi_host,
        timeout_ms = u64::try_from(config.timeout.as_millis()).unwrap_or(u64::MAX),
        retries = config.retries,
        "configuration loaded"
    );

    let client = YapiClient::new(config)?;
    let service = YapiServer::new(client)
        .serve(stdio())
        .await
        .inspect_err(|e| tracing::error!(error = %e, "failed to start MCP server"))?;
    tracing::info!("YApi MCP server listening on stdio");

    let reason = service.waiting().await?;
    tracing::info!(?reason, "YApi MCP server stopped");
    Ok(())
}
