//! Mock Bedrock server binary.
//!
//! Listens on `$PORT` (default 8080) and serves synthetic model invocations
//! until Ctrl+C. Set `RUST_LOG` to adjust log verbosity.

use mock_bedrock::{MockServer, ModelCatalog, ServerConfig};
use std::sync::Arc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let catalog = Arc::new(ModelCatalog::builtin());

    let server = MockServer::start(Arc::clone(&catalog), &config)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "mock bedrock failed to start");
            anyhow::anyhow!("mock-bedrock failed: {e}")
        })?;

    println!(
        "Mock Bedrock server running on http://localhost:{}",
        server.port()
    );
    println!("Available models:");
    for id in catalog.ids() {
        println!("  - {id}");
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("received Ctrl+C, shutting down...");
    server.shutdown();

    Ok(())
}
