//! Policy analysis server binary
//!
//! Run with: cargo run -p polilens --bin polilens-server

use polilens::{config::PolilensConfig, server::PolicyServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "polilens=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration (POLILENS_CONFIG points at a TOML file)
    let config = match std::env::var("POLILENS_CONFIG") {
        Ok(path) => {
            tracing::info!("Loading configuration from {}", path);
            PolilensConfig::from_file(&path)?
        }
        Err(_) => PolilensConfig::default(),
    };

    tracing::info!("Configuration loaded");
    tracing::info!("  - Classifier model: {}", config.classifier.default_model);
    tracing::info!("  - Chunk size: {}", config.chunking.chunk_size);
    tracing::info!("  - LLM model: {}", config.llm.model);
    tracing::info!("  - LLM endpoint: {}", config.llm.base_url);

    // Create server (fails fast on a missing API key)
    let server = PolicyServer::new(config)?;

    // Probe the generation backend; the server still starts without it so
    // classification-only analysis keeps working.
    if server.state().pipeline().llm_health().await {
        tracing::info!("LLM backend is reachable");
    } else {
        tracing::warn!("LLM backend is not reachable; explanations, summaries, and chat will fail");
    }

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /api/models       - List classifier models");
    println!("  POST /api/analyze-url  - Analyze a policy by URL");
    println!("  POST /api/analyze-text - Analyze pasted policy text");
    println!("  POST /api/chat         - Ask about the analyzed policy");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
