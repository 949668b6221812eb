//! RAG server binary
//!
//! Run with: cargo run -p text-rag --bin text-rag-server

use text_rag::{config::RagConfig, providers::OpenAiClient, server::RagServer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "text_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                      Text RAG Server                      ║
║           Document Q&A with Source Citations              ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration; a missing OPENAI_API_KEY is fatal here.
    let config = RagConfig::from_env()?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data file: {}", config.corpus.data_file.display());
    tracing::info!("  - Index dir: {}", config.index.dir.display());
    tracing::info!("  - Embedding model: {}", config.openai.embed_model);
    tracing::info!("  - Chat model: {}", config.openai.chat_model);
    tracing::info!(
        "  - Chunking: {} chars, {} overlap",
        config.chunking.chunk_size,
        config.chunking.chunk_overlap
    );

    // Check the upstream API
    tracing::info!("Checking OpenAI API at {}...", config.openai.base_url);
    let client = OpenAiClient::new(config.openai.clone())?;
    match client.health_check().await {
        Ok(true) => {
            tracing::info!("OpenAI API is reachable");
        }
        _ => {
            tracing::warn!("OpenAI API not reachable at {}", config.openai.base_url);
            tracing::warn!("Check OPENAI_API_KEY and network access;");
            tracing::warn!("requests will fail until the API is available");
        }
    }

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("  API Info: http://{}/api/info", server.address());
    println!("\nEndpoints:");
    println!("  POST /api/ask  - Ask questions");
    println!("  GET  /api/info - Service info");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
