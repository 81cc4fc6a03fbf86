use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use lifeops::config::AppConfig;
use lifeops::llm::{LlmProvider, create_provider};
use lifeops::store::{Database, LibSqlBackend};
use lifeops::web::{AppState, build_router};

/// How often idle sessions are swept.
const PRUNE_INTERVAL: Duration = Duration::from_secs(300);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .map_err(|_| anyhow::anyhow!("Failed to install rustls crypto provider"))?;

    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env().context("invalid configuration")?;

    eprintln!("🌱 LifeOps v{}", env!("CARGO_PKG_VERSION"));

    // ── LLM ─────────────────────────────────────────────────────────────
    let llm: Option<Arc<dyn LlmProvider>> = match &config.llm {
        Some(llm_config) => {
            eprintln!("   Model: {}", llm_config.model);
            Some(create_provider(llm_config).context("failed to create LLM provider")?)
        }
        None => {
            eprintln!("   Model: none (default recommendations only)");
            None
        }
    };

    // ── Database ────────────────────────────────────────────────────────
    let db: Arc<dyn Database> = Arc::new(
        LibSqlBackend::new_local(&config.db_path)
            .await
            .with_context(|| format!("failed to open database at {}", config.db_path.display()))?,
    );
    eprintln!("   Database: {}", config.db_path.display());

    let state = AppState::new(db, llm, &config);

    // Sweep idle sessions in the background
    let sessions = Arc::clone(&state.sessions);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(PRUNE_INTERVAL);
        loop {
            ticker.tick().await;
            let pruned = sessions.prune_idle().await;
            if pruned > 0 {
                tracing::info!(pruned, "Pruned idle sessions");
            }
        }
    });

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind port {}", config.port))?;
    eprintln!("   API: http://0.0.0.0:{}/api\n", config.port);
    tracing::info!(port = config.port, "LifeOps server started");

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
