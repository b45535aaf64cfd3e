use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use page_summarizer_backend::core::logging;
use page_summarizer_backend::server;
use page_summarizer_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let state = AppState::initialize()?;
    logging::init(&state.paths);

    let server_settings = &state.settings.server;
    let bind_addr = format!("{}:{}", server_settings.host, server_settings.port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;

    tracing::info!(
        "Listening on {} (embedding: {}, generation: {})",
        addr,
        state.engine.embedder().provider_name(),
        state.summarizer.generator().provider_name()
    );

    let app: Router = server::router(state.clone());

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
