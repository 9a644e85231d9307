use anyhow::{Context, Result};
use axum::serve;
use tokio::net::TcpListener;
use tracing::info;
use wsr_core::RelayConfig;

use crate::http::{AppState, build_router};

/// Binds the listener and serves until Ctrl-C or SIGTERM.
pub async fn run(config: RelayConfig) -> Result<()> {
    let state = AppState::from_config(&config)?;
    let router = build_router(state);

    let addr = config.bind_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("bind {addr}"))?;
    info!(
        addr = %addr,
        channel_id = %config.channel_id,
        api_base = %config.api_base,
        "websub-relay listening"
    );

    serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("websub-relay stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "SIGTERM handler unavailable");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
