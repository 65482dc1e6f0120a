use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wishwall::config::AppConfig;
use wishwall::http;
use wishwall::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| "wishwall=info,tower_http=info".into());
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let state = AppState::from_config(&config).await?;
    tracing::info!(
        database_url = %config.database_url,
        upload_dir = %config.upload_dir.display(),
        upload_max_bytes = config.upload_max_bytes,
        "wish wall ready"
    );
    if state.admin_token.is_none() {
        tracing::info!("ADMIN_TOKEN not set, wish deletion is disabled");
    }

    let app = http::router(state).layer(TraceLayer::new_for_http());
    let listener = tokio::net::TcpListener::bind(config.http_addr).await?;
    tracing::info!("listening on {}", config.http_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

/// Resolves on Ctrl+C, or SIGTERM on unix.
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => tracing::info!("received Ctrl+C, shutting down"),
                    _ = sigterm.recv() => tracing::info!("received SIGTERM, shutting down"),
                }
                return;
            }
            Err(err) => tracing::warn!(error = %err, "cannot listen for SIGTERM"),
        }
    }

    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    tracing::info!("received Ctrl+C, shutting down");
}
