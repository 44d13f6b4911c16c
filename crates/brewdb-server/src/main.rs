mod api;
mod middleware;
mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use brewdb_catalog::SnapshotStore;
use brewdb_source::BreweryApiClient;

use crate::{
    api::{build_app, AppState},
    middleware::AuthState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Arc::new(brewdb_core::load_app_config()?);
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let store = Arc::new(SnapshotStore::new());
    let client = BreweryApiClient::with_base_url(
        &config.upstream_base_url,
        config.request_timeout_secs,
        &config.user_agent,
        config.max_retries,
        config.retry_backoff_base_secs,
    )?;
    let refresher = Arc::new(scheduler::Refresher::new(
        Arc::clone(&store),
        client,
        &config,
    ));

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let refresh_task = tokio::spawn({
        let refresher = Arc::clone(&refresher);
        async move { refresher.run(shutdown_rx).await }
    });

    let auth = AuthState::from_env(matches!(config.env, brewdb_core::Environment::Development))?;
    let app = build_app(
        AppState {
            store,
            refresher,
            config: Arc::clone(&config),
        },
        auth,
    );

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The server has drained; stop the refresh loop before exiting.
    let _ = shutdown_tx.send(true);
    refresh_task.await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
