//! GroupDesk server entry point.

use std::error::Error;
use std::future::Future;
use std::io;
use std::sync::Arc;

use tokio::sync::watch;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use groupdesk::adapters::{
    api_router, with_server_layers, InMemoryDocumentStore, JwtSessionValidator,
    PostgresDocumentStore,
};
use groupdesk::application::{DailyAggregationScheduler, DailyMessageAggregator};
use groupdesk::config::{AppConfig, StoreBackend};
use groupdesk::ports::DocumentStore;

type BoxError = Box<dyn Error + Send + Sync>;

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if config.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

async fn wait_for_shutdown(mut rx: watch::Receiver<bool>) {
    while !*rx.borrow() {
        if rx.changed().await.is_err() {
            return;
        }
    }
}

/// Flips the shutdown flag once `signal` fires.
///
/// If the signal cannot be installed the sender is held open, so the server
/// keeps running instead of treating a closed channel as a shutdown request.
async fn forward_shutdown_signal<F>(signal: F, tx: watch::Sender<bool>)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            tracing::info!("shutdown signal received");
            let _ = tx.send(true);
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to listen for shutdown signal; Ctrl-C is disabled");
            std::future::pending::<()>().await;
            drop(tx);
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    let config = AppConfig::load()?;
    config.validate()?;
    init_tracing(&config);

    let postgres = match config.store.backend {
        StoreBackend::Postgres => {
            let store = PostgresDocumentStore::connect(&config.store).await?;
            if config.store.run_migrations {
                store.migrate().await?;
                tracing::info!("migrations applied");
            }
            Some(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory document store; data is lost on exit");
            None
        }
    };
    let store: Arc<dyn DocumentStore> = match &postgres {
        Some(store) => Arc::new(store.clone()),
        None => Arc::new(InMemoryDocumentStore::new()),
    };

    let validator = Arc::new(JwtSessionValidator::new(
        &config.auth.jwt_secret,
        config.auth.issuer.clone(),
    ));
    let aggregator = Arc::new(
        DailyMessageAggregator::new(store.clone())
            .with_scan_concurrency(config.aggregator.scan_concurrency),
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let scheduler_task = if config.aggregator.enabled {
        let scheduler =
            DailyAggregationScheduler::new(aggregator.clone(), config.aggregator.run_hour_utc);
        let rx = shutdown_rx.clone();
        Some(tokio::spawn(async move { scheduler.run(rx).await }))
    } else {
        None
    };

    tokio::spawn(forward_shutdown_signal(tokio::signal::ctrl_c(), shutdown_tx));

    let app = with_server_layers(api_router(store, validator, aggregator), &config.server);
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, environment = ?config.server.environment, "groupdesk listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown(shutdown_rx))
        .await?;

    if let Some(task) = scheduler_task {
        if let Err(e) = task.await {
            tracing::error!(error = %e, "aggregation scheduler task failed");
        }
    }
    if let Some(store) = postgres {
        store.close().await;
    }

    tracing::info!("groupdesk stopped");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn signal_requests_shutdown() {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(forward_shutdown_signal(async { Ok(()) }, tx));

        tokio::time::timeout(Duration::from_secs(1), wait_for_shutdown(rx))
            .await
            .expect("shutdown should be requested");
    }

    #[tokio::test]
    async fn failed_signal_listener_keeps_server_running() {
        let (tx, rx) = watch::channel(false);
        tokio::spawn(forward_shutdown_signal(
            async { Err(io::Error::new(io::ErrorKind::Other, "no signal handler")) },
            tx,
        ));

        let waited = tokio::time::timeout(Duration::from_millis(100), wait_for_shutdown(rx.clone())).await;
        assert!(waited.is_err(), "server must not stop when the listener fails");
        assert!(!*rx.borrow());
    }
}
