use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::signal;
use tokio::sync::broadcast;

use lib_common::logging;

mod exchange_logic;
use exchange_logic::cache::{self, Cache};
use exchange_logic::config;
use exchange_logic::dspio::DspIo;
use exchange_logic::state::{AppState, CacheState};
use exchange_logic::{handlers, metrics, profiling, transport};

/// How long open connections get to finish after a shutdown signal.
const SHUTDOWN_DRAIN: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Explicitly install the default crypto provider for rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = config::load_config();
    logging::setup_logging(&config.log_level)?;
    metrics::register_all();

    let (shutdown_tx, _) = broadcast::channel(1);

    // Cache
    // The initial load must succeed before the listener opens; afterwards the
    // background worker keeps the snapshots warm.
    let cache_state = Arc::new(CacheState::new());
    let plan = vec![
        ("apps", cache::load_apps(config.apps_cache_path.clone())),
        ("dsps", cache::load_dsps(config.dsps_cache_path.clone())),
    ];
    let cache = Arc::new(Cache::new(cache_state.clone(), plan));
    cache.load().await.context("initial cache load")?;
    let cache_worker = cache.start(config.cache_update_interval, shutdown_tx.subscribe());

    // DSP IO
    let client = transport::build_client(&config)?;
    let dspio = Arc::new(DspIo::new(client, config.dspio_pool));
    dspio.start(&shutdown_tx);

    let app_state = Arc::new(AppState {
        cache_state,
        dspio: dspio.clone(),
        request_timeout: config.request_timeout,
    });

    let app = Router::new()
        .route("/ad", post(handlers::ad))
        .route("/ping", get(handlers::ping))
        .route("/metrics", get(handlers::metrics_text))
        .route("/debug/pprof/", get(profiling::index))
        .route("/debug/pprof/profile", get(profiling::profile))
        .route("/debug/pprof/flamegraph", get(profiling::flamegraph))
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("exchange listening on {addr}");

    // One signal fans out everywhere: the cache ticker, the pool workers and
    // the server drain all hang off the same broadcast.
    {
        let shutdown_tx = shutdown_tx.clone();
        let cache = cache.clone();
        let dspio = dspio.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            log::info!("shutdown signal received");
            let _ = shutdown_tx.send(());
            cache.stop();
            dspio.stop();
        });
    }

    let mut drain_rx = shutdown_tx.subscribe();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        let _ = drain_rx.recv().await;
    });

    let mut abort_rx = shutdown_tx.subscribe();
    tokio::select! {
        res = server.into_future() => res.context("server error")?,
        _ = async {
            let _ = abort_rx.recv().await;
            tokio::time::sleep(SHUTDOWN_DRAIN).await;
        } => {
            log::error!("shutdown drain window elapsed, aborting open connections");
        }
    }

    // Covers the no-signal exit path; a repeat send is a no-op.
    let _ = shutdown_tx.send(());
    let _ = cache_worker.await;

    log::info!("shutdown complete");
    Ok(())
}

async fn wait_for_signal() {
    #[cfg(unix)]
    {
        let mut term = signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("installing SIGTERM handler");
        tokio::select! {
            _ = signal::ctrl_c() => {},
            _ = term.recv() => {},
        }
    }
    #[cfg(not(unix))]
    {
        let _ = signal::ctrl_c().await;
    }
}
