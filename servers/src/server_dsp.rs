// Mock bidder used as the downstream target for the exchange. Always answers
// the same canned bid; the `latency` query parameter (or DSP_LATENCY) makes
// it sleep first so bidder slowness can be simulated per DSP.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounter, Registry, TextEncoder};
use serde::Deserialize;
use tokio::signal;

use lib_common::durations::parse_duration;
use lib_common::logging;
use lib_common::openrtb::{Bid, BidResponse, SeatBid};

#[derive(Parser, Debug, Clone)]
#[clap(name = "server_dsp")]
struct Config {
    #[clap(long, env = "DSP_PORT", default_value = "8080")]
    port: u16,

    #[clap(long, env = "DSP_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Baseline artificial latency for /bid; the `latency` query parameter
    /// overrides it per request.
    #[clap(long, env = "DSP_LATENCY", value_parser = parse_duration)]
    latency: Option<Duration>,

    #[clap(long, env = "DSP_TLS_CERT_PATH")]
    tls_cert_path: Option<PathBuf>,

    #[clap(long, env = "DSP_TLS_KEY_PATH")]
    tls_key_path: Option<PathBuf>,
}

static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

static BID_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("dsp_bid_total", "Total bid requests served")
        .unwrap_or_else(|e| panic!("counter: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

#[derive(Debug, Deserialize)]
struct BidParams {
    latency: Option<String>,
}

fn canned_bid() -> BidResponse {
    BidResponse {
        id: "123".to_string(),
        seat_bid: vec![SeatBid {
            bid: vec![Bid {
                id: "123".to_string(),
                imp_id: "123".to_string(),
                price: 1.0,
                ..Bid::default()
            }],
            ..SeatBid::default()
        }],
        ..BidResponse::default()
    }
}

async fn bid(State(config): State<Config>, Query(params): Query<BidParams>) -> Json<BidResponse> {
    BID_TOTAL.inc();

    let mut latency = config.latency.unwrap_or(Duration::ZERO);
    if let Some(directive) = params.latency.as_deref() {
        if let Ok(parsed) = parse_duration(directive) {
            latency = parsed;
        }
    }
    if !latency.is_zero() {
        tokio::time::sleep(latency).await;
    }

    Json(canned_bid())
}

async fn ping() -> &'static str {
    "pong"
}

async fn metrics_text() -> Response {
    let mut buf = Vec::new();
    if let Err(err) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buf) {
        log::error!("metrics: encode failed: {err}");
    }
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        String::from_utf8(buf).unwrap_or_default(),
    )
        .into_response()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Explicitly install the default crypto provider for rustls
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = Config::parse();
    logging::setup_logging(&config.log_level)?;
    Lazy::force(&BID_TOTAL);

    if let Some(latency) = config.latency {
        log::info!("latency from env: {latency:?}");
    }

    let app = Router::new()
        .route("/bid", post(bid))
        .route("/ping", get(ping))
        .route("/metrics", get(metrics_text))
        .with_state(config.clone());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    if let (Some(cert), Some(key)) = (config.tls_cert_path.clone(), config.tls_key_path.clone()) {
        let tls = RustlsConfig::from_pem_file(cert, key).await?;
        log::info!("dsp listening on {addr} (tls)");
        axum_server::bind_rustls(addr, tls)
            .serve(app.into_make_service())
            .await?;
    } else {
        let listener = tokio::net::TcpListener::bind(addr).await?;
        log::info!("dsp listening on {addr}");
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;
    }

    log::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
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
    log::info!("shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(extra: &[&str]) -> Config {
        let mut args = vec!["server_dsp"];
        args.extend_from_slice(extra);
        Config::try_parse_from(args).expect("config")
    }

    #[test]
    fn canned_bid_matches_the_wire_contract() {
        let encoded = serde_json::to_string(&canned_bid()).expect("encode");
        assert_eq!(
            encoded,
            r#"{"id":"123","seatbid":[{"bid":[{"id":"123","impid":"123","price":1.0}]}]}"#
        );
    }

    #[tokio::test]
    async fn bid_honors_the_latency_query_directive() {
        let config = test_config(&[]);
        let started = std::time::Instant::now();
        let Json(response) = bid(
            State(config),
            Query(BidParams {
                latency: Some("50ms".into()),
            }),
        )
        .await;
        assert!(started.elapsed() >= Duration::from_millis(50));
        assert_eq!(response.id, "123");
    }

    #[tokio::test]
    async fn bid_ignores_unparseable_latency_directives() {
        let config = test_config(&[]);
        let started = std::time::Instant::now();
        let _ = bid(
            State(config),
            Query(BidParams {
                latency: Some("not-a-duration".into()),
            }),
        )
        .await;
        assert!(started.elapsed() < Duration::from_millis(50));
    }

    #[tokio::test]
    async fn env_latency_is_the_fallback() {
        let config = test_config(&["--latency", "40ms"]);
        let started = std::time::Instant::now();
        let _ = bid(State(config), Query(BidParams { latency: None })).await;
        assert!(started.elapsed() >= Duration::from_millis(40));
    }
}
