//! Process-wide Prometheus registry. Metric names and labels are part of the
//! external dashboard contract; change them and the dashboards go dark.

use once_cell::sync::Lazy;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::new);

/// DSP calls currently executing in the dispatch pool.
pub static DSPIO_CONCURRENCY_RATE: Lazy<IntGauge> = Lazy::new(|| {
    let g = IntGauge::new("dspio_concurrency_rate", "DSP requests currently in flight")
        .unwrap_or_else(|e| panic!("gauge: {e}"));
    REGISTRY
        .register(Box::new(g.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    g
});

pub static DSPIO_REQUEST_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("dspio_request_total", "DSP requests offered to the pool"),
        &["dsp_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSPIO_REQUEST_DROPPED_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "dspio_request_dropped_total",
            "DSP requests dropped because no worker was free",
        ),
        &["dsp_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSPIO_REQUEST_ERROR_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "dspio_request_error_total",
            "DSP requests that failed in transport or decode",
        ),
        &["dsp_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSPIO_CONN_DIAL_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new("dspio_conn_dial_total", "Outbound connection dials per host"),
        &["host"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSPIO_REQUEST_DURATION_SECONDS: Lazy<HistogramVec> = Lazy::new(|| {
    let h = HistogramVec::new(
        HistogramOpts::new(
            "dspio_request_duration_seconds",
            "Time spent waiting for DSP bid response.",
        )
        .buckets(
            prometheus::exponential_buckets(0.001, 2.0, 14)
                .unwrap_or_else(|e| panic!("buckets: {e}")),
        ),
        &["dsp_id"],
    )
    .unwrap_or_else(|e| panic!("histogram_vec: {e}"));
    REGISTRY
        .register(Box::new(h.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    h
});

pub static AD_REQUEST_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    let c = IntCounter::new("ad_request_total", "Total inbound ad requests")
        .unwrap_or_else(|e| panic!("counter: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static AD_REQUEST_PER_PUB_AND_APP_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "ad_request_per_pub_and_app_total",
            "Ad requests per publisher and app",
        ),
        &["pub_id", "app_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSP_BEFORE_PER_PUB_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "dsp_before_per_pub_total",
            "Fan-out calls per DSP and publisher, before enqueue",
        ),
        &["dsp_id", "pub_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static DSP_AFTER_PER_PUB_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    let c = IntCounterVec::new(
        Opts::new(
            "dsp_after_per_pub_total",
            "Fan-out calls per DSP and publisher, after enqueue",
        ),
        &["dsp_id", "pub_id"],
    )
    .unwrap_or_else(|e| panic!("counter_vec: {e}"));
    REGISTRY
        .register(Box::new(c.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    c
});

pub static EXCHANGE_DSP_CONFIG_INFO: Lazy<IntGaugeVec> = Lazy::new(|| {
    let g = IntGaugeVec::new(
        Opts::new(
            "exchange_dsp_config_info",
            "Configured DSPs (1 per dsp_id); seeds dashboard label values before traffic",
        ),
        &["dsp_id"],
    )
    .unwrap_or_else(|e| panic!("gauge_vec: {e}"));
    REGISTRY
        .register(Box::new(g.clone()))
        .unwrap_or_else(|e| panic!("registry: {e}"));
    g
});

/// Forces every metric static so the full set shows up on `/metrics` before
/// any traffic touches them.
pub fn register_all() {
    Lazy::force(&DSPIO_CONCURRENCY_RATE);
    Lazy::force(&DSPIO_REQUEST_TOTAL);
    Lazy::force(&DSPIO_REQUEST_DROPPED_TOTAL);
    Lazy::force(&DSPIO_REQUEST_ERROR_TOTAL);
    Lazy::force(&DSPIO_CONN_DIAL_TOTAL);
    Lazy::force(&DSPIO_REQUEST_DURATION_SECONDS);
    Lazy::force(&AD_REQUEST_TOTAL);
    Lazy::force(&AD_REQUEST_PER_PUB_AND_APP_TOTAL);
    Lazy::force(&DSP_BEFORE_PER_PUB_TOTAL);
    Lazy::force(&DSP_AFTER_PER_PUB_TOTAL);
    Lazy::force(&EXCHANGE_DSP_CONFIG_INFO);
}

/// Renders the registry in the Prometheus text exposition format.
pub fn render() -> String {
    let mut buf = Vec::new();
    let encoder = TextEncoder::new();
    if let Err(err) = encoder.encode(&REGISTRY.gather(), &mut buf) {
        log::error!("metrics: encode failed: {err}");
    }
    String::from_utf8(buf).unwrap_or_default()
}
