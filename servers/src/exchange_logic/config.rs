use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use lib_common::durations::parse_duration;

/// Exchange runtime configuration. Every option can be set through the
/// environment; duration values use the `500ms` / `15s` / `1m` format.
#[derive(Parser, Debug, Clone)]
#[clap(name = "server_exchange")]
pub struct Config {
    #[clap(long, env = "EXCHANGE_PORT", default_value = "8080")]
    pub port: u16,

    #[clap(long, env = "EXCHANGE_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    /// How often the snapshot cache reloads from its sources.
    #[clap(
        long,
        env = "EXCHANGE_CACHE_UPDATE_INTERVAL",
        default_value = "1m",
        value_parser = parse_duration
    )]
    pub cache_update_interval: Duration,

    /// JSON source for the apps snapshot.
    #[clap(long, env = "EXCHANGE_APPS_CACHE_PATH")]
    pub apps_cache_path: PathBuf,

    /// JSON source for the DSP roster.
    #[clap(long, env = "EXCHANGE_DSPS_CACHE_PATH")]
    pub dsps_cache_path: PathBuf,

    /// Number of dispatch pool workers.
    #[clap(long, env = "EXCHANGE_DSPIO_POOL", default_value = "100")]
    pub dspio_pool: usize,

    #[clap(long, env = "EXCHANGE_DSPIO_MAX_IDLE_CONNS", default_value = "100")]
    pub max_idle_conns: usize,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_MAX_IDLE_CONNS_PER_HOST",
        default_value = "100"
    )]
    pub max_idle_conns_per_host: usize,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_IDLE_CONN_TIMEOUT",
        default_value = "15s",
        value_parser = parse_duration
    )]
    pub idle_conn_timeout: Duration,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_KEEP_ALIVE",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub keep_alive: Duration,

    /// Dial (connect) timeout for outbound DSP connections.
    #[clap(
        long,
        env = "EXCHANGE_DSPIO_TIMEOUT",
        default_value = "30s",
        value_parser = parse_duration
    )]
    pub dial_timeout: Duration,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_RESPONSE_HEADER_TIMEOUT",
        default_value = "10s",
        value_parser = parse_duration
    )]
    pub response_header_timeout: Duration,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_EXPECT_CONTINUE_TIMEOUT",
        default_value = "1s",
        value_parser = parse_duration
    )]
    pub expect_continue_timeout: Duration,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_FORCE_HTTP2",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub force_http2: bool,

    #[clap(
        long,
        env = "EXCHANGE_DSPIO_INSECURE_SKIP_VERIFY",
        default_value = "true",
        action = clap::ArgAction::Set
    )]
    pub insecure_skip_verify: bool,

    /// Fan-out deadline for a single ad request.
    #[clap(
        long,
        env = "EXCHANGE_DSPIO_REQUEST_TIMEOUT",
        default_value = "500ms",
        value_parser = parse_duration
    )]
    pub request_timeout: Duration,
}

pub fn load_config() -> Config {
    Config::parse()
}
