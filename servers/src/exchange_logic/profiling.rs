//! CPU profiling endpoints under the `/debug/pprof` prefix.

use std::io::Write;
use std::time::Duration;

use axum::extract::Query;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::Deserialize;

/// Sampling frequency in Hz while a profile is being collected.
const PROFILE_HZ: i32 = 100;

const DEFAULT_SECONDS: u64 = 10;
const MAX_SECONDS: u64 = 120;

#[derive(Debug, Deserialize)]
pub struct ProfileParams {
    pub seconds: Option<u64>,
}

pub async fn index() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        "cpu profiling endpoints:\n\
         /debug/pprof/profile?seconds=N (pprof protobuf, gzip)\n\
         /debug/pprof/flamegraph?seconds=N (svg)\n",
    )
        .into_response()
}

/// CPU profile in the gzip-framed pprof protobuf format.
pub async fn profile(Query(params): Query<ProfileParams>) -> Response {
    let seconds = params.seconds.unwrap_or(DEFAULT_SECONDS).min(MAX_SECONDS);
    match collect_protobuf(seconds).await {
        Ok(body) => (
            [(header::CONTENT_TYPE, "application/octet-stream")],
            body,
        )
            .into_response(),
        Err(err) => {
            log::error!("profiling: profile failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// CPU profile rendered as a flamegraph SVG.
pub async fn flamegraph(Query(params): Query<ProfileParams>) -> Response {
    let seconds = params.seconds.unwrap_or(DEFAULT_SECONDS).min(MAX_SECONDS);
    match collect_flamegraph(seconds).await {
        Ok(svg) => ([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response(),
        Err(err) => {
            log::error!("profiling: flamegraph failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

async fn collect_report(seconds: u64) -> anyhow::Result<pprof::Report> {
    // The profiler guard is not Send; collect on a blocking thread.
    tokio::task::spawn_blocking(move || -> anyhow::Result<pprof::Report> {
        let guard = pprof::ProfilerGuard::new(PROFILE_HZ)?;
        std::thread::sleep(Duration::from_secs(seconds));
        Ok(guard.report().build()?)
    })
    .await?
}

async fn collect_protobuf(seconds: u64) -> anyhow::Result<Vec<u8>> {
    use pprof::protos::Message;

    let report = collect_report(seconds).await?;
    let profile = report.pprof()?;
    let raw = profile.write_to_bytes()?;

    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&raw)?;
    Ok(encoder.finish()?)
}

async fn collect_flamegraph(seconds: u64) -> anyhow::Result<Vec<u8>> {
    let report = collect_report(seconds).await?;
    let mut svg = Vec::new();
    report.flamegraph(&mut svg)?;
    Ok(svg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn index_lists_the_endpoints() {
        let response = index().await;
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let text = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(text.contains("/debug/pprof/profile"));
        assert!(text.contains("/debug/pprof/flamegraph"));
    }
}
