use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Instant;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use reqwest::header::{HeaderValue, CONTENT_ENCODING, CONTENT_TYPE};
use tokio::sync::mpsc;

use lib_common::openrtb::BidRequest;

use super::dspio::{DspCall, DspReply};
use super::metrics;
use super::model::Dsp;
use super::state::AppState;

pub async fn ping() -> &'static str {
    "pong"
}

pub async fn metrics_text() -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::render(),
    )
        .into_response()
}

/// `POST /ad`: the fan-out orchestrator. Decompresses and decodes the bid
/// request, resolves the app, fans the request out to every configured DSP
/// under one deadline, and answers with the first successful bid or the
/// empty no-bid response.
pub async fn ad(State(app): State<Arc<AppState>>, body: Bytes) -> Response {
    metrics::AD_REQUEST_TOTAL.inc();

    let mut decoded = Vec::new();
    if let Err(err) = GzDecoder::new(body.as_ref()).read_to_end(&mut decoded) {
        return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response();
    }

    let ad_request: BidRequest = match serde_json::from_slice(&decoded) {
        Ok(request) => request,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };

    let apps = app.cache_state.apps();
    let raw_app_id = ad_request
        .app
        .as_ref()
        .and_then(|a| a.id.as_deref())
        .unwrap_or_default();
    let app_id = match raw_app_id.parse::<i64>() {
        Ok(id) => id,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };
    let Some(known_app) = apps.get(app_id) else {
        return (StatusCode::NOT_FOUND, "app not found").into_response();
    };

    let pub_label = known_app.publisher.id.to_string();
    metrics::AD_REQUEST_PER_PUB_AND_APP_TOTAL
        .with_label_values(&[&pub_label, &known_app.id.to_string()])
        .inc();

    let dsps = app.cache_state.dsps();
    let n = dsps.len();
    let (reply_tx, mut reply_rx) = mpsc::channel::<DspReply>(n.max(1));
    let deadline = Instant::now() + app.request_timeout;

    // Serialize once so every DSP sees the same normalized payload.
    let payload = match serde_json::to_vec(&ad_request) {
        Ok(bytes) => bytes,
        Err(err) => return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response(),
    };

    for (seq, dsp) in dsps.iter().enumerate() {
        let dsp_label = dsp.id.to_string();
        metrics::DSP_BEFORE_PER_PUB_TOTAL
            .with_label_values(&[&dsp_label, &pub_label])
            .inc();

        let outbound = match build_bid_call(dsp, &payload, deadline) {
            Ok(request) => request,
            Err(err) => {
                return (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        };

        app.dspio.enqueue(DspCall {
            seq,
            dsp_id: dsp.id,
            request: outbound,
            responder: reply_tx.clone(),
            enqueued_at: Instant::now(),
        });

        metrics::DSP_AFTER_PER_PUB_TOTAL
            .with_label_values(&[&dsp_label, &pub_label])
            .inc();
    }

    // Collect until every reply arrived or the deadline fired, whichever
    // comes first. Workers may still send afterwards; the buffered channel
    // absorbs those replies and is reclaimed when the last sender drops.
    let deadline_at = tokio::time::Instant::from_std(deadline);
    let mut bids = Vec::with_capacity(n);
    for _ in 0..n {
        match tokio::time::timeout_at(deadline_at, reply_rx.recv()).await {
            Ok(Some(reply)) => match reply.result {
                Ok(bid) => bids.push(bid),
                Err(err) => {
                    log::error!("exchange: error from dsp_id {}: {err}", reply.dsp_id);
                }
            },
            Ok(None) => break,
            Err(_) => break,
        }
    }

    let bid_response = bids.into_iter().next().unwrap_or_default();
    (StatusCode::OK, Json(bid_response)).into_response()
}

/// Builds one outbound bid call: a fresh gzip body (the request owns it),
/// the latency directive appended to the query when present, and the
/// remaining deadline as the transport timeout.
fn build_bid_call(dsp: &Dsp, payload: &[u8], deadline: Instant) -> anyhow::Result<reqwest::Request> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(payload)?;
    let compressed = encoder.finish()?;

    let mut url = reqwest::Url::parse(&dsp.endpoint)?;
    if !dsp.latency.is_empty() {
        url.query_pairs_mut().append_pair("latency", &dsp.latency);
    }

    let mut request = reqwest::Request::new(reqwest::Method::POST, url);
    request
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    request
        .headers_mut()
        .insert(CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    *request.body_mut() = Some(compressed.into());
    *request.timeout_mut() = Some(deadline.saturating_duration_since(Instant::now()));

    Ok(request)
}
