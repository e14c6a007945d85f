use std::sync::Arc;
use std::time::Instant;

use thiserror::Error;
use tokio::sync::{broadcast, mpsc, watch};

use lib_common::intern::intern;
use lib_common::openrtb::BidResponse;

use super::metrics;

/// One outbound bid call handed to the pool.
pub struct DspCall {
    /// Position of this call within its ad request's fan-out.
    pub seq: usize,
    pub dsp_id: i64,
    /// Fully prepared outbound request; its timeout carries the ad request's
    /// deadline into the transport.
    pub request: reqwest::Request,
    /// Reply channel shared by the whole ad request. Buffered to the roster
    /// size, so a worker send never blocks, and never closed by the reader.
    pub responder: mpsc::Sender<DspReply>,
    pub enqueued_at: Instant,
}

/// Outcome of one bid call; delivered exactly once per accepted call, and
/// synthesized directly on drop.
pub struct DspReply {
    pub seq: usize,
    pub dsp_id: i64,
    pub result: Result<BidResponse, DspError>,
}

#[derive(Debug, Error)]
pub enum DspError {
    #[error("dspio: queue is full")]
    QueueFull,
    #[error("dspio: transport: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("dspio: decode: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Fixed-size dispatch pool executing bid calls over the shared transport.
///
/// The intake queue is a rendezvous channel: a send only succeeds while a
/// worker is actively receiving, so admission reflects pool slack instead of
/// growing a backlog that would invalidate per-request deadlines.
pub struct DspIo {
    client: reqwest::Client,
    pool: usize,
    input_tx: flume::Sender<DspCall>,
    input_rx: flume::Receiver<DspCall>,
    stop_tx: watch::Sender<bool>,
}

impl DspIo {
    pub fn new(client: reqwest::Client, pool: usize) -> Self {
        let (input_tx, input_rx) = flume::bounded(0);
        let (stop_tx, _) = watch::channel(false);
        Self {
            client,
            pool,
            input_tx,
            input_rx,
            stop_tx,
        }
    }

    /// Launches the worker tasks. Workers exit on `stop` or shutdown and
    /// drain no backlog; there is none to drain.
    pub fn start(&self, shutdown: &broadcast::Sender<()>) {
        for _ in 0..self.pool {
            let client = self.client.clone();
            let input_rx = self.input_rx.clone();
            let mut shutdown_rx = shutdown.subscribe();
            let mut stop_rx = self.stop_tx.subscribe();

            tokio::spawn(async move {
                loop {
                    tokio::select! {
                        _ = shutdown_rx.recv() => return,
                        _ = stop_rx.changed() => return,
                        msg = input_rx.recv_async() => match msg {
                            Ok(call) => execute(&client, call).await,
                            Err(_) => return,
                        },
                    }
                }
            });
        }

        log::info!("dspio: started {} workers", self.pool);
    }

    /// Signals the workers to exit.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Non-blocking admission. With no worker ready the call is dropped and
    /// a queue-full reply is synthesized, so the caller always hears back.
    pub fn enqueue(&self, call: DspCall) {
        log::debug!("dspio: enqueued, dsp_id {} seq {}", call.dsp_id, call.seq);
        let dsp_label = intern_id(call.dsp_id);
        metrics::DSPIO_REQUEST_TOTAL
            .with_label_values(&[&dsp_label])
            .inc();

        if let Err(err) = self.input_tx.try_send(call) {
            let call = err.into_inner();
            metrics::DSPIO_REQUEST_DROPPED_TOTAL
                .with_label_values(&[&dsp_label])
                .inc();
            let _ = call.responder.try_send(DspReply {
                seq: call.seq,
                dsp_id: call.dsp_id,
                result: Err(DspError::QueueFull),
            });
        }
    }
}

fn intern_id(id: i64) -> Arc<str> {
    intern(&id.to_string())
}

async fn execute(client: &reqwest::Client, call: DspCall) {
    metrics::DSPIO_CONCURRENCY_RATE.inc();

    let dsp_label = intern_id(call.dsp_id);
    log::debug!(
        "dspio: executing, dsp_id {} seq {} (queued {:?})",
        call.dsp_id,
        call.seq,
        call.enqueued_at.elapsed()
    );

    let started = Instant::now();
    let result = round_trip(client, call.request).await;
    metrics::DSPIO_REQUEST_DURATION_SECONDS
        .with_label_values(&[&dsp_label])
        .observe(started.elapsed().as_secs_f64());

    match &result {
        Ok(_) => log::debug!("dspio: success, dsp_id {} seq {}", call.dsp_id, call.seq),
        Err(err) => {
            log::info!("dspio: dsp_id {} seq {}: {err}", call.dsp_id, call.seq);
            metrics::DSPIO_REQUEST_ERROR_TOTAL
                .with_label_values(&[&dsp_label])
                .inc();
        }
    }

    // The orchestrator may have stopped listening after its deadline; the
    // buffered channel absorbs the reply either way.
    let _ = call.responder.try_send(DspReply {
        seq: call.seq,
        dsp_id: call.dsp_id,
        result,
    });

    metrics::DSPIO_CONCURRENCY_RATE.dec();
}

async fn round_trip(
    client: &reqwest::Client,
    request: reqwest::Request,
) -> Result<BidResponse, DspError> {
    let response = client.execute(request).await?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
