use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncReadExt;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use super::metrics;
use super::model::{App, Apps, Dsp, DspRoster};
use super::state::CacheState;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("source unavailable: {0}")]
    SourceUnavailable(std::io::Error),
    #[error("read: {0}")]
    Io(std::io::Error),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
}

pub type LoadFuture = Pin<Box<dyn Future<Output = Result<(), CacheError>> + Send>>;

/// A named plan entry: builds a fresh snapshot from its source and publishes
/// it into the shared state with a single atomic store.
pub type CacheLoadFn = Box<dyn Fn(Arc<CacheState>) -> LoadFuture + Send + Sync>;

/// Keeps the in-memory lookup snapshots warm. `load` runs every plan entry
/// concurrently; `start` re-runs it on an interval until `stop` or shutdown.
pub struct Cache {
    state: Arc<CacheState>,
    plan: Vec<(&'static str, CacheLoadFn)>,
    stop_tx: watch::Sender<bool>,
}

impl Cache {
    pub fn new(state: Arc<CacheState>, plan: Vec<(&'static str, CacheLoadFn)>) -> Self {
        let (stop_tx, _) = watch::channel(false);
        Self {
            state,
            plan,
            stop_tx,
        }
    }

    /// Runs all plan entries concurrently and returns the first failure once
    /// every entry has settled. A failing entry leaves its previously
    /// published snapshot untouched; entries do not affect each other.
    pub async fn load(&self) -> Result<(), CacheError> {
        let jobs = self.plan.iter().map(|(name, action)| {
            let state = self.state.clone();
            async move { (*name, action(state).await) }
        });

        let mut first_err = None;
        for (name, result) in futures::future::join_all(jobs).await {
            match result {
                Ok(()) => log::info!("cache: loaded {name}"),
                Err(err) => {
                    log::error!("cache: error loading {name}: {err}");
                    first_err.get_or_insert(err);
                }
            }
        }

        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// Launches the background reload worker. Reload errors are logged and
    /// the schedule continues; the worker exits on `stop` or shutdown.
    pub fn start(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: broadcast::Receiver<()>,
    ) -> JoinHandle<()> {
        let cache = self.clone();
        let mut stop_rx = self.stop_tx.subscribe();
        log::info!("cache: started, reload interval {interval:?}");

        tokio::spawn(async move {
            if *stop_rx.borrow() {
                return;
            }
            // The initial load already ran; the first tick lands one full
            // interval from now.
            let start = tokio::time::Instant::now() + interval;
            let mut ticker = tokio::time::interval_at(start, interval);
            loop {
                tokio::select! {
                    _ = shutdown.recv() => return,
                    _ = stop_rx.changed() => return,
                    _ = ticker.tick() => {
                        let _ = cache.load().await;
                    }
                }
            }
        })
    }

    /// Halts the reload schedule; an in-flight load finishes on its own.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }
}

async fn read_source(path: &PathBuf) -> Result<Vec<u8>, CacheError> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(CacheError::SourceUnavailable)?;
    let mut raw = Vec::new();
    file.read_to_end(&mut raw).await.map_err(CacheError::Io)?;
    Ok(raw)
}

/// Plan entry for the apps snapshot.
pub fn load_apps(path: PathBuf) -> CacheLoadFn {
    Box::new(move |state| {
        let path = path.clone();
        Box::pin(async move {
            let raw = read_source(&path).await?;
            let records: Vec<App> = serde_json::from_slice(&raw)?;
            let count = records.len();
            state.publish_apps(Apps::from_records(records));
            log::info!("cache: loaded apps, count {count}");
            Ok(())
        })
    })
}

/// Plan entry for the DSP roster. Also seeds the per-DSP config-info gauge
/// so dashboards have dsp_id label values before any traffic.
pub fn load_dsps(path: PathBuf) -> CacheLoadFn {
    Box::new(move |state| {
        let path = path.clone();
        Box::pin(async move {
            let raw = read_source(&path).await?;
            let records: Vec<Dsp> = serde_json::from_slice(&raw)?;
            for dsp in &records {
                metrics::EXCHANGE_DSP_CONFIG_INFO
                    .with_label_values(&[&dsp.id.to_string()])
                    .set(1);
            }
            let count = records.len();
            state.publish_dsps(DspRoster::from_records(records));
            log::info!("cache: loaded dsps, count {count}");
            Ok(())
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_fixture(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        file.write_all(content.as_bytes()).expect("write fixture");
        file
    }

    const APPS_JSON: &str =
        r#"[{"id":1250,"name":"app-1250","publisher":{"id":1,"name":"publisher-1"}}]"#;
    const DSPS_JSON: &str =
        r#"[{"id":1001,"name":"dsp1","endpoint":"https://d1/bid","latency":"5ms"}]"#;

    #[tokio::test]
    async fn load_publishes_both_snapshots() {
        let apps_file = write_fixture(APPS_JSON);
        let dsps_file = write_fixture(DSPS_JSON);

        let state = Arc::new(CacheState::new());
        let cache = Cache::new(
            state.clone(),
            vec![
                ("apps", load_apps(apps_file.path().to_path_buf())),
                ("dsps", load_dsps(dsps_file.path().to_path_buf())),
            ],
        );

        cache.load().await.expect("load");
        assert_eq!(state.apps().len(), 1);
        assert_eq!(state.apps().get(1250).unwrap().publisher.id, 1);
        assert_eq!(state.dsps().len(), 1);
        assert_eq!(state.dsps().iter().next().unwrap().latency, "5ms");
    }

    #[tokio::test]
    async fn missing_source_reports_unavailable_and_keeps_previous_snapshot() {
        let apps_file = write_fixture(APPS_JSON);
        let state = Arc::new(CacheState::new());

        let good = Cache::new(
            state.clone(),
            vec![("apps", load_apps(apps_file.path().to_path_buf()))],
        );
        good.load().await.expect("load");
        assert_eq!(state.apps().len(), 1);

        let bad = Cache::new(
            state.clone(),
            vec![("apps", load_apps(PathBuf::from("/nonexistent/apps.json")))],
        );
        let err = bad.load().await.expect_err("must fail");
        assert!(matches!(err, CacheError::SourceUnavailable(_)));
        // Previous snapshot survives the failed reload.
        assert_eq!(state.apps().len(), 1);
    }

    #[tokio::test]
    async fn malformed_source_reports_decode_error() {
        let apps_file = write_fixture("{not json");
        let state = Arc::new(CacheState::new());
        let cache = Cache::new(
            state.clone(),
            vec![("apps", load_apps(apps_file.path().to_path_buf()))],
        );
        let err = cache.load().await.expect_err("must fail");
        assert!(matches!(err, CacheError::Decode(_)));
        assert!(state.apps().is_empty());
    }

    #[tokio::test]
    async fn independent_entries_do_not_interact() {
        let dsps_file = write_fixture(DSPS_JSON);
        let state = Arc::new(CacheState::new());
        let cache = Cache::new(
            state.clone(),
            vec![
                ("apps", load_apps(PathBuf::from("/nonexistent/apps.json"))),
                ("dsps", load_dsps(dsps_file.path().to_path_buf())),
            ],
        );
        assert!(cache.load().await.is_err());
        // The healthy entry still published.
        assert_eq!(state.dsps().len(), 1);
    }

    #[tokio::test]
    async fn background_worker_picks_up_source_changes() {
        let apps_file = write_fixture(APPS_JSON);
        let state = Arc::new(CacheState::new());
        let cache = Arc::new(Cache::new(
            state.clone(),
            vec![("apps", load_apps(apps_file.path().to_path_buf()))],
        ));
        cache.load().await.expect("initial load");

        let (shutdown_tx, _) = broadcast::channel(1);
        let worker = cache.start(Duration::from_millis(20), shutdown_tx.subscribe());

        std::fs::write(
            apps_file.path(),
            r#"[
                {"id":1250,"name":"app-1250","publisher":{"id":1,"name":"publisher-1"}},
                {"id":1251,"name":"app-1251","publisher":{"id":1,"name":"publisher-1"}}
            ]"#,
        )
        .expect("rewrite fixture");

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while state.apps().len() != 2 {
            assert!(
                tokio::time::Instant::now() < deadline,
                "reload never observed"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cache.stop();
        let _ = worker.await;
    }

    #[tokio::test]
    async fn stop_halts_the_schedule() {
        let apps_file = write_fixture(APPS_JSON);
        let state = Arc::new(CacheState::new());
        let cache = Arc::new(Cache::new(
            state.clone(),
            vec![("apps", load_apps(apps_file.path().to_path_buf()))],
        ));
        let (shutdown_tx, _) = broadcast::channel(1);
        let worker = cache.start(Duration::from_millis(10), shutdown_tx.subscribe());
        cache.stop();
        tokio::time::timeout(Duration::from_secs(1), worker)
            .await
            .expect("worker exits after stop")
            .expect("worker task");
    }
}
