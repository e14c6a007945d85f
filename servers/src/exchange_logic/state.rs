use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;

use super::dspio::DspIo;
use super::model::{Apps, DspRoster};

/// Lock-free holders for the two hot lookup snapshots. Writers publish a
/// fresh snapshot with one atomic store; readers pin the current snapshot
/// with one atomic load and keep it for the duration of a request.
pub struct CacheState {
    apps: ArcSwap<Apps>,
    dsps: ArcSwap<DspRoster>,
}

impl CacheState {
    pub fn new() -> Self {
        Self {
            apps: ArcSwap::from_pointee(Apps::default()),
            dsps: ArcSwap::from_pointee(DspRoster::default()),
        }
    }

    pub fn apps(&self) -> Arc<Apps> {
        self.apps.load_full()
    }

    pub fn publish_apps(&self, snapshot: Apps) {
        self.apps.store(Arc::new(snapshot));
    }

    pub fn dsps(&self) -> Arc<DspRoster> {
        self.dsps.load_full()
    }

    pub fn publish_dsps(&self, snapshot: DspRoster) {
        self.dsps.store(Arc::new(snapshot));
    }
}

impl Default for CacheState {
    fn default() -> Self {
        Self::new()
    }
}

/// State shared across all HTTP routes.
#[derive(Clone)]
pub struct AppState {
    pub cache_state: Arc<CacheState>,
    pub dspio: Arc<DspIo>,
    pub request_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange_logic::model::{App, Publisher};

    fn snapshot(ids: &[i64]) -> Apps {
        Apps::from_records(
            ids.iter()
                .map(|&id| App {
                    id,
                    name: format!("app-{id}"),
                    publisher: Publisher {
                        id: 1,
                        name: "publisher-1".into(),
                    },
                })
                .collect(),
        )
    }

    #[test]
    fn starts_empty() {
        let state = CacheState::new();
        assert!(state.apps().is_empty());
        assert!(state.dsps().is_empty());
    }

    #[test]
    fn publish_replaces_the_whole_snapshot() {
        let state = CacheState::new();
        state.publish_apps(snapshot(&[1, 2, 3]));
        assert_eq!(state.apps().len(), 3);
        state.publish_apps(snapshot(&[4]));
        let apps = state.apps();
        assert_eq!(apps.len(), 1);
        assert!(apps.get(4).is_some());
        assert!(apps.get(1).is_none());
    }

    #[test]
    fn readers_keep_their_pinned_snapshot_across_a_publish() {
        let state = CacheState::new();
        state.publish_apps(snapshot(&[1, 2]));
        let pinned = state.apps();
        state.publish_apps(snapshot(&[9]));
        // The old snapshot stays alive and intact for the in-flight reader.
        assert_eq!(pinned.len(), 2);
        assert!(pinned.get(1).is_some());
        // A fresh load observes the new publication.
        assert_eq!(state.apps().len(), 1);
    }

    #[test]
    fn concurrent_readers_observe_consistent_snapshots() {
        let state = Arc::new(CacheState::new());
        state.publish_apps(snapshot(&[1, 2, 3, 4]));

        let writer = {
            let state = state.clone();
            std::thread::spawn(move || {
                for _ in 0..500 {
                    state.publish_apps(snapshot(&[1, 2, 3, 4]));
                    state.publish_apps(snapshot(&[5, 6]));
                }
            })
        };

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let state = state.clone();
                std::thread::spawn(move || {
                    for _ in 0..2000 {
                        let apps = state.apps();
                        // Each observed snapshot is one of the two published
                        // shapes, never a mix.
                        assert!(apps.len() == 4 || apps.len() == 2);
                    }
                })
            })
            .collect();

        writer.join().unwrap();
        for reader in readers {
            reader.join().unwrap();
        }
    }
}
