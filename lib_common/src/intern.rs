//! String interning for hot, repetitive values (metric label strings).
//!
//! Reads go through an atomically published read-only map, so the steady
//! state costs one hash lookup and no allocation. Misses land in a small
//! mutex-guarded overflow map that is merged into the read-only snapshot
//! once it has been read more often than the snapshot is large.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use arc_swap::ArcSwap;
use once_cell::sync::Lazy;

/// Strings longer than this are never cached.
const MAX_LEN: usize = 500;

pub struct InternPool {
    readonly: ArcSwap<HashMap<String, Arc<str>>>,
    mutable: Mutex<Overflow>,
}

#[derive(Default)]
struct Overflow {
    entries: HashMap<String, Arc<str>>,
    reads: u64,
}

impl InternPool {
    pub fn new() -> Self {
        Self {
            readonly: ArcSwap::from_pointee(HashMap::new()),
            mutable: Mutex::new(Overflow::default()),
        }
    }

    pub fn intern(&self, s: &str) -> Arc<str> {
        if s.len() > MAX_LEN {
            return Arc::from(s);
        }

        let readonly = self.readonly.load();
        if let Some(v) = readonly.get(s) {
            return v.clone();
        }

        let mut overflow = self.mutable.lock().expect("intern lock poisoned");

        // The key may have been migrated while we waited for the lock.
        let readonly = self.readonly.load();
        let interned = if let Some(v) = readonly.get(s) {
            v.clone()
        } else if let Some(v) = overflow.entries.get(s) {
            v.clone()
        } else {
            let v: Arc<str> = Arc::from(s);
            overflow.entries.insert(s.to_string(), v.clone());
            v
        };

        overflow.reads += 1;
        if overflow.reads > readonly.len() as u64 {
            let mut merged = HashMap::with_capacity(readonly.len() + overflow.entries.len());
            merged.extend(readonly.iter().map(|(k, v)| (k.clone(), v.clone())));
            merged.extend(overflow.entries.drain());
            self.readonly.store(Arc::new(merged));
            overflow.reads = 0;
        }

        interned
    }

    #[cfg(test)]
    fn readonly_len(&self) -> usize {
        self.readonly.load().len()
    }
}

impl Default for InternPool {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: Lazy<InternPool> = Lazy::new(InternPool::new);

/// Interns `s` in the process-wide pool.
pub fn intern(s: &str) -> Arc<str> {
    GLOBAL.intern(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_shared_allocation_for_repeats() {
        let pool = InternPool::new();
        let a = pool.intern("1001");
        let b = pool.intern("1001");
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn migrates_overflow_into_readonly_snapshot() {
        let pool = InternPool::new();
        // First call inserts into the overflow map and, with an empty
        // read-only snapshot, immediately triggers a migration.
        let first = pool.intern("dsp-9");
        assert_eq!(pool.readonly_len(), 1);
        let second = pool.intern("dsp-9");
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn skips_oversized_strings() {
        let pool = InternPool::new();
        let long = "x".repeat(MAX_LEN + 1);
        let a = pool.intern(&long);
        let b = pool.intern(&long);
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(pool.readonly_len(), 0);
    }

    #[test]
    fn distinct_values_stay_distinct() {
        let pool = InternPool::new();
        let a = pool.intern("a");
        let b = pool.intern("b");
        assert_ne!(a.as_ref(), b.as_ref());
    }
}
