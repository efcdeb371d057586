//! A map of per-key mutexes, used to serialize the read-modify-write of a
//! single rate-limit entry without taking a single global lock.
//!
//! Mirrors the concurrency discipline the core demands: many keys are
//! touched concurrently and must not contend with each other, but a single
//! key's check-then-append must be linearizable.

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Lazily creates one `tokio::sync::Mutex` per key and evicts it once no
/// other holder remains, so the map does not grow without bound as keys
/// age out of use.
#[derive(Default)]
pub struct KeyedMutex {
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    /// Acquires the lock for `key`, creating it if necessary.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<()> {
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let guard = mutex.clone().lock_owned().await;

        // Best-effort eviction: if we are the sole remaining reference
        // besides the map's own entry, drop the map's handle so the key
        // does not linger forever. A concurrent `lock` call racing this
        // check simply recreates the entry, which is harmless.
        if Arc::strong_count(&mutex) <= 2 {
            self.locks.remove_if(key, |_, v| Arc::strong_count(v) <= 1);
        }

        guard
    }

    pub fn tracked_keys(&self) -> usize {
        self.locks.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn serializes_access_to_the_same_key() {
        let locks = Arc::new(KeyedMutex::new());
        let counter = Arc::new(AtomicU32::new(0));
        let mut handles = Vec::new();

        for _ in 0..20 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.lock("tenant:user-1").await;
                let before = counter.load(Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(1)).await;
                counter.store(before + 1, Ordering::SeqCst);
            }));
        }

        for h in handles {
            h.await.unwrap();
        }

        assert_eq!(counter.load(Ordering::SeqCst), 20);
    }

    #[tokio::test]
    async fn distinct_keys_do_not_contend() {
        let locks = KeyedMutex::new();
        let _g1 = locks.lock("a").await;
        let g2 = locks.lock("b").await;
        drop(g2);
    }
}
