use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Barrier;

use food_order_core::{KeyValueStore, MemoryStore, StoreError, StoreResult};

/// [`MemoryStore`] wrapper that can refuse writes or hold reads at a barrier.
pub struct FaultyStore {
    inner: MemoryStore,
    fail_sets: AtomicBool,
    // Track refused writes for verification in tests
    refused: Mutex<Vec<String>>,
    gate_prefix: String,
    gated_reads: AtomicUsize,
    barrier: Barrier,
}

impl FaultyStore {
    pub fn new() -> Self {
        Self::gated("", 0)
    }

    /// Hold the first `parties` reads of keys starting with `prefix` until
    /// all of them have arrived.
    pub fn gated(prefix: &str, parties: usize) -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_sets: AtomicBool::new(false),
            refused: Mutex::new(Vec::new()),
            gate_prefix: prefix.to_string(),
            gated_reads: AtomicUsize::new(parties),
            barrier: Barrier::new(parties.max(1)),
        }
    }

    pub fn fail_sets(&self, fail: bool) {
        self.fail_sets.store(fail, Ordering::SeqCst);
    }

    /// Keys whose writes were refused, in order.
    pub fn refused_keys(&self) -> Vec<String> {
        self.refused.lock().clone()
    }

    fn take_gate_slot(&self) -> bool {
        self.gated_reads
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

fn connection_refused() -> StoreError {
    StoreError::Redis(redis::RedisError::from((
        redis::ErrorKind::IoError,
        "connection refused",
    )))
}

#[async_trait]
impl KeyValueStore for FaultyStore {
    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self.inner.get(key).await?;
        if !self.gate_prefix.is_empty()
            && key.starts_with(&self.gate_prefix)
            && self.take_gate_slot()
        {
            self.barrier.wait().await;
        }
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        if self.fail_sets.load(Ordering::SeqCst) {
            self.refused.lock().push(key.to_string());
            return Err(connection_refused());
        }
        self.inner.set(key, value).await
    }

    async fn incr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.inner.incr_by(key, delta).await
    }

    async fn decr_by(&self, key: &str, delta: i64) -> StoreResult<i64> {
        self.inner.decr_by(key, delta).await
    }

    async fn list_push(&self, key: &str, value: &str) -> StoreResult<()> {
        self.inner.list_push(key, value).await
    }

    async fn list_range(&self, key: &str, start: isize, stop: isize) -> StoreResult<Vec<String>> {
        self.inner.list_range(key, start, stop).await
    }

    async fn flush_all(&self) -> StoreResult<()> {
        self.inner.flush_all().await
    }
}
