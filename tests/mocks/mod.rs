//! Deterministic fake collaborators for integration tests.
//!
//! `MockPoolDirectory`/`MockPoolSource` generated by `mockall::automock`
//! live behind `#[cfg(test)]` inside the library crate and so are only
//! reachable from its own unit tests; these hand-rolled fakes serve the
//! same purpose for the black-box scenario tests in this directory.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use amm_router::{Clock, PoolDirectory, PoolId, PoolSnapshot, PoolSource};
use async_trait::async_trait;

pub struct FakePoolDirectory {
    pool_ids: Vec<PoolId>,
}

impl FakePoolDirectory {
    pub fn new(pool_ids: Vec<PoolId>) -> Self {
        Self { pool_ids }
    }
}

#[async_trait]
impl PoolDirectory for FakePoolDirectory {
    async fn list_pools(&self) -> anyhow::Result<Vec<PoolId>> {
        Ok(self.pool_ids.clone())
    }
}

pub struct FakePoolSource {
    snapshots: Mutex<HashMap<PoolId, PoolSnapshot>>,
}

impl FakePoolSource {
    pub fn new(snapshots: Vec<PoolSnapshot>) -> Self {
        let map = snapshots.into_iter().map(|s| (s.pool_id.clone(), s)).collect();
        Self { snapshots: Mutex::new(map) }
    }
}

#[async_trait]
impl PoolSource for FakePoolSource {
    async fn load_snapshot(&self, pool_id: &PoolId) -> anyhow::Result<PoolSnapshot> {
        self.snapshots
            .lock()
            .unwrap()
            .get(pool_id)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("unknown pool: {pool_id}"))
    }
}

/// A `Clock` whose value is set explicitly by the test, so TTL
/// behaviour never depends on wall-clock sleeps.
pub struct FakeClock(AtomicU64);

impl FakeClock {
    pub fn new(initial_ms: u64) -> Self {
        Self(AtomicU64::new(initial_ms))
    }

    pub fn advance(&self, delta_ms: u64) {
        self.0.fetch_add(delta_ms, Ordering::Relaxed);
    }
}

impl Clock for FakeClock {
    fn now_ms(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

// `Router` owns its `Clock`; wrap in `Arc` so a test can keep a handle
// to advance time after construction.
impl Clock for std::sync::Arc<FakeClock> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}
