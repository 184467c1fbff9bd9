//! Pool-id keyed cache with TTL expiry and a derived token graph.
//!
//! Mirrors the teacher's pairing of a primary keyed store
//! (`PoolStateManager`) with a derived secondary index
//! (`find_arbitrage_pairs_for_pool`), but single-threaded: every method
//! here takes `&mut self` (even reads, since `get` must evict lazily)
//! and carries no internal locking. A host sharing one cache across
//! threads wraps it in its own `Mutex`/`RwLock`.
//!
//! Every method that cares about time takes `now_ms` explicitly rather
//! than calling out to a `Clock` itself: the router façade is the one
//! collaborator-aware layer; the cache stays synchronous and
//! trivially unit-testable with hand-picked timestamps.

use std::collections::HashMap;

use tracing::debug;

use crate::types::{CacheEntry, PoolId, PoolSnapshot, TokenId};

/// Snapshot of cache-level hit/miss counters and size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CacheStats {
    pub size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub token_count: usize,
}

/// Pool-id keyed cache with a derived `TokenId -> [PoolId]` incidence
/// graph. Pool order within each token's incidence list is the order
/// pools were first inserted, so pathfinder enumeration is
/// deterministic across runs given the same insertion sequence.
#[derive(Debug, Default)]
pub struct PoolCache {
    pools: HashMap<PoolId, CacheEntry>,
    graph: HashMap<TokenId, Vec<PoolId>>,
    order: Vec<PoolId>,
    ttl_ms: u64,
    hits: u64,
    misses: u64,
}

impl PoolCache {
    pub fn new(ttl_ms: u64) -> Self {
        Self { ttl_ms, ..Default::default() }
    }

    /// Insert or replace a pool's snapshot, refreshing its expiry and
    /// updating the two incident token nodes in place.
    pub fn put(&mut self, now_ms: u64, snapshot: PoolSnapshot) {
        let pool_id = snapshot.pool_id.clone();
        let expires_at = now_ms + self.ttl_ms;
        let is_new = !self.pools.contains_key(&pool_id);

        self.add_incidence(&snapshot.token_a.clone(), &pool_id);
        self.add_incidence(&snapshot.token_b.clone(), &pool_id);

        if is_new {
            self.order.push(pool_id.clone());
        }
        self.pools.insert(pool_id, CacheEntry { snapshot, expires_at });
    }

    pub fn put_many(&mut self, now_ms: u64, snapshots: Vec<PoolSnapshot>) {
        for snapshot in snapshots {
            self.put(now_ms, snapshot);
        }
    }

    /// The live snapshot for `pool_id`, or `None` if missing or
    /// expired. An expired entry is evicted as a side effect. Counts
    /// as a hit or a miss either way.
    pub fn get(&mut self, now_ms: u64, pool_id: &PoolId) -> Option<PoolSnapshot> {
        match self.pools.get(pool_id) {
            Some(entry) if entry.is_live(now_ms) => {
                self.hits += 1;
                Some(entry.snapshot.clone())
            }
            Some(_) => {
                self.misses += 1;
                self.pools.remove(pool_id);
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn has(&mut self, now_ms: u64, pool_id: &PoolId) -> bool {
        self.get(now_ms, pool_id).is_some()
    }

    /// Delete `pool_id` unconditionally and rebuild the graph.
    pub fn remove(&mut self, pool_id: &PoolId) -> Option<PoolSnapshot> {
        let removed = self.pools.remove(pool_id).map(|entry| entry.snapshot);
        self.order.retain(|id| id != pool_id);
        self.rebuild_graph();
        removed
    }

    /// All live snapshots, lazily purging any expired ones encountered.
    pub fn all_live(&mut self, now_ms: u64) -> Vec<PoolSnapshot> {
        let expired: Vec<PoolId> =
            self.pools.iter().filter(|(_, entry)| !entry.is_live(now_ms)).map(|(id, _)| id.clone()).collect();
        for id in &expired {
            self.pools.remove(id);
        }
        self.pools.values().map(|entry| entry.snapshot.clone()).collect()
    }

    /// Pool ids incident to `token`, in first-insertion order. May
    /// include pools whose entries have since expired; callers doing
    /// pathfinding should cross-check with [`Self::get`]/[`Self::has`].
    pub fn pools_for_token(&self, token: &TokenId) -> Vec<PoolId> {
        self.graph.get(token).cloned().unwrap_or_default()
    }

    /// The current incidence graph view.
    pub fn graph(&self) -> &HashMap<TokenId, Vec<PoolId>> {
        &self.graph
    }

    /// Sweep expired entries and rebuild the graph from what remains.
    /// Returns the number of entries purged.
    pub fn clean_expired(&mut self, now_ms: u64) -> usize {
        let expired: Vec<PoolId> =
            self.pools.iter().filter(|(_, entry)| !entry.is_live(now_ms)).map(|(id, _)| id.clone()).collect();
        let purged = expired.len();
        for id in &expired {
            self.pools.remove(id);
        }
        self.order.retain(|id| self.pools.contains_key(id));
        self.rebuild_graph();
        debug!(purged, remaining = self.pools.len(), "swept expired pool cache entries");
        purged
    }

    pub fn stats(&self) -> CacheStats {
        let total = self.hits + self.misses;
        let hit_rate = if total == 0 { 0.0 } else { self.hits as f64 / total as f64 };
        CacheStats { size: self.pools.len(), hits: self.hits, misses: self.misses, hit_rate, token_count: self.graph.len() }
    }

    /// Affects entries inserted after this call only.
    pub fn set_ttl(&mut self, new_ttl_ms: u64) {
        self.ttl_ms = new_ttl_ms;
    }

    fn add_incidence(&mut self, token: &TokenId, pool_id: &PoolId) {
        let list = self.graph.entry(token.clone()).or_default();
        if !list.contains(pool_id) {
            list.push(pool_id.clone());
        }
    }

    fn rebuild_graph(&mut self) {
        self.graph.clear();
        for pool_id in self.order.clone() {
            if let Some(entry) = self.pools.get(&pool_id) {
                let snapshot = entry.snapshot.clone();
                self.add_incidence(&snapshot.token_a, &pool_id);
                self.add_incidence(&snapshot.token_b, &pool_id);
            }
        }
    }
}
