//! Value types shared across the router core.
//!
//! Everything here is a plain value: no type holds a reference back
//! into the [`crate::pool_cache::PoolCache`] it was read from, so a
//! `Route`/`SplitRoute` stays valid after the cache entries it was
//! built from expire or get evicted.

use std::fmt;

use serde::{Deserialize, Serialize};

fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Case-insensitive token identifier. Two `TokenId`s constructed from
/// differently-cased input compare and hash equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenId(String);

impl TokenId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for TokenId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// Case-insensitive identifier for a specific pool instance, distinct
/// from the two `TokenId`s it connects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PoolId(String);

impl PoolId {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(normalize(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PoolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PoolId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for PoolId {
    fn from(raw: String) -> Self {
        Self::new(raw)
    }
}

/// A snapshot of one pool's public state at `captured_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSnapshot {
    pub pool_id: PoolId,
    pub token_a: TokenId,
    pub token_b: TokenId,
    pub reserve_a: i128,
    pub reserve_b: i128,
    pub fee_bps: u32,
    pub captured_at: u64,
}

/// Default swap fee: 0.30%.
pub const DEFAULT_FEE_BPS: u32 = 30;

impl PoolSnapshot {
    /// Reserves incident to `token`, oriented `(this_token, other_token)`.
    /// `None` if `token` is not one of this pool's two tokens.
    pub fn reserve_for(&self, token: &TokenId) -> Option<i128> {
        if token == &self.token_a {
            Some(self.reserve_a)
        } else if token == &self.token_b {
            Some(self.reserve_b)
        } else {
            None
        }
    }

    /// The token on the other side of this pool from `token`.
    pub fn other_token(&self, token: &TokenId) -> Option<&TokenId> {
        if token == &self.token_a {
            Some(&self.token_b)
        } else if token == &self.token_b {
            Some(&self.token_a)
        } else {
            None
        }
    }
}

/// A cached [`PoolSnapshot`] plus its expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub snapshot: PoolSnapshot,
    pub expires_at: u64,
}

impl CacheEntry {
    pub fn is_live(&self, now_ms: u64) -> bool {
        now_ms <= self.expires_at
    }
}

/// An ordered sequence of tokens and the pools connecting them. No
/// token repeats (`tokens[i] != tokens[j]` for `i != j`); `pools[i]`
/// connects `tokens[i]` and `tokens[i + 1]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    pub tokens: Vec<TokenId>,
    pub pools: Vec<PoolId>,
}

impl Path {
    pub fn hops(&self) -> usize {
        self.pools.len()
    }
}

/// A [`Path`] costed at a specific input amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub path: Path,
    pub expected_output: i128,
    pub price_impact_bps: i128,
    pub score: f64,
}

impl Route {
    pub fn pools(&self) -> &[PoolId] {
        &self.path.pools
    }

    pub fn hops(&self) -> usize {
        self.path.hops()
    }
}

/// A distribution of a single input amount across several [`Route`]s.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitRoute {
    pub routes: Vec<Route>,
    pub amounts: Vec<i128>,
    pub percents: Vec<f64>,
    pub total_output: i128,
    pub weighted_impact_bps: i128,
    pub is_better_than_single: bool,
}

/// One hop's input/output/impact/fee, as produced by a faithful
/// per-hop recompute (`Router::get_route_quote`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HopQuote {
    pub token_in: TokenId,
    pub token_out: TokenId,
    pub pool_id: PoolId,
    pub amount_in: i128,
    pub amount_out: i128,
    pub price_impact_bps: i128,
    pub fee_bps: u32,
}

/// Expansion of a [`Route`] into its per-hop detail, recomputed against
/// current cache state rather than estimated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteQuote {
    pub path: Path,
    pub hops: Vec<HopQuote>,
    pub total_amount_in: i128,
    pub total_amount_out: i128,
    pub total_price_impact_bps: i128,
}

/// Expansion of a [`SplitRoute`] into faithfully recomputed per-route
/// quotes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitQuote {
    pub route_quotes: Vec<RouteQuote>,
    pub total_amount_in: i128,
    pub total_amount_out: i128,
}

/// Lightweight router-level statistics surfaced to the host.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouterStats {
    pub cached_pools: usize,
    pub cache_hit_rate: f64,
    pub avg_route_finding_time_ms: f64,
    pub total_routes_found: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_normalizes_case() {
        assert_eq!(TokenId::new("USDC"), TokenId::new("usdc"));
        assert_eq!(TokenId::new(" Usdc "), TokenId::new("usdc"));
    }

    #[test]
    fn pool_snapshot_reserve_for() {
        let snap = PoolSnapshot {
            pool_id: PoolId::new("pool-1"),
            token_a: TokenId::new("usdc"),
            token_b: TokenId::new("xlm"),
            reserve_a: 10_000,
            reserve_b: 20_000,
            fee_bps: DEFAULT_FEE_BPS,
            captured_at: 0,
        };
        assert_eq!(snap.reserve_for(&TokenId::new("usdc")), Some(10_000));
        assert_eq!(snap.reserve_for(&TokenId::new("xlm")), Some(20_000));
        assert_eq!(snap.reserve_for(&TokenId::new("btc")), None);
        assert_eq!(snap.other_token(&TokenId::new("usdc")), Some(&TokenId::new("xlm")));
    }

    #[test]
    fn cache_entry_liveness() {
        let snap = PoolSnapshot {
            pool_id: PoolId::new("pool-1"),
            token_a: TokenId::new("usdc"),
            token_b: TokenId::new("xlm"),
            reserve_a: 1,
            reserve_b: 1,
            fee_bps: DEFAULT_FEE_BPS,
            captured_at: 0,
        };
        let entry = CacheEntry { snapshot: snap, expires_at: 100 };
        assert!(entry.is_live(100));
        assert!(!entry.is_live(101));
    }
}
