//! Bounded-depth path enumeration, costing, scoring and filtering.
//!
//! Enumeration is explicit recursive depth-first backtracking rather
//! than a `BinaryHeap` best-first search, because the task is to
//! surface *every* simple path up to `max_hops`, not just the single
//! cheapest one: a priority-queue search that stops at the first
//! dequeued destination cannot produce `find_all_routes`. `find_best_path`
//! is a thin selection pass over the full enumeration.

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::error::{AmmError, AmmResult};
use crate::formulas::AmmFormulas;
use crate::pool_cache::PoolCache;
use crate::types::{Path, PoolId, Route, TokenId};

/// Constraints on a single path search.
#[derive(Debug, Clone, Default)]
pub struct PathSearchOptions {
    pub max_hops: usize,
    pub min_liquidity: Option<i128>,
    pub exclude_pools: Option<HashSet<PoolId>>,
    pub exclude_tokens: Option<HashSet<TokenId>>,
}

pub struct Pathfinder;

impl Pathfinder {
    /// Enumerate every simple path from `token_in` to `token_out` of at
    /// most `options.max_hops` hops, using deterministic (insertion
    /// order) incidence lists from `cache`'s graph.
    pub fn find_paths(
        cache: &mut PoolCache,
        now_ms: u64,
        token_in: &TokenId,
        token_out: &TokenId,
        options: &PathSearchOptions,
    ) -> AmmResult<Vec<Path>> {
        if token_in == token_out {
            return Err(AmmError::InvalidTokenPair { reason: format!("identical tokens: {token_in}") });
        }
        if cache.graph().get(token_in).is_none() {
            return Err(AmmError::InvalidTokenPair { reason: format!("unknown token: {token_in}") });
        }
        if cache.graph().get(token_out).is_none() {
            return Err(AmmError::InvalidTokenPair { reason: format!("unknown token: {token_out}") });
        }

        let mut results = Vec::new();
        let mut visited: HashSet<TokenId> = HashSet::new();
        visited.insert(token_in.clone());
        let mut tokens_path = vec![token_in.clone()];
        let mut pools_path = Vec::new();

        Self::dfs(
            cache,
            now_ms,
            token_out,
            options,
            &mut visited,
            &mut tokens_path,
            &mut pools_path,
            &mut results,
        );

        debug!(token_in = %token_in, token_out = %token_out, found = results.len(), "path enumeration complete");
        Ok(results)
    }

    #[allow(clippy::too_many_arguments)]
    fn dfs(
        cache: &mut PoolCache,
        now_ms: u64,
        token_out: &TokenId,
        options: &PathSearchOptions,
        visited: &mut HashSet<TokenId>,
        tokens_path: &mut Vec<TokenId>,
        pools_path: &mut Vec<PoolId>,
        results: &mut Vec<Path>,
    ) {
        if pools_path.len() >= options.max_hops {
            return;
        }
        let current = tokens_path.last().expect("tokens_path always has an entry").clone();
        let incident = cache.pools_for_token(&current);

        for pool_id in incident {
            if let Some(excluded) = &options.exclude_pools {
                if excluded.contains(&pool_id) {
                    continue;
                }
            }
            let Some(snapshot) = cache.get(now_ms, &pool_id) else {
                continue;
            };
            if let Some(min_liq) = options.min_liquidity {
                if snapshot.reserve_a < min_liq || snapshot.reserve_b < min_liq {
                    continue;
                }
            }
            let Some(next_token) = snapshot.other_token(&current).cloned() else {
                continue;
            };
            if let Some(excluded) = &options.exclude_tokens {
                if excluded.contains(&next_token) {
                    continue;
                }
            }
            if visited.contains(&next_token) {
                continue;
            }

            visited.insert(next_token.clone());
            tokens_path.push(next_token.clone());
            pools_path.push(pool_id.clone());

            if &next_token == token_out {
                results.push(Path { tokens: tokens_path.clone(), pools: pools_path.clone() });
            } else {
                Self::dfs(cache, now_ms, token_out, options, visited, tokens_path, pools_path, results);
            }

            pools_path.pop();
            tokens_path.pop();
            visited.remove(&next_token);
        }
    }

    /// Walk `path` left to right costing each hop with
    /// [`AmmFormulas::amount_out`]. Returns `None` (not an error) if any
    /// hop's output is non-positive, or if a pool along the path has
    /// since been evicted from the cache; both are ordinary rejection,
    /// not failure of the overall query.
    pub fn calculate_route(path: &Path, cache: &mut PoolCache, now_ms: u64, amount_in: i128) -> Option<Route> {
        let mut current_amount = amount_in;
        let mut total_impact_weighted: i128 = 0;
        let mut total_amount_weighted: i128 = 0;

        for (i, pool_id) in path.pools.iter().enumerate() {
            let snapshot = cache.get(now_ms, pool_id)?;
            let token_in = &path.tokens[i];
            let (reserve_in, reserve_out) = match (snapshot.reserve_for(token_in), snapshot.other_token(token_in)) {
                (Some(r_in), Some(other)) => (r_in, snapshot.reserve_for(other)?),
                _ => {
                    warn!(pool_id = %pool_id, "pool snapshot does not contain expected hop token, rejecting route");
                    return None;
                }
            };

            let amount_out = AmmFormulas::amount_out(current_amount, reserve_in, reserve_out, snapshot.fee_bps).ok()?;
            if amount_out <= 0 {
                warn!(pool_id = %pool_id, "hop produced non-positive output, rejecting route");
                return None;
            }
            let impact = AmmFormulas::price_impact_bps(current_amount, reserve_in, reserve_out, snapshot.fee_bps).ok()?;

            total_impact_weighted += impact * current_amount;
            total_amount_weighted += current_amount;
            current_amount = amount_out;
        }

        let price_impact_bps = if total_amount_weighted == 0 { 0 } else { total_impact_weighted / total_amount_weighted };
        let score = Self::score(amount_in, current_amount, price_impact_bps, path.hops());

        Some(Route { path: path.clone(), expected_output: current_amount, price_impact_bps, score })
    }

    fn score(amount_in: i128, amount_out: i128, impact_bps: i128, hops: usize) -> f64 {
        if amount_in <= 0 {
            return 0.0;
        }
        let output_ratio = amount_out as f64 / amount_in as f64;
        let impact_penalty = (1.0 - impact_bps as f64 / 10_000.0).max(0.0);
        let hops_penalty = 0.95f64.powi(hops as i32 - 1);
        output_ratio * impact_penalty * hops_penalty
    }

    /// Greatest `expected_output`; ties broken by lower
    /// `price_impact_bps`, then by lexicographic token sequence.
    pub fn find_best_path(routes: &[Route]) -> Option<&Route> {
        routes.iter().min_by(|a, b| {
            b.expected_output
                .cmp(&a.expected_output)
                .then_with(|| a.price_impact_bps.cmp(&b.price_impact_bps))
                .then_with(|| a.path.tokens.cmp(&b.path.tokens))
        })
    }

    /// The single-hop route, if one exists among `routes`.
    pub fn find_direct_route(routes: &[Route]) -> Option<&Route> {
        routes.iter().find(|r| r.hops() == 1)
    }

    pub fn filter_routes(routes: &[Route], min_output: Option<i128>, max_impact_bps: Option<i128>) -> Vec<Route> {
        routes
            .iter()
            .filter(|r| min_output.map_or(true, |min| r.expected_output >= min))
            .filter(|r| max_impact_bps.map_or(true, |max| r.price_impact_bps <= max))
            .cloned()
            .collect()
    }

    /// Sorts `routes` by score descending, ties broken lexicographically
    /// by token sequence, so identical inputs always yield identical
    /// ordering across implementations.
    pub fn sort_routes(routes: &mut [Route]) {
        routes.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.path.tokens.cmp(&b.path.tokens))
        });
    }

    pub fn get_top_routes(routes: &[Route], n: usize) -> Vec<Route> {
        let mut sorted = routes.to_vec();
        Self::sort_routes(&mut sorted);
        sorted.truncate(n);
        sorted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PoolSnapshot;

    fn snapshot(pool: &str, a: &str, b: &str, ra: i128, rb: i128) -> PoolSnapshot {
        PoolSnapshot {
            pool_id: PoolId::new(pool),
            token_a: TokenId::new(a),
            token_b: TokenId::new(b),
            reserve_a: ra,
            reserve_b: rb,
            fee_bps: 30,
            captured_at: 0,
        }
    }

    fn triangle_cache() -> PoolCache {
        let mut cache = PoolCache::new(60_000);
        cache.put(0, snapshot("p_usdc_xlm", "usdc", "xlm", 1_000_000_000_000, 1_000_000_000_000));
        cache.put(0, snapshot("p_xlm_btc", "xlm", "btc", 1_000_000_000_000, 1_000_000_000_000));
        cache.put(0, snapshot("p_usdc_btc", "usdc", "btc", 1_000_000_000_000, 1_000_000_000_000));
        cache
    }

    #[test]
    fn scenario_s4_direct_route() {
        let mut cache = triangle_cache();
        let options = PathSearchOptions { max_hops: 3, ..Default::default() };
        let paths = Pathfinder::find_paths(&mut cache, 0, &TokenId::new("usdc"), &TokenId::new("xlm"), &options).unwrap();
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].tokens, vec![TokenId::new("usdc"), TokenId::new("xlm")]);
    }

    #[test]
    fn scenario_s5_multi_hop_present() {
        let mut cache = triangle_cache();
        let options = PathSearchOptions { max_hops: 3, ..Default::default() };
        let paths = Pathfinder::find_paths(&mut cache, 0, &TokenId::new("usdc"), &TokenId::new("btc"), &options).unwrap();
        assert_eq!(paths.len(), 2);
        let direct = paths.iter().find(|p| p.hops() == 1);
        let two_hop = paths.iter().find(|p| p.hops() == 2);
        assert!(direct.is_some());
        assert!(two_hop.is_some());
        assert_eq!(two_hop.unwrap().tokens, vec![TokenId::new("usdc"), TokenId::new("xlm"), TokenId::new("btc")]);
    }

    #[test]
    fn property_9_hop_bound_and_simple_paths() {
        let mut cache = triangle_cache();
        let options = PathSearchOptions { max_hops: 1, ..Default::default() };
        let paths = Pathfinder::find_paths(&mut cache, 0, &TokenId::new("usdc"), &TokenId::new("btc"), &options).unwrap();
        assert_eq!(paths.len(), 1);
        for path in &paths {
            assert!(path.hops() <= 1);
            let unique: HashSet<_> = path.tokens.iter().collect();
            assert_eq!(unique.len(), path.tokens.len());
        }
    }

    #[test]
    fn rejects_same_token_query() {
        let mut cache = triangle_cache();
        let options = PathSearchOptions::default();
        assert!(matches!(
            Pathfinder::find_paths(&mut cache, 0, &TokenId::new("usdc"), &TokenId::new("usdc"), &options),
            Err(AmmError::InvalidTokenPair { .. })
        ));
    }

    #[test]
    fn find_best_path_breaks_ties_on_impact() {
        let path_a = Path { tokens: vec![TokenId::new("a"), TokenId::new("b")], pools: vec![PoolId::new("p1")] };
        let path_b = Path { tokens: vec![TokenId::new("a"), TokenId::new("c")], pools: vec![PoolId::new("p2")] };
        let routes = vec![
            Route { path: path_a, expected_output: 100, price_impact_bps: 50, score: 1.0 },
            Route { path: path_b, expected_output: 100, price_impact_bps: 10, score: 1.0 },
        ];
        let best = Pathfinder::find_best_path(&routes).unwrap();
        assert_eq!(best.price_impact_bps, 10);
    }

    #[test]
    fn get_top_routes_respects_limit() {
        let path = |t: &str, p: &str| Path { tokens: vec![TokenId::new("a"), TokenId::new(t)], pools: vec![PoolId::new(p)] };
        let routes = vec![
            Route { path: path("b", "p1"), expected_output: 100, price_impact_bps: 0, score: 0.5 },
            Route { path: path("c", "p2"), expected_output: 200, price_impact_bps: 0, score: 0.9 },
            Route { path: path("d", "p3"), expected_output: 150, price_impact_bps: 0, score: 0.7 },
        ];
        let top = Pathfinder::get_top_routes(&routes, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].score, 0.9);
        assert_eq!(top[1].score, 0.7);
    }
}
