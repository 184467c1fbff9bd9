//! Public façade: orchestrates `PoolCache`, `Pathfinder`, `SplitOptimizer`
//! and `AmmFormulas` behind the crate's stable API, grounded on the
//! teacher's top-level orchestrator (`ArbitrageEngine` holding config
//! plus concrete sub-components, `pub use` re-export style) and its
//! constructor-validates-before-any-work configuration pattern.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::collaborators::{Clock, PoolDirectory, PoolSource};
use crate::error::{AmmError, AmmResult};
use crate::formulas::AmmFormulas;
use crate::pathfinder::{PathSearchOptions, Pathfinder};
use crate::pool_cache::PoolCache;
use crate::split_optimizer::SplitOptimizer;
use crate::types::{HopQuote, Route, RouteQuote, RouterStats, SplitQuote, SplitRoute, TokenId};

/// Identifies the pool directory (factory/venue) a `Router` talks to.
/// Opaque from the core's point of view; hosts give it whatever
/// meaning their `PoolDirectory` implementation expects.
pub type PoolDirectoryId = String;

/// Notional input amount `find_all_routes` costs candidates at when no
/// caller-supplied amount applies; scoring is scale-invariant so this
/// is acceptable purely for ranking.
const RANKING_NOTIONAL_AMOUNT: i128 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouterConfig {
    pub factory_address: PoolDirectoryId,
    pub max_hops: usize,
    pub max_splits: usize,
    pub pool_cache_ttl_ms: u64,
    pub enable_cache: bool,
    pub min_liquidity: i128,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            factory_address: String::new(),
            max_hops: 3,
            max_splits: 3,
            pool_cache_ttl_ms: 30_000,
            enable_cache: true,
            min_liquidity: 1_000,
        }
    }
}

impl RouterConfig {
    pub fn validate(&self) -> AmmResult<()> {
        if self.factory_address.trim().is_empty() {
            return Err(AmmError::InvalidConfiguration { reason: "factory_address is required".to_string() });
        }
        if !(1..=5).contains(&self.max_hops) {
            return Err(AmmError::InvalidConfiguration { reason: "max_hops must be in [1, 5]".to_string() });
        }
        if !(1..=10).contains(&self.max_splits) {
            return Err(AmmError::InvalidConfiguration { reason: "max_splits must be in [1, 10]".to_string() });
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
struct RouterInternalStats {
    pathfinding_calls: u64,
    pathfinding_total_ms: u64,
    total_routes_found: u64,
}

/// The route planner/quoter façade. Generic over its three
/// collaborators (concrete generics, not boxed trait objects), as the
/// teacher prefers where the call graph is static; see [`DynRouter`]
/// for a runtime-selected alternative.
pub struct Router<D: PoolDirectory, S: PoolSource, C: Clock> {
    config: RouterConfig,
    directory: D,
    source: S,
    clock: C,
    cache: PoolCache,
    stats: RouterInternalStats,
}

/// A `Router` whose collaborators are chosen at runtime rather than at
/// the call site's type.
pub type DynRouter = Router<Box<dyn PoolDirectory>, Box<dyn PoolSource>, Box<dyn Clock>>;

impl<D: PoolDirectory, S: PoolSource, C: Clock> Router<D, S, C> {
    pub fn new(config: RouterConfig, directory: D, source: S, clock: C) -> AmmResult<Self> {
        config.validate()?;
        let cache = PoolCache::new(config.pool_cache_ttl_ms);
        Ok(Self { config, directory, source, clock, cache, stats: RouterInternalStats::default() })
    }

    /// `find_best_route(token_in, token_out, amount_in, max_hops?)`.
    /// Raises `NoRouteFound` when pathfinding produces zero survivors.
    pub async fn find_best_route(
        &mut self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_in: i128,
        max_hops: Option<usize>,
    ) -> AmmResult<Route> {
        self.ensure_pools_loaded().await?;
        let routes = self.cost_all_paths(token_in, token_out, max_hops, amount_in)?;
        let best = Pathfinder::find_best_path(&routes).cloned();
        match best {
            Some(route) => {
                info!(token_in = %token_in, token_out = %token_out, expected_output = route.expected_output, "best route found");
                Ok(route)
            }
            None => Err(AmmError::NoRouteFound { token_in: token_in.clone(), token_out: token_out.clone() }),
        }
    }

    /// `find_all_routes(token_in, token_out, max_hops?)`. Costs every
    /// candidate at [`RANKING_NOTIONAL_AMOUNT`] and sorts by score;
    /// callers wanting a specific amount compose this with
    /// [`Self::get_route_quote`].
    pub async fn find_all_routes(
        &mut self,
        token_in: &TokenId,
        token_out: &TokenId,
        max_hops: Option<usize>,
    ) -> AmmResult<Vec<Route>> {
        self.ensure_pools_loaded().await?;
        let mut routes = self.cost_all_paths(token_in, token_out, max_hops, RANKING_NOTIONAL_AMOUNT)?;
        Pathfinder::sort_routes(&mut routes);
        info!(token_in = %token_in, token_out = %token_out, count = routes.len(), "enumerated all routes");
        Ok(routes)
    }

    /// `find_optimal_split(token_in, token_out, amount_in, max_splits?)`.
    pub async fn find_optimal_split(
        &mut self,
        token_in: &TokenId,
        token_out: &TokenId,
        amount_in: i128,
        max_splits: Option<usize>,
    ) -> AmmResult<SplitRoute> {
        self.ensure_pools_loaded().await?;
        let max_splits = max_splits.unwrap_or(self.config.max_splits);
        let mut routes = self.cost_all_paths(token_in, token_out, None, amount_in)?;
        if routes.is_empty() {
            return Err(AmmError::NoRouteFound { token_in: token_in.clone(), token_out: token_out.clone() });
        }
        Pathfinder::sort_routes(&mut routes);
        routes.truncate(max_splits);
        let split = SplitOptimizer::optimize_split(&routes, amount_in)?;
        info!(token_in = %token_in, token_out = %token_out, total_output = split.total_output, "optimal split computed");
        Ok(split)
    }

    /// `get_route_quote(route, amount_in)`: re-fetches each hop's
    /// reserves via the cache and recomputes outputs hop-by-hop,
    /// producing the authoritative amount vector and hop breakdown.
    pub async fn get_route_quote(&mut self, route: &Route, amount_in: i128) -> AmmResult<RouteQuote> {
        self.ensure_pools_loaded().await?;
        let now = self.clock.now_ms();

        let mut hops = Vec::with_capacity(route.path.pools.len());
        let mut current = amount_in;
        let mut total_impact_weighted: i128 = 0;

        for (i, pool_id) in route.path.pools.iter().enumerate() {
            let snapshot =
                self.cache.get(now, pool_id).ok_or_else(|| AmmError::PoolNotFound { pool_id: pool_id.clone() })?;
            let token_in = &route.path.tokens[i];
            let token_out = &route.path.tokens[i + 1];
            let reserve_in = snapshot
                .reserve_for(token_in)
                .ok_or_else(|| AmmError::InvalidTokenPair { reason: format!("{token_in} not in pool {pool_id}") })?;
            let reserve_out = snapshot
                .reserve_for(token_out)
                .ok_or_else(|| AmmError::InvalidTokenPair { reason: format!("{token_out} not in pool {pool_id}") })?;

            let amount_out = AmmFormulas::amount_out(current, reserve_in, reserve_out, snapshot.fee_bps)?;
            let impact = AmmFormulas::price_impact_bps(current, reserve_in, reserve_out, snapshot.fee_bps)?;
            debug!(pool_id = %pool_id, amount_in = current, amount_out, "hop quoted");

            total_impact_weighted += impact * current;
            hops.push(HopQuote {
                token_in: token_in.clone(),
                token_out: token_out.clone(),
                pool_id: pool_id.clone(),
                amount_in: current,
                amount_out,
                price_impact_bps: impact,
                fee_bps: snapshot.fee_bps,
            });
            current = amount_out;
        }

        let total_price_impact_bps = if amount_in == 0 { 0 } else { total_impact_weighted / amount_in };
        Ok(RouteQuote {
            path: route.path.clone(),
            hops,
            total_amount_in: amount_in,
            total_amount_out: current,
            total_price_impact_bps,
        })
    }

    /// `get_split_quote(split, amount_in)`: composes
    /// [`Self::get_route_quote`] over the split's routes, the faithful
    /// per-hop recompute mode, as opposed to `find_optimal_split`'s
    /// linear estimate. `amount_in` must equal the sum of `split`'s
    /// own per-route amounts; it is taken explicitly (rather than
    /// re-derived from `split`) so a caller quoting a split against the
    /// wrong total gets an error instead of a silently mismatched quote.
    pub async fn get_split_quote(&mut self, split: &SplitRoute, amount_in: i128) -> AmmResult<SplitQuote> {
        let split_total: i128 = split.amounts.iter().sum();
        if amount_in != split_total {
            return Err(AmmError::invalid_argument(format!(
                "amount_in {amount_in} does not match split's total amount {split_total}"
            )));
        }

        let mut route_quotes = Vec::with_capacity(split.routes.len());
        let mut total_amount_in: i128 = 0;
        let mut total_amount_out: i128 = 0;
        for (route, &amount) in split.routes.iter().zip(split.amounts.iter()) {
            let quote = self.get_route_quote(route, amount).await?;
            total_amount_in += quote.total_amount_in;
            total_amount_out += quote.total_amount_out;
            route_quotes.push(quote);
        }
        Ok(SplitQuote { route_quotes, total_amount_in, total_amount_out })
    }

    /// Best-effort top-up (`force = false`) or clear-then-reload
    /// (`force = true`) of the pool cache from `PoolDirectory`/`PoolSource`.
    pub async fn refresh_pools(&mut self, force: bool) -> AmmResult<()> {
        if force {
            self.cache = PoolCache::new(self.config.pool_cache_ttl_ms);
        }
        let pool_ids = self.directory.list_pools().await.map_err(AmmError::from_collaborator)?;
        let now = self.clock.now_ms();

        let mut loaded = 0usize;
        for pool_id in pool_ids {
            if !force && self.cache.has(now, &pool_id) {
                continue;
            }
            match self.source.load_snapshot(&pool_id).await {
                Ok(snapshot) => {
                    self.cache.put(now, snapshot);
                    loaded += 1;
                }
                Err(err) => warn!(pool_id = %pool_id, error = %err, "failed to load pool snapshot, skipping"),
            }
        }
        info!(force, loaded, "pool cache refreshed");
        Ok(())
    }

    pub fn clear_cache(&mut self) {
        self.cache = PoolCache::new(self.config.pool_cache_ttl_ms);
    }

    pub fn stats(&self) -> RouterStats {
        let cache_stats = self.cache.stats();
        let avg_route_finding_time_ms = if self.stats.pathfinding_calls == 0 {
            0.0
        } else {
            self.stats.pathfinding_total_ms as f64 / self.stats.pathfinding_calls as f64
        };
        RouterStats {
            cached_pools: cache_stats.size,
            cache_hit_rate: cache_stats.hit_rate,
            avg_route_finding_time_ms,
            total_routes_found: self.stats.total_routes_found,
        }
    }

    async fn ensure_pools_loaded(&mut self) -> AmmResult<()> {
        if !self.config.enable_cache {
            // The cache is a scratchpad only: reload fresh on every query.
            return self.refresh_pools(true).await;
        }
        if self.cache.stats().size == 0 {
            return self.refresh_pools(false).await;
        }
        Ok(())
    }

    fn cost_all_paths(
        &mut self,
        token_in: &TokenId,
        token_out: &TokenId,
        max_hops: Option<usize>,
        amount_in: i128,
    ) -> AmmResult<Vec<Route>> {
        let start = self.clock.now_ms();
        let options = PathSearchOptions {
            max_hops: max_hops.unwrap_or(self.config.max_hops),
            min_liquidity: Some(self.config.min_liquidity),
            exclude_pools: None,
            exclude_tokens: None,
        };
        let now = self.clock.now_ms();
        let paths = Pathfinder::find_paths(&mut self.cache, now, token_in, token_out, &options)?;
        let routes: Vec<Route> = paths
            .iter()
            .filter_map(|path| Pathfinder::calculate_route(path, &mut self.cache, now, amount_in))
            .filter(|route| route.expected_output > 0)
            .collect();

        let elapsed_ms = self.clock.now_ms().saturating_sub(start);
        self.stats.pathfinding_calls += 1;
        self.stats.pathfinding_total_ms += elapsed_ms;
        self.stats.total_routes_found += routes.len() as u64;

        Ok(routes)
    }
}
