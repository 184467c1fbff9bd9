//! Literal seed scenarios (S1-S7) from the component specification,
//! run against the public crate API.

mod common;
mod mocks;

use std::sync::Arc;

use amm_router::{AmmFormulas, AmmError, PoolCache, PoolId, PoolSnapshot, Route, Router, RouterConfig, SplitOptimizer, TokenId};
use amm_router::types::Path;
use mocks::{FakeClock, FakePoolDirectory, FakePoolSource};

fn pool(id: &str, a: &str, b: &str, ra: i128, rb: i128, fee_bps: u32) -> PoolSnapshot {
    PoolSnapshot { pool_id: PoolId::new(id), token_a: TokenId::new(a), token_b: TokenId::new(b), reserve_a: ra, reserve_b: rb, fee_bps, captured_at: 0 }
}

fn triangle_config() -> RouterConfig {
    RouterConfig { factory_address: "factory".to_string(), max_hops: 3, ..Default::default() }
}

async fn triangle_router() -> Router<FakePoolDirectory, FakePoolSource, Arc<FakeClock>> {
    let pools = vec![
        pool("p_usdc_xlm", "usdc", "xlm", 1_000_000_000_000_000, 1_000_000_000_000_000, 30),
        pool("p_xlm_btc", "xlm", "btc", 1_000_000_000_000_000, 1_000_000_000_000_000, 30),
        pool("p_usdc_btc", "usdc", "btc", 1_000_000_000_000_000, 1_000_000_000_000_000, 30),
    ];
    let ids: Vec<PoolId> = pools.iter().map(|p| p.pool_id.clone()).collect();
    let directory = FakePoolDirectory::new(ids);
    let source = FakePoolSource::new(pools);
    let clock = Arc::new(FakeClock::new(0));
    Router::new(triangle_config(), directory, source, clock).unwrap()
}

#[test]
fn s1_symmetric_swap() {
    assert_eq!(AmmFormulas::amount_out(1_000, 10_000, 10_000, 30).unwrap(), 906);
}

#[test]
fn s2_fee_differential() {
    let low = AmmFormulas::amount_out(1_000, 10_000, 10_000, 5).unwrap();
    let high = AmmFormulas::amount_out(1_000, 10_000, 10_000, 30).unwrap();
    assert!(low > high);
}

#[test]
fn s3_initial_lp() {
    assert_eq!(AmmFormulas::calculate_initial_liquidity(1_000_000, 1_000_000).unwrap(), 999_000);
    assert_eq!(AmmFormulas::calculate_initial_liquidity(1_000_000, 4_000_000).unwrap(), 1_999_000);
    assert!(matches!(AmmFormulas::calculate_initial_liquidity(100, 100), Err(AmmError::InsufficientLiquidity { .. })));
}

#[tokio::test]
async fn s4_direct_route() {
    common::init_test_logging();
    let mut router = triangle_router().await;
    let route = router
        .find_best_route(&TokenId::new("usdc"), &TokenId::new("xlm"), 1_000 * 10i128.pow(7), None)
        .await
        .unwrap();
    assert_eq!(route.path.tokens, vec![TokenId::new("usdc"), TokenId::new("xlm")]);
}

#[tokio::test]
async fn s5_multi_hop_present() {
    common::init_test_logging();
    let mut router = triangle_router().await;
    let routes = router.find_all_routes(&TokenId::new("usdc"), &TokenId::new("btc"), Some(3)).await.unwrap();
    assert!(routes.iter().any(|r| r.path.tokens == vec![TokenId::new("usdc"), TokenId::new("btc")]));
    assert!(routes
        .iter()
        .any(|r| r.path.tokens == vec![TokenId::new("usdc"), TokenId::new("xlm"), TokenId::new("btc")]));
}

#[test]
fn s6_split_improves_large_trade() {
    let route = |token_out: &str, pool_id: &str, expected_output: i128| Route {
        path: Path { tokens: vec![TokenId::new("usdc"), TokenId::new(token_out)], pools: vec![PoolId::new(pool_id)] },
        expected_output,
        price_impact_bps: 0,
        score: 0.0,
    };
    let routes = vec![
        route("a", "p1", 1_000 * 10i128.pow(7)),
        route("b", "p2", 950 * 10i128.pow(7)),
        route("c", "p3", 900 * 10i128.pow(7)),
    ];
    let total_input = 1_000 * 10i128.pow(7);
    let split = SplitOptimizer::optimize_split(&routes, total_input).unwrap();
    assert!(split.total_output >= routes[0].expected_output);
    let percent_sum: f64 = split.percents.iter().sum();
    assert!((percent_sum - 100.0).abs() <= 0.01);
}

#[test]
fn s7_cache_expiry() {
    let mut cache = PoolCache::new(100);
    cache.put(0, pool("p1", "a", "b", 1, 1, 30));
    cache.put(0, pool("p2", "b", "c", 1, 1, 30));
    cache.put(0, pool("p3", "c", "d", 1, 1, 30));
    cache.put(0, pool("p4", "d", "e", 1, 1, 30));
    assert_eq!(cache.clean_expired(150), 4);
    assert_eq!(cache.stats().size, 0);
}
