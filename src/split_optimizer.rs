//! Splits a total input across up to `max_splits` candidate routes.
//!
//! The curated distribution tables and the local 5%-step refinement
//! both estimate each route's output *linearly* from its candidate
//! `expected_output`, an intentional, documented approximation (see
//! `DESIGN.md`): it ignores AMM curvature and is an upper bound on the
//! true achievable sum, but is cheap and bit-compatible across
//! implementations. `Router::get_split_quote` is the faithful per-hop
//! recompute mode for callers that need the true figure.

use crate::error::{AmmError, AmmResult};
use crate::types::Route;

/// A candidate percentage distribution across routes (must sum to 100,
/// within floating-point tolerance).
type Distribution = Vec<f64>;

fn two_route_distributions() -> Vec<Distribution> {
    (0..=10).map(|tenths| vec![(10 - tenths) as f64 * 10.0, tenths as f64 * 10.0]).collect()
}

fn three_route_distributions() -> Vec<Distribution> {
    [
        [100.0, 0.0, 0.0],
        [80.0, 20.0, 0.0],
        [80.0, 10.0, 10.0],
        [70.0, 30.0, 0.0],
        [70.0, 20.0, 10.0],
        [70.0, 15.0, 15.0],
        [60.0, 40.0, 0.0],
        [60.0, 30.0, 10.0],
        [60.0, 20.0, 20.0],
        [50.0, 50.0, 0.0],
        [50.0, 40.0, 10.0],
        [50.0, 30.0, 20.0],
        [50.0, 25.0, 25.0],
        [40.0, 40.0, 20.0],
        [40.0, 30.0, 30.0],
        [34.0, 33.0, 33.0],
    ]
    .into_iter()
    .map(|d| d.to_vec())
    .collect()
}

/// Equal split plus `{70, 60, 50}`-weighted-first variants, remaining
/// percentage distributed equally across the other routes (remainder
/// to index 1).
fn many_route_distributions(n: usize) -> Vec<Distribution> {
    let mut out = Vec::new();

    let equal = 100.0 / n as f64;
    out.push(vec![equal; n]);

    for &first in &[70.0, 60.0, 50.0] {
        let remaining = 100.0 - first;
        let share = remaining / (n - 1) as f64;
        let mut dist = vec![share; n];
        dist[0] = first;
        // fix up rounding so the distribution sums to exactly 100.
        let sum: f64 = dist.iter().sum();
        dist[1] += 100.0 - sum;
        out.push(dist);
    }

    out
}

fn distributions_for(n: usize) -> Vec<Distribution> {
    match n {
        0 | 1 => vec![vec![100.0]],
        2 => two_route_distributions(),
        3 => three_route_distributions(),
        _ => many_route_distributions(n),
    }
}

fn sums_to_100(dist: &[f64]) -> bool {
    (dist.iter().sum::<f64>() - 100.0).abs() <= 0.01
}

/// Route-local input amounts for `total` split per `dist`, exact (any
/// rounding remainder assigned to the last route).
fn amounts_for(total: i128, dist: &[f64]) -> Vec<i128> {
    let mut amounts: Vec<i128> = dist.iter().map(|pct| (total as f64 * pct / 100.0).floor() as i128).collect();
    let assigned: i128 = amounts.iter().sum();
    let remainder = total - assigned;
    if let Some(last) = amounts.last_mut() {
        *last += remainder;
    }
    amounts
}

struct Evaluated {
    amounts: Vec<i128>,
    percents: Vec<f64>,
    total_output: i128,
    weighted_impact_bps: i128,
}

fn evaluate(routes: &[Route], total: i128, dist: &[f64]) -> Evaluated {
    let amounts = amounts_for(total, dist);
    let mut total_output: i128 = 0;
    let mut weighted_impact: i128 = 0;
    for (route, &amount) in routes.iter().zip(amounts.iter()) {
        if route.expected_output > 0 {
            // linear estimate: out_i ~= expected_output_i * (amount_i / total)
            let out_i = (route.expected_output as f64 * (amount as f64 / total as f64)).round() as i128;
            total_output += out_i;
        }
        weighted_impact += route.price_impact_bps * amount;
    }
    let weighted_impact_bps = if total == 0 { 0 } else { weighted_impact / total };
    Evaluated { amounts, percents: dist.to_vec(), total_output, weighted_impact_bps }
}

pub struct SplitOptimizer;

impl SplitOptimizer {
    /// Select the curated distribution over `routes` (already trimmed
    /// to the top `max_splits` candidates by the caller) with the
    /// greatest linearly-estimated `total_output`.
    pub fn optimize_split(routes: &[Route], total_input: i128) -> AmmResult<crate::types::SplitRoute> {
        if routes.is_empty() {
            return Err(AmmError::OptimizationFailed { reason: "no candidate routes".to_string() });
        }
        if total_input <= 0 {
            return Err(AmmError::invalid_amount("total_input must be positive"));
        }

        if routes.len() == 1 {
            return Ok(Self::degenerate_split(&routes[0], total_input));
        }

        let candidates: Vec<Distribution> =
            distributions_for(routes.len()).into_iter().filter(|d| sums_to_100(d)).collect();
        if candidates.is_empty() {
            return Err(AmmError::OptimizationFailed { reason: "no valid distribution summed to 100".to_string() });
        }

        let best = candidates
            .iter()
            .map(|dist| evaluate(routes, total_input, dist))
            .max_by_key(|e| e.total_output)
            .expect("candidates is non-empty");

        Ok(Self::finalize(routes, best, total_input))
    }

    /// Local hill-climbing refinement starting from the equal split:
    /// at each of up to `iterations` steps, try moving 5% from one
    /// route to another (every ordered pair where the source has
    /// `>= 5%`), keep the first neighbour that strictly improves total
    /// output, stop when none does.
    pub fn optimize(routes: &[Route], total_input: i128, iterations: u32) -> AmmResult<crate::types::SplitRoute> {
        if routes.is_empty() {
            return Err(AmmError::OptimizationFailed { reason: "no candidate routes".to_string() });
        }
        if routes.len() == 1 {
            return Ok(Self::degenerate_split(&routes[0], total_input));
        }

        let n = routes.len();
        let mut dist = vec![100.0 / n as f64; n];

        for _ in 0..iterations {
            let current = evaluate(routes, total_input, &dist);
            let mut improved = None;

            'search: for from in 0..n {
                if dist[from] < 5.0 {
                    continue;
                }
                for to in 0..n {
                    if from == to {
                        continue;
                    }
                    let mut neighbour = dist.clone();
                    neighbour[from] -= 5.0;
                    neighbour[to] += 5.0;
                    let candidate = evaluate(routes, total_input, &neighbour);
                    if candidate.total_output > current.total_output {
                        improved = Some(neighbour);
                        break 'search;
                    }
                }
            }

            match improved {
                Some(next) => dist = next,
                None => break,
            }
        }

        let evaluated = evaluate(routes, total_input, &dist);
        Ok(Self::finalize(routes, evaluated, total_input))
    }

    /// True iff the chosen split's `total_output` strictly exceeds the
    /// first candidate route's `expected_output`.
    pub fn is_better_than_single_route(split_total_output: i128, first_candidate_output: i128) -> bool {
        split_total_output > first_candidate_output
    }

    fn degenerate_split(route: &Route, total_input: i128) -> crate::types::SplitRoute {
        crate::types::SplitRoute {
            routes: vec![route.clone()],
            amounts: vec![total_input],
            percents: vec![100.0],
            total_output: route.expected_output,
            weighted_impact_bps: route.price_impact_bps,
            is_better_than_single: false,
        }
    }

    fn finalize(routes: &[Route], evaluated: Evaluated, total_input: i128) -> crate::types::SplitRoute {
        let _ = total_input;
        let mut kept_routes = Vec::new();
        let mut kept_amounts = Vec::new();
        let mut kept_percents = Vec::new();
        for ((route, amount), percent) in routes.iter().zip(evaluated.amounts.iter()).zip(evaluated.percents.iter()) {
            if *amount == 0 {
                continue;
            }
            kept_routes.push(route.clone());
            kept_amounts.push(*amount);
            kept_percents.push(*percent);
        }

        let is_better_than_single = Self::is_better_than_single_route(evaluated.total_output, routes[0].expected_output);

        crate::types::SplitRoute {
            routes: kept_routes,
            amounts: kept_amounts,
            percents: kept_percents,
            total_output: evaluated.total_output,
            weighted_impact_bps: evaluated.weighted_impact_bps,
            is_better_than_single,
        }
    }
}
