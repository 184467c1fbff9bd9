//! Client-side route planner and quoter for constant-product AMM pools.
//!
//! Given a pool directory, an input token, an output token and an
//! input amount, this crate finds the best single path of swaps
//! through up to `max_hops` intermediate tokens, or an optimal split
//! of the input across several paths to reduce aggregate price impact
//! on large trades. Every number produced agrees bit-exactly with the
//! on-chain AMM's own integer arithmetic.
//!
//! Transaction building/signing/submission, the RPC client used to
//! fetch reserves, and any convenience client composing swaps are out
//! of scope; those live behind the [`collaborators`] traits and are
//! supplied by the host.
//!
//! ```text
//! FixedMath -> AmmFormulas -> PoolCache -> Pathfinder -> SplitOptimizer -> Router
//! ```

pub mod collaborators;
pub mod error;
pub mod fixed_math;
pub mod formulas;
pub mod pathfinder;
pub mod pool_cache;
pub mod router;
pub mod split_optimizer;
pub mod types;

pub use collaborators::{Clock, PoolDirectory, PoolSource, SystemClock};
pub use error::{AmmError, AmmResult};
pub use fixed_math::FixedMath;
pub use formulas::{AmmFormulas, HopReserves};
pub use pathfinder::{PathSearchOptions, Pathfinder};
pub use pool_cache::{CacheStats, PoolCache};
pub use router::{DynRouter, PoolDirectoryId, Router, RouterConfig};
pub use split_optimizer::SplitOptimizer;
pub use types::{
    CacheEntry, HopQuote, Path, PoolId, PoolSnapshot, Route, RouteQuote, RouterStats, SplitQuote, SplitRoute,
    TokenId,
};
