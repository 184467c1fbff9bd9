//! External collaborator interfaces.
//!
//! These are the narrow seams the core calls out through; real
//! implementations (an RPC client, an indexer-backed directory) are a
//! host concern and out of scope here, matching the teacher's pattern
//! of injecting `RealDexIntegration`/`LivePriceOracle` behind small
//! traits rather than owning the transport itself.

use async_trait::async_trait;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::types::{PoolId, PoolSnapshot};

/// Discovers which pools exist at the venue the host is configured
/// against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolDirectory: Send + Sync {
    /// Every pool known to the ambient venue. Transport failures
    /// surface as `anyhow::Error`; the router façade wraps them into
    /// `AmmError::CacheError`.
    async fn list_pools(&self) -> anyhow::Result<Vec<PoolId>>;
}

/// Fetches a pool's current reserves and fee.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PoolSource: Send + Sync {
    /// May be called concurrently by the façade if the host permits.
    async fn load_snapshot(&self, pool_id: &PoolId) -> anyhow::Result<PoolSnapshot>;
}

/// Wall-clock time, factored out so TTL-dependent tests can drive time
/// deterministically instead of sleeping.
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> u64;
}

/// The only concrete `Clock` this crate ships: real wall-clock time
/// via `SystemTime`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before the Unix epoch")
            .as_millis() as u64
    }
}

// Blanket impls so `Router<Box<dyn PoolDirectory>, Box<dyn PoolSource>,
// Box<dyn Clock>>` (see `router::DynRouter`) is itself a valid `Router`
// instantiation for hosts that need runtime-selected collaborators.

#[async_trait]
impl PoolDirectory for Box<dyn PoolDirectory> {
    async fn list_pools(&self) -> anyhow::Result<Vec<PoolId>> {
        (**self).list_pools().await
    }
}

#[async_trait]
impl PoolSource for Box<dyn PoolSource> {
    async fn load_snapshot(&self, pool_id: &PoolId) -> anyhow::Result<PoolSnapshot> {
        (**self).load_snapshot(pool_id).await
    }
}

impl Clock for Box<dyn Clock> {
    fn now_ms(&self) -> u64 {
        (**self).now_ms()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_clock_is_monotonic_enough_for_a_test() {
        let clock = SystemClock;
        let a = clock.now_ms();
        let b = clock.now_ms();
        assert!(b >= a);
    }
}
