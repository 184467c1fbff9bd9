//! Structured error types for the router core.
//!
//! Every fallible public function in this crate returns
//! `Result<T, AmmError>`. Collaborator traits (`PoolDirectory`,
//! `PoolSource`) return `anyhow::Result` at their boundary since their
//! failure modes (RPC/transport) are not enumerable here; the router
//! façade wraps those into [`AmmError::CacheError`].

use crate::types::{PoolId, TokenId};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AmmError {
    #[error("invalid argument: {reason}")]
    InvalidArgument { reason: String },

    #[error("invalid amount: {reason}")]
    InvalidAmount { reason: String },

    #[error("insufficient liquidity: {reason}")]
    InsufficientLiquidity { reason: String },

    #[error("division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("overflow in {context}")]
    Overflow { context: String },

    #[error("underflow in {context}")]
    Underflow { context: String },

    #[error("invalid token pair: {reason}")]
    InvalidTokenPair { reason: String },

    #[error("no route found from {token_in} to {token_out}")]
    NoRouteFound { token_in: TokenId, token_out: TokenId },

    #[error("split optimization failed: {reason}")]
    OptimizationFailed { reason: String },

    #[error("pool source/directory error: {reason}")]
    CacheError { reason: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    #[error("pool not found: {pool_id}")]
    PoolNotFound { pool_id: PoolId },
}

impl AmmError {
    pub fn invalid_argument(reason: impl Into<String>) -> Self {
        Self::InvalidArgument { reason: reason.into() }
    }

    pub fn invalid_amount(reason: impl Into<String>) -> Self {
        Self::InvalidAmount { reason: reason.into() }
    }

    pub fn insufficient_liquidity(reason: impl Into<String>) -> Self {
        Self::InsufficientLiquidity { reason: reason.into() }
    }

    pub fn from_collaborator(err: anyhow::Error) -> Self {
        Self::CacheError { reason: err.to_string() }
    }
}

pub type AmmResult<T> = Result<T, AmmError>;
