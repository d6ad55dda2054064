use dex_env::{ContractError, Env, HostError};
use dex_math::MathError;

/// Offset of [`MathError`] codes within the pool's code space.
const MATH_CODE_BASE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    #[error("Pool not configured")]
    NotConfigured,
    #[error("Pool already configured")]
    AlreadyConfigured,
    #[error("Pool not initialized")]
    NotInitialized,
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("token0 must be less than token1")]
    InvalidTokenOrder,
    #[error("Invalid tick range")]
    InvalidTickRange,
    #[error("Amount must be non-zero")]
    ZeroLiquidity,
    #[error("Liquidity exceeds the per-tick maximum")]
    LiquidityPerTickExceeded,
    #[error("M0")]
    InsufficientPayment0,
    #[error("M1")]
    InsufficientPayment1,
    #[error("Amount overflow")]
    AmountOverflow,
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Host(#[from] HostError),
}

impl PoolError {
    /// Stable error code; 0 for host failures passed through.
    pub fn code(&self) -> u32 {
        match self {
            PoolError::NotConfigured => 1,
            PoolError::AlreadyConfigured => 2,
            PoolError::NotInitialized => 3,
            PoolError::AlreadyInitialized => 4,
            PoolError::InvalidTokenOrder => 5,
            PoolError::InvalidTickRange => 6,
            PoolError::ZeroLiquidity => 7,
            PoolError::LiquidityPerTickExceeded => 8,
            PoolError::InsufficientPayment0 => 9,
            PoolError::InsufficientPayment1 => 10,
            PoolError::AmountOverflow => 11,
            PoolError::Math(err) => MATH_CODE_BASE + err.code(),
            PoolError::Host(_) => 0,
        }
    }
}

impl ContractError for PoolError {
    fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            1 => PoolError::NotConfigured,
            2 => PoolError::AlreadyConfigured,
            3 => PoolError::NotInitialized,
            4 => PoolError::AlreadyInitialized,
            5 => PoolError::InvalidTokenOrder,
            6 => PoolError::InvalidTickRange,
            7 => PoolError::ZeroLiquidity,
            8 => PoolError::LiquidityPerTickExceeded,
            9 => PoolError::InsufficientPayment0,
            10 => PoolError::InsufficientPayment1,
            11 => PoolError::AmountOverflow,
            code if code > MATH_CODE_BASE => {
                PoolError::Math(MathError::from_code(code - MATH_CODE_BASE)?)
            }
            _ => return None,
        };
        Some(err)
    }

    fn into_host_error(self, env: &Env) -> HostError {
        match self {
            PoolError::Host(err) => err,
            other => HostError::from_contract(env, other.code(), other.to_string()),
        }
    }
}
