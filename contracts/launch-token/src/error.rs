use dex_env::{ContractError, Env, HostError};
use dex_math::MathError;

/// Offset of [`MathError`] codes within the launch token's code space.
const MATH_CODE_BASE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LaunchError {
    #[error("Pool already created")]
    AlreadyCreated,
    #[error("Pool not created")]
    PoolNotCreated,
    #[error("Pool already initialized")]
    AlreadyInitialized,
    #[error("Can only be called by the pool")]
    UnauthorizedCaller,
    #[error("Insufficient approval of the reference asset")]
    InsufficientApproval,
    #[error("Transfer failed")]
    TransferFailed,
    #[error("Invalid tick range")]
    InvalidTickRange,
    #[error("Already configured")]
    AlreadyConfigured,
    #[error("Not configured")]
    NotConfigured,
    #[error("Invalid launch configuration")]
    InvalidConfig,
    #[error("Fee tier is not enabled")]
    InvalidFeeTier,
    #[error("Pool price not initialized")]
    PoolNotInitialized,
    #[error("Liquidity amount must be non-zero")]
    InvalidLiquidityAmount,
    #[error("A liquidity mint is already in progress")]
    MintInProgress,
    #[error("No mint is waiting for settlement")]
    UnexpectedCallback,
    #[error("Callback payer does not match the pending mint")]
    PayerMismatch,
    #[error("Pool returned without settling the mint")]
    SettlementMissing,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient allowance")]
    InsufficientAllowance,
    #[error("Negative amount")]
    NegativeAmount,
    #[error("Amount overflow")]
    AmountOverflow,
    #[error("Pool reported amounts that differ from the settlement")]
    SettlementMismatch,
    #[error(transparent)]
    Math(#[from] MathError),
    #[error(transparent)]
    Host(#[from] HostError),
}

impl LaunchError {
    /// Stable error code; 0 for host failures passed through.
    pub fn code(&self) -> u32 {
        match self {
            LaunchError::AlreadyCreated => 1,
            LaunchError::PoolNotCreated => 2,
            LaunchError::AlreadyInitialized => 3,
            LaunchError::UnauthorizedCaller => 4,
            LaunchError::InsufficientApproval => 5,
            LaunchError::TransferFailed => 6,
            LaunchError::InvalidTickRange => 7,
            LaunchError::AlreadyConfigured => 8,
            LaunchError::NotConfigured => 9,
            LaunchError::InvalidConfig => 10,
            LaunchError::InvalidFeeTier => 11,
            LaunchError::PoolNotInitialized => 12,
            LaunchError::InvalidLiquidityAmount => 13,
            LaunchError::MintInProgress => 14,
            LaunchError::UnexpectedCallback => 15,
            LaunchError::PayerMismatch => 16,
            LaunchError::SettlementMissing => 17,
            LaunchError::InsufficientBalance => 18,
            LaunchError::InsufficientAllowance => 19,
            LaunchError::NegativeAmount => 20,
            LaunchError::AmountOverflow => 21,
            LaunchError::SettlementMismatch => 22,
            LaunchError::Math(err) => MATH_CODE_BASE + err.code(),
            LaunchError::Host(_) => 0,
        }
    }
}

impl ContractError for LaunchError {
    fn from_code(code: u32) -> Option<Self> {
        let err = match code {
            1 => LaunchError::AlreadyCreated,
            2 => LaunchError::PoolNotCreated,
            3 => LaunchError::AlreadyInitialized,
            4 => LaunchError::UnauthorizedCaller,
            5 => LaunchError::InsufficientApproval,
            6 => LaunchError::TransferFailed,
            7 => LaunchError::InvalidTickRange,
            8 => LaunchError::AlreadyConfigured,
            9 => LaunchError::NotConfigured,
            10 => LaunchError::InvalidConfig,
            11 => LaunchError::InvalidFeeTier,
            12 => LaunchError::PoolNotInitialized,
            13 => LaunchError::InvalidLiquidityAmount,
            14 => LaunchError::MintInProgress,
            15 => LaunchError::UnexpectedCallback,
            16 => LaunchError::PayerMismatch,
            17 => LaunchError::SettlementMissing,
            18 => LaunchError::InsufficientBalance,
            19 => LaunchError::InsufficientAllowance,
            20 => LaunchError::NegativeAmount,
            21 => LaunchError::AmountOverflow,
            22 => LaunchError::SettlementMismatch,
            code if code > MATH_CODE_BASE => {
                LaunchError::Math(MathError::from_code(code - MATH_CODE_BASE)?)
            }
            _ => return None,
        };
        Some(err)
    }

    fn into_host_error(self, env: &Env) -> HostError {
        match self {
            LaunchError::Host(err) => err,
            other => HostError::from_contract(env, other.code(), other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_round_trip() {
        for code in 1..=22 {
            let err = LaunchError::from_code(code).unwrap();
            assert_eq!(err.code(), code);
        }
        for math in MathError::ALL {
            let err = LaunchError::Math(math);
            assert_eq!(LaunchError::from_code(err.code()), Some(err));
        }
        assert_eq!(LaunchError::from_code(0), None);
        assert_eq!(LaunchError::from_code(23), None);
    }

    #[test]
    fn test_unauthorized_message() {
        assert_eq!(
            LaunchError::UnauthorizedCaller.to_string(),
            "Can only be called by the pool"
        );
    }
}
