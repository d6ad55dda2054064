use dex_env::{ContractError, Env, HostError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("Not initialized")]
    NotInitialized,
    #[error("Negative amount")]
    NegativeAmount,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient allowance")]
    InsufficientAllowance,
    #[error("Amount overflow")]
    AmountOverflow,
    #[error(transparent)]
    Host(#[from] HostError),
}

impl TokenError {
    /// Stable error code; 0 for host failures passed through.
    pub fn code(&self) -> u32 {
        match self {
            TokenError::AlreadyInitialized => 1,
            TokenError::NotInitialized => 2,
            TokenError::NegativeAmount => 3,
            TokenError::InsufficientBalance => 4,
            TokenError::InsufficientAllowance => 5,
            TokenError::AmountOverflow => 6,
            TokenError::Host(_) => 0,
        }
    }
}

impl ContractError for TokenError {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(TokenError::AlreadyInitialized),
            2 => Some(TokenError::NotInitialized),
            3 => Some(TokenError::NegativeAmount),
            4 => Some(TokenError::InsufficientBalance),
            5 => Some(TokenError::InsufficientAllowance),
            6 => Some(TokenError::AmountOverflow),
            _ => None,
        }
    }

    fn into_host_error(self, env: &Env) -> HostError {
        match self {
            TokenError::Host(err) => err,
            other => HostError::from_contract(env, other.code(), other.to_string()),
        }
    }
}
