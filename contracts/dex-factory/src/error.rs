use dex_env::{ContractError, Env, HostError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error("Already initialized")]
    AlreadyInitialized,
    #[error("Not initialized")]
    NotInitialized,
    #[error("Identical tokens")]
    IdenticalTokens,
    #[error("Pool already exists")]
    PoolExists,
    #[error("Fee not enabled")]
    FeeNotEnabled,
    #[error("Invalid tick spacing")]
    InvalidTickSpacing,
    #[error("Fee too high")]
    FeeTooHigh,
    #[error("Fee already enabled")]
    FeeAlreadyEnabled,
    #[error(transparent)]
    Host(#[from] HostError),
}

impl FactoryError {
    /// Stable error code; 0 for host failures passed through.
    pub fn code(&self) -> u32 {
        match self {
            FactoryError::AlreadyInitialized => 1,
            FactoryError::NotInitialized => 2,
            FactoryError::IdenticalTokens => 3,
            FactoryError::PoolExists => 4,
            FactoryError::FeeNotEnabled => 5,
            FactoryError::InvalidTickSpacing => 6,
            FactoryError::FeeTooHigh => 7,
            FactoryError::FeeAlreadyEnabled => 8,
            FactoryError::Host(_) => 0,
        }
    }
}

impl ContractError for FactoryError {
    fn from_code(code: u32) -> Option<Self> {
        match code {
            1 => Some(FactoryError::AlreadyInitialized),
            2 => Some(FactoryError::NotInitialized),
            3 => Some(FactoryError::IdenticalTokens),
            4 => Some(FactoryError::PoolExists),
            5 => Some(FactoryError::FeeNotEnabled),
            6 => Some(FactoryError::InvalidTickSpacing),
            7 => Some(FactoryError::FeeTooHigh),
            8 => Some(FactoryError::FeeAlreadyEnabled),
            _ => None,
        }
    }

    fn into_host_error(self, env: &Env) -> HostError {
        match self {
            FactoryError::Host(err) => err,
            other => HostError::from_contract(env, other.code(), other.to_string()),
        }
    }
}
