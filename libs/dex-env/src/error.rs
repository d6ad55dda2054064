use crate::Env;
use alloy_primitives::{Address, B256};
use core::fmt;

/// Errors raised by the host while dispatching a contract call, or carried
/// back to the caller when a contract fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HostError {
    #[error("no source account set for a top-level invocation")]
    MissingSourceAccount,

    #[error("no contract is executing")]
    NotExecuting,

    #[error("call depth {depth} exceeds the maximum of {max}")]
    CallDepthExceeded { depth: usize, max: usize },

    #[error("no contract registered at {0}")]
    MissingContract(Address),

    #[error("contract {address} does not export `{interface}`")]
    MissingInterface {
        address: Address,
        interface: &'static str,
    },

    #[error("a contract is already registered at {0}")]
    ContractExists(Address),

    #[error("no contract code uploaded under hash {0}")]
    UnknownCode(B256),

    #[error("{0} has not authorized this invocation")]
    NotAuthorized(Address),

    #[error("storage codec error: {0}")]
    Codec(String),

    #[error("contract {contract} failed with error #{code}: {message}")]
    Contract {
        contract: Address,
        code: u32,
        message: String,
    },
}

impl HostError {
    /// Recovers a typed error raised by `contract`.
    ///
    /// Returns `None` when the failure came from a different contract or
    /// from the host itself.
    pub fn contract_error<E: ContractError>(&self, contract: &Address) -> Option<E> {
        match self {
            HostError::Contract {
                contract: failed,
                code,
                ..
            } if failed == contract => E::from_code(*code),
            _ => None,
        }
    }

    /// A failure of the executing contract with the given code.
    ///
    /// Outside of any invocation there is no contract to blame, and the
    /// result is [`HostError::NotExecuting`].
    pub fn from_contract(env: &Env, code: u32, message: String) -> HostError {
        match env.current_contract_address() {
            Ok(contract) => HostError::Contract {
                contract,
                code,
                message,
            },
            Err(err) => err,
        }
    }

    /// The numeric code of a contract failure, if this is one.
    pub fn code(&self) -> Option<u32> {
        match self {
            HostError::Contract { code, .. } => Some(*code),
            _ => None,
        }
    }
}

/// A contract error with stable numeric codes.
///
/// Codes are what crosses contract boundaries; the typed value is rebuilt on
/// the other side with [`ContractError::from_code`].
pub trait ContractError: Sized + fmt::Display {
    fn from_code(code: u32) -> Option<Self>;

    /// Converts into the host representation, attributed to the contract that
    /// is currently executing.
    fn into_host_error(self, env: &Env) -> HostError;

    /// Converts a host error received from a nested call. A failure that
    /// originated in the current contract is mapped back to its typed variant.
    fn from_host_error(env: &Env, err: HostError) -> Self
    where
        Self: From<HostError>,
    {
        match env.current_contract_address() {
            Ok(contract) => err.contract_error(&contract).unwrap_or_else(|| Self::from(err)),
            Err(_) => Self::from(err),
        }
    }
}
