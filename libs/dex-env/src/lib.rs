//! In-process contract host.
//!
//! Contracts are plain Rust values registered against an [`Address`]. They
//! publish trait objects through [`Contract::export`] and call each other
//! through [`Env::invoke_contract`], which tracks the invoking contract,
//! scopes storage to the callee and rolls back every state change made by a
//! call that returns an error. Nested calls back into a contract that is
//! already on the call stack are allowed, which the pool mint callback
//! protocol relies on.

mod deployer;
mod env;
mod error;
mod events;
mod storage;

#[cfg(any(test, feature = "testutils"))]
pub mod testutils;

pub use alloy_primitives::{keccak256, Address, B256};
pub use deployer::{create2_address, Deployer, DeployerWithAddress};
pub use env::{Contract, Env, Exports, MAX_CALL_DEPTH};
pub use error::{ContractError, HostError};
pub use events::{ContractEvent, Events};
pub use storage::{Storage, StorageTier};
