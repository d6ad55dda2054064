use alloy_primitives::Address;
use dex_env::Env;
use dex_types::{Fee, PositionInfo, PositionKey};
use serde::{Deserialize, Serialize};

use crate::{LaunchConfig, LaunchError};

/// Storage keys for the launch token
#[derive(Clone, Serialize, Deserialize)]
pub enum DataKey {
    /// Admin allowed to create and price the pool (Instance storage)
    Admin,
    /// Launch parameters (Instance storage)
    Config,
    /// Total minted supply (Instance storage)
    TotalSupply,
    /// The single pool of this token (Instance storage)
    PoolReference,
    /// Pool price initialization (Instance storage)
    PriceState,
    /// id -> balance (Persistent storage)
    Balance(Address),
    /// (from, spender) -> amount (Persistent storage)
    Allowance(Address, Address),
    /// Mirrored pool position (Persistent storage)
    Position(PositionKey),
    /// Mint waiting for its settlement callback (Temporary storage)
    PendingMint,
}

/// The pool created for this token, written once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolReference {
    pub factory: Address,
    pub pool: Address,
    pub token0: Address,
    pub token1: Address,
    pub fee: Fee,
    pub tick_spacing: i32,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceState {
    pub initialized: bool,
    /// Starting sqrt(price) as Q64.96, 0 until initialized
    pub sqrt_price_x96: u128,
}

/// Context of a mint between the pool call and its callback.
///
/// `amount0`/`amount1` hold what the callback actually charged the payer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingMint {
    pub payer: Address,
    pub settled: bool,
    pub amount0: u128,
    pub amount1: u128,
}

impl PendingMint {
    pub fn new(payer: Address) -> Self {
        Self {
            payer,
            settled: false,
            amount0: 0,
            amount1: 0,
        }
    }
}

// === Admin & Config ===

pub fn is_configured(env: &Env) -> Result<bool, LaunchError> {
    Ok(env.storage().instance().has(&DataKey::Admin)?)
}

pub fn get_admin(env: &Env) -> Result<Address, LaunchError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)?
        .ok_or(LaunchError::NotConfigured)
}

pub fn set_admin(env: &Env, admin: &Address) -> Result<(), LaunchError> {
    Ok(env.storage().instance().set(&DataKey::Admin, admin)?)
}

pub fn get_config(env: &Env) -> Result<LaunchConfig, LaunchError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)?
        .ok_or(LaunchError::NotConfigured)
}

pub fn set_config(env: &Env, config: &LaunchConfig) -> Result<(), LaunchError> {
    Ok(env.storage().instance().set(&DataKey::Config, config)?)
}

pub fn get_total_supply(env: &Env) -> Result<i128, LaunchError> {
    Ok(env
        .storage()
        .instance()
        .get(&DataKey::TotalSupply)?
        .unwrap_or(0))
}

pub fn set_total_supply(env: &Env, supply: i128) -> Result<(), LaunchError> {
    Ok(env.storage().instance().set(&DataKey::TotalSupply, &supply)?)
}

// === Pool ===

pub fn get_pool_reference(env: &Env) -> Result<Option<PoolReference>, LaunchError> {
    Ok(env.storage().instance().get(&DataKey::PoolReference)?)
}

/// The recorded pool, or `PoolNotCreated`.
pub fn require_pool_reference(env: &Env) -> Result<PoolReference, LaunchError> {
    get_pool_reference(env)?.ok_or(LaunchError::PoolNotCreated)
}

pub fn set_pool_reference(env: &Env, reference: &PoolReference) -> Result<(), LaunchError> {
    Ok(env
        .storage()
        .instance()
        .set(&DataKey::PoolReference, reference)?)
}

pub fn get_price_state(env: &Env) -> Result<PriceState, LaunchError> {
    Ok(env
        .storage()
        .instance()
        .get(&DataKey::PriceState)?
        .unwrap_or_default())
}

pub fn set_price_state(env: &Env, state: &PriceState) -> Result<(), LaunchError> {
    Ok(env.storage().instance().set(&DataKey::PriceState, state)?)
}

// === Balances ===

pub fn get_balance(env: &Env, id: &Address) -> Result<i128, LaunchError> {
    Ok(env
        .storage()
        .persistent()
        .get(&DataKey::Balance(*id))?
        .unwrap_or(0))
}

pub fn set_balance(env: &Env, id: &Address, amount: i128) -> Result<(), LaunchError> {
    let key = DataKey::Balance(*id);
    if amount == 0 {
        env.storage().persistent().remove(&key)?;
    } else {
        env.storage().persistent().set(&key, &amount)?;
    }
    Ok(())
}

pub fn get_allowance(env: &Env, from: &Address, spender: &Address) -> Result<i128, LaunchError> {
    Ok(env
        .storage()
        .persistent()
        .get(&DataKey::Allowance(*from, *spender))?
        .unwrap_or(0))
}

pub fn set_allowance(
    env: &Env,
    from: &Address,
    spender: &Address,
    amount: i128,
) -> Result<(), LaunchError> {
    let key = DataKey::Allowance(*from, *spender);
    if amount == 0 {
        env.storage().persistent().remove(&key)?;
    } else {
        env.storage().persistent().set(&key, &amount)?;
    }
    Ok(())
}

// === Positions ===

pub fn get_position(env: &Env, key: &PositionKey) -> Result<PositionInfo, LaunchError> {
    Ok(env
        .storage()
        .persistent()
        .get(&DataKey::Position(*key))?
        .unwrap_or_default())
}

pub fn set_position(env: &Env, key: &PositionKey, position: &PositionInfo) -> Result<(), LaunchError> {
    let key = DataKey::Position(*key);
    if position.is_empty() {
        env.storage().persistent().remove(&key)?;
    } else {
        env.storage().persistent().set(&key, position)?;
    }
    Ok(())
}

// === Pending mint ===

pub fn get_pending_mint(env: &Env) -> Result<Option<PendingMint>, LaunchError> {
    Ok(env.storage().temporary().get(&DataKey::PendingMint)?)
}

pub fn set_pending_mint(env: &Env, pending: &PendingMint) -> Result<(), LaunchError> {
    Ok(env.storage().temporary().set(&DataKey::PendingMint, pending)?)
}

pub fn clear_pending_mint(env: &Env) -> Result<(), LaunchError> {
    Ok(env.storage().temporary().remove(&DataKey::PendingMint)?)
}
