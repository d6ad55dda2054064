use alloy_primitives::Address;
use dex_env::Env;
use serde::{Deserialize, Serialize};

use crate::TokenError;

/// Storage keys for the token contract
#[derive(Clone, Serialize, Deserialize)]
pub enum DataKey {
    /// Admin allowed to mint (Instance storage)
    Admin,
    /// Name, symbol, decimals (Instance storage)
    Metadata,
    /// Total minted supply (Instance storage)
    TotalSupply,
    /// id -> balance (Persistent storage)
    Balance(Address),
    /// (from, spender) -> amount (Persistent storage)
    Allowance(Address, Address),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenMetadata {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

// === Admin & Metadata ===

pub fn is_initialized(env: &Env) -> Result<bool, TokenError> {
    Ok(env.storage().instance().has(&DataKey::Admin)?)
}

pub fn get_admin(env: &Env) -> Result<Address, TokenError> {
    env.storage()
        .instance()
        .get(&DataKey::Admin)?
        .ok_or(TokenError::NotInitialized)
}

pub fn set_admin(env: &Env, admin: &Address) -> Result<(), TokenError> {
    Ok(env.storage().instance().set(&DataKey::Admin, admin)?)
}

pub fn get_metadata(env: &Env) -> Result<TokenMetadata, TokenError> {
    env.storage()
        .instance()
        .get(&DataKey::Metadata)?
        .ok_or(TokenError::NotInitialized)
}

pub fn set_metadata(env: &Env, metadata: &TokenMetadata) -> Result<(), TokenError> {
    Ok(env.storage().instance().set(&DataKey::Metadata, metadata)?)
}

pub fn get_total_supply(env: &Env) -> Result<i128, TokenError> {
    Ok(env
        .storage()
        .instance()
        .get(&DataKey::TotalSupply)?
        .unwrap_or(0))
}

pub fn set_total_supply(env: &Env, supply: i128) -> Result<(), TokenError> {
    Ok(env.storage().instance().set(&DataKey::TotalSupply, &supply)?)
}

// === Balances ===

pub fn get_balance(env: &Env, id: &Address) -> Result<i128, TokenError> {
    Ok(env
        .storage()
        .persistent()
        .get(&DataKey::Balance(*id))?
        .unwrap_or(0))
}

pub fn set_balance(env: &Env, id: &Address, amount: i128) -> Result<(), TokenError> {
    let key = DataKey::Balance(*id);
    if amount == 0 {
        // Remove empty balance
        env.storage().persistent().remove(&key)?;
    } else {
        env.storage().persistent().set(&key, &amount)?;
    }
    Ok(())
}

// === Allowances ===

pub fn get_allowance(env: &Env, from: &Address, spender: &Address) -> Result<i128, TokenError> {
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
) -> Result<(), TokenError> {
    let key = DataKey::Allowance(*from, *spender);
    if amount == 0 {
        env.storage().persistent().remove(&key)?;
    } else {
        env.storage().persistent().set(&key, &amount)?;
    }
    Ok(())
}
