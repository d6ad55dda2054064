use dex_env::Env;
use dex_types::{PoolConfig, PoolState, PositionInfo, PositionKey};
use serde::{Deserialize, Serialize};

use crate::PoolError;

/// Storage keys for the pool contract
#[derive(Clone, Serialize, Deserialize)]
pub enum DataKey {
    /// Pool configuration (Instance storage)
    Config,
    /// Current pool state (Instance storage)
    State,
    /// Position data: PositionKey -> PositionInfo (Persistent storage)
    Position(PositionKey),
}

// === Config ===

pub fn has_config(env: &Env) -> Result<bool, PoolError> {
    Ok(env.storage().instance().has(&DataKey::Config)?)
}

pub fn get_config(env: &Env) -> Result<PoolConfig, PoolError> {
    env.storage()
        .instance()
        .get(&DataKey::Config)?
        .ok_or(PoolError::NotConfigured)
}

pub fn set_config(env: &Env, config: &PoolConfig) -> Result<(), PoolError> {
    Ok(env.storage().instance().set(&DataKey::Config, config)?)
}

// === State ===

pub fn has_state(env: &Env) -> Result<bool, PoolError> {
    Ok(env.storage().instance().has(&DataKey::State)?)
}

pub fn get_state(env: &Env) -> Result<PoolState, PoolError> {
    env.storage()
        .instance()
        .get(&DataKey::State)?
        .ok_or(PoolError::NotInitialized)
}

pub fn set_state(env: &Env, state: &PoolState) -> Result<(), PoolError> {
    Ok(env.storage().instance().set(&DataKey::State, state)?)
}

// === Position ===

pub fn get_position(env: &Env, key: &PositionKey) -> Result<PositionInfo, PoolError> {
    Ok(env
        .storage()
        .persistent()
        .get(&DataKey::Position(*key))?
        .unwrap_or_default())
}

pub fn set_position(env: &Env, key: &PositionKey, info: &PositionInfo) -> Result<(), PoolError> {
    let data_key = DataKey::Position(*key);
    if info.is_empty() {
        // Remove empty position
        env.storage().persistent().remove(&data_key)?;
    } else {
        env.storage().persistent().set(&data_key, info)?;
    }
    Ok(())
}
