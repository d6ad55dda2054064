//! Reference concentrated-liquidity pool.
//!
//! Implements what liquidity providers consume from a pool: one-time setup by
//! the factory, one-time price initialization, minting with the payment
//! callback, and position/price views. Swaps and fee accounting are not part
//! of it.

mod error;
mod liquidity;
mod storage;

pub use error::PoolError;

use alloy_primitives::Address;
use dex_env::{Contract, ContractError, Env, Exports, HostError};
use dex_math::get_tick_at_sqrt_ratio;
use dex_types::{
    max_liquidity_per_tick, MintCallbackData, PoolConfig, PoolInterface, PoolState, PositionInfo,
    PositionKey, Slot0,
};
use std::rc::Rc;
use storage::{get_config, get_position, get_state, has_config, has_state, set_config, set_state};

#[derive(Default)]
pub struct DexPool;

impl DexPool {
    /// One-time setup, only accepted from `factory`
    pub fn configure(
        &self,
        env: &Env,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
    ) -> Result<(), PoolError> {
        if has_config(env)? {
            return Err(PoolError::AlreadyConfigured);
        }
        env.require_auth(&factory)?;

        // Validate token ordering
        if token0 >= token1 {
            return Err(PoolError::InvalidTokenOrder);
        }
        if tick_spacing <= 0 {
            return Err(PoolError::InvalidTickRange);
        }

        set_config(
            env,
            &PoolConfig {
                factory,
                token0,
                token1,
                fee,
                tick_spacing,
                max_liquidity_per_tick: max_liquidity_per_tick(tick_spacing),
            },
        )
    }

    /// Set the starting price, once
    pub fn initialize(&self, env: &Env, sqrt_price_x96: u128) -> Result<(), PoolError> {
        get_config(env)?;
        if has_state(env)? {
            return Err(PoolError::AlreadyInitialized);
        }

        // Calculate initial tick from sqrt price
        let tick = get_tick_at_sqrt_ratio(sqrt_price_x96)?;
        set_state(env, &PoolState::new(sqrt_price_x96, tick))?;

        env.events().publish(&["initialize"], &(sqrt_price_x96, tick))?;
        let pool = env.current_contract_address()?;
        tracing::info!(%pool, sqrt_price_x96, tick, "pool initialized");
        Ok(())
    }

    /// Add liquidity to a position
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts deposited
    pub fn mint(
        &self,
        env: &Env,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        data: MintCallbackData,
    ) -> Result<(u128, u128), PoolError> {
        liquidity::mint(env, recipient, tick_lower, tick_upper, amount, data)
    }

    // === View Functions ===

    pub fn positions(
        &self,
        env: &Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<PositionInfo, PoolError> {
        get_position(env, &PositionKey::new(owner, tick_lower, tick_upper))
    }

    pub fn slot0(&self, env: &Env) -> Result<Slot0, PoolError> {
        Ok(get_state(env)?.slot0())
    }

    pub fn liquidity(&self, env: &Env) -> Result<u128, PoolError> {
        Ok(get_state(env)?.liquidity)
    }

    pub fn config(&self, env: &Env) -> Result<PoolConfig, PoolError> {
        get_config(env)
    }
}

impl PoolInterface for DexPool {
    fn configure(
        &self,
        env: &Env,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
    ) -> Result<(), HostError> {
        DexPool::configure(self, env, factory, token0, token1, fee, tick_spacing)
            .map_err(|err| err.into_host_error(env))
    }

    fn initialize(&self, env: &Env, sqrt_price_x96: u128) -> Result<(), HostError> {
        DexPool::initialize(self, env, sqrt_price_x96).map_err(|err| err.into_host_error(env))
    }

    fn mint(
        &self,
        env: &Env,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        data: MintCallbackData,
    ) -> Result<(u128, u128), HostError> {
        DexPool::mint(self, env, recipient, tick_lower, tick_upper, amount, data)
            .map_err(|err| err.into_host_error(env))
    }

    fn positions(
        &self,
        env: &Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<PositionInfo, HostError> {
        DexPool::positions(self, env, owner, tick_lower, tick_upper)
            .map_err(|err| err.into_host_error(env))
    }

    fn slot0(&self, env: &Env) -> Result<Slot0, HostError> {
        DexPool::slot0(self, env).map_err(|err| err.into_host_error(env))
    }

    fn liquidity(&self, env: &Env) -> Result<u128, HostError> {
        DexPool::liquidity(self, env).map_err(|err| err.into_host_error(env))
    }

    fn token0(&self, env: &Env) -> Result<Address, HostError> {
        self.config(env)
            .map(|config| config.token0)
            .map_err(|err| err.into_host_error(env))
    }

    fn token1(&self, env: &Env) -> Result<Address, HostError> {
        self.config(env)
            .map(|config| config.token1)
            .map_err(|err| err.into_host_error(env))
    }

    fn fee(&self, env: &Env) -> Result<u32, HostError> {
        self.config(env)
            .map(|config| config.fee)
            .map_err(|err| err.into_host_error(env))
    }

    fn tick_spacing(&self, env: &Env) -> Result<i32, HostError> {
        self.config(env)
            .map(|config| config.tick_spacing)
            .map_err(|err| err.into_host_error(env))
    }
}

impl Contract for DexPool {
    fn export(self: Rc<Self>, exports: &mut Exports) {
        exports
            .export::<dyn PoolInterface>(self.clone())
            .export::<DexPool>(self);
    }
}
