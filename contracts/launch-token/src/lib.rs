//! Launch token: a fungible asset that bootstraps its own liquidity pool.
//!
//! The token creates exactly one pool against a reference asset, sets its
//! starting price once, and adds liquidity on behalf of its holders. The pool
//! collects payment through [`MintCallback`], which only the recorded pool
//! may call.

mod config;
mod error;
mod guard;
mod ledger;
mod liquidity;
mod pool_factory;
mod price;
mod storage;

pub use config::{LaunchConfig, MAX_DECIMALS};
pub use error::LaunchError;
pub use storage::{PendingMint, PoolReference, PriceState};

use alloy_primitives::Address;
use dex_env::{Contract, ContractError, Env, Exports, HostError};
use dex_types::{Fee, MintCallback, MintCallbackData, PositionInfo, TokenInterface};
use std::rc::Rc;
use storage::{
    get_admin, get_allowance, get_balance, get_config, get_pool_reference, get_price_state,
    get_total_supply, is_configured, set_admin, set_config,
};

/// Entry points take the invocation context from `env`, so they are meant to
/// run inside a host invocation, normally through [`LaunchTokenClient`].
/// Called outside of one they fail with [`HostError::NotExecuting`].
#[derive(Default)]
pub struct LaunchToken;

impl LaunchToken {
    /// Store the launch parameters and mint the initial supply to `admin`
    pub fn initialize(&self, env: &Env, admin: Address, config: LaunchConfig) -> Result<(), LaunchError> {
        if is_configured(env)? {
            return Err(LaunchError::AlreadyConfigured);
        }
        env.require_auth(&admin)?;
        config.validate()?;

        set_admin(env, &admin)?;
        set_config(env, &config)?;
        ledger::mint(env, &admin, config.initial_supply)?;

        let token = env.current_contract_address()?;
        tracing::info!(
            %token,
            %admin,
            symbol = %config.symbol,
            initial_supply = config.initial_supply,
            "launch token initialized"
        );
        Ok(())
    }

    // === Pool Lifecycle ===

    /// Create the pool for this token and the reference asset (admin only)
    ///
    /// # Returns
    /// The pool address
    pub fn create_pool(&self, env: &Env, fee: Fee) -> Result<Address, LaunchError> {
        pool_factory::create_pool(env, fee).map(|reference| reference.pool)
    }

    /// Initialize the pool price from a Q64.96 sqrt price (admin only)
    pub fn initialize_pool(&self, env: &Env, sqrt_price_x96: u128) -> Result<(), LaunchError> {
        price::initialize_pool(env, sqrt_price_x96).map(|_| ())
    }

    /// Initialize the pool price to `amount1 / amount0` (admin only)
    pub fn initialize_pool_at_price(
        &self,
        env: &Env,
        amount1: u128,
        amount0: u128,
    ) -> Result<(), LaunchError> {
        price::initialize_pool_at_price(env, amount1, amount0).map(|_| ())
    }

    /// Add liquidity owned and paid for by the invoker
    ///
    /// # Returns
    /// (amount0, amount1) - Token amounts deposited
    pub fn mint_liquidity(
        &self,
        env: &Env,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
    ) -> Result<(u128, u128), LaunchError> {
        liquidity::mint_liquidity(env, tick_lower, tick_upper, amount)
    }

    pub fn on_liquidity_callback(
        &self,
        env: &Env,
        amount0_owed: u128,
        amount1_owed: u128,
        data: MintCallbackData,
    ) -> Result<(), LaunchError> {
        liquidity::settle_callback(env, amount0_owed, amount1_owed, data)
    }

    // === Token ===

    pub fn balance(&self, env: &Env, id: Address) -> Result<i128, LaunchError> {
        get_balance(env, &id)
    }

    pub fn allowance(&self, env: &Env, from: Address, spender: Address) -> Result<i128, LaunchError> {
        get_allowance(env, &from, &spender)
    }

    pub fn approve(
        &self,
        env: &Env,
        from: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), LaunchError> {
        ledger::approve(env, &from, &spender, amount)
    }

    pub fn transfer(&self, env: &Env, from: Address, to: Address, amount: i128) -> Result<(), LaunchError> {
        ledger::transfer(env, &from, &to, amount)
    }

    pub fn transfer_from(
        &self,
        env: &Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), LaunchError> {
        ledger::transfer_from(env, &spender, &from, &to, amount)
    }

    pub fn total_supply(&self, env: &Env) -> Result<i128, LaunchError> {
        get_total_supply(env)
    }

    // === View Functions ===

    pub fn get_position(
        &self,
        env: &Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<PositionInfo, LaunchError> {
        liquidity::position(env, owner, tick_lower, tick_upper)
    }

    pub fn pool_address(&self, env: &Env) -> Result<Option<Address>, LaunchError> {
        Ok(get_pool_reference(env)?.map(|reference| reference.pool))
    }

    pub fn pool_reference(&self, env: &Env) -> Result<Option<PoolReference>, LaunchError> {
        get_pool_reference(env)
    }

    pub fn price_state(&self, env: &Env) -> Result<PriceState, LaunchError> {
        get_price_state(env)
    }

    pub fn liquidity_for_amounts(
        &self,
        env: &Env,
        tick_lower: i32,
        tick_upper: i32,
        amount0: u128,
        amount1: u128,
    ) -> Result<u128, LaunchError> {
        liquidity::liquidity_for_amounts(env, tick_lower, tick_upper, amount0, amount1)
    }

    pub fn amounts_for_liquidity(
        &self,
        env: &Env,
        tick_lower: i32,
        tick_upper: i32,
        liquidity: u128,
    ) -> Result<(u128, u128), LaunchError> {
        liquidity::amounts_for_liquidity(env, tick_lower, tick_upper, liquidity)
    }

    pub fn config(&self, env: &Env) -> Result<LaunchConfig, LaunchError> {
        get_config(env)
    }

    pub fn admin(&self, env: &Env) -> Result<Address, LaunchError> {
        get_admin(env)
    }
}

impl TokenInterface for LaunchToken {
    fn allowance(&self, env: &Env, from: Address, spender: Address) -> Result<i128, HostError> {
        LaunchToken::allowance(self, env, from, spender).map_err(|err| err.into_host_error(env))
    }

    fn approve(
        &self,
        env: &Env,
        from: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), HostError> {
        LaunchToken::approve(self, env, from, spender, amount).map_err(|err| err.into_host_error(env))
    }

    fn balance(&self, env: &Env, id: Address) -> Result<i128, HostError> {
        LaunchToken::balance(self, env, id).map_err(|err| err.into_host_error(env))
    }

    fn transfer(&self, env: &Env, from: Address, to: Address, amount: i128) -> Result<(), HostError> {
        LaunchToken::transfer(self, env, from, to, amount).map_err(|err| err.into_host_error(env))
    }

    fn transfer_from(
        &self,
        env: &Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), HostError> {
        LaunchToken::transfer_from(self, env, spender, from, to, amount)
            .map_err(|err| err.into_host_error(env))
    }

    fn decimals(&self, env: &Env) -> Result<u32, HostError> {
        get_config(env)
            .map(|config| config.decimals)
            .map_err(|err| err.into_host_error(env))
    }

    fn name(&self, env: &Env) -> Result<String, HostError> {
        get_config(env)
            .map(|config| config.name)
            .map_err(|err| err.into_host_error(env))
    }

    fn symbol(&self, env: &Env) -> Result<String, HostError> {
        get_config(env)
            .map(|config| config.symbol)
            .map_err(|err| err.into_host_error(env))
    }
}

impl MintCallback for LaunchToken {
    fn on_liquidity_callback(
        &self,
        env: &Env,
        amount0_owed: u128,
        amount1_owed: u128,
        data: MintCallbackData,
    ) -> Result<(), HostError> {
        LaunchToken::on_liquidity_callback(self, env, amount0_owed, amount1_owed, data)
            .map_err(|err| err.into_host_error(env))
    }
}

impl Contract for LaunchToken {
    fn export(self: Rc<Self>, exports: &mut Exports) {
        exports
            .export::<dyn TokenInterface>(self.clone())
            .export::<dyn MintCallback>(self.clone())
            .export::<LaunchToken>(self);
    }
}

/// Client for the full surface of [`LaunchToken`].
pub struct LaunchTokenClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> LaunchTokenClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&LaunchToken, &Env) -> Result<T, LaunchError>,
    ) -> Result<T, LaunchError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let token = env.interface::<LaunchToken>(&self.address)?;
            call(&token, env)
        })
    }

    pub fn initialize(&self, admin: &Address, config: &LaunchConfig) -> Result<(), LaunchError> {
        self.invoke("initialize", |token, env| {
            token.initialize(env, *admin, config.clone())
        })
    }

    pub fn create_pool(&self, fee: &Fee) -> Result<Address, LaunchError> {
        self.invoke("create_pool", |token, env| token.create_pool(env, *fee))
    }

    pub fn initialize_pool(&self, sqrt_price_x96: &u128) -> Result<(), LaunchError> {
        self.invoke("initialize_pool", |token, env| {
            token.initialize_pool(env, *sqrt_price_x96)
        })
    }

    pub fn initialize_pool_at_price(&self, amount1: &u128, amount0: &u128) -> Result<(), LaunchError> {
        self.invoke("initialize_pool_at_price", |token, env| {
            token.initialize_pool_at_price(env, *amount1, *amount0)
        })
    }

    pub fn mint_liquidity(
        &self,
        tick_lower: &i32,
        tick_upper: &i32,
        amount: &u128,
    ) -> Result<(u128, u128), LaunchError> {
        self.invoke("mint_liquidity", |token, env| {
            token.mint_liquidity(env, *tick_lower, *tick_upper, *amount)
        })
    }

    pub fn on_liquidity_callback(
        &self,
        amount0_owed: &u128,
        amount1_owed: &u128,
        data: &MintCallbackData,
    ) -> Result<(), LaunchError> {
        self.invoke("on_liquidity_callback", |token, env| {
            token.on_liquidity_callback(env, *amount0_owed, *amount1_owed, *data)
        })
    }

    pub fn balance(&self, id: &Address) -> Result<i128, LaunchError> {
        self.invoke("balance", |token, env| token.balance(env, *id))
    }

    pub fn allowance(&self, from: &Address, spender: &Address) -> Result<i128, LaunchError> {
        self.invoke("allowance", |token, env| token.allowance(env, *from, *spender))
    }

    pub fn approve(&self, from: &Address, spender: &Address, amount: &i128) -> Result<(), LaunchError> {
        self.invoke("approve", |token, env| token.approve(env, *from, *spender, *amount))
    }

    pub fn transfer(&self, from: &Address, to: &Address, amount: &i128) -> Result<(), LaunchError> {
        self.invoke("transfer", |token, env| token.transfer(env, *from, *to, *amount))
    }

    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: &i128,
    ) -> Result<(), LaunchError> {
        self.invoke("transfer_from", |token, env| {
            token.transfer_from(env, *spender, *from, *to, *amount)
        })
    }

    pub fn total_supply(&self) -> Result<i128, LaunchError> {
        self.invoke("total_supply", |token, env| token.total_supply(env))
    }

    pub fn get_position(
        &self,
        owner: &Address,
        tick_lower: &i32,
        tick_upper: &i32,
    ) -> Result<PositionInfo, LaunchError> {
        self.invoke("get_position", |token, env| {
            token.get_position(env, *owner, *tick_lower, *tick_upper)
        })
    }

    pub fn pool_address(&self) -> Result<Option<Address>, LaunchError> {
        self.invoke("pool_address", |token, env| token.pool_address(env))
    }

    pub fn pool_reference(&self) -> Result<Option<PoolReference>, LaunchError> {
        self.invoke("pool_reference", |token, env| token.pool_reference(env))
    }

    pub fn price_state(&self) -> Result<PriceState, LaunchError> {
        self.invoke("price_state", |token, env| token.price_state(env))
    }

    pub fn liquidity_for_amounts(
        &self,
        tick_lower: &i32,
        tick_upper: &i32,
        amount0: &u128,
        amount1: &u128,
    ) -> Result<u128, LaunchError> {
        self.invoke("liquidity_for_amounts", |token, env| {
            token.liquidity_for_amounts(env, *tick_lower, *tick_upper, *amount0, *amount1)
        })
    }

    pub fn amounts_for_liquidity(
        &self,
        tick_lower: &i32,
        tick_upper: &i32,
        liquidity: &u128,
    ) -> Result<(u128, u128), LaunchError> {
        self.invoke("amounts_for_liquidity", |token, env| {
            token.amounts_for_liquidity(env, *tick_lower, *tick_upper, *liquidity)
        })
    }

    pub fn config(&self) -> Result<LaunchConfig, LaunchError> {
        self.invoke("config", |token, env| token.config(env))
    }

    pub fn admin(&self) -> Result<Address, LaunchError> {
        self.invoke("admin", |token, env| token.admin(env))
    }
}
