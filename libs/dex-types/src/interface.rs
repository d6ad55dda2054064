//! Cross-contract interfaces and their typed clients.
//!
//! Implementations are exported by contracts as trait objects; clients look
//! them up through the host and run every call as a separate invocation, so
//! the callee sees the calling contract as its invoker.

use alloy_primitives::Address;
use dex_env::{Env, HostError};

use crate::{MintCallbackData, PositionInfo, Slot0};

/// Factory that deploys one pool per (token0, token1, fee).
pub trait FactoryInterface {
    fn create_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address, HostError>;

    fn get_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Option<Address>, HostError>;

    /// Tick spacing of an enabled fee tier, 0 when the tier is not enabled.
    fn fee_amount_tick_spacing(&self, env: &Env, fee: u32) -> Result<i32, HostError>;
}

/// The subset of a concentrated-liquidity pool used by liquidity providers.
pub trait PoolInterface {
    /// One-time setup, only accepted from the deploying factory.
    fn configure(
        &self,
        env: &Env,
        factory: Address,
        token0: Address,
        token1: Address,
        fee: u32,
        tick_spacing: i32,
    ) -> Result<(), HostError>;

    fn initialize(&self, env: &Env, sqrt_price_x96: u128) -> Result<(), HostError>;

    /// Adds `amount` liquidity for `recipient`. The invoker is called back
    /// through [`MintCallback`] and must pay the owed amounts before this
    /// returns.
    fn mint(
        &self,
        env: &Env,
        recipient: Address,
        tick_lower: i32,
        tick_upper: i32,
        amount: u128,
        data: MintCallbackData,
    ) -> Result<(u128, u128), HostError>;

    fn positions(
        &self,
        env: &Env,
        owner: Address,
        tick_lower: i32,
        tick_upper: i32,
    ) -> Result<PositionInfo, HostError>;

    fn slot0(&self, env: &Env) -> Result<Slot0, HostError>;
    fn liquidity(&self, env: &Env) -> Result<u128, HostError>;
    fn token0(&self, env: &Env) -> Result<Address, HostError>;
    fn token1(&self, env: &Env) -> Result<Address, HostError>;
    fn fee(&self, env: &Env) -> Result<u32, HostError>;
    fn tick_spacing(&self, env: &Env) -> Result<i32, HostError>;
}

/// Fungible token interface (SEP-41 shaped). Amounts are signed so negative
/// inputs can be rejected explicitly.
pub trait TokenInterface {
    fn allowance(&self, env: &Env, from: Address, spender: Address) -> Result<i128, HostError>;
    fn approve(&self, env: &Env, from: Address, spender: Address, amount: i128)
        -> Result<(), HostError>;
    fn balance(&self, env: &Env, id: Address) -> Result<i128, HostError>;
    fn transfer(&self, env: &Env, from: Address, to: Address, amount: i128)
        -> Result<(), HostError>;
    fn transfer_from(
        &self,
        env: &Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), HostError>;
    fn decimals(&self, env: &Env) -> Result<u32, HostError>;
    fn name(&self, env: &Env) -> Result<String, HostError>;
    fn symbol(&self, env: &Env) -> Result<String, HostError>;
}

/// Implemented by contracts that call [`PoolInterface::mint`].
pub trait MintCallback {
    fn on_liquidity_callback(
        &self,
        env: &Env,
        amount0_owed: u128,
        amount1_owed: u128,
        data: MintCallbackData,
    ) -> Result<(), HostError>;
}

// === Clients ===

pub struct FactoryClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> FactoryClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&dyn FactoryInterface, &Env) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let factory = env.interface::<dyn FactoryInterface>(&self.address)?;
            call(&*factory, env)
        })
    }

    pub fn create_pool(&self, token_a: &Address, token_b: &Address, fee: &u32) -> Result<Address, HostError> {
        self.invoke("create_pool", |factory, env| {
            factory.create_pool(env, *token_a, *token_b, *fee)
        })
    }

    pub fn get_pool(&self, token_a: &Address, token_b: &Address, fee: &u32) -> Result<Option<Address>, HostError> {
        self.invoke("get_pool", |factory, env| {
            factory.get_pool(env, *token_a, *token_b, *fee)
        })
    }

    pub fn fee_amount_tick_spacing(&self, fee: &u32) -> Result<i32, HostError> {
        self.invoke("fee_amount_tick_spacing", |factory, env| {
            factory.fee_amount_tick_spacing(env, *fee)
        })
    }
}

pub struct PoolClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> PoolClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&dyn PoolInterface, &Env) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let pool = env.interface::<dyn PoolInterface>(&self.address)?;
            call(&*pool, env)
        })
    }

    pub fn configure(
        &self,
        factory: &Address,
        token0: &Address,
        token1: &Address,
        fee: &u32,
        tick_spacing: &i32,
    ) -> Result<(), HostError> {
        self.invoke("configure", |pool, env| {
            pool.configure(env, *factory, *token0, *token1, *fee, *tick_spacing)
        })
    }

    pub fn initialize(&self, sqrt_price_x96: &u128) -> Result<(), HostError> {
        self.invoke("initialize", |pool, env| pool.initialize(env, *sqrt_price_x96))
    }

    pub fn mint(
        &self,
        recipient: &Address,
        tick_lower: &i32,
        tick_upper: &i32,
        amount: &u128,
        data: &MintCallbackData,
    ) -> Result<(u128, u128), HostError> {
        self.invoke("mint", |pool, env| {
            pool.mint(env, *recipient, *tick_lower, *tick_upper, *amount, *data)
        })
    }

    pub fn positions(&self, owner: &Address, tick_lower: &i32, tick_upper: &i32) -> Result<PositionInfo, HostError> {
        self.invoke("positions", |pool, env| {
            pool.positions(env, *owner, *tick_lower, *tick_upper)
        })
    }

    pub fn slot0(&self) -> Result<Slot0, HostError> {
        self.invoke("slot0", |pool, env| pool.slot0(env))
    }

    pub fn liquidity(&self) -> Result<u128, HostError> {
        self.invoke("liquidity", |pool, env| pool.liquidity(env))
    }

    pub fn token0(&self) -> Result<Address, HostError> {
        self.invoke("token0", |pool, env| pool.token0(env))
    }

    pub fn token1(&self) -> Result<Address, HostError> {
        self.invoke("token1", |pool, env| pool.token1(env))
    }

    pub fn fee(&self) -> Result<u32, HostError> {
        self.invoke("fee", |pool, env| pool.fee(env))
    }

    pub fn tick_spacing(&self) -> Result<i32, HostError> {
        self.invoke("tick_spacing", |pool, env| pool.tick_spacing(env))
    }
}

pub struct TokenClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> TokenClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&dyn TokenInterface, &Env) -> Result<T, HostError>,
    ) -> Result<T, HostError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let token = env.interface::<dyn TokenInterface>(&self.address)?;
            call(&*token, env)
        })
    }

    pub fn allowance(&self, from: &Address, spender: &Address) -> Result<i128, HostError> {
        self.invoke("allowance", |token, env| token.allowance(env, *from, *spender))
    }

    pub fn approve(&self, from: &Address, spender: &Address, amount: &i128) -> Result<(), HostError> {
        self.invoke("approve", |token, env| {
            token.approve(env, *from, *spender, *amount)
        })
    }

    pub fn balance(&self, id: &Address) -> Result<i128, HostError> {
        self.invoke("balance", |token, env| token.balance(env, *id))
    }

    pub fn transfer(&self, from: &Address, to: &Address, amount: &i128) -> Result<(), HostError> {
        self.invoke("transfer", |token, env| token.transfer(env, *from, *to, *amount))
    }

    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: &i128,
    ) -> Result<(), HostError> {
        self.invoke("transfer_from", |token, env| {
            token.transfer_from(env, *spender, *from, *to, *amount)
        })
    }

    pub fn decimals(&self) -> Result<u32, HostError> {
        self.invoke("decimals", |token, env| token.decimals(env))
    }

    pub fn name(&self) -> Result<String, HostError> {
        self.invoke("name", |token, env| token.name(env))
    }

    pub fn symbol(&self) -> Result<String, HostError> {
        self.invoke("symbol", |token, env| token.symbol(env))
    }
}

pub struct MintCallbackClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> MintCallbackClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    pub fn on_liquidity_callback(
        &self,
        amount0_owed: &u128,
        amount1_owed: &u128,
        data: &MintCallbackData,
    ) -> Result<(), HostError> {
        self.env
            .invoke_contract(&self.address, "on_liquidity_callback", |env| {
                env.interface::<dyn MintCallback>(&self.address)?
                    .on_liquidity_callback(env, *amount0_owed, *amount1_owed, *data)
            })
    }
}
