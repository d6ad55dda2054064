//! Reference pool factory: deploys one pool per (token0, token1, fee) at a
//! deterministic address.

mod error;

pub use error::FactoryError;

use alloy_primitives::{Address, B256};
use dex_env::{Contract, ContractError, Env, Exports, HostError};
use dex_types::{FactoryInterface, FeeTier, PoolClient, PoolKey};
use serde::{Deserialize, Serialize};
use std::rc::Rc;

#[derive(Default)]
pub struct DexFactory;

/// Storage keys for Factory contract
#[derive(Clone, Serialize, Deserialize)]
pub enum DataKey {
    /// Admin address
    Admin,
    /// Pool code hash for deployment
    PoolCodeHash,
    /// Fee tier -> tick spacing mapping
    FeeTickSpacing(u32),
    /// (token0, token1, fee) -> pool address
    Pool(PoolKey),
    /// Total number of pools created
    PoolCount,
    /// Pool address at index
    PoolAt(u32),
}

/// Largest tick spacing a fee tier may use
const MAX_TICK_SPACING: i32 = 16384;

/// Fees are in hundredths of a basis point and must stay below 100%
const MAX_FEE: u32 = 1_000_000;

impl DexFactory {
    /// Initialize factory with admin and pool code hash
    pub fn initialize(&self, env: &Env, admin: Address, pool_code_hash: B256) -> Result<(), FactoryError> {
        if env.storage().instance().has(&DataKey::Admin)? {
            return Err(FactoryError::AlreadyInitialized);
        }

        env.require_auth(&admin)?;

        env.storage().instance().set(&DataKey::Admin, &admin)?;
        env.storage()
            .instance()
            .set(&DataKey::PoolCodeHash, &pool_code_hash)?;

        // Default fee tiers
        for tier in FeeTier::ALL {
            env.storage()
                .instance()
                .set(&DataKey::FeeTickSpacing(tier.fee()), &tier.tick_spacing())?;
        }

        env.storage().instance().set(&DataKey::PoolCount, &0u32)?;
        Ok(())
    }

    /// Create a new pool for token pair with specified fee
    /// Returns the pool contract address
    pub fn create_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address, FactoryError> {
        if token_a == token_b {
            return Err(FactoryError::IdenticalTokens);
        }
        let key = PoolKey::new(token_a, token_b, fee);

        let pool_key = DataKey::Pool(key);
        if env.storage().persistent().has(&pool_key)? {
            return Err(FactoryError::PoolExists);
        }

        let tick_spacing = self.fee_amount_tick_spacing(env, fee)?;
        if tick_spacing == 0 {
            return Err(FactoryError::FeeNotEnabled);
        }

        let pool_code_hash = self.pool_code_hash(env)?;
        let pool_count = self.pool_count(env)?;

        // Deploy at the address derived from the pool key
        let pool_address = env
            .deployer()
            .with_current_contract(key.salt())?
            .deploy(&pool_code_hash)?;

        PoolClient::new(env, &pool_address).configure(
            &env.current_contract_address()?,
            &key.token0,
            &key.token1,
            &fee,
            &tick_spacing,
        )?;

        env.storage().persistent().set(&pool_key, &pool_address)?;
        env.storage()
            .persistent()
            .set(&DataKey::PoolAt(pool_count), &pool_address)?;
        env.storage()
            .instance()
            .set(&DataKey::PoolCount, &(pool_count + 1))?;

        env.events().publish(
            &["pool_created"],
            &(key.token0, key.token1, fee, tick_spacing, pool_address),
        )?;
        tracing::info!(token0 = %key.token0, token1 = %key.token1, fee, pool = %pool_address, "pool created");

        Ok(pool_address)
    }

    /// Get pool address for token pair and fee
    pub fn get_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Option<Address>, FactoryError> {
        let key = PoolKey::new(token_a, token_b, fee);
        Ok(env.storage().persistent().get(&DataKey::Pool(key))?)
    }

    /// Enable a new fee tier
    pub fn enable_fee_amount(&self, env: &Env, fee: u32, tick_spacing: i32) -> Result<(), FactoryError> {
        let admin = self.admin(env)?;
        env.require_auth(&admin)?;

        if tick_spacing <= 0 || tick_spacing > MAX_TICK_SPACING {
            return Err(FactoryError::InvalidTickSpacing);
        }
        if fee >= MAX_FEE {
            return Err(FactoryError::FeeTooHigh);
        }

        // Check not already set
        let key = DataKey::FeeTickSpacing(fee);
        if env.storage().instance().has(&key)? {
            return Err(FactoryError::FeeAlreadyEnabled);
        }

        env.storage().instance().set(&key, &tick_spacing)?;
        env.events()
            .publish(&["fee_amount_enabled"], &(fee, tick_spacing))?;
        Ok(())
    }

    /// Get tick spacing for fee tier, 0 if not enabled
    pub fn fee_amount_tick_spacing(&self, env: &Env, fee: u32) -> Result<i32, FactoryError> {
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::FeeTickSpacing(fee))?
            .unwrap_or(0))
    }

    /// Get total number of pools created
    pub fn pool_count(&self, env: &Env) -> Result<u32, FactoryError> {
        Ok(env
            .storage()
            .instance()
            .get(&DataKey::PoolCount)?
            .unwrap_or(0))
    }

    /// Get pool address at specific index
    pub fn pool_at(&self, env: &Env, index: u32) -> Result<Option<Address>, FactoryError> {
        Ok(env.storage().persistent().get(&DataKey::PoolAt(index))?)
    }

    pub fn admin(&self, env: &Env) -> Result<Address, FactoryError> {
        env.storage()
            .instance()
            .get(&DataKey::Admin)?
            .ok_or(FactoryError::NotInitialized)
    }

    pub fn pool_code_hash(&self, env: &Env) -> Result<B256, FactoryError> {
        env.storage()
            .instance()
            .get(&DataKey::PoolCodeHash)?
            .ok_or(FactoryError::NotInitialized)
    }
}

impl FactoryInterface for DexFactory {
    fn create_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Address, HostError> {
        DexFactory::create_pool(self, env, token_a, token_b, fee).map_err(|err| err.into_host_error(env))
    }

    fn get_pool(
        &self,
        env: &Env,
        token_a: Address,
        token_b: Address,
        fee: u32,
    ) -> Result<Option<Address>, HostError> {
        DexFactory::get_pool(self, env, token_a, token_b, fee).map_err(|err| err.into_host_error(env))
    }

    fn fee_amount_tick_spacing(&self, env: &Env, fee: u32) -> Result<i32, HostError> {
        DexFactory::fee_amount_tick_spacing(self, env, fee).map_err(|err| err.into_host_error(env))
    }
}

impl Contract for DexFactory {
    fn export(self: Rc<Self>, exports: &mut Exports) {
        exports
            .export::<dyn FactoryInterface>(self.clone())
            .export::<DexFactory>(self);
    }
}

/// Client for the admin and enumeration surface of [`DexFactory`].
pub struct DexFactoryClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> DexFactoryClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&DexFactory, &Env) -> Result<T, FactoryError>,
    ) -> Result<T, FactoryError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let factory = env.interface::<DexFactory>(&self.address)?;
            call(&factory, env)
        })
    }

    pub fn initialize(&self, admin: &Address, pool_code_hash: &B256) -> Result<(), FactoryError> {
        self.invoke("initialize", |factory, env| {
            factory.initialize(env, *admin, *pool_code_hash)
        })
    }

    pub fn create_pool(&self, token_a: &Address, token_b: &Address, fee: &u32) -> Result<Address, FactoryError> {
        self.invoke("create_pool", |factory, env| {
            factory.create_pool(env, *token_a, *token_b, *fee)
        })
    }

    pub fn get_pool(&self, token_a: &Address, token_b: &Address, fee: &u32) -> Result<Option<Address>, FactoryError> {
        self.invoke("get_pool", |factory, env| {
            factory.get_pool(env, *token_a, *token_b, *fee)
        })
    }

    pub fn enable_fee_amount(&self, fee: &u32, tick_spacing: &i32) -> Result<(), FactoryError> {
        self.invoke("enable_fee_amount", |factory, env| {
            factory.enable_fee_amount(env, *fee, *tick_spacing)
        })
    }

    pub fn fee_amount_tick_spacing(&self, fee: &u32) -> Result<i32, FactoryError> {
        self.invoke("fee_amount_tick_spacing", |factory, env| {
            factory.fee_amount_tick_spacing(env, *fee)
        })
    }

    pub fn pool_count(&self) -> Result<u32, FactoryError> {
        self.invoke("pool_count", |factory, env| factory.pool_count(env))
    }

    pub fn pool_at(&self, index: &u32) -> Result<Option<Address>, FactoryError> {
        self.invoke("pool_at", |factory, env| factory.pool_at(env, *index))
    }

    pub fn admin(&self) -> Result<Address, FactoryError> {
        self.invoke("admin", |factory, env| factory.admin(env))
    }
}
