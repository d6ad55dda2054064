//! Wrapped base currency used as the reference asset of launch pools.

mod error;
mod storage;

pub use error::TokenError;
pub use storage::TokenMetadata;

use alloy_primitives::Address;
use dex_env::{Contract, ContractError, Env, Exports, HostError};
use dex_types::TokenInterface;
use std::rc::Rc;
use storage::{
    get_admin, get_allowance, get_balance, get_metadata, get_total_supply, is_initialized,
    set_admin, set_allowance, set_balance, set_metadata, set_total_supply,
};

#[derive(Default)]
pub struct WrappedToken;

impl WrappedToken {
    /// Initialize token metadata and the minting admin
    pub fn initialize(
        &self,
        env: &Env,
        admin: Address,
        name: String,
        symbol: String,
        decimals: u32,
    ) -> Result<(), TokenError> {
        if is_initialized(env)? {
            return Err(TokenError::AlreadyInitialized);
        }
        set_admin(env, &admin)?;
        set_metadata(
            env,
            &TokenMetadata {
                name,
                symbol,
                decimals,
            },
        )?;
        Ok(())
    }

    /// Mint new tokens (admin only)
    pub fn mint(&self, env: &Env, to: Address, amount: i128) -> Result<(), TokenError> {
        check_nonnegative(amount)?;
        let admin = get_admin(env)?;
        env.require_auth(&admin)?;

        let balance = get_balance(env, &to)?
            .checked_add(amount)
            .ok_or(TokenError::AmountOverflow)?;
        let supply = get_total_supply(env)?
            .checked_add(amount)
            .ok_or(TokenError::AmountOverflow)?;
        set_balance(env, &to, balance)?;
        set_total_supply(env, supply)?;

        env.events().publish(&["mint"], &(admin, to, amount))?;
        tracing::debug!(%to, amount, supply, "wrapped token minted");
        Ok(())
    }

    pub fn total_supply(&self, env: &Env) -> Result<i128, TokenError> {
        get_total_supply(env)
    }

    pub fn approve(
        &self,
        env: &Env,
        from: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        check_nonnegative(amount)?;
        env.require_auth(&from)?;
        set_allowance(env, &from, &spender, amount)?;
        env.events().publish(&["approve"], &(from, spender, amount))?;
        Ok(())
    }

    pub fn transfer(
        &self,
        env: &Env,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        check_nonnegative(amount)?;
        env.require_auth(&from)?;
        move_balance(env, &from, &to, amount)
    }

    pub fn transfer_from(
        &self,
        env: &Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), TokenError> {
        check_nonnegative(amount)?;
        env.require_auth(&spender)?;

        let allowance = get_allowance(env, &from, &spender)?;
        if allowance < amount {
            return Err(TokenError::InsufficientAllowance);
        }
        set_allowance(env, &from, &spender, allowance - amount)?;
        move_balance(env, &from, &to, amount)
    }
}

fn check_nonnegative(amount: i128) -> Result<(), TokenError> {
    if amount < 0 {
        return Err(TokenError::NegativeAmount);
    }
    Ok(())
}

fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), TokenError> {
    let from_balance = get_balance(env, from)?;
    if from_balance < amount {
        return Err(TokenError::InsufficientBalance);
    }
    set_balance(env, from, from_balance - amount)?;
    let to_balance = get_balance(env, to)?
        .checked_add(amount)
        .ok_or(TokenError::AmountOverflow)?;
    set_balance(env, to, to_balance)?;

    env.events().publish(&["transfer"], &(from, to, amount))?;
    Ok(())
}

impl TokenInterface for WrappedToken {
    fn allowance(&self, env: &Env, from: Address, spender: Address) -> Result<i128, HostError> {
        get_allowance(env, &from, &spender).map_err(|err| err.into_host_error(env))
    }

    fn approve(
        &self,
        env: &Env,
        from: Address,
        spender: Address,
        amount: i128,
    ) -> Result<(), HostError> {
        WrappedToken::approve(self, env, from, spender, amount).map_err(|err| err.into_host_error(env))
    }

    fn balance(&self, env: &Env, id: Address) -> Result<i128, HostError> {
        get_balance(env, &id).map_err(|err| err.into_host_error(env))
    }

    fn transfer(&self, env: &Env, from: Address, to: Address, amount: i128) -> Result<(), HostError> {
        WrappedToken::transfer(self, env, from, to, amount).map_err(|err| err.into_host_error(env))
    }

    fn transfer_from(
        &self,
        env: &Env,
        spender: Address,
        from: Address,
        to: Address,
        amount: i128,
    ) -> Result<(), HostError> {
        WrappedToken::transfer_from(self, env, spender, from, to, amount)
            .map_err(|err| err.into_host_error(env))
    }

    fn decimals(&self, env: &Env) -> Result<u32, HostError> {
        get_metadata(env)
            .map(|metadata| metadata.decimals)
            .map_err(|err| err.into_host_error(env))
    }

    fn name(&self, env: &Env) -> Result<String, HostError> {
        get_metadata(env)
            .map(|metadata| metadata.name)
            .map_err(|err| err.into_host_error(env))
    }

    fn symbol(&self, env: &Env) -> Result<String, HostError> {
        get_metadata(env)
            .map(|metadata| metadata.symbol)
            .map_err(|err| err.into_host_error(env))
    }
}

impl Contract for WrappedToken {
    fn export(self: Rc<Self>, exports: &mut Exports) {
        exports
            .export::<dyn TokenInterface>(self.clone())
            .export::<WrappedToken>(self);
    }
}

/// Client for the admin surface of [`WrappedToken`].
pub struct WrappedTokenClient<'a> {
    env: &'a Env,
    pub address: Address,
}

impl<'a> WrappedTokenClient<'a> {
    pub fn new(env: &'a Env, address: &Address) -> Self {
        Self {
            env,
            address: *address,
        }
    }

    fn invoke<T>(
        &self,
        function: &'static str,
        call: impl FnOnce(&WrappedToken, &Env) -> Result<T, TokenError>,
    ) -> Result<T, TokenError> {
        self.env.invoke_contract(&self.address, function, |env| {
            let token = env.interface::<WrappedToken>(&self.address)?;
            call(&token, env)
        })
    }

    pub fn initialize(
        &self,
        admin: &Address,
        name: &str,
        symbol: &str,
        decimals: &u32,
    ) -> Result<(), TokenError> {
        self.invoke("initialize", |token, env| {
            token.initialize(env, *admin, name.to_string(), symbol.to_string(), *decimals)
        })
    }

    pub fn mint(&self, to: &Address, amount: &i128) -> Result<(), TokenError> {
        self.invoke("mint", |token, env| token.mint(env, *to, *amount))
    }

    pub fn total_supply(&self) -> Result<i128, TokenError> {
        self.invoke("total_supply", |token, env| token.total_supply(env))
    }

    pub fn approve(&self, from: &Address, spender: &Address, amount: &i128) -> Result<(), TokenError> {
        self.invoke("approve", |token, env| token.approve(env, *from, *spender, *amount))
    }

    pub fn transfer(&self, from: &Address, to: &Address, amount: &i128) -> Result<(), TokenError> {
        self.invoke("transfer", |token, env| token.transfer(env, *from, *to, *amount))
    }

    pub fn transfer_from(
        &self,
        spender: &Address,
        from: &Address,
        to: &Address,
        amount: &i128,
    ) -> Result<(), TokenError> {
        self.invoke("transfer_from", |token, env| {
            token.transfer_from(env, *spender, *from, *to, *amount)
        })
    }
}
