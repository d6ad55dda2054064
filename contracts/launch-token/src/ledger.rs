//! Bookkeeping for the launch asset itself.

use alloy_primitives::Address;
use dex_env::Env;

use crate::storage::{
    get_allowance, get_balance, get_total_supply, set_allowance, set_balance, set_total_supply,
};
use crate::LaunchError;

/// Credits newly created supply to `to`.
pub fn mint(env: &Env, to: &Address, amount: i128) -> Result<(), LaunchError> {
    check_nonnegative(amount)?;
    let balance = get_balance(env, to)?
        .checked_add(amount)
        .ok_or(LaunchError::AmountOverflow)?;
    let supply = get_total_supply(env)?
        .checked_add(amount)
        .ok_or(LaunchError::AmountOverflow)?;
    set_balance(env, to, balance)?;
    set_total_supply(env, supply)?;

    env.events().publish(&["mint"], &(to, amount))?;
    Ok(())
}

pub fn approve(env: &Env, from: &Address, spender: &Address, amount: i128) -> Result<(), LaunchError> {
    check_nonnegative(amount)?;
    env.require_auth(from)?;
    set_allowance(env, from, spender, amount)?;
    env.events().publish(&["approve"], &(from, spender, amount))?;
    Ok(())
}

pub fn transfer(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), LaunchError> {
    check_nonnegative(amount)?;
    env.require_auth(from)?;
    move_balance(env, from, to, amount)
}

pub fn transfer_from(
    env: &Env,
    spender: &Address,
    from: &Address,
    to: &Address,
    amount: i128,
) -> Result<(), LaunchError> {
    check_nonnegative(amount)?;
    env.require_auth(spender)?;

    let allowance = get_allowance(env, from, spender)?;
    if allowance < amount {
        return Err(LaunchError::InsufficientAllowance);
    }
    set_allowance(env, from, spender, allowance - amount)?;
    move_balance(env, from, to, amount)
}

/// Moves `amount` from `from` to `to` without any authorization check.
/// Callers are responsible for having authorized the movement.
pub fn move_balance(env: &Env, from: &Address, to: &Address, amount: i128) -> Result<(), LaunchError> {
    check_nonnegative(amount)?;
    let from_balance = get_balance(env, from)?;
    if from_balance < amount {
        return Err(LaunchError::InsufficientBalance);
    }
    set_balance(env, from, from_balance - amount)?;
    let to_balance = get_balance(env, to)?
        .checked_add(amount)
        .ok_or(LaunchError::AmountOverflow)?;
    set_balance(env, to, to_balance)?;

    env.events().publish(&["transfer"], &(from, to, amount))?;
    Ok(())
}

fn check_nonnegative(amount: i128) -> Result<(), LaunchError> {
    if amount < 0 {
        return Err(LaunchError::NegativeAmount);
    }
    Ok(())
}
