//! Mathematical Utilities for the Reward Pool
//!
//! Checked arithmetic and the two fixed-point formulas of the accumulator.
//! Every division truncates, so dust always stays with the pool.

use crate::constants::accumulator::SCALE;
use crate::errors::{PoolError, PoolResult};

/// Accumulator growth for one reward injection
///
/// delta = amount * SCALE / total_principal
///
/// # Errors
/// `DivisionByZero` when `total_principal` is zero.
pub fn reward_per_share_delta(amount: u64, total_principal: u64) -> PoolResult<u128> {
    (amount as u128)
        .checked_mul(SCALE)
        .ok_or(PoolError::Overflow)?
        .checked_div(total_principal as u128)
        .ok_or(PoolError::DivisionByZero)
}

/// Reward owed to `principal` for accumulator growth since `reward_debt`
///
/// pending = principal * (acc_reward_per_share - reward_debt) / SCALE
///
/// # Arguments
/// * `principal` - Stake held while the accumulator grew
/// * `reward_debt` - Accumulator snapshot at last settlement
/// * `acc_reward_per_share` - Current accumulator
///
/// # Returns
/// Pending reward in base units
pub fn pending_reward(principal: u64, reward_debt: u128, acc_reward_per_share: u128) -> PoolResult<u64> {
    let growth = acc_reward_per_share
        .checked_sub(reward_debt)
        .ok_or(PoolError::Underflow)?;

    let pending = (principal as u128)
        .checked_mul(growth)
        .ok_or(PoolError::Overflow)?
        / SCALE;

    u64::try_from(pending).map_err(|_| PoolError::Overflow)
}

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_add(b).ok_or(PoolError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> PoolResult<u64> {
    a.checked_sub(b).ok_or(PoolError::Underflow)
}
