//! Ledger Accounting
//!
//! Pure state transitions over `LedgerState` and `Account`. Nothing here
//! knows about storage, callers or value transfers; the pool engine wraps
//! these with authorization, journaling and events.
//!
//! ## Accumulator
//!
//! ```text
//! inject:  acc += amount * SCALE / total_principal
//! settle:  accrued += principal * (acc - reward_debt) / SCALE
//!          reward_debt = acc
//! ```
//!
//! Because `settle` runs before every principal change, an account only
//! ever earns on principal it actually held while the accumulator grew.

use crate::errors::{PoolError, PoolResult};
use crate::math::{pending_reward, reward_per_share_delta, safe_add, safe_sub};
use crate::types::{Account, LedgerState};

// ============ Accumulator ============

/// Distribute `amount` across all current principal
///
/// # Errors
/// * `ZeroAmount` - `amount` is zero
/// * `NoStakers` - nothing is staked, so the reward would be unclaimable
pub fn apply_reward(state: &mut LedgerState, amount: u64) -> PoolResult<u128> {
    // 1. Amount must be positive
    if amount == 0 {
        return Err(PoolError::ZeroAmount);
    }

    // 2. Someone must hold principal
    if state.total_principal == 0 {
        return Err(PoolError::NoStakers);
    }

    // 3. Grow accumulator and lifetime counter together
    let delta = reward_per_share_delta(amount, state.total_principal)?;
    let new_acc = state
        .acc_reward_per_share
        .checked_add(delta)
        .ok_or(PoolError::Overflow)?;
    let new_injected = safe_add(state.total_rewards_injected, amount)?;

    state.acc_reward_per_share = new_acc;
    state.total_rewards_injected = new_injected;

    Ok(new_acc)
}

// ============ Settlement ============

/// Fold pending rewards into `accrued_rewards` and re-snapshot the accumulator
///
/// Returns the amount that was pending.
pub fn settle(account: &mut Account, acc_reward_per_share: u128) -> PoolResult<u64> {
    let pending = pending_reward(account.principal, account.reward_debt, acc_reward_per_share)?;
    account.accrued_rewards = safe_add(account.accrued_rewards, pending)?;
    account.reward_debt = acc_reward_per_share;
    Ok(pending)
}

/// Rewards the account would hold after settling, without mutating it
pub fn preview_rewards(account: &Account, acc_reward_per_share: u128) -> PoolResult<u64> {
    let pending = pending_reward(account.principal, account.reward_debt, acc_reward_per_share)?;
    safe_add(account.accrued_rewards, pending)
}

// ============ Principal Changes ============

/// Credit `amount` of principal to a settled account
pub fn apply_deposit(state: &mut LedgerState, account: &mut Account, amount: u64) -> PoolResult<()> {
    if amount == 0 {
        return Err(PoolError::ZeroAmount);
    }

    settle(account, state.acc_reward_per_share)?;

    let new_principal = safe_add(account.principal, amount)?;
    let new_total = safe_add(state.total_principal, amount)?;
    let new_deposited = safe_add(state.total_deposited, amount)?;

    account.principal = new_principal;
    state.total_principal = new_total;
    state.total_deposited = new_deposited;
    Ok(())
}

/// Settle and drain the account, returning `(principal, rewards)`
///
/// On success the account is zeroed and the ledger no longer counts its
/// principal. On error neither argument is modified.
pub fn apply_withdraw_all(state: &mut LedgerState, account: &mut Account) -> PoolResult<(u64, u64)> {
    let mut settled = *account;
    settle(&mut settled, state.acc_reward_per_share)?;

    let principal = settled.principal;
    let rewards = settled.accrued_rewards;
    let payout = safe_add(principal, rewards)?;
    if payout == 0 {
        return Err(PoolError::NothingToWithdraw);
    }

    let new_total = safe_sub(state.total_principal, principal)?;
    let new_paid_out = safe_add(state.total_paid_out, payout)?;

    state.total_principal = new_total;
    state.total_paid_out = new_paid_out;
    *account = Account::new(state.acc_reward_per_share);

    Ok((principal, rewards))
}
