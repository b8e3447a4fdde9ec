//! Reward Pool - Charms App Entry Point
//!
//! Validates pool spells on Bitcoin using client-side validation.
//!
//! ## What This App Validates
//!
//! - **Initialize**: First header charm, caller becomes operator
//! - **Deposit**: Caller's account charm gains principal, header total grows
//! - **InjectReward**: Operator grows the accumulator in the header charm
//! - **WithdrawAll**: Caller's account charm is spent, coin outputs carry the payout
//! - **TransferOperator**: Operator hands the role to a new identity

use charms_sdk::data::{App, Data, Transaction};

/// Main validation function for pool operations.
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn app_contract(app: &App, tx: &Transaction, x: &Data, w: &Data) -> bool {
    rewardpool_pool::charms::validate_pool_operation(app, tx, x, w)
}

// Use the Charms SDK main macro to generate the entry point
charms_sdk::main!(app_contract);
