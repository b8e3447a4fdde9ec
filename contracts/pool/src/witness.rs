//! Spell Witness and Transition Check
//!
//! A spell that touches the pool carries a `PoolWitness` naming the action
//! and the caller. The proposed outputs are accepted only if re-executing
//! the action against the inputs yields exactly those outputs.
//!
//! ```text
//! Deposit:
//!   IN:  [pool header, caller account (if any), coins >= amount]
//!   OUT: [pool header (updated), caller account (updated)]
//!
//! InjectReward / TransferOperator:
//!   IN:  [pool header, operator charm, coins >= amount (inject)]
//!   OUT: [pool header (updated), operator charm (current operator)]
//!
//! WithdrawAll:
//!   IN:  [pool header, caller account]
//!   OUT: [pool header (updated), coin output >= payout]
//! ```
//!
//! The operator role is itself a charm. Spending it is what proves the
//! caller holds the role; the engine then checks it against the header.
//!
//! Kept free of the Charms SDK so spell tooling and tests can build and
//! check witnesses without it.

use serde::{Deserialize, Serialize};

use rewardpool_common::{
    errors::{PoolError, PoolResult},
    types::{Account, Address, LedgerState, PoolAction},
};

use crate::{NativeBalances, Pool};

// ============ Operation Codes ============

/// Operation codes for pool actions (encoded in witness)
pub mod op {
    /// Initialize the pool (first-time creation)
    pub const INITIALIZE: u8 = 0x00;
    /// Deposit native value
    pub const DEPOSIT: u8 = 0x10;
    /// Inject rewards (operator only)
    pub const INJECT_REWARD: u8 = 0x11;
    /// Withdraw principal and rewards
    pub const WITHDRAW_ALL: u8 = 0x12;
    /// Replace the operator (operator only)
    pub const TRANSFER_OPERATOR: u8 = 0x13;
}

// ============ Witness Structures ============

/// Witness data for pool operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolWitness {
    /// Operation type (see `op` module)
    pub op: u8,
    /// Identity the action runs as
    pub caller: Address,
    /// Amount for deposit/inject operations
    pub amount: Option<u64>,
    /// Target for operator transfer
    pub new_operator: Option<Address>,
}

impl PoolWitness {
    fn new(op: u8, caller: Address) -> Self {
        Self {
            op,
            caller,
            amount: None,
            new_operator: None,
        }
    }

    pub fn initialize(caller: Address) -> Self {
        Self::new(op::INITIALIZE, caller)
    }

    pub fn deposit(caller: Address, amount: u64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::new(op::DEPOSIT, caller)
        }
    }

    pub fn inject_reward(caller: Address, amount: u64) -> Self {
        Self {
            amount: Some(amount),
            ..Self::new(op::INJECT_REWARD, caller)
        }
    }

    pub fn withdraw_all(caller: Address) -> Self {
        Self::new(op::WITHDRAW_ALL, caller)
    }

    pub fn transfer_operator(caller: Address, new_operator: Address) -> Self {
        Self {
            new_operator: Some(new_operator),
            ..Self::new(op::TRANSFER_OPERATOR, caller)
        }
    }

    /// Convert to internal action type
    ///
    /// `None` for unknown op codes or missing parameters.
    pub fn to_action(&self) -> Option<PoolAction> {
        match self.op {
            op::INITIALIZE => Some(PoolAction::Initialize),
            op::DEPOSIT => Some(PoolAction::Deposit { amount: self.amount? }),
            op::INJECT_REWARD => Some(PoolAction::InjectReward { amount: self.amount? }),
            op::WITHDRAW_ALL => Some(PoolAction::WithdrawAll),
            op::TRANSFER_OPERATOR => Some(PoolAction::TransferOperator {
                new_operator: self.new_operator?,
            }),
            _ => None,
        }
    }
}

// ============ Charm Structures ============

/// Per-depositor charm: the account plus its owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountCharm {
    pub owner: Address,
    pub account: Account,
}

/// Operator capability charm
///
/// Created by `Initialize`, re-created for the new holder by
/// `TransferOperator`, and spent by every operator action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OperatorCharm {
    pub operator: Address,
}

/// Any charm the pool app recognizes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PoolCharm {
    Header(LedgerState),
    Account(AccountCharm),
    Operator(OperatorCharm),
}

// ============ Transition Check ============

/// Pool charms on one side of a spell, at most one of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolCharms {
    pub state: Option<LedgerState>,
    pub account: Option<AccountCharm>,
    pub operator: Option<OperatorCharm>,
}

impl PoolCharms {
    /// Gather the pool charms of one side
    ///
    /// `None` items stand for app data that is not a pool charm.
    ///
    /// # Errors
    /// `InvalidStateTransition` on unrecognized data or a repeated kind.
    pub fn collect<I>(charms: I) -> PoolResult<Self>
    where
        I: IntoIterator<Item = Option<PoolCharm>>,
    {
        let mut out = Self::default();
        for charm in charms {
            let taken = match charm.ok_or(PoolError::InvalidStateTransition)? {
                PoolCharm::Header(state) => out.state.replace(state).is_some(),
                PoolCharm::Account(account) => out.account.replace(account).is_some(),
                PoolCharm::Operator(operator) => out.operator.replace(operator).is_some(),
            };
            if taken {
                return Err(PoolError::InvalidStateTransition);
            }
        }
        Ok(out)
    }
}

/// Pool-relevant contents of a spell's inputs
#[derive(Debug, Clone, Default)]
pub struct TransitionInputs {
    /// Header, caller account and operator charm being spent
    pub charms: PoolCharms,
    /// Native value entering through coin inputs
    pub coin_in_total: u64,
}

/// Pool-relevant contents of a spell's outputs
#[derive(Debug, Clone, Default)]
pub struct TransitionOutputs {
    /// Proposed header, caller account (absent when drained) and operator charm
    pub charms: PoolCharms,
    /// Native value leaving through coin outputs
    pub coin_out_total: u64,
}

/// Accept the proposed outputs only if they match a re-execution
///
/// # Errors
/// Whatever the action itself fails with, `InvalidStateTransition` on any
/// mismatch, `InsufficientFunds` when coins do not pay for a credit,
/// `TransferFailed` when coin outputs do not cover a payout.
pub fn verify_transition(
    witness: &PoolWitness,
    inputs: &TransitionInputs,
    outputs: &TransitionOutputs,
) -> PoolResult<()> {
    // 1. Decode action
    let action = witness.to_action().ok_or(PoolError::InvalidStateTransition)?;
    let caller = witness.caller;
    let spent = &inputs.charms;

    // 2. Input account must belong to the caller
    if let Some(charm) = &spent.account {
        if charm.owner != caller {
            return Err(PoolError::InvalidStateTransition);
        }
    }

    // 3. Operator actions must spend the operator charm of the caller
    let operator_action = matches!(
        action,
        PoolAction::InjectReward { .. } | PoolAction::TransferOperator { .. }
    );
    if operator_action {
        let charm = spent.operator.ok_or(PoolError::InvalidStateTransition)?;
        if charm.operator != caller {
            return Err(PoolError::Unauthorized {
                expected: charm.operator,
                actual: caller,
            });
        }
    }

    // 4. Credited value must be paid for by coins
    if let PoolAction::Deposit { amount } | PoolAction::InjectReward { amount } = action {
        let available = inputs.coin_in_total.saturating_sub(outputs.coin_out_total);
        if available < amount {
            return Err(PoolError::InsufficientFunds { available, requested: amount });
        }
    }

    // 5. Rebuild the touched slice of the pool
    let mut pool = match spent.state {
        Some(state) => Pool::from_parts(state, spent.account.map(|c| (c.owner, c.account))),
        None => Pool::new(),
    };

    // 6. Re-execute
    let mut paid = NativeBalances::new();
    pool.execute(&caller, &action, &mut paid)?;

    // 7. Header must match
    let created = &outputs.charms;
    if created.state.as_ref() != Some(pool.state()) {
        return Err(PoolError::InvalidStateTransition);
    }

    // 8. Caller account must match (absent when removed)
    let expected = pool.account(&caller).map(|account| AccountCharm { owner: caller, account: *account });
    if created.account != expected {
        return Err(PoolError::InvalidStateTransition);
    }

    // 9. Operator charm follows the role, or passes through untouched
    let expected_operator = match action {
        PoolAction::Initialize | PoolAction::InjectReward { .. } | PoolAction::TransferOperator { .. } => {
            Some(OperatorCharm { operator: pool.operator() })
        }
        PoolAction::Deposit { .. } | PoolAction::WithdrawAll => spent.operator,
    };
    if created.operator != expected_operator {
        return Err(PoolError::InvalidStateTransition);
    }

    // 10. Payout must actually leave
    let payout = paid.total_paid();
    if payout > outputs.coin_out_total {
        return Err(PoolError::TransferFailed { to: caller, amount: payout });
    }

    Ok(())
}
