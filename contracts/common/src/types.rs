//! Core Types for the Reward Pool
//!
//! The ledger header, per-depositor accounts and the actions that drive
//! them. Field order of `LedgerState` and `Account` is part of the persisted
//! layout; see `storage` before touching it.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

/// Type alias for depositor / operator identities (32-byte hash)
pub type Address = [u8; 32];

/// The all-zero address, never a valid operator
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Account Types ============

/// Per-depositor record
///
/// Created lazily on first deposit. An account with zero principal and
/// zero accrued rewards is logically absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct Account {
    /// Current stake in base units
    pub principal: u64,
    /// Snapshot of `acc_reward_per_share` at the last settlement
    pub reward_debt: u128,
    /// Settled rewards not yet paid out
    pub accrued_rewards: u64,
}

impl Account {
    /// Fresh account that starts accruing from `acc_reward_per_share`
    pub fn new(acc_reward_per_share: u128) -> Self {
        Self {
            principal: 0,
            reward_debt: acc_reward_per_share,
            accrued_rewards: 0,
        }
    }

    /// True when the account carries no value and can be dropped
    pub fn is_empty(&self) -> bool {
        self.principal == 0 && self.accrued_rewards == 0
    }
}

// ============ Ledger Types ============

/// Global ledger header (singleton)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct LedgerState {
    /// Set once by `initialize`
    pub initialized: bool,
    /// Identity allowed to inject rewards
    pub operator: Address,
    /// Sum of every account's principal
    pub total_principal: u64,
    /// Cumulative reward per unit of principal, scaled by `accumulator::SCALE`
    pub acc_reward_per_share: u128,
    // ===== Appended in schema v2 =====
    /// Lifetime value deposited
    pub total_deposited: u64,
    /// Lifetime value injected as rewards
    pub total_rewards_injected: u64,
    /// Lifetime value paid out by withdrawals
    pub total_paid_out: u64,
}

impl LedgerState {
    /// Header of a freshly initialized pool
    pub fn initialized_by(operator: Address) -> Self {
        Self {
            initialized: true,
            operator,
            ..Self::default()
        }
    }

    /// Value the pool should currently hold
    ///
    /// Principal, accrued and pending rewards, plus truncation dust.
    pub fn custody_balance(&self) -> u64 {
        self.total_deposited
            .saturating_add(self.total_rewards_injected)
            .saturating_sub(self.total_paid_out)
    }
}

/// Read-only summary of the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct PoolStats {
    /// Sum of all principal
    pub total_principal: u64,
    /// Current accumulator value
    pub acc_reward_per_share: u128,
    /// Value held by the pool
    pub custody_balance: u64,
    /// Accounts currently stored
    pub depositor_count: u64,
    /// Lifetime deposits
    pub total_deposited: u64,
    /// Lifetime reward injections
    pub total_rewards_injected: u64,
    /// Lifetime payouts
    pub total_paid_out: u64,
}

// ============ Action Types ============

/// State-changing actions accepted by the pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolAction {
    /// One-time setup; caller becomes operator
    Initialize,
    /// Credit caller's principal
    Deposit { amount: u64 },
    /// Grow the accumulator (operator only)
    InjectReward { amount: u64 },
    /// Pay out principal plus rewards
    WithdrawAll,
    /// Hand the operator role to another identity (operator only)
    TransferOperator { new_operator: Address },
}
