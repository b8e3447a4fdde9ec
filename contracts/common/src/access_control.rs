//! Access Control Module
//!
//! A single privileged role: the operator. It may inject rewards, hand the
//! role to another identity and clear logic upgrades. Authentication of
//! the caller happens outside this crate; here an identity is just an
//! `Address` compared for equality.

use crate::errors::{PoolError, PoolResult};
use crate::types::{Address, LedgerState, ZERO_ADDRESS};

/// Operator-gated capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    /// Grow the reward accumulator
    InjectReward,
    /// Replace the operator
    TransferOperator,
    /// Approve a logic upgrade
    AuthorizeUpgrade,
}

impl Permission {
    /// Every gated capability
    pub const ALL: [Permission; 3] = [
        Permission::InjectReward,
        Permission::TransferOperator,
        Permission::AuthorizeUpgrade,
    ];
}

/// Fail with `Unauthorized` unless `caller` is the operator
pub fn ensure_operator(operator: &Address, caller: &Address) -> PoolResult<()> {
    if operator != caller {
        return Err(PoolError::Unauthorized {
            expected: *operator,
            actual: *caller,
        });
    }
    Ok(())
}

/// Check `caller` may exercise `permission` on an initialized ledger
pub fn has_permission(state: &LedgerState, caller: &Address, permission: Permission) -> PoolResult<()> {
    if !state.initialized {
        return Err(PoolError::NotInitialized);
    }
    // Every permission currently maps to the operator
    match permission {
        Permission::InjectReward | Permission::TransferOperator | Permission::AuthorizeUpgrade => {
            ensure_operator(&state.operator, caller)
        }
    }
}

/// Reject identities that can never act as operator
pub fn validate_new_operator(new_operator: &Address) -> PoolResult<()> {
    if *new_operator == ZERO_ADDRESS {
        return Err(PoolError::InvalidAddress {
            reason: "operator cannot be the zero address",
        });
    }
    Ok(())
}
