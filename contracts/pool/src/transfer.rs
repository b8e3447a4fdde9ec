//! Value Transfer Boundary
//!
//! The pool never moves value itself. A withdrawal commits every ledger
//! change first and then hands the payout to a `ValueTransfer`. The
//! recipient side gets `&mut Pool` and may call back into it.

use std::collections::BTreeMap;

use rewardpool_common::types::Address;

use crate::Pool;

/// Recipient refused the payment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRejected {
    pub reason: &'static str,
}

/// Outbound value transfer
pub trait ValueTransfer {
    /// Deliver `amount` to `to`
    ///
    /// Called after the pool has already recorded the withdrawal. An error
    /// makes the pool roll the whole withdrawal back, including anything the
    /// recipient did through `pool` during this call.
    fn send(&mut self, pool: &mut Pool, to: &Address, amount: u64) -> Result<(), TransferRejected>;
}

/// In-memory credit table that accepts every payment
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NativeBalances {
    balances: BTreeMap<Address, u64>,
    total_paid: u64,
}

impl NativeBalances {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value received by `who` so far
    pub fn balance_of(&self, who: &Address) -> u64 {
        self.balances.get(who).copied().unwrap_or(0)
    }

    /// Sum of every payment received
    pub fn total_paid(&self) -> u64 {
        self.total_paid
    }
}

impl ValueTransfer for NativeBalances {
    fn send(&mut self, _pool: &mut Pool, to: &Address, amount: u64) -> Result<(), TransferRejected> {
        let overflow = TransferRejected { reason: "recipient balance overflow" };
        let balance = self.balances.entry(*to).or_insert(0);
        let new_balance = balance.checked_add(amount).ok_or(overflow)?;
        let new_total = self.total_paid.checked_add(amount).ok_or(overflow)?;
        *balance = new_balance;
        self.total_paid = new_total;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_balances_credit() {
        let mut pool = Pool::new();
        let mut balances = NativeBalances::new();

        balances.send(&mut pool, &[1u8; 32], 5).unwrap();
        balances.send(&mut pool, &[1u8; 32], 7).unwrap();
        balances.send(&mut pool, &[2u8; 32], 1).unwrap();

        assert_eq!(balances.balance_of(&[1u8; 32]), 12);
        assert_eq!(balances.balance_of(&[3u8; 32]), 0);
        assert_eq!(balances.total_paid(), 13);
    }

    #[test]
    fn test_native_balances_overflow_rejected() {
        let mut pool = Pool::new();
        let mut balances = NativeBalances::new();

        balances.send(&mut pool, &[1u8; 32], u64::MAX).unwrap();
        assert!(balances.send(&mut pool, &[1u8; 32], 1).is_err());
        assert_eq!(balances.balance_of(&[1u8; 32]), u64::MAX);
    }
}
