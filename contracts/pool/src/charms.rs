//! Charms SDK Integration for the Reward Pool
//!
//! Bridges Charms transactions to the pool engine. The pool header lives in
//! one charm, each depositor's account in its own charm, and the operator
//! role in an operator charm. A spell is valid when re-executing the
//! witnessed action against the spent charms produces exactly the created
//! charms, and the coins moved pay for what the action credits or pays out.

use charms_data::{App, Data, Transaction};
use rewardpool_common::types::LedgerState;

use crate::witness::{
    verify_transition, AccountCharm, OperatorCharm, PoolCharm, PoolCharms, PoolWitness,
    TransitionInputs, TransitionOutputs,
};

// ============ Main Validation Function ============

/// Validates a pool operation within a Charms transaction.
///
/// # Arguments
/// * `app` - The pool app definition
/// * `tx` - The transaction being validated
/// * `_x` - Public inputs (unused)
/// * `w` - Witness data (`PoolWitness`)
///
/// # Returns
/// `true` if the operation is valid, `false` otherwise
pub fn validate_pool_operation(app: &App, tx: &Transaction, _x: &Data, w: &Data) -> bool {
    // 1. Parse witness
    let witness = match parse_witness(w) {
        Some(w) => w,
        None => return false,
    };

    // 2. Collect spent pool charms, at most one of each kind
    let spent = PoolCharms::collect(
        tx.ins.iter().filter_map(|(_, charms)| charms.get(app)).map(parse_pool_charm),
    );
    let spent = match spent {
        Ok(c) => c,
        Err(_) => return false,
    };

    // 3. Collect created pool charms, at most one of each kind
    let created = PoolCharms::collect(
        tx.outs.iter().filter_map(|charms| charms.get(app)).map(parse_pool_charm),
    );
    let created = match created {
        Ok(c) => c,
        Err(_) => return false,
    };

    // 4. Calculate coin flows
    let (coin_in_total, coin_out_total) = calculate_coin_flows(tx);

    // 5. Re-execute and compare
    let inputs = TransitionInputs { charms: spent, coin_in_total };
    let outputs = TransitionOutputs { charms: created, coin_out_total };
    verify_transition(&witness, &inputs, &outputs).is_ok()
}

// ============ Parsing Functions ============

/// Parse witness data into PoolWitness
fn parse_witness(w: &Data) -> Option<PoolWitness> {
    w.value::<PoolWitness>().ok()
}

/// Classify app data; the header is tried first since it is the widest shape
fn parse_pool_charm(data: &Data) -> Option<PoolCharm> {
    if let Ok(state) = data.value::<LedgerState>() {
        return Some(PoolCharm::Header(state));
    }
    if let Ok(account) = data.value::<AccountCharm>() {
        return Some(PoolCharm::Account(account));
    }
    if let Ok(operator) = data.value::<OperatorCharm>() {
        return Some(PoolCharm::Operator(operator));
    }
    None
}

// ============ Flow Calculations ============

/// Total native value entering and leaving the transaction
fn calculate_coin_flows(tx: &Transaction) -> (u64, u64) {
    let inputs = tx.coin_ins
        .as_ref()
        .map(|ins| ins.iter().fold(0u64, |acc, o| acc.saturating_add(o.amount)))
        .unwrap_or(0);

    let outputs = tx.coin_outs
        .as_ref()
        .map(|outs| outs.iter().fold(0u64, |acc, o| acc.saturating_add(o.amount)))
        .unwrap_or(0);

    (inputs, outputs)
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use crate::witness::op;
    use rewardpool_common::types::Account;

    #[test]
    fn test_witness_serialization() {
        let witness = PoolWitness::deposit([2u8; 32], 1_00000000);
        let data = Data::from(&witness);
        let parsed = parse_witness(&data).unwrap();

        assert_eq!(parsed.op, op::DEPOSIT);
        assert_eq!(parsed.amount, Some(1_00000000));
        assert_eq!(parsed.caller, [2u8; 32]);
    }

    #[test]
    fn test_header_and_account_charms_are_distinct() {
        let header = Data::from(&LedgerState::initialized_by([1u8; 32]));
        let account = Data::from(&AccountCharm {
            owner: [2u8; 32],
            account: Account { principal: 5, reward_debt: 0, accrued_rewards: 0 },
        });

        assert!(header.value::<LedgerState>().is_ok());
        assert!(header.value::<AccountCharm>().is_err());
        assert!(account.value::<AccountCharm>().is_ok());
        assert!(account.value::<LedgerState>().is_err());
    }

    #[test]
    fn test_parse_pool_charm_kinds() {
        let operator = OperatorCharm { operator: [1u8; 32] };
        let header = LedgerState::initialized_by([1u8; 32]);

        assert_eq!(
            parse_pool_charm(&Data::from(&operator)),
            Some(PoolCharm::Operator(operator))
        );
        assert_eq!(parse_pool_charm(&Data::from(&header)), Some(PoolCharm::Header(header)));
        assert_eq!(parse_pool_charm(&Data::from(&7u64)), None);
    }
}
