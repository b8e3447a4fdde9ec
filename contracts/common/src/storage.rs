//! Versioned Storage Layout
//!
//! The pool's persisted state is one record:
//!
//! ```text
//! [schema: u16 LE][sha256(payload): 32 bytes][payload: borsh]
//! ```
//!
//! Layouts are append-only. A newer schema only adds fields after the
//! existing ones, so a v2 payload starts with the exact bytes of the
//! equivalent v1 payload. Reading an older record runs the migrations in
//! order until it reaches `CURRENT_SCHEMA`.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use sha2::{Digest, Sha256};

use crate::constants::storage::{CURRENT_SCHEMA, ENVELOPE_HEADER_LEN, SCHEMA_V1, SCHEMA_V2};
use crate::errors::{PoolError, PoolResult};
use crate::math::{pending_reward, safe_add};
use crate::types::{Account, Address, LedgerState};

// ============ Record Layouts ============

/// Schema v1: header fields followed by the account mapping
#[derive(Debug, Clone, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub struct LedgerRecordV1 {
    pub initialized: bool,
    pub operator: Address,
    pub total_principal: u64,
    pub acc_reward_per_share: u128,
    /// Sorted by address, no duplicates
    pub accounts: Vec<(Address, Account)>,
}

/// Schema v2: v1 plus the lifetime counters
#[derive(Debug, Clone, PartialEq, Eq, Default, BorshSerialize, BorshDeserialize)]
pub struct LedgerRecordV2 {
    pub base: LedgerRecordV1,
    pub total_deposited: u64,
    pub total_rewards_injected: u64,
    pub total_paid_out: u64,
}

/// Layout written by this logic revision
pub type LedgerRecord = LedgerRecordV2;

impl LedgerRecordV2 {
    /// Build a record from the live header and an address-ordered account walk
    pub fn from_parts<'a, I>(state: &LedgerState, accounts: I) -> Self
    where
        I: IntoIterator<Item = (&'a Address, &'a Account)>,
    {
        Self {
            base: LedgerRecordV1 {
                initialized: state.initialized,
                operator: state.operator,
                total_principal: state.total_principal,
                acc_reward_per_share: state.acc_reward_per_share,
                accounts: accounts.into_iter().map(|(a, acc)| (*a, *acc)).collect(),
            },
            total_deposited: state.total_deposited,
            total_rewards_injected: state.total_rewards_injected,
            total_paid_out: state.total_paid_out,
        }
    }

    /// Split back into header and accounts
    pub fn into_parts(self) -> (LedgerState, Vec<(Address, Account)>) {
        let state = LedgerState {
            initialized: self.base.initialized,
            operator: self.base.operator,
            total_principal: self.base.total_principal,
            acc_reward_per_share: self.base.acc_reward_per_share,
            total_deposited: self.total_deposited,
            total_rewards_injected: self.total_rewards_injected,
            total_paid_out: self.total_paid_out,
        };
        (state, self.base.accounts)
    }
}

// ============ Envelope ============

fn checksum(payload: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(payload);
    let result = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&result);
    out
}

fn seal<T: BorshSerialize>(schema: u16, payload: &T) -> PoolResult<Vec<u8>> {
    let payload = borsh::to_vec(payload).map_err(|_| PoolError::CorruptState {
        reason: "payload encoding failed",
    })?;

    let mut bytes = Vec::with_capacity(ENVELOPE_HEADER_LEN + payload.len());
    bytes.extend_from_slice(&schema.to_le_bytes());
    bytes.extend_from_slice(&checksum(&payload));
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Split an envelope into `(schema, payload)` after verifying the checksum
pub fn open(bytes: &[u8]) -> PoolResult<(u16, &[u8])> {
    if bytes.len() < ENVELOPE_HEADER_LEN {
        return Err(PoolError::CorruptState { reason: "record truncated" });
    }

    let schema = u16::from_le_bytes([bytes[0], bytes[1]]);
    let payload = &bytes[ENVELOPE_HEADER_LEN..];
    if bytes[2..ENVELOPE_HEADER_LEN] != checksum(payload) {
        return Err(PoolError::CorruptState { reason: "checksum mismatch" });
    }

    Ok((schema, payload))
}

/// Encode a record in the current schema
pub fn encode(record: &LedgerRecord) -> PoolResult<Vec<u8>> {
    seal(CURRENT_SCHEMA, record)
}

/// Encode a record in the legacy v1 schema
pub fn encode_v1(record: &LedgerRecordV1) -> PoolResult<Vec<u8>> {
    seal(SCHEMA_V1, record)
}

/// Decode any supported schema and migrate it to the current one
///
/// # Errors
/// * `CorruptState` - truncated input, checksum mismatch or bad payload
/// * `UnsupportedSchema` - schema unknown to this revision
pub fn decode(bytes: &[u8]) -> PoolResult<LedgerRecord> {
    let (schema, payload) = open(bytes)?;

    let record = match schema {
        SCHEMA_V1 => {
            let v1: LedgerRecordV1 = borsh::from_slice(payload).map_err(|_| PoolError::CorruptState {
                reason: "malformed v1 payload",
            })?;
            migrate_v1_to_v2(v1)?
        }
        SCHEMA_V2 => borsh::from_slice(payload).map_err(|_| PoolError::CorruptState {
            reason: "malformed v2 payload",
        })?,
        version => return Err(PoolError::UnsupportedSchema { version }),
    };

    verify(&record)?;
    Ok(record)
}

// ============ Migrations ============

/// Seed the v2 lifetime counters from a v1 record
///
/// Nothing was paid out as far as the record can tell, so custody is
/// reconstructed as everything still owed to depositors.
pub fn migrate_v1_to_v2(v1: LedgerRecordV1) -> PoolResult<LedgerRecordV2> {
    let mut deposited: u64 = 0;
    let mut injected: u64 = 0;

    for (_, account) in &v1.accounts {
        deposited = safe_add(deposited, account.principal)?;
        let pending = pending_reward(account.principal, account.reward_debt, v1.acc_reward_per_share)?;
        injected = safe_add(injected, account.accrued_rewards)?;
        injected = safe_add(injected, pending)?;
    }

    Ok(LedgerRecordV2 {
        base: v1,
        total_deposited: deposited,
        total_rewards_injected: injected,
        total_paid_out: 0,
    })
}

// ============ Validation ============

/// Check the structural invariants a record must satisfy before use
///
/// * no accounts before initialization
/// * accounts strictly ordered by address
/// * no stored account is empty
/// * no snapshot is ahead of the accumulator
/// * `total_principal` equals the sum of account principals
pub fn verify(record: &LedgerRecord) -> PoolResult<()> {
    if !record.base.initialized && !record.base.accounts.is_empty() {
        return Err(PoolError::CorruptState { reason: "accounts before initialization" });
    }

    let mut sum: u64 = 0;
    let mut previous: Option<&Address> = None;

    for (address, account) in &record.base.accounts {
        if let Some(prev) = previous {
            if prev >= address {
                return Err(PoolError::CorruptState { reason: "accounts not strictly ordered" });
            }
        }
        if account.is_empty() {
            return Err(PoolError::CorruptState { reason: "empty account stored" });
        }
        if account.reward_debt > record.base.acc_reward_per_share {
            return Err(PoolError::CorruptState { reason: "reward_debt ahead of accumulator" });
        }
        sum = safe_add(sum, account.principal)?;
        previous = Some(address);
    }

    if sum != record.base.total_principal {
        return Err(PoolError::LedgerInconsistent {
            recorded: record.base.total_principal,
            actual: sum,
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{accumulator::SCALE, token::ONE};

    fn sample_v1() -> LedgerRecordV1 {
        LedgerRecordV1 {
            initialized: true,
            operator: [9u8; 32],
            total_principal: 3 * ONE,
            acc_reward_per_share: SCALE,
            accounts: vec![
                (
                    [1u8; 32],
                    Account { principal: ONE, reward_debt: 0, accrued_rewards: 0 },
                ),
                (
                    [2u8; 32],
                    Account { principal: 2 * ONE, reward_debt: SCALE, accrued_rewards: ONE / 4 },
                ),
            ],
        }
    }

    #[test]
    fn test_v2_payload_extends_v1_payload() {
        let v1 = sample_v1();
        let v2 = LedgerRecordV2 {
            base: v1.clone(),
            total_deposited: 1,
            total_rewards_injected: 2,
            total_paid_out: 3,
        };

        let v1_bytes = borsh::to_vec(&v1).unwrap();
        let v2_bytes = borsh::to_vec(&v2).unwrap();
        assert!(v2_bytes.starts_with(&v1_bytes));
        assert_eq!(v2_bytes.len(), v1_bytes.len() + 24);
    }

    #[test]
    fn test_envelope_header() {
        let record = migrate_v1_to_v2(sample_v1()).unwrap();
        let bytes = encode(&record).unwrap();

        assert_eq!(&bytes[..2], &SCHEMA_V2.to_le_bytes());
        assert_eq!(&bytes[2..ENVELOPE_HEADER_LEN], &checksum(&bytes[ENVELOPE_HEADER_LEN..]));
        assert_eq!(decode(&bytes).unwrap(), record);
    }

    #[test]
    fn test_migrate_v1_seeds_counters() {
        let record = decode(&encode_v1(&sample_v1()).unwrap()).unwrap();

        // Account 1 has 1.0 pending, account 2 has 0.25 accrued
        assert_eq!(record.total_deposited, 3 * ONE);
        assert_eq!(record.total_rewards_injected, ONE + ONE / 4);
        assert_eq!(record.total_paid_out, 0);
        assert_eq!(record.base, sample_v1());
    }

    #[test]
    fn test_checksum_mismatch() {
        let mut bytes = encode_v1(&sample_v1()).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0xFF;

        assert!(matches!(decode(&bytes), Err(PoolError::CorruptState { .. })));
    }

    #[test]
    fn test_truncated_record() {
        assert!(matches!(decode(&[1, 0, 0]), Err(PoolError::CorruptState { .. })));
    }

    #[test]
    fn test_unknown_schema() {
        let bytes = seal(7, &sample_v1()).unwrap();
        assert!(matches!(decode(&bytes), Err(PoolError::UnsupportedSchema { version: 7 })));
    }

    #[test]
    fn test_inconsistent_total_rejected() {
        let mut v1 = sample_v1();
        v1.total_principal += 1;

        let err = decode(&encode_v1(&v1).unwrap()).unwrap_err();
        assert_eq!(
            err,
            PoolError::LedgerInconsistent { recorded: 3 * ONE + 1, actual: 3 * ONE }
        );
    }

    #[test]
    fn test_unordered_accounts_rejected() {
        let mut v1 = sample_v1();
        v1.accounts.reverse();
        assert!(matches!(
            decode(&encode_v1(&v1).unwrap()),
            Err(PoolError::CorruptState { .. })
        ));
    }

    #[test]
    fn test_snapshot_ahead_of_accumulator_rejected() {
        let record = LedgerRecordV2 {
            base: LedgerRecordV1 {
                initialized: true,
                operator: [9u8; 32],
                total_principal: 100,
                acc_reward_per_share: 5,
                accounts: vec![(
                    [1u8; 32],
                    Account { principal: 100, reward_debt: 10, accrued_rewards: 0 },
                )],
            },
            total_deposited: 100,
            total_rewards_injected: 0,
            total_paid_out: 0,
        };

        assert_eq!(
            decode(&encode(&record).unwrap()).unwrap_err(),
            PoolError::CorruptState { reason: "reward_debt ahead of accumulator" }
        );
    }

    #[test]
    fn test_parts_round_trip() {
        let record = migrate_v1_to_v2(sample_v1()).unwrap();
        let (state, accounts) = record.clone().into_parts();
        let rebuilt = LedgerRecordV2::from_parts(&state, accounts.iter().map(|(a, acc)| (a, acc)));
        assert_eq!(rebuilt, record);
    }
}
