//! Reward Pool Contract
//!
//! Depositors stake a native value unit; the operator injects rewards that
//! are split across everyone staked at that moment, in proportion to
//! principal. Each injection is O(1): it only grows the global
//! `acc_reward_per_share`, and accounts catch up lazily when they are next
//! touched.
//!
//! ## Execution Model
//!
//! Every state-changing entry point runs inside `atomic`. Header and
//! account writes go through the undo journal, so a failure anywhere in the
//! operation (including inside a reentrant call made by a withdrawal
//! recipient) restores the exact prior state and drops the events it
//! emitted.
//!
//! ```text
//! withdraw_all:
//!   settle -> zero account -> lower total -> emit Withdrawn -> send payout
//!                                                               |
//!                                   recipient may re-enter -----+
//! ```

use std::collections::BTreeMap;

// Charms SDK integration (conditional compilation)
#[cfg(feature = "charms")]
pub mod charms;
pub mod transfer;
pub mod witness;

use rewardpool_common::{
    access_control::{has_permission, validate_new_operator, Permission},
    constants::lifecycle::VERSION,
    errors::{PoolError, PoolResult},
    events::{version_tag, EventLog, PoolEvent},
    ledger::{apply_deposit, apply_reward, apply_withdraw_all, preview_rewards},
    math::safe_add,
    storage::{self, LedgerRecord},
    types::{Account, Address, LedgerState, PoolAction, PoolStats},
};

pub use transfer::{NativeBalances, TransferRejected, ValueTransfer};
pub use witness::{AccountCharm, OperatorCharm, PoolWitness};

// ============ Undo Journal ============

/// Prior value of one write
#[derive(Debug, Clone)]
enum UndoEntry {
    Header(LedgerState),
    Account(Address, Option<Account>),
}

// ============ Pool ============

/// The pool engine
#[derive(Debug, Clone, Default)]
pub struct Pool {
    state: LedgerState,
    accounts: BTreeMap<Address, Account>,
    journal: Vec<UndoEntry>,
    events: EventLog,
    depth: usize,
}

impl Pool {
    /// Uninitialized pool; only `initialize` is reachable
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble a pool from a header and a subset of its accounts
    ///
    /// Used where only the touched accounts are available. The principal-sum
    /// invariant is not checked; use `restore` for full records.
    pub fn from_parts<I>(state: LedgerState, accounts: I) -> Self
    where
        I: IntoIterator<Item = (Address, Account)>,
    {
        Self {
            state,
            accounts: accounts.into_iter().filter(|(_, a)| !a.is_empty()).collect(),
            ..Self::default()
        }
    }

    // ============ Lifecycle ============

    /// One-time setup; `caller` becomes the operator
    pub fn initialize(&mut self, caller: &Address) -> PoolResult<()> {
        self.atomic(|pool| {
            // 1. Only once
            if pool.state.initialized {
                return Err(PoolError::AlreadyInitialized);
            }

            // 2. Caller must be able to act as operator later
            validate_new_operator(caller)?;

            pool.write_state(LedgerState::initialized_by(*caller));
            pool.events.emit(PoolEvent::Initialized { operator: *caller });
            Ok(())
        })
    }

    /// Logic revision marker
    pub fn version(&self) -> &'static str {
        VERSION
    }

    /// Gate called by the upgrade mechanism before it swaps logic in
    pub fn authorize_upgrade(&mut self, caller: &Address) -> PoolResult<()> {
        self.atomic(|pool| {
            has_permission(&pool.state, caller, Permission::AuthorizeUpgrade)?;
            pool.events.emit(PoolEvent::UpgradeAuthorized {
                by: *caller,
                from_version: version_tag(VERSION),
            });
            Ok(())
        })
    }

    // ============ Operations ============

    /// Credit `amount` of principal to `caller`
    pub fn deposit(&mut self, caller: &Address, amount: u64) -> PoolResult<()> {
        self.atomic(|pool| {
            pool.ensure_initialized()?;

            let mut state = pool.state;
            let mut account = pool.account_or_new(caller);
            apply_deposit(&mut state, &mut account, amount)?;

            pool.write_account(*caller, Some(account));
            pool.write_state(state);
            pool.events.emit(PoolEvent::Deposited {
                depositor: *caller,
                amount,
                new_principal: account.principal,
                total_principal: state.total_principal,
            });
            Ok(())
        })
    }

    /// Bare value sent to the pool is a deposit
    pub fn receive(&mut self, caller: &Address, amount: u64) -> PoolResult<()> {
        self.deposit(caller, amount)
    }

    /// Split `amount` across current principal (operator only)
    pub fn inject_reward(&mut self, caller: &Address, amount: u64) -> PoolResult<()> {
        self.atomic(|pool| {
            has_permission(&pool.state, caller, Permission::InjectReward)?;

            let mut state = pool.state;
            let acc_reward_per_share = apply_reward(&mut state, amount)?;

            pool.write_state(state);
            pool.events.emit(PoolEvent::RewardInjected {
                operator: *caller,
                amount,
                acc_reward_per_share,
                total_principal: state.total_principal,
            });
            Ok(())
        })
    }

    /// Pay `caller` their principal plus every reward owed
    ///
    /// The ledger is fully updated before `transfer` runs. If the transfer
    /// is rejected the withdrawal, and anything done reentrantly during it,
    /// is undone and `TransferFailed` is returned.
    ///
    /// # Returns
    /// The amount paid out
    pub fn withdraw_all<T>(&mut self, caller: &Address, transfer: &mut T) -> PoolResult<u64>
    where
        T: ValueTransfer + ?Sized,
    {
        self.atomic(|pool| {
            pool.ensure_initialized()?;

            // 1. Settle and drain on a copy
            let mut state = pool.state;
            let mut account = pool.account_or_new(caller);
            let (principal, rewards) = apply_withdraw_all(&mut state, &mut account)?;
            let payout = safe_add(principal, rewards)?;

            // 2. Effects
            pool.write_account(*caller, None);
            pool.write_state(state);
            pool.events.emit(PoolEvent::Withdrawn {
                depositor: *caller,
                principal,
                rewards,
                total_principal: state.total_principal,
            });

            // 3. Interaction
            transfer
                .send(pool, caller, payout)
                .map_err(|_| PoolError::TransferFailed { to: *caller, amount: payout })?;

            Ok(payout)
        })
    }

    /// Hand the operator role to `new_operator` (operator only)
    pub fn transfer_operator(&mut self, caller: &Address, new_operator: &Address) -> PoolResult<()> {
        self.atomic(|pool| {
            has_permission(&pool.state, caller, Permission::TransferOperator)?;
            validate_new_operator(new_operator)?;

            let mut state = pool.state;
            state.operator = *new_operator;
            pool.write_state(state);
            pool.events.emit(PoolEvent::OperatorTransferred {
                old_operator: *caller,
                new_operator: *new_operator,
            });
            Ok(())
        })
    }

    /// Dispatch a `PoolAction`
    ///
    /// # Returns
    /// Value moved by the action: the deposited or injected amount, the
    /// payout of a withdrawal, zero otherwise.
    pub fn execute<T>(&mut self, caller: &Address, action: &PoolAction, transfer: &mut T) -> PoolResult<u64>
    where
        T: ValueTransfer + ?Sized,
    {
        match action {
            PoolAction::Initialize => self.initialize(caller).map(|_| 0),
            PoolAction::Deposit { amount } => self.deposit(caller, *amount).map(|_| *amount),
            PoolAction::InjectReward { amount } => self.inject_reward(caller, *amount).map(|_| *amount),
            PoolAction::WithdrawAll => self.withdraw_all(caller, transfer),
            PoolAction::TransferOperator { new_operator } => {
                self.transfer_operator(caller, new_operator).map(|_| 0)
            }
        }
    }

    // ============ Queries ============

    /// Principal held by `who`
    pub fn balance_of(&self, who: &Address) -> u64 {
        self.accounts.get(who).map(|a| a.principal).unwrap_or(0)
    }

    /// Rewards `who` would receive right now: accrued plus pending
    pub fn rewards_of(&self, who: &Address) -> PoolResult<u64> {
        match self.accounts.get(who) {
            Some(account) => preview_rewards(account, self.state.acc_reward_per_share),
            None => Ok(0),
        }
    }

    pub fn total_principal(&self) -> u64 {
        self.state.total_principal
    }

    pub fn acc_reward_per_share(&self) -> u128 {
        self.state.acc_reward_per_share
    }

    /// Current operator (zero before `initialize`)
    pub fn operator(&self) -> Address {
        self.state.operator
    }

    pub fn is_initialized(&self) -> bool {
        self.state.initialized
    }

    /// Value the pool should currently hold
    pub fn custody_balance(&self) -> u64 {
        self.state.custody_balance()
    }

    /// Number of accounts holding principal or rewards
    pub fn depositor_count(&self) -> u64 {
        self.accounts.len() as u64
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            total_principal: self.state.total_principal,
            acc_reward_per_share: self.state.acc_reward_per_share,
            custody_balance: self.state.custody_balance(),
            depositor_count: self.depositor_count(),
            total_deposited: self.state.total_deposited,
            total_rewards_injected: self.state.total_rewards_injected,
            total_paid_out: self.state.total_paid_out,
        }
    }

    /// Ledger header
    pub fn state(&self) -> &LedgerState {
        &self.state
    }

    /// Stored account of `who`, if any
    pub fn account(&self, who: &Address) -> Option<&Account> {
        self.accounts.get(who)
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    /// Drain the event log
    pub fn take_events(&mut self) -> EventLog {
        core::mem::take(&mut self.events)
    }

    /// Check the principal-sum invariant and that custody covers every claim
    pub fn audit(&self) -> PoolResult<()> {
        let mut principal_sum: u64 = 0;
        let mut owed: u64 = 0;
        for account in self.accounts.values() {
            principal_sum = safe_add(principal_sum, account.principal)?;
            owed = safe_add(owed, account.principal)?;
            owed = safe_add(owed, preview_rewards(account, self.state.acc_reward_per_share)?)?;
        }

        if principal_sum != self.state.total_principal {
            return Err(PoolError::LedgerInconsistent {
                recorded: self.state.total_principal,
                actual: principal_sum,
            });
        }

        let custody = self.state.custody_balance();
        if owed > custody {
            return Err(PoolError::LedgerInconsistent { recorded: custody, actual: owed });
        }

        Ok(())
    }

    // ============ Persistence ============

    /// Snapshot in the current storage schema
    pub fn to_record(&self) -> LedgerRecord {
        LedgerRecord::from_parts(&self.state, self.accounts.iter())
    }

    /// Encode the ledger as a versioned storage record
    pub fn save(&self) -> PoolResult<Vec<u8>> {
        storage::encode(&self.to_record())
    }

    /// Load a pool from any supported storage record
    ///
    /// Older schemas are migrated; records that fail the checksum or any
    /// ledger invariant are rejected.
    pub fn restore(bytes: &[u8]) -> PoolResult<Self> {
        let record = storage::decode(bytes)?;
        let (state, accounts) = record.into_parts();
        Ok(Self::from_parts(state, accounts))
    }

    // ============ Internal ============

    fn ensure_initialized(&self) -> PoolResult<()> {
        if !self.state.initialized {
            return Err(PoolError::NotInitialized);
        }
        Ok(())
    }

    fn account_or_new(&self, who: &Address) -> Account {
        self.accounts
            .get(who)
            .copied()
            .unwrap_or_else(|| Account::new(self.state.acc_reward_per_share))
    }

    fn write_state(&mut self, state: LedgerState) {
        self.journal.push(UndoEntry::Header(self.state));
        self.state = state;
    }

    /// `None` removes the account
    fn write_account(&mut self, who: Address, account: Option<Account>) {
        let previous = match account {
            Some(account) => self.accounts.insert(who, account),
            None => self.accounts.remove(&who),
        };
        self.journal.push(UndoEntry::Account(who, previous));
    }

    /// Run `op` so that it either fully applies or leaves no trace
    fn atomic<R>(&mut self, op: impl FnOnce(&mut Self) -> PoolResult<R>) -> PoolResult<R> {
        let journal_mark = self.journal.len();
        let event_mark = self.events.len();

        self.depth += 1;
        let result = op(self);
        self.depth -= 1;

        if result.is_err() {
            self.rollback(journal_mark);
            self.events.truncate(event_mark);
        }

        // Outermost call commits
        if self.depth == 0 {
            self.journal.clear();
        }

        result
    }

    fn rollback(&mut self, mark: usize) {
        while self.journal.len() > mark {
            match self.journal.pop() {
                Some(UndoEntry::Header(state)) => self.state = state,
                Some(UndoEntry::Account(who, Some(account))) => {
                    self.accounts.insert(who, account);
                }
                Some(UndoEntry::Account(who, None)) => {
                    self.accounts.remove(&who);
                }
                None => break,
            }
        }
    }
}

// ============ Tests ============
