//! Error Types for the Reward Pool
//!
//! Every failure aborts the triggering operation and the engine rolls back
//! whatever it had already written. Codes are stable so indexers and client
//! tooling can match on them.

use crate::types::Address;

/// Result type alias for pool operations
pub type PoolResult<T> = Result<T, PoolError>;

/// Main error enum for all pool errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    // ============ Lifecycle Errors ============
    /// `initialize` was already called
    AlreadyInitialized,

    /// Operation reached before `initialize`
    NotInitialized,

    // ============ Authorization Errors ============
    /// Caller is not the operator
    Unauthorized { expected: Address, actual: Address },

    /// Address rejected for the requested role
    InvalidAddress { reason: &'static str },

    // ============ Amount Errors ============
    /// Zero value deposit or reward injection
    ZeroAmount,

    /// Reward injected while no principal is staked
    NoStakers,

    /// Withdrawal with zero principal and zero accrued rewards
    NothingToWithdraw,

    // ============ Transfer Errors ============
    /// Recipient rejected the outbound value transfer
    TransferFailed { to: Address, amount: u64 },

    /// Coins supplied to a spell do not cover the value it credits
    InsufficientFunds { available: u64, requested: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    /// Division by zero
    DivisionByZero,

    // ============ State Errors ============
    /// Proposed state does not match the re-executed transition
    InvalidStateTransition,

    /// Stored record uses a layout this logic cannot read
    UnsupportedSchema { version: u16 },

    /// Stored record failed checksum or decoding
    CorruptState { reason: &'static str },

    /// `total_principal` disagrees with the sum over accounts
    LedgerInconsistent { recorded: u64, actual: u64 },
}

impl PoolError {
    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::AlreadyInitialized => "E001_ALREADY_INITIALIZED",
            Self::NotInitialized => "E002_NOT_INITIALIZED",
            Self::Unauthorized { .. } => "E020_UNAUTHORIZED",
            Self::InvalidAddress { .. } => "E021_INVALID_ADDRESS",
            Self::ZeroAmount => "E030_ZERO_AMOUNT",
            Self::NoStakers => "E031_NO_STAKERS",
            Self::NothingToWithdraw => "E032_NOTHING_TO_WITHDRAW",
            Self::TransferFailed { .. } => "E040_TRANSFER_FAILED",
            Self::InsufficientFunds { .. } => "E041_INSUFFICIENT_FUNDS",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::DivisionByZero => "E082_DIV_ZERO",
            Self::InvalidStateTransition => "E100_INVALID_STATE",
            Self::UnsupportedSchema { .. } => "E110_UNSUPPORTED_SCHEMA",
            Self::CorruptState { .. } => "E111_CORRUPT_STATE",
            Self::LedgerInconsistent { .. } => "E112_LEDGER_INCONSISTENT",
        }
    }

    /// Returns true if the caller can fix the failure and retry
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::NotInitialized | Self::ZeroAmount | Self::NoStakers | Self::TransferFailed { .. } | Self::InsufficientFunds { .. }
        )
    }
}
