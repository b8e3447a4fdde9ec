//! Reward Pool Common Library
//!
//! Shared types, constants and accounting for the reward pool contracts.
//!
//! Depositors stake a native value unit into one shared pool; an operator
//! injects rewards that are split in proportion to principal held at the
//! moment of injection. Distribution is O(1) per injection through a global
//! reward-per-share accumulator and a per-account snapshot (`reward_debt`).
//!
//! ## Modules
//!
//! - **constants**: fixed-point scale, decimals, version marker, schema ids
//! - **errors**: `PoolError` with stable codes
//! - **types**: `LedgerState`, `Account`, `PoolAction`, `PoolStats`
//! - **math**: checked accumulator formulas
//! - **ledger**: settle / deposit / reward / withdraw transitions
//! - **events**: typed event log
//! - **access_control**: operator guard
//! - **storage**: versioned, checksummed persisted layout
//!
//! This crate is `no_std` compatible when built without the `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod math;
pub mod ledger;
pub mod events;
pub mod access_control;
pub mod storage;


// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use math::*;
pub use events::*;
pub use access_control::{ensure_operator, has_permission, validate_new_operator, Permission};
pub use storage::{LedgerRecord, LedgerRecordV1, LedgerRecordV2};
