//! Pool Constants
//!
//! All magic numbers and fixed configuration values for the reward pool.
//! Grouped by concern so call sites read as `accumulator::SCALE`,
//! `lifecycle::VERSION` and so on.

/// Native value unit
pub mod token {
    /// Decimal places of the native unit
    pub const DECIMALS: u8 = 8;
    /// One whole unit in base units (1.0 = 100_000_000)
    pub const ONE: u64 = 100_000_000;
}

/// Reward accumulator configuration
pub mod accumulator {
    /// Fixed-point scale of `acc_reward_per_share` (1e18)
    ///
    /// `amount * SCALE` must fit in a u128 for any u64 amount, which holds
    /// with a wide margin (u64::MAX * 1e18 < 2^128).
    pub const SCALE: u128 = 1_000_000_000_000_000_000;
}

/// Lifecycle shim
pub mod lifecycle {
    /// Logic revision reported by `version()`.
    ///
    /// The upgrade collaborator compares this after swapping logic in.
    pub const VERSION: &str = "1.0.0";
}

/// Persisted storage layout
pub mod storage {
    /// First layout: header fields plus the account mapping
    pub const SCHEMA_V1: u16 = 1;

    /// Appends the lifetime counters after the account mapping
    pub const SCHEMA_V2: u16 = 2;

    /// Layout written by this logic revision
    pub const CURRENT_SCHEMA: u16 = SCHEMA_V2;

    /// Schema version (2 bytes) + SHA-256 checksum (32 bytes)
    pub const ENVELOPE_HEADER_LEN: usize = 2 + 32;
}
