//! Pool Events
//!
//! Every state change records a typed event. The log is returned to the
//! host after execution and can be indexed off-chain. When an operation
//! fails, events it emitted are truncated together with its state writes.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::Address;

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Lifecycle Events (0x01 - 0x0F)
    Initialized = 0x01,
    UpgradeAuthorized = 0x02,

    // Ledger Events (0x10 - 0x1F)
    Deposited = 0x10,
    RewardInjected = 0x11,
    Withdrawn = 0x12,

    // Access Events (0x20 - 0x2F)
    OperatorTransferred = 0x20,
}

/// Main event enum containing all pool events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum PoolEvent {
    // ============ Lifecycle Events ============

    /// Emitted once when the pool is set up
    Initialized {
        operator: Address,
    },

    /// Emitted when the operator clears a logic upgrade
    UpgradeAuthorized {
        by: Address,
        from_version: [u8; 16],
    },

    // ============ Ledger Events ============

    /// Emitted when principal is credited
    Deposited {
        depositor: Address,
        amount: u64,
        new_principal: u64,
        total_principal: u64,
    },

    /// Emitted when the accumulator grows
    RewardInjected {
        operator: Address,
        amount: u64,
        acc_reward_per_share: u128,
        total_principal: u64,
    },

    /// Emitted when an account is drained, before the outbound transfer
    Withdrawn {
        depositor: Address,
        principal: u64,
        rewards: u64,
        total_principal: u64,
    },

    // ============ Access Events ============

    /// Emitted when the operator role changes hands
    OperatorTransferred {
        old_operator: Address,
        new_operator: Address,
    },
}

impl PoolEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::Initialized { .. } => EventType::Initialized,
            Self::UpgradeAuthorized { .. } => EventType::UpgradeAuthorized,
            Self::Deposited { .. } => EventType::Deposited,
            Self::RewardInjected { .. } => EventType::RewardInjected,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::OperatorTransferred { .. } => EventType::OperatorTransferred,
        }
    }

    /// Identity that triggered the event
    pub fn actor(&self) -> &Address {
        match self {
            Self::Initialized { operator } => operator,
            Self::UpgradeAuthorized { by, .. } => by,
            Self::Deposited { depositor, .. } => depositor,
            Self::RewardInjected { operator, .. } => operator,
            Self::Withdrawn { depositor, .. } => depositor,
            Self::OperatorTransferred { old_operator, .. } => old_operator,
        }
    }

    /// Serialize event to bytes for storage/transmission
    pub fn to_bytes(&self) -> Vec<u8> {
        borsh::to_vec(self).unwrap_or_default()
    }

    /// Deserialize event from bytes
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        borsh::from_slice(bytes).ok()
    }
}

/// Pack a version string into the fixed-width field of `UpgradeAuthorized`
pub fn version_tag(version: &str) -> [u8; 16] {
    let mut tag = [0u8; 16];
    let bytes = version.as_bytes();
    let len = bytes.len().min(tag.len());
    tag[..len].copy_from_slice(&bytes[..len]);
    tag
}

/// Event log for collecting events during execution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<PoolEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: PoolEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[PoolEvent] {
        &self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&PoolEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Check if any events were emitted
    pub fn has_events(&self) -> bool {
        !self.events.is_empty()
    }

    /// Get number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Drop every event emitted after `len`
    pub fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = PoolEvent::Deposited {
            depositor: [1u8; 32],
            amount: 100_000_000,
            new_principal: 100_000_000,
            total_principal: 300_000_000,
        };

        assert_eq!(event.event_type(), EventType::Deposited);
        assert_eq!(event.actor(), &[1u8; 32]);
    }

    #[test]
    fn test_event_serialization() {
        let event = PoolEvent::RewardInjected {
            operator: [1u8; 32],
            amount: 50_000_000,
            acc_reward_per_share: 500_000_000_000_000_000,
            total_principal: 100_000_000,
        };

        let bytes = event.to_bytes();
        let restored = PoolEvent::from_bytes(&bytes).unwrap();

        assert_eq!(event, restored);
    }

    #[test]
    fn test_event_discriminant_is_stable() {
        let bytes = borsh::to_vec(&EventType::Withdrawn).unwrap();
        assert_eq!(bytes, vec![0x12]);
    }

    #[test]
    fn test_version_tag() {
        let tag = version_tag("1.0.0");
        assert_eq!(&tag[..5], b"1.0.0");
        assert!(tag[5..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();

        log.emit(PoolEvent::Initialized { operator: [2u8; 32] });
        log.emit(PoolEvent::Deposited {
            depositor: [3u8; 32],
            amount: 100_000_000,
            new_principal: 100_000_000,
            total_principal: 100_000_000,
        });

        assert_eq!(log.len(), 2);
        assert!(log.has_events());

        let deposits = log.filter_by_type(EventType::Deposited);
        assert_eq!(deposits.len(), 1);

        log.truncate(1);
        assert_eq!(log.len(), 1);
        assert!(log.filter_by_type(EventType::Deposited).is_empty());
    }
}
