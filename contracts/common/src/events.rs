//! Protocol Events for wVault
//!
//! Events are collected while a group is evaluated and handed back in the
//! receipt once the group commits. A rejected group produces none.

use crate::Vec;
use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};
use crate::types::{Address, ProgramId};

/// Event types for indexing and filtering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
#[borsh(use_discriminant = true)]
#[repr(u8)]
pub enum EventType {
    // Account Events (0x01 - 0x1F)
    AccountOptedIn = 0x01,
    Deposited = 0x02,
    Withdrawn = 0x03,
    AccountClosed = 0x04,
    AccountCleared = 0x05,
    DirectDeposit = 0x06,

    // Token Events (0x20 - 0x3F)
    Minted = 0x20,
    Burned = 0x21,

    // Admin Events (0x40 - 0x5F)
    GlobalStatusChanged = 0x40,
    AccountStatusChanged = 0x41,
    MintFeeChanged = 0x42,
    BurnFeeChanged = 0x43,
    CreationFeeChanged = 0x44,
    AdminChanged = 0x45,
    MinterChanged = 0x46,

    // Program Events (0x60 - 0x7F)
    ProgramUpdated = 0x60,
    ProgramDeleted = 0x61,
}

/// Main event enum containing all protocol events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum VaultEvent {
    // ============ Account Events ============

    /// Emitted when an owner opts in
    AccountOptedIn {
        owner: Address,
        vault: Address,
        creation_fee: u64,
    },

    /// Emitted when a deposit is credited through the deposit operation
    Deposited {
        owner: Address,
        amount: u64,
        new_balance: u64,
    },

    /// Emitted when value leaves a vault to its owner
    Withdrawn {
        owner: Address,
        amount: u64,
        new_balance: u64,
    },

    /// Emitted on cooperative exit
    AccountClosed {
        owner: Address,
        swept: u64,
    },

    /// Emitted on forced exit; `abandoned` stays at the old custody address
    AccountCleared {
        owner: Address,
        abandoned: u64,
        outstanding_minted: u64,
    },

    /// Emitted when a bare payment lands in a custody address
    DirectDeposit {
        owner: Address,
        amount: u64,
        new_balance: u64,
    },

    // ============ Token Events ============

    Minted {
        owner: Address,
        amount: u64,
        fee: u64,
        new_minted: u64,
    },

    Burned {
        owner: Address,
        amount: u64,
        fee: u64,
        new_minted: u64,
    },

    // ============ Admin Events ============

    GlobalStatusChanged { enabled: bool },

    AccountStatusChanged { owner: Address, enabled: bool },

    MintFeeChanged { old_bps: u64, new_bps: u64 },

    BurnFeeChanged { old_bps: u64, new_bps: u64 },

    CreationFeeChanged { old_amount: u64, new_amount: u64 },

    AdminChanged { old_admin: Address, new_admin: Address },

    MinterChanged { old_minter: Address, new_minter: Address },

    // ============ Program Events ============

    ProgramUpdated { old_program: ProgramId, new_program: ProgramId },

    ProgramDeleted { admin: Address },
}

impl VaultEvent {
    /// Get the event type for filtering
    pub fn event_type(&self) -> EventType {
        match self {
            Self::AccountOptedIn { .. } => EventType::AccountOptedIn,
            Self::Deposited { .. } => EventType::Deposited,
            Self::Withdrawn { .. } => EventType::Withdrawn,
            Self::AccountClosed { .. } => EventType::AccountClosed,
            Self::AccountCleared { .. } => EventType::AccountCleared,
            Self::DirectDeposit { .. } => EventType::DirectDeposit,
            Self::Minted { .. } => EventType::Minted,
            Self::Burned { .. } => EventType::Burned,
            Self::GlobalStatusChanged { .. } => EventType::GlobalStatusChanged,
            Self::AccountStatusChanged { .. } => EventType::AccountStatusChanged,
            Self::MintFeeChanged { .. } => EventType::MintFeeChanged,
            Self::BurnFeeChanged { .. } => EventType::BurnFeeChanged,
            Self::CreationFeeChanged { .. } => EventType::CreationFeeChanged,
            Self::AdminChanged { .. } => EventType::AdminChanged,
            Self::MinterChanged { .. } => EventType::MinterChanged,
            Self::ProgramUpdated { .. } => EventType::ProgramUpdated,
            Self::ProgramDeleted { .. } => EventType::ProgramDeleted,
        }
    }

    /// Owner the event concerns, if any
    pub fn owner(&self) -> Option<Address> {
        match self {
            Self::AccountOptedIn { owner, .. }
            | Self::Deposited { owner, .. }
            | Self::Withdrawn { owner, .. }
            | Self::AccountClosed { owner, .. }
            | Self::AccountCleared { owner, .. }
            | Self::DirectDeposit { owner, .. }
            | Self::Minted { owner, .. }
            | Self::Burned { owner, .. }
            | Self::AccountStatusChanged { owner, .. } => Some(*owner),
            _ => None,
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

/// Event log for collecting events during group evaluation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<VaultEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Emit an event (add to log)
    pub fn emit(&mut self, event: VaultEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[VaultEvent] {
        &self.events
    }

    /// Take ownership of all events
    pub fn into_events(self) -> Vec<VaultEvent> {
        self.events
    }

    /// Filter events by type
    pub fn filter_by_type(&self, event_type: EventType) -> Vec<&VaultEvent> {
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

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type() {
        let event = VaultEvent::Minted {
            owner: [1u8; 32],
            amount: 1_000,
            fee: 15,
            new_minted: 1_000,
        };
        assert_eq!(event.event_type(), EventType::Minted);
        assert_eq!(event.owner(), Some([1u8; 32]));
        assert_eq!(VaultEvent::GlobalStatusChanged { enabled: false }.owner(), None);
    }

    #[test]
    fn test_event_serialization() {
        let event = VaultEvent::AccountCleared {
            owner: [7u8; 32],
            abandoned: 250_000,
            outstanding_minted: 10,
        };
        let bytes = event.to_bytes();
        assert!(!bytes.is_empty());
        assert_eq!(VaultEvent::from_bytes(&bytes), Some(event));
    }

    #[test]
    fn test_event_log() {
        let mut log = EventLog::new();
        assert!(!log.has_events());

        log.emit(VaultEvent::GlobalStatusChanged { enabled: false });
        log.emit(VaultEvent::Deposited { owner: [2u8; 32], amount: 5, new_balance: 5 });
        log.emit(VaultEvent::GlobalStatusChanged { enabled: true });

        assert_eq!(log.len(), 3);
        assert_eq!(log.filter_by_type(EventType::GlobalStatusChanged).len(), 2);

        log.clear();
        assert!(log.is_empty());
    }
}
