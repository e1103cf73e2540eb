//! Core Types for the wVault Protocol
//!
//! Identities, the persisted data model (global parameters and per-owner
//! account records) and the operation set accepted by the state machine.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::fees;

/// Type alias for addresses (32-byte public key hash)
pub type Address = [u8; 32];

/// Identity of the currently deployed program logic (hash of its code)
pub type ProgramId = [u8; 32];

/// Stable application id, unchanged by program upgrades
pub type AppId = u64;

/// Host asset registry id
pub type AssetId = u64;

/// Deterministic id of a submitted group
pub type GroupId = [u8; 32];

/// The all-zero address, never a valid role holder
pub const ZERO_ADDRESS: Address = [0u8; 32];

// ============ Persisted State ============

/// Protocol-wide singleton, created at deployment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct GlobalParameters {
    /// May reassign roles, fees, switches, and upgrade or retire the program
    pub admin: Address,
    /// Sole caller allowed to mint and burn
    pub minter: Address,
    /// Canonical wrapped token
    pub wrapped_asset_id: AssetId,
    /// Mint fee in basis points
    pub mint_fee_bps: u64,
    /// Burn fee in basis points
    pub burn_fee_bps: u64,
    /// Charged once per account at opt-in, payable to the minter
    pub creation_fee_amount: u64,
    /// When false, withdraw/mint/burn are blocked everywhere
    pub global_enabled: bool,
}

impl GlobalParameters {
    /// Creates deployment-time parameters: no fees, protocol enabled
    pub fn new(admin: Address, minter: Address, wrapped_asset_id: AssetId) -> Self {
        Self {
            admin,
            minter,
            wrapped_asset_id,
            mint_fee_bps: fees::DEFAULT_MINT_FEE_BPS,
            burn_fee_bps: fees::DEFAULT_BURN_FEE_BPS,
            creation_fee_amount: fees::DEFAULT_CREATION_FEE,
            global_enabled: true,
        }
    }
}

/// Per-owner ledger entry, created on opt-in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct AccountRecord {
    /// Account owner
    pub owner: Address,
    /// Custody address bound at opt-in
    pub vault_address: Address,
    /// Native value held in the custody address
    pub vault_balance: u64,
    /// Outstanding wrapped supply attributed to this owner
    pub minted_amount: u64,
    /// Per-account switch, admin controlled
    pub account_enabled: bool,
}

impl AccountRecord {
    /// Fresh record: empty vault, nothing minted, enabled
    pub fn new(owner: Address, vault_address: Address) -> Self {
        Self {
            owner,
            vault_address,
            vault_balance: 0,
            minted_amount: 0,
            account_enabled: true,
        }
    }

    /// Returns true if the record still holds value or outstanding supply
    pub fn has_position(&self) -> bool {
        self.vault_balance > 0 || self.minted_amount > 0
    }
}

// ============ Operations ============

/// Every state-changing operation the vault accepts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum VaultOp {
    /// Create the caller's account record
    OptIn,
    /// Credit a companion payment into the caller's vault
    Deposit { amount: u64 },
    /// Release native value from the caller's vault
    Withdraw { amount: u64 },
    /// Minter issues wrapped tokens to `owner`
    Mint { owner: Address, amount: u64 },
    /// Minter retires wrapped tokens returned by `owner`
    Burn { owner: Address, amount: u64 },
    /// Cooperative exit
    CloseOut,
    /// Irrevocable forced exit
    ClearState,
    /// Set the global switch (0 or 1)
    SetGlobalStatus { value: u64 },
    /// Set one account's switch (0 or 1)
    SetAccountStatus { owner: Address, value: u64 },
    SetMintFee { bps: u64 },
    SetBurnFee { bps: u64 },
    SetCreationFee { amount: u64 },
    SetAdmin { new_admin: Address },
    SetMinter { new_minter: Address },
    /// Replace the deployed program logic
    UpdateProgram { program: ProgramId },
    /// Retire the program
    DeleteProgram,
}

/// Authorization class of an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationClass {
    /// Caller must be the admin
    AdminOnly,
    /// Caller must be the minter
    MinterOnly,
    /// Caller acts on their own record
    SelfService,
}

impl VaultOp {
    /// Which role the caller must hold
    pub fn class(&self) -> OperationClass {
        match self {
            VaultOp::OptIn
            | VaultOp::Deposit { .. }
            | VaultOp::Withdraw { .. }
            | VaultOp::CloseOut
            | VaultOp::ClearState => OperationClass::SelfService,
            VaultOp::Mint { .. } | VaultOp::Burn { .. } => OperationClass::MinterOnly,
            VaultOp::SetGlobalStatus { .. }
            | VaultOp::SetAccountStatus { .. }
            | VaultOp::SetMintFee { .. }
            | VaultOp::SetBurnFee { .. }
            | VaultOp::SetCreationFee { .. }
            | VaultOp::SetAdmin { .. }
            | VaultOp::SetMinter { .. }
            | VaultOp::UpdateProgram { .. }
            | VaultOp::DeleteProgram => OperationClass::AdminOnly,
        }
    }

    /// Operations blocked by either enable switch
    pub fn requires_enabled(&self) -> bool {
        matches!(
            self,
            VaultOp::Withdraw { .. } | VaultOp::Mint { .. } | VaultOp::Burn { .. }
        )
    }

    /// The account whose ledger the operation touches, given the caller
    pub fn affected_owner(&self, caller: Address) -> Option<Address> {
        match self {
            VaultOp::Mint { owner, .. }
            | VaultOp::Burn { owner, .. }
            | VaultOp::SetAccountStatus { owner, .. } => Some(*owner),
            op if op.class() == OperationClass::SelfService => Some(caller),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_parameters_are_enabled_and_fee_free() {
        let params = GlobalParameters::new([1u8; 32], [2u8; 32], 7);
        assert!(params.global_enabled);
        assert_eq!(params.mint_fee_bps, 0);
        assert_eq!(params.burn_fee_bps, 0);
        assert_eq!(params.creation_fee_amount, 0);
    }

    #[test]
    fn test_operation_classes() {
        assert_eq!(VaultOp::OptIn.class(), OperationClass::SelfService);
        assert_eq!(VaultOp::ClearState.class(), OperationClass::SelfService);
        assert_eq!(
            VaultOp::Mint { owner: [3u8; 32], amount: 1 }.class(),
            OperationClass::MinterOnly
        );
        assert_eq!(VaultOp::DeleteProgram.class(), OperationClass::AdminOnly);
        assert!(VaultOp::Withdraw { amount: 1 }.requires_enabled());
        assert!(!VaultOp::Deposit { amount: 1 }.requires_enabled());
        assert!(!VaultOp::CloseOut.requires_enabled());
    }

    #[test]
    fn test_affected_owner() {
        let caller = [9u8; 32];
        let owner = [4u8; 32];
        assert_eq!(VaultOp::Deposit { amount: 5 }.affected_owner(caller), Some(caller));
        assert_eq!(VaultOp::Burn { owner, amount: 5 }.affected_owner(caller), Some(owner));
        assert_eq!(VaultOp::SetMintFee { bps: 1 }.affected_owner(caller), None);
    }

    #[test]
    fn test_record_position() {
        let mut record = AccountRecord::new([1u8; 32], [2u8; 32]);
        assert!(!record.has_position());
        record.minted_amount = 1;
        assert!(record.has_position());
    }
}
