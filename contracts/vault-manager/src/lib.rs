//! Vault Manager - custody vaults and wrapped-token issuance for wVault
//!
//! Owns the protocol state and accepts it only in atomic groups. A group is
//! evaluated in full on a staged copy of the store and replaces the live
//! store only if every rule holds.
//!
//! ## Core Operations
//!
//! - **OptIn / CloseOut / ClearState**: account lifecycle
//! - **Deposit / Withdraw**: native value in and out of the owner's vault
//! - **Mint / Burn**: minter issues and retires the wrapped token
//! - **Admin**: switches, fee rates, role reassignment, program upgrade and
//!   deletion
//!
//! ## Example
//!
//! ```rust,ignore
//! let mut manager = VaultManager::new(admin, minter, asset_id, app_id, b"approval-v1")?;
//! let group = TransactionGroup::new().with_call(owner, app_id, VaultOp::OptIn);
//! let receipt = manager.submit(&group)?;
//! ```

use tracing::{debug, warn};

use wvault_common::{
    collateral,
    config::VaultConfig,
    constants::limits,
    derivation::{program_id_from_logic, Sha256Derivation, VaultAddressDerivation},
    errors::{GroupShapeReason, VaultError, VaultResult},
    events::{EventLog, VaultEvent},
    types::{AccountRecord, Address, AppId, AssetId, GlobalParameters, GroupId, ProgramId},
    validation::require_valid_address,
};

pub mod group;
pub mod machine;
pub mod store;

pub use group::{AppCall, AssetTransfer, GroupItem, Payment, TransactionGroup};
pub use machine::GroupContext;
pub use store::{Balances, VaultStore};


// ============ Receipt ============

/// Result of a committed group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub group_id: GroupId,
    /// Sequence number of the commit
    pub round: u64,
    pub events: Vec<VaultEvent>,
}

// ============ Vault Manager ============

/// The deployed application and the state it owns
#[derive(Debug, Clone)]
pub struct VaultManager<D = Sha256Derivation> {
    app_id: AppId,
    config: VaultConfig,
    deriver: D,
    store: VaultStore,
    round: u64,
}

impl VaultManager<Sha256Derivation> {
    /// Deploy with the default configuration and derivation
    pub fn new(
        admin: Address,
        minter: Address,
        wrapped_asset_id: AssetId,
        app_id: AppId,
        program_logic: &[u8],
    ) -> VaultResult<Self> {
        Self::deploy(
            admin,
            minter,
            wrapped_asset_id,
            app_id,
            program_logic,
            VaultConfig::default(),
            Sha256Derivation,
        )
    }
}

impl<D: VaultAddressDerivation> VaultManager<D> {
    /// Create the global parameters: no fees, protocol enabled.
    ///
    /// # Errors
    /// `InvalidAddress` for a zero admin or minter, `InvalidParameterRange`
    /// for a config whose fee ceiling is out of bounds.
    pub fn deploy(
        admin: Address,
        minter: Address,
        wrapped_asset_id: AssetId,
        app_id: AppId,
        program_logic: &[u8],
        config: VaultConfig,
        deriver: D,
    ) -> VaultResult<Self> {
        require_valid_address(&admin, "admin")?;
        require_valid_address(&minter, "minter")?;
        config.validate()?;

        let globals = GlobalParameters::new(admin, minter, wrapped_asset_id);
        let store = VaultStore::new(globals, program_id_from_logic(program_logic));
        debug!(app_id, wrapped_asset_id, "vault deployed");

        Ok(Self {
            app_id,
            config,
            deriver,
            store,
            round: 0,
        })
    }

    /// Evaluate a group and commit it atomically.
    ///
    /// On error the live store is untouched.
    pub fn submit(&mut self, group: &TransactionGroup) -> VaultResult<Receipt> {
        match self.evaluate(group) {
            Ok((store, events)) => {
                self.store = store;
                self.round += 1;
                let receipt = Receipt {
                    group_id: group.group_id(),
                    round: self.round,
                    events: events.into_events(),
                };
                debug!(
                    round = receipt.round,
                    items = group.len(),
                    events = receipt.events.len(),
                    "group committed"
                );
                Ok(receipt)
            }
            Err(err) => {
                warn!(code = err.code(), items = group.len(), "group rejected");
                Err(err)
            }
        }
    }

    fn evaluate(&self, group: &TransactionGroup) -> VaultResult<(VaultStore, EventLog)> {
        if self.store.globals().is_none() {
            return Err(VaultError::ProgramDeleted);
        }
        if group.is_empty() {
            return Err(VaultError::EmptyGroup);
        }
        if group.len() > limits::MAX_GROUP_SIZE {
            return Err(VaultError::shape(GroupShapeReason::TooManyItems));
        }

        let mut ctx = GroupContext::new(
            self.store.clone(),
            group.items(),
            self.app_id,
            &self.config,
            &self.deriver,
        );
        for item in group.items() {
            if let GroupItem::Call(call) = item {
                machine::apply(&mut ctx, call)?;
            }
        }
        ctx.finish()?;

        Ok((ctx.store, ctx.events))
    }

    // ============ Host Dispenser ============

    /// Credit native value to an address outside any group.
    ///
    /// Addresses bound to an account record are refused: their balance is
    /// tracked by the record and only moves through groups.
    pub fn fund(&mut self, address: Address, amount: u64) -> VaultResult<()> {
        self.require_unbound(&address)?;
        self.store.balances_mut().credit_native(address, amount)
    }

    /// Credit asset units to an address outside any group
    pub fn fund_asset(&mut self, address: Address, asset_id: AssetId, amount: u64) -> VaultResult<()> {
        self.require_unbound(&address)?;
        self.store.balances_mut().credit_asset(address, asset_id, amount)
    }

    fn require_unbound(&self, address: &Address) -> VaultResult<()> {
        if self.store.record_by_vault(address).is_some() {
            return Err(VaultError::InvalidAddress { param: "address" });
        }
        Ok(())
    }

    // ============ Queries ============

    fn params(&self) -> VaultResult<&GlobalParameters> {
        self.store.globals().ok_or(VaultError::ProgramDeleted)
    }

    fn record(&self, owner: &Address) -> VaultResult<&AccountRecord> {
        self.store
            .get(owner)
            .ok_or(VaultError::AccountNotFound { owner: *owner })
    }

    pub fn balance(&self, owner: &Address) -> VaultResult<u64> {
        Ok(self.record(owner)?.vault_balance)
    }

    pub fn minted(&self, owner: &Address) -> VaultResult<u64> {
        Ok(self.record(owner)?.minted_amount)
    }

    pub fn max_mint(&self, owner: &Address) -> VaultResult<u64> {
        collateral::max_mint(self.record(owner)?, self.params()?, &self.config)
    }

    pub fn max_withdraw(&self, owner: &Address) -> VaultResult<u64> {
        Ok(collateral::max_withdraw(self.record(owner)?, &self.config))
    }

    pub fn global_enabled(&self) -> VaultResult<bool> {
        Ok(self.params()?.global_enabled)
    }

    pub fn account_enabled(&self, owner: &Address) -> VaultResult<bool> {
        Ok(self.record(owner)?.account_enabled)
    }

    pub fn mint_fee_bps(&self) -> VaultResult<u64> {
        Ok(self.params()?.mint_fee_bps)
    }

    pub fn burn_fee_bps(&self) -> VaultResult<u64> {
        Ok(self.params()?.burn_fee_bps)
    }

    pub fn creation_fee(&self) -> VaultResult<u64> {
        Ok(self.params()?.creation_fee_amount)
    }

    pub fn admin(&self) -> VaultResult<Address> {
        Ok(self.params()?.admin)
    }

    pub fn minter(&self) -> VaultResult<Address> {
        Ok(self.params()?.minter)
    }

    pub fn wrapped_asset_id(&self) -> VaultResult<AssetId> {
        Ok(self.params()?.wrapped_asset_id)
    }

    pub fn program_id(&self) -> ProgramId {
        self.store.program_id()
    }

    pub fn account(&self, owner: &Address) -> Option<&AccountRecord> {
        self.store.get(owner)
    }

    /// Custody address bound to the owner's record at opt-in
    pub fn vault_address_by_app(&self, owner: &Address) -> VaultResult<Address> {
        Ok(self.record(owner)?.vault_address)
    }

    /// Custody address derived from the currently deployed logic
    pub fn vault_address_by_logic(&self, owner: &Address) -> Address {
        self.deriver
            .derive_vault_address(owner, &self.store.program_id(), self.app_id)
    }

    pub fn native_balance(&self, address: &Address) -> u64 {
        self.store.balances().native(address)
    }

    pub fn asset_balance(&self, address: &Address, asset_id: AssetId) -> u64 {
        self.store.balances().asset(address, asset_id)
    }

    pub fn app_id(&self) -> AppId {
        self.app_id
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn store(&self) -> &VaultStore {
        &self.store
    }

    /// Number of committed groups
    pub fn round(&self) -> u64 {
        self.round
    }
}

// ============ Tests ============

#[cfg(test)]
mod tests {
    use super::*;
    use wvault_common::types::VaultOp;

    const ADMIN: Address = [1u8; 32];
    const MINTER: Address = [2u8; 32];
    const OWNER: Address = [3u8; 32];
    const APP: AppId = 21;
    const ASSET: AssetId = 31;

    fn manager() -> VaultManager {
        VaultManager::new(ADMIN, MINTER, ASSET, APP, b"approval-v1").unwrap()
    }

    #[test]
    fn test_deploy_defaults() {
        let m = manager();
        assert_eq!(m.admin(), Ok(ADMIN));
        assert_eq!(m.minter(), Ok(MINTER));
        assert_eq!(m.wrapped_asset_id(), Ok(ASSET));
        assert_eq!(m.mint_fee_bps(), Ok(0));
        assert_eq!(m.burn_fee_bps(), Ok(0));
        assert_eq!(m.creation_fee(), Ok(0));
        assert_eq!(m.global_enabled(), Ok(true));
        assert_eq!(m.program_id(), program_id_from_logic(b"approval-v1"));
        assert_eq!(m.round(), 0);
    }

    #[test]
    fn test_deploy_rejects_zero_roles() {
        let err = VaultManager::new([0u8; 32], MINTER, ASSET, APP, b"x").unwrap_err();
        assert_eq!(err, VaultError::InvalidAddress { param: "admin" });
        let err = VaultManager::new(ADMIN, [0u8; 32], ASSET, APP, b"x").unwrap_err();
        assert_eq!(err, VaultError::InvalidAddress { param: "minter" });
    }

    #[test]
    fn test_empty_and_oversized_groups() {
        let mut m = manager();
        assert_eq!(m.submit(&TransactionGroup::new()), Err(VaultError::EmptyGroup));

        let mut group = TransactionGroup::new();
        for _ in 0..=limits::MAX_GROUP_SIZE {
            group = group.with_call(ADMIN, APP, VaultOp::SetCreationFee { amount: 1 });
        }
        assert_eq!(
            m.submit(&group),
            Err(VaultError::shape(GroupShapeReason::TooManyItems))
        );
    }

    #[test]
    fn test_receipt_and_round() {
        let mut m = manager();
        let group = TransactionGroup::new().with_call(OWNER, APP, VaultOp::OptIn);
        let receipt = m.submit(&group).unwrap();
        assert_eq!(receipt.round, 1);
        assert_eq!(receipt.group_id, group.group_id());
        assert_eq!(receipt.events.len(), 1);
        assert_eq!(m.vault_address_by_app(&OWNER), Ok(m.vault_address_by_logic(&OWNER)));
    }

    #[test]
    fn test_rejected_group_leaves_state() {
        let mut m = manager();
        let before = m.store().clone();
        let group = TransactionGroup::new()
            .with_call(ADMIN, APP, VaultOp::SetMintFee { bps: 100 })
            .with_call(ADMIN, APP, VaultOp::SetBurnFee { bps: 5_001 });
        assert!(m.submit(&group).is_err());
        assert_eq!(m.store(), &before);
        assert_eq!(m.round(), 0);
    }

    #[test]
    fn test_fund_refuses_bound_vault() {
        let mut m = manager();
        m.submit(&TransactionGroup::new().with_call(OWNER, APP, VaultOp::OptIn))
            .unwrap();
        let vault = m.vault_address_by_app(&OWNER).unwrap();
        assert_eq!(m.fund(vault, 1), Err(VaultError::InvalidAddress { param: "address" }));
        assert!(m.fund(OWNER, 1).is_ok());
        assert_eq!(m.native_balance(&OWNER), 1);
    }
}
