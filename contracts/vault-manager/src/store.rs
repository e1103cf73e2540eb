//! Account Ledger and Global Parameter Store
//!
//! Plain key-value persistence next to a minimal host-ledger view. Reads are
//! public; every mutator is crate-private so only the state machine writes,
//! and it only ever writes to a staged copy that replaces the live store
//! when a group commits.

use std::collections::BTreeMap;

use wvault_common::{
    errors::{VaultError, VaultResult},
    math::safe_add,
    types::{AccountRecord, Address, AssetId, GlobalParameters, ProgramId},
};

// ============ Host Balances ============

/// Native and asset balances held by host addresses
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Balances {
    native: BTreeMap<Address, u64>,
    assets: BTreeMap<(Address, AssetId), u64>,
}

impl Balances {
    pub fn native(&self, address: &Address) -> u64 {
        self.native.get(address).copied().unwrap_or(0)
    }

    pub fn asset(&self, address: &Address, asset_id: AssetId) -> u64 {
        self.assets.get(&(*address, asset_id)).copied().unwrap_or(0)
    }

    pub(crate) fn credit_native(&mut self, address: Address, amount: u64) -> VaultResult<()> {
        let balance = self.native.entry(address).or_insert(0);
        *balance = safe_add(*balance, amount)?;
        Ok(())
    }

    pub(crate) fn debit_native(&mut self, address: Address, amount: u64) -> VaultResult<()> {
        let available = self.native(&address);
        let remaining = available.checked_sub(amount).ok_or(VaultError::InsufficientFunds {
            address,
            available,
            requested: amount,
        })?;
        if remaining == 0 {
            self.native.remove(&address);
        } else {
            self.native.insert(address, remaining);
        }
        Ok(())
    }

    pub(crate) fn credit_asset(&mut self, address: Address, asset_id: AssetId, amount: u64) -> VaultResult<()> {
        let balance = self.assets.entry((address, asset_id)).or_insert(0);
        *balance = safe_add(*balance, amount)?;
        Ok(())
    }

    pub(crate) fn debit_asset(&mut self, address: Address, asset_id: AssetId, amount: u64) -> VaultResult<()> {
        let available = self.asset(&address, asset_id);
        let remaining = available.checked_sub(amount).ok_or(VaultError::InsufficientFunds {
            address,
            available,
            requested: amount,
        })?;
        if remaining == 0 {
            self.assets.remove(&(address, asset_id));
        } else {
            self.assets.insert((address, asset_id), remaining);
        }
        Ok(())
    }

    /// Total wrapped supply held by addresses other than `excluded`
    pub fn circulating(&self, asset_id: AssetId, excluded: &Address) -> u128 {
        self.assets
            .iter()
            .filter(|((address, asset), _)| *asset == asset_id && address != excluded)
            .map(|(_, amount)| u128::from(*amount))
            .sum()
    }
}

// ============ Vault Store ============

/// Protocol state plus the host balances it accounts for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultStore {
    /// None once the program has been deleted
    globals: Option<GlobalParameters>,
    /// Identity of the currently deployed logic
    program_id: ProgramId,
    /// Records keyed by owner
    accounts: BTreeMap<Address, AccountRecord>,
    /// Every custody address ever bound, mapped to the owner it was bound for
    custody: BTreeMap<Address, Address>,
    balances: Balances,
}

impl VaultStore {
    pub fn new(globals: GlobalParameters, program_id: ProgramId) -> Self {
        Self {
            globals: Some(globals),
            program_id,
            accounts: BTreeMap::new(),
            custody: BTreeMap::new(),
            balances: Balances::default(),
        }
    }

    // ============ Global Parameters ============

    pub fn globals(&self) -> Option<&GlobalParameters> {
        self.globals.as_ref()
    }

    pub(crate) fn globals_mut(&mut self) -> VaultResult<&mut GlobalParameters> {
        self.globals.as_mut().ok_or(VaultError::ProgramDeleted)
    }

    /// Drops the parameters and every record
    pub(crate) fn teardown(&mut self) {
        self.globals = None;
        self.accounts.clear();
    }

    pub fn program_id(&self) -> ProgramId {
        self.program_id
    }

    pub(crate) fn set_program_id(&mut self, program_id: ProgramId) {
        self.program_id = program_id;
    }

    // ============ Account Records ============

    pub fn get(&self, owner: &Address) -> Option<&AccountRecord> {
        self.accounts.get(owner)
    }

    pub(crate) fn get_mut(&mut self, owner: &Address) -> Option<&mut AccountRecord> {
        self.accounts.get_mut(owner)
    }

    /// Insert or replace a record and bind its custody address
    pub(crate) fn put(&mut self, record: AccountRecord) {
        self.custody.insert(record.vault_address, record.owner);
        self.accounts.insert(record.owner, record);
    }

    /// Remove a record. Its custody address stays registered.
    pub(crate) fn delete(&mut self, owner: &Address) -> Option<AccountRecord> {
        self.accounts.remove(owner)
    }

    pub fn accounts(&self) -> impl Iterator<Item = &AccountRecord> {
        self.accounts.values()
    }

    /// Owner a custody address was bound for, live or retired
    pub fn custody_owner(&self, vault: &Address) -> Option<Address> {
        self.custody.get(vault).copied()
    }

    /// Live record whose custody address is `vault`
    pub fn record_by_vault(&self, vault: &Address) -> Option<&AccountRecord> {
        let owner = self.custody.get(vault)?;
        self.accounts
            .get(owner)
            .filter(|record| record.vault_address == *vault)
    }

    pub(crate) fn record_by_vault_mut(&mut self, vault: &Address) -> Option<&mut AccountRecord> {
        let owner = *self.custody.get(vault)?;
        self.accounts
            .get_mut(&owner)
            .filter(|record| record.vault_address == *vault)
    }

    // ============ Host Balances ============

    pub fn balances(&self) -> &Balances {
        &self.balances
    }

    pub(crate) fn balances_mut(&mut self) -> &mut Balances {
        &mut self.balances
    }
}
