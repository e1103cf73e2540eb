//! Vault State Machine
//!
//! Evaluates one atomic group against a staged copy of the store.
//!
//! ## Evaluation
//!
//! 1. Every call addressed to this application runs in group order. Each
//!    operation passes the authorization gate, the collateral engine, and
//!    then claims the companion transfers it needs. A transfer can be
//!    claimed once.
//! 2. The group as a whole is then checked: a clear-state may not travel
//!    with a transfer out of another owner's custody address, and no
//!    unclaimed transfer may leave any custody address.
//! 3. Transfers are applied to host balances in group order. Unclaimed
//!    payments into a live custody address are credited to its record.
//!
//! Any error aborts the group; the staged store is dropped.

use wvault_common::{
    access_control::authorize,
    collateral::{check_burn, check_mint, check_withdraw},
    config::VaultConfig,
    derivation::VaultAddressDerivation,
    errors::{GroupShapeReason, VaultError, VaultResult},
    events::{EventLog, VaultEvent},
    math::safe_add,
    types::{AccountRecord, Address, AppId, AssetId, GlobalParameters, ProgramId, VaultOp},
    validation::{require_fee_bps, require_positive, require_status_flag, require_valid_address},
    check,
};

use crate::group::{AppCall, GroupItem};
use crate::store::VaultStore;

// ============ Group Context ============

/// State of one group while it is being evaluated
pub struct GroupContext<'a, D> {
    /// Staged copy of the store
    pub store: VaultStore,
    /// Events emitted so far
    pub events: EventLog,
    items: &'a [GroupItem],
    claimed: Vec<bool>,
    /// Owners cleared in this group
    cleared: Vec<Address>,
    app_id: AppId,
    config: &'a VaultConfig,
    deriver: &'a D,
}

impl<'a, D: VaultAddressDerivation> GroupContext<'a, D> {
    pub fn new(
        store: VaultStore,
        items: &'a [GroupItem],
        app_id: AppId,
        config: &'a VaultConfig,
        deriver: &'a D,
    ) -> Self {
        Self {
            store,
            events: EventLog::new(),
            items,
            claimed: vec![false; items.len()],
            cleared: Vec::new(),
            app_id,
            config,
            deriver,
        }
    }

    fn params(&self) -> VaultResult<&GlobalParameters> {
        self.store.globals().ok_or(VaultError::ProgramDeleted)
    }

    fn record(&self, owner: &Address) -> VaultResult<&AccountRecord> {
        self.store
            .get(owner)
            .ok_or(VaultError::AccountNotFound { owner: *owner })
    }

    fn derive(&self, owner: &Address, program: &ProgramId) -> Address {
        self.deriver.derive_vault_address(owner, program, self.app_id)
    }

    // ============ Companion Claims ============

    /// Claim an unclaimed payment `sender -> receiver` of exactly `amount`
    fn claim_payment(&mut self, sender: Address, receiver: Address, amount: u64) -> VaultResult<()> {
        let mut amount_seen = false;
        for (index, item) in self.items.iter().enumerate() {
            if self.claimed[index] {
                continue;
            }
            if let GroupItem::Payment(payment) = item {
                if payment.sender != sender || payment.receiver != receiver {
                    continue;
                }
                if payment.amount == amount {
                    self.claimed[index] = true;
                    return Ok(());
                }
                amount_seen = true;
            }
        }

        Err(VaultError::shape(if amount_seen {
            GroupShapeReason::AmountMismatch
        } else {
            GroupShapeReason::MissingCompanion
        }))
    }

    /// Claim an unclaimed asset transfer of exactly `amount` of `asset_id`
    fn claim_asset_transfer(
        &mut self,
        asset_id: AssetId,
        sender: Address,
        receiver: Address,
        amount: u64,
    ) -> VaultResult<()> {
        let mut foreign_asset = None;
        let mut amount_seen = false;
        for (index, item) in self.items.iter().enumerate() {
            if self.claimed[index] {
                continue;
            }
            if let GroupItem::AssetTransfer(transfer) = item {
                if transfer.sender != sender || transfer.receiver != receiver {
                    continue;
                }
                if transfer.asset_id != asset_id {
                    foreign_asset.get_or_insert(transfer.asset_id);
                } else if transfer.amount == amount {
                    self.claimed[index] = true;
                    return Ok(());
                } else {
                    amount_seen = true;
                }
            }
        }

        if let Some(actual) = foreign_asset {
            return Err(VaultError::AssetMismatch { expected: asset_id, actual });
        }
        Err(VaultError::shape(if amount_seen {
            GroupShapeReason::AmountMismatch
        } else {
            GroupShapeReason::MissingCompanion
        }))
    }

    /// Fee payment from a vault to the minter, when there is a fee
    fn claim_fee(&mut self, vault: Address, minter: Address, fee: u64) -> VaultResult<()> {
        if fee == 0 {
            return Ok(());
        }
        self.claim_payment(vault, minter, fee)
    }

    // ============ Group Checks ============

    /// Whole-group checks and host settlement, after every call has run
    pub fn finish(&mut self) -> VaultResult<()> {
        self.check_clear_state()?;
        self.check_vault_outflows()?;
        self.settle()
    }

    /// A clear-state must not travel with a transfer out of someone else's vault
    fn check_clear_state(&self) -> VaultResult<()> {
        for cleared in &self.cleared {
            for item in self.items.iter().filter(|item| item.is_transfer()) {
                let sender = item.sender();
                match self.store.custody_owner(&sender) {
                    Some(owner) if owner != *cleared => {
                        return Err(VaultError::shape(GroupShapeReason::CrossAccountClearState));
                    }
                    _ => {}
                }
            }
        }
        Ok(())
    }

    /// Custody outflows need an operation that claimed them
    fn check_vault_outflows(&self) -> VaultResult<()> {
        for (index, item) in self.items.iter().enumerate() {
            if !item.is_transfer() || self.claimed[index] {
                continue;
            }
            check!(
                self.store.custody_owner(&item.sender()).is_none(),
                VaultError::shape(GroupShapeReason::UnauthorizedVaultOutflow)
            );
        }
        Ok(())
    }

    /// Apply every transfer to host balances
    fn settle(&mut self) -> VaultResult<()> {
        for (index, item) in self.items.iter().enumerate() {
            match item {
                GroupItem::Call(_) => {}
                GroupItem::Payment(payment) => {
                    let balances = self.store.balances_mut();
                    balances.debit_native(payment.sender, payment.amount)?;
                    balances.credit_native(payment.receiver, payment.amount)?;

                    if self.claimed[index] {
                        continue;
                    }
                    if let Some(record) = self.store.record_by_vault_mut(&payment.receiver) {
                        record.vault_balance = safe_add(record.vault_balance, payment.amount)?;
                        let event = VaultEvent::DirectDeposit {
                            owner: record.owner,
                            amount: payment.amount,
                            new_balance: record.vault_balance,
                        };
                        self.events.emit(event);
                    }
                }
                GroupItem::AssetTransfer(transfer) => {
                    let balances = self.store.balances_mut();
                    balances.debit_asset(transfer.sender, transfer.asset_id, transfer.amount)?;
                    balances.credit_asset(transfer.receiver, transfer.asset_id, transfer.amount)?;
                }
            }
        }
        Ok(())
    }
}

// ============ Dispatch ============

/// Run one call against the staged store
///
/// Calls for other applications are not evaluated and authorize nothing.
pub fn apply<D: VaultAddressDerivation>(ctx: &mut GroupContext<'_, D>, call: &AppCall) -> VaultResult<()> {
    if call.app_id != ctx.app_id {
        return Ok(());
    }

    let params = ctx.params()?.clone();
    let caller = call.sender;
    let record = call
        .op
        .affected_owner(caller)
        .and_then(|owner| ctx.store.get(&owner));
    authorize(&call.op, &caller, &params, record)?;

    match &call.op {
        VaultOp::OptIn => apply_opt_in(ctx, &params, caller),
        VaultOp::Deposit { amount } => apply_deposit(ctx, caller, *amount),
        VaultOp::Withdraw { amount } => apply_withdraw(ctx, caller, *amount),
        VaultOp::Mint { owner, amount } => apply_mint(ctx, &params, owner, *amount),
        VaultOp::Burn { owner, amount } => apply_burn(ctx, &params, owner, *amount),
        VaultOp::CloseOut => apply_close_out(ctx, caller),
        VaultOp::ClearState => apply_clear_state(ctx, caller),
        VaultOp::SetGlobalStatus { value } => {
            let enabled = require_status_flag(*value, "global_status")?;
            ctx.store.globals_mut()?.global_enabled = enabled;
            ctx.events.emit(VaultEvent::GlobalStatusChanged { enabled });
            Ok(())
        }
        VaultOp::SetAccountStatus { owner, value } => apply_set_account_status(ctx, owner, *value),
        VaultOp::SetMintFee { bps } => {
            require_fee_bps(*bps, ctx.config.max_fee_bps, "mint_fee_bps")?;
            let globals = ctx.store.globals_mut()?;
            let old_bps = core::mem::replace(&mut globals.mint_fee_bps, *bps);
            ctx.events.emit(VaultEvent::MintFeeChanged { old_bps, new_bps: *bps });
            Ok(())
        }
        VaultOp::SetBurnFee { bps } => {
            require_fee_bps(*bps, ctx.config.max_fee_bps, "burn_fee_bps")?;
            let globals = ctx.store.globals_mut()?;
            let old_bps = core::mem::replace(&mut globals.burn_fee_bps, *bps);
            ctx.events.emit(VaultEvent::BurnFeeChanged { old_bps, new_bps: *bps });
            Ok(())
        }
        VaultOp::SetCreationFee { amount } => {
            let globals = ctx.store.globals_mut()?;
            let old_amount = core::mem::replace(&mut globals.creation_fee_amount, *amount);
            ctx.events.emit(VaultEvent::CreationFeeChanged { old_amount, new_amount: *amount });
            Ok(())
        }
        VaultOp::SetAdmin { new_admin } => {
            require_valid_address(new_admin, "new_admin")?;
            let globals = ctx.store.globals_mut()?;
            let old_admin = core::mem::replace(&mut globals.admin, *new_admin);
            ctx.events.emit(VaultEvent::AdminChanged { old_admin, new_admin: *new_admin });
            Ok(())
        }
        VaultOp::SetMinter { new_minter } => {
            require_valid_address(new_minter, "new_minter")?;
            let globals = ctx.store.globals_mut()?;
            let old_minter = core::mem::replace(&mut globals.minter, *new_minter);
            ctx.events.emit(VaultEvent::MinterChanged { old_minter, new_minter: *new_minter });
            Ok(())
        }
        VaultOp::UpdateProgram { program } => {
            require_valid_address(program, "program")?;
            let old_program = ctx.store.program_id();
            ctx.store.set_program_id(*program);
            ctx.events.emit(VaultEvent::ProgramUpdated { old_program, new_program: *program });
            Ok(())
        }
        VaultOp::DeleteProgram => apply_delete_program(ctx, caller),
    }
}

// ============ Account Operations ============

fn apply_opt_in<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    params: &GlobalParameters,
    owner: Address,
) -> VaultResult<()> {
    check!(
        ctx.store.get(&owner).is_none(),
        VaultError::AccountAlreadyExists { owner }
    );

    let vault = ctx.derive(&owner, &ctx.store.program_id());
    let native = ctx.store.balances().native(&vault);
    let wrapped = ctx.store.balances().asset(&vault, params.wrapped_asset_id);
    check!(
        native == 0 && wrapped == 0,
        VaultError::VaultNotEmpty { vault, native, wrapped }
    );

    let creation_fee = params.creation_fee_amount;
    ctx.claim_fee(owner, params.minter, creation_fee)?;

    ctx.store.put(AccountRecord::new(owner, vault));
    ctx.events.emit(VaultEvent::AccountOptedIn { owner, vault, creation_fee });
    Ok(())
}

fn apply_deposit<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    owner: Address,
    amount: u64,
) -> VaultResult<()> {
    require_positive(amount)?;
    let vault = ctx.record(&owner)?.vault_address;
    ctx.claim_payment(owner, vault, amount)?;

    let record = ctx
        .store
        .get_mut(&owner)
        .ok_or(VaultError::AccountNotFound { owner })?;
    record.vault_balance = safe_add(record.vault_balance, amount)?;
    let new_balance = record.vault_balance;

    ctx.events.emit(VaultEvent::Deposited { owner, amount, new_balance });
    Ok(())
}

fn apply_withdraw<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    owner: Address,
    amount: u64,
) -> VaultResult<()> {
    let record = ctx.record(&owner)?;
    let new_balance = check_withdraw(record, ctx.config, amount)?;
    let vault = record.vault_address;
    ctx.claim_payment(vault, owner, amount)?;

    if let Some(record) = ctx.store.get_mut(&owner) {
        record.vault_balance = new_balance;
    }
    ctx.events.emit(VaultEvent::Withdrawn { owner, amount, new_balance });
    Ok(())
}

fn apply_mint<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    params: &GlobalParameters,
    owner: &Address,
    amount: u64,
) -> VaultResult<()> {
    let record = ctx.record(owner)?;
    let quote = check_mint(record, params, ctx.config, amount)?;
    let vault = record.vault_address;

    ctx.claim_asset_transfer(params.wrapped_asset_id, params.minter, *owner, amount)?;
    ctx.claim_fee(vault, params.minter, quote.fee)?;

    if let Some(record) = ctx.store.get_mut(owner) {
        record.vault_balance = quote.vault_balance_after;
        record.minted_amount = quote.minted_after;
    }
    ctx.events.emit(VaultEvent::Minted {
        owner: *owner,
        amount,
        fee: quote.fee,
        new_minted: quote.minted_after,
    });
    Ok(())
}

fn apply_burn<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    params: &GlobalParameters,
    owner: &Address,
    amount: u64,
) -> VaultResult<()> {
    let record = ctx.record(owner)?;
    let quote = check_burn(record, params, ctx.config, amount)?;
    let vault = record.vault_address;

    ctx.claim_asset_transfer(params.wrapped_asset_id, *owner, params.minter, amount)?;
    ctx.claim_fee(vault, params.minter, quote.fee)?;

    if let Some(record) = ctx.store.get_mut(owner) {
        record.vault_balance = quote.vault_balance_after;
        record.minted_amount = quote.minted_after;
    }
    ctx.events.emit(VaultEvent::Burned {
        owner: *owner,
        amount,
        fee: quote.fee,
        new_minted: quote.minted_after,
    });
    Ok(())
}

fn apply_close_out<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    owner: Address,
) -> VaultResult<()> {
    let record = ctx.record(&owner)?.clone();
    check!(
        record.minted_amount == 0,
        VaultError::NonZeroBalanceOnExit {
            vault_balance: record.vault_balance,
            minted_amount: record.minted_amount,
        }
    );

    let derived = ctx.derive(&owner, &ctx.store.program_id());
    check!(
        derived == record.vault_address,
        VaultError::AddressMismatch { bound: record.vault_address, derived }
    );

    if record.vault_balance > 0 {
        ctx.claim_payment(record.vault_address, owner, record.vault_balance)
            .map_err(|_| VaultError::NonZeroBalanceOnExit {
                vault_balance: record.vault_balance,
                minted_amount: 0,
            })?;
    }

    ctx.store.delete(&owner);
    ctx.events.emit(VaultEvent::AccountClosed { owner, swept: record.vault_balance });
    Ok(())
}

fn apply_clear_state<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    owner: Address,
) -> VaultResult<()> {
    let record = ctx
        .store
        .delete(&owner)
        .ok_or(VaultError::AccountNotFound { owner })?;
    ctx.cleared.push(owner);
    ctx.events.emit(VaultEvent::AccountCleared {
        owner,
        abandoned: record.vault_balance,
        outstanding_minted: record.minted_amount,
    });
    Ok(())
}

// ============ Admin Operations ============

fn apply_set_account_status<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    owner: &Address,
    value: u64,
) -> VaultResult<()> {
    let enabled = require_status_flag(value, "account_status")?;
    let record = ctx
        .store
        .get_mut(owner)
        .ok_or(VaultError::AccountNotFound { owner: *owner })?;
    record.account_enabled = enabled;
    ctx.events.emit(VaultEvent::AccountStatusChanged { owner: *owner, enabled });
    Ok(())
}

fn apply_delete_program<D: VaultAddressDerivation>(
    ctx: &mut GroupContext<'_, D>,
    admin: Address,
) -> VaultResult<()> {
    if let Some(record) = ctx.store.accounts().find(|record| record.has_position()) {
        return Err(VaultError::NonZeroBalanceOnExit {
            vault_balance: record.vault_balance,
            minted_amount: record.minted_amount,
        });
    }

    ctx.store.teardown();
    ctx.events.emit(VaultEvent::ProgramDeleted { admin });
    Ok(())
}
