//! Collateral & Fee Engine
//!
//! Ceilings for mint and withdraw, fee quotes, and the backing invariant.
//! Every check here is pure: it reads a record, the global parameters and
//! the deployment config, and either returns a quote or the rule it broke.
//!
//! ## Backing
//!
//! An account is backed when
//!
//! ```text
//! minted_amount <= vault_balance - min_vault_reserve
//! ```
//!
//! Under [`BurnFeePolicy::Collateralized`] every committed operation keeps
//! this true. Under [`BurnFeePolicy::Historical`] the mint fee is taken from
//! the vault after the gross ceiling check, so it can be broken.

use crate::config::{BurnFeePolicy, VaultConfig};
use crate::errors::{VaultError, VaultResult};
use crate::math::{fee_for, floored_sub, max_amount_with_fee, safe_add, safe_sub};
use crate::types::{AccountRecord, GlobalParameters};

/// Fee quote for a mint or burn
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeQuote {
    /// Amount minted or burned
    pub amount: u64,
    /// Native fee taken from the vault and paid to the minter
    pub fee: u64,
    /// Vault balance after the fee
    pub vault_balance_after: u64,
    /// Minted amount after the operation
    pub minted_after: u64,
}

/// Mint fee for `amount` at the current rate
pub fn mint_fee(params: &GlobalParameters, amount: u64) -> VaultResult<u64> {
    fee_for(amount, params.mint_fee_bps)
}

/// Burn fee for `amount` at the current rate
pub fn burn_fee(params: &GlobalParameters, amount: u64) -> VaultResult<u64> {
    fee_for(amount, params.burn_fee_bps)
}

/// Gross mint headroom: `vault_balance - minted_amount - min_vault_reserve`, floored at 0
pub fn mint_headroom(record: &AccountRecord, config: &VaultConfig) -> u64 {
    floored_sub(record.vault_balance, &[record.minted_amount, config.min_vault_reserve])
}

/// Largest amount that can be minted right now
///
/// `Historical`: the gross headroom.
/// `Collateralized`: the largest amount whose fee also fits in the headroom.
pub fn max_mint(
    record: &AccountRecord,
    params: &GlobalParameters,
    config: &VaultConfig,
) -> VaultResult<u64> {
    let headroom = mint_headroom(record, config);
    match config.burn_fee_policy {
        BurnFeePolicy::Historical => Ok(headroom),
        BurnFeePolicy::Collateralized => max_amount_with_fee(headroom, params.mint_fee_bps),
    }
}

/// Largest amount that can be withdrawn right now
///
/// `vault_balance - minted_amount - min_vault_reserve - min_operation_fee`, floored at 0
pub fn max_withdraw(record: &AccountRecord, config: &VaultConfig) -> u64 {
    floored_sub(
        record.vault_balance,
        &[record.minted_amount, config.min_vault_reserve, config.min_operation_fee],
    )
}

/// Returns true if the minted supply is covered by the vault net of the reserve
pub fn is_backed(record: &AccountRecord, config: &VaultConfig) -> bool {
    match record.vault_balance.checked_sub(config.min_vault_reserve) {
        Some(net) => record.minted_amount <= net,
        None => record.minted_amount == 0,
    }
}

/// Validate a mint of `amount` and quote its fee
pub fn check_mint(
    record: &AccountRecord,
    params: &GlobalParameters,
    config: &VaultConfig,
    amount: u64,
) -> VaultResult<FeeQuote> {
    if amount == 0 {
        return Err(VaultError::ZeroAmount);
    }

    let maximum = max_mint(record, params, config)?;
    if amount > maximum {
        return Err(VaultError::ExceedsCollateralLimit {
            requested: amount,
            maximum,
        });
    }

    let fee = mint_fee(params, amount)?;
    let vault_balance_after = safe_sub(record.vault_balance, fee)?;
    let minted_after = safe_add(record.minted_amount, amount)?;

    Ok(FeeQuote {
        amount,
        fee,
        vault_balance_after,
        minted_after,
    })
}

/// Validate a burn of `amount` and quote its fee
pub fn check_burn(
    record: &AccountRecord,
    params: &GlobalParameters,
    config: &VaultConfig,
    amount: u64,
) -> VaultResult<FeeQuote> {
    if amount == 0 {
        return Err(VaultError::ZeroAmount);
    }

    if amount > record.minted_amount {
        return Err(VaultError::ExceedsCollateralLimit {
            requested: amount,
            maximum: record.minted_amount,
        });
    }

    let fee = burn_fee(params, amount)?;
    let vault_balance_after = record.vault_balance.checked_sub(fee).ok_or(
        VaultError::InsufficientFunds {
            address: record.vault_address,
            available: record.vault_balance,
            requested: fee,
        },
    )?;
    let minted_after = safe_sub(record.minted_amount, amount)?;

    if config.burn_fee_policy == BurnFeePolicy::Collateralized {
        let after = AccountRecord {
            vault_balance: vault_balance_after,
            minted_amount: minted_after,
            ..record.clone()
        };
        if !is_backed(&after, config) {
            return Err(VaultError::ExceedsCollateralLimit {
                requested: minted_after,
                maximum: floored_sub(vault_balance_after, &[config.min_vault_reserve]),
            });
        }
    }

    Ok(FeeQuote {
        amount,
        fee,
        vault_balance_after,
        minted_after,
    })
}

/// Validate a withdrawal of `amount`
pub fn check_withdraw(record: &AccountRecord, config: &VaultConfig, amount: u64) -> VaultResult<u64> {
    if amount == 0 {
        return Err(VaultError::ZeroAmount);
    }

    let maximum = max_withdraw(record, config);
    if amount > maximum {
        return Err(VaultError::ExceedsWithdrawLimit {
            requested: amount,
            maximum,
        });
    }

    safe_sub(record.vault_balance, amount)
}
