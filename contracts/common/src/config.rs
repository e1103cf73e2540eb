//! Deployment Configuration
//!
//! Reserve figures and the burn-fee policy. Defaults come from
//! [`crate::constants`]; a deployment on a host with different minimum
//! balances overrides them here.

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Serialize};

use crate::constants::{fees, reserves};
use crate::errors::{VaultError, VaultResult};

/// How a burn fee interacts with the backing check.
///
/// `Historical` reproduces the audited behaviour: fees are deducted from the
/// vault after the gross ceiling check only, so minting to the maximum with
/// a mint fee leaves the account under-collateralized and a later burn never
/// re-checks backing. `Collateralized` prices the mint fee into the mint
/// ceiling and rejects any burn whose fee would leave the remaining supply
/// unbacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub enum BurnFeePolicy {
    Historical,
    #[default]
    Collateralized,
}

/// Per-deployment tunables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, BorshSerialize, BorshDeserialize)]
pub struct VaultConfig {
    /// Balance a custody address must keep while the account is open
    pub min_vault_reserve: u64,
    /// Fee reserved for submitting the withdrawal itself
    pub min_operation_fee: u64,
    /// Upper bound for mint and burn fee rates
    pub max_fee_bps: u64,
    /// Fee-ordering behaviour
    pub burn_fee_policy: BurnFeePolicy,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            min_vault_reserve: reserves::MIN_VAULT_RESERVE,
            min_operation_fee: reserves::MIN_OPERATION_FEE,
            max_fee_bps: fees::MAX_FEE_BPS,
            burn_fee_policy: BurnFeePolicy::default(),
        }
    }
}

impl VaultConfig {
    pub fn with_burn_fee_policy(mut self, policy: BurnFeePolicy) -> Self {
        self.burn_fee_policy = policy;
        self
    }

    pub fn with_reserves(mut self, min_vault_reserve: u64, min_operation_fee: u64) -> Self {
        self.min_vault_reserve = min_vault_reserve;
        self.min_operation_fee = min_operation_fee;
        self
    }

    /// Rejects a fee ceiling above the protocol maximum
    pub fn validate(&self) -> VaultResult<()> {
        if self.max_fee_bps > fees::MAX_FEE_BPS {
            return Err(VaultError::InvalidParameterRange {
                param: "max_fee_bps",
                value: self.max_fee_bps,
            });
        }
        Ok(())
    }
}
