//! Validation Helpers for the wVault Protocol
//!
//! Reusable parameter checks shared by the state machine.
//!
//! ```rust,ignore
//! use wvault_common::check;
//! use wvault_common::validation::require_status_flag;
//!
//! check!(amount > 0, VaultError::ZeroAmount);
//! let enabled = require_status_flag(value, "global_status")?;
//! ```

use crate::constants::status;
use crate::errors::{VaultError, VaultResult};
use crate::types::{Address, ZERO_ADDRESS};

// ============ Validation Macro ============

/// Check a condition and return an error if it fails.
///
/// ```rust,ignore
/// check!(
///     amount <= maximum,
///     VaultError::ExceedsWithdrawLimit { requested: amount, maximum }
/// );
/// ```
#[macro_export]
macro_rules! check {
    ($condition:expr, $error:expr) => {
        if !($condition) {
            return Err($error);
        }
    };
}

// ============ Parameter Helpers ============

/// Require a non-zero amount.
pub fn require_positive(value: u64) -> VaultResult<()> {
    check!(value != 0, VaultError::ZeroAmount);
    Ok(())
}

/// Parse an enable-switch value. Only 0 and 1 are accepted.
pub fn require_status_flag(value: u64, param: &'static str) -> VaultResult<bool> {
    match value {
        status::DISABLED => Ok(false),
        status::ENABLED => Ok(true),
        _ => Err(VaultError::InvalidParameterRange { param, value }),
    }
}

/// Require a fee rate no higher than `max_bps`.
pub fn require_fee_bps(bps: u64, max_bps: u64, param: &'static str) -> VaultResult<()> {
    check!(bps <= max_bps, VaultError::InvalidParameterRange { param, value: bps });
    Ok(())
}

/// Require address to not be zero.
pub fn require_valid_address(address: &Address, param: &'static str) -> VaultResult<()> {
    check!(*address != ZERO_ADDRESS, VaultError::InvalidAddress { param });
    Ok(())
}

// ============ Supply Conservation ============

/// Outstanding supply recorded across accounts must equal what the
/// minter has released into circulation.
pub fn supply_balanced(recorded_minted: u128, circulating: u128) -> bool {
    recorded_minted == circulating
}

/// Sum amounts without overflow.
pub fn sum_amounts<I: IntoIterator<Item = u64>>(amounts: I) -> u128 {
    amounts.into_iter().map(u128::from).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive(1).is_ok());
        assert_eq!(require_positive(0), Err(VaultError::ZeroAmount));
    }

    #[test]
    fn test_status_flag() {
        assert_eq!(require_status_flag(0, "global_status"), Ok(false));
        assert_eq!(require_status_flag(1, "global_status"), Ok(true));
        assert_eq!(
            require_status_flag(2, "global_status"),
            Err(VaultError::InvalidParameterRange { param: "global_status", value: 2 })
        );
        assert!(require_status_flag(10, "account_status").is_err());
    }

    #[test]
    fn test_fee_bps_bound() {
        assert!(require_fee_bps(5_000, 5_000, "mint_fee_bps").is_ok());
        assert_eq!(
            require_fee_bps(5_001, 5_000, "mint_fee_bps"),
            Err(VaultError::InvalidParameterRange { param: "mint_fee_bps", value: 5_001 })
        );
    }

    #[test]
    fn test_valid_address() {
        assert!(require_valid_address(&[1u8; 32], "admin").is_ok());
        assert_eq!(
            require_valid_address(&ZERO_ADDRESS, "minter"),
            Err(VaultError::InvalidAddress { param: "minter" })
        );
    }

    #[test]
    fn test_supply_helpers() {
        let total = sum_amounts([u64::MAX, 1]);
        assert_eq!(total, u64::MAX as u128 + 1);
        assert!(supply_balanced(total, total));
        assert!(!supply_balanced(total, total - 1));
    }
}
