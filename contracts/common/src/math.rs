//! Mathematical Utilities for the wVault Protocol
//!
//! Checked arithmetic and basis-point fee calculations.

use crate::constants::fees;
use crate::errors::{VaultError, VaultResult};

/// Fee for `amount` at `bps`, rounded up
///
/// fee = ceil(amount * bps / 10000)
pub fn fee_for(amount: u64, bps: u64) -> VaultResult<u64> {
    let scaled = safe_mul(amount, bps)?;
    let denominator = fees::BPS_DENOMINATOR as u128;
    let fee = scaled
        .checked_add(denominator - 1)
        .ok_or(VaultError::Overflow)?
        / denominator;
    u64::try_from(fee).map_err(|_| VaultError::Overflow)
}

/// Largest `a` such that `a + fee_for(a, bps) <= headroom`
///
/// a + ceil(a * bps / D) <= H  <=>  a * (D + bps) <= H * D
pub fn max_amount_with_fee(headroom: u64, bps: u64) -> VaultResult<u64> {
    let denominator = fees::BPS_DENOMINATOR as u128;
    let numerator = safe_mul(headroom, fees::BPS_DENOMINATOR)?;
    let divisor = denominator
        .checked_add(bps as u128)
        .ok_or(VaultError::Overflow)?;
    u64::try_from(numerator / divisor).map_err(|_| VaultError::Overflow)
}

/// Safe addition with overflow check
pub fn safe_add(a: u64, b: u64) -> VaultResult<u64> {
    a.checked_add(b).ok_or(VaultError::Overflow)
}

/// Safe subtraction with underflow check
pub fn safe_sub(a: u64, b: u64) -> VaultResult<u64> {
    a.checked_sub(b).ok_or(VaultError::Underflow)
}

/// Safe multiplication into u128
pub fn safe_mul(a: u64, b: u64) -> VaultResult<u128> {
    (a as u128).checked_mul(b as u128).ok_or(VaultError::Overflow)
}

/// `a - b - c - ...`, floored at zero
pub fn floored_sub(a: u64, terms: &[u64]) -> u64 {
    terms.iter().fold(a, |acc, &t| acc.saturating_sub(t))
}
