//! wVault Common Library
//!
//! Shared types, constants, and rules for the wVault custody protocol.
//!
//! Each owner keeps native value in a custody address derived from the
//! deployed program, and a single minter issues a wrapped token against it.
//! Everything the state machine needs to decide whether an operation is
//! allowed lives here:
//!
//! - **Data model**: global parameters, account records, operations
//! - **Collateral & Fee Engine**: mint and withdraw ceilings, fee quotes,
//!   the backing invariant
//! - **Authorization Gate**: role and enable-switch checks
//! - **Derivation**: deterministic custody addresses
//! - **Events**: typed event log returned with every committed group
//!
//! This crate is `no_std` compatible when built without the default
//! `std` feature.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(not(feature = "std"))]
extern crate alloc;

// Re-export Vec for submodules based on feature
#[cfg(not(feature = "std"))]
pub use alloc::vec::Vec;
#[cfg(feature = "std")]
pub use std::vec::Vec;

pub mod constants;
pub mod errors;
pub mod types;
pub mod config;
pub mod math;
pub mod collateral;
pub mod access_control;
pub mod events;
pub mod derivation;
pub mod validation;

#[cfg(test)]
mod integration_tests;

// Re-exports for convenience
pub use constants::*;
pub use errors::*;
pub use types::*;
pub use config::*;
pub use math::*;
pub use collateral::*;
pub use access_control::*;
pub use events::*;
pub use derivation::*;
