//! Protocol Constants
//!
//! All magic numbers and default configuration values for the vault.
//! The reserve figures match the host ledger the protocol was first
//! deployed on; deployments that differ override them through
//! [`crate::config::VaultConfig`].

/// Wrapped Token Metadata
pub mod token {
    /// Decimal places (same as the native currency)
    pub const DECIMALS: u8 = 6;
    /// One unit with decimals (1 token = 1_000_000 base units)
    pub const ONE: u64 = 1_000_000;
}

/// Fee Configuration (in basis points, 100 = 1%)
pub mod fees {
    /// Basis points denominator
    pub const BPS_DENOMINATOR: u64 = 10_000;

    /// Highest mint or burn fee the admin may set (50%)
    pub const MAX_FEE_BPS: u64 = 5_000;

    /// Fees at deployment
    pub const DEFAULT_MINT_FEE_BPS: u64 = 0;
    pub const DEFAULT_BURN_FEE_BPS: u64 = 0;
    pub const DEFAULT_CREATION_FEE: u64 = 0;
}

/// Host ledger reserves
pub mod reserves {
    /// Minimum balance a custody sub-account must keep to stay open
    pub const MIN_VAULT_RESERVE: u64 = 100_000;

    /// Fee required to submit a single transaction
    pub const MIN_OPERATION_FEE: u64 = 1_000;
}

/// Status flag values accepted by the enable switches
pub mod status {
    pub const DISABLED: u64 = 0;
    pub const ENABLED: u64 = 1;
}

/// Group limits
pub mod limits {
    /// Maximum number of items in one atomic group
    pub const MAX_GROUP_SIZE: usize = 16;
}

/// Address derivation domain separators
pub mod domains {
    /// Prefix hashed in front of every custody address derivation
    pub const CUSTODY_DOMAIN: &[u8] = b"wvault/custody";

    /// Prefix hashed in front of program logic to get its identity
    pub const PROGRAM_DOMAIN: &[u8] = b"wvault/program";
}
