//! Error Types for the wVault Protocol
//!
//! Every rejection of an atomic group is reported through a single typed
//! error. The state machine is fail-fast: the first violated rule wins and
//! the whole group is discarded.

use crate::types::{Address, AssetId};

/// Result type alias for vault operations
pub type VaultResult<T> = Result<T, VaultError>;

/// Main error enum for all vault protocol errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultError {
    // ============ Authorization Errors ============
    /// Caller does not hold the role the operation requires
    Unauthorized { expected: Address, actual: Address },

    /// Global enable switch is off
    ProtocolDisabled,

    /// Per-account enable switch is off
    AccountDisabled { owner: Address },

    // ============ Collateral Errors ============
    /// Mint (or burn) would exceed what the vault can back
    ExceedsCollateralLimit { requested: u64, maximum: u64 },

    /// Withdrawal larger than the withdrawable amount
    ExceedsWithdrawLimit { requested: u64, maximum: u64 },

    // ============ Group Errors ============
    /// Wrapped-token transfer carries a non-canonical asset id
    AssetMismatch { expected: AssetId, actual: AssetId },

    /// Stored custody address differs from the one derived from current logic
    AddressMismatch { bound: Address, derived: Address },

    /// Companion transfer missing, misdirected or mismatched
    GroupShapeViolation { reason: GroupShapeReason },

    /// Group contains no items
    EmptyGroup,

    // ============ Parameter Errors ============
    /// Parameter outside its accepted range
    InvalidParameterRange { param: &'static str, value: u64 },

    /// Address parameter rejected (zero address or reserved address)
    InvalidAddress { param: &'static str },

    // ============ Account Errors ============
    /// Owner is already opted in
    AccountAlreadyExists { owner: Address },

    /// Owner has no account record
    AccountNotFound { owner: Address },

    /// Exit or teardown attempted while value or minted supply remains
    NonZeroBalanceOnExit { vault_balance: u64, minted_amount: u64 },

    /// Custody address already holds value before opt-in
    VaultNotEmpty { vault: Address, native: u64, wrapped: u64 },

    // ============ Amount / Host Errors ============
    /// Zero amount not allowed
    ZeroAmount,

    /// Host ledger debit larger than the source balance
    InsufficientFunds { address: Address, available: u64, requested: u64 },

    // ============ Math Errors ============
    /// Arithmetic overflow occurred
    Overflow,

    /// Arithmetic underflow occurred
    Underflow,

    // ============ Lifecycle Errors ============
    /// The program was deleted; no further groups are accepted
    ProgramDeleted,
}

/// Why a group failed its shape check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupShapeReason {
    /// Required companion transfer is absent (or sent to the wrong party)
    MissingCompanion,
    /// Companion transfer found but carries the wrong amount
    AmountMismatch,
    /// Value leaves a custody address without an operation authorising it
    UnauthorizedVaultOutflow,
    /// Clear-state bundled with a transfer out of another owner's vault
    CrossAccountClearState,
    /// More items than the host accepts in one group
    TooManyItems,
}

/// Field-less mirror of [`VaultError`] for matching
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthorized,
    ProtocolDisabled,
    AccountDisabled,
    ExceedsCollateralLimit,
    ExceedsWithdrawLimit,
    AssetMismatch,
    AddressMismatch,
    GroupShapeViolation,
    EmptyGroup,
    InvalidParameterRange,
    InvalidAddress,
    AccountAlreadyExists,
    AccountNotFound,
    NonZeroBalanceOnExit,
    VaultNotEmpty,
    ZeroAmount,
    InsufficientFunds,
    Overflow,
    Underflow,
    ProgramDeleted,
}

impl VaultError {
    /// Returns the kind of this error, without its context
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Unauthorized { .. } => ErrorKind::Unauthorized,
            Self::ProtocolDisabled => ErrorKind::ProtocolDisabled,
            Self::AccountDisabled { .. } => ErrorKind::AccountDisabled,
            Self::ExceedsCollateralLimit { .. } => ErrorKind::ExceedsCollateralLimit,
            Self::ExceedsWithdrawLimit { .. } => ErrorKind::ExceedsWithdrawLimit,
            Self::AssetMismatch { .. } => ErrorKind::AssetMismatch,
            Self::AddressMismatch { .. } => ErrorKind::AddressMismatch,
            Self::GroupShapeViolation { .. } => ErrorKind::GroupShapeViolation,
            Self::EmptyGroup => ErrorKind::EmptyGroup,
            Self::InvalidParameterRange { .. } => ErrorKind::InvalidParameterRange,
            Self::InvalidAddress { .. } => ErrorKind::InvalidAddress,
            Self::AccountAlreadyExists { .. } => ErrorKind::AccountAlreadyExists,
            Self::AccountNotFound { .. } => ErrorKind::AccountNotFound,
            Self::NonZeroBalanceOnExit { .. } => ErrorKind::NonZeroBalanceOnExit,
            Self::VaultNotEmpty { .. } => ErrorKind::VaultNotEmpty,
            Self::ZeroAmount => ErrorKind::ZeroAmount,
            Self::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            Self::Overflow => ErrorKind::Overflow,
            Self::Underflow => ErrorKind::Underflow,
            Self::ProgramDeleted => ErrorKind::ProgramDeleted,
        }
    }

    /// Returns a human-readable error code for logging/debugging
    pub fn code(&self) -> &'static str {
        match self {
            Self::Unauthorized { .. } => "E001_UNAUTHORIZED",
            Self::ProtocolDisabled => "E002_PROTOCOL_DISABLED",
            Self::AccountDisabled { .. } => "E003_ACCOUNT_DISABLED",
            Self::ExceedsCollateralLimit { .. } => "E010_EXCEEDS_COLLATERAL",
            Self::ExceedsWithdrawLimit { .. } => "E011_EXCEEDS_WITHDRAW",
            Self::AssetMismatch { .. } => "E020_ASSET_MISMATCH",
            Self::AddressMismatch { .. } => "E021_ADDRESS_MISMATCH",
            Self::GroupShapeViolation { .. } => "E022_GROUP_SHAPE",
            Self::EmptyGroup => "E023_EMPTY_GROUP",
            Self::InvalidParameterRange { .. } => "E030_PARAM_RANGE",
            Self::InvalidAddress { .. } => "E031_INVALID_ADDRESS",
            Self::AccountAlreadyExists { .. } => "E040_ACCOUNT_EXISTS",
            Self::AccountNotFound { .. } => "E041_ACCOUNT_NOT_FOUND",
            Self::NonZeroBalanceOnExit { .. } => "E042_NONZERO_ON_EXIT",
            Self::VaultNotEmpty { .. } => "E043_VAULT_NOT_EMPTY",
            Self::ZeroAmount => "E050_ZERO_AMOUNT",
            Self::InsufficientFunds { .. } => "E051_INSUFFICIENT_FUNDS",
            Self::Overflow => "E080_OVERFLOW",
            Self::Underflow => "E081_UNDERFLOW",
            Self::ProgramDeleted => "E090_PROGRAM_DELETED",
        }
    }

    /// Returns true if the caller can fix this by changing amounts or funding
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ExceedsCollateralLimit { .. }
                | Self::ExceedsWithdrawLimit { .. }
                | Self::InsufficientFunds { .. }
                | Self::ZeroAmount
        )
    }

    /// Shorthand for a group-shape rejection
    pub fn shape(reason: GroupShapeReason) -> Self {
        Self::GroupShapeViolation { reason }
    }
}
