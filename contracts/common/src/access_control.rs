//! Access Control Module
//!
//! The single authorization gate every operation passes before it may
//! mutate anything. Rules are evaluated in a fixed order:
//!
//! 1. Role: admin-only ops need the admin, mint/burn need the minter,
//!    self-service ops act on the caller's own record.
//! 2. Switches: withdraw/mint/burn need the global switch and the
//!    affected account's switch on.
//!
//! A role failure is always reported as `Unauthorized`, before any switch is
//! looked at.

use crate::errors::{VaultError, VaultResult};
use crate::types::{AccountRecord, Address, GlobalParameters, OperationClass, VaultOp, ZERO_ADDRESS};

/// Protocol roles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Controls parameters and the program lifecycle
    Admin,
    /// Executes mint and burn on behalf of owners
    Minter,
    /// Any other identity
    User,
}

/// Resolve the role an address holds
pub fn role_of(params: &GlobalParameters, address: &Address) -> Role {
    if is_admin(params, address) {
        Role::Admin
    } else if is_minter(params, address) {
        Role::Minter
    } else {
        Role::User
    }
}

/// Returns true if the address is the current admin
pub fn is_admin(params: &GlobalParameters, address: &Address) -> bool {
    *address == params.admin
}

/// Returns true if the address is the current minter
pub fn is_minter(params: &GlobalParameters, address: &Address) -> bool {
    *address == params.minter
}

/// Decide whether `caller` may run `op`.
///
/// `record` is the affected owner's record as seen by the group so far
/// (`None` if that owner is not opted in). Record existence is only
/// enforced here for operations the switches apply to, and for mint/burn;
/// the state machine checks the rest as part of each operation.
pub fn authorize(
    op: &VaultOp,
    caller: &Address,
    params: &GlobalParameters,
    record: Option<&AccountRecord>,
) -> VaultResult<()> {
    match op.class() {
        OperationClass::AdminOnly => require_role(params.admin, caller)?,
        OperationClass::MinterOnly => require_role(params.minter, caller)?,
        OperationClass::SelfService => {
            if let Some(record) = record {
                require_role(record.owner, caller)?;
            }
            // The admin identity never holds a vault
            if *op == VaultOp::OptIn && is_admin(params, caller) {
                return Err(VaultError::Unauthorized {
                    expected: ZERO_ADDRESS,
                    actual: *caller,
                });
            }
        }
    }

    if op.requires_enabled() {
        if !params.global_enabled {
            return Err(VaultError::ProtocolDisabled);
        }
        let owner = op.affected_owner(*caller).unwrap_or(*caller);
        let record = record.ok_or(VaultError::AccountNotFound { owner })?;
        if !record.account_enabled {
            return Err(VaultError::AccountDisabled { owner });
        }
    } else if op.class() == OperationClass::MinterOnly && record.is_none() {
        let owner = op.affected_owner(*caller).unwrap_or(*caller);
        return Err(VaultError::AccountNotFound { owner });
    }

    Ok(())
}

fn require_role(expected: Address, caller: &Address) -> VaultResult<()> {
    if expected != *caller {
        return Err(VaultError::Unauthorized {
            expected,
            actual: *caller,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Address = [1u8; 32];
    const MINTER: Address = [2u8; 32];
    const USER: Address = [3u8; 32];

    fn params() -> GlobalParameters {
        GlobalParameters::new(ADMIN, MINTER, 77)
    }

    fn user_record() -> AccountRecord {
        AccountRecord::new(USER, [9u8; 32])
    }

    #[test]
    fn test_roles() {
        let p = params();
        assert_eq!(role_of(&p, &ADMIN), Role::Admin);
        assert_eq!(role_of(&p, &MINTER), Role::Minter);
        assert_eq!(role_of(&p, &USER), Role::User);
    }

    #[test]
    fn test_admin_ops_reject_everyone_else() {
        let p = params();
        let ops = [
            VaultOp::SetGlobalStatus { value: 0 },
            VaultOp::SetAccountStatus { owner: USER, value: 0 },
            VaultOp::SetMintFee { bps: 300 },
            VaultOp::SetBurnFee { bps: 300 },
            VaultOp::SetCreationFee { amount: 300 },
            VaultOp::SetAdmin { new_admin: USER },
            VaultOp::SetMinter { new_minter: USER },
            VaultOp::UpdateProgram { program: [5u8; 32] },
            VaultOp::DeleteProgram,
        ];
        for op in ops.iter() {
            for caller in [USER, MINTER] {
                let err = authorize(op, &caller, &p, None).unwrap_err();
                assert_eq!(err, VaultError::Unauthorized { expected: ADMIN, actual: caller });
            }
            assert!(authorize(op, &ADMIN, &p, None).is_ok());
        }
    }

    #[test]
    fn test_mint_requires_minter_before_switches() {
        let mut p = params();
        p.global_enabled = false;
        let record = user_record();
        let op = VaultOp::Mint { owner: USER, amount: 10 };
        let err = authorize(&op, &USER, &p, Some(&record)).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));

        let err = authorize(&op, &MINTER, &p, Some(&record)).unwrap_err();
        assert_eq!(err, VaultError::ProtocolDisabled);
    }

    #[test]
    fn test_account_switch() {
        let p = params();
        let mut record = user_record();
        record.account_enabled = false;
        let err = authorize(&VaultOp::Withdraw { amount: 1 }, &USER, &p, Some(&record)).unwrap_err();
        assert_eq!(err, VaultError::AccountDisabled { owner: USER });

        // Deposits are not gated
        assert!(authorize(&VaultOp::Deposit { amount: 1 }, &USER, &p, Some(&record)).is_ok());
    }

    #[test]
    fn test_mint_for_unknown_owner() {
        let p = params();
        let op = VaultOp::Burn { owner: USER, amount: 1 };
        assert_eq!(
            authorize(&op, &MINTER, &p, None),
            Err(VaultError::AccountNotFound { owner: USER })
        );
    }

    #[test]
    fn test_admin_cannot_opt_in() {
        let p = params();
        let err = authorize(&VaultOp::OptIn, &ADMIN, &p, None).unwrap_err();
        assert!(matches!(err, VaultError::Unauthorized { .. }));
        assert!(authorize(&VaultOp::OptIn, &USER, &p, None).is_ok());
    }

    #[test]
    fn test_self_service_on_foreign_record() {
        let p = params();
        let record = user_record();
        let err = authorize(&VaultOp::CloseOut, &MINTER, &p, Some(&record)).unwrap_err();
        assert_eq!(err, VaultError::Unauthorized { expected: USER, actual: MINTER });
    }
}
