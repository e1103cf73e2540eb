//! Custody Address Derivation
//!
//! A custody address is a pure function of the owner, the identity of the
//! currently deployed program, and the application id. The binding stored
//! in an account record at opt-in is compared against a fresh derivation
//! whenever the two must agree; a difference means the program was
//! replaced after the account opted in.

use sha2::{Digest, Sha256};

use crate::constants::domains::{CUSTODY_DOMAIN, PROGRAM_DOMAIN};
use crate::types::{Address, AppId, ProgramId};

/// Deterministic custody address derivation
pub trait VaultAddressDerivation {
    /// Custody address controlled by `program` on behalf of `owner`
    fn derive_vault_address(&self, owner: &Address, program: &ProgramId, app_id: AppId) -> Address;
}

/// Default derivation: `sha256(domain || app_id_le || program || owner)`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Sha256Derivation;

impl VaultAddressDerivation for Sha256Derivation {
    fn derive_vault_address(&self, owner: &Address, program: &ProgramId, app_id: AppId) -> Address {
        let mut hasher = Sha256::new();
        hasher.update(CUSTODY_DOMAIN);
        hasher.update(app_id.to_le_bytes());
        hasher.update(program);
        hasher.update(owner);
        hasher.finalize().into()
    }
}

/// Identity of a program from its logic bytes
pub fn program_id_from_logic(logic: &[u8]) -> ProgramId {
    let mut hasher = Sha256::new();
    hasher.update(PROGRAM_DOMAIN);
    hasher.update(logic);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivation_is_deterministic() {
        let d = Sha256Derivation;
        let program = program_id_from_logic(b"vault-v1");
        let a = d.derive_vault_address(&[1u8; 32], &program, 7);
        let b = d.derive_vault_address(&[1u8; 32], &program, 7);
        assert_eq!(a, b);
    }

    #[test]
    fn test_each_input_changes_address() {
        let d = Sha256Derivation;
        let v1 = program_id_from_logic(b"vault-v1");
        let v2 = program_id_from_logic(b"vault-v2");
        let base = d.derive_vault_address(&[1u8; 32], &v1, 7);

        assert_ne!(base, d.derive_vault_address(&[2u8; 32], &v1, 7));
        assert_ne!(base, d.derive_vault_address(&[1u8; 32], &v2, 7));
        assert_ne!(base, d.derive_vault_address(&[1u8; 32], &v1, 8));
    }

    #[test]
    fn test_program_id_differs_from_raw_hash() {
        let logic = b"vault-v1";
        let raw: [u8; 32] = Sha256::digest(logic).into();
        assert_ne!(program_id_from_logic(logic), raw);
    }
}
