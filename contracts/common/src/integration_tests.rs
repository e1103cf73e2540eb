//! Integration Tests
//!
//! Cross-module checks: the gate and the engine applied in sequence the way
//! the state machine does, and the persisted layout of the data model.

#[cfg(test)]
mod tests {
    use crate::*;

    const ADMIN: Address = [1u8; 32];
    const MINTER: Address = [2u8; 32];
    const OWNER: Address = [3u8; 32];
    const ASSET: AssetId = 4242;

    fn setup() -> (GlobalParameters, VaultConfig, AccountRecord) {
        let params = GlobalParameters::new(ADMIN, MINTER, ASSET);
        let program = program_id_from_logic(b"wvault-approval-v1");
        let vault = Sha256Derivation.derive_vault_address(&OWNER, &program, 1);
        (params, VaultConfig::default(), AccountRecord::new(OWNER, vault))
    }

    /// Gate, then engine, then apply the quote
    fn mint(
        record: &mut AccountRecord,
        params: &GlobalParameters,
        config: &VaultConfig,
        caller: Address,
        amount: u64,
    ) -> VaultResult<FeeQuote> {
        let op = VaultOp::Mint { owner: record.owner, amount };
        authorize(&op, &caller, params, Some(record))?;
        let quote = check_mint(record, params, config, amount)?;
        record.vault_balance = quote.vault_balance_after;
        record.minted_amount = quote.minted_after;
        Ok(quote)
    }

    fn burn(
        record: &mut AccountRecord,
        params: &GlobalParameters,
        config: &VaultConfig,
        amount: u64,
    ) -> VaultResult<FeeQuote> {
        let op = VaultOp::Burn { owner: record.owner, amount };
        authorize(&op, &MINTER, params, Some(record))?;
        let quote = check_burn(record, params, config, amount)?;
        record.vault_balance = quote.vault_balance_after;
        record.minted_amount = quote.minted_after;
        Ok(quote)
    }

    // ============================================================================
    // Gate + Engine
    // ============================================================================

    #[test]
    fn test_mint_burn_cycle_keeps_backing() {
        let (mut params, config, mut record) = setup();
        params.mint_fee_bps = 150;
        params.burn_fee_bps = 150;
        record.vault_balance = 10_000_000;

        let max = max_mint(&record, &params, &config).unwrap();
        let quote = mint(&mut record, &params, &config, MINTER, max).unwrap();
        assert_eq!(quote.fee, fee_for(max, 150).unwrap());
        assert!(is_backed(&record, &config));

        burn(&mut record, &params, &config, max).unwrap();
        assert_eq!(record.minted_amount, 0);
        assert!(is_backed(&record, &config));
        assert_eq!(max_withdraw(&record, &config), record.vault_balance - 101_000);
    }

    #[test]
    fn test_switches_block_only_gated_ops() {
        let (mut params, config, mut record) = setup();
        record.vault_balance = 5_000_000;
        params.global_enabled = false;

        assert_eq!(
            mint(&mut record, &params, &config, MINTER, 1),
            Err(VaultError::ProtocolDisabled)
        );
        assert!(authorize(&VaultOp::Deposit { amount: 1 }, &OWNER, &params, Some(&record)).is_ok());
        assert!(authorize(&VaultOp::SetGlobalStatus { value: 1 }, &ADMIN, &params, None).is_ok());

        params.global_enabled = true;
        record.account_enabled = false;
        assert_eq!(
            mint(&mut record, &params, &config, MINTER, 1),
            Err(VaultError::AccountDisabled { owner: OWNER })
        );
    }

    #[test]
    fn test_only_minter_mints() {
        let (params, config, mut record) = setup();
        record.vault_balance = 5_000_000;
        for caller in [ADMIN, OWNER] {
            let err = mint(&mut record, &params, &config, caller, 1).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Unauthorized);
        }
        assert_eq!(record.minted_amount, 0);
    }

    #[test]
    fn test_fee_bps_ceiling_matches_config() {
        let config = VaultConfig::default();
        assert!(validation::require_fee_bps(config.max_fee_bps, config.max_fee_bps, "mint_fee_bps").is_ok());
        assert!(validation::require_fee_bps(config.max_fee_bps + 1, config.max_fee_bps, "mint_fee_bps").is_err());
    }

    // ============================================================================
    // Persisted Layout
    // ============================================================================

    #[test]
    fn test_record_cbor_layout() {
        let (_, _, mut record) = setup();
        record.vault_balance = 1_234_567;
        record.minted_amount = 1_000;

        let mut bytes = Vec::new();
        ciborium::ser::into_writer(&record, &mut bytes).unwrap();
        let decoded: AccountRecord = ciborium::de::from_reader(bytes.as_slice()).unwrap();
        assert_eq!(decoded, record);

        let value = ciborium::value::Value::serialized(&record).unwrap();
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.iter().filter_map(|(k, _)| k.as_text()).collect();
        assert_eq!(
            keys,
            ["owner", "vault_address", "vault_balance", "minted_amount", "account_enabled"]
        );
    }

    #[test]
    fn test_parameters_borsh_layout() {
        let mut params = GlobalParameters::new(ADMIN, MINTER, ASSET);
        params.creation_fee_amount = 500;
        let bytes = borsh::to_vec(&params).unwrap();
        // Two addresses, four u64 fields and the switch
        assert_eq!(bytes.len(), 32 + 32 + 8 * 4 + 1);
        let decoded: GlobalParameters = borsh::from_slice(&bytes).unwrap();
        assert_eq!(decoded, params);
    }

    #[test]
    fn test_op_encoding_is_stable() {
        let op = VaultOp::SetAccountStatus { owner: OWNER, value: 0 };
        let bytes = borsh::to_vec(&op).unwrap();
        assert_eq!(bytes[0], 8);
        let decoded: VaultOp = borsh::from_slice(&bytes).unwrap();
        assert_eq!(decoded, op);
    }
}
