use crate::core::connection::SolConnection;
use crate::error::{Result, SmartAccountSdkError};
use smart_account_interface::Settings;
use solana_sdk::pubkey::Pubkey;

//=============================================================================
// PDA Derivation Helpers
//=============================================================================

/// Derive the vault PDA executing transactions for `account_index`
pub fn derive_smart_account_pda(
    program_id: &Pubkey,
    settings: &Pubkey,
    account_index: u8,
) -> (Pubkey, u8) {
    smart_account_interface::find_smart_account_address(settings, account_index, program_id)
}

/// Derive the transaction record and proposal PDAs for `transaction_index`
pub fn derive_transaction_pdas(
    program_id: &Pubkey,
    settings: &Pubkey,
    transaction_index: u64,
) -> (Pubkey, Pubkey) {
    let (transaction, _) =
        smart_account_interface::find_transaction_address(settings, transaction_index, program_id);
    let (proposal, _) =
        smart_account_interface::find_proposal_address(settings, transaction_index, program_id);
    (transaction, proposal)
}

/// Derive the first `count` ephemeral signer PDAs of a transaction
pub fn derive_ephemeral_signers(
    program_id: &Pubkey,
    transaction: &Pubkey,
    count: u8,
) -> Vec<Pubkey> {
    (0..count)
        .map(|index| {
            smart_account_interface::find_ephemeral_signer_address(transaction, index, program_id).0
        })
        .collect()
}

//=============================================================================
// Account Fetching & Parsing
//=============================================================================

/// Fetch raw account data from the blockchain
pub async fn fetch_account_data(
    connection: &impl SolConnection,
    address: &Pubkey,
) -> Result<Vec<u8>> {
    let account = connection
        .get_account(address)
        .await
        .map_err(|e| SmartAccountSdkError::Connection(e.to_string()))?
        .ok_or(SmartAccountSdkError::AccountNotFound(*address))?;

    Ok(account.data)
}

/// Fetch and parse a settings account
pub async fn fetch_settings(
    connection: &impl SolConnection,
    settings: &Pubkey,
) -> Result<Settings> {
    let data = fetch_account_data(connection, settings).await?;
    parse_settings(&data)
}

pub fn parse_settings(data: &[u8]) -> Result<Settings> {
    Settings::try_from_account_data(data).map_err(|e| {
        SmartAccountSdkError::InvalidAccountData(format!("Failed to parse settings: {e}"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use smart_account_interface::{Permissions, SmartAccountSigner};

    #[test]
    fn test_parse_settings_ignores_trailing_space() {
        let settings = Settings {
            seed: Pubkey::new_unique(),
            settings_authority: Pubkey::default(),
            threshold: 1,
            time_lock: 0,
            transaction_index: 4,
            stale_transaction_index: 0,
            rent_collector: None,
            bump: 254,
            signers: vec![SmartAccountSigner {
                key: Pubkey::new_unique(),
                permissions: Permissions::ALL,
            }],
        };
        let mut data = settings.to_account_data().unwrap();
        data.extend_from_slice(&[0; 64]);
        assert_eq!(parse_settings(&data).unwrap(), settings);
        assert!(matches!(
            parse_settings(&data[8..]),
            Err(SmartAccountSdkError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_ephemeral_signers_are_distinct() {
        let transaction = Pubkey::new_unique();
        let signers = derive_ephemeral_signers(&smart_account_interface::ID, &transaction, 3);
        assert_eq!(signers.len(), 3);
        assert_ne!(signers[0], signers[1]);
        assert_ne!(signers[1], signers[2]);
    }
}
