//! Trailing accounts of `execute_transaction`.

use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

use crate::codec::SmartAccountMessage;
use crate::lookup::ResolvedLookups;

/// Accounts the program needs after the fixed `execute_transaction` accounts,
/// in the order it reads them:
///
/// 1. the lookup tables, read-only, when `include_lookup_tables` is set
/// 2. the static keys of the message
/// 3. writable lookup-resolved addresses of every table, then read-only ones
///
/// Static signers are passed as signers except the smart account itself and
/// ephemeral signers, which the program signs for.
pub fn execute_accounts(
    message: &SmartAccountMessage,
    resolved: &ResolvedLookups,
    smart_account: &Pubkey,
    ephemeral_signers: &[Pubkey],
    include_lookup_tables: bool,
) -> Vec<AccountMeta> {
    let mut accounts = Vec::new();

    if include_lookup_tables {
        accounts.extend(
            message
                .address_table_lookups
                .0
                .iter()
                .map(|lookup| AccountMeta::new_readonly(lookup.account_key, false)),
        );
    }

    let num_signers = usize::from(message.num_signers);
    let num_writable_signers = usize::from(message.num_writable_signers);
    let num_writable_non_signers = usize::from(message.num_writable_non_signers);
    for (index, key) in message.account_keys.0.iter().enumerate() {
        let is_writable = index < num_writable_signers
            || (index >= num_signers && index < num_signers + num_writable_non_signers);
        let is_signer = index < num_signers
            && key != smart_account
            && !ephemeral_signers.contains(key);
        accounts.push(AccountMeta {
            pubkey: *key,
            is_signer,
            is_writable,
        });
    }

    accounts.extend(resolved.loaded_addresses().map(|(key, is_writable)| AccountMeta {
        pubkey: *key,
        is_signer: false,
        is_writable,
    }));

    accounts
}
