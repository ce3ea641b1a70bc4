//! Address lookup table resolution.
//!
//! A lookup table account holds a fixed-size metadata header followed by a
//! flat array of addresses. Tables are read fresh on every planning run.

use std::collections::HashMap;

use futures_util::future::try_join_all;
use solana_sdk::message::AddressLookupTableAccount;
use solana_sdk::pubkey::Pubkey;

use crate::core::connection::SolConnection;
use crate::error::{Result, SmartAccountSdkError};
use crate::types::LookupTableReference;

/// Size of the table's metadata header.
pub const LOOKUP_TABLE_META_SIZE: usize = 56;

const ADDRESS_SIZE: usize = 32;

/// Addresses a message loads through its lookup tables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedLookups {
    /// One entry per lookup, declaration order
    pub writable: Vec<Vec<Pubkey>>,
    pub readonly: Vec<Vec<Pubkey>>,
    /// Full contents of each distinct table, first-use order
    pub tables: Vec<AddressLookupTableAccount>,
}

impl ResolvedLookups {
    /// Writable addresses of every table, then read-only addresses of every
    /// table. This is the order in which the message's indexes address them.
    pub fn loaded_addresses(&self) -> impl Iterator<Item = (&Pubkey, bool)> {
        self.writable
            .iter()
            .flatten()
            .map(|key| (key, true))
            .chain(self.readonly.iter().flatten().map(|key| (key, false)))
    }
}

/// Table addresses stored in raw account data.
pub fn table_addresses(table: &Pubkey, data: &[u8]) -> Result<Vec<Pubkey>> {
    let entries = data.get(LOOKUP_TABLE_META_SIZE..).ok_or_else(|| {
        SmartAccountSdkError::InvalidAccountData(format!(
            "lookup table {table}: {} bytes is shorter than the {}-byte header",
            data.len(),
            LOOKUP_TABLE_META_SIZE
        ))
    })?;
    Ok(entries
        .chunks_exact(ADDRESS_SIZE)
        .map(|chunk| {
            let mut key = [0u8; ADDRESS_SIZE];
            key.copy_from_slice(chunk);
            Pubkey::new_from_array(key)
        })
        .collect())
}

fn select(table: &Pubkey, addresses: &[Pubkey], indexes: &[u8]) -> Result<Vec<Pubkey>> {
    indexes
        .iter()
        .map(|&index| {
            addresses
                .get(usize::from(index))
                .copied()
                .ok_or(SmartAccountSdkError::IndexOutOfBounds {
                    table: *table,
                    index,
                    len: addresses.len(),
                })
        })
        .collect()
}

async fn fetch_table(connection: &impl SolConnection, table: &Pubkey) -> Result<Vec<Pubkey>> {
    let account = connection
        .get_account(table)
        .await
        .map_err(|e| SmartAccountSdkError::Connection(e.to_string()))?
        .ok_or(SmartAccountSdkError::TableNotFound(*table))?;
    let addresses = table_addresses(table, &account.data)?;
    tracing::trace!(%table, len = addresses.len(), "fetched lookup table");
    Ok(addresses)
}

/// Resolves `indexes` against the current contents of `table`.
pub async fn resolve(
    connection: &impl SolConnection,
    table: &Pubkey,
    indexes: &[u8],
) -> Result<Vec<Pubkey>> {
    let addresses = fetch_table(connection, table).await?;
    select(table, &addresses, indexes)
}

/// Resolves every lookup of a message. Each distinct table is fetched once,
/// concurrently with the others.
#[tracing::instrument(skip_all, fields(lookups = lookups.len()))]
pub async fn resolve_all(
    connection: &impl SolConnection,
    lookups: &[LookupTableReference],
) -> Result<ResolvedLookups> {
    let mut distinct: Vec<Pubkey> = Vec::new();
    for lookup in lookups {
        if !distinct.contains(&lookup.account_key) {
            distinct.push(lookup.account_key);
        }
    }

    let fetched = try_join_all(distinct.iter().map(|table| fetch_table(connection, table))).await?;
    let tables: HashMap<Pubkey, Vec<Pubkey>> =
        distinct.iter().copied().zip(fetched.iter().cloned()).collect();

    let mut resolved = ResolvedLookups::default();
    for lookup in lookups {
        let addresses = tables
            .get(&lookup.account_key)
            .ok_or(SmartAccountSdkError::TableNotFound(lookup.account_key))?;
        resolved.writable.push(select(
            &lookup.account_key,
            addresses,
            &lookup.writable_indexes,
        )?);
        resolved.readonly.push(select(
            &lookup.account_key,
            addresses,
            &lookup.readonly_indexes,
        )?);
    }
    resolved.tables = distinct
        .into_iter()
        .zip(fetched)
        .map(|(key, addresses)| AddressLookupTableAccount { key, addresses })
        .collect();
    tracing::debug!(
        loaded = resolved.loaded_addresses().count(),
        "resolved lookup tables"
    );
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table_data(addresses: &[Pubkey]) -> Vec<u8> {
        let mut data = vec![0u8; LOOKUP_TABLE_META_SIZE];
        for key in addresses {
            data.extend_from_slice(key.as_ref());
        }
        data
    }

    #[test]
    fn test_entries_at_fixed_offsets() {
        let table = Pubkey::new_unique();
        let addresses: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let parsed = table_addresses(&table, &table_data(&addresses)).unwrap();
        assert_eq!(parsed, addresses);
        assert_eq!(
            select(&table, &parsed, &[9, 0, 9]).unwrap(),
            vec![addresses[9], addresses[0], addresses[9]]
        );
    }

    #[test]
    fn test_index_past_last_entry() {
        let table = Pubkey::new_unique();
        let addresses: Vec<Pubkey> = (0..10).map(|_| Pubkey::new_unique()).collect();
        let err = select(&table, &addresses, &[3, 10]).unwrap_err();
        assert!(matches!(
            err,
            SmartAccountSdkError::IndexOutOfBounds { index: 10, len: 10, .. }
        ));
    }

    #[test]
    fn test_partial_trailing_entry_is_ignored() {
        let table = Pubkey::new_unique();
        let mut data = table_data(&[Pubkey::new_unique()]);
        data.extend_from_slice(&[1; 31]);
        assert_eq!(table_addresses(&table, &data).unwrap().len(), 1);
    }

    #[test]
    fn test_data_shorter_than_header() {
        let table = Pubkey::new_unique();
        assert!(matches!(
            table_addresses(&table, &[0; 55]),
            Err(SmartAccountSdkError::InvalidAccountData(_))
        ));
    }

    #[test]
    fn test_loaded_address_order() {
        let [a, b, c, d] = [(); 4].map(|_| Pubkey::new_unique());
        let resolved = ResolvedLookups {
            writable: vec![vec![a], vec![b]],
            readonly: vec![vec![c], vec![d]],
            tables: Vec::new(),
        };
        let order: Vec<_> = resolved.loaded_addresses().map(|(k, w)| (*k, w)).collect();
        assert_eq!(order, vec![(a, true), (b, true), (c, false), (d, false)]);
    }
}
