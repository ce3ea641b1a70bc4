#![allow(dead_code)]

use async_trait::async_trait;
use smart_account_interface::{Permission, Permissions, Settings, SmartAccountSigner};
use smart_account_sdk::core::connection::SolConnection;
use smart_account_sdk::lookup::LOOKUP_TABLE_META_SIZE;
use smart_account_sdk::types::LookupTableReference;
use solana_sdk::{
    account::Account,
    hash::Hash,
    instruction::CompiledInstruction,
    message::{v0, MessageHeader, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    transaction::VersionedTransaction,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const LOOKUP_TABLE_PROGRAM: Pubkey =
    solana_sdk::pubkey!("AddressLookupTab1e1111111111111111111111111");

/// In-memory ledger: accounts by address, a fixed blockhash, and a log of reads.
pub struct MockConnection {
    accounts: Mutex<HashMap<Pubkey, Account>>,
    reads: Mutex<Vec<Pubkey>>,
    blockhash_reads: AtomicUsize,
    pub blockhash: Hash,
}

impl Default for MockConnection {
    fn default() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            reads: Mutex::new(Vec::new()),
            blockhash_reads: AtomicUsize::new(0),
            blockhash: Hash::new_from_array([42; 32]),
        }
    }
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_account(&self, address: Pubkey, owner: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(
            address,
            Account {
                lamports: 1_000_000,
                data,
                owner,
                executable: false,
                rent_epoch: 0,
            },
        );
    }

    pub fn set_settings(&self, address: Pubkey, settings: &Settings) {
        self.set_account(
            address,
            smart_account_interface::ID,
            settings.to_account_data().unwrap(),
        );
    }

    pub fn set_lookup_table(&self, address: Pubkey, addresses: &[Pubkey]) {
        let mut data = vec![0u8; LOOKUP_TABLE_META_SIZE];
        for key in addresses {
            data.extend_from_slice(key.as_ref());
        }
        self.set_account(address, LOOKUP_TABLE_PROGRAM, data);
    }

    /// Every `get_account` call so far, in order.
    pub fn reads(&self) -> Vec<Pubkey> {
        self.reads.lock().unwrap().clone()
    }

    pub fn read_count(&self, address: &Pubkey) -> usize {
        self.reads().iter().filter(|k| *k == address).count()
    }

    pub fn blockhash_reads(&self) -> usize {
        self.blockhash_reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SolConnection for MockConnection {
    async fn send_transaction(
        &self,
        tx: &VersionedTransaction,
    ) -> Result<Signature, Box<dyn std::error::Error + Send + Sync>> {
        Ok(tx.signatures.first().copied().unwrap_or_default())
    }

    async fn get_account(
        &self,
        pubkey: &Pubkey,
    ) -> Result<Option<Account>, Box<dyn std::error::Error + Send + Sync>> {
        self.reads.lock().unwrap().push(*pubkey);
        Ok(self.accounts.lock().unwrap().get(pubkey).cloned())
    }

    async fn get_latest_blockhash(&self) -> Result<Hash, Box<dyn std::error::Error + Send + Sync>> {
        self.blockhash_reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.blockhash)
    }
}

/// Settings with the given members, sorted the way the program stores them.
pub fn settings_with(
    members: &[(Pubkey, &[Permission])],
    threshold: u16,
    time_lock: u32,
    rent_collector: Option<Pubkey>,
) -> Settings {
    let mut signers: Vec<SmartAccountSigner> = members
        .iter()
        .map(|(key, permissions)| SmartAccountSigner {
            key: *key,
            permissions: Permissions::from_vec(permissions),
        })
        .collect();
    signers.sort_by_key(|s| s.key);
    Settings {
        seed: Pubkey::new_unique(),
        settings_authority: Pubkey::default(),
        threshold,
        time_lock,
        transaction_index: 7,
        stale_transaction_index: 0,
        rent_collector,
        bump: 255,
        signers,
    }
}

pub const ALL_PERMISSIONS: &[Permission] =
    &[Permission::Initiate, Permission::Vote, Permission::Execute];

/// A swap-like message signed by the vault: vault, recipient and a program as
/// static keys, plus one writable and one read-only address per lookup.
pub struct InnerFixture {
    pub vault: Pubkey,
    pub recipient: Pubkey,
    pub program: Pubkey,
    pub message: v0::Message,
}

impl InnerFixture {
    pub fn new(vault: Pubkey, data_len: usize, lookups: Vec<LookupTableReference>) -> Self {
        let recipient = Pubkey::new_unique();
        let program = Pubkey::new_unique();
        let num_loaded: usize = lookups
            .iter()
            .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
            .sum();
        let mut accounts = vec![0u8, 1];
        accounts.extend((0..num_loaded).map(|i| 3 + i as u8));
        let message = v0::Message {
            header: MessageHeader {
                num_required_signatures: 1,
                num_readonly_signed_accounts: 0,
                num_readonly_unsigned_accounts: 1,
            },
            account_keys: vec![vault, recipient, program],
            recent_blockhash: Hash::new_from_array([9; 32]),
            instructions: vec![CompiledInstruction {
                program_id_index: 2,
                accounts,
                data: vec![7; data_len],
            }],
            address_table_lookups: lookups,
        };
        Self {
            vault,
            recipient,
            program,
            message,
        }
    }

    pub fn message_bytes(&self) -> Vec<u8> {
        VersionedMessage::V0(self.message.clone()).serialize()
    }

    pub fn transaction_bytes(&self) -> Vec<u8> {
        let tx = VersionedTransaction {
            signatures: vec![Signature::default()],
            message: VersionedMessage::V0(self.message.clone()),
        };
        bincode::serialize(&tx).unwrap()
    }
}
