use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::message::v0::MessageAddressTableLookup;
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;

/// A lookup table address with the indexes a message loads from it.
pub type LookupTableReference = MessageAddressTableLookup;

/// Native message version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageVersion {
    Legacy,
    V0,
}

/// Decoded form of the oversized inner transaction message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerMessage {
    pub version: MessageVersion,

    /// Signer counts, native layout
    pub header: MessageHeader,

    /// Static account keys, signers first
    pub account_keys: Vec<Pubkey>,

    pub recent_blockhash: Hash,

    /// `program_id_index` and `accounts` index into the static keys followed
    /// by the lookup-resolved keys
    pub instructions: Vec<CompiledInstruction>,

    /// Always empty for legacy messages
    pub address_table_lookups: Vec<LookupTableReference>,
}

impl InnerMessage {
    /// Number of accounts loaded through lookup tables.
    pub fn num_lookup_accounts(&self) -> usize {
        self.address_table_lookups
            .iter()
            .map(|l| l.writable_indexes.len() + l.readonly_indexes.len())
            .sum()
    }

    /// Static plus lookup-resolved account count.
    pub fn total_accounts(&self) -> usize {
        self.account_keys.len() + self.num_lookup_accounts()
    }
}
