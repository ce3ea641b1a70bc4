//! Native message decoding and the smart account message format.

pub mod native;
pub mod short_vec;
pub mod smart_account;

pub use native::{decode_native, decode_transaction};
pub use smart_account::{
    convert_header, SmartAccountAddressTableLookup, SmartAccountCompiledInstruction,
    SmartAccountMessage, SmallVecU16, SmallVecU8,
};

use crate::error::Result;
use crate::types::{InnerMessage, LookupTableReference};
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;

/// Inner transaction bytes as handed over by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInnerTransaction {
    /// A serialized message, no signature section
    Message(Vec<u8>),
    /// A serialized transaction; its signature section is skipped
    Transaction(Vec<u8>),
}

impl RawInnerTransaction {
    pub fn decode(&self) -> Result<InnerMessage> {
        match self {
            Self::Message(bytes) => decode_native(bytes),
            Self::Transaction(bytes) => decode_transaction(bytes),
        }
    }
}

/// Encodes a message in the smart account format.
pub fn encode_custom(message: &InnerMessage, lookups: &[LookupTableReference]) -> Result<Vec<u8>> {
    encode_parts(
        &message.header,
        &message.account_keys,
        &message.instructions,
        lookups,
    )
}

pub fn encode_parts(
    header: &MessageHeader,
    account_keys: &[Pubkey],
    instructions: &[CompiledInstruction],
    lookups: &[LookupTableReference],
) -> Result<Vec<u8>> {
    SmartAccountMessage::try_new(header, account_keys, instructions, lookups)?.encode()
}

pub fn decode_custom(bytes: &[u8]) -> Result<SmartAccountMessage> {
    SmartAccountMessage::decode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SmartAccountSdkError;
    use crate::types::MessageVersion;
    use proptest::prelude::*;
    use solana_sdk::hash::Hash;
    use solana_sdk::message::{v0, VersionedMessage};

    fn swap_like_message() -> v0::Message {
        let keys: Vec<Pubkey> = (0..5).map(|_| Pubkey::new_unique()).collect();
        v0::Message {
            header: MessageHeader {
                num_required_signatures: 2,
                num_readonly_signed_accounts: 1,
                num_readonly_unsigned_accounts: 2,
            },
            account_keys: keys,
            recent_blockhash: Hash::new_from_array([3; 32]),
            instructions: vec![
                CompiledInstruction {
                    program_id_index: 4,
                    accounts: vec![0, 2, 5, 6, 7],
                    data: vec![1; 600],
                },
                CompiledInstruction {
                    program_id_index: 3,
                    accounts: vec![1, 0],
                    data: vec![],
                },
            ],
            address_table_lookups: vec![
                LookupTableReference {
                    account_key: Pubkey::new_unique(),
                    writable_indexes: vec![1, 9],
                    readonly_indexes: vec![],
                },
                LookupTableReference {
                    account_key: Pubkey::new_unique(),
                    writable_indexes: vec![],
                    readonly_indexes: vec![0],
                },
            ],
        }
    }

    #[test]
    fn test_native_to_custom_and_back() {
        let native = swap_like_message();
        let raw = RawInnerTransaction::Message(VersionedMessage::V0(native.clone()).serialize());
        let inner = raw.decode().unwrap();

        let bytes = encode_custom(&inner, &inner.address_table_lookups).unwrap();
        let custom = decode_custom(&bytes).unwrap();
        assert_eq!(custom.num_signers, 2);
        assert_eq!(custom.num_writable_signers, 1);
        assert_eq!(custom.num_writable_non_signers, 1);

        let rebuilt = custom.to_inner(native.recent_blockhash).unwrap();
        assert_eq!(rebuilt, inner);
    }

    #[test]
    fn test_inconsistent_native_header_fails_on_encode() {
        let mut native = swap_like_message();
        native.header.num_readonly_unsigned_accounts = 4;
        let inner = decode_native(&VersionedMessage::V0(native).serialize()).unwrap();
        assert!(matches!(
            encode_custom(&inner, &inner.address_table_lookups),
            Err(SmartAccountSdkError::InvariantViolation {
                field: "num_writable_non_signers",
                ..
            })
        ));
    }

    /// Any header whose counts fit the key list, with keys to match.
    fn arb_header_and_keys() -> impl Strategy<Value = (MessageHeader, Vec<Pubkey>)> {
        (1usize..=24)
            .prop_flat_map(|num_keys| (Just(num_keys), 0..=num_keys))
            .prop_flat_map(|(num_keys, num_signers)| {
                (
                    0..=num_signers,
                    0..=num_keys - num_signers,
                    prop::collection::vec(any::<[u8; 32]>(), num_keys),
                    Just(num_signers),
                )
            })
            .prop_map(|(readonly_signed, readonly_unsigned, keys, num_signers)| {
                let header = MessageHeader {
                    num_required_signatures: num_signers as u8,
                    num_readonly_signed_accounts: readonly_signed as u8,
                    num_readonly_unsigned_accounts: readonly_unsigned as u8,
                };
                (header, keys.into_iter().map(Pubkey::new_from_array).collect())
            })
    }

    fn arb_instruction() -> impl Strategy<Value = CompiledInstruction> {
        (
            any::<u8>(),
            prop::collection::vec(any::<u8>(), 0..12),
            prop::collection::vec(any::<u8>(), 0..300),
        )
            .prop_map(|(program_id_index, accounts, data)| CompiledInstruction {
                program_id_index,
                accounts,
                data,
            })
    }

    fn arb_lookup() -> impl Strategy<Value = LookupTableReference> {
        (
            any::<[u8; 32]>(),
            prop::collection::vec(any::<u8>(), 0..8),
            prop::collection::vec(any::<u8>(), 0..8),
        )
            .prop_map(|(key, writable_indexes, readonly_indexes)| LookupTableReference {
                account_key: Pubkey::new_from_array(key),
                writable_indexes,
                readonly_indexes,
            })
    }

    proptest! {
        #[test]
        fn fuzz_custom_message_round_trip(
            (header, account_keys) in arb_header_and_keys(),
            instructions in prop::collection::vec(arb_instruction(), 0..6),
            lookups in prop::collection::vec(arb_lookup(), 0..4),
            blockhash in any::<[u8; 32]>(),
        ) {
            let inner = InnerMessage {
                version: if lookups.is_empty() {
                    MessageVersion::Legacy
                } else {
                    MessageVersion::V0
                },
                header,
                account_keys,
                recent_blockhash: Hash::new_from_array(blockhash),
                instructions,
                address_table_lookups: lookups,
            };

            let bytes = encode_custom(&inner, &inner.address_table_lookups).unwrap();
            let custom = decode_custom(&bytes).unwrap();
            prop_assert_eq!(custom.encode().unwrap(), bytes);
            prop_assert_eq!(custom.to_inner(inner.recent_blockhash).unwrap(), inner);
        }
    }
}
