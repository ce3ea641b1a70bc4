//! Decoder for the ledger's native message and transaction encodings.

use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::message::{MessageHeader, MESSAGE_VERSION_PREFIX};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::SIGNATURE_BYTES;

use crate::codec::short_vec;
use crate::error::{Result, SmartAccountSdkError};
use crate::types::{InnerMessage, LookupTableReference, MessageVersion};

/// Three header count bytes.
pub const MESSAGE_HEADER_LENGTH: usize = 3;

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn read_bytes(&mut self, len: usize, field: &'static str) -> Result<&'a [u8]> {
        if self.remaining() < len {
            return Err(SmartAccountSdkError::malformed(
                field,
                format!(
                    "need {len} bytes at offset {}, {} left",
                    self.offset,
                    self.remaining()
                ),
            ));
        }
        let bytes = &self.data[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    fn read_u8(&mut self, field: &'static str) -> Result<u8> {
        Ok(self.read_bytes(1, field)?[0])
    }

    fn read_len(&mut self, field: &'static str) -> Result<usize> {
        let (len, consumed) = short_vec::decode_len(&self.data[self.offset..], field)?;
        self.offset += consumed;
        Ok(len)
    }

    fn read_pubkey(&mut self, field: &'static str) -> Result<Pubkey> {
        let bytes = self.read_bytes(32, field)?;
        Ok(Pubkey::new_from_array(bytes.try_into().map_err(|_| {
            SmartAccountSdkError::malformed(field, "bad key length")
        })?))
    }

    fn read_vec(&mut self, field: &'static str) -> Result<Vec<u8>> {
        let len = self.read_len(field)?;
        Ok(self.read_bytes(len, field)?.to_vec())
    }
}

/// Decodes a native legacy or v0 message.
pub fn decode_native(bytes: &[u8]) -> Result<InnerMessage> {
    if bytes.len() < MESSAGE_HEADER_LENGTH {
        return Err(SmartAccountSdkError::malformed(
            "header",
            format!(
                "message is {} bytes, shorter than the {MESSAGE_HEADER_LENGTH}-byte header",
                bytes.len()
            ),
        ));
    }

    let mut reader = Reader::new(bytes);
    let version = if bytes[0] & MESSAGE_VERSION_PREFIX != 0 {
        let version = reader.read_u8("version")? & !MESSAGE_VERSION_PREFIX;
        if version != 0 {
            return Err(SmartAccountSdkError::malformed(
                "version",
                format!("unsupported message version {version}"),
            ));
        }
        MessageVersion::V0
    } else {
        MessageVersion::Legacy
    };

    let header = MessageHeader {
        num_required_signatures: reader.read_u8("header.num_required_signatures")?,
        num_readonly_signed_accounts: reader.read_u8("header.num_readonly_signed_accounts")?,
        num_readonly_unsigned_accounts: reader.read_u8("header.num_readonly_unsigned_accounts")?,
    };

    let num_keys = reader.read_len("account_keys")?;
    let mut account_keys = Vec::with_capacity(num_keys.min(reader.remaining() / 32));
    for _ in 0..num_keys {
        account_keys.push(reader.read_pubkey("account_keys")?);
    }

    let recent_blockhash = Hash::new_from_array(
        reader
            .read_bytes(32, "recent_blockhash")?
            .try_into()
            .map_err(|_| SmartAccountSdkError::malformed("recent_blockhash", "bad length"))?,
    );

    let num_instructions = reader.read_len("instructions")?;
    let mut instructions = Vec::with_capacity(num_instructions.min(reader.remaining()));
    for _ in 0..num_instructions {
        let program_id_index = reader.read_u8("instructions.program_id_index")?;
        let accounts = reader.read_vec("instructions.accounts")?;
        let data = reader.read_vec("instructions.data")?;
        instructions.push(CompiledInstruction {
            program_id_index,
            accounts,
            data,
        });
    }

    let mut address_table_lookups = Vec::new();
    if version == MessageVersion::V0 {
        let num_lookups = reader.read_len("address_table_lookups")?;
        for _ in 0..num_lookups {
            let account_key = reader.read_pubkey("address_table_lookups.account_key")?;
            let writable_indexes = reader.read_vec("address_table_lookups.writable_indexes")?;
            let readonly_indexes = reader.read_vec("address_table_lookups.readonly_indexes")?;
            address_table_lookups.push(LookupTableReference {
                account_key,
                writable_indexes,
                readonly_indexes,
            });
        }
    }

    if reader.remaining() != 0 {
        return Err(SmartAccountSdkError::malformed(
            "message",
            format!("{} trailing bytes", reader.remaining()),
        ));
    }

    let message = InnerMessage {
        version,
        header,
        account_keys,
        recent_blockhash,
        instructions,
        address_table_lookups,
    };
    check_indexes(&message)?;
    Ok(message)
}

/// Strips the signature section of a serialized transaction and decodes the
/// message that follows it.
pub fn decode_transaction(bytes: &[u8]) -> Result<InnerMessage> {
    let (num_signatures, consumed) = short_vec::decode_len(bytes, "signatures")?;
    let signatures_len = num_signatures
        .checked_mul(SIGNATURE_BYTES)
        .and_then(|len| len.checked_add(consumed))
        .ok_or_else(|| SmartAccountSdkError::malformed("signatures", "length overflow"))?;
    let message = bytes.get(signatures_len..).ok_or_else(|| {
        SmartAccountSdkError::malformed(
            "signatures",
            format!(
                "{num_signatures} signatures need {signatures_len} bytes, transaction is {}",
                bytes.len()
            ),
        )
    })?;
    decode_native(message)
}

/// Programs must be static keys; instruction accounts may also be lookup-resolved.
fn check_indexes(message: &InnerMessage) -> Result<()> {
    let num_static = message.account_keys.len();
    let num_total = message.total_accounts();
    for (i, ix) in message.instructions.iter().enumerate() {
        if usize::from(ix.program_id_index) >= num_static {
            return Err(SmartAccountSdkError::malformed(
                "instructions.program_id_index",
                format!(
                    "instruction {i}: index {} exceeds {num_static} static accounts",
                    ix.program_id_index
                ),
            ));
        }
        if let Some(index) = ix.accounts.iter().find(|a| usize::from(**a) >= num_total) {
            return Err(SmartAccountSdkError::malformed(
                "instructions.accounts",
                format!("instruction {i}: index {index} exceeds {num_total} accounts"),
            ));
        }
    }
    Ok(())
}
