//! The smart account transaction message format.
//!
//! Same content as a native v0 message, but borsh-encoded with fixed-width
//! length prefixes (u8 for lists, u16 for instruction data), no blockhash, and
//! the header stored as `(num_signers, num_writable_signers,
//! num_writable_non_signers)` instead of the native readonly counts.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_sdk::hash::Hash;
use solana_sdk::instruction::CompiledInstruction;
use solana_sdk::message::MessageHeader;
use solana_sdk::pubkey::Pubkey;

use crate::error::{Result, SmartAccountSdkError};
use crate::types::{InnerMessage, LookupTableReference, MessageVersion};

/// Vec with u8 length prefix for borsh serialization
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SmallVecU8<T>(pub Vec<T>);

/// Vec with u16 length prefix for borsh serialization
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SmallVecU16<T>(pub Vec<T>);

macro_rules! small_vec_impl {
    ($name:ident, $len:ty) => {
        impl<T> $name<T> {
            pub fn try_new(vec: Vec<T>, field: &'static str) -> Result<Self> {
                if vec.len() > usize::from(<$len>::MAX) {
                    return Err(SmartAccountSdkError::invariant(
                        field,
                        format!("{} entries exceed the maximum of {}", vec.len(), <$len>::MAX),
                    ));
                }
                Ok(Self(vec))
            }
        }

        impl<T: BorshSerialize> BorshSerialize for $name<T> {
            fn serialize<W: std::io::Write>(&self, writer: &mut W) -> std::io::Result<()> {
                let len = <$len>::try_from(self.0.len()).map_err(|_| {
                    std::io::Error::new(std::io::ErrorKind::InvalidData, "small vec too long")
                })?;
                len.serialize(writer)?;
                for item in &self.0 {
                    item.serialize(writer)?;
                }
                Ok(())
            }
        }

        impl<T: BorshDeserialize> BorshDeserialize for $name<T> {
            fn deserialize_reader<R: std::io::Read>(reader: &mut R) -> std::io::Result<Self> {
                let len = usize::from(<$len>::deserialize_reader(reader)?);
                let mut vec = Vec::with_capacity(len.min(256));
                for _ in 0..len {
                    vec.push(T::deserialize_reader(reader)?);
                }
                Ok(Self(vec))
            }
        }
    };
}

small_vec_impl!(SmallVecU8, u8);
small_vec_impl!(SmallVecU16, u16);

/// Transaction message consumed by the smart account program
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SmartAccountMessage {
    /// The number of signer pubkeys in the account_keys vec
    pub num_signers: u8,
    /// The number of writable signer pubkeys in the account_keys vec
    pub num_writable_signers: u8,
    /// The number of writable non-signer pubkeys in the account_keys vec
    pub num_writable_non_signers: u8,
    /// Static account keys, signers first
    pub account_keys: SmallVecU8<Pubkey>,
    pub instructions: SmallVecU8<SmartAccountCompiledInstruction>,
    pub address_table_lookups: SmallVecU8<SmartAccountAddressTableLookup>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SmartAccountCompiledInstruction {
    pub program_id_index: u8,
    /// Indices into the message's accounts (static, then lookup-resolved)
    pub account_indexes: SmallVecU8<u8>,
    pub data: SmallVecU16<u8>,
}

#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct SmartAccountAddressTableLookup {
    pub account_key: Pubkey,
    pub writable_indexes: SmallVecU8<u8>,
    pub readonly_indexes: SmallVecU8<u8>,
}

/// Native header triple converted into the smart account counts.
///
/// Returns `(num_signers, num_writable_signers, num_writable_non_signers)`.
pub fn convert_header(header: &MessageHeader, total_accounts: usize) -> Result<(u8, u8, u8)> {
    let num_signers = header.num_required_signatures;
    if usize::from(num_signers) > total_accounts {
        return Err(SmartAccountSdkError::invariant(
            "num_signers",
            format!("{num_signers} signers but only {total_accounts} account keys"),
        ));
    }
    let num_writable_signers = num_signers
        .checked_sub(header.num_readonly_signed_accounts)
        .ok_or_else(|| {
            SmartAccountSdkError::invariant(
                "num_writable_signers",
                format!(
                    "{} readonly signers exceed {num_signers} signers",
                    header.num_readonly_signed_accounts
                ),
            )
        })?;
    let num_non_signers = total_accounts - usize::from(num_signers);
    let num_writable_non_signers = num_non_signers
        .checked_sub(usize::from(header.num_readonly_unsigned_accounts))
        .ok_or_else(|| {
            SmartAccountSdkError::invariant(
                "num_writable_non_signers",
                format!(
                    "{} readonly non-signers exceed {num_non_signers} non-signers",
                    header.num_readonly_unsigned_accounts
                ),
            )
        })?;
    let num_writable_non_signers = u8::try_from(num_writable_non_signers).map_err(|_| {
        SmartAccountSdkError::invariant(
            "num_writable_non_signers",
            format!("{num_writable_non_signers} does not fit in u8"),
        )
    })?;
    Ok((num_signers, num_writable_signers, num_writable_non_signers))
}

impl SmartAccountMessage {
    /// Builds the program's message from a native header, static keys,
    /// instructions and the lookups the message references.
    pub fn try_new(
        header: &MessageHeader,
        account_keys: &[Pubkey],
        instructions: &[CompiledInstruction],
        lookups: &[LookupTableReference],
    ) -> Result<Self> {
        let (num_signers, num_writable_signers, num_writable_non_signers) =
            convert_header(header, account_keys.len())?;

        let instructions = instructions
            .iter()
            .map(|ix| {
                Ok(SmartAccountCompiledInstruction {
                    program_id_index: ix.program_id_index,
                    account_indexes: SmallVecU8::try_new(
                        ix.accounts.clone(),
                        "instructions.account_indexes",
                    )?,
                    data: SmallVecU16::try_new(ix.data.clone(), "instructions.data")?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let address_table_lookups = lookups
            .iter()
            .map(|lookup| {
                Ok(SmartAccountAddressTableLookup {
                    account_key: lookup.account_key,
                    writable_indexes: SmallVecU8::try_new(
                        lookup.writable_indexes.clone(),
                        "address_table_lookups.writable_indexes",
                    )?,
                    readonly_indexes: SmallVecU8::try_new(
                        lookup.readonly_indexes.clone(),
                        "address_table_lookups.readonly_indexes",
                    )?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            num_signers,
            num_writable_signers,
            num_writable_non_signers,
            account_keys: SmallVecU8::try_new(account_keys.to_vec(), "account_keys")?,
            instructions: SmallVecU8::try_new(instructions, "instructions")?,
            address_table_lookups: SmallVecU8::try_new(
                address_table_lookups,
                "address_table_lookups",
            )?,
        })
    }

    pub fn try_from_inner(message: &InnerMessage) -> Result<Self> {
        Self::try_new(
            &message.header,
            &message.account_keys,
            &message.instructions,
            &message.address_table_lookups,
        )
    }

    /// Native header recovered from the smart account counts.
    pub fn header(&self) -> Result<MessageHeader> {
        let total = self.account_keys.0.len();
        let num_signers = usize::from(self.num_signers);
        let num_readonly_signed_accounts = self
            .num_signers
            .checked_sub(self.num_writable_signers)
            .ok_or_else(|| {
                SmartAccountSdkError::invariant(
                    "num_writable_signers",
                    format!(
                        "{} writable signers exceed {} signers",
                        self.num_writable_signers, self.num_signers
                    ),
                )
            })?;
        let num_readonly_unsigned_accounts = total
            .checked_sub(num_signers)
            .and_then(|n| n.checked_sub(usize::from(self.num_writable_non_signers)))
            .ok_or_else(|| {
                SmartAccountSdkError::invariant(
                    "num_writable_non_signers",
                    format!(
                        "{} signers and {} writable non-signers exceed {total} account keys",
                        self.num_signers, self.num_writable_non_signers
                    ),
                )
            })?;
        Ok(MessageHeader {
            num_required_signatures: self.num_signers,
            num_readonly_signed_accounts,
            // at most total - num_signers, which fits since total <= u8::MAX
            num_readonly_unsigned_accounts: num_readonly_unsigned_accounts as u8,
        })
    }

    pub fn compiled_instructions(&self) -> Vec<CompiledInstruction> {
        self.instructions
            .0
            .iter()
            .map(|ix| CompiledInstruction {
                program_id_index: ix.program_id_index,
                accounts: ix.account_indexes.0.clone(),
                data: ix.data.0.clone(),
            })
            .collect()
    }

    pub fn lookups(&self) -> Vec<LookupTableReference> {
        self.address_table_lookups
            .0
            .iter()
            .map(|lookup| LookupTableReference {
                account_key: lookup.account_key,
                writable_indexes: lookup.writable_indexes.0.clone(),
                readonly_indexes: lookup.readonly_indexes.0.clone(),
            })
            .collect()
    }

    /// Rebuilds the native form. The blockhash is not part of this format and
    /// has to be supplied.
    pub fn to_inner(&self, recent_blockhash: Hash) -> Result<InnerMessage> {
        let address_table_lookups = self.lookups();
        let version = if address_table_lookups.is_empty() {
            MessageVersion::Legacy
        } else {
            MessageVersion::V0
        };
        Ok(InnerMessage {
            version,
            header: self.header()?,
            account_keys: self.account_keys.0.clone(),
            recent_blockhash,
            instructions: self.compiled_instructions(),
            address_table_lookups,
        })
    }

    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(borsh::to_vec(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let message: Self = borsh::from_slice(bytes).map_err(|e| {
            SmartAccountSdkError::malformed("smart_account_message", e.to_string())
        })?;
        message.header()?;
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(signers: u8, ro_signed: u8, ro_unsigned: u8) -> MessageHeader {
        MessageHeader {
            num_required_signatures: signers,
            num_readonly_signed_accounts: ro_signed,
            num_readonly_unsigned_accounts: ro_unsigned,
        }
    }

    #[test]
    fn test_header_invariant_holds_for_all_counts() {
        let total = 6usize;
        for signers in 0..=total as u8 {
            for ro_signed in 0..=signers {
                for ro_unsigned in 0..=(total as u8 - signers) {
                    let h = header(signers, ro_signed, ro_unsigned);
                    let (n, ws, wns) = convert_header(&h, total).unwrap();
                    assert_eq!(n, signers);
                    assert_eq!(ws + ro_signed, n);
                    assert_eq!(usize::from(wns + ro_unsigned), total - usize::from(n));
                }
            }
        }
    }

    #[test]
    fn test_header_rejects_inconsistent_counts() {
        assert!(matches!(
            convert_header(&header(3, 0, 0), 2),
            Err(SmartAccountSdkError::InvariantViolation { field: "num_signers", .. })
        ));
        assert!(matches!(
            convert_header(&header(1, 2, 0), 4),
            Err(SmartAccountSdkError::InvariantViolation {
                field: "num_writable_signers",
                ..
            })
        ));
        assert!(matches!(
            convert_header(&header(1, 0, 4), 4),
            Err(SmartAccountSdkError::InvariantViolation {
                field: "num_writable_non_signers",
                ..
            })
        ));
    }

    #[test]
    fn test_wire_layout() {
        let keys = [Pubkey::new_unique(), Pubkey::new_unique()];
        let ix = CompiledInstruction {
            program_id_index: 1,
            accounts: vec![0],
            data: vec![0xaa, 0xbb],
        };
        let message = SmartAccountMessage::try_new(&header(1, 0, 1), &keys, &[ix], &[]).unwrap();
        let bytes = message.encode().unwrap();

        let mut want = vec![1, 1, 0, 2];
        want.extend_from_slice(keys[0].as_ref());
        want.extend_from_slice(keys[1].as_ref());
        // one instruction: program index, one account, u16 data length, data
        want.extend_from_slice(&[1, 1, 1, 0, 2, 0, 0xaa, 0xbb]);
        // no lookups
        want.push(0);
        assert_eq!(bytes, want);
        assert_eq!(SmartAccountMessage::decode(&bytes).unwrap(), message);
    }

    #[test]
    fn test_oversized_lists_are_rejected() {
        let keys = vec![Pubkey::new_unique(); 256];
        assert!(matches!(
            SmartAccountMessage::try_new(&header(1, 0, 0), &keys, &[], &[]),
            Err(SmartAccountSdkError::InvariantViolation { .. })
        ));

        let ix = CompiledInstruction {
            program_id_index: 0,
            accounts: vec![],
            data: vec![0; usize::from(u16::MAX) + 1],
        };
        assert!(matches!(
            SmartAccountMessage::try_new(&header(1, 0, 0), &keys[..1], &[ix], &[]),
            Err(SmartAccountSdkError::InvariantViolation {
                field: "instructions.data",
                ..
            })
        ));
    }

    #[test]
    fn test_decode_rejects_trailing_bytes() {
        let message = SmartAccountMessage::try_new(&header(0, 0, 0), &[], &[], &[]).unwrap();
        let mut bytes = message.encode().unwrap();
        bytes.push(0);
        assert!(matches!(
            SmartAccountMessage::decode(&bytes),
            Err(SmartAccountSdkError::MalformedMessage { .. })
        ));
    }
}
