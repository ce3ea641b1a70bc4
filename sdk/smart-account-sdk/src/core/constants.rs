use solana_sdk::packet::PACKET_DATA_SIZE;
use solana_sdk::pubkey::Pubkey;

// Mainnet/Devnet deployment of the smart account program
pub const DEFAULT_PROGRAM_ID: Pubkey = smart_account_interface::ID;

/// Byte budget of one serialized transaction.
pub const DEFAULT_ENVELOPE_BUDGET: usize = PACKET_DATA_SIZE;

/// Default bytes of message carried by each create/extend buffer envelope.
///
/// A create-buffer envelope signed by a creator and a separate fee payer
/// spends roughly 420 bytes on signatures, six account keys, the blockhash and
/// the instruction framing, which leaves a little over 800 bytes of the
/// [`DEFAULT_ENVELOPE_BUDGET`] for the chunk.
pub const DEFAULT_MAX_CHUNK_SIZE: u16 = 750;
