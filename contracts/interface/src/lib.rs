//! Smart Account Program Interface
//!
//! Client-side bindings for the smart account program: program id, PDA seeds,
//! instruction arguments with their Anchor discriminators, and the layout of
//! the accounts the planner reads.

pub mod error;
pub mod instruction;
pub mod state;

use solana_program::pubkey::Pubkey;

pub use error::InterfaceError;
pub use instruction::{
    CreateProposalArgs, CreateTransactionArgs, CreateTransactionBufferArgs,
    ExtendTransactionBufferArgs, InstructionDiscriminator, SmartAccountInstruction,
    VoteOnProposalArgs,
};
pub use state::{Permission, Permissions, Settings, SmartAccountSigner};

solana_program::declare_id!("SMRTzfY6DfH5ik3TKiyLFfXexV8uSG3d2UksSCYdunG");

/// PDA seed constants. Every program address starts with [`SEED_PREFIX`].
pub mod seeds {
    pub const SEED_PREFIX: &[u8] = b"smart_account";
    pub const SEED_SETTINGS: &[u8] = b"settings";
    pub const SEED_SMART_ACCOUNT: &[u8] = b"smart_account";
    pub const SEED_TRANSACTION: &[u8] = b"transaction";
    pub const SEED_PROPOSAL: &[u8] = b"proposal";
    pub const SEED_TRANSACTION_BUFFER: &[u8] = b"transaction_buffer";
    pub const SEED_EPHEMERAL_SIGNER: &[u8] = b"ephemeral_signer";
}

/// Largest message the program accepts in a transaction buffer.
pub const MAX_BUFFER_SIZE: usize = 4000;

/// Maximum memo length accepted by the program, in bytes.
pub const MAX_MEMO_LEN: usize = 512;

/// Placeholder message passed to `create_transaction_from_buffer`.
///
/// The program ignores the inline message and reads it from the buffer, but
/// the argument must still decode as an empty smart account message: three
/// zero header counts and three empty u8-prefixed lists.
pub const EMPTY_TRANSACTION_MESSAGE: [u8; 6] = [0; 6];

/// Settings PDA: `["smart_account", "settings", seed]`.
pub fn find_settings_address(seed: &Pubkey, program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::SEED_PREFIX, seeds::SEED_SETTINGS, seed.as_ref()],
        program_id,
    )
}

/// Smart account (vault) PDA: `["smart_account", settings, "smart_account", account_index]`.
pub fn find_smart_account_address(
    settings: &Pubkey,
    account_index: u8,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::SEED_PREFIX,
            settings.as_ref(),
            seeds::SEED_SMART_ACCOUNT,
            &[account_index],
        ],
        program_id,
    )
}

/// Transaction record PDA: `["smart_account", settings, "transaction", index_le]`.
pub fn find_transaction_address(
    settings: &Pubkey,
    transaction_index: u64,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::SEED_PREFIX,
            settings.as_ref(),
            seeds::SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
        ],
        program_id,
    )
}

/// Proposal PDA: `["smart_account", settings, "transaction", index_le, "proposal"]`.
pub fn find_proposal_address(
    settings: &Pubkey,
    transaction_index: u64,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::SEED_PREFIX,
            settings.as_ref(),
            seeds::SEED_TRANSACTION,
            &transaction_index.to_le_bytes(),
            seeds::SEED_PROPOSAL,
        ],
        program_id,
    )
}

/// Transaction buffer PDA:
/// `["smart_account", settings, "transaction_buffer", creator, buffer_index]`.
pub fn find_transaction_buffer_address(
    settings: &Pubkey,
    creator: &Pubkey,
    buffer_index: u8,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::SEED_PREFIX,
            settings.as_ref(),
            seeds::SEED_TRANSACTION_BUFFER,
            creator.as_ref(),
            &[buffer_index],
        ],
        program_id,
    )
}

/// Ephemeral signer PDA:
/// `["smart_account", transaction, "ephemeral_signer", signer_index]`.
pub fn find_ephemeral_signer_address(
    transaction: &Pubkey,
    signer_index: u8,
    program_id: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            seeds::SEED_PREFIX,
            transaction.as_ref(),
            seeds::SEED_EPHEMERAL_SIGNER,
            &[signer_index],
        ],
        program_id,
    )
}
