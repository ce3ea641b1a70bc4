//! Smart Account Instruction Definitions
//!
//! Only the instructions used by the buffered transaction flow are bound here.
//! Each instruction's data is an 8-byte Anchor discriminator
//! (`sha256("global:<name>")[..8]`) followed by the borsh-encoded arguments.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::error::InterfaceError;

/// Instruction discriminators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstructionDiscriminator {
    CreateTransactionBuffer,
    ExtendTransactionBuffer,
    CloseTransactionBuffer,
    CreateTransactionFromBuffer,
    CreateProposal,
    ApproveProposal,
    ExecuteTransaction,
    CloseTransaction,
}

impl InstructionDiscriminator {
    const ALL: [Self; 8] = [
        Self::CreateTransactionBuffer,
        Self::ExtendTransactionBuffer,
        Self::CloseTransactionBuffer,
        Self::CreateTransactionFromBuffer,
        Self::CreateProposal,
        Self::ApproveProposal,
        Self::ExecuteTransaction,
        Self::CloseTransaction,
    ];

    pub const fn bytes(self) -> [u8; 8] {
        match self {
            Self::CreateTransactionBuffer => [57, 97, 250, 156, 59, 211, 32, 208],
            Self::ExtendTransactionBuffer => [190, 86, 246, 95, 231, 154, 229, 91],
            Self::CloseTransactionBuffer => [224, 221, 123, 213, 0, 204, 5, 191],
            Self::CreateTransactionFromBuffer => [53, 192, 39, 239, 124, 84, 43, 249],
            Self::CreateProposal => [132, 116, 68, 174, 216, 160, 198, 22],
            Self::ApproveProposal => [136, 108, 102, 85, 98, 114, 7, 147],
            Self::ExecuteTransaction => [231, 173, 49, 91, 235, 24, 68, 19],
            Self::CloseTransaction => [97, 46, 152, 170, 42, 215, 192, 218],
        }
    }

    pub fn from_bytes(bytes: [u8; 8]) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.bytes() == bytes)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateTransactionBufferArgs {
    /// Index of the buffer account, part of its PDA seeds
    pub buffer_index: u8,
    /// Index of the smart account the buffered transaction executes for
    pub account_index: u8,
    /// SHA-256 of the complete message once every chunk has been written
    pub final_buffer_hash: [u8; 32],
    /// Length of the complete message
    pub final_buffer_size: u16,
    /// First chunk of the message
    pub buffer: Vec<u8>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtendTransactionBufferArgs {
    /// Next chunk, appended to the buffer
    pub buffer: Vec<u8>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateTransactionArgs {
    /// Index of the smart account executing the transaction
    pub account_index: u8,
    /// Bump of the smart account PDA
    pub account_bump: u8,
    /// Number of ephemeral signer PDAs the transaction needs
    pub ephemeral_signers: u8,
    /// Serialized smart account message; the placeholder when read from a buffer
    pub transaction_message: Vec<u8>,
    pub memo: Option<String>,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct CreateProposalArgs {
    pub transaction_index: u64,
    /// Drafts must be activated before they can be voted on
    pub draft: bool,
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct VoteOnProposalArgs {
    pub memo: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SmartAccountInstruction {
    /// Create a transaction buffer holding the first chunk of a message
    ///
    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Transaction buffer (PDA)
    /// 2. `[signer]` Creator
    /// 3. `[writable, signer]` Rent payer
    /// 4. `[]` System program
    CreateTransactionBuffer(CreateTransactionBufferArgs),

    /// Append a chunk to an existing buffer
    ///
    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Transaction buffer
    /// 2. `[signer]` Creator
    ExtendTransactionBuffer(ExtendTransactionBufferArgs),

    /// Close an unused buffer, refunding rent to the creator
    ///
    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Transaction buffer
    /// 2. `[signer]` Creator
    CloseTransactionBuffer,

    /// Create the transaction record from a complete buffer; the buffer is
    /// closed to the creator
    ///
    /// Accounts:
    /// 0. `[writable]` Settings
    /// 1. `[writable]` Transaction (PDA)
    /// 2. `[signer]` Creator
    /// 3. `[writable, signer]` Rent payer
    /// 4. `[]` System program
    /// 5. `[writable]` Transaction buffer
    /// 6. `[writable, signer]` Creator (buffer rent refund)
    CreateTransactionFromBuffer(CreateTransactionArgs),

    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Proposal (PDA)
    /// 2. `[signer]` Creator
    /// 3. `[writable, signer]` Rent payer
    /// 4. `[]` System program
    CreateProposal(CreateProposalArgs),

    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable, signer]` Signer
    /// 2. `[writable]` Proposal
    /// 3. `[]` System program
    ApproveProposal(VoteOnProposalArgs),

    /// Execute an approved transaction
    ///
    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Proposal
    /// 2. `[]` Transaction
    /// 3. `[signer]` Signer
    /// 4+ Lookup tables, message accounts and lookup-resolved accounts
    ExecuteTransaction,

    /// Close a finished transaction and its proposal, rent goes to the
    /// settings' rent collector
    ///
    /// Accounts:
    /// 0. `[]` Settings
    /// 1. `[writable]` Proposal
    /// 2. `[writable]` Transaction
    /// 3. `[writable]` Rent collector
    /// 4. `[]` System program
    CloseTransaction,
}

impl SmartAccountInstruction {
    pub fn discriminator(&self) -> InstructionDiscriminator {
        match self {
            Self::CreateTransactionBuffer(_) => InstructionDiscriminator::CreateTransactionBuffer,
            Self::ExtendTransactionBuffer(_) => InstructionDiscriminator::ExtendTransactionBuffer,
            Self::CloseTransactionBuffer => InstructionDiscriminator::CloseTransactionBuffer,
            Self::CreateTransactionFromBuffer(_) => {
                InstructionDiscriminator::CreateTransactionFromBuffer
            },
            Self::CreateProposal(_) => InstructionDiscriminator::CreateProposal,
            Self::ApproveProposal(_) => InstructionDiscriminator::ApproveProposal,
            Self::ExecuteTransaction => InstructionDiscriminator::ExecuteTransaction,
            Self::CloseTransaction => InstructionDiscriminator::CloseTransaction,
        }
    }

    pub fn pack(&self) -> Result<Vec<u8>, InterfaceError> {
        let mut data = self.discriminator().bytes().to_vec();
        match self {
            Self::CreateTransactionBuffer(args) => args.serialize(&mut data)?,
            Self::ExtendTransactionBuffer(args) => args.serialize(&mut data)?,
            Self::CreateTransactionFromBuffer(args) => args.serialize(&mut data)?,
            Self::CreateProposal(args) => args.serialize(&mut data)?,
            Self::ApproveProposal(args) => args.serialize(&mut data)?,
            Self::CloseTransactionBuffer | Self::ExecuteTransaction | Self::CloseTransaction => {},
        }
        Ok(data)
    }

    pub fn unpack(input: &[u8]) -> Result<Self, InterfaceError> {
        if input.len() < 8 {
            return Err(InterfaceError::DataTooShort {
                needed: 8,
                got: input.len(),
            });
        }
        let (tag, mut rest) = input.split_at(8);
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(tag);
        let discriminator = InstructionDiscriminator::from_bytes(bytes)
            .ok_or(InterfaceError::UnknownDiscriminator(bytes))?;

        let instruction = match discriminator {
            InstructionDiscriminator::CreateTransactionBuffer => {
                Self::CreateTransactionBuffer(BorshDeserialize::deserialize(&mut rest)?)
            },
            InstructionDiscriminator::ExtendTransactionBuffer => {
                Self::ExtendTransactionBuffer(BorshDeserialize::deserialize(&mut rest)?)
            },
            InstructionDiscriminator::CloseTransactionBuffer => Self::CloseTransactionBuffer,
            InstructionDiscriminator::CreateTransactionFromBuffer => {
                Self::CreateTransactionFromBuffer(BorshDeserialize::deserialize(&mut rest)?)
            },
            InstructionDiscriminator::CreateProposal => {
                Self::CreateProposal(BorshDeserialize::deserialize(&mut rest)?)
            },
            InstructionDiscriminator::ApproveProposal => {
                Self::ApproveProposal(BorshDeserialize::deserialize(&mut rest)?)
            },
            InstructionDiscriminator::ExecuteTransaction => Self::ExecuteTransaction,
            InstructionDiscriminator::CloseTransaction => Self::CloseTransaction,
        };
        Ok(instruction)
    }
}
