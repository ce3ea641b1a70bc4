use smart_account_interface::{InterfaceError, Permission};
use solana_sdk::pubkey::Pubkey;
use thiserror::Error;

/// SDK-specific error types for buffered transaction planning
#[derive(Debug, Error)]
pub enum SmartAccountSdkError {
    /// The inner transaction bytes do not decode as a native message
    #[error("Malformed message: {field}: {reason}")]
    MalformedMessage { field: &'static str, reason: String },

    /// A count, index or argument is inconsistent or out of range
    #[error("Invariant violation: {field}: {reason}")]
    InvariantViolation { field: &'static str, reason: String },

    /// A lookup index points past the end of the table
    #[error("Lookup table {table}: index {index} out of bounds (table holds {len} addresses)")]
    IndexOutOfBounds { table: Pubkey, index: u8, len: usize },

    /// Lookup table account does not exist
    #[error("Lookup table not found: {0}")]
    TableNotFound(Pubkey),

    /// All 256 buffer slots of the creator are taken
    #[error("No free buffer slot for creator {creator} (probed 256 indexes from {start})")]
    NoFreeSlot { creator: Pubkey, start: u8 },

    /// An envelope exceeds the transaction size budget
    #[error("Envelope for stage {stage} is {size} bytes, budget is {limit}")]
    EnvelopeTooLarge {
        stage: String,
        size: usize,
        limit: usize,
    },

    /// The acting signer lacks a permission a planned stage requires
    #[error("Signer {signer} lacks the {permission} permission")]
    MissingPermission {
        signer: Pubkey,
        permission: Permission,
    },

    /// A stage was confirmed out of order
    #[error("Cannot apply stage {stage} in state {from}")]
    InvalidStateTransition { from: String, stage: String },

    /// Connection or RPC error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Account not found on-chain
    #[error("Account not found: {0}")]
    AccountNotFound(Pubkey),

    /// Invalid account data or deserialization error
    #[error("Invalid account data: {0}")]
    InvalidAccountData(String),

    /// Borsh serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] std::io::Error),

    /// Envelope serialization error
    #[error("Bincode error: {0}")]
    Bincode(#[from] bincode::Error),
}

impl SmartAccountSdkError {
    pub(crate) fn malformed(field: &'static str, reason: impl Into<String>) -> Self {
        Self::MalformedMessage {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) fn invariant(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            field,
            reason: reason.into(),
        }
    }
}

impl From<InterfaceError> for SmartAccountSdkError {
    fn from(e: InterfaceError) -> Self {
        match e {
            InterfaceError::Borsh(e) => Self::SerializationError(e),
            other => Self::InvalidAccountData(other.to_string()),
        }
    }
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, SmartAccountSdkError>;
