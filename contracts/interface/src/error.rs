//! Interface Error Types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InterfaceError {
    #[error("Unknown instruction discriminator {0:?}")]
    UnknownDiscriminator([u8; 8]),

    #[error("Account discriminator mismatch: expected {expected:?}, found {found:?}")]
    AccountDiscriminatorMismatch { expected: [u8; 8], found: [u8; 8] },

    #[error("Data too short: need at least {needed} bytes, got {got}")]
    DataTooShort { needed: usize, got: usize },

    #[error("Borsh error: {0}")]
    Borsh(#[from] std::io::Error),
}
