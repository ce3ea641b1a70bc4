//! On-chain transaction buffer: chunking and slot allocation.

pub mod chunker;
pub mod slot;

pub use chunker::{chunk, BufferLayout};
pub use slot::allocate_slot;

use solana_sdk::pubkey::Pubkey;

/// A buffer the plan creates, fills and consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferDescriptor {
    pub address: Pubkey,
    pub creator: Pubkey,
    pub buffer_index: u8,
    pub final_size: u16,
    pub final_hash: [u8; 32],
    /// Chunks in write order. The first rides on `create-buffer`, the rest
    /// on `extend-buffer`.
    pub chunks: Vec<Vec<u8>>,
}
