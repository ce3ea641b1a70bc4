//! Splits the encoded message into buffer writes.

use solana_sdk::hash::hash;

use crate::error::{Result, SmartAccountSdkError};

/// Splits `bytes` into consecutive chunks of at most `max_chunk_size` bytes.
///
/// Every chunk but the last is full. Empty input yields no chunks.
pub fn chunk(bytes: &[u8], max_chunk_size: usize) -> Result<Vec<&[u8]>> {
    if max_chunk_size == 0 {
        return Err(SmartAccountSdkError::invariant(
            "max_chunk_size",
            "must be greater than zero",
        ));
    }
    Ok(bytes.chunks(max_chunk_size).collect())
}

/// The encoded message, its digest and its chunking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferLayout<'a> {
    pub final_hash: [u8; 32],
    pub final_size: u16,
    pub chunks: Vec<&'a [u8]>,
}

impl<'a> BufferLayout<'a> {
    pub fn new(bytes: &'a [u8], max_chunk_size: usize, max_buffer_size: usize) -> Result<Self> {
        let final_size = u16::try_from(bytes.len()).map_err(|_| {
            SmartAccountSdkError::invariant(
                "final_buffer_size",
                format!("{} bytes do not fit in u16", bytes.len()),
            )
        })?;
        if bytes.len() > max_buffer_size {
            return Err(SmartAccountSdkError::invariant(
                "final_buffer_size",
                format!(
                    "{} bytes exceed the buffer limit of {max_buffer_size}",
                    bytes.len()
                ),
            ));
        }
        Ok(Self {
            final_hash: hash(bytes).to_bytes(),
            final_size,
            chunks: chunk(bytes, max_chunk_size)?,
        })
    }

    pub fn num_chunks(&self) -> usize {
        self.chunks.len()
    }

    /// The chunk the buffer is created with. Empty when there is nothing to write.
    pub fn first(&self) -> &'a [u8] {
        self.chunks.first().copied().unwrap_or(&[])
    }

    /// Chunks appended after creation.
    pub fn extensions(&self) -> &[&'a [u8]] {
        self.chunks.get(1..).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_exact_multiple() {
        let bytes = vec![5u8; 1800];
        let chunks = chunk(&bytes, 900).unwrap();
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![900, 900]);
    }

    #[test]
    fn test_one_byte_over() {
        let bytes = vec![5u8; 901];
        let chunks = chunk(&bytes, 900).unwrap();
        assert_eq!(chunks.iter().map(|c| c.len()).collect::<Vec<_>>(), vec![900, 1]);
    }

    #[test]
    fn test_reassembly_and_bound() {
        let bytes: Vec<u8> = (0..3001u32).map(|i| (i * 31 % 251) as u8).collect();
        for max in [1, 7, 750, 3000, 3001, 5000] {
            let chunks = chunk(&bytes, max).unwrap();
            assert_eq!(chunks.len(), bytes.len().div_ceil(max));
            assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= max));
            assert_eq!(chunks.concat(), bytes);
        }
    }

    #[test]
    fn test_empty_input_and_zero_max() {
        assert!(chunk(&[], 10).unwrap().is_empty());
        assert!(chunk(&[1, 2], 0).is_err());
    }

    #[test]
    fn test_layout_digest_and_size() {
        let bytes = vec![9u8; 2000];
        let layout = BufferLayout::new(&bytes, 750, 4000).unwrap();
        assert_eq!(layout.final_size, 2000);
        assert_eq!(layout.final_hash, hash(&bytes).to_bytes());
        assert_eq!(layout.first().len(), 750);
        assert_eq!(layout.extensions().len(), 2);
    }

    #[test]
    fn test_layout_rejects_oversized_buffer() {
        let bytes = vec![0u8; 4001];
        assert!(matches!(
            BufferLayout::new(&bytes, 750, 4000),
            Err(SmartAccountSdkError::InvariantViolation {
                field: "final_buffer_size",
                ..
            })
        ));
        let bytes = vec![0u8; usize::from(u16::MAX) + 1];
        assert!(BufferLayout::new(&bytes, 750, usize::MAX).is_err());
    }

    proptest! {
        #[test]
        fn fuzz_chunks_reassemble_within_bound(
            bytes in prop::collection::vec(any::<u8>(), 0..4000),
            max in 1usize..1500,
        ) {
            let chunks = chunk(&bytes, max).unwrap();
            prop_assert_eq!(chunks.len(), bytes.len().div_ceil(max));
            prop_assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= max));
            if let Some((last, full)) = chunks.split_last() {
                prop_assert!(full.iter().all(|c| c.len() == max));
                prop_assert!(!last.is_empty());
            }
            prop_assert_eq!(chunks.concat(), bytes);
        }

        #[test]
        fn fuzz_layout_describes_input(
            bytes in prop::collection::vec(any::<u8>(), 1..4000),
            max in 1u16..1500,
        ) {
            let layout = BufferLayout::new(&bytes, usize::from(max), 4000).unwrap();
            prop_assert_eq!(usize::from(layout.final_size), bytes.len());
            prop_assert_eq!(layout.final_hash, hash(&bytes).to_bytes());
            let mut rebuilt = layout.first().to_vec();
            for extension in layout.extensions() {
                rebuilt.extend_from_slice(extension);
            }
            prop_assert_eq!(rebuilt, bytes);
        }
    }
}
