//! Free buffer slot search.

use smart_account_interface::find_transaction_buffer_address;
use solana_sdk::pubkey::Pubkey;

use crate::core::connection::SolConnection;
use crate::error::{Result, SmartAccountSdkError};

/// Finds the first buffer index at or after `start` (wrapping) whose account
/// does not exist yet.
///
/// Probes run one at a time. Two planners racing for the same creator can
/// still pick the same slot.
#[tracing::instrument(skip(connection, program_id, settings, creator), fields(%settings, %creator))]
pub async fn allocate_slot(
    connection: &impl SolConnection,
    program_id: &Pubkey,
    settings: &Pubkey,
    creator: &Pubkey,
    start: u8,
) -> Result<(Pubkey, u8)> {
    for offset in 0..=u8::MAX {
        let index = start.wrapping_add(offset);
        let (address, _) = find_transaction_buffer_address(settings, creator, index, program_id);
        let existing = connection
            .get_account(&address)
            .await
            .map_err(|e| SmartAccountSdkError::Connection(e.to_string()))?;
        if existing.is_none() {
            tracing::debug!(index, %address, "found free buffer slot");
            return Ok((address, index));
        }
        tracing::trace!(index, "buffer slot occupied");
    }
    Err(SmartAccountSdkError::NoFreeSlot {
        creator: *creator,
        start,
    })
}
