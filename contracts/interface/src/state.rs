//! Account layouts read by clients.

use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::pubkey::Pubkey;

use crate::error::InterfaceError;

/// Smart account settings: signers, threshold and the transaction counter.
///
/// Stored as an 8-byte Anchor account discriminator followed by the borsh
/// encoding of this struct. Accounts are over-allocated, so trailing bytes are
/// expected and ignored.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Key used to seed the settings PDA
    pub seed: Pubkey,
    /// `Pubkey::default()` for autonomous smart accounts
    pub settings_authority: Pubkey,
    pub threshold: u16,
    /// Seconds between approval and earliest execution
    pub time_lock: u32,
    /// Last transaction index; 0 means none were created yet
    pub transaction_index: u64,
    /// Transactions up to this index are stale
    pub stale_transaction_index: u64,
    /// Receives rent of closed transactions; `None` disables closing
    pub rent_collector: Option<Pubkey>,
    pub bump: u8,
    /// Sorted by key
    pub signers: Vec<SmartAccountSigner>,
}

impl Settings {
    pub const DISCRIMINATOR: [u8; 8] = [223, 179, 163, 190, 177, 224, 67, 173];

    /// Parse a settings account, checking its discriminator.
    pub fn try_from_account_data(data: &[u8]) -> Result<Self, InterfaceError> {
        if data.len() < 8 {
            return Err(InterfaceError::DataTooShort {
                needed: 8,
                got: data.len(),
            });
        }
        let (tag, mut rest) = data.split_at(8);
        if tag != Self::DISCRIMINATOR {
            let mut found = [0u8; 8];
            found.copy_from_slice(tag);
            return Err(InterfaceError::AccountDiscriminatorMismatch {
                expected: Self::DISCRIMINATOR,
                found,
            });
        }
        Ok(Self::deserialize(&mut rest)?)
    }

    /// Serialize with the account discriminator, as stored on chain.
    pub fn to_account_data(&self) -> Result<Vec<u8>, InterfaceError> {
        let mut data = Self::DISCRIMINATOR.to_vec();
        self.serialize(&mut data)?;
        Ok(data)
    }

    pub fn signer(&self, key: &Pubkey) -> Option<&SmartAccountSigner> {
        self.signers
            .binary_search_by_key(key, |s| s.key)
            .ok()
            .map(|index| &self.signers[index])
    }

    pub fn signer_has_permission(&self, key: &Pubkey, permission: Permission) -> bool {
        self.signer(key)
            .map_or(false, |s| s.permissions.has(permission))
    }

    /// Index the next transaction created on this smart account will get.
    pub fn next_transaction_index(&self) -> Option<u64> {
        self.transaction_index.checked_add(1)
    }
}

#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, PartialEq, Eq)]
pub struct SmartAccountSigner {
    pub key: Pubkey,
    pub permissions: Permissions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Initiate = 1 << 0,
    Vote = 1 << 1,
    Execute = 1 << 2,
}

impl core::fmt::Display for Permission {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Permission::Initiate => "Initiate",
            Permission::Vote => "Vote",
            Permission::Execute => "Execute",
        };
        f.write_str(name)
    }
}

/// Bitmask of [`Permission`]s.
#[derive(BorshSerialize, BorshDeserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Permissions {
    pub mask: u8,
}

impl Permissions {
    pub const ALL: Self = Self { mask: 0b111 };

    pub fn from_vec(permissions: &[Permission]) -> Self {
        let mut mask = 0;
        for permission in permissions {
            mask |= *permission as u8;
        }
        Self { mask }
    }

    pub fn has(&self, permission: Permission) -> bool {
        self.mask & (permission as u8) != 0
    }
}
