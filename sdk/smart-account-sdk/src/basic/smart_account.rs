use crate::basic::actions::BufferedTransactionBuilder;
use crate::config::PlannerConfig;
use crate::core::connection::SolConnection;
use crate::core::constants::DEFAULT_PROGRAM_ID;
use crate::error::Result;
use crate::utils;
use smart_account_interface::Settings;
use solana_sdk::pubkey::Pubkey;

/// A smart account on-chain, identified by its settings PDA.
#[derive(Debug, Clone)]
pub struct SmartAccount {
    /// Settings PDA - signers, threshold and the transaction counter
    pub settings: Pubkey,

    /// Program ID of the smart account program
    pub program_id: Pubkey,
}

impl SmartAccount {
    pub fn new(program_id: Pubkey, settings: Pubkey) -> Self {
        Self {
            settings,
            program_id,
        }
    }

    /// Smart account whose settings PDA is seeded by `seed`
    pub fn from_seed(seed: &Pubkey, program_id: Option<Pubkey>) -> Self {
        let program_id = program_id.unwrap_or(DEFAULT_PROGRAM_ID);
        let (settings, _) = smart_account_interface::find_settings_address(seed, &program_id);
        Self::new(program_id, settings)
    }

    /// Fetch an existing smart account, checking its settings account parses
    pub async fn fetch(
        connection: &impl SolConnection,
        settings: &Pubkey,
        program_id: Option<Pubkey>,
    ) -> Result<(Self, Settings)> {
        let program_id = program_id.unwrap_or(DEFAULT_PROGRAM_ID);
        let state = utils::fetch_settings(connection, settings).await?;
        Ok((Self::new(program_id, *settings), state))
    }

    pub async fn fetch_settings(&self, connection: &impl SolConnection) -> Result<Settings> {
        utils::fetch_settings(connection, &self.settings).await
    }

    /// Vault address and bump for `account_index`
    pub fn vault(&self, account_index: u8) -> (Pubkey, u8) {
        utils::derive_smart_account_pda(&self.program_id, &self.settings, account_index)
    }

    /// Transaction record and proposal addresses for `transaction_index`
    pub fn transaction(&self, transaction_index: u64) -> (Pubkey, Pubkey) {
        utils::derive_transaction_pdas(&self.program_id, &self.settings, transaction_index)
    }

    pub fn buffer(&self, creator: &Pubkey, buffer_index: u8) -> Pubkey {
        smart_account_interface::find_transaction_buffer_address(
            &self.settings,
            creator,
            buffer_index,
            &self.program_id,
        )
        .0
    }

    /// Start planning an oversized transaction for this smart account
    pub fn buffered_transaction(&self) -> BufferedTransactionBuilder {
        let config = PlannerConfig {
            program_id: self.program_id,
            ..PlannerConfig::default()
        };
        BufferedTransactionBuilder::new(self.settings).with_config(config)
    }
}
