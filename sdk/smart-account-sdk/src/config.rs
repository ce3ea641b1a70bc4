//! Planner configuration.

use serde::{Deserialize, Serialize};
use smart_account_interface::MAX_BUFFER_SIZE;
use solana_sdk::pubkey::Pubkey;

use crate::core::constants::{DEFAULT_ENVELOPE_BUDGET, DEFAULT_MAX_CHUNK_SIZE, DEFAULT_PROGRAM_ID};
use crate::error::{Result, SmartAccountSdkError};

/// Settings shared by every plan a [`crate::basic::actions::BufferedTransactionBuilder`] produces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlannerConfig {
    /// Smart account program
    #[serde(with = "pubkey_string")]
    pub program_id: Pubkey,
    /// Largest serialized transaction, in bytes
    pub envelope_budget: usize,
    /// Largest buffer write, in bytes
    pub max_chunk_size: u16,
    /// Largest message a buffer may hold
    pub max_buffer_size: usize,
    /// Pack consecutive stages into shared envelopes
    pub fuse_stages: bool,
    /// Pass the lookup table accounts to `execute_transaction`
    pub include_lookup_tables: bool,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            program_id: DEFAULT_PROGRAM_ID,
            envelope_budget: DEFAULT_ENVELOPE_BUDGET,
            max_chunk_size: DEFAULT_MAX_CHUNK_SIZE,
            max_buffer_size: MAX_BUFFER_SIZE,
            fuse_stages: true,
            include_lookup_tables: true,
        }
    }
}

impl PlannerConfig {
    pub fn builder() -> PlannerConfigBuilder {
        PlannerConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(SmartAccountSdkError::invariant(
                "max_chunk_size",
                "must be greater than zero",
            ));
        }
        if self.envelope_budget == 0 {
            return Err(SmartAccountSdkError::invariant(
                "envelope_budget",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// Builder for [`PlannerConfig`]
#[derive(Debug, Default)]
pub struct PlannerConfigBuilder {
    config: PlannerConfig,
}

impl PlannerConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program_id(mut self, program_id: Pubkey) -> Self {
        self.config.program_id = program_id;
        self
    }

    pub fn envelope_budget(mut self, budget: usize) -> Self {
        self.config.envelope_budget = budget;
        self
    }

    pub fn max_chunk_size(mut self, size: u16) -> Self {
        self.config.max_chunk_size = size;
        self
    }

    pub fn max_buffer_size(mut self, size: usize) -> Self {
        self.config.max_buffer_size = size;
        self
    }

    /// Disable to get one envelope per stage
    pub fn fuse_stages(mut self, fuse: bool) -> Self {
        self.config.fuse_stages = fuse;
        self
    }

    pub fn include_lookup_tables(mut self, include: bool) -> Self {
        self.config.include_lookup_tables = include;
        self
    }

    pub fn build(self) -> Result<PlannerConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

mod pubkey_string {
    use serde::{de, Deserialize, Deserializer, Serializer};
    use solana_sdk::pubkey::Pubkey;
    use std::str::FromStr;

    pub fn serialize<S: Serializer>(key: &Pubkey, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(key)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Pubkey, D::Error> {
        let s = String::deserialize(deserializer)?;
        Pubkey::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PlannerConfig::default();
        assert_eq!(config.program_id, smart_account_interface::ID);
        assert_eq!(config.envelope_budget, 1232);
        assert_eq!(config.max_buffer_size, 4000);
        assert!(config.fuse_stages);
        assert!(config.include_lookup_tables);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let err = PlannerConfig::builder().max_chunk_size(0).build().unwrap_err();
        assert!(matches!(
            err,
            SmartAccountSdkError::InvariantViolation {
                field: "max_chunk_size",
                ..
            }
        ));
    }

    #[test]
    fn test_partial_json() {
        let config: PlannerConfig =
            serde_json::from_str(r#"{"maxChunkSize": 500, "fuseStages": false}"#).unwrap();
        assert_eq!(config.max_chunk_size, 500);
        assert!(!config.fuse_stages);
        assert_eq!(config.envelope_budget, 1232);

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains(&smart_account_interface::ID.to_string()));
        assert_eq!(serde_json::from_str::<PlannerConfig>(&json).unwrap(), config);
    }
}
