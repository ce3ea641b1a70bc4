//! Plans oversized smart account transactions.
//!
//! An inner transaction too large for one ledger transaction is re-encoded in
//! the smart account message format, written to an on-chain buffer in chunks,
//! then materialized, proposed, approved, executed and closed. This crate
//! produces the unsigned envelopes for each of those stages; signing and
//! submission stay with the caller.

pub mod advanced;
pub mod basic;
pub mod buffer;
pub mod codec;
pub mod config;
pub mod core;
pub mod error;
pub mod lookup;
pub mod types;
pub mod utils;

pub use crate::basic::actions::BufferedTransactionBuilder;
pub use crate::basic::plan::{AssemblyPlan, AssemblyState, AssemblyTracker, Envelope, Stage};
pub use crate::basic::smart_account::SmartAccount;
pub use crate::codec::RawInnerTransaction;
pub use crate::config::{PlannerConfig, PlannerConfigBuilder};
pub use crate::core::connection::{RpcConnection, SolConnection};
pub use crate::error::{Result, SmartAccountSdkError};
pub use crate::types::{InnerMessage, LookupTableReference, MessageVersion};

pub mod state {
    pub use smart_account_interface::{Permission, Permissions, Settings, SmartAccountSigner};
}
