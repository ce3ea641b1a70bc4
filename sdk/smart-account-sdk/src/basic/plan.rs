use std::fmt;

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::VersionedTransaction;

use crate::buffer::BufferDescriptor;
use crate::error::{Result, SmartAccountSdkError};

/// One step of the buffered transaction life cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Creates the buffer with the first chunk
    CreateBuffer { total_chunks: usize },
    /// Appends chunk `chunk` (1-based after the first) of `total_chunks`
    ExtendBuffer { chunk: usize, total_chunks: usize },
    /// Creates the transaction record from the buffer and closes the buffer
    CreateFromBuffer,
    CreateProposal,
    ApproveProposal,
    Execute,
    CloseTransaction,
    /// Refunds a buffer that will never be materialized
    CloseBuffer,
}

impl Stage {
    pub fn is_buffer_write(&self) -> bool {
        matches!(self, Self::CreateBuffer { .. } | Self::ExtendBuffer { .. })
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CreateBuffer { .. } => f.write_str("create-buffer"),
            Self::ExtendBuffer {
                chunk,
                total_chunks,
            } => write!(f, "extend-buffer({} of {total_chunks})", chunk + 1),
            Self::CreateFromBuffer => f.write_str("create-from-buffer"),
            Self::CreateProposal => f.write_str("create-proposal"),
            Self::ApproveProposal => f.write_str("approve-proposal"),
            Self::Execute => f.write_str("execute"),
            Self::CloseTransaction => f.write_str("close-transaction"),
            Self::CloseBuffer => f.write_str("close-buffer"),
        }
    }
}

/// An unsigned transaction carrying one or more stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub stages: Vec<Stage>,
    /// Instructions of every stage, in stage order
    pub instructions: Vec<Instruction>,
    /// Signature slots are zeroed
    pub transaction: VersionedTransaction,
    /// Wire encoding of `transaction`
    pub bytes: Vec<u8>,
    pub size: usize,
}

impl Envelope {
    pub fn contains(&self, stage: Stage) -> bool {
        self.stages.contains(&stage)
    }

    /// Keys that must sign before submission.
    pub fn signers(&self) -> &[Pubkey] {
        let message = &self.transaction.message;
        let num_signers = usize::from(message.header().num_required_signatures);
        &message.static_account_keys()[..num_signers]
    }
}

/// Everything needed to drive one buffered transaction to execution.
#[derive(Debug, Clone)]
pub struct AssemblyPlan {
    /// Submit in order, each after the previous one is confirmed
    pub envelopes: Vec<Envelope>,
    /// Closes the buffer if the flow stops before materialization
    pub abandon: Envelope,
    pub transaction_index: u64,
    pub transaction: Pubkey,
    pub proposal: Pubkey,
    /// Vault the inner transaction executes as
    pub smart_account: Pubkey,
    pub buffer: BufferDescriptor,
    pub recent_blockhash: Hash,
}

impl AssemblyPlan {
    pub fn stages(&self) -> impl Iterator<Item = &Stage> {
        self.envelopes.iter().flat_map(|e| e.stages.iter())
    }

    /// Tracker that treats this plan's last stage as the end of the flow.
    pub fn tracker(&self) -> AssemblyTracker {
        match self.stages().last() {
            Some(stage) => AssemblyTracker::ending_at(*stage),
            None => AssemblyTracker::new(),
        }
    }
}

/// Where a buffered transaction stands on the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblyState {
    Planning,
    /// First chunk written, more to come
    BufferCreated { total_chunks: usize },
    BufferExtending { written: usize, total_chunks: usize },
    BufferComplete,
    Materialized,
    Proposed,
    Voted,
    Executed,
    Closed,
    Abandoned,
}

impl fmt::Display for AssemblyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planning => f.write_str("planning"),
            Self::BufferCreated { total_chunks } => {
                write!(f, "buffer-created(1 of {total_chunks})")
            },
            Self::BufferExtending {
                written,
                total_chunks,
            } => write!(f, "buffer-extending({written} of {total_chunks})"),
            Self::BufferComplete => f.write_str("buffer-complete"),
            Self::Materialized => f.write_str("materialized"),
            Self::Proposed => f.write_str("proposed"),
            Self::Voted => f.write_str("voted"),
            Self::Executed => f.write_str("executed"),
            Self::Closed => f.write_str("closed"),
            Self::Abandoned => f.write_str("abandoned"),
        }
    }
}

impl AssemblyState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Closed | Self::Abandoned)
    }

    /// Whether the buffer account exists in this state.
    pub fn holds_buffer(&self) -> bool {
        matches!(
            self,
            Self::BufferCreated { .. } | Self::BufferExtending { .. } | Self::BufferComplete
        )
    }

    fn buffer_after(written: usize, total_chunks: usize) -> Self {
        if written >= total_chunks {
            Self::BufferComplete
        } else if written == 1 {
            Self::BufferCreated { total_chunks }
        } else {
            Self::BufferExtending {
                written,
                total_chunks,
            }
        }
    }

    fn written(&self) -> Option<(usize, usize)> {
        match *self {
            Self::BufferCreated { total_chunks } => Some((1, total_chunks)),
            Self::BufferExtending {
                written,
                total_chunks,
            } => Some((written, total_chunks)),
            _ => None,
        }
    }

    /// State after `stage` is confirmed.
    pub fn apply(self, stage: Stage) -> Result<Self> {
        let next = match (self, stage) {
            (Self::Planning, Stage::CreateBuffer { total_chunks }) if total_chunks > 0 => {
                Some(Self::buffer_after(1, total_chunks))
            },
            (state, Stage::ExtendBuffer {
                chunk,
                total_chunks,
            }) => match state.written() {
                Some((written, total)) if written == chunk && total == total_chunks => {
                    Some(Self::buffer_after(written + 1, total_chunks))
                },
                _ => None,
            },
            (Self::BufferComplete, Stage::CreateFromBuffer) => Some(Self::Materialized),
            (Self::Materialized, Stage::CreateProposal) => Some(Self::Proposed),
            (Self::Proposed, Stage::ApproveProposal) => Some(Self::Voted),
            (Self::Voted, Stage::Execute) => Some(Self::Executed),
            (Self::Executed, Stage::CloseTransaction) => Some(Self::Closed),
            (state, Stage::CloseBuffer) if state.holds_buffer() => Some(Self::Abandoned),
            _ => None,
        };
        next.ok_or_else(|| SmartAccountSdkError::InvalidStateTransition {
            from: self.to_string(),
            stage: stage.to_string(),
        })
    }
}

/// Follows confirmed envelopes through [`AssemblyState`].
#[derive(Debug, Clone)]
pub struct AssemblyTracker {
    state: AssemblyState,
    confirmed: Vec<Stage>,
    /// Last stage of the planned flow
    final_stage: Stage,
}

impl Default for AssemblyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AssemblyTracker {
    /// Tracker for a flow that runs through `close-transaction`.
    pub fn new() -> Self {
        Self::ending_at(Stage::CloseTransaction)
    }

    /// Tracker for a flow whose last planned stage is `final_stage`, such as
    /// `execute` when no rent collector is configured.
    pub fn ending_at(final_stage: Stage) -> Self {
        Self {
            state: AssemblyState::Planning,
            confirmed: Vec::new(),
            final_stage,
        }
    }

    pub fn state(&self) -> AssemblyState {
        self.state
    }

    pub fn confirmed(&self) -> &[Stage] {
        &self.confirmed
    }

    /// Whether the flow has reached its last planned stage or stopped.
    pub fn is_finished(&self) -> bool {
        self.state.is_terminal() || self.confirmed.last() == Some(&self.final_stage)
    }

    /// Applies every stage of a confirmed envelope. On error the tracker is
    /// left unchanged.
    pub fn confirm(&mut self, envelope: &Envelope) -> Result<AssemblyState> {
        let mut state = self.state;
        for stage in &envelope.stages {
            state = state.apply(*stage)?;
        }
        tracing::debug!(from = %self.state, to = %state, "envelope confirmed");
        self.state = state;
        self.confirmed.extend(envelope.stages.iter().copied());
        Ok(state)
    }

    /// Gives up on the flow. Any buffer left behind stays claimable through
    /// the plan's abandon envelope.
    pub fn abandon(&mut self) -> Result<AssemblyState> {
        if self.is_finished() {
            return Err(SmartAccountSdkError::InvalidStateTransition {
                from: self.state.to_string(),
                stage: "abandon".to_string(),
            });
        }
        self.state = AssemblyState::Abandoned;
        Ok(self.state)
    }
}
