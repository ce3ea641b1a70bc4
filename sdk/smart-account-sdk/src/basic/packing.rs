//! Greedy packing of stages into envelopes.

use std::collections::HashSet;

use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{v0, AddressLookupTableAccount, Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::VersionedTransaction;

use crate::basic::plan::{Envelope, Stage};
use crate::error::{Result, SmartAccountSdkError};

/// A stage and the instructions that carry it.
#[derive(Debug, Clone)]
pub struct PlannedStage {
    pub stage: Stage,
    pub instructions: Vec<Instruction>,
}

impl PlannedStage {
    pub fn new(stage: Stage, instructions: Vec<Instruction>) -> Self {
        Self {
            stage,
            instructions,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Packer<'a> {
    pub fee_payer: Pubkey,
    pub recent_blockhash: Hash,
    /// Largest serialized envelope
    pub budget: usize,
    pub fuse: bool,
    /// Execute may share an envelope with the stages before it
    pub fuse_execute: bool,
    /// Compiled into envelopes that carry the execute stage
    pub lookup_tables: &'a [AddressLookupTableAccount],
}

impl<'a> Packer<'a> {
    fn can_fuse(&self, current: &[Stage], next: Stage) -> bool {
        if !self.fuse {
            return false;
        }
        if next.is_buffer_write() && current.iter().any(Stage::is_buffer_write) {
            return false;
        }
        if next == Stage::Execute && !self.fuse_execute {
            return false;
        }
        true
    }

    /// Compiles and serializes an envelope without checking the budget.
    pub fn envelope(&self, stages: Vec<Stage>, instructions: Vec<Instruction>) -> Result<Envelope> {
        let use_tables = !self.lookup_tables.is_empty() && stages.contains(&Stage::Execute);
        let message = if use_tables {
            let message = v0::Message::try_compile(
                &self.fee_payer,
                &instructions,
                self.lookup_tables,
                self.recent_blockhash,
            )
            .map_err(|e| SmartAccountSdkError::invariant("envelope.account_keys", e.to_string()))?;
            VersionedMessage::V0(message)
        } else {
            check_account_count(&self.fee_payer, &instructions)?;
            VersionedMessage::Legacy(Message::new_with_blockhash(
                &instructions,
                Some(&self.fee_payer),
                &self.recent_blockhash,
            ))
        };

        let num_signatures = usize::from(message.header().num_required_signatures);
        let transaction = VersionedTransaction {
            signatures: vec![Signature::default(); num_signatures],
            message,
        };
        let bytes = bincode::serialize(&transaction)?;
        Ok(Envelope {
            stages,
            instructions,
            transaction,
            size: bytes.len(),
            bytes,
        })
    }

    /// Envelope carrying a single stage, which must fit the budget on its own.
    pub fn single(&self, planned: PlannedStage) -> Result<Envelope> {
        let stage = planned.stage;
        let envelope = self.envelope(vec![stage], planned.instructions)?;
        if envelope.size > self.budget {
            return Err(SmartAccountSdkError::EnvelopeTooLarge {
                stage: stage.to_string(),
                size: envelope.size,
                limit: self.budget,
            });
        }
        Ok(envelope)
    }

    /// Walks the stages in order, appending each to the open envelope while
    /// the result fits the budget and no barrier separates them.
    pub fn pack(&self, stages: Vec<PlannedStage>) -> Result<Vec<Envelope>> {
        let mut envelopes: Vec<Envelope> = Vec::new();
        let mut open: Option<Envelope> = None;

        for planned in stages {
            if let Some(current) = open.as_ref() {
                if self.can_fuse(&current.stages, planned.stage) {
                    let mut fused_stages = current.stages.clone();
                    fused_stages.push(planned.stage);
                    let mut fused_instructions = current.instructions.clone();
                    fused_instructions.extend(planned.instructions.iter().cloned());

                    match self.envelope(fused_stages, fused_instructions) {
                        Ok(fused) if fused.size <= self.budget => {
                            tracing::trace!(
                                stages = ?fused.stages,
                                size = fused.size,
                                "fused stage"
                            );
                            open = Some(fused);
                            continue;
                        },
                        Ok(_) | Err(SmartAccountSdkError::InvariantViolation { .. }) => {},
                        Err(e) => return Err(e),
                    }
                }
            }

            let envelope = self.single(planned)?;
            if let Some(done) = open.replace(envelope) {
                envelopes.push(done);
            }
        }
        envelopes.extend(open);

        tracing::debug!(
            envelopes = envelopes.len(),
            sizes = ?envelopes.iter().map(|e| e.size).collect::<Vec<_>>(),
            "packed stages"
        );
        Ok(envelopes)
    }
}

/// Legacy messages address at most 256 accounts.
fn check_account_count(fee_payer: &Pubkey, instructions: &[Instruction]) -> Result<()> {
    let mut keys = HashSet::new();
    keys.insert(*fee_payer);
    for ix in instructions {
        keys.insert(ix.program_id);
        keys.extend(ix.accounts.iter().map(|meta| meta.pubkey));
    }
    if keys.len() > usize::from(u8::MAX) + 1 {
        return Err(SmartAccountSdkError::invariant(
            "envelope.account_keys",
            format!("{} unique accounts exceed 256", keys.len()),
        ));
    }
    Ok(())
}
