use crate::advanced::accounts::execute_accounts;
use crate::advanced::instructions;
use crate::basic::packing::{Packer, PlannedStage};
use crate::basic::plan::{AssemblyPlan, Stage};
use crate::basic::smart_account::SmartAccount;
use crate::buffer::{allocate_slot, BufferDescriptor, BufferLayout};
use crate::codec::{RawInnerTransaction, SmartAccountMessage};
use crate::config::PlannerConfig;
use crate::core::connection::SolConnection;
use crate::error::{Result, SmartAccountSdkError};
use crate::lookup::{resolve_all, ResolvedLookups};
use crate::utils;
use smart_account_interface::{
    CreateTransactionArgs, CreateTransactionBufferArgs, Permission, Settings,
    EMPTY_TRANSACTION_MESSAGE, MAX_MEMO_LEN,
};
use solana_sdk::instruction::AccountMeta;
use solana_sdk::pubkey::Pubkey;

/// Plans the envelopes that take an oversized inner transaction through a
/// transaction buffer, proposal, approval and execution.
///
/// Index-like arguments are taken wide and checked to fit their on-chain `u8`
/// before anything is fetched or built.
#[derive(Debug, Clone)]
pub struct BufferedTransactionBuilder {
    settings: Pubkey,
    config: PlannerConfig,
    creator: Option<Pubkey>,
    fee_payer: Option<Pubkey>,
    inner: Option<RawInnerTransaction>,
    account_index: u32,
    account_bump: Option<u32>,
    ephemeral_signers: u32,
    buffer_start_index: u32,
    memo: Option<String>,
}

/// Builder arguments after range checks.
struct CheckedArgs<'a> {
    creator: Pubkey,
    fee_payer: Pubkey,
    inner: &'a RawInnerTransaction,
    account_index: u8,
    account_bump: Option<u8>,
    ephemeral_signers: u8,
    buffer_start_index: u8,
}

fn narrow(value: u32, field: &'static str) -> Result<u8> {
    u8::try_from(value).map_err(|_| {
        SmartAccountSdkError::invariant(field, format!("{value} out of range 0-255"))
    })
}

fn require_permission(settings: &Settings, signer: &Pubkey, permission: Permission) -> Result<()> {
    if settings.signer_has_permission(signer, permission) {
        Ok(())
    } else {
        Err(SmartAccountSdkError::MissingPermission {
            signer: *signer,
            permission,
        })
    }
}

impl BufferedTransactionBuilder {
    pub fn new(settings: Pubkey) -> Self {
        Self {
            settings,
            config: PlannerConfig::default(),
            creator: None,
            fee_payer: None,
            inner: None,
            account_index: 0,
            account_bump: None,
            ephemeral_signers: 0,
            buffer_start_index: 0,
            memo: None,
        }
    }

    pub fn with_config(mut self, config: PlannerConfig) -> Self {
        self.config = config;
        self
    }

    /// Signer that creates the buffer, proposes, approves and executes
    pub fn with_creator(mut self, creator: Pubkey) -> Self {
        self.creator = Some(creator);
        self
    }

    /// Pays fees and rent; defaults to the creator
    pub fn with_fee_payer(mut self, fee_payer: Pubkey) -> Self {
        self.fee_payer = Some(fee_payer);
        self
    }

    pub fn with_inner_transaction(mut self, inner: RawInnerTransaction) -> Self {
        self.inner = Some(inner);
        self
    }

    pub fn with_account_index(mut self, account_index: u32) -> Self {
        self.account_index = account_index;
        self
    }

    /// Checked against the derived vault bump when set
    pub fn with_account_bump(mut self, account_bump: u32) -> Self {
        self.account_bump = Some(account_bump);
        self
    }

    pub fn with_ephemeral_signers(mut self, count: u32) -> Self {
        self.ephemeral_signers = count;
        self
    }

    /// First buffer index to probe
    pub fn with_buffer_start_index(mut self, index: u32) -> Self {
        self.buffer_start_index = index;
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = Some(memo.into());
        self
    }

    fn check(&self) -> Result<CheckedArgs<'_>> {
        self.config.validate()?;
        let creator = self
            .creator
            .ok_or_else(|| SmartAccountSdkError::invariant("creator", "required"))?;
        let inner = self
            .inner
            .as_ref()
            .ok_or_else(|| SmartAccountSdkError::invariant("inner_transaction", "required"))?;
        if let Some(memo) = &self.memo {
            if memo.len() > MAX_MEMO_LEN {
                return Err(SmartAccountSdkError::invariant(
                    "memo",
                    format!("{} bytes exceed {MAX_MEMO_LEN}", memo.len()),
                ));
            }
        }
        Ok(CheckedArgs {
            creator,
            fee_payer: self.fee_payer.unwrap_or(creator),
            inner,
            account_index: narrow(self.account_index, "account_index")?,
            account_bump: self
                .account_bump
                .map(|bump| narrow(bump, "account_bump"))
                .transpose()?,
            ephemeral_signers: narrow(self.ephemeral_signers, "ephemeral_signers")?,
            buffer_start_index: narrow(self.buffer_start_index, "buffer_index")?,
        })
    }

    /// Reads the settings, a blockhash, free buffer slots and lookup tables,
    /// then plans every envelope. Nothing is submitted.
    #[tracing::instrument(skip_all, fields(settings = %self.settings))]
    pub async fn plan(&self, connection: &impl SolConnection) -> Result<AssemblyPlan> {
        let args = self.check()?;
        let program_id = self.config.program_id;
        let smart_account = SmartAccount::new(program_id, self.settings);

        let (vault, vault_bump) = smart_account.vault(args.account_index);
        if let Some(bump) = args.account_bump {
            if bump != vault_bump {
                return Err(SmartAccountSdkError::invariant(
                    "account_bump",
                    format!("{bump} does not match the vault bump {vault_bump}"),
                ));
            }
        }

        let inner = args.inner.decode()?;
        let message = SmartAccountMessage::try_from_inner(&inner)?;
        let encoded = message.encode()?;
        let layout = BufferLayout::new(
            &encoded,
            usize::from(self.config.max_chunk_size),
            self.config.max_buffer_size,
        )?;
        tracing::debug!(
            message_len = encoded.len(),
            chunks = layout.num_chunks(),
            lookups = inner.address_table_lookups.len(),
            "encoded inner transaction"
        );

        let (settings, recent_blockhash) = tokio::try_join!(
            smart_account.fetch_settings(connection),
            async {
                connection
                    .get_latest_blockhash()
                    .await
                    .map_err(|e| SmartAccountSdkError::Connection(e.to_string()))
            },
        )?;

        for permission in [Permission::Initiate, Permission::Vote, Permission::Execute] {
            require_permission(&settings, &args.creator, permission)?;
        }

        let transaction_index = settings.next_transaction_index().ok_or_else(|| {
            SmartAccountSdkError::invariant("transaction_index", "settings counter overflows u64")
        })?;
        let (transaction, proposal) = smart_account.transaction(transaction_index);
        let ephemeral_signers =
            utils::derive_ephemeral_signers(&program_id, &transaction, args.ephemeral_signers);

        let (buffer, buffer_index) = allocate_slot(
            connection,
            &program_id,
            &self.settings,
            &args.creator,
            args.buffer_start_index,
        )
        .await?;

        let resolved = if inner.address_table_lookups.is_empty() {
            ResolvedLookups::default()
        } else {
            resolve_all(connection, &inner.address_table_lookups).await?
        };
        let remaining_accounts = execute_accounts(
            &message,
            &resolved,
            &vault,
            &ephemeral_signers,
            self.config.include_lookup_tables,
        );

        let stages = self.stages(
            &args,
            &settings,
            &layout,
            buffer,
            buffer_index,
            transaction_index,
            transaction,
            proposal,
            remaining_accounts,
        )?;

        let packer = Packer {
            fee_payer: args.fee_payer,
            recent_blockhash,
            budget: self.config.envelope_budget,
            fuse: self.config.fuse_stages,
            fuse_execute: settings.threshold <= 1 && settings.time_lock == 0,
            lookup_tables: &resolved.tables,
        };
        let envelopes = packer.pack(stages)?;
        let abandon = packer.single(PlannedStage::new(
            Stage::CloseBuffer,
            vec![instructions::close_transaction_buffer(
                &program_id,
                &self.settings,
                &buffer,
                &args.creator,
            )?],
        ))?;

        tracing::info!(
            transaction_index,
            %transaction,
            buffer_index,
            envelopes = envelopes.len(),
            "planned buffered transaction"
        );

        Ok(AssemblyPlan {
            envelopes,
            abandon,
            transaction_index,
            transaction,
            proposal,
            smart_account: vault,
            buffer: BufferDescriptor {
                address: buffer,
                creator: args.creator,
                buffer_index,
                final_size: layout.final_size,
                final_hash: layout.final_hash,
                chunks: layout.chunks.iter().map(|c| c.to_vec()).collect(),
            },
            recent_blockhash,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn stages(
        &self,
        args: &CheckedArgs<'_>,
        settings: &Settings,
        layout: &BufferLayout<'_>,
        buffer: Pubkey,
        buffer_index: u8,
        transaction_index: u64,
        transaction: Pubkey,
        proposal: Pubkey,
        remaining_accounts: Vec<AccountMeta>,
    ) -> Result<Vec<PlannedStage>> {
        let program_id = &self.config.program_id;
        let settings_key = &self.settings;
        let creator = &args.creator;
        let total_chunks = layout.num_chunks();
        let mut stages = Vec::with_capacity(total_chunks + 5);

        stages.push(PlannedStage::new(
            Stage::CreateBuffer { total_chunks },
            vec![instructions::create_transaction_buffer(
                program_id,
                settings_key,
                &buffer,
                creator,
                &args.fee_payer,
                CreateTransactionBufferArgs {
                    buffer_index,
                    account_index: args.account_index,
                    final_buffer_hash: layout.final_hash,
                    final_buffer_size: layout.final_size,
                    buffer: layout.first().to_vec(),
                },
            )?],
        ));

        for (offset, chunk) in layout.extensions().iter().enumerate() {
            stages.push(PlannedStage::new(
                Stage::ExtendBuffer {
                    chunk: offset + 1,
                    total_chunks,
                },
                vec![instructions::extend_transaction_buffer(
                    program_id,
                    settings_key,
                    &buffer,
                    creator,
                    chunk.to_vec(),
                )?],
            ));
        }

        let (_, account_bump) =
            utils::derive_smart_account_pda(program_id, settings_key, args.account_index);
        stages.push(PlannedStage::new(
            Stage::CreateFromBuffer,
            vec![instructions::create_transaction_from_buffer(
                program_id,
                settings_key,
                &transaction,
                &buffer,
                creator,
                &args.fee_payer,
                CreateTransactionArgs {
                    account_index: args.account_index,
                    account_bump,
                    ephemeral_signers: args.ephemeral_signers,
                    transaction_message: EMPTY_TRANSACTION_MESSAGE.to_vec(),
                    memo: self.memo.clone(),
                },
            )?],
        ));

        stages.push(PlannedStage::new(
            Stage::CreateProposal,
            vec![instructions::create_proposal(
                program_id,
                settings_key,
                &proposal,
                creator,
                &args.fee_payer,
                transaction_index,
            )?],
        ));

        stages.push(PlannedStage::new(
            Stage::ApproveProposal,
            vec![instructions::approve_proposal(
                program_id,
                settings_key,
                &proposal,
                creator,
                None,
            )?],
        ));

        stages.push(PlannedStage::new(
            Stage::Execute,
            vec![instructions::execute_transaction(
                program_id,
                settings_key,
                &proposal,
                &transaction,
                creator,
                remaining_accounts,
            )?],
        ));

        match settings.rent_collector {
            Some(rent_collector) => stages.push(PlannedStage::new(
                Stage::CloseTransaction,
                vec![instructions::close_transaction(
                    program_id,
                    settings_key,
                    &proposal,
                    &transaction,
                    &rent_collector,
                )?],
            )),
            None => tracing::warn!(
                settings = %self.settings,
                "settings have no rent collector, close-transaction not planned"
            ),
        }

        Ok(stages)
    }
}
