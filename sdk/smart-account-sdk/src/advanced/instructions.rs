use smart_account_interface::{
    CreateProposalArgs, CreateTransactionArgs, CreateTransactionBufferArgs,
    ExtendTransactionBufferArgs, SmartAccountInstruction, VoteOnProposalArgs,
};
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::pubkey::Pubkey;
use solana_system_interface::program as system_program;

use crate::error::Result;

fn instruction(
    program_id: &Pubkey,
    accounts: Vec<AccountMeta>,
    instruction: SmartAccountInstruction,
) -> Result<Instruction> {
    Ok(Instruction {
        program_id: *program_id,
        accounts,
        data: instruction.pack()?,
    })
}

pub fn create_transaction_buffer(
    program_id: &Pubkey,
    settings: &Pubkey,
    buffer: &Pubkey,
    creator: &Pubkey,
    rent_payer: &Pubkey,
    args: CreateTransactionBufferArgs,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*buffer, false),
        AccountMeta::new_readonly(*creator, true),
        AccountMeta::new(*rent_payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::CreateTransactionBuffer(args),
    )
}

pub fn extend_transaction_buffer(
    program_id: &Pubkey,
    settings: &Pubkey,
    buffer: &Pubkey,
    creator: &Pubkey,
    chunk: Vec<u8>,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*buffer, false),
        AccountMeta::new_readonly(*creator, true),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::ExtendTransactionBuffer(ExtendTransactionBufferArgs {
            buffer: chunk,
        }),
    )
}

/// Refunds an abandoned buffer to its creator.
pub fn close_transaction_buffer(
    program_id: &Pubkey,
    settings: &Pubkey,
    buffer: &Pubkey,
    creator: &Pubkey,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*buffer, false),
        AccountMeta::new_readonly(*creator, true),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::CloseTransactionBuffer,
    )
}

/// Materializes the transaction record from a complete buffer. The buffer's
/// rent goes back to `creator`.
pub fn create_transaction_from_buffer(
    program_id: &Pubkey,
    settings: &Pubkey,
    transaction: &Pubkey,
    buffer: &Pubkey,
    creator: &Pubkey,
    rent_payer: &Pubkey,
    args: CreateTransactionArgs,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new(*settings, false),
        AccountMeta::new(*transaction, false),
        AccountMeta::new_readonly(*creator, true),
        AccountMeta::new(*rent_payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new(*buffer, false),
        AccountMeta::new(*creator, true),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::CreateTransactionFromBuffer(args),
    )
}

pub fn create_proposal(
    program_id: &Pubkey,
    settings: &Pubkey,
    proposal: &Pubkey,
    creator: &Pubkey,
    rent_payer: &Pubkey,
    transaction_index: u64,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*proposal, false),
        AccountMeta::new_readonly(*creator, true),
        AccountMeta::new(*rent_payer, true),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::CreateProposal(CreateProposalArgs {
            transaction_index,
            draft: false,
        }),
    )
}

pub fn approve_proposal(
    program_id: &Pubkey,
    settings: &Pubkey,
    proposal: &Pubkey,
    signer: &Pubkey,
    memo: Option<String>,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*signer, true),
        AccountMeta::new(*proposal, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::ApproveProposal(VoteOnProposalArgs { memo }),
    )
}

/// `remaining_accounts` comes from [`crate::advanced::accounts::execute_accounts`].
pub fn execute_transaction(
    program_id: &Pubkey,
    settings: &Pubkey,
    proposal: &Pubkey,
    transaction: &Pubkey,
    signer: &Pubkey,
    remaining_accounts: Vec<AccountMeta>,
) -> Result<Instruction> {
    let mut accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*proposal, false),
        AccountMeta::new_readonly(*transaction, false),
        AccountMeta::new_readonly(*signer, true),
    ];
    accounts.extend(remaining_accounts);
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::ExecuteTransaction,
    )
}

pub fn close_transaction(
    program_id: &Pubkey,
    settings: &Pubkey,
    proposal: &Pubkey,
    transaction: &Pubkey,
    rent_collector: &Pubkey,
) -> Result<Instruction> {
    let accounts = vec![
        AccountMeta::new_readonly(*settings, false),
        AccountMeta::new(*proposal, false),
        AccountMeta::new(*transaction, false),
        AccountMeta::new(*rent_collector, false),
        AccountMeta::new_readonly(system_program::id(), false),
    ];
    instruction(
        program_id,
        accounts,
        SmartAccountInstruction::CloseTransaction,
    )
}
