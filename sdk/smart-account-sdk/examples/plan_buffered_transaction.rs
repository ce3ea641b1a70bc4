// Example: Planning an oversized transaction for a smart account
//
// This example demonstrates how to:
// 1. Build an inner transaction too large for one ledger transaction
// 2. Plan the buffer, proposal, approval and execution envelopes
// 3. Walk the plan with a tracker as envelopes confirm
//
// Usage:
//   RPC_URL=https://api.devnet.solana.com SETTINGS=<settings pda> CREATOR=<signer> \
//     cargo run --example plan_buffered_transaction

use smart_account_sdk::{RawInnerTransaction, RpcConnection, SmartAccount};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::instruction::{AccountMeta, Instruction};
use solana_sdk::message::Message;
use solana_sdk::pubkey::Pubkey;
use std::str::FromStr;

const MEMO_PROGRAM: Pubkey = solana_sdk::pubkey!("MemoSq4gqABAXKb96qnH8TyNJxQqxQYUv6FhB4Gcb48");

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let url = std::env::var("RPC_URL").unwrap_or_else(|_| "http://localhost:8899".to_string());
    let settings = Pubkey::from_str(&std::env::var("SETTINGS")?)?;
    let creator = Pubkey::from_str(&std::env::var("CREATOR")?)?;
    let connection = RpcConnection::new(url, CommitmentConfig::confirmed());

    let (account, state) = SmartAccount::fetch(&connection, &settings, None).await?;
    println!(
        "Smart account {} ({} signers, threshold {})",
        account.settings,
        state.signers.len(),
        state.threshold
    );

    // 1. A memo signed by the vault, padded past the single transaction limit
    let (vault, _) = account.vault(0);
    let memo = Instruction {
        program_id: MEMO_PROGRAM,
        accounts: vec![AccountMeta::new_readonly(vault, true)],
        data: "buffered ".repeat(250).into_bytes(),
    };
    let inner = Message::new(&[memo], Some(&vault)).serialize();

    // 2. Plan every stage
    let plan = account
        .buffered_transaction()
        .with_creator(creator)
        .with_memo("oversized memo")
        .with_inner_transaction(RawInnerTransaction::Message(inner))
        .plan(&connection)
        .await?;

    println!("Transaction #{}", plan.transaction_index);
    println!("  Transaction PDA: {}", plan.transaction);
    println!("  Proposal PDA: {}", plan.proposal);
    println!("  Buffer: {} (index {})", plan.buffer.address, plan.buffer.buffer_index);
    for (i, envelope) in plan.envelopes.iter().enumerate() {
        let stages: Vec<String> = envelope.stages.iter().map(|s| s.to_string()).collect();
        println!("  Envelope {i}: {} bytes [{}]", envelope.size, stages.join(", "));
    }

    // 3. In a real application, sign and send each envelope, then:
    let mut tracker = plan.tracker();
    for envelope in &plan.envelopes {
        // connection.send_transaction(&signed).await?;
        tracker.confirm(envelope)?;
    }
    println!("Final state: {}", tracker.state());

    Ok(())
}
