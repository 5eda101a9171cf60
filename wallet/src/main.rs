// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # TRINARY Wallet
//!
//! Entry point for the `trinary-wallet` binary. Parses CLI arguments,
//! initializes logging, and runs one command:
//!
//! - `seed`     — print a fresh random seed
//! - `address`  — derive addresses from a seed
//! - `checksum` — add or verify an address checksum
//! - `prepare`  — build and sign a transfer bundle offline
//! - `validate` — check a bundle read back from a node
//! - `demo`     — run a full send against an in-memory node
//! - `version`  — print build version information

mod cli;
mod logging;

use std::io::Read;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;

use trinary_protocol::client::prepare_transfers_offline;
use trinary_protocol::config::{SendOptions, TransferOptions};
use trinary_protocol::crypto::{add_checksum, generate_address, generate_seed, is_valid_checksum};
use trinary_protocol::network::MemoryNode;
use trinary_protocol::transaction::{validate_bundle, Bundle, Transaction, Transfer};
use trinary_protocol::Client;

use cli::{Commands, WalletCli};

/// Throwaway seed for the `demo` command. Never use it for real funds.
const DEMO_SEED: &str =
    "DEMO9SEED9DEMO9SEED9DEMO9SEED9DEMO9SEED9DEMO9SEED9DEMO9SEED9DEMO9SEED9DEMO9SEED9D";

#[tokio::main]
async fn main() -> Result<()> {
    let cli = WalletCli::parse();
    logging::init(cli.log_format, cli.verbose);

    match cli.command {
        Commands::Seed => {
            println!("{}", generate_seed());
            Ok(())
        }
        Commands::Address(args) => derive_addresses(args),
        Commands::Checksum(command) => checksum(command),
        Commands::Prepare(args) => prepare(args),
        Commands::Validate(args) => validate(args),
        Commands::Demo(args) => demo(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

fn derive_addresses(args: cli::AddressArgs) -> Result<()> {
    for index in args.index..args.index + args.total {
        let address = generate_address(&args.seed, index, args.security)
            .with_context(|| format!("failed to derive address {index}"))?;
        let address = if args.checksum {
            add_checksum(&address)?
        } else {
            address
        };
        println!("{index}\t{address}");
    }
    Ok(())
}

fn checksum(command: cli::ChecksumCommand) -> Result<()> {
    match command {
        cli::ChecksumCommand::Add { address } => {
            println!("{}", add_checksum(&address).context("cannot add checksum")?);
        }
        cli::ChecksumCommand::Verify { address } => {
            if !is_valid_checksum(&address).context("not a 90-tryte address")? {
                bail!("checksum does not match");
            }
            println!("ok");
        }
    }
    Ok(())
}

fn prepare(args: cli::PrepareArgs) -> Result<()> {
    let timestamp = args
        .timestamp
        .unwrap_or_else(|| chrono::Utc::now().timestamp());
    let trytes = prepare_transfers_offline(
        &args.seed,
        &args.transfers,
        &args.inputs,
        args.remainder.as_deref(),
        timestamp,
    )
    .context("failed to prepare transfer")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&trytes)?);
    } else {
        for raw in &trytes {
            println!("{raw}");
        }
    }
    Ok(())
}

fn validate(args: cli::ValidateArgs) -> Result<()> {
    let mut text = String::new();
    match &args.file {
        Some(path) => {
            text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
        }
        None => {
            std::io::stdin()
                .read_to_string(&mut text)
                .context("failed to read stdin")?;
        }
    }

    // Input is head first; bundles are held tail first.
    let mut transactions = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(line, raw)| {
            Transaction::from_trytes(raw)
                .with_context(|| format!("line {} is not a transaction", line + 1))
        })
        .collect::<Result<Vec<_>>>()?;
    transactions.reverse();

    let bundle = Bundle::from_transactions(transactions);
    validate_bundle(&bundle).context("bundle is invalid")?;
    println!("{}", bundle.hash());
    Ok(())
}

async fn demo(args: cli::DemoArgs) -> Result<()> {
    let node = Arc::new(MemoryNode::new());
    let client = Client::new(Arc::clone(&node));

    let funded = generate_address(DEMO_SEED, 0, Default::default())?;
    node.set_balance(&funded, args.balance);
    tracing::info!(address = %funded, balance = args.balance, "funded demo address");

    let transfer = Transfer::new("9".repeat(81), args.value).with_tag("DEMO");
    let sent = client
        .send_transfer(
            DEMO_SEED,
            &[transfer],
            &TransferOptions::default(),
            &SendOptions::default(),
        )
        .await
        .context("demo transfer failed")?;

    let tail = sent.last().context("node returned no transactions")?.hash()?;
    let bundle = client.get_bundle(&tail).await?;
    println!("bundle {}", bundle.hash());
    for tx in bundle.transactions() {
        println!("  [{}] {:>6}  {}", tx.current_index, tx.value, tx.address);
    }
    Ok(())
}

fn print_version() {
    println!("trinary-wallet {}", env!("CARGO_PKG_VERSION"));
    println!("rustc          {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
