//! # CLI Interface
//!
//! Defines the command-line argument structure for `trinary-wallet` using
//! `clap` derive. Everything except `demo` works offline: no node, no
//! network.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use trinary_protocol::crypto::SecurityLevel;
use trinary_protocol::ternary::str_to_trytes;
use trinary_protocol::transaction::{Input, Transfer};

use crate::logging::LogFormat;

/// TRINARY wallet tooling.
///
/// Generates seeds and addresses, prepares signed transfer bundles, and
/// validates bundles read back from a node.
#[derive(Parser, Debug)]
#[command(
    name = "trinary-wallet",
    about = "TRINARY ledger wallet tooling",
    version,
    propagate_version = true
)]
pub struct WalletCli {
    /// Log output format.
    #[arg(
        long,
        global = true,
        value_enum,
        env = "TRINARY_LOG_FORMAT",
        default_value_t = LogFormat::Pretty
    )]
    pub log_format: LogFormat,

    /// More log detail on stderr. Repeat for more.
    #[arg(long, short = 'v', global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands for the wallet binary.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print a fresh random 81-tryte seed.
    Seed,
    /// Derive addresses from a seed.
    Address(AddressArgs),
    /// Add or verify an address checksum.
    #[command(subcommand)]
    Checksum(ChecksumCommand),
    /// Build and sign a transfer bundle without a node.
    Prepare(PrepareArgs),
    /// Validate a bundle given as transaction trytes, head first.
    Validate(ValidateArgs),
    /// Fund an in-memory node, send a transfer, and read it back.
    Demo(DemoArgs),
    /// Print version information and exit.
    Version,
}

/// Arguments for the `address` subcommand.
#[derive(Parser, Debug)]
pub struct AddressArgs {
    /// The seed. Prefer the environment variable over the flag.
    #[arg(long, env = "TRINARY_SEED", hide_env_values = true)]
    pub seed: String,

    /// Key index of the first address.
    #[arg(long, short = 'i', default_value_t = 0)]
    pub index: usize,

    /// Number of consecutive addresses.
    #[arg(long, short = 'n', default_value_t = 1)]
    pub total: usize,

    /// Security level (1, 2 or 3).
    #[arg(long, short = 's', default_value = "2", value_parser = parse_security)]
    pub security: SecurityLevel,

    /// Append the 9-tryte checksum.
    #[arg(long)]
    pub checksum: bool,
}

/// `checksum` subcommands.
#[derive(Subcommand, Debug)]
pub enum ChecksumCommand {
    /// Append the checksum to an 81-tryte address.
    Add { address: String },
    /// Check a 90-tryte address.
    Verify { address: String },
}

/// Arguments for the `prepare` subcommand.
#[derive(Parser, Debug)]
pub struct PrepareArgs {
    /// The seed. Prefer the environment variable over the flag.
    #[arg(long, env = "TRINARY_SEED", hide_env_values = true)]
    pub seed: String,

    /// Output as `ADDRESS:VALUE[:TAG[:MESSAGE]]`. MESSAGE is plain text.
    /// Repeatable.
    #[arg(long = "transfer", short = 't', required = true, value_parser = parse_transfer)]
    pub transfers: Vec<Transfer>,

    /// Input as `ADDRESS:BALANCE:KEY_INDEX[:SECURITY]`. Repeatable.
    #[arg(long = "input", value_parser = parse_input)]
    pub inputs: Vec<Input>,

    /// Where any excess input balance goes.
    #[arg(long)]
    pub remainder: Option<String>,

    /// Bundle timestamp in Unix seconds. Defaults to now.
    #[arg(long)]
    pub timestamp: Option<i64>,

    /// Print a JSON array instead of one transaction per line.
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `validate` subcommand.
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// File with one transaction per line, head first. Reads stdin when
    /// omitted.
    pub file: Option<PathBuf>,
}

/// Arguments for the `demo` subcommand.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Balance to put on the seed's first address.
    #[arg(long, default_value_t = 100)]
    pub balance: i64,

    /// Amount to send.
    #[arg(long, default_value_t = 60)]
    pub value: i64,
}

fn parse_security(s: &str) -> Result<SecurityLevel, String> {
    let level: u8 = s.parse().map_err(|_| format!("not a number: {s:?}"))?;
    SecurityLevel::try_from(level).map_err(|e| e.to_string())
}

fn parse_transfer(s: &str) -> Result<Transfer, String> {
    let mut parts = s.splitn(4, ':');
    let address = parts.next().unwrap_or_default();
    let value = parts
        .next()
        .ok_or_else(|| format!("expected ADDRESS:VALUE, got {s:?}"))?
        .parse::<i64>()
        .map_err(|e| format!("bad value in {s:?}: {e}"))?;

    let mut transfer = Transfer::new(address, value);
    if let Some(tag) = parts.next() {
        transfer = transfer.with_tag(tag);
    }
    if let Some(message) = parts.next() {
        transfer = transfer.with_message(str_to_trytes(message));
    }
    transfer.validate().map_err(|e| e.to_string())?;
    Ok(transfer)
}

fn parse_input(s: &str) -> Result<Input, String> {
    let parts: Vec<&str> = s.split(':').collect();
    let (address, balance, key_index, security) = match parts.as_slice() {
        [a, b, k] => (*a, *b, *k, SecurityLevel::default()),
        [a, b, k, sec] => (*a, *b, *k, parse_security(sec)?),
        _ => return Err(format!("expected ADDRESS:BALANCE:KEY_INDEX[:SECURITY], got {s:?}")),
    };
    let balance = balance
        .parse::<i64>()
        .map_err(|e| format!("bad balance in {s:?}: {e}"))?;
    let key_index = key_index
        .parse::<usize>()
        .map_err(|e| format!("bad key index in {s:?}: {e}"))?;
    Ok(Input::new(address, balance, key_index, security))
}
