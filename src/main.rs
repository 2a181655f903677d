use std::{fs, path::PathBuf, process};

use anyhow::Context;
use clap::Parser;
#[macro_use]
extern crate log;

use bank_ledger::{replay, LogNotifier, Seed};

/// Replays a batch of bank operations against a seeded in-memory ledger
#[derive(Debug, Parser)]
#[clap(version)]
struct Args {
    /// JSON file with the registered usernames and the initial accounts
    #[clap(long)]
    seed: PathBuf,

    /// CSV file of operations: type, user, account, amount, age
    operations: PathBuf,
}

fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()) {
        error!("{e:#}");
        process::exit(1);
    }
}

fn run(args: Args) -> anyhow::Result<()> {
    let seed = fs::read_to_string(&args.seed)
        .with_context(|| format!("Unable to read seed file {}", args.seed.display()))?;
    let seed: Seed = serde_json::from_str(&seed).context("Malformed seed file")?;
    let mut bank = seed.into_bank(LogNotifier)?;

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(b',')
        .trim(csv::Trim::All)
        .from_path(&args.operations)
        .with_context(|| format!("Unable to open {}", args.operations.display()))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(true)
        .from_writer(std::io::stdout());

    let skipped = replay(&mut rdr, &mut bank, &mut writer)?;
    if skipped > 0 {
        warn!("{skipped} malformed rows skipped");
    }

    Ok(())
}
