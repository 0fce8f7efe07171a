// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # powchain
//!
//! Entry point for the `powchain` binary. Parses CLI arguments, initializes
//! logging, opens the chain store, and runs one subcommand:
//!
//! - `addblock --data DATA`: mine and append a block
//! - `printchain`: print every block, newest first
//! - `verify`: audit the whole chain
//!
//! The store is always closed before exit, also when the command fails.

mod cli;
mod logging;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use powchain::config::ChainConfig;
use powchain::{Blockchain, ProofOfWork};

use cli::{Commands, PowchainCli};

fn main() -> Result<()> {
    let cli = PowchainCli::parse();

    logging::init_logging(cli.global.default_log_level(), cli.global.log_format.into());

    let config = cli.global.chain_config();
    tracing::debug!(
        data_dir = %config.data_dir.display(),
        difficulty = config.difficulty,
        "starting powchain"
    );

    let mut chain = open_chain(&config)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let outcome = match cli.command {
        Commands::AddBlock(args) => add_block(&mut chain, args.data, &mut out),
        Commands::PrintChain => print_chain(&chain, &mut out),
        Commands::Verify => verify_chain(&chain, &mut out),
    };

    chain.close().context("failed to close chain store")?;
    outcome
}

/// Opens (and on first run bootstraps) the chain described by `config`.
fn open_chain(config: &ChainConfig) -> Result<Blockchain> {
    Blockchain::with_config(config).with_context(|| {
        format!(
            "failed to open chain store at {}",
            config.data_dir.display()
        )
    })
}

/// Mines `data` into a new block and reports its hash.
fn add_block(chain: &mut Blockchain, data: String, out: &mut impl Write) -> Result<()> {
    let block = chain
        .add_block(data)
        .context("failed to append block")?;

    writeln!(out, "Success!")?;
    writeln!(out, "Hash: {}", block.hash_hex())?;
    Ok(())
}

/// Prints every block newest-first, each followed by its proof-of-work check.
fn print_chain(chain: &Blockchain, out: &mut impl Write) -> Result<()> {
    for block in chain.iter() {
        let block = block.context("failed to read block")?;
        let valid = ProofOfWork::for_block(&block)
            .map(|pow| pow.validate(&block))
            .unwrap_or(false);

        writeln!(out, "{block}")?;
        writeln!(out, "PoW: {valid}")?;
        writeln!(out)?;
    }
    Ok(())
}

/// Runs the full-chain audit and reports how many blocks passed.
fn verify_chain(chain: &Blockchain, out: &mut impl Write) -> Result<()> {
    let count = chain.verify_chain().context("chain verification failed")?;
    writeln!(out, "Chain OK: {count} blocks verified")?;
    writeln!(out, "Tip: {}", chain.tip())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIFFICULTY: u32 = 8;

    fn config(dir: &tempfile::TempDir) -> ChainConfig {
        ChainConfig::new(dir.path().join("db"), DIFFICULTY)
    }

    #[test]
    fn addblock_then_printchain() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = open_chain(&config(&dir)).unwrap();

        let mut out = Vec::new();
        add_block(&mut chain, "hello".to_string(), &mut out).unwrap();
        let added = String::from_utf8(out).unwrap();
        assert!(added.starts_with("Success!\n"));
        assert!(added.contains(&chain.tip().to_hex()));

        let mut out = Vec::new();
        print_chain(&chain, &mut out).unwrap();
        let printed = String::from_utf8(out).unwrap();

        let hello = printed.find("Data: hello").expect("hello block printed");
        let genesis = printed.find("Data: Genesis Block").expect("genesis printed");
        assert!(hello < genesis, "newest block must come first");
        assert_eq!(printed.matches("PoW: true").count(), 2);

        chain.close().unwrap();
    }

    #[test]
    fn verify_reports_block_count() {
        let dir = tempfile::tempdir().unwrap();
        let mut chain = open_chain(&config(&dir)).unwrap();
        chain.add_block("one").unwrap();

        let mut out = Vec::new();
        verify_chain(&chain, &mut out).unwrap();
        let report = String::from_utf8(out).unwrap();
        assert!(report.contains("Chain OK: 2 blocks verified"));
    }

    #[test]
    fn invalid_difficulty_fails_to_open() {
        let dir = tempfile::tempdir().unwrap();
        let err = open_chain(&ChainConfig::new(dir.path().join("db"), 0)).unwrap_err();
        assert!(err.to_string().contains("failed to open chain store"));
    }
}
