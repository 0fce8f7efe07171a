//! # CLI Interface
//!
//! Defines the command-line argument structure for `powchain` using `clap`
//! derive. Supports three subcommands: `addblock`, `printchain`, and
//! `verify`.

use clap::builder::NonEmptyStringValueParser;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use powchain::config::{ChainConfig, DEFAULT_DATA_DIR, DEFAULT_DIFFICULTY};

use crate::logging::{LogFormat, DEFAULT_FILTER, VERBOSE_FILTER};

/// Persisted proof-of-work block ledger.
#[derive(Parser, Debug)]
#[command(
    name = "powchain",
    about = "Persisted proof-of-work block ledger",
    version,
    propagate_version = true
)]
pub struct PowchainCli {
    /// Options shared by every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Mine a block carrying DATA and append it to the chain.
    #[command(name = "addblock")]
    AddBlock(AddBlockArgs),
    /// Print every block, newest first, with its proof-of-work check.
    #[command(name = "printchain")]
    PrintChain,
    /// Audit hashes, proof-of-work, and links across the whole chain.
    Verify,
}

/// Options shared by every subcommand.
#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Directory holding the chain store. Created on first use.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "POWCHAIN_DATA_DIR",
        default_value = DEFAULT_DATA_DIR
    )]
    pub data_dir: PathBuf,

    /// Proof-of-work difficulty in bits, 1 to 255.
    #[arg(
        long,
        global = true,
        env = "POWCHAIN_DIFFICULTY",
        default_value_t = DEFAULT_DIFFICULTY
    )]
    pub difficulty: u32,

    /// Log output format.
    #[arg(
        long,
        global = true,
        env = "POWCHAIN_LOG_FORMAT",
        value_enum,
        default_value_t = LogFormatArg::Pretty
    )]
    pub log_format: LogFormatArg,

    /// Log at debug level (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,
}

impl GlobalArgs {
    /// Store configuration for these arguments.
    pub fn chain_config(&self) -> ChainConfig {
        ChainConfig::new(&self.data_dir, self.difficulty)
    }

    /// Default `EnvFilter` directive when `RUST_LOG` is unset.
    pub fn default_log_level(&self) -> &'static str {
        if self.verbose {
            VERBOSE_FILTER
        } else {
            DEFAULT_FILTER
        }
    }
}

/// Arguments for the `addblock` subcommand.
#[derive(Args, Debug)]
pub struct AddBlockArgs {
    /// Payload to store in the new block.
    #[arg(long, value_parser = NonEmptyStringValueParser::new())]
    pub data: String,
}

/// `--log-format` values.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormatArg {
    /// Human-readable output.
    Pretty,
    /// JSON lines.
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        // Ensures the derive macros produce a valid CLI definition.
        PowchainCli::command().debug_assert();
    }

    #[test]
    fn parses_addblock_with_globals() {
        let cli = PowchainCli::try_parse_from([
            "powchain",
            "addblock",
            "--data",
            "hello",
            "--difficulty",
            "12",
            "-d",
            "/tmp/chain",
        ])
        .unwrap();

        match cli.command {
            Commands::AddBlock(args) => assert_eq!(args.data, "hello"),
            other => panic!("unexpected command: {other:?}"),
        }
        let config = cli.global.chain_config();
        assert_eq!(config.difficulty, 12);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/chain"));
    }

    #[test]
    fn addblock_requires_non_empty_data() {
        assert!(PowchainCli::try_parse_from(["powchain", "addblock"]).is_err());
        assert!(PowchainCli::try_parse_from(["powchain", "addblock", "--data", ""]).is_err());
    }

    #[test]
    fn parses_printchain_and_verify() {
        let cli = PowchainCli::try_parse_from(["powchain", "printchain"]).unwrap();
        assert!(matches!(cli.command, Commands::PrintChain));

        let cli = PowchainCli::try_parse_from(["powchain", "--log-format", "json", "verify"])
            .unwrap();
        assert!(matches!(cli.command, Commands::Verify));
        assert_eq!(cli.global.log_format, LogFormatArg::Json);
    }

    #[test]
    fn verbose_flag_selects_debug_filter() {
        let quiet = PowchainCli::try_parse_from(["powchain", "verify"]).unwrap();
        assert_eq!(quiet.global.default_log_level(), DEFAULT_FILTER);

        let loud = PowchainCli::try_parse_from(["powchain", "verify", "-v"]).unwrap();
        assert_eq!(loud.global.default_log_level(), VERBOSE_FILTER);
    }

    #[test]
    fn missing_subcommand_is_an_error() {
        assert!(PowchainCli::try_parse_from(["powchain"]).is_err());
    }
}
