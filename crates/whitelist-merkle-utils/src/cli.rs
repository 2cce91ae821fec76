use clap::{
    Parser,
    Subcommand,
};

use super::{
    generate,
    tree,
    verify,
};

/// Build, prove and verify Merkle trees over whitelists
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the root of a whitelist's Merkle tree and optionally the proof of one item
    #[command(arg_required_else_help = true)]
    Build(tree::Args),

    /// Check an inclusion proof against a root
    #[command(arg_required_else_help = true)]
    Verify(verify::Args),

    /// Write a whitelist of hashes of random numbers to a JSON file
    Generate(generate::Args),
}

#[must_use]
pub fn get() -> Command {
    Cli::parse().command
}
