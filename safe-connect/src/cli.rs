//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use safe_connect::VersionFamily;

/// Chain registry, wallet bootstrap and Safe account binding.
#[derive(Debug, Parser)]
#[command(name = "safe-connect")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file.
    #[arg(
        short,
        long,
        global = true,
        env = "SAFE_CONNECT_CONFIG",
        default_value = safe_connect::config::DEFAULT_CONFIG_FILE
    )]
    pub config: PathBuf,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a default TOML configuration file.
    Init {
        /// Output path for the configuration file.
        #[arg(short, long, default_value = safe_connect::config::DEFAULT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite the file if it already exists.
        #[arg(long, default_value_t = false)]
        force: bool,
    },

    /// Load the chain registry and list supported chains.
    Chains,

    /// Bootstrap a wallet session and print its chain and account.
    Connect {
        /// Chain to connect to (short name or id); defaults to the configured chain.
        #[arg(long)]
        chain: Option<String>,
    },

    /// Resolve the contract family and addresses of an account.
    Bind(BindArgs),
}

/// Arguments of `safe-connect bind`.
#[derive(Debug, Args)]
#[allow(clippy::struct_excessive_bools)]
pub struct BindArgs {
    /// Account as `shortName:0x…` or a bare address on the configured chain.
    /// Omit with `--counterfactual`.
    pub account: Option<String>,

    /// Chain (short name or id) when `account` carries no prefix.
    #[arg(long)]
    pub chain: Option<String>,

    /// Version reported for the account.
    #[arg(long)]
    pub safe_version: Option<String>,

    /// Implementation address, skipping the proxy slot read.
    #[arg(long)]
    pub implementation: Option<String>,

    /// The implementation is validated and up to date.
    #[arg(long, requires = "safe_version")]
    pub trusted: bool,

    /// Expected family (`legacy` or `l2`).
    #[arg(long)]
    pub family: Option<VersionFamily>,

    /// Return a degraded binding for unrecognized implementations.
    #[arg(long)]
    pub allow_unrecognized: bool,

    /// Bind an undeployed account.
    #[arg(long, conflicts_with = "account", requires = "target_version")]
    pub counterfactual: bool,

    /// Version the undeployed account will be created with.
    #[arg(long)]
    pub target_version: Option<String>,

    /// Family the undeployed account will be created with.
    #[arg(long, default_value = "l2")]
    pub target_family: VersionFamily,
}
