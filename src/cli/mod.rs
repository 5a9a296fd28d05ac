//! Command-line interface: pick which service this process runs.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Account manager and to-do list web services
#[derive(Parser)]
#[command(name = "tandem")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to a TOML config file (default: search ./config.toml, then the user config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Serve the account manager (register, login, profile, avatars)
    #[command(alias = "a")]
    Accounts,

    /// Serve the to-do list
    #[command(alias = "t")]
    Tasks,

    /// Write a default config.toml if none exists
    InitConfig,
}
