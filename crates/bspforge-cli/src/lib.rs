//! Command-line front end for `bspforge-formats`.
//!
//! The `bspforge` binary is a thin wrapper over this crate:
//! - `config`: argument parsing and validation
//! - `commands`: the `info`, `convert` and `contents` subcommands
//! - `error`: configuration and command errors
//!
//! # Example
//!
//! ```no_run
//! use bspforge_cli::{Cli, commands};
//!
//! fn main() -> anyhow::Result<()> {
//!     let cli = Cli::from_args();
//!     commands::run(&cli)?;
//!     Ok(())
//! }
//! ```

#![allow(clippy::must_use_candidate)]

pub mod commands;
pub mod config;
pub mod error;

pub use config::{Cli, Command, LogFormat};
pub use error::{CommandError, ConfigError};
