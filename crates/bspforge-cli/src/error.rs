//! Error types for the command-line front end.

use bspforge_formats::BspError;
use std::path::PathBuf;
use thiserror::Error;

/// Argument validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Input map does not exist
    #[error("Input file not found: {}", .0.display())]
    MissingInput(PathBuf),

    /// `--format` names no known BSP version
    #[error("Unknown BSP format '{0}' (expected one of: {1})")]
    UnknownFormat(String, String),

    /// `--format` names a version that only exists in memory
    #[error("BSP format '{0}' cannot be written to disk")]
    FormatNotWritable(String),

    /// Output would overwrite the input
    #[error("Output path is the same as the input: {}", .0.display())]
    OutputIsInput(PathBuf),
}

/// Errors raised while running a subcommand.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Invalid arguments
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Failure in the format layer
    #[error(transparent)]
    Bsp(#[from] BspError),

    /// Map carries no game, so its contents cannot be interpreted
    #[error("{0} has no game definition")]
    NoGame(String),
}
