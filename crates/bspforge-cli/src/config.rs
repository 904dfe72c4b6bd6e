//! Command-line configuration.
//!
//! Arguments come from the command line, with the log level also settable
//! through `BSPFORGE_LOG`. [`Cli::validate`] checks what clap cannot: that
//! inputs exist and that `--format` names a writable version.

use crate::error::ConfigError;
use bspforge_formats::version::{self, BSP_VERSIONS};
use bspforge_formats::FormatDescriptor;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Inspect and convert compiled BSP maps.
#[derive(Debug, Clone, Parser)]
#[command(name = "bspforge", about = "Inspect and convert compiled BSP maps", version)]
pub struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log filter directive (e.g. `warn`, `bspforge_formats=debug`)
    #[arg(long, global = true, env = "BSPFORGE_LOG")]
    pub log: Option<String>,

    /// Log line format
    #[arg(long, value_enum, global = true, default_value = "text", env = "BSPFORGE_LOG_FORMAT")]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// How log lines are rendered
#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per line
    Json,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print the format and per-lump sizes of a map
    Info {
        /// Map to inspect
        file: PathBuf,
    },

    /// Rewrite a map in another BSP version
    Convert {
        /// Map to read
        input: PathBuf,

        /// Where to write the converted map
        output: PathBuf,

        /// Target version short name (e.g. `bsp2`, `q2bsp`)
        #[arg(short, long, env = "BSPFORGE_FORMAT")]
        format: String,

        /// Move to a wider version when the target's limits are exceeded
        #[arg(long)]
        escalate: bool,
    },

    /// Print content statistics over every leaf of a map
    Contents {
        /// Map to analyse
        file: PathBuf,
    },
}

impl Cli {
    /// Parse configuration from command-line arguments.
    #[must_use]
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Filter directive for the tracing subscriber, when one was asked for.
    /// `--verbose` wins over `--log`.
    pub fn log_filter(&self) -> Option<String> {
        if self.verbose {
            Some("debug".to_string())
        } else {
            self.log.clone()
        }
    }

    /// Validate arguments.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - an input file doesn't exist
    /// - `--format` is unknown or not writable
    /// - the output path equals the input path
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.command {
            Command::Info { file } | Command::Contents { file } => require_input(file),
            Command::Convert {
                input, output, format, ..
            } => {
                require_input(input)?;
                target_format(format)?;
                if input == output {
                    return Err(ConfigError::OutputIsInput(output.clone()));
                }
                Ok(())
            }
        }
    }
}

fn require_input(path: &Path) -> Result<(), ConfigError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(ConfigError::MissingInput(path.to_path_buf()))
    }
}

/// Resolve `--format` to a writable version.
pub fn target_format(name: &str) -> Result<&'static FormatDescriptor, ConfigError> {
    let descriptor = version::by_short_name(name).ok_or_else(|| {
        let known: Vec<&str> = BSP_VERSIONS
            .iter()
            .filter(|v| v.is_writable())
            .map(|v| v.short_name)
            .collect();
        ConfigError::UnknownFormat(name.to_string(), known.join(", "))
    })?;
    if descriptor.is_writable() {
        Ok(descriptor)
    } else {
        Err(ConfigError::FormatNotWritable(descriptor.short_name.to_string()))
    }
}
