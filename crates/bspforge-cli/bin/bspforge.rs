//! `bspforge` binary entry point.
//!
//! Parses arguments, initializes logging, then hands off to
//! [`bspforge_cli::commands::run`].

use anyhow::Result;
use bspforge_cli::{Cli, LogFormat, commands};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // --verbose / BSPFORGE_LOG first, then RUST_LOG, then info
    let filter = match cli.log_filter() {
        Some(directive) => EnvFilter::try_new(directive)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    match cli.log_format {
        LogFormat::Text => subscriber.init(),
        LogFormat::Json => subscriber.json().init(),
    }

    commands::run(&cli)?;
    Ok(())
}
