//! Subcommand implementations.
//!
//! Each command returns what it computed so callers (and tests) can look at
//! it; human-readable output goes through `tracing`.

use crate::config::{Cli, Command, target_format};
use crate::error::CommandError;
use bspforge_formats::game::{self, ContentStats};
use bspforge_formats::{
    ContentFlags, FormatDescriptor, LumpSize, bsp_file_sizes, convert_bsp_format, convert_with_escalation,
    load_bsp_file, print_bsp_file_sizes, write_bsp_file,
};
use std::path::Path;
use tracing::info;

/// Run the subcommand selected on the command line
pub fn run(cli: &Cli) -> Result<(), CommandError> {
    cli.validate()?;
    match &cli.command {
        Command::Info { file } => {
            info(file)?;
        }
        Command::Convert {
            input,
            output,
            format,
            escalate,
        } => {
            convert(input, output, target_format(format)?, *escalate)?;
        }
        Command::Contents { file } => {
            contents(file)?;
        }
    }
    Ok(())
}

/// Load `path` and log its per-lump sizes
pub fn info(path: &Path) -> Result<Vec<LumpSize>, CommandError> {
    let doc = load_bsp_file(path)?;
    info!("{}: {}", path.display(), doc.version);
    print_bsp_file_sizes(&doc);
    Ok(bsp_file_sizes(&doc))
}

/// Convert `input` to `target` and write it to `output`. Returns the version
/// written, which differs from `target` only when escalation kicked in.
pub fn convert(
    input: &Path,
    output: &Path,
    target: &'static FormatDescriptor,
    escalate: bool,
) -> Result<&'static FormatDescriptor, CommandError> {
    let mut doc = load_bsp_file(input)?;
    let written = if escalate {
        convert_with_escalation(&mut doc, target)?
    } else {
        convert_bsp_format(&mut doc, target)?;
        target
    };
    write_bsp_file(output, &doc)?;
    info!("Wrote {} as {written}", output.display());
    Ok(written)
}

/// Count the contents of every leaf under the map's game
pub fn contents(path: &Path) -> Result<ContentStats, CommandError> {
    let doc = load_bsp_file(path)?;
    let game = doc
        .game()
        .ok_or_else(|| CommandError::NoGame(doc.version.to_string()))?;
    let game = game::select_game(game.id)?;

    let mut stats = game.create_content_stats();
    for native in doc.native().map(|bsp| bsp.leaf_contents()).unwrap_or_default() {
        game.count_contents_in_stats(&ContentFlags::new(native), &mut stats);
    }
    game.print_content_stats(&stats, "leafs");
    Ok(stats)
}
