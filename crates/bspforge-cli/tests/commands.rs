#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
//! Subcommands run against maps written to a temporary directory

use bspforge_cli::commands;
use bspforge_cli::{Cli, Command, CommandError, ConfigError, LogFormat};
use bspforge_formats::layout::{EntityText, GenericBsp, GenericLeaf, Model};
use bspforge_formats::version::{BSPVER_BSP2, BSPVER_GENERIC, BSPVER_Q1, BSPVER_Q2};
use bspforge_formats::{BspDocument, convert_bsp_format, load_bsp_file, write_bsp_file};
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Quake map with a solid leaf, two empty leafs and a water leaf
fn write_quake_map(dir: &Path, first_leafface: u32) -> PathBuf {
    let leaf = |contents| GenericLeaf {
        contents,
        visofs: -1,
        cluster: -1,
        ..GenericLeaf::default()
    };
    let mut generic = GenericBsp {
        models: vec![Model::default()],
        leafs: vec![leaf(-2), leaf(-1), leaf(-1), leaf(-3)],
        entities: EntityText::from_text("{\n\"classname\" \"worldspawn\"\n}\n"),
        ..GenericBsp::default()
    };
    generic.leafs[3].first_leafface = first_leafface;

    let mut doc = BspDocument::with_native(&BSPVER_GENERIC, generic);
    let target = if first_leafface > u32::from(u16::MAX) {
        &BSPVER_BSP2
    } else {
        &BSPVER_Q1
    };
    convert_bsp_format(&mut doc, target).expect("Test operation should succeed");
    let path = dir.join("start.bsp");
    write_bsp_file(&path, &doc).expect("Test operation should succeed");
    path
}

#[test]
fn info_reports_every_lump() {
    let dir = TempDir::new().expect("Test operation should succeed");
    let path = write_quake_map(dir.path(), 0);

    let sizes = commands::info(&path).expect("Test operation should succeed");
    assert_eq!(sizes.len(), 15);
    let leafs = sizes.iter().find(|size| size.name == "leafs").expect("leafs lump is listed");
    assert_eq!(leafs.count, Some(4));
    assert_eq!(leafs.bytes, Some(4 * 28));
}

#[test]
fn convert_writes_target_format() {
    let dir = TempDir::new().expect("Test operation should succeed");
    let input = write_quake_map(dir.path(), 0);
    let output = dir.path().join("start_q2.bsp");

    let written = commands::convert(&input, &output, &BSPVER_Q2, false).expect("Test operation should succeed");
    assert_eq!(written, &BSPVER_Q2);
    let loaded = load_bsp_file(&output).expect("Test operation should succeed");
    assert_eq!(loaded.version, &BSPVER_Q2);
    assert_eq!(loaded.load_version, Some(&BSPVER_Q2));
}

#[test]
fn convert_escalates_only_when_asked() {
    let dir = TempDir::new().expect("Test operation should succeed");
    let input = write_quake_map(dir.path(), 70_000);
    let output = dir.path().join("out.bsp");

    let err = commands::convert(&input, &output, &BSPVER_Q1, false).expect_err("leafface index overflows");
    assert!(matches!(err, CommandError::Bsp(e) if e.is_limit_error()));
    assert!(!output.exists());

    let written = commands::convert(&input, &output, &BSPVER_Q1, true).expect("Test operation should succeed");
    assert_eq!(written, &BSPVER_BSP2);
}

#[test]
fn contents_counts_every_leaf() {
    let dir = TempDir::new().expect("Test operation should succeed");
    let path = write_quake_map(dir.path(), 0);

    let stats = commands::contents(&path).expect("Test operation should succeed");
    assert_eq!(stats.total(), 4);
    let lines = stats.lines();
    assert!(lines.contains(&(2, "EMPTY".to_string())), "{lines:?}");
    assert!(lines.contains(&(1, "SOLID".to_string())), "{lines:?}");
    assert!(lines.contains(&(1, "WATER".to_string())), "{lines:?}");
}

#[test]
fn run_rejects_unknown_format() {
    let dir = TempDir::new().expect("Test operation should succeed");
    let input = write_quake_map(dir.path(), 0);
    let cli = Cli {
        verbose: false,
        log: None,
        log_format: LogFormat::Text,
        command: Command::Convert {
            input,
            output: dir.path().join("out.bsp"),
            format: "bsp3".to_string(),
            escalate: false,
        },
    };
    assert!(matches!(
        commands::run(&cli),
        Err(CommandError::Config(ConfigError::UnknownFormat(..)))
    ));
}
