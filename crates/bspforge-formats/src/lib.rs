//! BSP file formats for Quake-engine level compilers.
//!
//! This crate is the format layer of a map compiler: it reads and writes the
//! lump-directory files of every supported BSP version, converts documents
//! between versions, and interprets the content and surface bits whose
//! meaning depends on the target game.
//!
//! # Components
//!
//! - **Flags**: [`ContentFlags`] and [`SurfaceFlags`], plain values whose
//!   meaning comes from a [`GameDefinition`]
//! - **Games**: one [`GameDefinition`] per supported game, chosen once per
//!   process with [`game::select_game`]
//! - **Catalog**: a static [`FormatDescriptor`] per on-disk version, with an
//!   escalation chain to wider formats
//! - **Documents**: [`BspDocument`] holds one native layout plus BSPX
//!   extension lumps
//! - **I/O and conversion**: [`load_bsp_file`], [`write_bsp_file`],
//!   [`convert_bsp_format`]
//!
//! # Supported versions
//!
//! | Short name | Format |
//! |---|---|
//! | `bsp29` | Quake |
//! | `hexen2` | Hexen II |
//! | `bsp2`, `hexen2bsp2` | BSP2 |
//! | `bsp2rmq`, `hexen2bsp2rmq` | BSP2-RMQ |
//! | `hl` | Half-Life |
//! | `q2bsp` | Quake II |
//! | `qbism` | Quake II Qbism |
//!
//! # Example
//!
//! ```rust,no_run
//! use bspforge_formats::{convert_bsp_format, load_bsp_file, version, write_bsp_file};
//!
//! # fn example() -> bspforge_formats::Result<()> {
//! let mut doc = load_bsp_file("maps/e1m1.bsp")?;
//! if let Some(bsp2) = version::by_short_name("bsp2") {
//!     convert_bsp_format(&mut doc, bsp2)?;
//! }
//! write_bsp_file("maps/e1m1_bsp2.bsp", &doc)?;
//! # Ok(())
//! # }
//! ```

#![allow(clippy::must_use_candidate)]

pub mod bspx;
pub mod contents;
pub mod convert;
pub mod document;
pub mod error;
pub mod file;
pub mod game;
pub mod layout;
pub mod surface;
pub mod texinfo_ext;
pub mod version;

pub use bspx::{BspxBuffer, ExtensionLumps};
pub use contents::{ContentFlags, GameContentData, QuakeContentData, QuakeDetail};
pub use convert::{conversion_path, convert_bsp_format, convert_with_escalation};
pub use document::{BspDocument, NativeBsp};
pub use error::{BspError, Result};
pub use file::{LumpSize, bsp_file_sizes, load_bsp, load_bsp_file, print_bsp_file_sizes, write_bsp, write_bsp_file};
pub use game::{GameDefinition, GameId};
pub use surface::SurfaceFlags;
pub use texinfo_ext::{extended_texinfo_path, load_extended_texinfo_flags, write_extended_texinfo_flags};
pub use version::{BSP_VERSIONS, FormatDescriptor, LumpSpec};
