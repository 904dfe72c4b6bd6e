//! Format catalog
//!
//! Every supported on-disk version is described by a static
//! [`FormatDescriptor`]: its identifying magic, the lump slots and their
//! record sizes, the game it belongs to, and the wider sibling to escalate to
//! when a lump outgrows its fields. [`BSP_VERSIONS`] lists them in matching
//! order.

use crate::error::{BspError, Result};
use crate::game::{GAME_HALF_LIFE, GAME_HEXEN_II, GAME_QUAKE, GAME_QUAKE_II, GameDefinition};
use crate::layout::{LayoutKind, LumpEntry, LumpRecord, MAX_HULLS, Model, quake, quake2};
use binrw::{BinRead, Endian};
use std::fmt;
use std::io::Cursor;
use tracing::debug;

/// A named lump slot and the byte size of one of its records
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumpSpec {
    pub name: &'static str,
    /// Bytes per record; 1 for byte lumps
    pub size: usize,
}

impl LumpSpec {
    pub const fn new(name: &'static str, size: usize) -> Self {
        Self { name, size }
    }
}

/// Static description of one on-disk BSP version
pub struct FormatDescriptor {
    /// First int32 of the file
    pub ident: i32,
    /// Version int32 after the ident, for families that store one
    pub version: Option<i32>,
    pub short_name: &'static str,
    pub name: &'static str,
    pub lumps: &'static [LumpSpec],
    /// Directory indices in the order payloads are laid out
    pub write_order: &'static [usize],
    /// `None` for the generic layout, which belongs to no game
    pub game: Option<&'static GameDefinition>,
    /// Wider format to retry with when limits are exceeded
    pub extended_limits: Option<&'static FormatDescriptor>,
    pub layout: LayoutKind,
}

pub const BSPVERSION: i32 = 29;
pub const BSPHLVERSION: i32 = 30;
pub const BSP2RMQVERSION: i32 = i32::from_le_bytes(*b"2PSB");
pub const BSP2VERSION: i32 = i32::from_le_bytes(*b"BSP2");
pub const MBSPIDENT: i32 = i32::from_le_bytes(*b"MBSP");
pub const Q2_BSPIDENT: i32 = i32::from_le_bytes(*b"IBSP");
pub const Q2_QBISMIDENT: i32 = i32::from_le_bytes(*b"QBSP");
pub const Q2_BSPVERSION: i32 = 38;

/// Record sizes of the Quake-family lumps that differ between versions
struct QuakeSizes {
    node: usize,
    face: usize,
    clipnode: usize,
    leaf: usize,
    marksurface: usize,
    edge: usize,
    hulls: usize,
}

const fn quake_lumps(s: QuakeSizes) -> [LumpSpec; quake::lump::COUNT] {
    [
        LumpSpec::new("entities", 1),
        LumpSpec::new("planes", 20),
        LumpSpec::new("textures", 1),
        LumpSpec::new("vertexes", 12),
        LumpSpec::new("visibility", 1),
        LumpSpec::new("nodes", s.node),
        LumpSpec::new("texinfo", 40),
        LumpSpec::new("faces", s.face),
        LumpSpec::new("lighting", 1),
        LumpSpec::new("clipnodes", s.clipnode),
        LumpSpec::new("leafs", s.leaf),
        LumpSpec::new("marksurfaces", s.marksurface),
        LumpSpec::new("edges", s.edge),
        LumpSpec::new("surfedges", 4),
        LumpSpec::new("models", Model::record_size(s.hulls)),
    ]
}

/// Record sizes of the Quake II lumps that differ between versions
struct Quake2Sizes {
    node: usize,
    face: usize,
    leaf: usize,
    index: usize,
    edge: usize,
    brushside: usize,
}

const fn quake2_lumps(s: Quake2Sizes) -> [LumpSpec; quake2::lump::COUNT] {
    [
        LumpSpec::new("entities", 1),
        LumpSpec::new("planes", 20),
        LumpSpec::new("vertexes", 12),
        LumpSpec::new("visibility", 1),
        LumpSpec::new("nodes", s.node),
        LumpSpec::new("texinfo", 76),
        LumpSpec::new("faces", s.face),
        LumpSpec::new("lighting", 1),
        LumpSpec::new("leafs", s.leaf),
        LumpSpec::new("leaffaces", s.index),
        LumpSpec::new("leafbrushes", s.index),
        LumpSpec::new("edges", s.edge),
        LumpSpec::new("surfedges", 4),
        LumpSpec::new("models", 48),
        LumpSpec::new("brushes", 12),
        LumpSpec::new("brushsides", s.brushside),
        LumpSpec::new("pop", 1),
        LumpSpec::new("areas", 8),
        LumpSpec::new("areaportals", 8),
    ]
}

const BSP29_SIZES: QuakeSizes = QuakeSizes {
    node: 24,
    face: 20,
    clipnode: 8,
    leaf: 28,
    marksurface: 2,
    edge: 4,
    hulls: 4,
};

const BSP2RMQ_SIZES: QuakeSizes = QuakeSizes {
    node: 32,
    face: 28,
    clipnode: 12,
    leaf: 32,
    marksurface: 4,
    edge: 8,
    hulls: 4,
};

const BSP2_SIZES: QuakeSizes = QuakeSizes {
    node: 44,
    face: 28,
    clipnode: 12,
    leaf: 44,
    marksurface: 4,
    edge: 8,
    hulls: 4,
};

const fn hexen2(s: QuakeSizes) -> QuakeSizes {
    QuakeSizes { hulls: MAX_HULLS, ..s }
}

static BSP29_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(BSP29_SIZES);
static H2_BSP29_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(hexen2(BSP29_SIZES));
static BSP2RMQ_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(BSP2RMQ_SIZES);
static H2_BSP2RMQ_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(hexen2(BSP2RMQ_SIZES));
static BSP2_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(BSP2_SIZES);
static H2_BSP2_LUMPS: [LumpSpec; quake::lump::COUNT] = quake_lumps(hexen2(BSP2_SIZES));

static Q2_LUMPS: [LumpSpec; quake2::lump::COUNT] = quake2_lumps(Quake2Sizes {
    node: 28,
    face: 20,
    leaf: 28,
    index: 2,
    edge: 4,
    brushside: 4,
});

static QBISM_LUMPS: [LumpSpec; quake2::lump::COUNT] = quake2_lumps(Quake2Sizes {
    node: 44,
    face: 28,
    leaf: 52,
    index: 4,
    edge: 8,
    brushside: 8,
});

/// In-memory superset of every layout. Never written.
pub static BSPVER_GENERIC: FormatDescriptor = FormatDescriptor {
    ident: MBSPIDENT,
    version: None,
    short_name: "mbsp",
    name: "generic BSP",
    lumps: &[],
    write_order: &[],
    game: None,
    extended_limits: None,
    layout: LayoutKind::Generic,
};

pub static BSPVER_Q1: FormatDescriptor = FormatDescriptor {
    ident: BSPVERSION,
    version: None,
    short_name: "bsp29",
    name: "Quake BSP",
    lumps: &BSP29_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_QUAKE),
    extended_limits: Some(&BSPVER_BSP2),
    layout: LayoutKind::Bsp29,
};

pub static BSPVER_H2: FormatDescriptor = FormatDescriptor {
    ident: BSPVERSION,
    version: None,
    short_name: "hexen2",
    name: "Hexen II BSP",
    lumps: &H2_BSP29_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_HEXEN_II),
    extended_limits: Some(&BSPVER_H2_BSP2),
    layout: LayoutKind::Bsp29,
};

pub static BSPVER_BSP2: FormatDescriptor = FormatDescriptor {
    ident: BSP2VERSION,
    version: None,
    short_name: "bsp2",
    name: "Quake BSP2",
    lumps: &BSP2_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_QUAKE),
    extended_limits: None,
    layout: LayoutKind::Bsp2,
};

pub static BSPVER_H2_BSP2: FormatDescriptor = FormatDescriptor {
    ident: BSP2VERSION,
    version: None,
    short_name: "hexen2bsp2",
    name: "Hexen II BSP2",
    lumps: &H2_BSP2_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_HEXEN_II),
    extended_limits: None,
    layout: LayoutKind::Bsp2,
};

pub static BSPVER_BSP2RMQ: FormatDescriptor = FormatDescriptor {
    ident: BSP2RMQVERSION,
    version: None,
    short_name: "bsp2rmq",
    name: "Quake BSP2-RMQ",
    lumps: &BSP2RMQ_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_QUAKE),
    extended_limits: None,
    layout: LayoutKind::Bsp2Rmq,
};

pub static BSPVER_H2_BSP2RMQ: FormatDescriptor = FormatDescriptor {
    ident: BSP2RMQVERSION,
    version: None,
    short_name: "hexen2bsp2rmq",
    name: "Hexen II BSP2-RMQ",
    lumps: &H2_BSP2RMQ_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_HEXEN_II),
    extended_limits: None,
    layout: LayoutKind::Bsp2Rmq,
};

pub static BSPVER_HL: FormatDescriptor = FormatDescriptor {
    ident: BSPHLVERSION,
    version: None,
    short_name: "hl",
    name: "Half-Life BSP",
    lumps: &BSP29_LUMPS,
    write_order: &quake::WRITE_ORDER,
    game: Some(&GAME_HALF_LIFE),
    extended_limits: None,
    layout: LayoutKind::Bsp29,
};

pub static BSPVER_Q2: FormatDescriptor = FormatDescriptor {
    ident: Q2_BSPIDENT,
    version: Some(Q2_BSPVERSION),
    short_name: "q2bsp",
    name: "Quake II BSP",
    lumps: &Q2_LUMPS,
    write_order: &quake2::WRITE_ORDER,
    game: Some(&GAME_QUAKE_II),
    extended_limits: Some(&BSPVER_QBISM),
    layout: LayoutKind::Q2,
};

pub static BSPVER_QBISM: FormatDescriptor = FormatDescriptor {
    ident: Q2_QBISMIDENT,
    version: Some(Q2_BSPVERSION),
    short_name: "qbism",
    name: "Quake II Qbism BSP",
    lumps: &QBISM_LUMPS,
    write_order: &quake2::WRITE_ORDER,
    game: Some(&GAME_QUAKE_II),
    extended_limits: None,
    layout: LayoutKind::Qbism,
};

/// Registry in matching order. Descriptors sharing a magic are told apart by
/// lump shape in [`identify`].
pub static BSP_VERSIONS: [&FormatDescriptor; 10] = [
    &BSPVER_GENERIC,
    &BSPVER_Q1,
    &BSPVER_H2,
    &BSPVER_BSP2,
    &BSPVER_H2_BSP2,
    &BSPVER_BSP2RMQ,
    &BSPVER_H2_BSP2RMQ,
    &BSPVER_HL,
    &BSPVER_Q2,
    &BSPVER_QBISM,
];

/// Look a descriptor up by its short name, e.g. `bsp2`
pub fn by_short_name(name: &str) -> Option<&'static FormatDescriptor> {
    BSP_VERSIONS
        .iter()
        .copied()
        .find(|version| version.short_name.eq_ignore_ascii_case(name))
}

impl FormatDescriptor {
    /// Whether the layout has an on-disk form
    pub fn is_writable(&self) -> bool {
        self.layout != LayoutKind::Generic
    }

    /// Bytes before the first lump: ident, optional version, directory
    pub const fn header_size(&self) -> usize {
        let version = if self.version.is_some() { 4 } else { 0 };
        4 + version + self.lumps.len() * LumpEntry::SIZE
    }

    /// Index of a lump slot by name
    pub fn lump_index(&self, name: &str) -> Option<usize> {
        self.lumps.iter().position(|lump| lump.name == name)
    }

    /// Parse the lump directory following the header
    pub(crate) fn read_directory(&self, data: &[u8]) -> Result<Vec<LumpEntry>> {
        let needed = self.header_size();
        if data.len() < needed {
            return Err(BspError::TruncatedHeader {
                needed,
                file_size: data.len(),
            });
        }
        let start = needed - self.lumps.len() * LumpEntry::SIZE;
        let mut cursor = Cursor::new(&data[start..needed]);
        let entries = (0..self.lumps.len())
            .map(|_| LumpEntry::read_options(&mut cursor, Endian::Little, ()))
            .collect::<binrw::BinResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Every lump length is a whole number of records
    fn lumps_divisible(&self, entries: &[LumpEntry]) -> bool {
        self.lumps.iter().zip(entries).all(|(spec, entry)| {
            usize::try_from(entry.length).is_ok_and(|length| length % spec.size == 0)
        })
    }

    /// Model face ranges follow each other without gaps, as every compiler
    /// writes them. Reading models with the wrong hull count breaks this.
    fn models_contiguous(&self, data: &[u8], entries: &[LumpEntry]) -> bool {
        let Some(index) = self.lump_index("models") else {
            return true;
        };
        let Some(entry) = entries.get(index) else {
            return true;
        };
        let size = self.lumps[index].size;
        let hulls = Model::hulls_for_size(size);
        let (Ok(offset), Ok(length)) = (usize::try_from(entry.offset), usize::try_from(entry.length)) else {
            return false;
        };
        let Some(bytes) = offset.checked_add(length).and_then(|end| data.get(offset..end)) else {
            return false;
        };
        let mut cursor = Cursor::new(bytes);
        let mut next_face = None;
        for _ in 0..length / size {
            let Ok(model) = Model::read_options(&mut cursor, Endian::Little, (hulls,)) else {
                return false;
            };
            if next_face.is_some_and(|next| next != model.firstface) {
                return false;
            }
            let Some(end) = model.firstface.checked_add(model.numfaces) else {
                return false;
            };
            next_face = Some(end);
        }
        true
    }
}

fn read_i32(data: &[u8], offset: usize) -> Result<i32> {
    let needed = offset + 4;
    let bytes = data.get(offset..needed).ok_or(BspError::TruncatedHeader {
        needed,
        file_size: data.len(),
    })?;
    Ok(i32::read_options(&mut Cursor::new(bytes), Endian::Little, ())?)
}

/// Pick the descriptor for a file's contents.
///
/// Candidates are the writable descriptors whose magic matches, narrowed by
/// the version field when the family stores one. Descriptors sharing a
/// magic (Quake and Hexen II) are told apart by lump shape: the first whose
/// lumps are whole records and whose models are contiguous wins, then the
/// first with whole records, then the first candidate.
pub fn identify(data: &[u8]) -> Result<&'static FormatDescriptor> {
    let ident = read_i32(data, 0)?;
    let mut candidates: Vec<&'static FormatDescriptor> = BSP_VERSIONS
        .iter()
        .copied()
        .filter(|version| version.is_writable() && version.ident == ident)
        .collect();
    if candidates.is_empty() {
        return Err(BspError::FormatUnrecognized { ident, version: None });
    }

    if candidates.iter().any(|candidate| candidate.version.is_some()) {
        let version = read_i32(data, 4)?;
        candidates.retain(|candidate| candidate.version.is_none_or(|v| v == version));
        if candidates.is_empty() {
            return Err(BspError::FormatUnrecognized {
                ident,
                version: Some(version),
            });
        }
    }

    let [first, ..] = candidates[..] else {
        return Err(BspError::FormatUnrecognized { ident, version: None });
    };
    if candidates.len() == 1 {
        return Ok(first);
    }

    let mut divisible = None;
    for &candidate in &candidates {
        let entries = candidate.read_directory(data)?;
        if !candidate.lumps_divisible(&entries) {
            continue;
        }
        if candidate.models_contiguous(data, &entries) {
            debug!("Identified {} by lump shape", candidate.short_name);
            return Ok(candidate);
        }
        divisible.get_or_insert(candidate);
    }
    Ok(divisible.unwrap_or(first))
}

impl fmt::Display for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.version {
            Some(version) => write!(f, "{} ({}:{version})", self.name, ident_string(self.ident)),
            None => f.write_str(self.short_name),
        }
    }
}

impl fmt::Debug for FormatDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatDescriptor")
            .field("short_name", &self.short_name)
            .field("ident", &ident_string(self.ident))
            .field("version", &self.version)
            .field("layout", &self.layout)
            .finish_non_exhaustive()
    }
}

impl PartialEq for FormatDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.short_name == other.short_name
    }
}

impl Eq for FormatDescriptor {}

/// Printable magic: four ASCII characters, or the number for numeric idents
pub fn ident_string(ident: i32) -> String {
    let bytes = ident.to_le_bytes();
    if bytes.iter().all(u8::is_ascii_alphanumeric) {
        bytes.iter().map(|&b| char::from(b)).collect()
    } else {
        ident.to_string()
    }
}
