//! Loading and writing BSP files
//!
//! A file is the magic, an optional version, the lump directory, then the
//! lump payloads in the format's write order, each starting on a 4-byte
//! boundary. A BSPX block may follow the last lump.

use crate::bspx::{ExtensionLumps, align4};
use crate::document::{BspDocument, NativeBsp};
use crate::error::{BspError, Result};
use crate::layout::{Bsp2, Bsp2Rmq, Bsp29, LayoutKind, LumpEntry, LumpReader, LumpWriter, QbismBsp, Q2Bsp};
use crate::version::{FormatDescriptor, identify};
use binrw::{BinWrite, Endian};
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

/// Parse a BSP from memory
pub fn load_bsp(data: &[u8]) -> Result<BspDocument> {
    let version = identify(data)?;
    let entries = version.read_directory(data)?;
    let reader = LumpReader::new(data, &entries, version.lumps);
    let native: NativeBsp = match version.layout {
        LayoutKind::Bsp29 => Bsp29::read(&reader)?.into(),
        LayoutKind::Bsp2Rmq => Bsp2Rmq::read(&reader)?.into(),
        LayoutKind::Bsp2 => Bsp2::read(&reader)?.into(),
        LayoutKind::Q2 => Q2Bsp::read(&reader)?.into(),
        LayoutKind::Qbism => QbismBsp::read(&reader)?.into(),
        LayoutKind::Generic => {
            return Err(BspError::NotWritable {
                format: version.to_string(),
            });
        }
    };

    let mut doc = BspDocument::with_native(version, native);
    doc.load_version = Some(version);
    doc.bspx = read_bspx(data, version, &entries);
    Ok(doc)
}

/// The BSPX block, if any, starts at the first aligned offset after the
/// furthest lump. A malformed block is dropped so the map still loads.
fn read_bspx(data: &[u8], version: &FormatDescriptor, entries: &[LumpEntry]) -> ExtensionLumps {
    let end = entries
        .iter()
        .filter_map(|entry| {
            let offset = usize::try_from(entry.offset).ok()?;
            let length = usize::try_from(entry.length).ok()?;
            offset.checked_add(length)
        })
        .fold(version.header_size(), usize::max);
    match ExtensionLumps::read_block(data, align4(end)) {
        Ok(Some(lumps)) => lumps,
        Ok(None) => ExtensionLumps::new(),
        Err(e) => {
            warn!("Ignoring unreadable BSPX block: {e}");
            ExtensionLumps::new()
        }
    }
}

/// Read and parse a BSP file
pub fn load_bsp_file(path: impl AsRef<Path>) -> Result<BspDocument> {
    let path = path.as_ref();
    let data = std::fs::read(path)?;
    let doc = load_bsp(&data)?;
    info!(
        "Loaded {} as {} ({} bytes, {} BSPX lumps)",
        path.display(),
        doc.version,
        data.len(),
        doc.bspx.len()
    );
    Ok(doc)
}

/// Serialize each lump of the native layout, indexed like the directory
fn serialize_lumps(doc: &BspDocument) -> Result<Vec<Vec<u8>>> {
    let version = doc.version;
    let not_writable = |format: String| BspError::NotWritable { format };
    let native = doc
        .native()
        .ok_or_else(|| not_writable("empty document".to_string()))?;
    if native.layout() != version.layout {
        return Err(not_writable(format!(
            "{} layout as {version}",
            native.layout().name()
        )));
    }

    let mut lumps = LumpWriter::new(version.lumps);
    match native {
        NativeBsp::Generic(_) => return Err(not_writable(version.to_string())),
        NativeBsp::Bsp29(bsp) => bsp.write(&mut lumps)?,
        NativeBsp::Bsp2Rmq(bsp) => bsp.write(&mut lumps)?,
        NativeBsp::Bsp2(bsp) => bsp.write(&mut lumps)?,
        NativeBsp::Q2(bsp) => bsp.write(&mut lumps)?,
        NativeBsp::Qbism(bsp) => bsp.write(&mut lumps)?,
    }
    Ok(lumps.into_lumps())
}

/// Serialize a document in its current format
pub fn write_bsp(doc: &BspDocument) -> Result<Vec<u8>> {
    let version = doc.version;
    let lumps = serialize_lumps(doc)?;

    let header_size = version.header_size();
    let mut out = vec![0u8; header_size];
    let mut directory = vec![LumpEntry::default(); version.lumps.len()];
    for &index in version.write_order {
        let bytes = &lumps[index];
        let too_large = || BspError::LumpTooLarge {
            lump: version.lumps[index].name,
            length: bytes.len(),
        };
        directory[index] = LumpEntry {
            offset: i32::try_from(out.len()).map_err(|_| too_large())?,
            length: i32::try_from(bytes.len()).map_err(|_| too_large())?,
        };
        out.extend_from_slice(bytes);
        out.resize(align4(out.len()), 0);
    }
    doc.bspx.write_block(&mut out)?;

    let mut cursor = Cursor::new(&mut out[..header_size]);
    version.ident.write_options(&mut cursor, Endian::Little, ())?;
    if let Some(v) = version.version {
        v.write_options(&mut cursor, Endian::Little, ())?;
    }
    directory.write_options(&mut cursor, Endian::Little, ())?;
    Ok(out)
}

/// Write a document to disk in its current format
pub fn write_bsp_file(path: impl AsRef<Path>, doc: &BspDocument) -> Result<()> {
    let path = path.as_ref();
    let data = write_bsp(doc)?;
    std::fs::write(path, &data)?;
    info!("Wrote {} as {} ({} bytes)", path.display(), doc.version, data.len());
    Ok(())
}

/// Size of one lump. `None` means the value is unknown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumpSize {
    pub name: String,
    /// Records, for lumps with a fixed record size
    pub count: Option<usize>,
    pub bytes: Option<usize>,
}

/// Per-lump sizes in directory order, followed by the BSPX lumps
pub fn bsp_file_sizes(doc: &BspDocument) -> Vec<LumpSize> {
    let version = doc.version;
    let mut sizes: Vec<LumpSize> = match serialize_lumps(doc) {
        Ok(lumps) => version
            .lumps
            .iter()
            .zip(&lumps)
            .map(|(spec, bytes)| LumpSize {
                name: spec.name.to_string(),
                count: (spec.size > 1).then(|| bytes.len() / spec.size),
                bytes: Some(bytes.len()),
            })
            .collect(),
        Err(_) => generic_sizes(doc),
    };
    sizes.extend(doc.bspx.iter().map(|(name, data)| LumpSize {
        name: name.to_string(),
        count: None,
        bytes: Some(data.len()),
    }));
    sizes
}

/// In-memory layouts have no lump bytes; report record counts only
fn generic_sizes(doc: &BspDocument) -> Vec<LumpSize> {
    let Some(NativeBsp::Generic(bsp)) = doc.native() else {
        return Vec::new();
    };
    [
        ("models", bsp.models.len()),
        ("planes", bsp.planes.len()),
        ("vertexes", bsp.vertexes.len()),
        ("nodes", bsp.nodes.len()),
        ("texinfo", bsp.texinfo.len()),
        ("faces", bsp.faces.len()),
        ("clipnodes", bsp.clipnodes.len()),
        ("leafs", bsp.leafs.len()),
        ("leaffaces", bsp.leaffaces.len()),
        ("leafbrushes", bsp.leafbrushes.len()),
        ("edges", bsp.edges.len()),
        ("surfedges", bsp.surfedges.len()),
        ("brushes", bsp.brushes.len()),
        ("brushsides", bsp.brushsides.len()),
        ("areas", bsp.areas.len()),
        ("areaportals", bsp.areaportals.len()),
    ]
    .into_iter()
    .map(|(name, count)| LumpSize {
        name: name.to_string(),
        count: Some(count),
        bytes: None,
    })
    .collect()
}

/// Log the lump size table
pub fn print_bsp_file_sizes(doc: &BspDocument) {
    let unknown = |value: Option<usize>| value.map_or_else(|| "unknown".to_string(), |v| v.to_string());
    info!("{} lumps:", doc.version);
    for size in bsp_file_sizes(doc) {
        info!(
            "{:>8} {:<16} {:>10} bytes",
            unknown(size.count),
            size.name,
            unknown(size.bytes)
        );
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::layout::common::{EntityText, Plane};
    use crate::layout::quake::lump;
    use crate::layout::GenericBsp;
    use crate::version::{BSPVER_GENERIC, BSPVER_Q1};

    fn small_bsp29() -> Bsp29 {
        Bsp29 {
            entities: EntityText::from_text("{\n\"classname\" \"worldspawn\"\n}\n"),
            planes: vec![Plane {
                normal: [0.0, 0.0, 1.0],
                dist: 64.0,
                plane_type: 2,
            }],
            lightdata: vec![1, 2, 3],
            ..Bsp29::default()
        }
    }

    #[test]
    fn test_lumps_are_aligned_and_ordered() {
        let doc = BspDocument::with_native(&BSPVER_Q1, small_bsp29());
        let data = write_bsp(&doc).expect("Test operation should succeed");
        let entries = BSPVER_Q1.read_directory(&data).expect("Test operation should succeed");

        assert!(entries.iter().all(|e| e.offset % 4 == 0));
        assert_eq!(entries[lump::PLANES].offset as usize, BSPVER_Q1.header_size());
        assert_eq!(entries[lump::PLANES].length, 20);
        assert_eq!(entries[lump::LIGHTING].length, 3);
        assert!(entries[lump::ENTITIES].offset > entries[lump::LIGHTING].offset);
        assert_eq!(data.len() % 4, 0);
    }

    #[test]
    fn test_empty_and_generic_are_not_writable() {
        assert!(matches!(
            write_bsp(&BspDocument::new()),
            Err(BspError::NotWritable { .. })
        ));
        let generic = BspDocument::with_native(&BSPVER_GENERIC, GenericBsp::default());
        assert!(matches!(write_bsp(&generic), Err(BspError::NotWritable { .. })));
    }

    #[test]
    fn test_file_sizes() {
        let doc = BspDocument::with_native(&BSPVER_Q1, small_bsp29());
        let sizes = bsp_file_sizes(&doc);
        let planes = sizes.iter().find(|s| s.name == "planes").expect("planes lump");
        assert_eq!(planes.count, Some(1));
        assert_eq!(planes.bytes, Some(20));
        let lighting = sizes.iter().find(|s| s.name == "lighting").expect("lighting lump");
        assert_eq!(lighting.count, None);
        assert_eq!(lighting.bytes, Some(3));

        let generic = BspDocument::with_native(&BSPVER_GENERIC, GenericBsp::default());
        assert!(bsp_file_sizes(&generic).iter().all(|s| s.bytes.is_none()));
        assert!(bsp_file_sizes(&BspDocument::new()).is_empty());
    }

    #[test]
    fn test_unreadable_bspx_is_ignored() {
        let doc = BspDocument::with_native(&BSPVER_Q1, small_bsp29());
        let mut data = write_bsp(&doc).expect("Test operation should succeed");
        data.extend_from_slice(b"BSPX");
        data.extend_from_slice(&100i32.to_le_bytes());
        let loaded = load_bsp(&data).expect("Test operation should succeed");
        assert!(loaded.bspx.is_empty());
        assert_eq!(loaded, doc);
    }
}
