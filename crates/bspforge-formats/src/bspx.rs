//! BSPX extension lumps
//!
//! Named side-data that rides along with any BSP version. On disk it is a
//! trailing block after the last versioned lump:
//!
//! ```text
//! "BSPX" | i32 count | count * { name: [u8; 24], offset: i32, length: i32 } | payloads
//! ```
//!
//! Offsets are from the start of the file and every payload starts on a
//! 4-byte boundary.

use crate::error::{BspError, Result};
use binrw::{BinRead, BinWrite, Endian};
use std::collections::BTreeMap;
use std::io::Cursor;
use tracing::debug;

pub const BSPX_IDENT: [u8; 4] = *b"BSPX";

/// Longest name that still leaves room for the terminating NUL
pub const MAX_LUMP_NAME: usize = 23;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BinRead, BinWrite)]
#[brw(little)]
struct BspxEntry {
    name: [u8; 24],
    offset: i32,
    length: i32,
}

impl BspxEntry {
    const SIZE: usize = 32;

    /// Name up to the first NUL. A name that is not UTF-8 is refused
    /// rather than rewritten under a different spelling.
    fn name(&self) -> Result<&str> {
        let end = self.name.iter().position(|&b| b == 0).unwrap_or(self.name.len());
        std::str::from_utf8(&self.name[..end]).map_err(|_| BspError::InvalidLumpName {
            name: String::from_utf8_lossy(&self.name[..end]).into_owned(),
        })
    }
}

/// An owned extension payload.
///
/// Moving a buffer into [`ExtensionLumps::transfer`] consumes it, so the
/// caller has nothing left to read or free afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BspxBuffer(Vec<u8>);

impl BspxBuffer {
    pub const fn new(data: Vec<u8>) -> Self {
        Self(data)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<u8>> for BspxBuffer {
    fn from(data: Vec<u8>) -> Self {
        Self(data)
    }
}

impl AsRef<[u8]> for BspxBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Name-keyed store of extension lumps
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtensionLumps {
    entries: BTreeMap<String, BspxBuffer>,
}

fn check_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > MAX_LUMP_NAME || name.as_bytes().contains(&0) {
        return Err(BspError::InvalidLumpName {
            name: name.to_string(),
        });
    }
    Ok(())
}

impl ExtensionLumps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `buffer` under `name`, replacing any previous entry
    pub fn transfer(&mut self, name: &str, buffer: BspxBuffer) -> Result<()> {
        check_name(name)?;
        debug!("BSPX lump {name}: {} bytes", buffer.len());
        self.entries.insert(name.to_string(), buffer);
        Ok(())
    }

    /// Take the payload out of `source`, leaving `None` behind. An empty
    /// source stores nothing.
    pub fn transfer_from(&mut self, name: &str, source: &mut Option<Vec<u8>>) -> Result<()> {
        check_name(name)?;
        if let Some(data) = source.take() {
            self.transfer(name, BspxBuffer::new(data))?;
        }
        Ok(())
    }

    /// Store a copy of `data`; the caller keeps the original
    pub fn copy(&mut self, name: &str, data: &[u8]) -> Result<()> {
        self.transfer(name, BspxBuffer::new(data.to_vec()))
    }

    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(BspxBuffer::as_bytes)
    }

    pub fn remove(&mut self, name: &str) -> Option<BspxBuffer> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in name order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries.iter().map(|(name, buffer)| (name.as_str(), buffer.as_bytes()))
    }

    /// Parse a block starting at `start`. Returns `Ok(None)` when no block
    /// is present there.
    pub(crate) fn read_block(data: &[u8], start: usize) -> Result<Option<Self>> {
        let Some(rest) = data.get(start..) else {
            return Ok(None);
        };
        if rest.len() < 8 || rest[..4] != BSPX_IDENT {
            return Ok(None);
        }
        let malformed = |what: &str| {
            debug!("Malformed BSPX block: {what}");
            BspError::TruncatedLump {
                lump: "bspx",
                offset: i64::try_from(start).unwrap_or(i64::MAX),
                length: i64::try_from(rest.len()).unwrap_or(i64::MAX),
                file_size: data.len(),
            }
        };

        let mut cursor = Cursor::new(&rest[4..]);
        let count = i32::read_options(&mut cursor, Endian::Little, ())?;
        let count = usize::try_from(count).map_err(|_| malformed("negative entry count"))?;
        if count.saturating_mul(BspxEntry::SIZE) > rest.len() - 8 {
            return Err(malformed("directory past end of file"));
        }

        let mut lumps = Self::new();
        for _ in 0..count {
            let entry = BspxEntry::read_options(&mut cursor, Endian::Little, ())?;
            let (Ok(offset), Ok(length)) = (usize::try_from(entry.offset), usize::try_from(entry.length)) else {
                return Err(malformed("negative entry offset"));
            };
            let payload = offset
                .checked_add(length)
                .and_then(|end| data.get(offset..end))
                .ok_or_else(|| malformed("entry past end of file"))?;
            lumps.copy(entry.name()?, payload)?;
        }
        Ok(Some(lumps))
    }

    /// Append the block to `out`, which must already end on a 4-byte
    /// boundary. Writes nothing when the store is empty.
    pub(crate) fn write_block(&self, out: &mut Vec<u8>) -> Result<()> {
        if self.entries.is_empty() {
            return Ok(());
        }
        debug_assert_eq!(out.len() % 4, 0);
        let too_large = || BspError::LumpTooLarge {
            lump: "bspx",
            length: out.len(),
        };
        let directory_end = out.len() + 8 + self.entries.len() * BspxEntry::SIZE;
        let mut offset = directory_end;
        let mut directory = Vec::with_capacity(self.entries.len());
        for (name, buffer) in &self.entries {
            let mut field = [0u8; 24];
            field[..name.len()].copy_from_slice(name.as_bytes());
            directory.push(BspxEntry {
                name: field,
                offset: i32::try_from(offset).map_err(|_| too_large())?,
                length: i32::try_from(buffer.len()).map_err(|_| too_large())?,
            });
            offset = align4(offset + buffer.len());
        }

        let mut cursor = Cursor::new(Vec::with_capacity(offset - out.len()));
        BSPX_IDENT.write_options(&mut cursor, Endian::Little, ())?;
        i32::try_from(self.entries.len())
            .map_err(|_| too_large())?
            .write_options(&mut cursor, Endian::Little, ())?;
        for entry in &directory {
            entry.write_options(&mut cursor, Endian::Little, ())?;
        }
        out.extend_from_slice(&cursor.into_inner());
        for buffer in self.entries.values() {
            out.extend_from_slice(buffer.as_bytes());
            out.resize(align4(out.len()), 0);
        }
        Ok(())
    }
}

pub(crate) const fn align4(n: usize) -> usize {
    (n + 3) & !3
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_consumes_and_copy_duplicates() {
        let mut lumps = ExtensionLumps::new();
        let mut source = Some(vec![1, 2, 3]);
        lumps
            .transfer_from("RGBLIGHTING", &mut source)
            .expect("Test operation should succeed");
        assert!(source.is_none());
        assert_eq!(lumps.get("RGBLIGHTING"), Some(&[1u8, 2, 3][..]));

        let mut original = vec![9, 9];
        lumps.copy("LMSHIFT", &original).expect("Test operation should succeed");
        original[0] = 0;
        assert_eq!(lumps.get("LMSHIFT"), Some(&[9u8, 9][..]));
        assert_eq!(original, vec![0, 9]);
    }

    #[test]
    fn test_name_limits() {
        let mut lumps = ExtensionLumps::new();
        assert!(lumps.copy(&"X".repeat(23), &[]).is_ok());
        assert!(matches!(
            lumps.copy(&"X".repeat(24), &[]),
            Err(BspError::InvalidLumpName { .. })
        ));
        assert!(lumps.copy("", &[]).is_err());
    }

    #[test]
    fn test_non_utf8_name_is_refused() {
        let mut block = BSPX_IDENT.to_vec();
        block.extend_from_slice(&1i32.to_le_bytes());
        let mut name = [0u8; 24];
        name[..3].copy_from_slice(&[0xff, b'L', b'M']);
        block.extend_from_slice(&name);
        block.extend_from_slice(&40i32.to_le_bytes());
        block.extend_from_slice(&0i32.to_le_bytes());

        let err = ExtensionLumps::read_block(&block, 0).expect_err("name is not UTF-8");
        assert!(matches!(err, BspError::InvalidLumpName { ref name } if name == "\u{fffd}LM"));
    }

    #[test]
    fn test_block_round_trip() {
        let mut lumps = ExtensionLumps::new();
        lumps.copy("LIGHTING_E5BGR9", &[1, 2, 3, 4, 5]).expect("Test operation should succeed");
        lumps.copy("DECOUPLED_LM", &[7; 8]).expect("Test operation should succeed");

        let mut data = vec![0xaa; 12];
        lumps.write_block(&mut data).expect("Test operation should succeed");
        assert_eq!(&data[12..16], b"BSPX");
        assert_eq!(data.len() % 4, 0);

        let read = ExtensionLumps::read_block(&data, 12)
            .expect("Test operation should succeed")
            .expect("block should be present");
        assert_eq!(read, lumps);
        assert!(
            ExtensionLumps::read_block(&data, 0)
                .expect("Test operation should succeed")
                .is_none()
        );
    }

    #[test]
    fn test_truncated_block_is_error() {
        let mut lumps = ExtensionLumps::new();
        lumps.copy("A", &[1; 16]).expect("Test operation should succeed");
        let mut data = Vec::new();
        lumps.write_block(&mut data).expect("Test operation should succeed");
        data.truncate(data.len() - 4);
        assert!(ExtensionLumps::read_block(&data, 0).is_err());
    }

    #[test]
    fn test_empty_store_writes_nothing() {
        let mut data = Vec::new();
        ExtensionLumps::new()
            .write_block(&mut data)
            .expect("Test operation should succeed");
        assert!(data.is_empty());
    }
}
