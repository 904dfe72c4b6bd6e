//! Native lump layouts
//!
//! Each supported version has its own in-memory structure mirroring the file
//! records one to one, so a loaded file writes back bit-exact. The generic
//! layout is the widest superset and is used as the hub for conversion.

pub mod common;
pub mod generic;
pub mod quake;
pub mod quake2;
mod texvec;

pub use common::{
    Edge16, Edge32, EntityText, LumpEntry, LumpRecord, MAX_HULLS, Model, Plane, Record, TextureName, Vertex,
    Visibility, WideBrushSide, WideClipNode, WideNode, WideRecord,
};
pub use generic::{GenericBsp, GenericFace, GenericLeaf, GenericTexInfo};
pub use quake::{Bsp2, Bsp2Records, Bsp2Rmq, Bsp2RmqRecords, Bsp29, Bsp29Records, QuakeBsp, QuakeRecords};
pub use quake2::{Q2Bsp, Q2Records, QbismBsp, QbismRecords, Quake2Bsp, Quake2Records};
pub use texvec::TexVec;

use crate::error::{BspError, Result};
use crate::version::LumpSpec;
use binrw::{BinRead, BinWrite, Endian};
use std::io::Cursor;
use tracing::debug;

/// Which native structure a format uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// In-memory superset, never written
    Generic,
    Bsp29,
    Bsp2Rmq,
    Bsp2,
    Q2,
    Qbism,
}

impl LayoutKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic",
            Self::Bsp29 => "bsp29",
            Self::Bsp2Rmq => "bsp2rmq",
            Self::Bsp2 => "bsp2",
            Self::Q2 => "q2bsp",
            Self::Qbism => "qbism",
        }
    }

    /// Whether this is one of the Quake II layouts
    pub const fn is_quake2(self) -> bool {
        matches!(self, Self::Q2 | Self::Qbism)
    }
}

/// Reads lumps out of a loaded file through its directory
pub(crate) struct LumpReader<'a> {
    data: &'a [u8],
    entries: &'a [LumpEntry],
    specs: &'static [LumpSpec],
}

impl<'a> LumpReader<'a> {
    pub(crate) const fn new(
        data: &'a [u8],
        entries: &'a [LumpEntry],
        specs: &'static [LumpSpec],
    ) -> Self {
        Self {
            data,
            entries,
            specs,
        }
    }

    fn spec(&self, index: usize) -> (&'static str, usize) {
        self.specs
            .get(index)
            .map_or(("unknown", 1), |spec| (spec.name, spec.size))
    }

    /// Lump payload; missing or zero-length lumps are empty
    pub(crate) fn bytes(&self, index: usize) -> Result<&'a [u8]> {
        let Some(entry) = self.entries.get(index) else {
            return Ok(&[]);
        };
        if entry.length == 0 {
            return Ok(&[]);
        }
        let (name, _) = self.spec(index);
        let truncated = || BspError::TruncatedLump {
            lump: name,
            offset: i64::from(entry.offset),
            length: i64::from(entry.length),
            file_size: self.data.len(),
        };
        let start = usize::try_from(entry.offset).map_err(|_| truncated())?;
        let length = usize::try_from(entry.length).map_err(|_| truncated())?;
        let end = start.checked_add(length).ok_or_else(truncated)?;
        let bytes = self.data.get(start..end).ok_or_else(truncated)?;
        debug!("Read lump {name}: offset {start}, length {length}");
        Ok(bytes)
    }

    pub(crate) fn raw(&self, index: usize) -> Result<Vec<u8>> {
        Ok(self.bytes(index)?.to_vec())
    }

    pub(crate) fn entities(&self, index: usize) -> Result<EntityText> {
        Ok(EntityText::new(self.raw(index)?))
    }

    fn checked_count(&self, index: usize, record_size: usize) -> Result<(&'a [u8], usize)> {
        let bytes = self.bytes(index)?;
        if bytes.len() % record_size != 0 {
            let (name, _) = self.spec(index);
            return Err(BspError::LumpOverflow {
                lump: name,
                length: bytes.len(),
                record_size,
            });
        }
        Ok((bytes, bytes.len() / record_size))
    }

    /// Records of a lump, counted from its declared record size
    pub(crate) fn records<T>(&self, index: usize) -> Result<Vec<T>>
    where
        T: LumpRecord + for<'b> BinRead<Args<'b> = ()>,
    {
        debug_assert_eq!(self.spec(index).1, T::SIZE);
        let (bytes, count) = self.checked_count(index, T::SIZE)?;
        let mut cursor = Cursor::new(bytes);
        (0..count)
            .map(|_| T::read_options(&mut cursor, Endian::Little, ()).map_err(BspError::from))
            .collect()
    }

    /// Model records; the declared size decides how many head nodes each has
    pub(crate) fn models(&self, index: usize) -> Result<Vec<Model>> {
        let (_, size) = self.spec(index);
        let hulls = Model::hulls_for_size(size);
        let (bytes, count) = self.checked_count(index, size)?;
        let mut cursor = Cursor::new(bytes);
        (0..count)
            .map(|_| Model::read_options(&mut cursor, Endian::Little, (hulls,)).map_err(BspError::from))
            .collect()
    }
}

/// Collects serialized lumps by directory index
pub(crate) struct LumpWriter {
    specs: &'static [LumpSpec],
    lumps: Vec<Vec<u8>>,
}

impl LumpWriter {
    pub(crate) fn new(specs: &'static [LumpSpec]) -> Self {
        Self {
            specs,
            lumps: vec![Vec::new(); specs.len()],
        }
    }

    fn slot(&mut self, index: usize) -> &mut Vec<u8> {
        &mut self.lumps[index]
    }

    pub(crate) fn raw(&mut self, index: usize, bytes: &[u8]) {
        *self.slot(index) = bytes.to_vec();
    }

    pub(crate) fn entities(&mut self, index: usize, entities: &EntityText) {
        self.raw(index, entities.as_bytes());
    }

    pub(crate) fn records<T>(&mut self, index: usize, records: &[T]) -> Result<()>
    where
        T: LumpRecord + for<'b> BinWrite<Args<'b> = ()>,
    {
        debug_assert_eq!(self.specs[index].size, T::SIZE);
        let mut cursor = Cursor::new(Vec::with_capacity(records.len() * T::SIZE));
        for record in records {
            record.write_options(&mut cursor, Endian::Little, ())?;
        }
        *self.slot(index) = cursor.into_inner();
        Ok(())
    }

    pub(crate) fn models(&mut self, index: usize, models: &[Model]) -> Result<()> {
        let size = self.specs[index].size;
        let hulls = Model::hulls_for_size(size);
        let mut cursor = Cursor::new(Vec::with_capacity(models.len() * size));
        for model in models {
            model.write_options(&mut cursor, Endian::Little, (hulls,))?;
        }
        *self.slot(index) = cursor.into_inner();
        Ok(())
    }

    pub(crate) fn into_lumps(self) -> Vec<Vec<u8>> {
        self.lumps
    }
}
