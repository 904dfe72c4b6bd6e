//! Records shared by several layouts, and the traits tying narrow records to
//! their wide counterparts

use crate::convert::numeric::{maxs_to_i16, mins_to_i16, narrow, narrow_array};
use crate::error::Result;
use binrw::{BinRead, BinResult, BinWrite};
use std::borrow::Cow;
use std::fmt::Debug;
use std::io::{Read, Seek, Write};

/// Fixed-size on-disk record
pub trait LumpRecord: Sized {
    /// Bytes per record on disk
    const SIZE: usize;
}

/// A lump record that can be read and written with no arguments
pub trait Record:
    LumpRecord
    + Debug
    + Clone
    + PartialEq
    + for<'a> BinRead<Args<'a> = ()>
    + for<'a> BinWrite<Args<'a> = ()>
{
}

impl<T> Record for T where
    T: LumpRecord
        + Debug
        + Clone
        + PartialEq
        + for<'a> BinRead<Args<'a> = ()>
        + for<'a> BinWrite<Args<'a> = ()>
{
}

/// A record with a wider representation in the generic layout. Widening is
/// exact; narrowing fails on values the record cannot hold.
pub trait WideRecord<W>: Sized {
    fn widen(&self) -> W;

    /// `index` is the record's position in its lump, used in error messages
    fn narrow(wide: &W, index: usize) -> Result<Self>;
}

impl LumpRecord for u16 {
    const SIZE: usize = 2;
}

impl LumpRecord for u32 {
    const SIZE: usize = 4;
}

impl LumpRecord for i32 {
    const SIZE: usize = 4;
}

impl WideRecord<u32> for u16 {
    fn widen(&self) -> u32 {
        u32::from(*self)
    }

    fn narrow(wide: &u32, index: usize) -> Result<Self> {
        narrow(*wide, || format!("index lump[{index}]"))
    }
}

impl WideRecord<u32> for u32 {
    fn widen(&self) -> u32 {
        *self
    }

    fn narrow(wide: &u32, _index: usize) -> Result<Self> {
        Ok(*wide)
    }
}

/// Lump directory entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct LumpEntry {
    pub offset: i32,
    pub length: i32,
}

impl LumpRecord for LumpEntry {
    const SIZE: usize = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Plane {
    pub normal: [f32; 3],
    pub dist: f32,
    pub plane_type: i32,
}

impl LumpRecord for Plane {
    const SIZE: usize = 20;
}

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Vertex {
    pub point: [f32; 3],
}

impl LumpRecord for Vertex {
    const SIZE: usize = 12;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Edge16 {
    pub v: [u16; 2],
}

impl LumpRecord for Edge16 {
    const SIZE: usize = 4;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Edge32 {
    pub v: [u32; 2],
}

impl LumpRecord for Edge32 {
    const SIZE: usize = 8;
}

impl WideRecord<Edge32> for Edge16 {
    fn widen(&self) -> Edge32 {
        Edge32 {
            v: self.v.map(u32::from),
        }
    }

    fn narrow(wide: &Edge32, index: usize) -> Result<Self> {
        Ok(Self {
            v: narrow_array(wide.v, |i| format!("edges[{index}].v[{i}]"))?,
        })
    }
}

impl WideRecord<Edge32> for Edge32 {
    fn widen(&self) -> Edge32 {
        *self
    }

    fn narrow(wide: &Edge32, _index: usize) -> Result<Self> {
        Ok(*wide)
    }
}

/// BSP2 and Qbism node: 32-bit children and face range, float bounds.
/// Also the generic layout's node.
#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct WideNode {
    pub planenum: i32,
    /// Negative children are leaves: `-(leaf + 1)`
    pub children: [i32; 2],
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub firstface: u32,
    pub numfaces: u32,
}

impl LumpRecord for WideNode {
    const SIZE: usize = 44;
}

impl WideRecord<WideNode> for WideNode {
    fn widen(&self) -> WideNode {
        *self
    }

    fn narrow(wide: &WideNode, _index: usize) -> Result<Self> {
        Ok(*wide)
    }
}

/// Node with short bounds; shared shape of every node the wide one narrows to
pub(crate) struct NarrowNodeFields<C, F> {
    pub children: [C; 2],
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstface: F,
    pub numfaces: F,
}

pub(crate) fn narrow_node<C, F>(wide: &WideNode, index: usize) -> Result<NarrowNodeFields<C, F>>
where
    C: TryFrom<i32> + Copy + Default,
    F: TryFrom<u32>,
{
    Ok(NarrowNodeFields {
        children: narrow_array(wide.children, |i| format!("nodes[{index}].children[{i}]"))?,
        mins: mins_to_i16(wide.mins, |i| format!("nodes[{index}].mins[{i}]"))?,
        maxs: maxs_to_i16(wide.maxs, |i| format!("nodes[{index}].maxs[{i}]"))?,
        firstface: narrow(wide.firstface, || format!("nodes[{index}].firstface"))?,
        numfaces: narrow(wide.numfaces, || format!("nodes[{index}].numfaces"))?,
    })
}

/// BSP2 clipnode, also the generic layout's clipnode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct WideClipNode {
    pub planenum: i32,
    pub children: [i32; 2],
}

impl LumpRecord for WideClipNode {
    const SIZE: usize = 12;
}

impl WideRecord<WideClipNode> for WideClipNode {
    fn widen(&self) -> WideClipNode {
        *self
    }

    fn narrow(wide: &WideClipNode, _index: usize) -> Result<Self> {
        Ok(*wide)
    }
}

/// Qbism brush side, also the generic layout's brush side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct WideBrushSide {
    pub planenum: u32,
    pub texinfo: i32,
}

impl LumpRecord for WideBrushSide {
    const SIZE: usize = 8;
}

impl WideRecord<WideBrushSide> for WideBrushSide {
    fn widen(&self) -> WideBrushSide {
        *self
    }

    fn narrow(wide: &WideBrushSide, _index: usize) -> Result<Self> {
        Ok(*wide)
    }
}

/// NUL-padded 32-byte texture name
#[derive(Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct TextureName(pub [u8; 32]);

impl TextureName {
    /// Name up to the first NUL. Longer names are cut at 31 bytes so the
    /// terminator always fits.
    pub fn new(name: &str) -> Self {
        let mut bytes = [0u8; 32];
        let len = name.len().min(31);
        bytes[..len].copy_from_slice(&name.as_bytes()[..len]);
        Self(bytes)
    }

    pub fn name(&self) -> String {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl Debug for TextureName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "TextureName({:?})", self.name())
    }
}

/// Entity lump bytes exactly as stored, terminator and high-bit text
/// included, so an untouched lump writes back unchanged.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct EntityText(Vec<u8>);

impl EntityText {
    pub const fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// Lump for `text` with its terminating NUL; empty text is an empty lump
    pub fn from_text(text: &str) -> Self {
        if text.is_empty() {
            return Self::default();
        }
        let mut bytes = Vec::with_capacity(text.len() + 1);
        bytes.extend_from_slice(text.as_bytes());
        bytes.push(0);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<u8> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text up to the first NUL, for display and parsing. Bytes that are
    /// not UTF-8 show as U+FFFD; the stored lump keeps them.
    pub fn text(&self) -> Cow<'_, str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end])
    }
}

impl From<&str> for EntityText {
    fn from(text: &str) -> Self {
        Self::from_text(text)
    }
}

impl Debug for EntityText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EntityText({:?}, {} bytes)", self.text(), self.0.len())
    }
}

/// Brush model, with room for the eight hulls Hexen II uses. Quake and
/// Half-Life store four head nodes; the extra slots are zero.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Model {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub origin: [f32; 3],
    pub headnode: [i32; MAX_HULLS],
    pub visleafs: i32,
    pub firstface: i32,
    pub numfaces: i32,
}

/// Head nodes in the widest model record
pub const MAX_HULLS: usize = 8;

impl Model {
    /// On-disk size of a model with `hulls` head nodes
    pub const fn record_size(hulls: usize) -> usize {
        48 + 4 * hulls
    }

    /// Head nodes stored by a model record of `size` bytes
    pub const fn hulls_for_size(size: usize) -> usize {
        size.saturating_sub(48) / 4
    }
}

impl BinRead for Model {
    /// Number of head nodes on disk
    type Args<'a> = (usize,);

    fn read_options<R: Read + Seek>(
        reader: &mut R,
        endian: binrw::Endian,
        (hulls,): Self::Args<'_>,
    ) -> BinResult<Self> {
        let mins = <[f32; 3]>::read_options(reader, endian, ())?;
        let maxs = <[f32; 3]>::read_options(reader, endian, ())?;
        let origin = <[f32; 3]>::read_options(reader, endian, ())?;
        let mut headnode = [0i32; MAX_HULLS];
        for slot in headnode.iter_mut().take(hulls) {
            *slot = i32::read_options(reader, endian, ())?;
        }
        Ok(Self {
            mins,
            maxs,
            origin,
            headnode,
            visleafs: i32::read_options(reader, endian, ())?,
            firstface: i32::read_options(reader, endian, ())?,
            numfaces: i32::read_options(reader, endian, ())?,
        })
    }
}

impl BinWrite for Model {
    type Args<'a> = (usize,);

    fn write_options<W: Write + Seek>(
        &self,
        writer: &mut W,
        endian: binrw::Endian,
        (hulls,): Self::Args<'_>,
    ) -> BinResult<()> {
        self.mins.write_options(writer, endian, ())?;
        self.maxs.write_options(writer, endian, ())?;
        self.origin.write_options(writer, endian, ())?;
        for node in self.headnode.iter().take(hulls) {
            node.write_options(writer, endian, ())?;
        }
        self.visleafs.write_options(writer, endian, ())?;
        self.firstface.write_options(writer, endian, ())?;
        self.numfaces.write_options(writer, endian, ())?;
        Ok(())
    }
}

/// Cluster visibility: per-cluster `[pvs, phs]` offsets followed by the
/// compressed bit vectors. Offsets are kept exactly as stored, relative to
/// the start of the visibility lump. Quake-family documents leave
/// `bit_offsets` empty and keep the whole lump in `bits`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Visibility {
    pub bit_offsets: Vec<[i32; 2]>,
    pub bits: Vec<u8>,
}
