//! Quake II layouts: IBSP version 38 and its Qbism extension
//!
//! Qbism keeps the Quake II lump list but widens indices to 32 bits and
//! bounds to floats. [`Quake2Bsp`] is generic over a [`Quake2Records`] set,
//! the same way the Quake-family layout is.

use super::common::{
    Edge16, Edge32, EntityText, LumpRecord, Model, NarrowNodeFields, Plane, Record, TextureName, Vertex, Visibility,
    WideBrushSide, WideNode, WideRecord, narrow_node,
};
use super::generic::{GenericBsp, GenericFace, GenericLeaf, GenericTexInfo};
use super::texvec::TexVec;
use super::{LumpReader, LumpWriter};
use crate::convert::numeric::{bounds_to_f32, maxs_to_i16, mins_to_i16, narrow};
use crate::error::{BspError, Result};
use crate::game::GameDefinition;
use crate::surface::SurfaceFlags;
use binrw::{BinRead, BinWrite, Endian};
use std::fmt::Debug;
use std::io::Cursor;
use tracing::warn;

/// Lump directory slots
pub mod lump {
    pub const ENTITIES: usize = 0;
    pub const PLANES: usize = 1;
    pub const VERTEXES: usize = 2;
    pub const VISIBILITY: usize = 3;
    pub const NODES: usize = 4;
    pub const TEXINFO: usize = 5;
    pub const FACES: usize = 6;
    pub const LIGHTING: usize = 7;
    pub const LEAFS: usize = 8;
    pub const LEAFFACES: usize = 9;
    pub const LEAFBRUSHES: usize = 10;
    pub const EDGES: usize = 11;
    pub const SURFEDGES: usize = 12;
    pub const MODELS: usize = 13;
    pub const BRUSHES: usize = 14;
    pub const BRUSHSIDES: usize = 15;
    pub const POP: usize = 16;
    pub const AREAS: usize = 17;
    pub const AREAPORTALS: usize = 18;
    pub const COUNT: usize = 19;
}

/// Order lump payloads are laid out in the file
pub const WRITE_ORDER: [usize; lump::COUNT] = [
    lump::PLANES,
    lump::LEAFS,
    lump::VERTEXES,
    lump::NODES,
    lump::TEXINFO,
    lump::FACES,
    lump::BRUSHES,
    lump::BRUSHSIDES,
    lump::LEAFFACES,
    lump::LEAFBRUSHES,
    lump::SURFEDGES,
    lump::EDGES,
    lump::MODELS,
    lump::AREAS,
    lump::AREAPORTALS,
    lump::LIGHTING,
    lump::VISIBILITY,
    lump::ENTITIES,
    lump::POP,
];

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Quake2Model {
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub origin: [f32; 3],
    pub headnode: i32,
    pub firstface: i32,
    pub numfaces: i32,
}

impl LumpRecord for Quake2Model {
    const SIZE: usize = 48;
}

impl Quake2Model {
    fn widen(&self) -> Model {
        let mut headnode = [0; super::common::MAX_HULLS];
        headnode[0] = self.headnode;
        Model {
            mins: self.mins,
            maxs: self.maxs,
            origin: self.origin,
            headnode,
            visleafs: 0,
            firstface: self.firstface,
            numfaces: self.numfaces,
        }
    }

    const fn narrow(model: &Model) -> Self {
        Self {
            mins: model.mins,
            maxs: model.maxs,
            origin: model.origin,
            headnode: model.headnode[0],
            firstface: model.firstface,
            numfaces: model.numfaces,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Q2TexInfo {
    pub vecs: TexVec,
    pub flags: i32,
    /// Light emission
    pub value: i32,
    pub texture: TextureName,
    pub next_texinfo: i32,
}

impl LumpRecord for Q2TexInfo {
    const SIZE: usize = 76;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Q2Node {
    pub planenum: i32,
    pub children: [i32; 2],
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstface: u16,
    pub numfaces: u16,
}

impl LumpRecord for Q2Node {
    const SIZE: usize = 28;
}

impl WideRecord<WideNode> for Q2Node {
    fn widen(&self) -> WideNode {
        WideNode {
            planenum: self.planenum,
            children: self.children,
            mins: bounds_to_f32(self.mins),
            maxs: bounds_to_f32(self.maxs),
            firstface: u32::from(self.firstface),
            numfaces: u32::from(self.numfaces),
        }
    }

    fn narrow(wide: &WideNode, index: usize) -> Result<Self> {
        let NarrowNodeFields {
            children,
            mins,
            maxs,
            firstface,
            numfaces,
        } = narrow_node(wide, index)?;
        Ok(Self {
            planenum: wide.planenum,
            children,
            mins,
            maxs,
            firstface,
            numfaces,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Q2Face {
    pub planenum: u16,
    pub side: i16,
    pub firstedge: i32,
    pub numedges: i16,
    pub texinfo: i16,
    pub styles: [u8; 4],
    pub lightofs: i32,
}

impl LumpRecord for Q2Face {
    const SIZE: usize = 20;
}

impl WideRecord<GenericFace> for Q2Face {
    fn widen(&self) -> GenericFace {
        GenericFace {
            planenum: i64::from(self.planenum),
            side: i32::from(self.side),
            firstedge: self.firstedge,
            numedges: i32::from(self.numedges),
            texinfo: i32::from(self.texinfo),
            styles: self.styles,
            lightofs: self.lightofs,
        }
    }

    fn narrow(wide: &GenericFace, index: usize) -> Result<Self> {
        Ok(Self {
            planenum: narrow(wide.planenum, || format!("faces[{index}].planenum"))?,
            side: narrow(wide.side, || format!("faces[{index}].side"))?,
            firstedge: wide.firstedge,
            numedges: narrow(wide.numedges, || format!("faces[{index}].numedges"))?,
            texinfo: narrow(wide.texinfo, || format!("faces[{index}].texinfo"))?,
            styles: wide.styles,
            lightofs: wide.lightofs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct QbismFace {
    pub planenum: u32,
    pub side: i32,
    pub firstedge: i32,
    pub numedges: i32,
    pub texinfo: i32,
    pub styles: [u8; 4],
    pub lightofs: i32,
}

impl LumpRecord for QbismFace {
    const SIZE: usize = 28;
}

impl WideRecord<GenericFace> for QbismFace {
    fn widen(&self) -> GenericFace {
        GenericFace {
            planenum: i64::from(self.planenum),
            side: self.side,
            firstedge: self.firstedge,
            numedges: self.numedges,
            texinfo: self.texinfo,
            styles: self.styles,
            lightofs: self.lightofs,
        }
    }

    fn narrow(wide: &GenericFace, index: usize) -> Result<Self> {
        Ok(Self {
            planenum: narrow(wide.planenum, || format!("faces[{index}].planenum"))?,
            side: wide.side,
            firstedge: wide.firstedge,
            numedges: wide.numedges,
            texinfo: wide.texinfo,
            styles: wide.styles,
            lightofs: wide.lightofs,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Q2Leaf {
    pub contents: i32,
    pub cluster: i16,
    pub area: i16,
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstleafface: u16,
    pub numleaffaces: u16,
    pub firstleafbrush: u16,
    pub numleafbrushes: u16,
}

impl LumpRecord for Q2Leaf {
    const SIZE: usize = 28;
}

impl WideRecord<GenericLeaf> for Q2Leaf {
    fn widen(&self) -> GenericLeaf {
        GenericLeaf {
            contents: self.contents,
            visofs: -1,
            mins: bounds_to_f32(self.mins),
            maxs: bounds_to_f32(self.maxs),
            first_leafface: u32::from(self.firstleafface),
            num_leaffaces: u32::from(self.numleaffaces),
            ambient_level: [0; 4],
            cluster: i32::from(self.cluster),
            area: i32::from(self.area),
            first_leafbrush: u32::from(self.firstleafbrush),
            num_leafbrushes: u32::from(self.numleafbrushes),
        }
    }

    fn narrow(wide: &GenericLeaf, index: usize) -> Result<Self> {
        Ok(Self {
            contents: wide.contents,
            cluster: narrow(wide.cluster, || format!("leafs[{index}].cluster"))?,
            area: narrow(wide.area, || format!("leafs[{index}].area"))?,
            mins: mins_to_i16(wide.mins, |i| format!("leafs[{index}].mins[{i}]"))?,
            maxs: maxs_to_i16(wide.maxs, |i| format!("leafs[{index}].maxs[{i}]"))?,
            firstleafface: narrow(wide.first_leafface, || format!("leafs[{index}].firstleafface"))?,
            numleaffaces: narrow(wide.num_leaffaces, || format!("leafs[{index}].numleaffaces"))?,
            firstleafbrush: narrow(wide.first_leafbrush, || format!("leafs[{index}].firstleafbrush"))?,
            numleafbrushes: narrow(wide.num_leafbrushes, || format!("leafs[{index}].numleafbrushes"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct QbismLeaf {
    pub contents: i32,
    pub cluster: i32,
    pub area: i32,
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub firstleafface: u32,
    pub numleaffaces: u32,
    pub firstleafbrush: u32,
    pub numleafbrushes: u32,
}

impl LumpRecord for QbismLeaf {
    const SIZE: usize = 52;
}

impl WideRecord<GenericLeaf> for QbismLeaf {
    fn widen(&self) -> GenericLeaf {
        GenericLeaf {
            contents: self.contents,
            visofs: -1,
            mins: self.mins,
            maxs: self.maxs,
            first_leafface: self.firstleafface,
            num_leaffaces: self.numleaffaces,
            ambient_level: [0; 4],
            cluster: self.cluster,
            area: self.area,
            first_leafbrush: self.firstleafbrush,
            num_leafbrushes: self.numleafbrushes,
        }
    }

    fn narrow(wide: &GenericLeaf, _index: usize) -> Result<Self> {
        Ok(Self {
            contents: wide.contents,
            cluster: wide.cluster,
            area: wide.area,
            mins: wide.mins,
            maxs: wide.maxs,
            firstleafface: wide.first_leafface,
            numleaffaces: wide.num_leaffaces,
            firstleafbrush: wide.first_leafbrush,
            numleafbrushes: wide.num_leafbrushes,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Q2BrushSide {
    pub planenum: u16,
    pub texinfo: i16,
}

impl LumpRecord for Q2BrushSide {
    const SIZE: usize = 4;
}

impl WideRecord<WideBrushSide> for Q2BrushSide {
    fn widen(&self) -> WideBrushSide {
        WideBrushSide {
            planenum: u32::from(self.planenum),
            texinfo: i32::from(self.texinfo),
        }
    }

    fn narrow(wide: &WideBrushSide, index: usize) -> Result<Self> {
        Ok(Self {
            planenum: narrow(wide.planenum, || format!("brushsides[{index}].planenum"))?,
            texinfo: narrow(wide.texinfo, || format!("brushsides[{index}].texinfo"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Brush {
    pub firstside: i32,
    pub numsides: i32,
    pub contents: i32,
}

impl LumpRecord for Brush {
    const SIZE: usize = 12;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Area {
    pub num_areaportals: i32,
    pub first_areaportal: i32,
}

impl LumpRecord for Area {
    const SIZE: usize = 8;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct AreaPortal {
    pub portal_num: i32,
    pub other_area: i32,
}

impl LumpRecord for AreaPortal {
    const SIZE: usize = 8;
}

/// Record types of one Quake II version
pub trait Quake2Records: Debug + Clone + PartialEq + Default {
    type Node: Record + WideRecord<WideNode>;
    type Face: Record + WideRecord<GenericFace>;
    type Leaf: Record + WideRecord<GenericLeaf>;
    /// Leaf face and leaf brush index
    type LeafIndex: Record + WideRecord<u32>;
    type Edge: Record + WideRecord<Edge32>;
    type BrushSide: Record + WideRecord<WideBrushSide>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Q2Records;

impl Quake2Records for Q2Records {
    type Node = Q2Node;
    type Face = Q2Face;
    type Leaf = Q2Leaf;
    type LeafIndex = u16;
    type Edge = Edge16;
    type BrushSide = Q2BrushSide;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct QbismRecords;

impl Quake2Records for QbismRecords {
    type Node = WideNode;
    type Face = QbismFace;
    type Leaf = QbismLeaf;
    type LeafIndex = u32;
    type Edge = Edge32;
    type BrushSide = WideBrushSide;
}

/// A Quake II BSP in its on-disk record widths
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Quake2Bsp<V: Quake2Records> {
    pub models: Vec<Quake2Model>,
    pub visibility: Visibility,
    pub lightdata: Vec<u8>,
    pub entities: EntityText,
    pub leafs: Vec<V::Leaf>,
    pub planes: Vec<Plane>,
    pub vertexes: Vec<Vertex>,
    pub nodes: Vec<V::Node>,
    pub texinfo: Vec<Q2TexInfo>,
    pub faces: Vec<V::Face>,
    pub leaffaces: Vec<V::LeafIndex>,
    pub leafbrushes: Vec<V::LeafIndex>,
    pub edges: Vec<V::Edge>,
    pub surfedges: Vec<i32>,
    pub brushes: Vec<Brush>,
    pub brushsides: Vec<V::BrushSide>,
    pub areas: Vec<Area>,
    pub areaportals: Vec<AreaPortal>,
    /// Raw pop lump
    pub pop: Vec<u8>,
}

pub type Q2Bsp = Quake2Bsp<Q2Records>;
pub type QbismBsp = Quake2Bsp<QbismRecords>;

/// Parse the cluster visibility lump: a cluster count, a `[pvs, phs]`
/// offset pair per cluster, then the compressed bits
fn read_visibility(bytes: &[u8]) -> Result<Visibility> {
    if bytes.is_empty() {
        return Ok(Visibility::default());
    }
    let overflow = || BspError::LumpOverflow {
        lump: "visibility",
        length: bytes.len(),
        record_size: 8,
    };
    let mut cursor = Cursor::new(bytes);
    let numclusters = i32::read_options(&mut cursor, Endian::Little, ()).map_err(|_| overflow())?;
    let numclusters = usize::try_from(numclusters).map_err(|_| overflow())?;
    let header = numclusters
        .checked_mul(8)
        .and_then(|n| n.checked_add(4))
        .filter(|&n| n <= bytes.len())
        .ok_or_else(overflow)?;
    let bit_offsets = (0..numclusters)
        .map(|_| <[i32; 2]>::read_options(&mut cursor, Endian::Little, ()))
        .collect::<binrw::BinResult<Vec<_>>>()?;
    Ok(Visibility {
        bit_offsets,
        bits: bytes[header..].to_vec(),
    })
}

fn write_visibility(vis: &Visibility) -> Result<Vec<u8>> {
    if vis.bit_offsets.is_empty() && vis.bits.is_empty() {
        return Ok(Vec::new());
    }
    let numclusters: i32 = narrow(vis.bit_offsets.len(), || "visibility.numclusters".to_string())?;
    let mut cursor = Cursor::new(Vec::with_capacity(4 + vis.bit_offsets.len() * 8 + vis.bits.len()));
    numclusters.write_options(&mut cursor, Endian::Little, ())?;
    for offsets in &vis.bit_offsets {
        offsets.write_options(&mut cursor, Endian::Little, ())?;
    }
    let mut data = cursor.into_inner();
    data.extend_from_slice(&vis.bits);
    Ok(data)
}

fn widen_all<T: WideRecord<W>, W>(records: &[T]) -> Vec<W> {
    records.iter().map(WideRecord::widen).collect()
}

fn narrow_all<T: WideRecord<W>, W>(records: &[W]) -> Result<Vec<T>> {
    records
        .iter()
        .enumerate()
        .map(|(index, wide)| T::narrow(wide, index))
        .collect()
}

impl<V: Quake2Records> Quake2Bsp<V> {
    pub(crate) fn read(lumps: &LumpReader<'_>) -> Result<Self> {
        Ok(Self {
            entities: lumps.entities(lump::ENTITIES)?,
            planes: lumps.records(lump::PLANES)?,
            vertexes: lumps.records(lump::VERTEXES)?,
            visibility: read_visibility(lumps.bytes(lump::VISIBILITY)?)?,
            nodes: lumps.records(lump::NODES)?,
            texinfo: lumps.records(lump::TEXINFO)?,
            faces: lumps.records(lump::FACES)?,
            lightdata: lumps.raw(lump::LIGHTING)?,
            leafs: lumps.records(lump::LEAFS)?,
            leaffaces: lumps.records(lump::LEAFFACES)?,
            leafbrushes: lumps.records(lump::LEAFBRUSHES)?,
            edges: lumps.records(lump::EDGES)?,
            surfedges: lumps.records(lump::SURFEDGES)?,
            models: lumps.records(lump::MODELS)?,
            brushes: lumps.records(lump::BRUSHES)?,
            brushsides: lumps.records(lump::BRUSHSIDES)?,
            pop: lumps.raw(lump::POP)?,
            areas: lumps.records(lump::AREAS)?,
            areaportals: lumps.records(lump::AREAPORTALS)?,
        })
    }

    pub(crate) fn write(&self, lumps: &mut LumpWriter) -> Result<()> {
        lumps.entities(lump::ENTITIES, &self.entities);
        lumps.records(lump::PLANES, &self.planes)?;
        lumps.records(lump::VERTEXES, &self.vertexes)?;
        lumps.raw(lump::VISIBILITY, &write_visibility(&self.visibility)?);
        lumps.records(lump::NODES, &self.nodes)?;
        lumps.records(lump::TEXINFO, &self.texinfo)?;
        lumps.records(lump::FACES, &self.faces)?;
        lumps.raw(lump::LIGHTING, &self.lightdata);
        lumps.records(lump::LEAFS, &self.leafs)?;
        lumps.records(lump::LEAFFACES, &self.leaffaces)?;
        lumps.records(lump::LEAFBRUSHES, &self.leafbrushes)?;
        lumps.records(lump::EDGES, &self.edges)?;
        lumps.records(lump::SURFEDGES, &self.surfedges)?;
        lumps.records(lump::MODELS, &self.models)?;
        lumps.records(lump::BRUSHES, &self.brushes)?;
        lumps.records(lump::BRUSHSIDES, &self.brushsides)?;
        lumps.raw(lump::POP, &self.pop);
        lumps.records(lump::AREAS, &self.areas)?;
        lumps.records(lump::AREAPORTALS, &self.areaportals)
    }

    pub fn to_generic(&self, game: Option<&GameDefinition>) -> GenericBsp {
        GenericBsp {
            game: game.map(|g| g.id).unwrap_or_default(),
            models: self.models.iter().map(Quake2Model::widen).collect(),
            visibility: self.visibility.clone(),
            lightdata: self.lightdata.clone(),
            entities: self.entities.clone(),
            leafs: widen_all(&self.leafs),
            planes: self.planes.clone(),
            vertexes: self.vertexes.clone(),
            nodes: widen_all(&self.nodes),
            texinfo: self
                .texinfo
                .iter()
                .map(|info| GenericTexInfo {
                    vecs: info.vecs,
                    flags: game.map_or_else(
                        || SurfaceFlags::from_native(info.flags),
                        |g| g.surface_flags_from_native(info.flags),
                    ),
                    miptex: 0,
                    value: info.value,
                    texture: info.texture,
                    next_texinfo: info.next_texinfo,
                })
                .collect(),
            faces: widen_all(&self.faces),
            edges: widen_all(&self.edges),
            leaffaces: widen_all(&self.leaffaces),
            leafbrushes: widen_all(&self.leafbrushes),
            surfedges: self.surfedges.clone(),
            areas: self.areas.clone(),
            areaportals: self.areaportals.clone(),
            brushes: self.brushes.clone(),
            brushsides: widen_all(&self.brushsides),
            pop: self.pop.clone(),
            ..GenericBsp::default()
        }
    }

    /// Narrow from the generic layout. Only the first head node of each
    /// model survives; clipnodes, miptex data and per-leaf vis have no place
    /// here and are dropped.
    pub fn from_generic(generic: &GenericBsp) -> Result<Self> {
        if !generic.clipnodes.is_empty() {
            warn!("Dropping {} clipnodes, Quake II collides against brushes", generic.clipnodes.len());
        }
        if !generic.textures.is_empty() {
            warn!("Dropping {} bytes of embedded miptex data", generic.textures.len());
        }
        let visibility = if generic.visibility.bit_offsets.is_empty() && !generic.visibility.bits.is_empty() {
            warn!("Dropping per-leaf visibility, Quake II leafs use clusters");
            Visibility::default()
        } else {
            generic.visibility.clone()
        };
        Ok(Self {
            models: generic.models.iter().map(Quake2Model::narrow).collect(),
            visibility,
            lightdata: generic.lightdata.clone(),
            entities: generic.entities.clone(),
            leafs: narrow_all(&generic.leafs)?,
            planes: generic.planes.clone(),
            vertexes: generic.vertexes.clone(),
            nodes: narrow_all(&generic.nodes)?,
            texinfo: generic
                .texinfo
                .iter()
                .map(|info| Q2TexInfo {
                    vecs: info.vecs,
                    flags: info.flags.native,
                    value: info.value,
                    texture: info.texture,
                    next_texinfo: info.next_texinfo,
                })
                .collect(),
            faces: narrow_all(&generic.faces)?,
            leaffaces: narrow_all(&generic.leaffaces)?,
            leafbrushes: narrow_all(&generic.leafbrushes)?,
            edges: narrow_all(&generic.edges)?,
            surfedges: generic.surfedges.clone(),
            brushes: generic.brushes.clone(),
            brushsides: narrow_all(&generic.brushsides)?,
            areas: generic.areas.clone(),
            areaportals: generic.areaportals.clone(),
            pop: generic.pop.clone(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::game::GAME_QUAKE_II;

    fn written_len<T: Record>(record: &T) -> usize {
        let mut cursor = Cursor::new(Vec::new());
        record
            .write_options(&mut cursor, Endian::Little, ())
            .expect("Test operation should succeed");
        cursor.into_inner().len()
    }

    #[test]
    fn test_record_sizes_match_layout() {
        assert_eq!(written_len(&Quake2Model::default()), Quake2Model::SIZE);
        assert_eq!(written_len(&Q2TexInfo::default()), Q2TexInfo::SIZE);
        assert_eq!(written_len(&Q2Node::default()), Q2Node::SIZE);
        assert_eq!(written_len(&Q2Face::default()), Q2Face::SIZE);
        assert_eq!(written_len(&QbismFace::default()), QbismFace::SIZE);
        assert_eq!(written_len(&Q2Leaf::default()), Q2Leaf::SIZE);
        assert_eq!(written_len(&QbismLeaf::default()), QbismLeaf::SIZE);
        assert_eq!(written_len(&Q2BrushSide::default()), Q2BrushSide::SIZE);
        assert_eq!(written_len(&Brush::default()), Brush::SIZE);
        assert_eq!(written_len(&Area::default()), Area::SIZE);
        assert_eq!(written_len(&AreaPortal::default()), AreaPortal::SIZE);
    }

    #[test]
    fn test_visibility_lump() {
        let vis = Visibility {
            bit_offsets: vec![[20, 22], [24, 26]],
            bits: vec![0xff, 0x01, 0x00, 0x02, 0x7f, 0x80],
        };
        let data = write_visibility(&vis).expect("Test operation should succeed");
        assert_eq!(data.len(), 4 + 16 + 6);
        assert_eq!(&data[..4], &2i32.to_le_bytes());
        assert_eq!(read_visibility(&data).expect("Test operation should succeed"), vis);

        assert!(write_visibility(&Visibility::default())
            .expect("Test operation should succeed")
            .is_empty());
        assert_eq!(
            read_visibility(&[]).expect("Test operation should succeed"),
            Visibility::default()
        );
    }

    #[test]
    fn test_visibility_header_past_end_is_overflow() {
        let mut data = 5i32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0; 8]);
        assert!(matches!(
            read_visibility(&data),
            Err(BspError::LumpOverflow { lump: "visibility", .. })
        ));
        assert!(read_visibility(&(-1i32).to_le_bytes()).is_err());
    }

    #[test]
    fn test_leaf_cluster_overflow() {
        let wide = GenericLeaf {
            cluster: 40_000,
            ..GenericLeaf::default()
        };
        let err = Q2Leaf::narrow(&wide, 5).expect_err("40000 should not fit in i16");
        assert!(err.to_string().contains("leafs[5].cluster"));
        assert!(QbismLeaf::narrow(&wide, 5).is_ok());
    }

    #[test]
    fn test_generic_round_trip_keeps_quake2_fields() {
        let bsp = Q2Bsp {
            models: vec![Quake2Model {
                headnode: 7,
                numfaces: 2,
                ..Quake2Model::default()
            }],
            visibility: Visibility {
                bit_offsets: vec![[12, 13]],
                bits: vec![0x01, 0x01],
            },
            leafs: vec![Q2Leaf {
                contents: 1,
                cluster: 0,
                area: 1,
                numleafbrushes: 1,
                ..Q2Leaf::default()
            }],
            texinfo: vec![Q2TexInfo {
                flags: 0x4,
                value: 300,
                texture: TextureName::new("e1u1/sky1"),
                next_texinfo: -1,
                ..Q2TexInfo::default()
            }],
            leafbrushes: vec![0],
            brushes: vec![Brush {
                firstside: 0,
                numsides: 1,
                contents: 1,
            }],
            brushsides: vec![Q2BrushSide {
                planenum: 3,
                texinfo: 0,
            }],
            areas: vec![Area::default(), Area::default()],
            ..Q2Bsp::default()
        };
        let generic = bsp.to_generic(Some(&GAME_QUAKE_II));
        assert_eq!(generic.models[0].headnode[0], 7);
        assert_eq!(generic.leafs[0].visofs, -1);
        assert_eq!(generic.texinfo[0].texture.name(), "e1u1/sky1");

        let back = Q2Bsp::from_generic(&generic).expect("Test operation should succeed");
        assert_eq!(back, bsp);

        let qbism = QbismBsp::from_generic(&generic).expect("Test operation should succeed");
        assert_eq!(qbism.to_generic(Some(&GAME_QUAKE_II)), generic);
    }
}
