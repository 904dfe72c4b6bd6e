//! Quake-family layouts: BSP29, BSP2-RMQ and BSP2
//!
//! The three versions share a lump list and differ only in the width of
//! node, face, clipnode, leaf, marksurface and edge records. [`QuakeBsp`] is
//! generic over a [`QuakeRecords`] set picking those record types.

use super::common::{
    Edge16, Edge32, EntityText, LumpRecord, Model, NarrowNodeFields, Plane, Record, Vertex, Visibility, WideClipNode,
    WideNode, WideRecord, narrow_node,
};
use super::generic::{GenericBsp, GenericFace, GenericLeaf, GenericTexInfo};
use super::texvec::TexVec;
use super::{LumpReader, LumpWriter};
use crate::convert::numeric::{bounds_to_f32, maxs_to_i16, mins_to_i16, narrow, narrow_array};
use crate::error::Result;
use crate::game::GameDefinition;
use crate::surface::SurfaceFlags;
use binrw::{BinRead, BinWrite};
use std::fmt::Debug;
use tracing::warn;

/// Lump directory slots
pub mod lump {
    pub const ENTITIES: usize = 0;
    pub const PLANES: usize = 1;
    pub const TEXTURES: usize = 2;
    pub const VERTEXES: usize = 3;
    pub const VISIBILITY: usize = 4;
    pub const NODES: usize = 5;
    pub const TEXINFO: usize = 6;
    pub const FACES: usize = 7;
    pub const LIGHTING: usize = 8;
    pub const CLIPNODES: usize = 9;
    pub const LEAFS: usize = 10;
    pub const MARKSURFACES: usize = 11;
    pub const EDGES: usize = 12;
    pub const SURFEDGES: usize = 13;
    pub const MODELS: usize = 14;
    pub const COUNT: usize = 15;
}

/// Order lump payloads are laid out in the file
pub const WRITE_ORDER: [usize; lump::COUNT] = [
    lump::PLANES,
    lump::LEAFS,
    lump::VERTEXES,
    lump::NODES,
    lump::TEXINFO,
    lump::FACES,
    lump::CLIPNODES,
    lump::MARKSURFACES,
    lump::SURFEDGES,
    lump::EDGES,
    lump::MODELS,
    lump::LIGHTING,
    lump::VISIBILITY,
    lump::ENTITIES,
    lump::TEXTURES,
];

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct QuakeTexInfo {
    pub vecs: TexVec,
    pub miptex: i32,
    pub flags: i32,
}

impl LumpRecord for QuakeTexInfo {
    const SIZE: usize = 40;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Bsp29Node {
    pub planenum: i32,
    pub children: [i16; 2],
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstface: u16,
    pub numfaces: u16,
}

impl LumpRecord for Bsp29Node {
    const SIZE: usize = 24;
}

impl WideRecord<WideNode> for Bsp29Node {
    fn widen(&self) -> WideNode {
        WideNode {
            planenum: self.planenum,
            children: self.children.map(i32::from),
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
pub struct Bsp2RmqNode {
    pub planenum: i32,
    pub children: [i32; 2],
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstface: u32,
    pub numfaces: u32,
}

impl LumpRecord for Bsp2RmqNode {
    const SIZE: usize = 32;
}

impl WideRecord<WideNode> for Bsp2RmqNode {
    fn widen(&self) -> WideNode {
        WideNode {
            planenum: self.planenum,
            children: self.children,
            mins: bounds_to_f32(self.mins),
            maxs: bounds_to_f32(self.maxs),
            firstface: self.firstface,
            numfaces: self.numfaces,
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
pub struct Bsp29Face {
    pub planenum: i16,
    pub side: i16,
    pub firstedge: i32,
    pub numedges: i16,
    pub texinfo: i16,
    pub styles: [u8; 4],
    pub lightofs: i32,
}

impl LumpRecord for Bsp29Face {
    const SIZE: usize = 20;
}

impl WideRecord<GenericFace> for Bsp29Face {
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

/// BSP2 and BSP2-RMQ face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Bsp2Face {
    pub planenum: i32,
    pub side: i32,
    pub firstedge: i32,
    pub numedges: i32,
    pub texinfo: i32,
    pub styles: [u8; 4],
    pub lightofs: i32,
}

impl LumpRecord for Bsp2Face {
    const SIZE: usize = 28;
}

impl WideRecord<GenericFace> for Bsp2Face {
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
pub struct Bsp29ClipNode {
    pub planenum: i32,
    pub children: [i16; 2],
}

impl LumpRecord for Bsp29ClipNode {
    const SIZE: usize = 8;
}

impl WideRecord<WideClipNode> for Bsp29ClipNode {
    fn widen(&self) -> WideClipNode {
        WideClipNode {
            planenum: self.planenum,
            children: self.children.map(i32::from),
        }
    }

    fn narrow(wide: &WideClipNode, index: usize) -> Result<Self> {
        Ok(Self {
            planenum: wide.planenum,
            children: narrow_array(wide.children, |i| format!("clipnodes[{index}].children[{i}]"))?,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Bsp29Leaf {
    pub contents: i32,
    pub visofs: i32,
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstmarksurface: u16,
    pub nummarksurfaces: u16,
    pub ambient_level: [u8; 4],
}

impl LumpRecord for Bsp29Leaf {
    const SIZE: usize = 28;
}

impl WideRecord<GenericLeaf> for Bsp29Leaf {
    fn widen(&self) -> GenericLeaf {
        GenericLeaf {
            contents: self.contents,
            visofs: self.visofs,
            mins: bounds_to_f32(self.mins),
            maxs: bounds_to_f32(self.maxs),
            first_leafface: u32::from(self.firstmarksurface),
            num_leaffaces: u32::from(self.nummarksurfaces),
            ambient_level: self.ambient_level,
            cluster: -1,
            ..GenericLeaf::default()
        }
    }

    fn narrow(wide: &GenericLeaf, index: usize) -> Result<Self> {
        Ok(Self {
            contents: wide.contents,
            visofs: wide.visofs,
            mins: mins_to_i16(wide.mins, |i| format!("leafs[{index}].mins[{i}]"))?,
            maxs: maxs_to_i16(wide.maxs, |i| format!("leafs[{index}].maxs[{i}]"))?,
            firstmarksurface: narrow(wide.first_leafface, || format!("leafs[{index}].firstmarksurface"))?,
            nummarksurfaces: narrow(wide.num_leaffaces, || format!("leafs[{index}].nummarksurfaces"))?,
            ambient_level: wide.ambient_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Bsp2RmqLeaf {
    pub contents: i32,
    pub visofs: i32,
    pub mins: [i16; 3],
    pub maxs: [i16; 3],
    pub firstmarksurface: u32,
    pub nummarksurfaces: u32,
    pub ambient_level: [u8; 4],
}

impl LumpRecord for Bsp2RmqLeaf {
    const SIZE: usize = 32;
}

impl WideRecord<GenericLeaf> for Bsp2RmqLeaf {
    fn widen(&self) -> GenericLeaf {
        GenericLeaf {
            contents: self.contents,
            visofs: self.visofs,
            mins: bounds_to_f32(self.mins),
            maxs: bounds_to_f32(self.maxs),
            first_leafface: self.firstmarksurface,
            num_leaffaces: self.nummarksurfaces,
            ambient_level: self.ambient_level,
            cluster: -1,
            ..GenericLeaf::default()
        }
    }

    fn narrow(wide: &GenericLeaf, index: usize) -> Result<Self> {
        Ok(Self {
            contents: wide.contents,
            visofs: wide.visofs,
            mins: mins_to_i16(wide.mins, |i| format!("leafs[{index}].mins[{i}]"))?,
            maxs: maxs_to_i16(wide.maxs, |i| format!("leafs[{index}].maxs[{i}]"))?,
            firstmarksurface: wide.first_leafface,
            nummarksurfaces: wide.num_leaffaces,
            ambient_level: wide.ambient_level,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, BinRead, BinWrite)]
#[brw(little)]
pub struct Bsp2Leaf {
    pub contents: i32,
    pub visofs: i32,
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub firstmarksurface: u32,
    pub nummarksurfaces: u32,
    pub ambient_level: [u8; 4],
}

impl LumpRecord for Bsp2Leaf {
    const SIZE: usize = 44;
}

impl WideRecord<GenericLeaf> for Bsp2Leaf {
    fn widen(&self) -> GenericLeaf {
        GenericLeaf {
            contents: self.contents,
            visofs: self.visofs,
            mins: self.mins,
            maxs: self.maxs,
            first_leafface: self.firstmarksurface,
            num_leaffaces: self.nummarksurfaces,
            ambient_level: self.ambient_level,
            cluster: -1,
            ..GenericLeaf::default()
        }
    }

    fn narrow(wide: &GenericLeaf, _index: usize) -> Result<Self> {
        Ok(Self {
            contents: wide.contents,
            visofs: wide.visofs,
            mins: wide.mins,
            maxs: wide.maxs,
            firstmarksurface: wide.first_leafface,
            nummarksurfaces: wide.num_leaffaces,
            ambient_level: wide.ambient_level,
        })
    }
}

/// Record types of one Quake-family version
pub trait QuakeRecords: Debug + Clone + PartialEq + Default {
    type Node: Record + WideRecord<WideNode>;
    type Face: Record + WideRecord<GenericFace>;
    type ClipNode: Record + WideRecord<WideClipNode>;
    type Leaf: Record + WideRecord<GenericLeaf>;
    type MarkSurface: Record + WideRecord<u32>;
    type Edge: Record + WideRecord<Edge32>;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bsp29Records;

impl QuakeRecords for Bsp29Records {
    type Node = Bsp29Node;
    type Face = Bsp29Face;
    type ClipNode = Bsp29ClipNode;
    type Leaf = Bsp29Leaf;
    type MarkSurface = u16;
    type Edge = Edge16;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bsp2RmqRecords;

impl QuakeRecords for Bsp2RmqRecords {
    type Node = Bsp2RmqNode;
    type Face = Bsp2Face;
    type ClipNode = WideClipNode;
    type Leaf = Bsp2RmqLeaf;
    type MarkSurface = u32;
    type Edge = Edge32;
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Bsp2Records;

impl QuakeRecords for Bsp2Records {
    type Node = WideNode;
    type Face = Bsp2Face;
    type ClipNode = WideClipNode;
    type Leaf = Bsp2Leaf;
    type MarkSurface = u32;
    type Edge = Edge32;
}

/// A Quake-family BSP in its on-disk record widths
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuakeBsp<V: QuakeRecords> {
    pub models: Vec<Model>,
    pub visdata: Vec<u8>,
    pub lightdata: Vec<u8>,
    /// Raw miptex lump
    pub textures: Vec<u8>,
    pub entities: EntityText,
    pub leafs: Vec<V::Leaf>,
    pub planes: Vec<Plane>,
    pub vertexes: Vec<Vertex>,
    pub nodes: Vec<V::Node>,
    pub texinfo: Vec<QuakeTexInfo>,
    pub faces: Vec<V::Face>,
    pub clipnodes: Vec<V::ClipNode>,
    pub marksurfaces: Vec<V::MarkSurface>,
    pub surfedges: Vec<i32>,
    pub edges: Vec<V::Edge>,
}

pub type Bsp29 = QuakeBsp<Bsp29Records>;
pub type Bsp2Rmq = QuakeBsp<Bsp2RmqRecords>;
pub type Bsp2 = QuakeBsp<Bsp2Records>;

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

impl<V: QuakeRecords> QuakeBsp<V> {
    pub(crate) fn read(lumps: &LumpReader<'_>) -> Result<Self> {
        Ok(Self {
            entities: lumps.entities(lump::ENTITIES)?,
            planes: lumps.records(lump::PLANES)?,
            textures: lumps.raw(lump::TEXTURES)?,
            vertexes: lumps.records(lump::VERTEXES)?,
            visdata: lumps.raw(lump::VISIBILITY)?,
            nodes: lumps.records(lump::NODES)?,
            texinfo: lumps.records(lump::TEXINFO)?,
            faces: lumps.records(lump::FACES)?,
            lightdata: lumps.raw(lump::LIGHTING)?,
            clipnodes: lumps.records(lump::CLIPNODES)?,
            leafs: lumps.records(lump::LEAFS)?,
            marksurfaces: lumps.records(lump::MARKSURFACES)?,
            edges: lumps.records(lump::EDGES)?,
            surfedges: lumps.records(lump::SURFEDGES)?,
            models: lumps.models(lump::MODELS)?,
        })
    }

    pub(crate) fn write(&self, lumps: &mut LumpWriter) -> Result<()> {
        lumps.entities(lump::ENTITIES, &self.entities);
        lumps.records(lump::PLANES, &self.planes)?;
        lumps.raw(lump::TEXTURES, &self.textures);
        lumps.records(lump::VERTEXES, &self.vertexes)?;
        lumps.raw(lump::VISIBILITY, &self.visdata);
        lumps.records(lump::NODES, &self.nodes)?;
        lumps.records(lump::TEXINFO, &self.texinfo)?;
        lumps.records(lump::FACES, &self.faces)?;
        lumps.raw(lump::LIGHTING, &self.lightdata);
        lumps.records(lump::CLIPNODES, &self.clipnodes)?;
        lumps.records(lump::LEAFS, &self.leafs)?;
        lumps.records(lump::MARKSURFACES, &self.marksurfaces)?;
        lumps.records(lump::EDGES, &self.edges)?;
        lumps.records(lump::SURFEDGES, &self.surfedges)?;
        lumps.models(lump::MODELS, &self.models)
    }

    /// Widen into the generic layout. `game` decodes texinfo flags and
    /// tags the content space.
    pub fn to_generic(&self, game: Option<&GameDefinition>) -> GenericBsp {
        GenericBsp {
            game: game.map(|g| g.id).unwrap_or_default(),
            models: self.models.clone(),
            visibility: Visibility {
                bit_offsets: Vec::new(),
                bits: self.visdata.clone(),
            },
            lightdata: self.lightdata.clone(),
            textures: self.textures.clone(),
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
                    miptex: info.miptex,
                    next_texinfo: -1,
                    ..GenericTexInfo::default()
                })
                .collect(),
            faces: widen_all(&self.faces),
            clipnodes: widen_all(&self.clipnodes),
            edges: widen_all(&self.edges),
            leaffaces: widen_all(&self.marksurfaces),
            surfedges: self.surfedges.clone(),
            ..GenericBsp::default()
        }
    }

    /// Narrow from the generic layout, keeping `hulls` head nodes per model.
    /// Quake II areas, brushes and cluster vis have no place here and are
    /// dropped.
    pub fn from_generic(generic: &GenericBsp, hulls: usize) -> Result<Self> {
        let visdata = if generic.visibility.bit_offsets.is_empty() {
            generic.visibility.bits.clone()
        } else {
            warn!("Dropping cluster visibility, Quake-family leafs use per-leaf offsets");
            Vec::new()
        };
        let models = generic
            .models
            .iter()
            .map(|model| {
                let mut model = *model;
                for node in model.headnode.iter_mut().skip(hulls) {
                    *node = 0;
                }
                model
            })
            .collect();
        Ok(Self {
            models,
            visdata,
            lightdata: generic.lightdata.clone(),
            textures: generic.textures.clone(),
            entities: generic.entities.clone(),
            leafs: narrow_all(&generic.leafs)?,
            planes: generic.planes.clone(),
            vertexes: generic.vertexes.clone(),
            nodes: narrow_all(&generic.nodes)?,
            texinfo: generic
                .texinfo
                .iter()
                .map(|info| QuakeTexInfo {
                    vecs: info.vecs,
                    miptex: info.miptex,
                    flags: info.flags.native,
                })
                .collect(),
            faces: narrow_all(&generic.faces)?,
            clipnodes: narrow_all(&generic.clipnodes)?,
            marksurfaces: narrow_all(&generic.leaffaces)?,
            surfedges: generic.surfedges.clone(),
            edges: narrow_all(&generic.edges)?,
        })
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::BspError;
    use crate::game::GAME_QUAKE;
    use std::io::Cursor;

    fn written_len<T: Record>(record: &T) -> usize {
        let mut cursor = Cursor::new(Vec::new());
        record
            .write_options(&mut cursor, binrw::Endian::Little, ())
            .expect("Test operation should succeed");
        cursor.into_inner().len()
    }

    #[test]
    fn test_record_sizes_match_layout() {
        assert_eq!(written_len(&QuakeTexInfo::default()), QuakeTexInfo::SIZE);
        assert_eq!(written_len(&Bsp29Node::default()), Bsp29Node::SIZE);
        assert_eq!(written_len(&Bsp2RmqNode::default()), Bsp2RmqNode::SIZE);
        assert_eq!(written_len(&Bsp29Face::default()), Bsp29Face::SIZE);
        assert_eq!(written_len(&Bsp2Face::default()), Bsp2Face::SIZE);
        assert_eq!(written_len(&Bsp29ClipNode::default()), Bsp29ClipNode::SIZE);
        assert_eq!(written_len(&Bsp29Leaf::default()), Bsp29Leaf::SIZE);
        assert_eq!(written_len(&Bsp2RmqLeaf::default()), Bsp2RmqLeaf::SIZE);
        assert_eq!(written_len(&Bsp2Leaf::default()), Bsp2Leaf::SIZE);
    }

    #[test]
    fn test_leaf_bounds_round_outwards() {
        let wide = GenericLeaf {
            contents: -1,
            mins: [-10.25, 0.0, 4.5],
            maxs: [10.25, 0.0, 4.5],
            ..GenericLeaf::default()
        };
        let leaf = Bsp29Leaf::narrow(&wide, 0).expect("Test operation should succeed");
        assert_eq!(leaf.mins, [-11, 0, 4]);
        assert_eq!(leaf.maxs, [11, 0, 5]);
    }

    #[test]
    fn test_node_overflow_names_field() {
        let wide = WideNode {
            children: [1, 40_000],
            ..WideNode::default()
        };
        let err = Bsp29Node::narrow(&wide, 3).expect_err("40000 should not fit in i16");
        assert!(matches!(
            err,
            BspError::NumericOverflow { ref field, .. } if field == "nodes[3].children[1]"
        ));
        assert!(Bsp2RmqNode::narrow(&wide, 3).is_ok());
    }

    #[test]
    fn test_generic_round_trip_keeps_quake_fields() {
        let bsp = Bsp29 {
            entities: EntityText::from_text("{\n\"classname\" \"worldspawn\"\n}\n"),
            leafs: vec![Bsp29Leaf {
                contents: -2,
                visofs: -1,
                ambient_level: [1, 2, 3, 4],
                ..Bsp29Leaf::default()
            }],
            texinfo: vec![QuakeTexInfo {
                flags: 1,
                miptex: 3,
                ..QuakeTexInfo::default()
            }],
            models: vec![Model {
                headnode: [0, 1, 2, 3, 0, 0, 0, 0],
                ..Model::default()
            }],
            marksurfaces: vec![0, 1, 2],
            ..Bsp29::default()
        };
        let generic = bsp.to_generic(Some(&GAME_QUAKE));
        assert_eq!(generic.leafs[0].cluster, -1);
        assert_eq!(generic.texinfo[0].next_texinfo, -1);
        assert_eq!(generic.leaffaces, vec![0, 1, 2]);

        let back = Bsp29::from_generic(&generic, 4).expect("Test operation should succeed");
        assert_eq!(back, bsp);
    }
}
