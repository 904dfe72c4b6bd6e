//! Generic layout: the widest superset of every on-disk version
//!
//! Indices are 32-bit, bounds are float, models have eight head nodes, and
//! both Quake leaf data (ambient levels, vis offsets) and Quake II data
//! (clusters, areas, brushes) have a place. Nothing is lost converting into
//! it, which makes it the hub every conversion passes through. It has no
//! on-disk form.

use super::common::{Edge32, EntityText, Model, Plane, TextureName, Vertex, Visibility, WideBrushSide, WideClipNode, WideNode};
use super::quake2::{Area, AreaPortal, Brush};
use super::texvec::TexVec;
use crate::game::GameId;
use crate::surface::SurfaceFlags;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenericLeaf {
    pub contents: i32,
    /// Quake vis offset; -1 when the leaf has none
    pub visofs: i32,
    pub mins: [f32; 3],
    pub maxs: [f32; 3],
    pub first_leafface: u32,
    pub num_leaffaces: u32,
    pub ambient_level: [u8; 4],
    /// Quake II vis cluster; -1 when the leaf has none
    pub cluster: i32,
    pub area: i32,
    pub first_leafbrush: u32,
    pub num_leafbrushes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct GenericFace {
    pub planenum: i64,
    pub side: i32,
    pub firstedge: i32,
    pub numedges: i32,
    pub texinfo: i32,
    pub styles: [u8; 4],
    pub lightofs: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenericTexInfo {
    pub vecs: TexVec,
    pub flags: SurfaceFlags,
    /// Quake miptex index
    pub miptex: i32,
    /// Quake II light value
    pub value: i32,
    /// Quake II texture name
    pub texture: TextureName,
    /// Quake II animation chain; -1 ends it
    pub next_texinfo: i32,
}

/// The generic BSP. `game` names the content space of leaf and brush
/// contents; `Unknown` means they are carried across conversions untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenericBsp {
    pub game: GameId,
    pub models: Vec<Model>,
    pub visibility: Visibility,
    pub lightdata: Vec<u8>,
    pub textures: Vec<u8>,
    pub entities: EntityText,
    pub leafs: Vec<GenericLeaf>,
    pub planes: Vec<Plane>,
    pub vertexes: Vec<Vertex>,
    pub nodes: Vec<WideNode>,
    pub texinfo: Vec<GenericTexInfo>,
    pub faces: Vec<GenericFace>,
    pub clipnodes: Vec<WideClipNode>,
    pub edges: Vec<Edge32>,
    pub leaffaces: Vec<u32>,
    pub leafbrushes: Vec<u32>,
    pub surfedges: Vec<i32>,
    pub areas: Vec<Area>,
    pub areaportals: Vec<AreaPortal>,
    pub brushes: Vec<Brush>,
    pub brushsides: Vec<WideBrushSide>,
    pub pop: Vec<u8>,
}
