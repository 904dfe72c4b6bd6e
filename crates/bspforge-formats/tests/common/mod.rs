//! Shared fixtures: small but fully populated maps for each game family

#![allow(dead_code)]

use bspforge_formats::layout::quake2::{Area, AreaPortal, Brush};
use bspforge_formats::layout::{
    Edge32, EntityText, GenericBsp, GenericFace, GenericLeaf, GenericTexInfo, Model, Plane, TexVec, TextureName,
    Vertex, Visibility, WideBrushSide, WideClipNode, WideNode,
};
use bspforge_formats::version::BSPVER_GENERIC;
use bspforge_formats::{BspDocument, FormatDescriptor, SurfaceFlags, convert_bsp_format};

const ENTITIES: &str = "{\n\"classname\" \"worldspawn\"\n\"wad\" \"gfx/base.wad\"\n}\n\
{\n\"classname\" \"info_player_start\"\n\"origin\" \"0 0 24\"\n}\n";

fn planes() -> Vec<Plane> {
    vec![
        Plane {
            normal: [1.0, 0.0, 0.0],
            dist: 0.0,
            plane_type: 0,
        },
        Plane {
            normal: [0.0, 0.0, 1.0],
            dist: -64.0,
            plane_type: 2,
        },
    ]
}

fn vertexes() -> Vec<Vertex> {
    vec![
        Vertex {
            point: [-64.0, -64.0, -64.0],
        },
        Vertex {
            point: [64.0, -64.0, -64.0],
        },
        Vertex {
            point: [64.0, 64.0, -64.0],
        },
    ]
}

fn texvec() -> TexVec {
    TexVec::from_rows([[1.0, 0.0, 0.0, 8.0], [0.0, -1.0, 0.0, 16.0]])
}

fn face() -> GenericFace {
    GenericFace {
        planenum: 1,
        side: 0,
        firstedge: 0,
        numedges: 3,
        texinfo: 0,
        styles: [0, 255, 255, 255],
        lightofs: 0,
    }
}

fn node() -> WideNode {
    WideNode {
        planenum: 0,
        children: [-1, -2],
        mins: [-64.0, -64.0, -64.0],
        maxs: [64.0, 64.0, 64.0],
        firstface: 0,
        numfaces: 1,
    }
}

fn edges() -> Vec<Edge32> {
    vec![Edge32 { v: [0, 1] }, Edge32 { v: [1, 2] }, Edge32 { v: [2, 0] }]
}

/// Quake-family map in the generic layout, game-neutral
pub fn quake_generic() -> GenericBsp {
    GenericBsp {
        models: vec![Model {
            mins: [-64.0, -64.0, -64.0],
            maxs: [64.0, 64.0, 64.0],
            headnode: [0, 0, 0, 0, 0, 0, 0, 0],
            visleafs: 1,
            firstface: 0,
            numfaces: 1,
            ..Model::default()
        }],
        visibility: Visibility {
            bit_offsets: Vec::new(),
            bits: vec![0x01, 0x00, 0x02],
        },
        lightdata: (0..18).collect(),
        textures: 0i32.to_le_bytes().to_vec(),
        entities: EntityText::from_text(ENTITIES),
        leafs: vec![
            GenericLeaf {
                contents: -2,
                visofs: -1,
                cluster: -1,
                ..GenericLeaf::default()
            },
            GenericLeaf {
                contents: -1,
                visofs: 0,
                mins: [-64.0, -64.0, -64.0],
                maxs: [64.0, 64.0, 64.0],
                first_leafface: 0,
                num_leaffaces: 1,
                ambient_level: [0, 0, 32, 0],
                cluster: -1,
                ..GenericLeaf::default()
            },
        ],
        planes: planes(),
        vertexes: vertexes(),
        nodes: vec![node()],
        texinfo: vec![GenericTexInfo {
            vecs: texvec(),
            flags: SurfaceFlags::from_native(0),
            miptex: 0,
            next_texinfo: -1,
            ..GenericTexInfo::default()
        }],
        faces: vec![face()],
        clipnodes: vec![WideClipNode {
            planenum: 1,
            children: [-1, -2],
        }],
        edges: edges(),
        leaffaces: vec![0],
        surfedges: vec![0, 1, 2],
        ..GenericBsp::default()
    }
}

/// Quake II map in the generic layout, game-neutral
pub fn quake2_generic() -> GenericBsp {
    GenericBsp {
        models: vec![Model {
            mins: [-64.0, -64.0, -64.0],
            maxs: [64.0, 64.0, 64.0],
            firstface: 0,
            numfaces: 1,
            ..Model::default()
        }],
        visibility: Visibility {
            bit_offsets: vec![[12, 13]],
            bits: vec![0x01, 0x01, 0x00],
        },
        lightdata: (0..30).collect(),
        entities: EntityText::from_text(ENTITIES),
        leafs: vec![
            GenericLeaf {
                contents: 1,
                visofs: -1,
                cluster: -1,
                ..GenericLeaf::default()
            },
            GenericLeaf {
                contents: 0,
                visofs: -1,
                mins: [-64.0, -64.0, -64.0],
                maxs: [64.0, 64.0, 64.0],
                first_leafface: 0,
                num_leaffaces: 1,
                cluster: 0,
                area: 1,
                first_leafbrush: 0,
                num_leafbrushes: 1,
                ..GenericLeaf::default()
            },
        ],
        planes: planes(),
        vertexes: vertexes(),
        nodes: vec![node()],
        texinfo: vec![GenericTexInfo {
            vecs: texvec(),
            flags: SurfaceFlags::from_native(0),
            value: 0,
            texture: TextureName::new("e1u1/floor1_3"),
            next_texinfo: -1,
            ..GenericTexInfo::default()
        }],
        faces: vec![face()],
        edges: edges(),
        leaffaces: vec![0],
        leafbrushes: vec![0],
        surfedges: vec![0, 1, 2],
        areas: vec![
            Area::default(),
            Area {
                num_areaportals: 1,
                first_areaportal: 0,
            },
        ],
        areaportals: vec![AreaPortal {
            portal_num: 0,
            other_area: 1,
        }],
        brushes: vec![Brush {
            firstside: 0,
            numsides: 1,
            contents: 1,
        }],
        brushsides: vec![WideBrushSide {
            planenum: 1,
            texinfo: 0,
        }],
        pop: vec![0; 16],
        ..GenericBsp::default()
    }
}

/// Populated document in `version`, built from the matching family fixture
pub fn populated(version: &'static FormatDescriptor) -> BspDocument {
    populated_with_entities(version, EntityText::from_text(ENTITIES))
}

/// [`populated`] with the entity lump replaced by `entities`, stored as is
pub fn populated_with_entities(version: &'static FormatDescriptor, entities: EntityText) -> BspDocument {
    let mut generic = if version.layout.is_quake2() {
        quake2_generic()
    } else {
        quake_generic()
    };
    generic.entities = entities;
    let mut doc = BspDocument::with_native(&BSPVER_GENERIC, generic);
    convert_bsp_format(&mut doc, version).expect("Fixture should convert");
    doc
}
