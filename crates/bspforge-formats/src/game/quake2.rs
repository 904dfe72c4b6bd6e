//! Content and surface rules for Quake II
//!
//! Contents are a bitfield. The low seven "visible" bits select the volume
//! type and at most one of them may be set; everything else is an attribute.

use super::ContentKind;
use crate::contents::ContentFlags;
use crate::surface::SurfaceFlags;

pub const CONTENTS_EMPTY: i32 = 0;
pub const CONTENTS_SOLID: i32 = 1;
pub const CONTENTS_WINDOW: i32 = 2;
pub const CONTENTS_AUX: i32 = 4;
pub const CONTENTS_LAVA: i32 = 8;
pub const CONTENTS_SLIME: i32 = 16;
pub const CONTENTS_WATER: i32 = 32;
pub const CONTENTS_MIST: i32 = 64;
pub const LAST_VISIBLE_CONTENTS: i32 = 64;
pub const ALL_VISIBLE_CONTENTS: i32 = CONTENTS_SOLID
    | CONTENTS_WINDOW
    | CONTENTS_AUX
    | CONTENTS_LAVA
    | CONTENTS_SLIME
    | CONTENTS_WATER
    | CONTENTS_MIST;

pub const CONTENTS_AREAPORTAL: i32 = 0x8000;
pub const CONTENTS_PLAYERCLIP: i32 = 0x10000;
pub const CONTENTS_MONSTERCLIP: i32 = 0x20000;
pub const CONTENTS_CURRENT_0: i32 = 0x40000;
pub const CONTENTS_CURRENT_90: i32 = 0x80000;
pub const CONTENTS_CURRENT_180: i32 = 0x100000;
pub const CONTENTS_CURRENT_270: i32 = 0x200000;
pub const CONTENTS_CURRENT_UP: i32 = 0x400000;
pub const CONTENTS_CURRENT_DOWN: i32 = 0x800000;
/// Removed by the compiler before writing
pub const CONTENTS_ORIGIN: i32 = 0x1000000;
pub const CONTENTS_MONSTER: i32 = 0x2000000;
pub const CONTENTS_DEADMONSTER: i32 = 0x4000000;
/// Brushes to be added after vis leafs
pub const CONTENTS_DETAIL: i32 = 0x8000000;
/// Auto set if any surface has trans
pub const CONTENTS_TRANSLUCENT: i32 = 0x10000000;
pub const CONTENTS_LADDER: i32 = 0x20000000;

/// Bits that decide the volume type. The rest are attributes that are
/// unioned when leaves are clustered.
pub const TYPE_CONTENTS: i32 = ALL_VISIBLE_CONTENTS
    | CONTENTS_PLAYERCLIP
    | CONTENTS_MONSTERCLIP
    | CONTENTS_ORIGIN
    | CONTENTS_DETAIL;

const LIQUID_CONTENTS: i32 = CONTENTS_LAVA | CONTENTS_SLIME | CONTENTS_WATER;
const CLIP_CONTENTS: i32 = CONTENTS_PLAYERCLIP | CONTENTS_MONSTERCLIP;

/// Value will hold the light strength
pub const SURF_LIGHT: i32 = 0x1;
/// Effects game physics
pub const SURF_SLICK: i32 = 0x2;
/// Don't draw, but add to skybox
pub const SURF_SKY: i32 = 0x4;
/// Turbulent water warp
pub const SURF_WARP: i32 = 0x8;
pub const SURF_TRANS33: i32 = 0x10;
pub const SURF_TRANS66: i32 = 0x20;
/// Scroll towards angle
pub const SURF_FLOWING: i32 = 0x40;
/// Don't bother referencing the texture
pub const SURF_NODRAW: i32 = 0x80;
/// Make a primary BSP splitter
pub const SURF_HINT: i32 = 0x100;
/// Completely ignore, allowing non-closed brushes
pub const SURF_SKIP: i32 = 0x200;

const CONTENT_NAMES: [(i32, &str); 24] = [
    (CONTENTS_SOLID, "SOLID"),
    (CONTENTS_WINDOW, "WINDOW"),
    (CONTENTS_AUX, "AUX"),
    (CONTENTS_LAVA, "LAVA"),
    (CONTENTS_SLIME, "SLIME"),
    (CONTENTS_WATER, "WATER"),
    (CONTENTS_MIST, "MIST"),
    (0x80, "UNUSED_7"),
    (CONTENTS_AREAPORTAL, "AREAPORTAL"),
    (CONTENTS_PLAYERCLIP, "PLAYERCLIP"),
    (CONTENTS_MONSTERCLIP, "MONSTERCLIP"),
    (CONTENTS_CURRENT_0, "CURRENT_0"),
    (CONTENTS_CURRENT_90, "CURRENT_90"),
    (CONTENTS_CURRENT_180, "CURRENT_180"),
    (CONTENTS_CURRENT_270, "CURRENT_270"),
    (CONTENTS_CURRENT_UP, "CURRENT_UP"),
    (CONTENTS_CURRENT_DOWN, "CURRENT_DOWN"),
    (CONTENTS_ORIGIN, "ORIGIN"),
    (CONTENTS_MONSTER, "MONSTER"),
    (CONTENTS_DEADMONSTER, "DEADMONSTER"),
    (CONTENTS_DETAIL, "DETAIL"),
    (CONTENTS_TRANSLUCENT, "TRANSLUCENT"),
    (CONTENTS_LADDER, "LADDER"),
    (i32::MIN, "UNUSED_31"),
];

/// Names for every content bit, lowest first
pub const fn content_bit_names() -> &'static [(i32, &'static str)] {
    &CONTENT_NAMES
}

const fn visible(native: i32) -> i32 {
    native & ALL_VISIBLE_CONTENTS
}

const fn has(native: i32, bits: i32) -> bool {
    native & bits != 0
}

pub(super) fn create_detail_illusionary(original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    result.native = (original.native & !ALL_VISIBLE_CONTENTS) | CONTENTS_MIST | CONTENTS_DETAIL;
    result
}

pub(super) fn create_detail_fence(original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    result.native = (original.native & !ALL_VISIBLE_CONTENTS)
        | CONTENTS_WINDOW
        | CONTENTS_TRANSLUCENT
        | CONTENTS_DETAIL;
    result
}

pub(super) fn create_detail_solid(original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    result.native = (original.native & !ALL_VISIBLE_CONTENTS) | CONTENTS_SOLID | CONTENTS_DETAIL;
    result
}

pub(super) fn is_any_detail(contents: &ContentFlags) -> bool {
    has(contents.native, CONTENTS_DETAIL)
}

pub(super) fn is_detail_solid(contents: &ContentFlags) -> bool {
    is_any_detail(contents) && has(contents.native, CONTENTS_SOLID)
}

pub(super) fn is_detail_fence(contents: &ContentFlags) -> bool {
    is_any_detail(contents) && has(contents.native, CONTENTS_WINDOW)
}

pub(super) fn is_detail_illusionary(contents: &ContentFlags) -> bool {
    is_any_detail(contents) && has(contents.native, CONTENTS_MIST)
}

pub(super) fn is_empty(contents: &ContentFlags) -> bool {
    !has(contents.native, ALL_VISIBLE_CONTENTS | CLIP_CONTENTS | CONTENTS_ORIGIN)
}

pub(super) fn is_solid(contents: &ContentFlags) -> bool {
    has(contents.native, CONTENTS_SOLID) && !is_any_detail(contents)
}

pub(super) fn is_any_solid(contents: &ContentFlags) -> bool {
    has(contents.native, CONTENTS_SOLID)
}

pub(super) fn is_liquid(contents: &ContentFlags) -> bool {
    has(contents.native, LIQUID_CONTENTS)
}

pub(super) fn is_clip(contents: &ContentFlags) -> bool {
    has(contents.native, CLIP_CONTENTS)
}

pub(super) fn is_origin(contents: &ContentFlags) -> bool {
    has(contents.native, CONTENTS_ORIGIN)
}

pub(super) fn is_valid(contents: &ContentFlags, strict: bool) -> bool {
    let bits = visible(contents.native);
    if bits & (bits - 1) != 0 {
        return false;
    }
    !(strict && is_any_detail(contents) && bits == 0)
}

pub(super) fn make_valid(contents: &mut ContentFlags) {
    let bits = visible(contents.native);
    if bits & (bits - 1) != 0 {
        // Keep only the strongest (lowest) visible bit
        let lowest = bits & bits.wrapping_neg();
        contents.native = (contents.native & !ALL_VISIBLE_CONTENTS) | lowest;
    }
    if visible(contents.native) == 0 {
        contents.native &= !CONTENTS_DETAIL;
    }
    if is_solid(contents) {
        contents.mirror_inside = None;
    }
}

pub(super) fn is_mirrored(contents: &ContentFlags) -> bool {
    is_liquid(contents) || has(contents.native, CONTENTS_MIST)
}

pub(super) fn clips_same_type(contents: &ContentFlags) -> bool {
    !has(contents.native, CONTENTS_MIST)
}

pub(super) fn type_equal(a: &ContentFlags, b: &ContentFlags) -> bool {
    a.native & TYPE_CONTENTS == b.native & TYPE_CONTENTS
}

pub(super) fn priority(contents: &ContentFlags) -> i32 {
    let native = contents.native;
    let detail = is_any_detail(contents);
    if has(native, CONTENTS_SOLID) {
        if detail { 9 } else { 10 }
    } else if has(native, CONTENTS_WINDOW) {
        8
    } else if has(native, CONTENTS_AUX) {
        5
    } else if has(native, CONTENTS_LAVA) {
        4
    } else if has(native, CONTENTS_SLIME) {
        3
    } else if has(native, CONTENTS_WATER) {
        2
    } else if has(native, CONTENTS_MIST) {
        1
    } else {
        0
    }
}

pub(super) fn chops(contents: &ContentFlags) -> bool {
    has(contents.native, CONTENTS_SOLID)
}

pub(super) fn seals_map(contents: &ContentFlags) -> bool {
    is_solid(contents)
}

pub(super) fn remap_for_export(contents: &ContentFlags) -> ContentFlags {
    ContentFlags::new(contents.native & !CONTENTS_ORIGIN)
}

/// Merge the attribute bits of both operands into the winner's type bits
pub(super) fn merge_attributes(winner: i32, a: i32, b: i32) -> i32 {
    (winner & TYPE_CONTENTS) | ((a | b) & !TYPE_CONTENTS)
}

pub(super) fn combine(a: &ContentFlags, b: &ContentFlags) -> ContentFlags {
    let mut result = *a;
    result.native = a.native | b.native;
    // Structural solid on either side wins over detail
    if is_solid(a) || is_solid(b) {
        result.native &= !CONTENTS_DETAIL;
    }
    result
}

pub(super) fn portal_can_see_through(
    c0: &ContentFlags,
    c1: &ContentFlags,
    transwater: bool,
) -> bool {
    if has(c0.native | c1.native, CONTENTS_SOLID) {
        return false;
    }
    if c0.illusionary_visblocker != c1.illusionary_visblocker {
        return false;
    }
    let see = |contents: &ContentFlags| {
        if has(contents.native, CONTENTS_TRANSLUCENT) {
            return 0;
        }
        let mut bits = visible(contents.native) & !CONTENTS_MIST;
        if transwater {
            bits &= !LIQUID_CONTENTS;
        }
        bits
    };
    see(c0) == see(c1)
}

pub(super) fn to_string(native: i32) -> String {
    if native == CONTENTS_EMPTY {
        return "EMPTY".to_string();
    }
    let names: Vec<&str> = CONTENT_NAMES
        .iter()
        .filter(|(bit, _)| native & bit != 0)
        .map(|(_, name)| *name)
        .collect();
    if names.is_empty() {
        format!("UNKNOWN({native:#x})")
    } else {
        names.join(" | ")
    }
}

pub(super) fn face_get_contents(contents: &ContentFlags) -> ContentFlags {
    let mut result = *contents;
    // Brushes without a visible type are solid
    if visible(result.native) == 0 && !has(result.native, CLIP_CONTENTS | CONTENTS_ORIGIN) {
        result.native |= CONTENTS_SOLID;
    }
    result
}

pub(super) fn kind(native: i32) -> ContentKind {
    if has(native, CONTENTS_ORIGIN) {
        return ContentKind::Origin;
    }
    match visible(native) & visible(native).wrapping_neg() {
        CONTENTS_SOLID | CONTENTS_AUX => ContentKind::Solid,
        CONTENTS_WINDOW => ContentKind::Window,
        CONTENTS_LAVA => ContentKind::Lava,
        CONTENTS_SLIME => ContentKind::Slime,
        CONTENTS_WATER => ContentKind::Water,
        CONTENTS_MIST => ContentKind::Mist,
        _ if has(native, CLIP_CONTENTS) => ContentKind::Clip,
        _ => ContentKind::Empty,
    }
}

pub(super) const fn from_kind(kind: ContentKind) -> i32 {
    match kind {
        ContentKind::Empty => CONTENTS_EMPTY,
        // Quake II sky lives on surfaces; the volume is solid
        ContentKind::Solid | ContentKind::Sky => CONTENTS_SOLID,
        ContentKind::Window => CONTENTS_WINDOW,
        ContentKind::Water => CONTENTS_WATER,
        ContentKind::Slime => CONTENTS_SLIME,
        ContentKind::Lava => CONTENTS_LAVA,
        ContentKind::Mist => CONTENTS_MIST,
        ContentKind::Clip => CLIP_CONTENTS,
        ContentKind::Origin => CONTENTS_ORIGIN,
    }
}

pub(super) fn surf_is_lightmapped(flags: &SurfaceFlags) -> bool {
    !has(flags.native, SURF_SKY | SURF_WARP | SURF_NODRAW)
}

pub(super) fn surf_is_subdivided(flags: &SurfaceFlags) -> bool {
    !has(flags.native, SURF_SKY)
}

pub(super) fn surfflags_are_valid(flags: &SurfaceFlags) -> bool {
    // NODRAW doesn't make sense on surfaces the engine renders specially
    !(has(flags.native, SURF_NODRAW)
        && has(flags.native, SURF_SKY | SURF_WARP | SURF_TRANS33 | SURF_TRANS66 | SURF_FLOWING))
}

pub(super) fn texinfo_is_hintskip(flags: &SurfaceFlags) -> bool {
    !has(flags.native, SURF_HINT)
}

pub(super) fn surface_flags_from_native(native: i32) -> SurfaceFlags {
    SurfaceFlags {
        is_skip: has(native, SURF_SKIP),
        is_hint: has(native, SURF_HINT),
        ..SurfaceFlags::from_native(native)
    }
}
