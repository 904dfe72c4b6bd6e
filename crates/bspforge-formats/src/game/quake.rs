//! Content and surface rules shared by Quake, Hexen II and Half-Life
//!
//! Natives are small negative enumerators. Detail variants have no on-disk
//! encoding of their own; they are tracked in [`QuakeContentData`] and
//! collapse to their base contents on export.

use super::{ContentKind, GameDefinition, GameId};
use crate::contents::{ContentFlags, GameContentData, QuakeContentData, QuakeDetail};
use crate::surface::SurfaceFlags;

pub const CONTENTS_EMPTY: i32 = -1;
pub const CONTENTS_SOLID: i32 = -2;
pub const CONTENTS_WATER: i32 = -3;
pub const CONTENTS_SLIME: i32 = -4;
pub const CONTENTS_LAVA: i32 = -5;
pub const CONTENTS_SKY: i32 = -6;
/// Removed by the compiler before writing
pub const CONTENTS_ORIGIN: i32 = -7;
/// Removed by the compiler before writing, except for Half-Life
pub const CONTENTS_CLIP: i32 = -8;

// Half-Life extensions
pub const CONTENTS_CURRENT_0: i32 = -9;
pub const CONTENTS_CURRENT_90: i32 = -10;
pub const CONTENTS_CURRENT_180: i32 = -11;
pub const CONTENTS_CURRENT_270: i32 = -12;
pub const CONTENTS_CURRENT_UP: i32 = -13;
pub const CONTENTS_CURRENT_DOWN: i32 = -14;
pub const CONTENTS_TRANSLUCENT: i32 = -15;

/// Texture is not lightmapped (sky, liquids)
pub const TEX_SPECIAL: i32 = 1;
/// Texture was missing from the wad when the map was compiled
pub const TEX_MISSING: i32 = 2;

const fn is_half_life(game: &GameDefinition) -> bool {
    matches!(game.id, GameId::HalfLife)
}

fn detail(contents: &ContentFlags) -> Option<QuakeDetail> {
    match contents.game_data {
        GameContentData::Quake(data) => data.detail,
        GameContentData::None => None,
    }
}

const fn with_detail(detail: QuakeDetail) -> GameContentData {
    GameContentData::Quake(QuakeContentData {
        detail: Some(detail),
    })
}

const fn is_liquid_native(game: &GameDefinition, native: i32) -> bool {
    match native {
        CONTENTS_WATER | CONTENTS_SLIME | CONTENTS_LAVA => true,
        CONTENTS_CURRENT_DOWN..=CONTENTS_CURRENT_0 => is_half_life(game),
        _ => false,
    }
}

const fn is_known_native(game: &GameDefinition, native: i32) -> bool {
    match native {
        CONTENTS_SKY..=CONTENTS_EMPTY | CONTENTS_ORIGIN | CONTENTS_CLIP => true,
        CONTENTS_TRANSLUCENT..=CONTENTS_CURRENT_0 => is_half_life(game),
        _ => false,
    }
}

pub(super) fn create_detail_illusionary(game: &GameDefinition, original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    if !is_liquid_native(game, original.native) {
        result.native = CONTENTS_EMPTY;
    }
    result.game_data = with_detail(QuakeDetail::Illusionary);
    result
}

pub(super) fn create_detail_fence(original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    result.native = CONTENTS_SOLID;
    result.game_data = with_detail(QuakeDetail::Fence);
    result
}

pub(super) fn create_detail_solid(original: &ContentFlags) -> ContentFlags {
    let mut result = *original;
    result.native = CONTENTS_SOLID;
    result.game_data = with_detail(QuakeDetail::Solid);
    result
}

pub(super) fn is_any_detail(contents: &ContentFlags) -> bool {
    detail(contents).is_some()
}

pub(super) fn is_detail_solid(contents: &ContentFlags) -> bool {
    detail(contents) == Some(QuakeDetail::Solid)
}

pub(super) fn is_detail_fence(contents: &ContentFlags) -> bool {
    detail(contents) == Some(QuakeDetail::Fence)
}

pub(super) fn is_detail_illusionary(contents: &ContentFlags) -> bool {
    detail(contents) == Some(QuakeDetail::Illusionary)
}

pub(super) fn is_empty(contents: &ContentFlags) -> bool {
    contents.native == CONTENTS_EMPTY && detail(contents).is_none()
}

pub(super) fn is_solid(contents: &ContentFlags) -> bool {
    contents.native == CONTENTS_SOLID && detail(contents).is_none()
}

pub(super) fn is_any_solid(contents: &ContentFlags) -> bool {
    is_solid(contents) || is_detail_solid(contents)
}

pub(super) fn is_sky(contents: &ContentFlags) -> bool {
    contents.native == CONTENTS_SKY
}

pub(super) fn is_liquid(game: &GameDefinition, contents: &ContentFlags) -> bool {
    is_liquid_native(game, contents.native)
}

pub(super) fn is_clip(contents: &ContentFlags) -> bool {
    contents.native == CONTENTS_CLIP
}

pub(super) fn is_origin(contents: &ContentFlags) -> bool {
    contents.native == CONTENTS_ORIGIN
}

pub(super) fn is_valid(game: &GameDefinition, contents: &ContentFlags, strict: bool) -> bool {
    if contents.native == 0 && !strict {
        return true;
    }
    if !is_known_native(game, contents.native) {
        return false;
    }
    match detail(contents) {
        None => true,
        Some(QuakeDetail::Solid | QuakeDetail::Fence) => contents.native == CONTENTS_SOLID,
        Some(QuakeDetail::Illusionary) => {
            contents.native == CONTENTS_EMPTY || is_liquid_native(game, contents.native)
        }
    }
}

pub(super) fn make_valid(game: &GameDefinition, contents: &mut ContentFlags) {
    if !is_known_native(game, contents.native) {
        contents.native = CONTENTS_SOLID;
    }
    match detail(contents) {
        Some(QuakeDetail::Solid | QuakeDetail::Fence) => contents.native = CONTENTS_SOLID,
        Some(QuakeDetail::Illusionary) if !is_liquid_native(game, contents.native) => {
            contents.native = CONTENTS_EMPTY;
        }
        _ => {}
    }
    // Nothing can be seen from inside structural solid or sky
    if is_solid(contents) || is_sky(contents) {
        contents.mirror_inside = None;
    }
}

pub(super) fn is_mirrored(game: &GameDefinition, contents: &ContentFlags) -> bool {
    is_liquid(game, contents) || is_detail_illusionary(contents)
}

pub(super) fn clips_same_type(contents: &ContentFlags) -> bool {
    !is_detail_illusionary(contents)
}

pub(super) fn type_equal(a: &ContentFlags, b: &ContentFlags) -> bool {
    a.native == b.native && detail(a) == detail(b)
}

pub(super) fn priority(game: &GameDefinition, contents: &ContentFlags) -> i32 {
    match detail(contents) {
        Some(QuakeDetail::Solid) => return 5,
        Some(QuakeDetail::Fence) => return 4,
        Some(QuakeDetail::Illusionary) => return 2,
        None => {}
    }
    match contents.native {
        CONTENTS_SOLID => 7,
        CONTENTS_SKY => 6,
        CONTENTS_EMPTY => 1,
        CONTENTS_TRANSLUCENT if is_half_life(game) => 2,
        native if is_liquid_native(game, native) => 3,
        _ => 0,
    }
}

pub(super) fn chops(contents: &ContentFlags) -> bool {
    is_solid(contents) || is_detail_solid(contents) || is_sky(contents)
}

pub(super) fn seals_map(contents: &ContentFlags) -> bool {
    is_solid(contents) || is_sky(contents)
}

pub(super) fn remap_for_export(contents: &ContentFlags) -> ContentFlags {
    // Fence and detail solid already carry CONTENTS_SOLID, illusionary
    // carries empty or its liquid; dropping the payload is enough.
    ContentFlags::new(contents.native)
}

pub(super) fn combine(game: &GameDefinition, a: &ContentFlags, b: &ContentFlags) -> ContentFlags {
    if is_solid(a) {
        return *a;
    }
    if is_solid(b) {
        return *b;
    }
    if priority(game, b) > priority(game, a) { *b } else { *a }
}

pub(super) fn portal_can_see_through(
    game: &GameDefinition,
    c0: &ContentFlags,
    c1: &ContentFlags,
    transwater: bool,
    transsky: bool,
) -> bool {
    if c0.illusionary_visblocker != c1.illusionary_visblocker {
        return false;
    }
    if type_equal(c0, c1) {
        return !is_any_solid(c0);
    }
    let passes = |contents: &ContentFlags| {
        if is_any_solid(contents) {
            false
        } else if is_sky(contents) {
            transsky
        } else if is_liquid(game, contents) {
            transwater
        } else {
            true
        }
    };
    passes(c0) && passes(c1)
}

fn native_name(native: i32) -> Option<&'static str> {
    Some(match native {
        CONTENTS_EMPTY => "EMPTY",
        CONTENTS_SOLID => "SOLID",
        CONTENTS_WATER => "WATER",
        CONTENTS_SLIME => "SLIME",
        CONTENTS_LAVA => "LAVA",
        CONTENTS_SKY => "SKY",
        CONTENTS_ORIGIN => "ORIGIN",
        CONTENTS_CLIP => "CLIP",
        CONTENTS_CURRENT_0 => "CURRENT_0",
        CONTENTS_CURRENT_90 => "CURRENT_90",
        CONTENTS_CURRENT_180 => "CURRENT_180",
        CONTENTS_CURRENT_270 => "CURRENT_270",
        CONTENTS_CURRENT_UP => "CURRENT_UP",
        CONTENTS_CURRENT_DOWN => "CURRENT_DOWN",
        CONTENTS_TRANSLUCENT => "TRANSLUCENT",
        _ => return None,
    })
}

pub(super) fn native_to_string(native: i32) -> String {
    native_name(native).map_or_else(|| format!("UNKNOWN({native})"), str::to_string)
}

pub(super) fn to_string(contents: &ContentFlags) -> String {
    let base = native_to_string(contents.native);
    match detail(contents) {
        None => base,
        Some(QuakeDetail::Solid) => "DETAIL_SOLID".to_string(),
        Some(QuakeDetail::Fence) => "DETAIL_FENCE".to_string(),
        Some(QuakeDetail::Illusionary) => format!("DETAIL_ILLUSIONARY({base})"),
    }
}

pub(super) fn face_get_contents(texname: &str) -> ContentFlags {
    let name = texname.to_ascii_lowercase();
    let native = if name == "origin" {
        CONTENTS_ORIGIN
    } else if name == "clip" {
        CONTENTS_CLIP
    } else if name == "hint" || name == "hintskip" {
        CONTENTS_EMPTY
    } else if let Some(liquid) = name.strip_prefix('*') {
        if liquid.starts_with("lava") {
            CONTENTS_LAVA
        } else if liquid.starts_with("slime") {
            CONTENTS_SLIME
        } else {
            CONTENTS_WATER
        }
    } else if name.starts_with("sky") {
        CONTENTS_SKY
    } else {
        CONTENTS_SOLID
    };
    ContentFlags::new(native)
}

pub(super) fn kind(game: &GameDefinition, native: i32) -> Option<ContentKind> {
    Some(match native {
        CONTENTS_EMPTY => ContentKind::Empty,
        CONTENTS_SOLID => ContentKind::Solid,
        CONTENTS_WATER => ContentKind::Water,
        CONTENTS_SLIME => ContentKind::Slime,
        CONTENTS_LAVA => ContentKind::Lava,
        CONTENTS_SKY => ContentKind::Sky,
        CONTENTS_ORIGIN => ContentKind::Origin,
        CONTENTS_CLIP => ContentKind::Clip,
        CONTENTS_CURRENT_DOWN..=CONTENTS_CURRENT_0 if is_half_life(game) => ContentKind::Water,
        CONTENTS_TRANSLUCENT if is_half_life(game) => ContentKind::Window,
        _ => return None,
    })
}

pub(super) fn from_kind(game: &GameDefinition, kind: ContentKind) -> Option<i32> {
    match kind {
        ContentKind::Empty => Some(CONTENTS_EMPTY),
        ContentKind::Solid | ContentKind::Window => Some(CONTENTS_SOLID),
        ContentKind::Water => Some(CONTENTS_WATER),
        ContentKind::Slime => Some(CONTENTS_SLIME),
        ContentKind::Lava => Some(CONTENTS_LAVA),
        ContentKind::Sky => Some(CONTENTS_SKY),
        ContentKind::Clip if is_half_life(game) => Some(CONTENTS_CLIP),
        ContentKind::Clip | ContentKind::Origin | ContentKind::Mist => None,
    }
}

pub(super) fn surf_is_lightmapped(flags: &SurfaceFlags) -> bool {
    flags.native & TEX_SPECIAL == 0
}

pub(super) fn surfflags_are_valid(flags: &SurfaceFlags) -> bool {
    flags.native & !(TEX_SPECIAL | TEX_MISSING) == 0
}

pub(super) fn texinfo_is_hintskip(texname: &str) -> bool {
    // Only the hint face itself splits; the rest of a hint brush is skipped
    !texname.eq_ignore_ascii_case("hint")
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::game::{GAME_HALF_LIFE, GAME_HEXEN_II, GAME_QUAKE};

    #[test]
    fn test_detail_constructors_keep_overrides() {
        let game = &GAME_QUAKE;
        let mut water = ContentFlags::new(CONTENTS_WATER);
        water.set_mirrored(Some(false));

        let illusionary = game.create_detail_illusionary_contents(&water);
        assert_eq!(illusionary.native, CONTENTS_WATER);
        assert!(illusionary.is_detail_illusionary(game));
        assert_eq!(illusionary.mirror_inside, Some(false));

        let fence = game.create_detail_fence_contents(&water);
        assert_eq!(fence.native, CONTENTS_SOLID);
        assert!(fence.is_fence(game));
        assert!(!fence.is_solid(game));
        assert!(!fence.is_any_solid(game));

        let detail = game.create_detail_solid_contents(&game.create_empty_contents());
        assert!(detail.is_any_solid(game));
        assert!(!detail.is_solid(game));
        assert!(detail.is_any_detail(game));
    }

    #[test]
    fn test_priorities() {
        let game = &GAME_QUAKE;
        let solid = game.create_solid_contents();
        let sky = ContentFlags::new(CONTENTS_SKY);
        let detail = game.create_detail_solid_contents(&solid);
        let fence = game.create_detail_fence_contents(&solid);
        let lava = ContentFlags::new(CONTENTS_LAVA);
        let illusionary = game.create_detail_illusionary_contents(&solid);
        let empty = game.create_empty_contents();

        let order: Vec<i32> = [solid, sky, detail, fence, lava, illusionary, empty]
            .iter()
            .map(|c| c.priority(game))
            .collect();
        assert_eq!(order, vec![7, 6, 5, 4, 3, 2, 1]);
        assert_eq!(ContentFlags::new(CONTENTS_CLIP).priority(game), 0);
    }

    #[test]
    fn test_validity_and_repair() {
        let game = &GAME_QUAKE;
        assert!(ContentFlags::new(0).is_valid(game, false));
        assert!(!ContentFlags::new(0).is_valid(game, true));
        assert!(!ContentFlags::new(CONTENTS_CURRENT_0).is_valid(game, true));
        assert!(ContentFlags::new(CONTENTS_CURRENT_0).is_valid(&GAME_HALF_LIFE, true));

        let mut bogus = ContentFlags::new(-42);
        bogus.set_mirrored(Some(true));
        bogus.make_valid(game);
        assert!(bogus.is_valid(game, true));
        assert!(bogus.is_solid(game));
        assert_eq!(bogus.mirror_inside, None);

        // Repair is idempotent
        let repaired = bogus;
        bogus.make_valid(game);
        assert!(bogus.equals(game, &repaired));
    }

    #[test]
    fn test_half_life_currents_are_liquid() {
        let current = ContentFlags::new(CONTENTS_CURRENT_UP);
        assert!(current.is_liquid(&GAME_HALF_LIFE));
        assert!(!current.is_liquid(&GAME_QUAKE));
        assert_eq!(current.priority(&GAME_HALF_LIFE), 3);
    }

    #[test]
    fn test_remap_for_export_strips_detail() {
        let game = &GAME_HEXEN_II;
        let fence = game.create_detail_fence_contents(&game.create_empty_contents());
        let exported = game.contents_remap_for_export(&fence);
        assert!(exported.is_solid(game));

        let mut slime = ContentFlags::new(CONTENTS_SLIME);
        slime.set_clips_same_type(Some(false));
        let illusionary = game.create_detail_illusionary_contents(&slime);
        let exported = game.contents_remap_for_export(&illusionary);
        assert_eq!(exported.native, CONTENTS_SLIME);
        assert_eq!(exported.clips_same_type, None);
        assert!(!exported.is_any_detail(game));
    }

    #[test]
    fn test_portal_visibility() {
        let game = &GAME_QUAKE;
        let empty = game.create_empty_contents();
        let water = ContentFlags::new(CONTENTS_WATER);
        let sky = ContentFlags::new(CONTENTS_SKY);
        let solid = game.create_solid_contents();

        assert!(game.portal_can_see_through(&empty, &empty, false, false));
        assert!(game.portal_can_see_through(&water, &water, false, false));
        assert!(!game.portal_can_see_through(&empty, &water, false, false));
        assert!(game.portal_can_see_through(&empty, &water, true, false));
        assert!(!game.portal_can_see_through(&empty, &sky, true, false));
        assert!(game.portal_can_see_through(&empty, &sky, false, true));
        assert!(!game.portal_can_see_through(&solid, &solid, true, true));

        let illusionary = game.create_detail_illusionary_contents(&empty);
        assert!(game.portal_can_see_through(&empty, &illusionary, false, false));
        let mut blocker = illusionary;
        blocker.set_illusionary_visblocker(true);
        assert!(!game.portal_can_see_through(&illusionary, &blocker, false, false));
    }

    #[test]
    fn test_face_contents_from_texture_name() {
        let game = &GAME_QUAKE;
        let flags = SurfaceFlags::default();
        let empty = game.create_empty_contents();
        let lookup = |name: &str| game.face_get_contents(name, &flags, &empty).native;
        assert_eq!(lookup("*lava1"), CONTENTS_LAVA);
        assert_eq!(lookup("*SLIME0"), CONTENTS_SLIME);
        assert_eq!(lookup("*04water1"), CONTENTS_WATER);
        assert_eq!(lookup("sky4"), CONTENTS_SKY);
        assert_eq!(lookup("clip"), CONTENTS_CLIP);
        assert_eq!(lookup("origin"), CONTENTS_ORIGIN);
        assert_eq!(lookup("hint"), CONTENTS_EMPTY);
        assert_eq!(lookup("city4_2"), CONTENTS_SOLID);
    }

    #[test]
    fn test_surface_rules() {
        let game = &GAME_QUAKE;
        let special = SurfaceFlags::from_native(TEX_SPECIAL);
        assert!(!game.surf_is_lightmapped(&special));
        assert!(!game.surf_is_subdivided(&special));
        assert!(game.surf_is_lightmapped(&SurfaceFlags::default()));
        assert!(special.is_valid(game));
        assert!(!SurfaceFlags::from_native(4).is_valid(game));
        assert!(!game.texinfo_is_hintskip(&SurfaceFlags::default(), "HINT"));
        assert!(game.texinfo_is_hintskip(&SurfaceFlags::default(), "skip"));
    }
}
