//! Game definitions
//!
//! A [`GameDefinition`] is the single authority that turns native content and
//! surface bits into meaning. The set of games is closed, so behaviour is a
//! `match` over the game's rule family rather than a trait object: Quake,
//! Hexen II and Half-Life share [`quake`] rules (with Half-Life extras keyed
//! off the id), Quake II has its own bitfield rules in [`quake2`].
//!
//! Definitions are immutable statics and can be shared across threads
//! freely. A process picks its game once with [`select_game`].

pub mod palette;
pub mod quake;
pub mod quake2;
mod stats;

pub use stats::{ContentStats, Quake2ContentStats, QuakeContentStats};

use crate::contents::ContentFlags;
use crate::error::{BspError, Result};
use crate::surface::SurfaceFlags;
use std::cmp::Ordering;
use std::fmt;
use std::sync::OnceLock;
use tracing::{info, warn};

/// Supported target games
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum GameId {
    #[default]
    Unknown,
    Quake,
    HexenII,
    HalfLife,
    QuakeII,
}

impl GameId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::Quake => "Quake",
            Self::HexenII => "Hexen II",
            Self::HalfLife => "Half-Life",
            Self::QuakeII => "Quake II",
        }
    }

    /// Parse the short names accepted on command lines
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "quake" | "q1" => Some(Self::Quake),
            "hexen2" | "h2" => Some(Self::HexenII),
            "halflife" | "hl" => Some(Self::HalfLife),
            "quake2" | "q2" => Some(Self::QuakeII),
            _ => None,
        }
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Bounding box of a clipping hull
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullSize {
    pub mins: [f64; 3],
    pub maxs: [f64; 3],
}

impl HullSize {
    pub const fn new(mins: [f64; 3], maxs: [f64; 3]) -> Self {
        Self { mins, maxs }
    }
}

/// Portable classification used to carry contents between games
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    Empty,
    Solid,
    Sky,
    Water,
    Slime,
    Lava,
    Window,
    Mist,
    Clip,
    Origin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rules {
    Quake,
    QuakeII,
}

/// Per-game capability table
#[derive(Debug)]
pub struct GameDefinition {
    pub id: GameId,
    /// Lightmaps are stored as RGB rather than greyscale
    pub has_rgb_lightmap: bool,
    /// Brush models may carry non-solid contents
    pub allow_contented_bmodels: bool,
    /// Game data directory searched by default
    pub default_base_dir: &'static str,
    /// Longest entity key the engine accepts
    pub max_entity_key: usize,
    /// Longest entity value the engine accepts
    pub max_entity_value: usize,
    hulls: &'static [HullSize],
    palette: &'static [[u8; 3]],
}

const POINT_HULL: HullSize = HullSize::new([0.0; 3], [0.0; 3]);

static QUAKE_HULLS: [HullSize; 3] = [
    POINT_HULL,
    HullSize::new([-16.0, -16.0, -32.0], [16.0, 16.0, 24.0]),
    HullSize::new([-32.0, -32.0, -24.0], [32.0, 32.0, 64.0]),
];

static HEXEN_II_HULLS: [HullSize; 6] = [
    POINT_HULL,
    HullSize::new([-16.0, -16.0, -24.0], [16.0, 16.0, 32.0]),
    HullSize::new([-24.0, -24.0, -20.0], [24.0, 24.0, 20.0]),
    HullSize::new([-16.0, -16.0, -16.0], [16.0, 16.0, 12.0]),
    HullSize::new([-8.0, -8.0, -8.0], [8.0, 8.0, 8.0]),
    HullSize::new([-28.0, -28.0, -40.0], [28.0, 28.0, 40.0]),
];

static HALF_LIFE_HULLS: [HullSize; 4] = [
    POINT_HULL,
    HullSize::new([-16.0, -16.0, -36.0], [16.0, 16.0, 36.0]),
    HullSize::new([-32.0, -32.0, -32.0], [32.0, 32.0, 32.0]),
    HullSize::new([-16.0, -16.0, -18.0], [16.0, 16.0, 18.0]),
];

// Quake II collides against brushes, only the point hull exists
static QUAKE_II_HULLS: [HullSize; 1] = [POINT_HULL];

pub static GAME_QUAKE: GameDefinition = GameDefinition {
    id: GameId::Quake,
    has_rgb_lightmap: false,
    allow_contented_bmodels: false,
    default_base_dir: "ID1",
    max_entity_key: 32,
    max_entity_value: 128,
    hulls: &QUAKE_HULLS,
    palette: &palette::QUAKE_PALETTE,
};

pub static GAME_HEXEN_II: GameDefinition = GameDefinition {
    id: GameId::HexenII,
    has_rgb_lightmap: false,
    allow_contented_bmodels: false,
    default_base_dir: "DATA1",
    max_entity_key: 32,
    max_entity_value: 128,
    hulls: &HEXEN_II_HULLS,
    palette: &palette::QUAKE_PALETTE,
};

pub static GAME_HALF_LIFE: GameDefinition = GameDefinition {
    id: GameId::HalfLife,
    has_rgb_lightmap: true,
    allow_contented_bmodels: false,
    default_base_dir: "VALVE",
    max_entity_key: 32,
    max_entity_value: 128,
    hulls: &HALF_LIFE_HULLS,
    // Textures carry their own palettes
    palette: &[],
};

pub static GAME_QUAKE_II: GameDefinition = GameDefinition {
    id: GameId::QuakeII,
    has_rgb_lightmap: true,
    allow_contented_bmodels: true,
    default_base_dir: "BASEQ2",
    max_entity_key: 32,
    max_entity_value: 1024,
    hulls: &QUAKE_II_HULLS,
    palette: &[],
};

static ACTIVE_GAME: OnceLock<&'static GameDefinition> = OnceLock::new();

/// Choose the process-wide game. Selecting the same game again is a no-op;
/// switching to another one fails.
pub fn select_game(id: GameId) -> Result<&'static GameDefinition> {
    let requested = GameDefinition::for_id(id).ok_or_else(|| BspError::GameUnsupported {
        game: id.name().to_string(),
    })?;
    let active = *ACTIVE_GAME.get_or_init(|| {
        info!("Selected game {}", requested.name());
        requested
    });
    if active.id == id {
        Ok(active)
    } else {
        Err(BspError::GameAlreadySelected {
            current: active.name().to_string(),
            requested: id.name().to_string(),
        })
    }
}

/// The game chosen by [`select_game`], if any
pub fn active_game() -> Option<&'static GameDefinition> {
    ACTIVE_GAME.get().copied()
}

impl GameDefinition {
    /// Definition for a game id; `Unknown` has none
    pub fn for_id(id: GameId) -> Option<&'static Self> {
        match id {
            GameId::Unknown => None,
            GameId::Quake => Some(&GAME_QUAKE),
            GameId::HexenII => Some(&GAME_HEXEN_II),
            GameId::HalfLife => Some(&GAME_HALF_LIFE),
            GameId::QuakeII => Some(&GAME_QUAKE_II),
        }
    }

    /// Every supported game
    pub fn all() -> [&'static Self; 4] {
        [&GAME_QUAKE, &GAME_HEXEN_II, &GAME_HALF_LIFE, &GAME_QUAKE_II]
    }

    pub const fn name(&self) -> &'static str {
        self.id.name()
    }

    const fn rules(&self) -> Rules {
        match self.id {
            GameId::QuakeII => Rules::QuakeII,
            GameId::Unknown | GameId::Quake | GameId::HexenII | GameId::HalfLife => Rules::Quake,
        }
    }

    /// Whether both games share native content and surface encodings
    pub fn shares_encoding_with(&self, other: &Self) -> bool {
        self.rules() == other.rules() && (self.id == GameId::HalfLife) == (other.id == GameId::HalfLife)
    }

    // Surfaces

    pub fn surf_is_lightmapped(&self, flags: &SurfaceFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::surf_is_lightmapped(flags),
            Rules::QuakeII => quake2::surf_is_lightmapped(flags),
        }
    }

    pub fn surf_is_subdivided(&self, flags: &SurfaceFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::surf_is_lightmapped(flags),
            Rules::QuakeII => quake2::surf_is_subdivided(flags),
        }
    }

    pub fn surfflags_are_valid(&self, flags: &SurfaceFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::surfflags_are_valid(flags),
            Rules::QuakeII => quake2::surfflags_are_valid(flags),
        }
    }

    /// Whether a face of a hint brush is skipped rather than used as a splitter
    pub fn texinfo_is_hintskip(&self, flags: &SurfaceFlags, texname: &str) -> bool {
        match self.rules() {
            Rules::Quake => quake::texinfo_is_hintskip(texname),
            Rules::QuakeII => quake2::texinfo_is_hintskip(flags),
        }
    }

    /// Decode a native texinfo flags value
    pub fn surface_flags_from_native(&self, native: i32) -> SurfaceFlags {
        match self.rules() {
            Rules::Quake => SurfaceFlags::from_native(native),
            Rules::QuakeII => quake2::surface_flags_from_native(native),
        }
    }

    // Content construction

    pub fn create_empty_contents(&self) -> ContentFlags {
        match self.rules() {
            Rules::Quake => ContentFlags::new(quake::CONTENTS_EMPTY),
            Rules::QuakeII => ContentFlags::new(quake2::CONTENTS_EMPTY),
        }
    }

    pub fn create_solid_contents(&self) -> ContentFlags {
        match self.rules() {
            Rules::Quake => ContentFlags::new(quake::CONTENTS_SOLID),
            Rules::QuakeII => ContentFlags::new(quake2::CONTENTS_SOLID),
        }
    }

    /// Promote `original` to illusionary detail, keeping its payload and overrides
    pub fn create_detail_illusionary_contents(&self, original: &ContentFlags) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::create_detail_illusionary(self, original),
            Rules::QuakeII => quake2::create_detail_illusionary(original),
        }
    }

    /// Promote `original` to a detail fence, keeping its payload and overrides
    pub fn create_detail_fence_contents(&self, original: &ContentFlags) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::create_detail_fence(original),
            Rules::QuakeII => quake2::create_detail_fence(original),
        }
    }

    /// Promote `original` to detail solid, keeping its payload and overrides
    pub fn create_detail_solid_contents(&self, original: &ContentFlags) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::create_detail_solid(original),
            Rules::QuakeII => quake2::create_detail_solid(original),
        }
    }

    // Content classification

    /// Same volume type, overrides ignored
    pub fn contents_are_type_equal(&self, a: &ContentFlags, b: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::type_equal(a, b),
            Rules::QuakeII => quake2::type_equal(a, b),
        }
    }

    /// Identical in every field, overrides included
    pub fn contents_are_equal(&self, a: &ContentFlags, b: &ContentFlags) -> bool {
        a.ordering_key() == b.ordering_key()
    }

    pub fn contents_are_any_detail(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_any_detail(contents),
            Rules::QuakeII => quake2::is_any_detail(contents),
        }
    }

    pub fn contents_are_detail_solid(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_detail_solid(contents),
            Rules::QuakeII => quake2::is_detail_solid(contents),
        }
    }

    pub fn contents_are_detail_fence(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_detail_fence(contents),
            Rules::QuakeII => quake2::is_detail_fence(contents),
        }
    }

    pub fn contents_are_detail_illusionary(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_detail_illusionary(contents),
            Rules::QuakeII => quake2::is_detail_illusionary(contents),
        }
    }

    /// Default mirroring policy, ignoring the per-brush override
    pub fn contents_are_mirrored(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_mirrored(self, contents),
            Rules::QuakeII => quake2::is_mirrored(contents),
        }
    }

    /// Default same-type clipping policy, ignoring the per-brush override
    pub fn contents_clip_same_type(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::clips_same_type(contents),
            Rules::QuakeII => quake2::clips_same_type(contents),
        }
    }

    pub fn contents_are_empty(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_empty(contents),
            Rules::QuakeII => quake2::is_empty(contents),
        }
    }

    pub fn contents_are_any_solid(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_any_solid(contents),
            Rules::QuakeII => quake2::is_any_solid(contents),
        }
    }

    pub fn contents_are_solid(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_solid(contents),
            Rules::QuakeII => quake2::is_solid(contents),
        }
    }

    /// Quake II sky is a surface property, so this is always false there
    pub fn contents_are_sky(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_sky(contents),
            Rules::QuakeII => false,
        }
    }

    pub fn contents_are_liquid(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_liquid(self, contents),
            Rules::QuakeII => quake2::is_liquid(contents),
        }
    }

    pub fn contents_are_clip(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_clip(contents),
            Rules::QuakeII => quake2::is_clip(contents),
        }
    }

    pub fn contents_are_origin(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_origin(contents),
            Rules::QuakeII => quake2::is_origin(contents),
        }
    }

    pub fn contents_are_valid(&self, contents: &ContentFlags, strict: bool) -> bool {
        match self.rules() {
            Rules::Quake => quake::is_valid(self, contents, strict),
            Rules::QuakeII => quake2::is_valid(contents, strict),
        }
    }

    /// Repair contents in place. Idempotent.
    pub fn contents_make_valid(&self, contents: &mut ContentFlags) {
        match self.rules() {
            Rules::Quake => quake::make_valid(self, contents),
            Rules::QuakeII => quake2::make_valid(contents),
        }
    }

    /// Repair `contents`, logging what changed. The repaired value is kept
    /// even when it is still invalid, so callers can carry on with it.
    pub fn validate_contents(&self, contents: &mut ContentFlags) -> Result<()> {
        if self.contents_are_valid(contents, true) {
            return Ok(());
        }
        let before = contents.to_string(self);
        self.contents_make_valid(contents);
        warn!("Repaired invalid contents {before} to {}", contents.to_string(self));
        if self.contents_are_valid(contents, true) {
            Ok(())
        } else {
            Err(BspError::ContentInvalid {
                description: contents.to_string(self),
            })
        }
    }

    pub fn contents_priority(&self, contents: &ContentFlags) -> i32 {
        match self.rules() {
            Rules::Quake => quake::priority(self, contents),
            Rules::QuakeII => quake2::priority(contents),
        }
    }

    /// Whether faces of these contents split faces of other contents
    pub fn chops(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::chops(contents),
            Rules::QuakeII => quake2::chops(contents),
        }
    }

    /// Whether brush `a` chops brush `b`. On equal priority the first operand
    /// chops the second.
    pub fn should_chop(&self, a: &ContentFlags, b: &ContentFlags) -> bool {
        self.chops(a) && self.contents_priority(a) >= self.contents_priority(b)
    }

    /// Merge the contents of two leaves being clustered together.
    ///
    /// Equal contents return `a`. Otherwise the higher-priority operand's
    /// classification and payload win; on a priority tie the operand with the
    /// greater field-wise ordering wins, so the result never depends on
    /// argument order. Quake II also keeps the attribute bits of both.
    pub fn cluster_contents(&self, a: &ContentFlags, b: &ContentFlags) -> ContentFlags {
        if self.contents_are_equal(a, b) {
            return *a;
        }
        let winner = match self.contents_priority(a).cmp(&self.contents_priority(b)) {
            Ordering::Greater => a,
            Ordering::Less => b,
            Ordering::Equal => {
                if a.ordering_key() >= b.ordering_key() {
                    a
                } else {
                    b
                }
            }
        };
        let mut result = *winner;
        if self.rules() == Rules::QuakeII {
            result.native = quake2::merge_attributes(winner.native, a.native, b.native);
        }
        result
    }

    /// Whether vis can flow through a portal between `c0` and `c1`.
    /// `transwater`/`transsky` make liquid and sky volumes see-through.
    pub fn portal_can_see_through(
        &self,
        c0: &ContentFlags,
        c1: &ContentFlags,
        transwater: bool,
        transsky: bool,
    ) -> bool {
        match self.rules() {
            Rules::Quake => quake::portal_can_see_through(self, c0, c1, transwater, transsky),
            Rules::QuakeII => quake2::portal_can_see_through(c0, c1, transwater),
        }
    }

    /// Whether these contents stop a leak from reaching the void
    pub fn contents_seals_map(&self, contents: &ContentFlags) -> bool {
        match self.rules() {
            Rules::Quake => quake::seals_map(contents),
            Rules::QuakeII => quake2::seals_map(contents),
        }
    }

    /// Reduce contents to what the file format can store
    pub fn contents_remap_for_export(&self, contents: &ContentFlags) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::remap_for_export(contents),
            Rules::QuakeII => quake2::remap_for_export(contents),
        }
    }

    /// Merge the contents of two overlapping brushes
    pub fn combine_contents(&self, a: &ContentFlags, b: &ContentFlags) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::combine(self, a, b),
            Rules::QuakeII => quake2::combine(a, b),
        }
    }

    /// Description of the type and payload, without overrides
    pub fn contents_to_string(&self, contents: &ContentFlags) -> String {
        match self.rules() {
            Rules::Quake => quake::to_string(contents),
            Rules::QuakeII => quake2::to_string(contents.native),
        }
    }

    /// Contents a brush side implies. Quake-family games infer them from the
    /// texture name; Quake II brushes carry their own contents.
    pub fn face_get_contents(
        &self,
        texname: &str,
        _flags: &SurfaceFlags,
        contents: &ContentFlags,
    ) -> ContentFlags {
        match self.rules() {
            Rules::Quake => quake::face_get_contents(texname),
            Rules::QuakeII => quake2::face_get_contents(contents),
        }
    }

    // Cross-game remapping

    /// Portable kind of a native contents value, if it has one
    pub fn contents_kind(&self, native: i32) -> Option<ContentKind> {
        match self.rules() {
            Rules::Quake => quake::kind(self, native),
            Rules::QuakeII => Some(quake2::kind(native)),
        }
    }

    /// Native encoding of a portable kind, if this game can store it
    pub fn native_contents_for(&self, kind: ContentKind) -> Option<i32> {
        match self.rules() {
            Rules::Quake => quake::from_kind(self, kind),
            Rules::QuakeII => Some(quake2::from_kind(kind)),
        }
    }

    /// Re-encode a native contents value written for `source`
    pub fn remap_contents_from(&self, source: &Self, native: i32) -> Option<i32> {
        if self.shares_encoding_with(source) && self.contents_kind(native).is_some() {
            return Some(native);
        }
        source
            .contents_kind(native)
            .and_then(|kind| self.native_contents_for(kind))
    }

    /// Re-encode native surface flags written for `source`. Only "not
    /// lightmapped" survives between game families.
    pub fn remap_surface_from(&self, source: &Self, flags: &SurfaceFlags) -> i32 {
        if self.rules() == source.rules() {
            return flags.native;
        }
        let special = !source.surf_is_lightmapped(flags);
        let native = match (self.rules(), special) {
            (_, false) => 0,
            (Rules::Quake, true) => quake::TEX_SPECIAL,
            (Rules::QuakeII, true) => quake2::SURF_WARP,
        };
        let surviving = match source.rules() {
            Rules::Quake => quake::TEX_SPECIAL,
            Rules::QuakeII => quake2::SURF_SKY | quake2::SURF_WARP | quake2::SURF_NODRAW,
        };
        if flags.native & !surviving != 0 {
            warn!(
                "Dropping {} surface flags {:#x} with no {} equivalent",
                source.name(),
                flags.native,
                self.name()
            );
        }
        native
    }

    // Tables

    /// Default palette; empty for games whose textures carry their own
    pub fn default_palette(&self) -> &'static [[u8; 3]] {
        self.palette
    }

    /// Clipping hull sizes; hull 0 is the point hull
    pub fn hull_sizes(&self) -> &'static [HullSize] {
        self.hulls
    }

    // Statistics

    pub fn create_content_stats(&self) -> ContentStats {
        match self.rules() {
            Rules::Quake => ContentStats::Quake(QuakeContentStats::default()),
            Rules::QuakeII => ContentStats::QuakeII(Quake2ContentStats::default()),
        }
    }

    /// Count `contents`. Stats created by another game family are left alone.
    pub fn count_contents_in_stats(&self, contents: &ContentFlags, stats: &mut ContentStats) {
        let owned = matches!(
            (self.rules(), &*stats),
            (Rules::Quake, ContentStats::Quake(_)) | (Rules::QuakeII, ContentStats::QuakeII(_))
        );
        if owned {
            stats.count(contents);
        } else {
            warn!("Content stats were not created by {}", self.name());
        }
    }

    pub fn print_content_stats(&self, stats: &ContentStats, what: &str) {
        stats.print(what);
    }
}

impl PartialEq for GameDefinition {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for GameDefinition {}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    const fn assert_sync<T: Sync + Send>() {}

    #[test]
    fn test_definitions_are_shareable() {
        assert_sync::<GameDefinition>();
        let handles: Vec<_> = (0..4)
            .map(|_| std::thread::spawn(|| GAME_QUAKE.create_solid_contents().native))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().expect("Thread should finish"), quake::CONTENTS_SOLID);
        }
    }

    #[test]
    fn test_for_id() {
        assert!(GameDefinition::for_id(GameId::Unknown).is_none());
        for game in GameDefinition::all() {
            assert_eq!(GameDefinition::for_id(game.id), Some(game));
        }
        assert_eq!(GameId::from_name("Q2"), Some(GameId::QuakeII));
        assert_eq!(GameId::from_name("doom"), None);
    }

    #[test]
    fn test_select_game_once() {
        // Only test that touches the process-wide selection
        let game = select_game(GameId::HexenII).expect("Test operation should succeed");
        assert_eq!(game.id, GameId::HexenII);
        assert!(select_game(GameId::HexenII).is_ok());
        assert!(matches!(
            select_game(GameId::Unknown),
            Err(BspError::GameUnsupported { .. })
        ));
        assert!(matches!(
            select_game(GameId::Quake),
            Err(BspError::GameAlreadySelected { .. })
        ));
        assert_eq!(active_game().map(|g| g.id), Some(GameId::HexenII));
    }

    #[test]
    fn test_hull_tables() {
        assert_eq!(GAME_QUAKE.hull_sizes().len(), 3);
        assert_eq!(GAME_HEXEN_II.hull_sizes().len(), 6);
        assert_eq!(GAME_HALF_LIFE.hull_sizes().len(), 4);
        assert_eq!(GAME_QUAKE_II.hull_sizes(), &[POINT_HULL]);
        assert_eq!(GAME_QUAKE.hull_sizes()[1].mins, [-16.0, -16.0, -32.0]);
        assert_eq!(GAME_QUAKE.default_palette().len(), 256);
        assert!(GAME_QUAKE_II.default_palette().is_empty());
    }

    #[test]
    fn test_should_chop_tie_goes_to_first() {
        let game = &GAME_QUAKE;
        let solid = game.create_solid_contents();
        let detail = game.create_detail_solid_contents(&solid);
        assert!(game.should_chop(&solid, &detail));
        assert!(!game.should_chop(&detail, &solid));
        assert!(game.should_chop(&solid, &solid));
        let water = ContentFlags::new(quake::CONTENTS_WATER);
        assert!(!game.should_chop(&water, &game.create_empty_contents()));
    }

    #[test]
    fn test_combine_prefers_structural_solid() {
        let game = &GAME_QUAKE;
        let water = ContentFlags::new(quake::CONTENTS_WATER);
        let solid = game.create_solid_contents();
        assert!(game.combine_contents(&water, &solid).is_solid(game));

        let q2 = &GAME_QUAKE_II;
        let detail = q2.create_detail_solid_contents(&q2.create_empty_contents());
        let combined = q2.combine_contents(&detail, &q2.create_solid_contents());
        assert!(combined.is_solid(q2));
    }

    #[test]
    fn test_cross_game_remap() {
        let q1 = &GAME_QUAKE;
        let q2 = &GAME_QUAKE_II;
        let hl = &GAME_HALF_LIFE;

        assert_eq!(q2.remap_contents_from(q1, quake::CONTENTS_SKY), Some(quake2::CONTENTS_SOLID));
        assert_eq!(q1.remap_contents_from(q2, quake2::CONTENTS_WINDOW), Some(quake::CONTENTS_SOLID));
        assert_eq!(q1.remap_contents_from(q2, quake2::CONTENTS_ORIGIN), None);
        assert_eq!(q1.remap_contents_from(q2, quake2::CONTENTS_MIST), None);
        assert_eq!(q1.remap_contents_from(hl, quake::CONTENTS_CURRENT_90), Some(quake::CONTENTS_WATER));
        assert_eq!(hl.remap_contents_from(q2, quake2::CONTENTS_PLAYERCLIP), Some(quake::CONTENTS_CLIP));
        assert_eq!(q1.remap_contents_from(&GAME_HEXEN_II, quake::CONTENTS_LAVA), Some(quake::CONTENTS_LAVA));

        let sky = SurfaceFlags::from_native(quake2::SURF_SKY | quake2::SURF_LIGHT);
        assert_eq!(q1.remap_surface_from(q2, &sky), quake::TEX_SPECIAL);
        let special = SurfaceFlags::from_native(quake::TEX_SPECIAL);
        assert_eq!(q2.remap_surface_from(q1, &special), quake2::SURF_WARP);
        assert_eq!(q2.remap_surface_from(q1, &SurfaceFlags::default()), 0);
    }

    #[test]
    fn test_validate_contents_repairs() {
        let game = &GAME_QUAKE_II;
        let mut contents = ContentFlags::new(quake2::CONTENTS_SOLID | quake2::CONTENTS_WATER);
        game.validate_contents(&mut contents)
            .expect("Test operation should succeed");
        assert_eq!(contents.native, quake2::CONTENTS_SOLID);
    }

    mod proptest_tests {
        use super::*;
        use crate::contents::{GameContentData, QuakeContentData, QuakeDetail};
        use proptest::prelude::*;

        fn quake_contents() -> impl Strategy<Value = ContentFlags> {
            (
                -15i32..=0,
                prop_oneof![
                    Just(None),
                    Just(Some(QuakeDetail::Solid)),
                    Just(Some(QuakeDetail::Fence)),
                    Just(Some(QuakeDetail::Illusionary)),
                ],
                any::<Option<bool>>(),
                any::<Option<bool>>(),
                any::<bool>(),
            )
                .prop_map(|(native, detail, mirror, clips, blocker)| ContentFlags {
                    native,
                    game_data: detail.map_or(GameContentData::None, |d| {
                        GameContentData::Quake(QuakeContentData { detail: Some(d) })
                    }),
                    mirror_inside: mirror,
                    clips_same_type: clips,
                    illusionary_visblocker: blocker,
                })
        }

        fn quake2_contents() -> impl Strategy<Value = ContentFlags> {
            (any::<i32>(), any::<Option<bool>>(), any::<bool>()).prop_map(
                |(native, mirror, blocker)| ContentFlags {
                    native,
                    game_data: GameContentData::None,
                    mirror_inside: mirror,
                    clips_same_type: None,
                    illusionary_visblocker: blocker,
                },
            )
        }

        fn check_cluster(game: &GameDefinition, a: &ContentFlags, b: &ContentFlags) -> std::result::Result<(), TestCaseError> {
            let ab = game.cluster_contents(a, b);
            let ba = game.cluster_contents(b, a);
            prop_assert!(game.contents_are_equal(&ab, &ba));
            if game.contents_priority(a) > game.contents_priority(b) {
                prop_assert!(game.contents_are_type_equal(&ab, a));
            }
            Ok(())
        }

        proptest! {
            /// Clustering is commutative and the higher priority type wins
            #[test]
            fn quake_cluster_is_commutative(a in quake_contents(), b in quake_contents()) {
                for game in [&GAME_QUAKE, &GAME_HEXEN_II, &GAME_HALF_LIFE] {
                    check_cluster(game, &a, &b)?;
                }
            }

            /// Same for the Quake II bitfield, including attribute unions
            #[test]
            fn quake2_cluster_is_commutative(a in quake2_contents(), b in quake2_contents()) {
                check_cluster(&GAME_QUAKE_II, &a, &b)?;
            }

            /// Repair always produces valid contents and is idempotent
            #[test]
            fn make_valid_is_idempotent(a in quake_contents(), b in quake2_contents()) {
                for (game, contents) in [(&GAME_QUAKE, a), (&GAME_HALF_LIFE, a), (&GAME_QUAKE_II, b)] {
                    let mut once = contents;
                    game.contents_make_valid(&mut once);
                    prop_assert!(game.contents_are_valid(&once, true));
                    let mut twice = once;
                    game.contents_make_valid(&mut twice);
                    prop_assert!(game.contents_are_equal(&once, &twice));
                }
            }
        }
    }
}
