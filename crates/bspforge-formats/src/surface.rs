//! Surface flags: texinfo shading and lighting switches
//!
//! Only `native` is stored in the BSP texinfo lump. The remaining fields are
//! compiler-side switches; the ones that matter to the light tool are carried
//! in the extended texinfo sidecar when [`SurfaceFlags::needs_write`] is true.

use crate::game::GameDefinition;
use std::cmp::Ordering;

/// Per-texinfo surface flags
#[derive(Debug, Clone, Copy, Default)]
pub struct SurfaceFlags {
    /// Native flags value as stored in the texinfo lump
    pub native: i32,
    /// Invisible surface
    pub is_skip: bool,
    /// Hint surface
    pub is_hint: bool,
    /// Don't receive dirtmapping
    pub no_dirt: bool,
    /// Don't cast a shadow
    pub no_shadow: bool,
    /// Light doesn't bounce off this face
    pub no_bounce: bool,
    /// Opt out of minlight on this face
    pub no_minlight: bool,
    /// Don't expand this face for larger clip hulls
    pub no_expand: bool,
    /// This face doesn't receive light
    pub light_ignore: bool,
    /// Non-zero enables phong shading and gives the angle threshold
    pub phong_angle: f32,
    /// Non-zero overrides `phong_angle` for concave joints
    pub phong_angle_concave: f32,
    /// Minlight value for this face
    pub minlight: f32,
    /// Minlight color for this face
    pub minlight_color: [u8; 3],
    /// Custom opacity
    pub light_alpha: f32,
}

impl SurfaceFlags {
    /// Flags with only the native value set
    pub const fn from_native(native: i32) -> Self {
        Self {
            native,
            is_skip: false,
            is_hint: false,
            no_dirt: false,
            no_shadow: false,
            no_bounce: false,
            no_minlight: false,
            no_expand: false,
            light_ignore: false,
            phong_angle: 0.0,
            phong_angle_concave: 0.0,
            minlight: 0.0,
            minlight_color: [0; 3],
            light_alpha: 0.0,
        }
    }

    /// Whether any extended field differs from its default.
    ///
    /// `native` lives in the texinfo lump and `is_skip`/`is_hint` are
    /// consumed by the compiler, so none of them require an extended record.
    pub fn needs_write(&self) -> bool {
        self.no_dirt
            || self.no_shadow
            || self.no_bounce
            || self.no_minlight
            || self.no_expand
            || self.light_ignore
            || self.phong_angle != 0.0
            || self.phong_angle_concave != 0.0
            || self.minlight != 0.0
            || self.minlight_color != [0; 3]
            || self.light_alpha != 0.0
    }

    /// Whether the game accepts this native value
    pub fn is_valid(&self, game: &GameDefinition) -> bool {
        game.surfflags_are_valid(self)
    }
}

impl Ord for SurfaceFlags {
    fn cmp(&self, other: &Self) -> Ordering {
        self.native
            .cmp(&other.native)
            .then(self.is_skip.cmp(&other.is_skip))
            .then(self.is_hint.cmp(&other.is_hint))
            .then(self.no_dirt.cmp(&other.no_dirt))
            .then(self.no_shadow.cmp(&other.no_shadow))
            .then(self.no_bounce.cmp(&other.no_bounce))
            .then(self.no_minlight.cmp(&other.no_minlight))
            .then(self.no_expand.cmp(&other.no_expand))
            .then(self.light_ignore.cmp(&other.light_ignore))
            .then(self.phong_angle.total_cmp(&other.phong_angle))
            .then(self.phong_angle_concave.total_cmp(&other.phong_angle_concave))
            .then(self.minlight.total_cmp(&other.minlight))
            .then(self.minlight_color.cmp(&other.minlight_color))
            .then(self.light_alpha.total_cmp(&other.light_alpha))
    }
}

impl PartialOrd for SurfaceFlags {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

// Equality follows the total order so that sorting and deduplication agree.
impl PartialEq for SurfaceFlags {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SurfaceFlags {}
