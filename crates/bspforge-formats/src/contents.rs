//! Content flags: a leaf or brush volume's type plus compiler-side overrides
//!
//! The meaning of [`ContentFlags::native`] depends on the game. Quake-family
//! games use small negative enumerators, Quake II uses a bitfield. Every query
//! therefore takes the [`GameDefinition`] that owns the value, and contents are
//! only ever compared through the game's rules, never with `==`.

use crate::game::GameDefinition;

/// Detail classification for Quake-family brushes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum QuakeDetail {
    /// `func_detail`: solid, but doesn't seal the map or split the BSP
    Solid,
    /// `func_detail_fence`: solid for collision, see-through for vis
    Fence,
    /// `func_detail_illusionary`: not solid, doesn't block vis
    Illusionary,
}

/// Extension payload for Quake, Hexen II and Half-Life contents
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct QuakeContentData {
    /// Detail classification, if any
    pub detail: Option<QuakeDetail>,
}

/// Game-specific content payload. Only ever interpreted by the game that
/// created it and never written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum GameContentData {
    /// No payload (Quake II keeps everything in the native bits)
    #[default]
    None,
    /// Quake-family detail data
    Quake(QuakeContentData),
}

/// Contents of a leaf, brush or portal side
#[derive(Debug, Clone, Copy, Default)]
pub struct ContentFlags {
    /// Value written to disk
    pub native: i32,
    /// Game-specific payload
    pub game_data: GameContentData,
    /// Whether this content's faces are mirrored to the inside; `None` means
    /// the game default for the content type applies
    pub mirror_inside: Option<bool>,
    /// Whether same-type neighbours have their touching faces clipped away;
    /// `None` means the game default applies
    pub clips_same_type: Option<bool>,
    /// Blocks vis through otherwise see-through illusionary volumes
    pub illusionary_visblocker: bool,
}

impl ContentFlags {
    /// Contents with a native value and no payload or overrides
    pub const fn new(native: i32) -> Self {
        Self {
            native,
            game_data: GameContentData::None,
            mirror_inside: None,
            clips_same_type: None,
            illusionary_visblocker: false,
        }
    }

    /// Contents with a native value and a game payload
    pub const fn with_data(native: i32, game_data: GameContentData) -> Self {
        Self {
            native,
            game_data,
            mirror_inside: None,
            clips_same_type: None,
            illusionary_visblocker: false,
        }
    }

    /// Key giving a total order over every field. Used where a deterministic
    /// winner is needed between contents of equal priority.
    pub(crate) fn ordering_key(&self) -> (i32, GameContentData, Option<bool>, Option<bool>, bool) {
        (
            self.native,
            self.game_data,
            self.mirror_inside,
            self.clips_same_type,
            self.illusionary_visblocker,
        )
    }

    /// Full equality under the game's rules, overrides included
    pub fn equals(&self, game: &GameDefinition, other: &Self) -> bool {
        game.contents_are_equal(self, other)
    }

    /// Same content type, ignoring overrides
    pub fn types_equal(&self, other: &Self, game: &GameDefinition) -> bool {
        game.contents_are_type_equal(self, other)
    }

    pub fn is_any_detail(&self, game: &GameDefinition) -> bool {
        game.contents_are_any_detail(self)
    }

    pub fn is_detail_solid(&self, game: &GameDefinition) -> bool {
        game.contents_are_detail_solid(self)
    }

    pub fn is_detail_fence(&self, game: &GameDefinition) -> bool {
        game.contents_are_detail_fence(self)
    }

    pub fn is_detail_illusionary(&self, game: &GameDefinition) -> bool {
        game.contents_are_detail_illusionary(self)
    }

    /// Alias for [`Self::is_detail_fence`]
    pub fn is_fence(&self, game: &GameDefinition) -> bool {
        game.contents_are_detail_fence(self)
    }

    /// Whether faces are mirrored to the inside. The local override wins,
    /// otherwise the game default for this content type.
    pub fn is_mirrored(&self, game: &GameDefinition) -> bool {
        self.mirror_inside
            .unwrap_or_else(|| game.contents_are_mirrored(self))
    }

    pub fn set_mirrored(&mut self, mirror_inside: Option<bool>) -> &mut Self {
        self.mirror_inside = mirror_inside;
        self
    }

    /// Whether this content clips faces against another volume of its own
    /// type. The local override wins, otherwise the game default.
    pub fn will_clip_same_type(&self, game: &GameDefinition) -> bool {
        self.clips_same_type
            .unwrap_or_else(|| game.contents_clip_same_type(self))
    }

    /// [`Self::will_clip_same_type`] against a specific neighbour; only
    /// contents of the same type are ever clipped.
    pub fn will_clip_same_type_with(&self, game: &GameDefinition, other: &Self) -> bool {
        self.types_equal(other, game) && self.will_clip_same_type(game)
    }

    pub fn set_clips_same_type(&mut self, clips_same_type: Option<bool>) -> &mut Self {
        self.clips_same_type = clips_same_type;
        self
    }

    pub fn set_illusionary_visblocker(&mut self, visblocker: bool) -> &mut Self {
        self.illusionary_visblocker = visblocker;
        self
    }

    pub fn is_empty(&self, game: &GameDefinition) -> bool {
        game.contents_are_empty(self)
    }

    /// Structural or detail solid
    pub fn is_any_solid(&self, game: &GameDefinition) -> bool {
        game.contents_are_any_solid(self)
    }

    /// Structural solid only
    pub fn is_solid(&self, game: &GameDefinition) -> bool {
        game.contents_are_solid(self)
    }

    pub fn is_sky(&self, game: &GameDefinition) -> bool {
        game.contents_are_sky(self)
    }

    pub fn is_liquid(&self, game: &GameDefinition) -> bool {
        game.contents_are_liquid(self)
    }

    pub fn is_clip(&self, game: &GameDefinition) -> bool {
        game.contents_are_clip(self)
    }

    pub fn is_origin(&self, game: &GameDefinition) -> bool {
        game.contents_are_origin(self)
    }

    /// Whether the contents are acceptable to the game. Non-strict mode
    /// tolerates values only seen mid-compile, such as a zero native.
    pub fn is_valid(&self, game: &GameDefinition, strict: bool) -> bool {
        game.contents_are_valid(self, strict)
    }

    /// Repair invalid contents in place
    pub fn make_valid(&mut self, game: &GameDefinition) {
        game.contents_make_valid(self);
    }

    /// Visibility priority; higher wins when clustering
    pub fn priority(&self, game: &GameDefinition) -> i32 {
        game.contents_priority(self)
    }

    /// Whether faces of this content split faces of other contents
    pub fn chops(&self, game: &GameDefinition) -> bool {
        game.chops(self)
    }

    /// Human-readable description, overrides included
    pub fn to_string(&self, game: &GameDefinition) -> String {
        let mut out = game.contents_to_string(self);
        if let Some(mirror) = self.mirror_inside {
            out.push_str(&format!(" | MIRROR_INSIDE[{mirror}]"));
        }
        if let Some(clips) = self.clips_same_type {
            out.push_str(&format!(" | CLIPS_SAME_TYPE[{clips}]"));
        }
        if self.illusionary_visblocker {
            out.push_str(" | ILLUSIONARY_VISBLOCKER");
        }
        out
    }
}
