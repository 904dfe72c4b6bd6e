//! The in-memory BSP document
//!
//! A [`BspDocument`] holds exactly one native layout, or nothing, together
//! with the extension lump store and the format it was last loaded or
//! written as.

use crate::bspx::ExtensionLumps;
use crate::game::GameDefinition;
use crate::layout::{Bsp2, Bsp2Rmq, Bsp29, GenericBsp, LayoutKind, QbismBsp, Q2Bsp};
use crate::version::{BSPVER_GENERIC, FormatDescriptor};

/// One native layout per supported record set
#[derive(Debug, Clone, PartialEq)]
pub enum NativeBsp {
    Generic(Box<GenericBsp>),
    Bsp29(Box<Bsp29>),
    Bsp2Rmq(Box<Bsp2Rmq>),
    Bsp2(Box<Bsp2>),
    Q2(Box<Q2Bsp>),
    Qbism(Box<QbismBsp>),
}

impl NativeBsp {
    pub const fn layout(&self) -> LayoutKind {
        match self {
            Self::Generic(_) => LayoutKind::Generic,
            Self::Bsp29(_) => LayoutKind::Bsp29,
            Self::Bsp2Rmq(_) => LayoutKind::Bsp2Rmq,
            Self::Bsp2(_) => LayoutKind::Bsp2,
            Self::Q2(_) => LayoutKind::Q2,
            Self::Qbism(_) => LayoutKind::Qbism,
        }
    }

    /// Widen into the generic layout; `game` tags the content space
    pub fn to_generic(&self, game: Option<&GameDefinition>) -> GenericBsp {
        match self {
            Self::Generic(bsp) => bsp.as_ref().clone(),
            Self::Bsp29(bsp) => bsp.to_generic(game),
            Self::Bsp2Rmq(bsp) => bsp.to_generic(game),
            Self::Bsp2(bsp) => bsp.to_generic(game),
            Self::Q2(bsp) => bsp.to_generic(game),
            Self::Qbism(bsp) => bsp.to_generic(game),
        }
    }

    /// Contents of every leaf, in leaf order
    pub fn leaf_contents(&self) -> Vec<i32> {
        match self {
            Self::Generic(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
            Self::Bsp29(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
            Self::Bsp2Rmq(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
            Self::Bsp2(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
            Self::Q2(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
            Self::Qbism(bsp) => bsp.leafs.iter().map(|leaf| leaf.contents).collect(),
        }
    }
}

impl From<GenericBsp> for NativeBsp {
    fn from(bsp: GenericBsp) -> Self {
        Self::Generic(Box::new(bsp))
    }
}

impl From<Bsp29> for NativeBsp {
    fn from(bsp: Bsp29) -> Self {
        Self::Bsp29(Box::new(bsp))
    }
}

impl From<Bsp2Rmq> for NativeBsp {
    fn from(bsp: Bsp2Rmq) -> Self {
        Self::Bsp2Rmq(Box::new(bsp))
    }
}

impl From<Bsp2> for NativeBsp {
    fn from(bsp: Bsp2) -> Self {
        Self::Bsp2(Box::new(bsp))
    }
}

impl From<Q2Bsp> for NativeBsp {
    fn from(bsp: Q2Bsp) -> Self {
        Self::Q2(Box::new(bsp))
    }
}

impl From<QbismBsp> for NativeBsp {
    fn from(bsp: QbismBsp) -> Self {
        Self::Qbism(Box::new(bsp))
    }
}

/// A loaded or in-progress BSP
#[derive(Debug, Clone)]
pub struct BspDocument {
    /// Format of the native layout, and of the most recent load or write
    pub version: &'static FormatDescriptor,
    /// Format the document was loaded from, for diagnostics
    pub load_version: Option<&'static FormatDescriptor>,
    bsp: Option<NativeBsp>,
    pub bspx: ExtensionLumps,
}

impl Default for BspDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl BspDocument {
    /// Empty document; conversion and writing need a layout first
    pub fn new() -> Self {
        Self {
            version: &BSPVER_GENERIC,
            load_version: None,
            bsp: None,
            bspx: ExtensionLumps::new(),
        }
    }

    /// Document holding `bsp` as format `version`. The layout must be the
    /// one `version` uses.
    pub fn with_native(version: &'static FormatDescriptor, bsp: impl Into<NativeBsp>) -> Self {
        let bsp = bsp.into();
        debug_assert_eq!(bsp.layout(), version.layout);
        Self {
            version,
            load_version: None,
            bsp: Some(bsp),
            bspx: ExtensionLumps::new(),
        }
    }

    pub const fn native(&self) -> Option<&NativeBsp> {
        self.bsp.as_ref()
    }

    pub const fn native_mut(&mut self) -> Option<&mut NativeBsp> {
        self.bsp.as_mut()
    }

    pub const fn is_empty(&self) -> bool {
        self.bsp.is_none()
    }

    /// Swap in a new native layout and its format together
    pub(crate) fn replace_native(&mut self, version: &'static FormatDescriptor, bsp: NativeBsp) {
        debug_assert_eq!(bsp.layout(), version.layout);
        self.version = version;
        self.bsp = Some(bsp);
    }

    /// The game whose content space the document uses
    pub fn game(&self) -> Option<&'static GameDefinition> {
        self.version.game
    }
}

/// Provenance is not part of document identity
impl PartialEq for BspDocument {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version && self.bsp == other.bsp && self.bspx == other.bspx
    }
}
