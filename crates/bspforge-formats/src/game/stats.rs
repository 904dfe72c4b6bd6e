//! Build-time content statistics
//!
//! Each game family counts what matters to it. The accumulator is opaque to
//! callers: create it from the game, feed it contents, then print it.

use super::quake;
use super::quake2;
use crate::contents::{ContentFlags, GameContentData, QuakeContentData, QuakeDetail};
use std::collections::BTreeMap;
use tracing::info;

/// Counters for Quake, Hexen II and Half-Life
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuakeContentStats {
    native: BTreeMap<i32, usize>,
    detail: BTreeMap<QuakeDetail, usize>,
    total: usize,
}

/// Counters for Quake II, one per content bit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Quake2ContentStats {
    bits: [usize; 32],
    empty: usize,
    total: usize,
}

/// Per-game content statistics accumulator
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentStats {
    Quake(QuakeContentStats),
    QuakeII(Quake2ContentStats),
}

impl ContentStats {
    /// Number of contents counted so far
    pub const fn total(&self) -> usize {
        match self {
            Self::Quake(stats) => stats.total,
            Self::QuakeII(stats) => stats.total,
        }
    }

    pub(super) fn count(&mut self, contents: &ContentFlags) {
        match self {
            Self::Quake(stats) => {
                stats.total += 1;
                match contents.game_data {
                    GameContentData::Quake(QuakeContentData {
                        detail: Some(detail),
                    }) => *stats.detail.entry(detail).or_default() += 1,
                    _ => *stats.native.entry(contents.native).or_default() += 1,
                }
            }
            Self::QuakeII(stats) => {
                stats.total += 1;
                if contents.native == quake2::CONTENTS_EMPTY {
                    stats.empty += 1;
                }
                for (bit, counter) in stats.bits.iter_mut().enumerate() {
                    if contents.native & (1 << bit) != 0 {
                        *counter += 1;
                    }
                }
            }
        }
    }

    /// One `(count, name)` line per non-zero counter
    pub fn lines(&self) -> Vec<(usize, String)> {
        match self {
            Self::Quake(stats) => {
                let mut lines: Vec<(usize, String)> = stats
                    .native
                    .iter()
                    .map(|(native, count)| (*count, quake::native_to_string(*native)))
                    .collect();
                lines.extend(stats.detail.iter().map(|(detail, count)| {
                    let name = match detail {
                        QuakeDetail::Solid => "DETAIL_SOLID",
                        QuakeDetail::Fence => "DETAIL_FENCE",
                        QuakeDetail::Illusionary => "DETAIL_ILLUSIONARY",
                    };
                    (*count, name.to_string())
                }));
                lines
            }
            Self::QuakeII(stats) => {
                let mut lines = Vec::new();
                if stats.empty > 0 {
                    lines.push((stats.empty, "EMPTY".to_string()));
                }
                for (bit, name) in quake2::content_bit_names() {
                    let count = stats.bits[bit.trailing_zeros() as usize];
                    if count > 0 {
                        lines.push((count, (*name).to_string()));
                    }
                }
                lines
            }
        }
    }

    /// Log every counter at info level; `what` names the counted objects
    pub fn print(&self, what: &str) {
        for (count, name) in self.lines() {
            info!("{count:8} {what} {name}");
        }
    }
}
