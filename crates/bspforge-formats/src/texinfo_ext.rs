//! Extended texinfo sidecar
//!
//! Surface switches the texinfo lump has no room for are written next to
//! the map as `<map>.texinfo.json`: an object keyed by texinfo index whose
//! values hold only the fields that differ from their defaults.

use crate::error::Result;
use crate::surface::SurfaceFlags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ExtendedFlags {
    #[serde(skip_serializing_if = "is_false")]
    no_dirt: bool,
    #[serde(skip_serializing_if = "is_false")]
    no_shadow: bool,
    #[serde(skip_serializing_if = "is_false")]
    no_bounce: bool,
    #[serde(skip_serializing_if = "is_false")]
    no_minlight: bool,
    #[serde(skip_serializing_if = "is_false")]
    no_expand: bool,
    #[serde(skip_serializing_if = "is_false")]
    light_ignore: bool,
    #[serde(skip_serializing_if = "is_zero")]
    phong_angle: f32,
    #[serde(skip_serializing_if = "is_zero")]
    phong_angle_concave: f32,
    #[serde(skip_serializing_if = "is_zero")]
    minlight: f32,
    #[serde(skip_serializing_if = "is_black")]
    minlight_color: [u8; 3],
    #[serde(skip_serializing_if = "is_zero")]
    light_alpha: f32,
}

#[allow(clippy::trivially_copy_pass_by_ref)]
const fn is_false(value: &bool) -> bool {
    !*value
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn is_zero(value: &f32) -> bool {
    *value == 0.0
}

fn is_black(value: &[u8; 3]) -> bool {
    *value == [0; 3]
}

impl From<&SurfaceFlags> for ExtendedFlags {
    fn from(flags: &SurfaceFlags) -> Self {
        Self {
            no_dirt: flags.no_dirt,
            no_shadow: flags.no_shadow,
            no_bounce: flags.no_bounce,
            no_minlight: flags.no_minlight,
            no_expand: flags.no_expand,
            light_ignore: flags.light_ignore,
            phong_angle: flags.phong_angle,
            phong_angle_concave: flags.phong_angle_concave,
            minlight: flags.minlight,
            minlight_color: flags.minlight_color,
            light_alpha: flags.light_alpha,
        }
    }
}

impl ExtendedFlags {
    const fn apply(&self, flags: &mut SurfaceFlags) {
        flags.no_dirt = self.no_dirt;
        flags.no_shadow = self.no_shadow;
        flags.no_bounce = self.no_bounce;
        flags.no_minlight = self.no_minlight;
        flags.no_expand = self.no_expand;
        flags.light_ignore = self.light_ignore;
        flags.phong_angle = self.phong_angle;
        flags.phong_angle_concave = self.phong_angle_concave;
        flags.minlight = self.minlight;
        flags.minlight_color = self.minlight_color;
        flags.light_alpha = self.light_alpha;
    }
}

/// Sidecar path for a map: `e1m1.bsp` becomes `e1m1.texinfo.json`
pub fn extended_texinfo_path(bsp_path: impl AsRef<Path>) -> PathBuf {
    bsp_path.as_ref().with_extension("texinfo.json")
}

/// Write the flags that need an extended record. Returns `false`, writing
/// nothing, when none do.
pub fn write_extended_texinfo_flags(path: impl AsRef<Path>, flags: &[SurfaceFlags]) -> Result<bool> {
    let entries: BTreeMap<usize, ExtendedFlags> = flags
        .iter()
        .enumerate()
        .filter(|(_, flags)| flags.needs_write())
        .map(|(index, flags)| (index, ExtendedFlags::from(flags)))
        .collect();
    if entries.is_empty() {
        return Ok(false);
    }
    let path = path.as_ref();
    let json = serde_json::to_string_pretty(&entries)?;
    std::fs::write(path, json)?;
    info!("Wrote {} extended texinfo entries to {}", entries.len(), path.display());
    Ok(true)
}

/// Merge a sidecar written by [`write_extended_texinfo_flags`] into `flags`.
/// Entries past the end of `flags` are skipped with a warning.
pub fn load_extended_texinfo_flags(path: impl AsRef<Path>, flags: &mut [SurfaceFlags]) -> Result<usize> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let entries: BTreeMap<usize, ExtendedFlags> = serde_json::from_str(&json)?;
    let mut applied = 0;
    for (index, extended) in &entries {
        match flags.get_mut(*index) {
            Some(target) => {
                extended.apply(target);
                applied += 1;
            }
            None => warn!(
                "{}: texinfo {index} out of range, map has {}",
                path.display(),
                flags.len()
            ),
        }
    }
    Ok(applied)
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sidecar_path() {
        assert_eq!(
            extended_texinfo_path("maps/e1m1.bsp"),
            PathBuf::from("maps/e1m1.texinfo.json")
        );
    }

    #[test]
    fn test_nothing_to_write() {
        let dir = TempDir::new().expect("Test operation should succeed");
        let path = dir.path().join("map.texinfo.json");
        let written = write_extended_texinfo_flags(&path, &[SurfaceFlags::from_native(1)])
            .expect("Test operation should succeed");
        assert!(!written);
        assert!(!path.exists());
    }

    #[test]
    fn test_only_changed_fields_are_written() {
        let dir = TempDir::new().expect("Test operation should succeed");
        let path = dir.path().join("map.texinfo.json");
        let flags = [
            SurfaceFlags::default(),
            SurfaceFlags {
                no_shadow: true,
                phong_angle: 45.0,
                ..SurfaceFlags::from_native(4)
            },
        ];
        assert!(write_extended_texinfo_flags(&path, &flags).expect("Test operation should succeed"));

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).expect("Test operation should succeed"))
                .expect("Test operation should succeed");
        assert_eq!(value, serde_json::json!({ "1": { "no_shadow": true, "phong_angle": 45.0 } }));

        let mut loaded = [SurfaceFlags::default(), SurfaceFlags::from_native(4)];
        let applied = load_extended_texinfo_flags(&path, &mut loaded).expect("Test operation should succeed");
        assert_eq!(applied, 1);
        assert_eq!(loaded, flags);
    }

    #[test]
    fn test_out_of_range_entries_are_skipped() {
        let dir = TempDir::new().expect("Test operation should succeed");
        let path = dir.path().join("map.texinfo.json");
        std::fs::write(&path, r#"{ "0": { "minlight": 8.0 }, "5": { "no_dirt": true } }"#)
            .expect("Test operation should succeed");
        let mut flags = [SurfaceFlags::default()];
        let applied = load_extended_texinfo_flags(&path, &mut flags).expect("Test operation should succeed");
        assert_eq!(applied, 1);
        assert!((flags[0].minlight - 8.0).abs() < f32::EPSILON);
    }
}
