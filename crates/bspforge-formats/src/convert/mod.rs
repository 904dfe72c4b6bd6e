//! Conversion between BSP versions
//!
//! Every on-disk layout converts to and from the generic layout; any other
//! pair goes through it. Widening into the generic layout is exact, and
//! narrowing out of it range-checks every field, so a failed conversion
//! never produces silently truncated geometry. The document is only touched
//! once the target layout has been built in full.

pub mod numeric;

use crate::document::{BspDocument, NativeBsp};
use crate::error::{BspError, Result};
use crate::game::GameDefinition;
use crate::layout::{Bsp2, Bsp2Rmq, Bsp29, GenericBsp, LayoutKind, Model, QbismBsp, Q2Bsp, quake};
use crate::version::FormatDescriptor;
use tracing::{debug, info};

/// A registered direct conversion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConversionRule {
    pub from: LayoutKind,
    pub to: LayoutKind,
}

const fn rule(from: LayoutKind, to: LayoutKind) -> ConversionRule {
    ConversionRule { from, to }
}

/// Direct conversions: each on-disk layout to and from the generic one
pub static CONVERSION_RULES: [ConversionRule; 10] = [
    rule(LayoutKind::Bsp29, LayoutKind::Generic),
    rule(LayoutKind::Bsp2Rmq, LayoutKind::Generic),
    rule(LayoutKind::Bsp2, LayoutKind::Generic),
    rule(LayoutKind::Q2, LayoutKind::Generic),
    rule(LayoutKind::Qbism, LayoutKind::Generic),
    rule(LayoutKind::Generic, LayoutKind::Bsp29),
    rule(LayoutKind::Generic, LayoutKind::Bsp2Rmq),
    rule(LayoutKind::Generic, LayoutKind::Bsp2),
    rule(LayoutKind::Generic, LayoutKind::Q2),
    rule(LayoutKind::Generic, LayoutKind::Qbism),
];

fn has_rule(from: LayoutKind, to: LayoutKind) -> bool {
    CONVERSION_RULES.contains(&rule(from, to))
}

/// Layouts visited converting `from` into `to`, both ends included, or
/// `None` when no registered rule or chain connects them
pub fn conversion_path(from: LayoutKind, to: LayoutKind) -> Option<Vec<LayoutKind>> {
    if from == to {
        return Some(vec![from]);
    }
    if has_rule(from, to) {
        return Some(vec![from, to]);
    }
    (has_rule(from, LayoutKind::Generic) && has_rule(LayoutKind::Generic, to))
        .then(|| vec![from, LayoutKind::Generic, to])
}

fn unsupported(from: &FormatDescriptor, to: &FormatDescriptor, reason: impl Into<String>) -> BspError {
    BspError::ConversionUnsupported {
        from: from.to_string(),
        to: to.to_string(),
        reason: reason.into(),
    }
}

/// Re-encode leaf and brush contents and texinfo surface bits from one
/// game's content space into another's
fn remap_game(
    generic: &mut GenericBsp,
    source: &GameDefinition,
    target: &GameDefinition,
    describe: impl Fn(String) -> BspError,
) -> Result<()> {
    let remap = |what: &str, index: usize, native: i32| {
        target.remap_contents_from(source, native).ok_or_else(|| {
            let contents = source.contents_to_string(&crate::contents::ContentFlags::new(native));
            describe(format!(
                "{what} {index} has {} contents {contents} with no {} equivalent",
                source.name(),
                target.name()
            ))
        })
    };
    for (index, leaf) in generic.leafs.iter_mut().enumerate() {
        leaf.contents = remap("leaf", index, leaf.contents)?;
    }
    for (index, brush) in generic.brushes.iter_mut().enumerate() {
        brush.contents = remap("brush", index, brush.contents)?;
    }
    for info in &mut generic.texinfo {
        info.flags.native = target.remap_surface_from(source, &info.flags);
    }
    generic.game = target.id;
    Ok(())
}

/// Build the target layout from the generic one
fn narrow_to(generic: GenericBsp, target: &'static FormatDescriptor) -> Result<NativeBsp> {
    let hulls = || {
        target
            .lumps
            .get(quake::lump::MODELS)
            .map_or(0, |spec| Model::hulls_for_size(spec.size))
    };
    Ok(match target.layout {
        LayoutKind::Generic => generic.into(),
        LayoutKind::Bsp29 => Bsp29::from_generic(&generic, hulls())?.into(),
        LayoutKind::Bsp2Rmq => Bsp2Rmq::from_generic(&generic, hulls())?.into(),
        LayoutKind::Bsp2 => Bsp2::from_generic(&generic, hulls())?.into(),
        LayoutKind::Q2 => Q2Bsp::from_generic(&generic)?.into(),
        LayoutKind::Qbism => QbismBsp::from_generic(&generic)?.into(),
    })
}

/// Convert `doc` to `target` in place.
///
/// Converting to the current version does nothing. On failure the document
/// is unchanged. Extension lumps are carried over as they are.
pub fn convert_bsp_format(doc: &mut BspDocument, target: &'static FormatDescriptor) -> Result<()> {
    let source = doc.version;
    if source == target {
        return Ok(());
    }
    let native = doc
        .native()
        .ok_or_else(|| unsupported(source, target, "document is empty"))?;
    let path = conversion_path(native.layout(), target.layout)
        .ok_or_else(|| unsupported(source, target, "no conversion rule"))?;
    debug!(
        "Conversion path: {}",
        path.iter().map(|layout| layout.name()).collect::<Vec<_>>().join(" -> ")
    );

    let mut generic = native.to_generic(source.game);
    if let (Some(from), Some(to)) = (GameDefinition::for_id(generic.game), target.game)
        && from != to
    {
        remap_game(&mut generic, from, to, |reason| unsupported(source, target, reason))?;
    }
    let converted = narrow_to(generic, target)?;

    doc.replace_native(target, converted);
    info!("Converted {source} to {target}");
    Ok(())
}

/// Convert `doc` to `target`, moving up the `extended_limits` chain while
/// the conversion fails on limits. Returns the format actually used.
pub fn convert_with_escalation(
    doc: &mut BspDocument,
    target: &'static FormatDescriptor,
) -> Result<&'static FormatDescriptor> {
    let mut current = target;
    loop {
        match convert_bsp_format(doc, current) {
            Ok(()) => return Ok(current),
            Err(e) if e.is_limit_error() => match current.extended_limits {
                Some(wider) => {
                    info!("{current} limits exceeded ({e}), switching to {wider}");
                    current = wider;
                }
                None => return Err(e),
            },
            Err(e) => return Err(e),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::game::quake2::CONTENTS_ORIGIN;
    use crate::layout::quake::{Bsp29Leaf, Bsp29Node};
    use crate::layout::quake2::{Brush, Q2Leaf};
    use crate::version::{BSPVER_BSP2, BSPVER_BSP2RMQ, BSPVER_GENERIC, BSPVER_H2, BSPVER_Q1, BSPVER_Q2, BSPVER_QBISM};

    fn bsp29_doc() -> BspDocument {
        BspDocument::with_native(
            &BSPVER_Q1,
            Bsp29 {
                leafs: vec![Bsp29Leaf {
                    contents: -3,
                    mins: [-16, -16, -16],
                    maxs: [16, 16, 16],
                    ..Bsp29Leaf::default()
                }],
                nodes: vec![Bsp29Node {
                    children: [-1, -1],
                    ..Bsp29Node::default()
                }],
                ..Bsp29::default()
            },
        )
    }

    #[test]
    fn test_conversion_paths() {
        assert_eq!(
            conversion_path(LayoutKind::Bsp29, LayoutKind::Q2),
            Some(vec![LayoutKind::Bsp29, LayoutKind::Generic, LayoutKind::Q2])
        );
        assert_eq!(
            conversion_path(LayoutKind::Generic, LayoutKind::Bsp2),
            Some(vec![LayoutKind::Generic, LayoutKind::Bsp2])
        );
        assert_eq!(
            conversion_path(LayoutKind::Q2, LayoutKind::Q2),
            Some(vec![LayoutKind::Q2])
        );
    }

    #[test]
    fn test_same_version_is_noop() {
        let mut doc = bsp29_doc();
        let before = doc.clone();
        convert_bsp_format(&mut doc, &BSPVER_Q1).expect("Test operation should succeed");
        assert_eq!(doc, before);
    }

    #[test]
    fn test_empty_document_has_no_path() {
        let mut doc = BspDocument::new();
        assert!(matches!(
            convert_bsp_format(&mut doc, &BSPVER_Q1),
            Err(BspError::ConversionUnsupported { .. })
        ));
        assert!(doc.is_empty());
    }

    #[test]
    fn test_widening_chain_matches_direct() {
        let mut chained = bsp29_doc();
        convert_bsp_format(&mut chained, &BSPVER_BSP2RMQ).expect("Test operation should succeed");
        convert_bsp_format(&mut chained, &BSPVER_BSP2).expect("Test operation should succeed");

        let mut direct = bsp29_doc();
        convert_bsp_format(&mut direct, &BSPVER_BSP2).expect("Test operation should succeed");
        assert_eq!(chained, direct);
        assert_eq!(direct.version, &BSPVER_BSP2);
    }

    #[test]
    fn test_quake_to_hexen2_keeps_contents_and_grows_models() {
        let mut doc = bsp29_doc();
        convert_bsp_format(&mut doc, &BSPVER_H2).expect("Test operation should succeed");
        assert_eq!(doc.native().map(NativeBsp::leaf_contents), Some(vec![-3]));
        assert_eq!(doc.version, &BSPVER_H2);
    }

    #[test]
    fn test_quake_water_becomes_quake2_water() {
        let mut doc = bsp29_doc();
        convert_bsp_format(&mut doc, &BSPVER_Q2).expect("Test operation should succeed");
        let contents = doc.native().map(NativeBsp::leaf_contents).expect("document has a layout");
        assert_eq!(contents, vec![crate::game::quake2::CONTENTS_WATER]);
    }

    #[test]
    fn test_origin_brush_has_no_quake_equivalent() {
        let mut doc = BspDocument::with_native(
            &BSPVER_Q2,
            Q2Bsp {
                leafs: vec![Q2Leaf::default()],
                brushes: vec![Brush {
                    contents: CONTENTS_ORIGIN,
                    ..Brush::default()
                }],
                ..Q2Bsp::default()
            },
        );
        let before = doc.clone();
        let err = convert_bsp_format(&mut doc, &BSPVER_Q1).expect_err("origin cannot be stored in Quake");
        assert!(matches!(err, BspError::ConversionUnsupported { .. }));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_escalation_on_overflow() {
        let mut doc = BspDocument::with_native(
            &BSPVER_Q2,
            Q2Bsp {
                leafs: vec![Q2Leaf::default()],
                ..Q2Bsp::default()
            },
        );
        convert_bsp_format(&mut doc, &BSPVER_GENERIC).expect("Test operation should succeed");
        if let Some(NativeBsp::Generic(generic)) = doc.native_mut() {
            generic.leafs[0].cluster = 100_000;
        }

        let mut plain = doc.clone();
        assert!(matches!(
            convert_bsp_format(&mut plain, &BSPVER_Q2),
            Err(BspError::NumericOverflow { .. })
        ));

        let used = convert_with_escalation(&mut doc, &BSPVER_Q2).expect("Test operation should succeed");
        assert_eq!(used, &BSPVER_QBISM);
        assert_eq!(doc.version, &BSPVER_QBISM);
    }
}
