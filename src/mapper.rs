// mapper.rs — rotation angle to (image index, offset angle)

use serde::Deserialize;
use std::f64::consts::TAU;
use std::num::NonZeroUsize;

/// How the residual angle is reported once the rounded slot wraps back to 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OffsetPolicy {
    /// `normalized - slot * index`, exactly. Close to a full turn the index
    /// wraps to 0 but the offset stays near 2π.
    Raw,
    /// Offset folded into `(-slot/2, slot/2]`, continuous across the wrap.
    #[default]
    Centered,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedView {
    pub image_index: usize,
    pub offset_angle: f64,
}

impl ResolvedView {
    pub const FRONT: ResolvedView = ResolvedView {
        image_index: 0,
        offset_angle: 0.0,
    };
}

/// Angular width of one slot for `count` images.
pub fn slot_width(count: NonZeroUsize) -> f64 {
    TAU / count.get() as f64
}

/// Reduce any finite angle into `[0, 2π)`.
pub fn normalize_angle(angle: f64) -> f64 {
    let n = ((angle % TAU) + TAU) % TAU;
    // (-tiny % TAU) + TAU rounds to exactly TAU
    if n >= TAU {
        0.0
    } else {
        n
    }
}

/// Map an unbounded rotation angle onto one of `count` equally spaced images.
///
/// The index rounds to the nearest slot center, so the switch between two
/// images happens halfway between their centers. The function is pure: the
/// result depends on `angle`, `count` and `policy` only.
pub fn resolve_view(angle: f64, count: NonZeroUsize, policy: OffsetPolicy) -> ResolvedView {
    let n = count.get();
    let slot = slot_width(count);
    let normalized = normalize_angle(angle);

    let rounded = (normalized / slot + 0.5).floor();
    let image_index = if rounded.is_finite() && rounded >= 0.0 {
        (rounded as usize) % n
    } else {
        0
    };

    let offset_angle = match policy {
        OffsetPolicy::Raw => normalized - slot * image_index as f64,
        // measured from the unwrapped slot, so slot N (== slot 0) gives a
        // small negative residual instead of one near 2π
        OffsetPolicy::Centered => normalized - slot * rounded.max(0.0),
    };

    ResolvedView {
        image_index,
        offset_angle,
    }
}
