//! Patch-frame descriptor (spec §4.10, component C10): the per-frame
//! record of every patch, RAW point and EOM point that the external
//! bitstream layer serialises and the reconstruction engine consumes.
//! This crate does not write the bitstream syntax itself (spec §6) — it
//! only owns the in-memory record the syntax layer would serialise.

use crate::geom::{Colour, Point3D};
use crate::patch::Patch;
pub use crate::patch::PatchMode;
use crate::plr::PatchPlrAssignment;
use crate::raw_eom::EomPoint;
use serde::{Deserialize, Serialize};

/// An unpacked RAW point carried alongside patches for this frame (spec
/// §4.8, component C8): a point that segmentation could not place on any
/// patch and that bypasses image-based coding entirely.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPoint {
    pub position: Point3D,
    pub colour: Option<Colour>,
}

/// Sequence-level fields that stay constant across frames (spec §4.10,
/// the atlas-sequence-parameter-set-equivalent fields this crate owns).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtlasParameterSet {
    pub frame_width: usize,
    pub frame_height: usize,
    pub geometry_bit_depth_3d: u32,
    pub occupancy_resolution: usize,
    pub map_count_minus1: usize,
}

/// One frame's worth of patches, RAW points and EOM points — the unit
/// the encoder produces and the decoder consumes per frame (spec §4.10
/// item 1).
#[derive(Debug, Clone)]
pub struct PatchFrame {
    pub frame_index: usize,
    pub patches: Vec<Patch>,
    pub raw_points: Vec<RawPoint>,
    /// Per-patch PLR block assignment (spec §4.6 item 6, component C9),
    /// index-aligned with `patches`; `None` for a patch PLR search never
    /// ran against (e.g. when `enhanced_delta_depth_code` supersedes it).
    pub plr: Vec<Option<PatchPlrAssignment>>,
}

impl PatchFrame {
    pub fn new(frame_index: usize) -> Self {
        Self {
            frame_index,
            patches: Vec::new(),
            raw_points: Vec::new(),
            plr: Vec::new(),
        }
    }

    /// Total number of EOM points recorded across every patch's packed
    /// EOM bitfield in this frame (spec §4.8 item 2).
    pub fn eom_point_count(&self, eom_points: &[EomPoint]) -> usize {
        eom_points.iter().filter(|p| p.frame_index == self.frame_index).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_frame_starts_empty() {
        let frame = PatchFrame::new(3);
        assert_eq!(frame.frame_index, 3);
        assert!(frame.patches.is_empty());
        assert!(frame.raw_points.is_empty());
    }
}
