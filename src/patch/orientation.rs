//! The 8 patch orientations (spec §4.2).
//!
//! Each orientation is one of the 8 symmetries of a rectangle (the
//! dihedral group D4 acting on a bounding box): 4 that keep the box's
//! `(sizeU0, sizeV0)` footprint, and 4 that rotate it 90°/270° and so
//! swap the two sizes. Every transform is its own exact inverse pair —
//! `apply` followed by `invert` with the same (sizeU0, sizeV0) is the
//! identity.

/// One of the 8 ways a patch's in-patch `(u, v)` grid can be placed on
/// the shared canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchOrientation {
    Default,
    Rot180,
    Mirror,
    MRot180,
    Swap,
    Rot90,
    Rot270,
    MRot90,
}

impl PatchOrientation {
    pub const ALL: [PatchOrientation; 8] = [
        PatchOrientation::Default,
        PatchOrientation::Rot180,
        PatchOrientation::Mirror,
        PatchOrientation::MRot180,
        PatchOrientation::Swap,
        PatchOrientation::Rot90,
        PatchOrientation::Rot270,
        PatchOrientation::MRot90,
    ];

    /// The 6 orientations used when segmentation picks from a reduced
    /// candidate set (spec §4.3 item 2, `OrientationCount::Six`): the 4
    /// non-swapping orientations plus a plain swap and a 180° rotation of
    /// the swap.
    pub const SIX: [PatchOrientation; 6] = [
        PatchOrientation::Default,
        PatchOrientation::Rot180,
        PatchOrientation::Mirror,
        PatchOrientation::MRot180,
        PatchOrientation::Swap,
        PatchOrientation::Rot90,
    ];

    /// Whether this orientation swaps the patch's two bounding-box sizes
    /// — i.e. the patch reserves `(sizeV0, sizeU0)` rather than
    /// `(sizeU0, sizeV0)` of canvas space.
    pub fn swaps_axes(&self) -> bool {
        matches!(
            self,
            PatchOrientation::Swap
                | PatchOrientation::Rot90
                | PatchOrientation::Rot270
                | PatchOrientation::MRot90
        )
    }

    /// Maps patch-local `(u, v)` — in the un-oriented `size_u0 x size_v0`
    /// frame — to this orientation's placement within the oriented
    /// bounding box.
    pub fn apply(&self, u: usize, v: usize, size_u0: usize, size_v0: usize) -> (usize, usize) {
        match self {
            PatchOrientation::Default => (u, v),
            PatchOrientation::Rot180 => (size_u0 - 1 - u, size_v0 - 1 - v),
            PatchOrientation::Mirror => (size_u0 - 1 - u, v),
            PatchOrientation::MRot180 => (u, size_v0 - 1 - v),
            PatchOrientation::Swap => (v, u),
            PatchOrientation::Rot90 => (size_v0 - 1 - v, u),
            PatchOrientation::Rot270 => (v, size_u0 - 1 - u),
            PatchOrientation::MRot90 => (size_v0 - 1 - v, size_u0 - 1 - u),
        }
    }

    /// Inverse of [`PatchOrientation::apply`]: takes oriented-frame
    /// `(ou, ov)` back to patch-local `(u, v)`.
    pub fn invert(&self, ou: usize, ov: usize, size_u0: usize, size_v0: usize) -> (usize, usize) {
        match self {
            PatchOrientation::Default => (ou, ov),
            PatchOrientation::Rot180 => (size_u0 - 1 - ou, size_v0 - 1 - ov),
            PatchOrientation::Mirror => (size_u0 - 1 - ou, ov),
            PatchOrientation::MRot180 => (ou, size_v0 - 1 - ov),
            PatchOrientation::Swap => (ov, ou),
            PatchOrientation::Rot90 => (ov, size_v0 - 1 - ou),
            PatchOrientation::Rot270 => (size_u0 - 1 - ov, ou),
            PatchOrientation::MRot90 => (size_u0 - 1 - ov, size_v0 - 1 - ou),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_orientation_is_its_own_inverse_pair() {
        let (size_u0, size_v0) = (6, 9);
        for orientation in PatchOrientation::ALL {
            for u in 0..size_u0 {
                for v in 0..size_v0 {
                    let (ou, ov) = orientation.apply(u, v, size_u0, size_v0);
                    let (bu, bv) = orientation.invert(ou, ov, size_u0, size_v0);
                    assert_eq!((bu, bv), (u, v), "orientation {orientation:?}");
                }
            }
        }
    }

    #[test]
    fn exactly_four_orientations_swap_axes() {
        let swap_count = PatchOrientation::ALL.iter().filter(|o| o.swaps_axes()).count();
        assert_eq!(swap_count, 4);
    }

    #[test]
    fn swapping_orientations_produce_coordinates_within_swapped_bounds() {
        let (size_u0, size_v0) = (5, 3);
        for orientation in PatchOrientation::ALL.iter().filter(|o| o.swaps_axes()) {
            for u in 0..size_u0 {
                for v in 0..size_v0 {
                    let (ou, ov) = orientation.apply(u, v, size_u0, size_v0);
                    assert!(ou < size_v0, "{orientation:?} ou={ou} size_v0={size_v0}");
                    assert!(ov < size_u0, "{orientation:?} ov={ov} size_u0={size_u0}");
                }
            }
        }
    }
}
