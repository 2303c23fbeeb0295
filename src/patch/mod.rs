//! Patch model (spec §4.2, component C2): projection math, canvas mapping
//! and the 8 orientations a patch can be packed with.

mod orientation;

pub use orientation::PatchOrientation;

use crate::geom::Point3D;

/// One of the 6/10/18 candidate projection planes a point can be assigned
/// to during segmentation (spec §4.3 item 2). Index 0-2 are the primary
/// axis-aligned planes, 3-5 their negated counterparts; 6+ are the
/// diagonal planes used when `OrientationCount::Ten`/`Eighteen` is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectionAxis(pub u8);

impl ProjectionAxis {
    /// Which of x/y/z (0/1/2) this projection reads depth along.
    pub fn depth_axis(&self) -> usize {
        (self.0 % 3) as usize
    }

    /// True if increasing depth along `depth_axis` means increasing the
    /// raw coordinate (as opposed to the negated/"flipped" planes 3-5).
    pub fn is_positive_direction(&self) -> bool {
        self.0 < 3
    }
}

/// Tag distinguishing how a patch's descriptor entry should be decoded
/// relative to neighbouring frames (spec §4.10 item 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchMode {
    /// Fully described in this frame (no reference to another frame).
    Intra,
    /// Copies placement from a matched patch in a reference frame, only
    /// carrying the delta fields (spec §4.4 item 2 patch matching).
    Inter { reference_patch_index: u32 },
}

/// A single projected patch: its placement in 3D space, its footprint on
/// the 2D canvas, and the per-pixel depth/occupancy data recovered during
/// segmentation (spec §4.2).
#[derive(Debug, Clone)]
pub struct Patch {
    pub index: u32,
    pub projection_axis: ProjectionAxis,
    pub orientation: PatchOrientation,
    /// Intra/inter tag set by the packer's cross-frame matching pass
    /// (spec §4.4 item 2); `Intra` until a caller marks it otherwise.
    pub mode: PatchMode,

    /// Patch bounding box size in the patch's own (u,v) frame, before the
    /// orientation transform is applied.
    pub size_u0: usize,
    pub size_v0: usize,
    /// Occupancy-block-granularity placement on the shared canvas.
    pub u0: usize,
    pub v0: usize,
    /// Pixel-granularity placement on the shared canvas (`u0 * occupancy_resolution` plus any sub-block offset).
    pub u1: i32,
    pub v1: i32,
    /// 3D-space tangent/bitangent origin: the minimum tangent and
    /// bitangent coordinates observed when this patch's points were
    /// projected, added back in by [`Patch::generate_point`]. Distinct
    /// from `u1`/`v1`, which place the patch on the 2D canvas.
    pub tangent_offset: i32,
    pub bitangent_offset: i32,
    /// Depth origin: the minimum depth value observed when this patch's
    /// points were projected, subtracted back out when reconstructing 3D.
    pub d1: i32,
    pub depth_d0: Vec<Option<i32>>,
    pub depth_d1: Vec<Option<i32>>,
    pub occupancy: Vec<bool>,
    /// Axis value the depth axis is held at for lossless "plane" patches;
    /// `None` for ordinary patches whose depth varies per pixel.
    pub level_of_detail: u32,
}

impl Patch {
    pub fn new(index: u32, projection_axis: ProjectionAxis, size_u0: usize, size_v0: usize) -> Self {
        let cells = size_u0 * size_v0;
        Self {
            index,
            projection_axis,
            orientation: PatchOrientation::Default,
            mode: PatchMode::Intra,
            size_u0,
            size_v0,
            u0: 0,
            v0: 0,
            u1: 0,
            v1: 0,
            tangent_offset: 0,
            bitangent_offset: 0,
            d1: 0,
            depth_d0: vec![None; cells],
            depth_d1: vec![None; cells],
            occupancy: vec![false; cells],
            level_of_detail: 0,
        }
    }

    /// Patch-frame footprint after the orientation transform is applied,
    /// i.e. the size actually reserved on the shared canvas.
    pub fn oriented_size(&self) -> (usize, usize) {
        if self.orientation.swaps_axes() {
            (self.size_v0, self.size_u0)
        } else {
            (self.size_u0, self.size_v0)
        }
    }

    fn index_of(&self, u: usize, v: usize) -> usize {
        v * self.size_u0 + u
    }

    pub fn occupancy_at(&self, u: usize, v: usize) -> bool {
        self.occupancy[self.index_of(u, v)]
    }

    pub fn set_occupancy(&mut self, u: usize, v: usize, value: bool) {
        let i = self.index_of(u, v);
        self.occupancy[i] = value;
    }

    pub fn depth_d0_at(&self, u: usize, v: usize) -> Option<i32> {
        self.depth_d0[self.index_of(u, v)]
    }

    pub fn set_depth_d0(&mut self, u: usize, v: usize, depth: i32) {
        let i = self.index_of(u, v);
        self.depth_d0[i] = Some(depth);
    }

    pub fn depth_d1_at(&self, u: usize, v: usize) -> Option<i32> {
        self.depth_d1[self.index_of(u, v)]
    }

    pub fn set_depth_d1(&mut self, u: usize, v: usize, depth: i32) {
        let i = self.index_of(u, v);
        self.depth_d1[i] = Some(depth);
    }

    /// Reconstructs the 3D point for patch-local `(u, v)` at the given
    /// depth (spec §4.2 "core operation `generatePoint(u,v,depth)`").
    ///
    /// `u`/`v` are in the un-oriented patch frame (the same frame
    /// `depth_d0`/`depth_d1` are indexed in); the tangent/bitangent axes
    /// are the two axes other than `projection_axis.depth_axis()`, in
    /// increasing axis-index order. `depth` is the patch-relative signed
    /// depth measured from the projection plane, i.e. `d1 + local_depth`
    /// where `local_depth` is the value stored in `depth_d0`/`depth_d1`;
    /// callers reconstructing from stored depth maps must add `d1` back
    /// in before calling this.
    pub fn generate_point(&self, u: usize, v: usize, depth: i32) -> Point3D {
        let depth_axis = self.projection_axis.depth_axis();
        let (tangent_axis, bitangent_axis) = tangent_axes(depth_axis);

        let signed_depth = if self.projection_axis.is_positive_direction() {
            depth
        } else {
            -depth
        };

        let mut p = Point3D::new(0, 0, 0);
        p.set(depth_axis, signed_depth);
        p.set(tangent_axis, self.tangent_offset + u as i32);
        p.set(bitangent_axis, self.bitangent_offset + v as i32);
        p
    }

    /// Patch-local `(u, v)` to shared-canvas pixel coordinates, applying
    /// this patch's orientation and its canvas placement `(u1, v1)`
    /// (spec §4.2 `patch2Canvas`).
    pub fn patch_to_canvas(&self, u: usize, v: usize) -> (i32, i32) {
        let (ou, ov) = self.orientation.apply(u, v, self.size_u0, self.size_v0);
        (self.u1 + ou as i32, self.v1 + ov as i32)
    }

    /// Inverse of [`Patch::patch_to_canvas`]: shared-canvas pixel
    /// coordinates back to patch-local `(u, v)` (spec §4.2 `canvas2Patch`).
    /// Returns `None` if the canvas position falls outside the patch's
    /// oriented bounding box.
    pub fn canvas_to_patch(&self, cx: i32, cy: i32) -> Option<(usize, usize)> {
        let ou = cx - self.u1;
        let ov = cy - self.v1;
        let (osize_u, osize_v) = self.oriented_size();
        if ou < 0 || ov < 0 || ou as usize >= osize_u || ov as usize >= osize_v {
            return None;
        }
        Some(self.orientation.invert(ou as usize, ov as usize, self.size_u0, self.size_v0))
    }

    /// Occupancy-block-granularity version of [`Patch::patch_to_canvas`]
    /// (spec §4.2 `patchBlock2CanvasBlock`): `(u0, v0)` are block indices,
    /// not pixel coordinates.
    pub fn patch_block_to_canvas_block(&self, u0: usize, v0: usize) -> (usize, usize) {
        let block_size_u0 = self.size_u0;
        let block_size_v0 = self.size_v0;
        let (ou, ov) = self.orientation.apply(u0, v0, block_size_u0, block_size_v0);
        (self.u0 + ou, self.v0 + ov)
    }
}

/// Returns the two non-depth axes, in increasing axis-index order, as
/// (tangent, bitangent) — tangent maps to patch-local `u`, bitangent to
/// patch-local `v`.
pub fn tangent_axes(depth_axis: usize) -> (usize, usize) {
    match depth_axis {
        0 => (1, 2),
        1 => (0, 2),
        2 => (0, 1),
        _ => panic!("axis out of range: {depth_axis}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oriented_size_matches_swap_flag() {
        let mut patch = Patch::new(0, ProjectionAxis(0), 4, 7);
        assert_eq!(patch.oriented_size(), (4, 7));
        patch.orientation = PatchOrientation::Swap;
        assert_eq!(patch.oriented_size(), (7, 4));
    }

    #[test]
    fn canvas_round_trip_is_identity_for_every_orientation() {
        let orientations = [
            PatchOrientation::Default,
            PatchOrientation::Rot180,
            PatchOrientation::Mirror,
            PatchOrientation::MRot180,
            PatchOrientation::Swap,
            PatchOrientation::Rot90,
            PatchOrientation::Rot270,
            PatchOrientation::MRot90,
        ];
        for orientation in orientations {
            let mut patch = Patch::new(0, ProjectionAxis(0), 5, 3);
            patch.orientation = orientation;
            patch.u1 = 10;
            patch.v1 = 20;
            for u in 0..5 {
                for v in 0..3 {
                    let (cx, cy) = patch.patch_to_canvas(u, v);
                    let back = patch.canvas_to_patch(cx, cy);
                    assert_eq!(back, Some((u, v)), "orientation {orientation:?} failed at ({u},{v})");
                }
            }
        }
    }

    #[test]
    fn generate_point_places_depth_on_the_projection_axis() {
        let mut patch = Patch::new(0, ProjectionAxis(1), 4, 4);
        patch.u1 = 0;
        patch.v1 = 0;
        let p = patch.generate_point(2, 3, 100);
        assert_eq!(p.y, 100);
        assert_eq!(p.x, 2);
        assert_eq!(p.z, 3);
    }

    #[test]
    fn generate_point_negates_depth_for_flipped_planes() {
        let patch = Patch::new(0, ProjectionAxis(4), 4, 4);
        let p = patch.generate_point(0, 0, 50);
        assert_eq!(p.get(ProjectionAxis(4).depth_axis()), -50);
    }
}
