//! Patch segmenter (spec §4.3, component C3).
//!
//! Splits an input point cloud into locally-planar patches: estimate a
//! normal per point, assign each point to the best-matching projection
//! plane, refine that assignment with a neighbourhood-smoothing pass,
//! then extract connected components and fit one patch per component.
//! Points that end up in components too small to form a patch are
//! handed back as RAW points (spec §4.8, component C8).

mod normals;
mod refine;

pub use normals::estimate_normals;
pub use refine::{initial_segmentation, refine_segmentation};

use crate::geom::{KdTree, Point3D, PointCloud};
use crate::params::PatchSegmenterParameters;
use crate::patch::{tangent_axes, Patch, ProjectionAxis};
use std::collections::VecDeque;

/// The 18 unit-length candidate projection directions (spec §4.3 item 2):
/// the 6 axis-aligned directions plus the 12 face-diagonal directions.
/// `OrientationCount::Six`/`Ten` use a prefix of this table.
pub fn candidate_axes(count: crate::params::OrientationCount) -> &'static [ProjectionAxis] {
    use crate::params::OrientationCount::*;
    const SIX: [ProjectionAxis; 6] = [
        ProjectionAxis(0),
        ProjectionAxis(1),
        ProjectionAxis(2),
        ProjectionAxis(3),
        ProjectionAxis(4),
        ProjectionAxis(5),
    ];
    const TEN: [ProjectionAxis; 10] = [
        ProjectionAxis(0),
        ProjectionAxis(1),
        ProjectionAxis(2),
        ProjectionAxis(3),
        ProjectionAxis(4),
        ProjectionAxis(5),
        ProjectionAxis(6),
        ProjectionAxis(7),
        ProjectionAxis(8),
        ProjectionAxis(9),
    ];
    const EIGHTEEN: [ProjectionAxis; 18] = [
        ProjectionAxis(0),
        ProjectionAxis(1),
        ProjectionAxis(2),
        ProjectionAxis(3),
        ProjectionAxis(4),
        ProjectionAxis(5),
        ProjectionAxis(6),
        ProjectionAxis(7),
        ProjectionAxis(8),
        ProjectionAxis(9),
        ProjectionAxis(10),
        ProjectionAxis(11),
        ProjectionAxis(12),
        ProjectionAxis(13),
        ProjectionAxis(14),
        ProjectionAxis(15),
        ProjectionAxis(16),
        ProjectionAxis(17),
    ];
    match count {
        Six => &SIX,
        Ten => &TEN,
        Eighteen => &EIGHTEEN,
    }
}

/// Everything the segmenter produces: fitted patches plus the indices of
/// points that could not be placed in any patch (RAW candidates, spec §4.8).
pub struct SegmentationResult {
    pub patches: Vec<Patch>,
    pub raw_point_indices: Vec<usize>,
}

/// Runs the full segmentation pipeline over `cloud` (spec §4.3), packing
/// each patch's D1 map as a plain maximum depth. Callers running with
/// `enhanced_delta_depth_code` enabled should use [`segment_with_edd`]
/// instead so the D1 map carries a real EDD bitfield.
pub fn segment(cloud: &PointCloud, params: &PatchSegmenterParameters) -> SegmentationResult {
    segment_with_edd(cloud, params, false)
}

/// Same as [`segment`], but when `enhanced_delta_depth_code` is `true`
/// each patch's D1 map packs the 10-bit EDD bitfield (spec §4.3 item 5,
/// §4.8 item 2) of occupied in-between depths instead of a plain maximum
/// depth.
pub fn segment_with_edd(
    cloud: &PointCloud,
    params: &PatchSegmenterParameters,
    enhanced_delta_depth_code: bool,
) -> SegmentationResult {
    if cloud.is_empty() {
        return SegmentationResult {
            patches: Vec::new(),
            raw_point_indices: Vec::new(),
        };
    }

    let tree = KdTree::build(cloud.points());
    let normals = estimate_normals(cloud, &tree, params.nn_normal_estimation);
    let mut labels = initial_segmentation(cloud, &normals, params);
    refine_segmentation(cloud, &tree, &normals, &mut labels, params);

    let components = extract_connected_components(cloud, &tree, &labels, params);

    let mut patches = Vec::new();
    let mut raw_point_indices = Vec::new();
    for component in components {
        if component.len() < params.min_point_count_per_cc_patch_segmentation {
            raw_point_indices.extend(component);
            continue;
        }
        let label = labels[component[0]];
        let patch = fit_patch(
            cloud,
            &component,
            label,
            patches.len() as u32,
            params,
            enhanced_delta_depth_code,
        );
        patches.push(patch);
    }

    SegmentationResult {
        patches,
        raw_point_indices,
    }
}

/// Connected-component extraction over same-label points via BFS on the
/// kd-tree's k-nearest-neighbour adjacency (spec §4.3 item 5).
fn extract_connected_components(
    cloud: &PointCloud,
    tree: &KdTree,
    labels: &[ProjectionAxis],
    params: &PatchSegmenterParameters,
) -> Vec<Vec<usize>> {
    let n = cloud.len();
    let mut visited = vec![false; n];
    let mut components = Vec::new();

    for start in 0..n {
        if visited[start] {
            continue;
        }
        let mut component = Vec::new();
        let mut queue = VecDeque::new();
        queue.push_back(start);
        visited[start] = true;

        while let Some(current) = queue.pop_front() {
            component.push(current);
            let neighbours = tree.search(cloud.point(current), params.max_nn_count_patch_segmentation);
            for neighbour in neighbours {
                if !visited[neighbour] && labels[neighbour].0 == labels[current].0 {
                    visited[neighbour] = true;
                    queue.push_back(neighbour);
                }
            }
        }
        components.push(component);
    }

    components
}

/// Fits one patch to a connected component: bounding box in the
/// projection's (u, v, depth) frame, per-pixel D0/D1 depth maps and
/// occupancy (spec §4.3 item 6, §4.2). When `enhanced_delta_depth_code` is
/// set, the D1 map carries a packed EDD bitfield of every occupied
/// in-between depth (spec §4.3 item 5) instead of the plain farthest
/// depth, since more than one point in the component can project onto the
/// same `(u, v)` when the surface has real thickness.
fn fit_patch(
    cloud: &PointCloud,
    component: &[usize],
    axis: ProjectionAxis,
    index: u32,
    params: &PatchSegmenterParameters,
    enhanced_delta_depth_code: bool,
) -> Patch {
    let depth_axis = axis.depth_axis();
    let (tangent_axis, bitangent_axis) = tangent_axes(depth_axis);

    let mut min_u = i32::MAX;
    let mut min_v = i32::MAX;
    for &i in component {
        let p = cloud.point(i);
        min_u = min_u.min(p.get(tangent_axis));
        min_v = min_v.min(p.get(bitangent_axis));
    }

    let mut max_u = 0usize;
    let mut max_v = 0usize;
    for &i in component {
        let p = cloud.point(i);
        max_u = max_u.max((p.get(tangent_axis) - min_u) as usize);
        max_v = max_v.max((p.get(bitangent_axis) - min_v) as usize);
    }
    // Round the patch's pixel footprint up to a whole number of
    // occupancy blocks, as the packer places patches at block
    // granularity (spec §4.2 "patchBlock2CanvasBlock").
    let resolution = params.occupancy_resolution.max(1);
    let size_u0 = (max_u + 1).div_ceil(resolution) * resolution;
    let size_v0 = (max_v + 1).div_ceil(resolution) * resolution;

    let mut patch = Patch::new(index, axis, size_u0, size_v0);
    patch.tangent_offset = min_u;
    patch.bitangent_offset = min_v;

    let signed_depth = |p: Point3D| -> i32 {
        let raw = p.get(depth_axis);
        if axis.is_positive_direction() {
            raw
        } else {
            -raw
        }
    };

    let mut min_depth = i32::MAX;
    for &i in component {
        min_depth = min_depth.min(signed_depth(cloud.point(i)));
    }
    patch.d1 = min_depth;

    let mut depths_at: Vec<Vec<i32>> = vec![Vec::new(); size_u0 * size_v0];
    for &i in component {
        let p = cloud.point(i);
        let u = (p.get(tangent_axis) - min_u) as usize;
        let v = (p.get(bitangent_axis) - min_v) as usize;
        let depth = signed_depth(p) - min_depth;

        patch.set_occupancy(u, v, true);
        depths_at[v * size_u0 + u].push(depth);
    }

    for v in 0..size_v0 {
        for u in 0..size_u0 {
            let depths = &depths_at[v * size_u0 + u];
            let Some(&d0) = depths.iter().min() else {
                continue;
            };
            patch.set_depth_d0(u, v, d0);

            if enhanced_delta_depth_code {
                let mut deltas: Vec<u32> = depths
                    .iter()
                    .map(|&d| d - d0)
                    .filter(|&delta| delta > 0 && delta <= crate::raw_eom::MAX_EDD_DELTA as i32)
                    .map(|delta| delta as u32)
                    .collect();
                deltas.sort_unstable();
                deltas.dedup();
                let bits = crate::raw_eom::pack_edd_bitfield(&deltas).unwrap_or(0);
                patch.set_depth_d1(u, v, bits as i32);
            } else {
                let d1 = depths.iter().max().copied().unwrap_or(d0);
                patch.set_depth_d1(u, v, d1);
            }
        }
    }

    patch
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::PointCloud;

    fn flat_plane_cloud() -> PointCloud {
        let mut cloud = PointCloud::new();
        for x in 0..8 {
            for y in 0..8 {
                cloud.add_point(Point3D::new(x, y, 5));
            }
        }
        cloud
    }

    #[test]
    fn segments_a_flat_plane_into_a_single_patch() {
        let cloud = flat_plane_cloud();
        let params = PatchSegmenterParameters {
            occupancy_resolution: 16,
            min_point_count_per_cc_patch_segmentation: 4,
            ..Default::default()
        };
        let result = segment(&cloud, &params);
        assert_eq!(result.patches.len(), 1);
        assert!(result.raw_point_indices.is_empty());
        assert_eq!(result.patches[0].projection_axis.depth_axis(), 2);
    }

    #[test]
    fn empty_cloud_yields_no_patches() {
        let cloud = PointCloud::new();
        let result = segment(&cloud, &PatchSegmenterParameters::default());
        assert!(result.patches.is_empty());
        assert!(result.raw_point_indices.is_empty());
    }
}
