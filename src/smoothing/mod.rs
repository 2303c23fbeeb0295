//! Post-projection smoothing (spec §4.7, component C7): removes
//! projection seams at patch boundaries from both geometry and colour
//! after reconstruction, using per-call scratch buffers rather than
//! shared mutable state (spec §9) so a single `SmoothingScratch` can be
//! reused across frames without reallocating.

use crate::geom::{KdTree, Point3D, PointCloud};
use crate::params::GeneratePointCloudParameters;
use rayon::prelude::*;

/// Reusable scratch buffers for one smoothing pass, sized once per cloud
/// length and reused across frames of the same size (spec §9).
#[derive(Default)]
pub struct SmoothingScratch {
    boundary_flags: Vec<bool>,
    adjusted_positions: Vec<Point3D>,
    adjusted_colours: Vec<Option<crate::geom::Colour>>,
}

impl SmoothingScratch {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_capacity(&mut self, n: usize) {
        self.boundary_flags.clear();
        self.boundary_flags.resize(n, false);
        self.adjusted_positions.clear();
        self.adjusted_positions.resize(n, Point3D::default());
        self.adjusted_colours.clear();
        self.adjusted_colours.resize(n, None);
    }
}

/// Flags points as patch-boundary points when a neighbour within
/// `radius2_boundary_detection` belongs to a different patch (spec §4.7
/// item 1, the gate both geometry and colour smoothing use so interior
/// points are left untouched).
pub fn detect_boundary_points(cloud: &PointCloud, tree: &KdTree, params: &GeneratePointCloudParameters, scratch: &mut SmoothingScratch) {
    scratch.ensure_capacity(cloud.len());
    let radius2 = params.radius2_boundary_detection as i64;
    let flags: Vec<bool> = (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let neighbours = tree.search_radius(cloud.point(i), params.neighbor_count_smoothing, radius2);
            let own_patch = cloud.patch_index(i);
            neighbours.iter().any(|&n| cloud.patch_index(n) != own_patch)
        })
        .collect();
    scratch.boundary_flags = flags;
}

/// Grid-based geometry smoothing (spec §4.7 item 2): each boundary point
/// is replaced by the centroid of the other boundary points whose
/// `grid_size`-quantised cell neighbourhood overlaps it, applied only
/// when the displacement exceeds `threshold_smoothing`.
pub fn smooth_geometry_grid(cloud: &mut PointCloud, params: &GeneratePointCloudParameters, scratch: &mut SmoothingScratch) {
    let grid = params.grid_size.max(1) as i32;
    let mut cells: std::collections::HashMap<(i32, i32, i32), Vec<usize>> = std::collections::HashMap::new();
    for i in 0..cloud.len() {
        if !scratch.boundary_flags[i] {
            continue;
        }
        let p = cloud.point(i);
        let key = (p.x.div_euclid(grid), p.y.div_euclid(grid), p.z.div_euclid(grid));
        cells.entry(key).or_default().push(i);
    }

    for i in 0..cloud.len() {
        scratch.adjusted_positions[i] = cloud.point(i);
    }

    for i in 0..cloud.len() {
        if !scratch.boundary_flags[i] {
            continue;
        }
        let p = cloud.point(i);
        let key = (p.x.div_euclid(grid), p.y.div_euclid(grid), p.z.div_euclid(grid));
        let Some(members) = cells.get(&key) else { continue };
        if members.len() < 2 {
            continue;
        }
        let (mut sx, mut sy, mut sz) = (0i64, 0i64, 0i64);
        for &m in members {
            let q = cloud.point(m);
            sx += q.x as i64;
            sy += q.y as i64;
            sz += q.z as i64;
        }
        let n = members.len() as i64;
        let centroid = Point3D::new((sx / n) as i32, (sy / n) as i32, (sz / n) as i32);
        if (centroid.squared_distance(&p) as f64) > params.threshold_smoothing {
            scratch.adjusted_positions[i] = centroid;
        }
    }

    for i in 0..cloud.len() {
        cloud.set_point(i, scratch.adjusted_positions[i]);
    }
}

/// kd-tree-based geometry smoothing (spec §4.7 item 2 alternate path):
/// replaces each boundary point with the centroid of its
/// `neighbor_count_smoothing` nearest neighbours within
/// `radius2_smoothing`, again gated by `threshold_smoothing`.
pub fn smooth_geometry_kdtree(
    cloud: &mut PointCloud,
    tree: &KdTree,
    params: &GeneratePointCloudParameters,
    scratch: &mut SmoothingScratch,
) {
    let radius2 = params.radius2_smoothing as i64;
    let positions: Vec<Point3D> = (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let p = cloud.point(i);
            if !scratch.boundary_flags[i] {
                return p;
            }
            let neighbours = tree.search_radius(p, params.neighbor_count_smoothing, radius2);
            if neighbours.len() < 2 {
                return p;
            }
            let (mut sx, mut sy, mut sz) = (0i64, 0i64, 0i64);
            for &n in &neighbours {
                let q = cloud.point(n);
                sx += q.x as i64;
                sy += q.y as i64;
                sz += q.z as i64;
            }
            let n = neighbours.len() as i64;
            let centroid = Point3D::new((sx / n) as i32, (sy / n) as i32, (sz / n) as i32);
            if (centroid.squared_distance(&p) as f64) > params.threshold_smoothing {
                centroid
            } else {
                p
            }
        })
        .collect();

    for (i, p) in positions.into_iter().enumerate() {
        cloud.set_point(i, p);
    }
}

/// Colour smoothing (spec §4.7 item 3): each boundary point's colour is
/// blended toward its neighbourhood's average luma-weighted colour when
/// the colour difference exceeds `threshold_color_difference` and the
/// neighbourhood's colour variation is below `threshold_color_variation`
/// — the same "don't smooth across a real colour edge" gate the
/// teacher's heightmap Gaussian blur does not need (depth has no edges
/// to preserve) but colour does.
pub fn smooth_colour(
    cloud: &mut PointCloud,
    tree: &KdTree,
    params: &GeneratePointCloudParameters,
    scratch: &mut SmoothingScratch,
) {
    use crate::geom::Colour;
    let radius2 = params.radius2_color_smoothing as i64;
    let colours: Vec<Option<Colour>> = (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let own = cloud.colour(i);
            if !scratch.boundary_flags[i] || own.is_none() {
                return own;
            }
            let own = own.unwrap();
            let p = cloud.point(i);
            let neighbours = tree.search_radius(p, params.neighbor_count_color_smoothing, radius2);
            let neighbour_colours: Vec<Colour> = neighbours.iter().filter_map(|&n| cloud.colour(n)).collect();
            if neighbour_colours.len() < 2 {
                return Some(own);
            }

            let (mut sr, mut sg, mut sb) = (0u32, 0u32, 0u32);
            for c in &neighbour_colours {
                sr += c.r as u32;
                sg += c.g as u32;
                sb += c.b as u32;
            }
            let n = neighbour_colours.len() as u32;
            let avg = Colour::new((sr / n) as u8, (sg / n) as u8, (sb / n) as u8);

            let variation = neighbour_colours
                .iter()
                .map(|c| (c.luma() - avg.luma()).abs())
                .fold(0.0f64, f64::max);
            let diff = (own.luma() - avg.luma()).abs();

            if diff > params.threshold_color_difference && variation < params.threshold_color_variation {
                Some(avg)
            } else {
                Some(own)
            }
        })
        .collect();

    for (i, c) in colours.into_iter().enumerate() {
        if let Some(c) = c {
            cloud.set_colour(i, c);
        }
    }
}

/// Patch-block filter (spec §4.7 item 4, the `pbf_*` parameters): a
/// simple box filter over each patch's occupancy-block grid, applied
/// `pbf_passes_count` times when `pbf_enable_flag` is set, smoothing
/// block-level occupancy noise before patch reconstruction rather than
/// after, unlike the point-level passes above.
pub fn patch_block_filter(patch: &mut crate::patch::Patch, params: &GeneratePointCloudParameters) {
    if !params.pbf_enable_flag {
        return;
    }
    let (size_u, size_v) = (patch.size_u0, patch.size_v0);
    let threshold = 1u32 << params.pbf_log2_threshold.max(0);
    for _ in 0..params.pbf_passes_count.max(0) {
        let mut next = vec![false; size_u * size_v];
        for v in 0..size_v {
            for u in 0..size_u {
                let mut count = 0u32;
                let half = (params.pbf_filter_size.max(1) / 2) as i32;
                for dv in -half..=half {
                    for du in -half..=half {
                        let (nu, nv) = (u as i32 + du, v as i32 + dv);
                        if nu < 0 || nv < 0 || nu as usize >= size_u || nv as usize >= size_v {
                            continue;
                        }
                        if patch.occupancy_at(nu as usize, nv as usize) {
                            count += 1;
                        }
                    }
                }
                next[v * size_u + u] = count >= threshold;
            }
        }
        for v in 0..size_v {
            for u in 0..size_u {
                patch.set_occupancy(u, v, next[v * size_u + u]);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{Colour, Point3D, PointCloud};

    #[test]
    fn interior_points_are_never_flagged_as_boundary() {
        let mut cloud = PointCloud::new();
        for i in 0..10 {
            cloud.add(Point3D::new(i, 0, 0), None, Some(0), None);
        }
        let tree = KdTree::build(cloud.points());
        let params = GeneratePointCloudParameters::default();
        let mut scratch = SmoothingScratch::new();
        detect_boundary_points(&cloud, &tree, &params, &mut scratch);
        assert!(scratch.boundary_flags.iter().all(|&b| !b));
    }

    #[test]
    fn boundary_between_two_patches_gets_flagged() {
        let mut cloud = PointCloud::new();
        for i in 0..5 {
            cloud.add(Point3D::new(i, 0, 0), None, Some(0), None);
        }
        for i in 5..10 {
            cloud.add(Point3D::new(i, 0, 0), None, Some(1), None);
        }
        let tree = KdTree::build(cloud.points());
        let params = GeneratePointCloudParameters {
            radius2_boundary_detection: 4.0,
            ..Default::default()
        };
        let mut scratch = SmoothingScratch::new();
        detect_boundary_points(&cloud, &tree, &params, &mut scratch);
        assert!(scratch.boundary_flags[4]);
        assert!(scratch.boundary_flags[5]);
        assert!(!scratch.boundary_flags[0]);
    }

    #[test]
    fn colour_smoothing_leaves_non_boundary_colours_alone() {
        let mut cloud = PointCloud::new();
        cloud.add(Point3D::new(0, 0, 0), Some(Colour::new(10, 10, 10)), Some(0), None);
        let tree = KdTree::build(cloud.points());
        let params = GeneratePointCloudParameters::default();
        let mut scratch = SmoothingScratch::new();
        scratch.ensure_capacity(1);
        smooth_colour(&mut cloud, &tree, &params, &mut scratch);
        assert_eq!(cloud.colour(0), Some(Colour::new(10, 10, 10)));
    }
}
