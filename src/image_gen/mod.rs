//! Image generator (spec §4.5, component C5): synthesises the
//! occupancy, geometry and texture sample planes handed to the external
//! video codec from packed patches.

pub mod dilation;

use crate::geom::{Colour, PointCloud};
use crate::params::GeneratePointCloudParameters;
use crate::patch::Patch;
use crate::video::Plane;

/// Renders the binary occupancy map: one bit (stored as `0`/`255`) per
/// pixel marking whether that canvas position holds a projected point
/// (spec §4.5 item 1).
pub fn generate_occupancy(patches: &[Patch], width: usize, height: usize) -> Plane<u8, 1> {
    let mut plane = Plane::new(width, height);
    for patch in patches {
        let (size_u, size_v) = patch.oriented_size();
        for ou in 0..size_u {
            for ov in 0..size_v {
                let (cx, cy) = (patch.u1 + ou as i32, patch.v1 + ov as i32);
                let Some((pu, pv)) = patch.canvas_to_patch(cx, cy) else {
                    continue;
                };
                if patch.occupancy_at(pu, pv) && cx >= 0 && cy >= 0 && (cx as usize) < width && (cy as usize) < height {
                    plane.set(cx as usize, cy as usize, 0, 255);
                }
            }
        }
    }
    plane
}

/// Renders the D0 (and, for two-map-layer configurations, D1) geometry
/// image: each occupied pixel carries the absolute depth value
/// `patch.d1 + local_depth` (spec §4.5 item 2).
pub fn generate_geometry(
    patches: &[Patch],
    width: usize,
    height: usize,
    map_index: usize,
) -> Plane<u16, 1> {
    let mut plane = Plane::new(width, height);
    for patch in patches {
        let (size_u, size_v) = patch.oriented_size();
        for ou in 0..size_u {
            for ov in 0..size_v {
                let Some((pu, pv)) = patch.canvas_to_patch(patch.u1 + ou as i32, patch.v1 + ov as i32) else {
                    continue;
                };
                if !patch.occupancy_at(pu, pv) {
                    continue;
                }
                let local_depth = if map_index == 0 {
                    patch.depth_d0_at(pu, pv)
                } else {
                    patch.depth_d1_at(pu, pv).or_else(|| patch.depth_d0_at(pu, pv))
                };
                let Some(local_depth) = local_depth else { continue };
                let absolute_depth = (patch.d1 + local_depth).max(0) as u16;
                let (cx, cy) = (patch.u1 + ou as i32, patch.v1 + ov as i32);
                if cx >= 0 && cy >= 0 && (cx as usize) < width && (cy as usize) < height {
                    plane.set(cx as usize, cy as usize, 0, absolute_depth);
                }
            }
        }
    }
    plane
}

/// Renders the texture image: each occupied pixel carries the colour of
/// the point that produced it (spec §4.5 item 3). Points are looked up
/// by reconstructing the 3D position at `(u, v, d0)` and matching it
/// back to the nearest cloud point's colour; the pipeline supplies the
/// cloud via `colour_lookup`.
pub fn generate_texture(
    patches: &[Patch],
    width: usize,
    height: usize,
    colour_lookup: impl Fn(&Patch, usize, usize) -> Option<Colour>,
) -> Plane<u8, 3> {
    let mut plane = Plane::new(width, height);
    for patch in patches {
        let (size_u, size_v) = patch.oriented_size();
        for ou in 0..size_u {
            for ov in 0..size_v {
                let Some((pu, pv)) = patch.canvas_to_patch(patch.u1 + ou as i32, patch.v1 + ov as i32) else {
                    continue;
                };
                if !patch.occupancy_at(pu, pv) {
                    continue;
                }
                let Some(colour) = colour_lookup(patch, pu, pv) else { continue };
                let (cx, cy) = (patch.u1 + ou as i32, patch.v1 + ov as i32);
                if cx >= 0 && cy >= 0 && (cx as usize) < width && (cy as usize) < height {
                    plane.set(cx as usize, cy as usize, 0, colour.r);
                    plane.set(cx as usize, cy as usize, 1, colour.g);
                    plane.set(cx as usize, cy as usize, 2, colour.b);
                }
            }
        }
    }
    plane
}

/// Assigns patch colours from a reconstructed-adjacent cloud by nearest
/// D0 point, a convenience wrapper around [`generate_texture`] for
/// callers that have a flat point/colour cloud rather than a custom
/// lookup (spec §4.5 item 3, "patch colour subsampling").
pub fn texture_from_cloud(patches: &[Patch], width: usize, height: usize, cloud: &PointCloud) -> Plane<u8, 3> {
    use crate::geom::KdTree;
    let tree = KdTree::build(cloud.points());
    generate_texture(patches, width, height, |patch, pu, pv| {
        let depth = patch.depth_d0_at(pu, pv)?;
        let query = patch.generate_point(pu, pv, patch.d1 + depth);
        let nearest = tree.search(query, 1);
        nearest.first().and_then(|&i| cloud.colour(i))
    })
}

/// Applies `params.occupancy_precision`: the occupancy map is encoded at
/// coarser granularity than full resolution, so the synthesised plane is
/// first downsampled then upsampled back with nearest-neighbour hold,
/// matching the lossy occupancy precision reduction (spec §4.5 item 1).
pub fn apply_occupancy_precision(plane: &mut Plane<u8, 1>, params: &GeneratePointCloudParameters) {
    let precision = params.occupancy_precision.max(1);
    for by in (0..plane.height).step_by(precision) {
        for bx in (0..plane.width).step_by(precision) {
            let mut any = false;
            for y in by..(by + precision).min(plane.height) {
                for x in bx..(bx + precision).min(plane.width) {
                    if *plane.get(x, y, 0) != 0 {
                        any = true;
                    }
                }
            }
            let value = if any { 255 } else { 0 };
            for y in by..(by + precision).min(plane.height) {
                for x in bx..(bx + precision).min(plane.width) {
                    plane.set(x, y, 0, value);
                }
            }
        }
    }
}
