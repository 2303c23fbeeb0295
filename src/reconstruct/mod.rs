//! Reconstruction engine (spec §4.6, component C6): rebuilds a 3D point
//! cloud from decoded occupancy/geometry/texture images plus the
//! patch-frame descriptor that placed them.

use crate::descriptor::PatchFrame;
use crate::geom::{Colour, PointCloud, PointKind};
use crate::image_gen::apply_occupancy_precision;
use crate::params::GeneratePointCloudParameters;
use crate::patch::Patch;
use crate::plr::PatchPlrAssignment;
use crate::raw_eom::unpack_edd_bitfield;
use crate::video::{Plane, VideoSource};
use crate::Result;

/// Reconstructs one frame's point cloud from `source` using the patches
/// recorded in `frame` (spec §4.6 items 1-2: D0/D1 point generation and
/// EDD-bitfield expansion when enabled).
pub fn reconstruct_frame(
    frame: &PatchFrame,
    source: &dyn VideoSource,
    params: &GeneratePointCloudParameters,
) -> Result<PointCloud> {
    let occupancy = source.occupancy(frame.frame_index)?;
    let geometry_d0 = source.geometry(frame.frame_index, 0)?;
    let geometry_d1 = if params.map_count_minus1 > 0 {
        Some(source.geometry(frame.frame_index, 1)?)
    } else {
        None
    };

    let mut cloud = PointCloud::new();

    for (i, patch) in frame.patches.iter().enumerate() {
        let plr = frame.plr.get(i).and_then(|p| p.as_ref());
        reconstruct_patch(patch, plr, &occupancy, &geometry_d0, geometry_d1.as_ref(), params, &mut cloud);
    }

    for raw in &frame.raw_points {
        cloud.add(raw.position, raw.colour, None, Some(PointKind::Raw));
    }

    Ok(cloud)
}

fn reconstruct_patch(
    patch: &Patch,
    plr: Option<&PatchPlrAssignment>,
    occupancy: &Plane<u8, 1>,
    geometry_d0: &Plane<u16, 1>,
    geometry_d1: Option<&Plane<u16, 1>>,
    params: &GeneratePointCloudParameters,
    cloud: &mut PointCloud,
) {
    let (size_u, size_v) = patch.oriented_size();
    for ou in 0..size_u {
        for ov in 0..size_v {
            let cx = patch.u1 + ou as i32;
            let cy = patch.v1 + ov as i32;
            if cx < 0 || cy < 0 || cx as usize >= occupancy.width || cy as usize >= occupancy.height {
                continue;
            }
            if *occupancy.get(cx as usize, cy as usize, 0) == 0 {
                continue;
            }
            let Some((pu, pv)) = patch.canvas_to_patch(cx, cy) else {
                continue;
            };

            let absolute_d0 = *geometry_d0.get(cx as usize, cy as usize, 0) as i32;
            let local_d0 = absolute_d0 - patch.d1;
            let d0_point = patch.generate_point(pu, pv, patch.d1 + local_d0);
            cloud.add(d0_point, None, Some(patch.index), Some(PointKind::D0));

            if params.enhanced_delta_depth_code {
                expand_edd(patch, pu, pv, local_d0, cloud);
                continue;
            }

            let mode = plr.map(|assignment| assignment.mode_at(pu / assignment.block_size, pv / assignment.block_size));

            if let Some(mode) = mode.filter(|m| m.interpolate) {
                if mode.fill {
                    for delta in 1..mode.min_d1 as i32 {
                        let point = patch.generate_point(pu, pv, patch.d1 + local_d0 + delta);
                        cloud.add(point, None, Some(patch.index), Some(PointKind::Df));
                    }
                }
                let local_d1 = local_d0 + mode.min_d1 as i32;
                if mode.min_d1 > 0 {
                    let d1_point = patch.generate_point(pu, pv, patch.d1 + local_d1);
                    cloud.add(d1_point, None, Some(patch.index), Some(PointKind::D1));
                }
            } else if let Some(geometry_d1) = geometry_d1 {
                let absolute_d1 = *geometry_d1.get(cx as usize, cy as usize, 0) as i32;
                let local_d1 = if params.absolute_d1 {
                    absolute_d1 - patch.d1
                } else {
                    local_d0 + absolute_d1
                };
                if local_d1 != local_d0 {
                    let d1_point = patch.generate_point(pu, pv, patch.d1 + local_d1);
                    cloud.add(d1_point, None, Some(patch.index), Some(PointKind::D1));
                }
            }
        }
    }
}

/// Expands an enhanced-delta-depth bitfield into extra points between D0
/// and D0+10 (spec §4.6 item 2, §4.8 component C8's EDD bitcount limit).
/// The bitfield itself travels out of band in the patch-frame descriptor
/// (`Patch::depth_d1` doubling as the packed EDD word when this mode is
/// active, written by `segmenter::segment_with_edd`).
fn expand_edd(patch: &Patch, pu: usize, pv: usize, local_d0: i32, cloud: &mut PointCloud) {
    let Some(edd_bits) = patch.depth_d1_at(pu, pv) else {
        return;
    };
    for delta in unpack_edd_bitfield(edd_bits as u32) {
        let point = patch.generate_point(pu, pv, patch.d1 + local_d0 + delta as i32);
        cloud.add(point, None, Some(patch.index), Some(PointKind::Edd));
    }
}

/// Paints reconstructed points with colour sampled from the decoded
/// texture image at the same canvas position (spec §4.6 item 3), one
/// video-codec collaborator call per frame (spec §6).
pub fn colour_point_cloud(cloud: &mut PointCloud, frame: &PatchFrame, texture: &Plane<u8, 3>) {
    for (i, &patch_index) in (0..cloud.len())
        .filter_map(|i| cloud.patch_index(i).map(|idx| (i, idx)))
        .collect::<Vec<_>>()
    {
        let Some(patch) = frame.patches.iter().find(|p| p.index == patch_index) else {
            continue;
        };
        let point = cloud.point(i);
        let depth_axis = patch.projection_axis.depth_axis();
        let (tangent_axis, bitangent_axis) = crate::patch::tangent_axes(depth_axis);
        let u = (point.get(tangent_axis) - patch.tangent_offset) as usize;
        let v = (point.get(bitangent_axis) - patch.bitangent_offset) as usize;
        let (cx, cy) = patch.patch_to_canvas(u, v);
        if cx >= 0 && cy >= 0 && (cx as usize) < texture.width && (cy as usize) < texture.height {
            let colour = Colour::new(
                *texture.get(cx as usize, cy as usize, 0),
                *texture.get(cx as usize, cy as usize, 1),
                *texture.get(cx as usize, cy as usize, 2),
            );
            cloud.set_colour(i, colour);
        }
    }
}

/// Applies the occupancy-precision quantisation the encoder would have
/// applied before handing the occupancy map to the video codec,
/// restoring the exact occupancy map that [`reconstruct_frame`] expects
/// when a caller only has the raw per-pixel map — useful for decoder
/// test doubles that skip the real video codec.
pub fn requantize_occupancy(occupancy: &mut Plane<u8, 1>, params: &GeneratePointCloudParameters) {
    apply_occupancy_precision(occupancy, params);
}
