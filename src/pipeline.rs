//! Top-level encode/decode orchestration (spec §5).
//!
//! Enforces the pipeline's strict phase ordering — segment, then pack,
//! then generate images, then (encoder side) search PLR modes, and the
//! mirrored decode/reconstruct/smooth order on the other side. No phase
//! runs concurrently with another; only the work *inside* a phase is
//! rayon-parallel (spec §5).

use crate::descriptor::{AtlasParameterSet, PatchFrame, RawPoint};
use crate::geom::PointCloud;
use crate::image_gen::{apply_occupancy_precision, generate_geometry, generate_occupancy, texture_from_cloud};
use crate::packer::{match_patches_by_iou, pack, pack_gpa, GpaSubContext, PackingStrategy};
use crate::params::{GeneratePointCloudParameters, PatchSegmenterParameters};
use crate::patch::{Patch, PatchMode};
use crate::plr::search_plr_modes;
use crate::reconstruct::{colour_point_cloud, reconstruct_frame};
use crate::segmenter::segment_with_edd;
use crate::smoothing::{detect_boundary_points, smooth_colour, smooth_geometry_kdtree, SmoothingScratch};
use crate::video::{VideoSink, VideoSource};
use crate::Result;
use log::{debug, info};

/// Encodes one frame of `cloud`: segment into patches, pack onto a
/// shared canvas (matching against `previous_patches` for inter-frame
/// prediction when given), synthesise occupancy/geometry/texture images
/// and hand them to `sink`, running PLR mode search on the packed
/// patches before handoff (spec §5 phase order: segment -> pack ->
/// generate -> PLR).
///
/// `gpa` must be `Some` when `params.global_patch_allocation != 0` (spec
/// §4.4 "packer mode 2"): the caller owns the sub-context across the
/// frames of one sub-GOF and starts a fresh one whenever [`pack_gpa`]
/// reports the sub-context closed.
pub fn encode_frame(
    cloud: &PointCloud,
    frame_index: usize,
    previous_patches: Option<&[Patch]>,
    segmenter_params: &PatchSegmenterParameters,
    params: &GeneratePointCloudParameters,
    gpa: Option<&mut GpaSubContext>,
    sink: &mut dyn VideoSink,
) -> Result<(PatchFrame, AtlasParameterSet)> {
    params.validate()?;

    info!("encoding frame {frame_index}: {} points", cloud.len());

    let segmentation = segment_with_edd(cloud, segmenter_params, params.enhanced_delta_depth_code);
    debug!(
        "frame {frame_index}: {} patches, {} raw points",
        segmentation.patches.len(),
        segmentation.raw_point_indices.len()
    );

    let mut patches = segmentation.patches;
    let (width, height) = if params.global_patch_allocation != 0 {
        let ctx = gpa.expect("global_patch_allocation != 0 requires a GpaSubContext");
        let (w, h, closed) = pack_gpa(ctx, previous_patches, &mut patches, params.minimum_image_width, params.minimum_image_height);
        if closed {
            debug!("frame {frame_index}: GPA sub-context closed after this frame");
        }
        (w, h)
    } else {
        pack(
            &mut patches,
            PackingStrategy::from(params.packing_strategy),
            params.minimum_image_width,
            params.minimum_image_height,
        )
    };

    for patch in &mut patches {
        patch.u1 = patch.u0 as i32;
        patch.v1 = patch.v0 as i32;
    }

    if let Some(previous) = previous_patches {
        for m in match_patches_by_iou(previous, &patches) {
            patches[m.current_index].mode = PatchMode::Inter {
                reference_patch_index: previous[m.previous_index].index,
            };
        }
    }

    // PLR is mutually exclusive with enhanced-delta-depth coding: EDD
    // already packs the intermediate depths into the D1 map, so there is
    // no separate D1 sample left for PLR to shortcut (spec §4.6 items 4/6).
    let plr: Vec<Option<crate::plr::PatchPlrAssignment>> = if params.enhanced_delta_depth_code {
        vec![None; patches.len()]
    } else {
        patches.iter().map(|patch| Some(search_plr_modes(patch, params))).collect()
    };

    let mut occupancy = generate_occupancy(&patches, width, height);
    apply_occupancy_precision(&mut occupancy, params);
    sink.submit_occupancy(frame_index, occupancy)?;

    let geometry_d0 = generate_geometry(&patches, width, height, 0);
    sink.submit_geometry(frame_index, 0, geometry_d0)?;
    if params.map_count_minus1 > 0 {
        let geometry_d1 = generate_geometry(&patches, width, height, 1);
        sink.submit_geometry(frame_index, 1, geometry_d1)?;
    }

    let texture = texture_from_cloud(&patches, width, height, cloud);
    sink.submit_texture(frame_index, texture)?;

    let raw_points: Vec<RawPoint> = segmentation
        .raw_point_indices
        .iter()
        .map(|&i| RawPoint {
            position: cloud.point(i),
            colour: cloud.colour(i),
        })
        .collect();

    let atlas = AtlasParameterSet {
        frame_width: width,
        frame_height: height,
        geometry_bit_depth_3d: params.geometry_bit_depth_3d,
        occupancy_resolution: params.occupancy_resolution,
        map_count_minus1: params.map_count_minus1,
    };

    Ok((
        PatchFrame {
            frame_index,
            patches,
            raw_points,
            plr,
        },
        atlas,
    ))
}

/// Decodes one frame: reconstruct points from `source`'s images, colour
/// them, then run post-projection smoothing (spec §5 phase order:
/// reconstruct -> colour -> smooth).
pub fn decode_frame(
    frame: &PatchFrame,
    source: &dyn VideoSource,
    params: &GeneratePointCloudParameters,
    scratch: &mut SmoothingScratch,
) -> Result<PointCloud> {
    info!("decoding frame {}", frame.frame_index);

    let mut cloud = reconstruct_frame(frame, source, params)?;

    let texture = source.texture(frame.frame_index)?;
    colour_point_cloud(&mut cloud, frame, &texture);

    if params.flag_geometry_smoothing || params.flag_color_smoothing {
        let tree = crate::geom::KdTree::build(cloud.points());
        detect_boundary_points(&cloud, &tree, params, scratch);
        if params.flag_geometry_smoothing {
            smooth_geometry_kdtree(&mut cloud, &tree, params, scratch);
        }
        if params.flag_color_smoothing {
            smooth_colour(&mut cloud, &tree, params, scratch);
        }
    }

    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3D;
    use crate::video::LosslessMemorySink;

    fn flat_plane_cloud() -> PointCloud {
        let mut cloud = PointCloud::new();
        for x in 0..8 {
            for y in 0..8 {
                cloud.add(Point3D::new(x, y, 4), Some(crate::geom::Colour::new(200, 50, 10)), None, None);
            }
        }
        cloud
    }

    #[test]
    fn encode_then_decode_preserves_point_count() {
        let cloud = flat_plane_cloud();
        let segmenter_params = PatchSegmenterParameters {
            min_point_count_per_cc_patch_segmentation: 4,
            ..Default::default()
        };
        let params = GeneratePointCloudParameters {
            map_count_minus1: 0,
            ..Default::default()
        };

        let mut sink = LosslessMemorySink::new();
        let (frame, _atlas) = encode_frame(&cloud, 0, None, &segmenter_params, &params, None, &mut sink).unwrap();
        assert!(!frame.patches.is_empty());

        let source = sink.into_source();
        let mut scratch = SmoothingScratch::new();
        let decoded = decode_frame(&frame, &source, &params, &mut scratch).unwrap();

        assert_eq!(decoded.len(), cloud.len());
    }
}
