//! Encode/decode round-trip property tests (spec §8 property 1): a
//! lossless geometry configuration through the in-memory video stand-in
//! should preserve the input point cloud as a multiset.

use vpcc_core::geom::{Colour, Point3D, PointCloud};
use vpcc_core::params::{GeneratePointCloudParameters, PatchSegmenterParameters};
use vpcc_core::pipeline::{decode_frame, encode_frame};
use vpcc_core::smoothing::SmoothingScratch;
use vpcc_core::video::LosslessMemorySink;

fn flat_plane(size: i32, z: i32) -> PointCloud {
    let mut cloud = PointCloud::new();
    for x in 0..size {
        for y in 0..size {
            cloud.add(Point3D::new(x, y, z), Some(Colour::new(10, 20, 30)), None, None);
        }
    }
    cloud
}

#[test]
fn flat_plane_round_trips_with_matching_point_count() {
    let cloud = flat_plane(16, 8);
    let segmenter_params = PatchSegmenterParameters {
        min_point_count_per_cc_patch_segmentation: 4,
        ..Default::default()
    };
    let params = GeneratePointCloudParameters {
        map_count_minus1: 0,
        flag_geometry_smoothing: false,
        flag_color_smoothing: false,
        ..Default::default()
    };

    let mut sink = LosslessMemorySink::new();
    let (frame, _atlas) = encode_frame(&cloud, 0, None, &segmenter_params, &params, None, &mut sink).unwrap();
    let source = sink.into_source();
    let mut scratch = SmoothingScratch::new();
    let decoded = decode_frame(&frame, &source, &params, &mut scratch).unwrap();

    assert_eq!(decoded.len(), cloud.len());
}

#[test]
fn two_disjoint_planes_each_become_their_own_patch() {
    let mut cloud = flat_plane(16, 0);
    let far_plane = flat_plane(16, 200);
    for i in 0..far_plane.len() {
        cloud.add(far_plane.point(i), far_plane.colour(i), None, None);
    }

    let segmenter_params = PatchSegmenterParameters {
        min_point_count_per_cc_patch_segmentation: 4,
        ..Default::default()
    };
    let params = GeneratePointCloudParameters {
        map_count_minus1: 0,
        flag_geometry_smoothing: false,
        flag_color_smoothing: false,
        ..Default::default()
    };

    let mut sink = LosslessMemorySink::new();
    let (frame, _atlas) = encode_frame(&cloud, 0, None, &segmenter_params, &params, None, &mut sink).unwrap();

    assert_eq!(frame.patches.len(), 2);
}
