//! Patch projection/reconstruction integration tests (spec §8 property 2:
//! every occupied patch pixel reconstructs to the exact 3D point that
//! produced it).

use vpcc_core::geom::{Point3D, PointCloud};
use vpcc_core::params::PatchSegmenterParameters;
use vpcc_core::segmenter::segment;

#[test]
fn segmented_patch_points_regenerate_their_own_positions() {
    let mut cloud = PointCloud::new();
    for x in 0..10 {
        for y in 0..10 {
            cloud.add_point(Point3D::new(x, y, 42));
        }
    }

    let params = PatchSegmenterParameters {
        min_point_count_per_cc_patch_segmentation: 4,
        ..Default::default()
    };
    let result = segment(&cloud, &params);
    assert_eq!(result.patches.len(), 1);
    let patch = &result.patches[0];

    for x in 0..10 {
        for y in 0..10 {
            let u = (x - patch.tangent_offset) as usize;
            let v = (y - patch.bitangent_offset) as usize;
            assert!(patch.occupancy_at(u, v));
            let local_d0 = patch.depth_d0_at(u, v).unwrap();
            let reconstructed = patch.generate_point(u, v, patch.d1 + local_d0);
            assert_eq!(reconstructed, Point3D::new(x, y, 42));
        }
    }
}

#[test]
fn patches_on_opposite_faces_use_opposite_depth_signs() {
    let mut cloud = PointCloud::new();
    for x in 0..8 {
        for y in 0..8 {
            cloud.add_point(Point3D::new(x, y, 0));
        }
    }
    let params = PatchSegmenterParameters {
        min_point_count_per_cc_patch_segmentation: 4,
        ..Default::default()
    };
    let result = segment(&cloud, &params);
    assert_eq!(result.patches.len(), 1);
    // A flat plane at z=0 with outward normal +z projects along axis 2
    // (positive direction); depth recorded should be non-negative.
    assert!(result.patches[0].d1 >= 0);
}
