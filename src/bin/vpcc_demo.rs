//! Minimal CLI demo: encodes a synthetic point cloud (a cube's surface)
//! through the codec core using the in-memory lossless video stand-in,
//! then decodes it back and reports how many points survived.

use vpcc_core::geom::{Colour, Point3D, PointCloud};
use vpcc_core::params::{GeneratePointCloudParameters, PatchSegmenterParameters};
use vpcc_core::pipeline::{decode_frame, encode_frame};
use vpcc_core::smoothing::SmoothingScratch;
use vpcc_core::video::LosslessMemorySink;

fn synthetic_cube_surface(size: i32) -> PointCloud {
    let mut cloud = PointCloud::new();
    for x in 0..size {
        for y in 0..size {
            cloud.add(Point3D::new(x, y, 0), Some(Colour::new(180, 90, 40)), None, None);
            cloud.add(Point3D::new(x, y, size - 1), Some(Colour::new(40, 90, 180)), None, None);
        }
    }
    cloud
}

fn main() -> vpcc_core::Result<()> {
    env_logger::init();

    let cloud = synthetic_cube_surface(32);
    log::info!("synthetic cloud has {} points", cloud.len());

    let segmenter_params = PatchSegmenterParameters::default();
    let params = GeneratePointCloudParameters::default();

    let mut sink = LosslessMemorySink::new();
    let (frame, atlas) = encode_frame(&cloud, 0, None, &segmenter_params, &params, None, &mut sink)?;
    println!(
        "encoded {} patches, {} raw points onto a {}x{} canvas",
        frame.patches.len(),
        frame.raw_points.len(),
        atlas.frame_width,
        atlas.frame_height
    );

    let source = sink.into_source();
    let mut scratch = SmoothingScratch::new();
    let decoded = decode_frame(&frame, &source, &params, &mut scratch)?;
    println!("decoded {} points (input had {})", decoded.len(), cloud.len());

    Ok(())
}
