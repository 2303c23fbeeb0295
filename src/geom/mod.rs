//! Geometry primitives (spec §4.1, component C1).
//!
//! Points, colours, the point cloud container, a static kd-tree for
//! nearest-neighbour queries, and Morton ordering for RAW point sorting.

mod kdtree;
mod morton;
mod point;

pub use kdtree::KdTree;
pub use morton::morton_encode;
pub use point::{BoundingBox, Colour, Point3D, PointCloud, PointKind};
