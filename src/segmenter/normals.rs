//! Per-point normal estimation (spec §4.3 item 1).
//!
//! Parallelised with rayon over each point's k-nearest-neighbour patch,
//! matching the teacher's `heightmap.rs` use of `par_chunks`/`par_iter`
//! for independent per-element work with a read-only shared kd-tree.

use crate::geom::{KdTree, PointCloud, Vector3D};
use rayon::prelude::*;

/// Estimates a unit normal per point via PCA over its k nearest
/// neighbours (smallest-eigenvalue eigenvector of the local covariance).
/// Degenerate neighbourhoods (fewer than 3 distinct points) fall back to
/// the +Z direction.
pub fn estimate_normals(cloud: &PointCloud, tree: &KdTree, k: usize) -> Vec<Vector3D> {
    (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let p = cloud.point(i);
            let neighbours = tree.search(p, k.max(3));
            if neighbours.len() < 3 {
                return Vector3D::new(0.0, 0.0, 1.0);
            }

            let n = neighbours.len() as f64;
            let mut centroid = (0.0, 0.0, 0.0);
            for &idx in &neighbours {
                let q = cloud.point(idx);
                centroid.0 += q.x as f64;
                centroid.1 += q.y as f64;
                centroid.2 += q.z as f64;
            }
            centroid = (centroid.0 / n, centroid.1 / n, centroid.2 / n);

            let mut cov = [[0.0f64; 3]; 3];
            for &idx in &neighbours {
                let q = cloud.point(idx);
                let d = [
                    q.x as f64 - centroid.0,
                    q.y as f64 - centroid.1,
                    q.z as f64 - centroid.2,
                ];
                for a in 0..3 {
                    for b in 0..3 {
                        cov[a][b] += d[a] * d[b];
                    }
                }
            }

            smallest_eigenvector(cov)
        })
        .collect()
}

/// Power iteration on `(trace(cov) * I - cov)` to recover the
/// eigenvector of `cov`'s *smallest* eigenvalue (the surface normal
/// direction of a roughly-planar neighbourhood) without a full
/// eigendecomposition.
fn smallest_eigenvector(cov: [[f64; 3]; 3]) -> Vector3D {
    let trace = cov[0][0] + cov[1][1] + cov[2][2];
    let shifted = {
        let mut m = [[0.0f64; 3]; 3];
        for a in 0..3 {
            for b in 0..3 {
                m[a][b] = if a == b { trace - cov[a][b] } else { -cov[a][b] };
            }
        }
        m
    };

    let mut v = Vector3D::new(1.0, 1.0, 1.0).normalized();
    for _ in 0..32 {
        let mv = Vector3D::new(
            shifted[0][0] * v.x + shifted[0][1] * v.y + shifted[0][2] * v.z,
            shifted[1][0] * v.x + shifted[1][1] * v.y + shifted[1][2] * v.z,
            shifted[2][0] * v.x + shifted[2][1] * v.y + shifted[2][2] * v.z,
        );
        if mv.norm() < 1e-12 {
            break;
        }
        v = mv.normalized();
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Point3D;

    #[test]
    fn flat_xy_plane_yields_z_aligned_normals() {
        let mut cloud = PointCloud::new();
        for x in 0..6 {
            for y in 0..6 {
                cloud.add_point(Point3D::new(x, y, 0));
            }
        }
        let tree = KdTree::build(cloud.points());
        let normals = estimate_normals(&cloud, &tree, 8);
        for n in normals {
            assert!(n.z.abs() > 0.9, "expected z-dominant normal, got {n:?}");
        }
    }
}
