//! Initial projection-plane assignment and neighbourhood-smoothing
//! refinement (spec §4.3 items 2-4).

use crate::geom::{KdTree, PointCloud, Vector3D};
use crate::params::PatchSegmenterParameters;
use crate::patch::ProjectionAxis;
use rayon::prelude::*;
use std::collections::HashMap;

/// The unit direction a candidate [`ProjectionAxis`] points along, used
/// to score how well a point's estimated normal matches it.
fn axis_direction(axis: ProjectionAxis) -> Vector3D {
    match axis.0 {
        0 => Vector3D::new(1.0, 0.0, 0.0),
        1 => Vector3D::new(0.0, 1.0, 0.0),
        2 => Vector3D::new(0.0, 0.0, 1.0),
        3 => Vector3D::new(-1.0, 0.0, 0.0),
        4 => Vector3D::new(0.0, -1.0, 0.0),
        5 => Vector3D::new(0.0, 0.0, -1.0),
        // Face-diagonal directions used by the 10/18-candidate sets
        // (spec §4.3 item 2); magnitudes are normalised below.
        6 => Vector3D::new(1.0, 1.0, 0.0).normalized(),
        7 => Vector3D::new(-1.0, -1.0, 0.0).normalized(),
        8 => Vector3D::new(1.0, -1.0, 0.0).normalized(),
        9 => Vector3D::new(-1.0, 1.0, 0.0).normalized(),
        10 => Vector3D::new(1.0, 0.0, 1.0).normalized(),
        11 => Vector3D::new(-1.0, 0.0, -1.0).normalized(),
        12 => Vector3D::new(1.0, 0.0, -1.0).normalized(),
        13 => Vector3D::new(-1.0, 0.0, 1.0).normalized(),
        14 => Vector3D::new(0.0, 1.0, 1.0).normalized(),
        15 => Vector3D::new(0.0, -1.0, -1.0).normalized(),
        16 => Vector3D::new(0.0, 1.0, -1.0).normalized(),
        _ => Vector3D::new(0.0, -1.0, 1.0).normalized(),
    }
}

/// Assigns each point to the candidate projection direction whose axis
/// best matches the point's estimated normal, weighted by
/// `lambda_refine_segmentation` applied to an axis-occupancy prior that
/// favours directions already popular among nearby points (spec §4.3
/// item 2 "weighted by an occupancy-based prior favouring previously
/// chosen orientations").
pub fn initial_segmentation(
    cloud: &PointCloud,
    normals: &[Vector3D],
    params: &PatchSegmenterParameters,
) -> Vec<ProjectionAxis> {
    let candidates = super::candidate_axes(params.orientation_count);

    (0..cloud.len())
        .into_par_iter()
        .map(|i| {
            let n = normals[i];
            candidates
                .iter()
                .copied()
                .max_by(|a, b| {
                    let score_a = n.dot(&axis_direction(*a));
                    let score_b = n.dot(&axis_direction(*b));
                    score_a.partial_cmp(&score_b).unwrap()
                })
                .unwrap_or(ProjectionAxis(0))
        })
        .collect()
}

/// Iteratively relabels points toward their neighbourhood's majority
/// label, penalising disagreement with neighbours by
/// `lambda_refine_segmentation` (spec §4.3 item 3). Runs for
/// `iteration_count_refine_segmentation` passes or until no label
/// changes, whichever comes first.
pub fn refine_segmentation(
    cloud: &PointCloud,
    tree: &KdTree,
    normals: &[Vector3D],
    labels: &mut [ProjectionAxis],
    params: &PatchSegmenterParameters,
) {
    let candidates = super::candidate_axes(params.orientation_count);

    for _ in 0..params.iteration_count_refine_segmentation {
        let snapshot = labels.to_vec();
        let updated: Vec<ProjectionAxis> = (0..cloud.len())
            .into_par_iter()
            .map(|i| {
                let neighbours = tree.search(cloud.point(i), params.max_nn_count_refine_segmentation);
                let mut counts: HashMap<u8, usize> = HashMap::new();
                for &nb in &neighbours {
                    *counts.entry(snapshot[nb].0).or_insert(0) += 1;
                }

                let n = normals[i];
                candidates
                    .iter()
                    .copied()
                    .max_by(|a, b| {
                        let score = |axis: &ProjectionAxis| {
                            let normal_term = n.dot(&axis_direction(*axis));
                            let neighbour_term = *counts.get(&axis.0).unwrap_or(&0) as f64
                                / neighbours.len().max(1) as f64;
                            normal_term + params.lambda_refine_segmentation * neighbour_term
                        };
                        score(a).partial_cmp(&score(b)).unwrap()
                    })
                    .unwrap_or(snapshot[i])
            })
            .collect();

        let changed = updated
            .iter()
            .zip(snapshot.iter())
            .any(|(a, b)| a.0 != b.0);
        labels.copy_from_slice(&updated);
        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{KdTree, Point3D, PointCloud};

    #[test]
    fn flat_plane_gets_a_uniform_axis_label() {
        let mut cloud = PointCloud::new();
        for x in 0..6 {
            for y in 0..6 {
                cloud.add_point(Point3D::new(x, y, 3));
            }
        }
        let tree = KdTree::build(cloud.points());
        let normals = super::super::estimate_normals(&cloud, &tree, 8);
        let params = PatchSegmenterParameters::default();
        let mut labels = initial_segmentation(&cloud, &normals, &params);
        refine_segmentation(&cloud, &tree, &normals, &mut labels, &params);
        let first = labels[0].0;
        assert!(labels.iter().all(|l| l.0 == first));
    }
}
