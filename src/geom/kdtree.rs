//! Static kd-tree over `Point3D`, used by segmentation (normal estimation),
//! RAW-point routing and kd-tree-based geometry smoothing.
//!
//! The tree is built once from a point slice and never mutated afterwards —
//! matching spec §5's "the kd-tree and input point cloud are read-only
//! inside [parallel] loops" requirement, so a single built `KdTree` can be
//! shared (via `&`) across rayon worker threads without synchronisation.

use super::Point3D;
use std::collections::BinaryHeap;

struct Node {
    idx: usize,
    axis: u8,
    left: Option<usize>,
    right: Option<usize>,
}

pub struct KdTree {
    points: Vec<Point3D>,
    nodes: Vec<Node>,
    root: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HeapEntry {
    dist2: i64,
    idx: usize,
}

impl Ord for HeapEntry {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.dist2.cmp(&other.dist2)
    }
}
impl PartialOrd for HeapEntry {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl KdTree {
    /// Builds a balanced kd-tree over `points` by recursive median split,
    /// cycling the splitting axis x,y,z with tree depth.
    pub fn build(points: &[Point3D]) -> Self {
        let mut indices: Vec<usize> = (0..points.len()).collect();
        let mut nodes = Vec::with_capacity(points.len());
        let root = Self::build_recursive(points, &mut indices, 0, &mut nodes);
        Self {
            points: points.to_vec(),
            nodes,
            root,
        }
    }

    fn build_recursive(
        points: &[Point3D],
        indices: &mut [usize],
        depth: usize,
        nodes: &mut Vec<Node>,
    ) -> Option<usize> {
        if indices.is_empty() {
            return None;
        }
        let axis = (depth % 3) as u8;
        indices.sort_by_key(|&i| points[i].get(axis as usize));
        let mid = indices.len() / 2;
        let median_idx = indices[mid];

        let left = Self::build_recursive(points, &mut indices[..mid], depth + 1, nodes);
        let right = Self::build_recursive(points, &mut indices[mid + 1..], depth + 1, nodes);

        nodes.push(Node {
            idx: median_idx,
            axis,
            left,
            right,
        });
        Some(nodes.len() - 1)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// k-nearest-neighbour search. Results are point indices into the
    /// original slice passed to `build`, nearest first.
    pub fn search(&self, query: Point3D, k: usize) -> Vec<usize> {
        self.search_radius(query, k, i64::MAX)
    }

    /// k-NN search bounded to a squared-distance radius `r2`.
    pub fn search_radius(&self, query: Point3D, k: usize, r2: i64) -> Vec<usize> {
        if k == 0 || self.root.is_none() {
            return Vec::new();
        }
        let mut heap: BinaryHeap<HeapEntry> = BinaryHeap::with_capacity(k + 1);
        self.visit(self.root, query, k, r2, &mut heap);
        // `into_sorted_vec` returns ascending order, i.e. nearest first.
        heap.into_sorted_vec().into_iter().map(|e| e.idx).collect()
    }

    fn visit(
        &self,
        node: Option<usize>,
        query: Point3D,
        k: usize,
        r2: i64,
        heap: &mut BinaryHeap<HeapEntry>,
    ) {
        let Some(n) = node else { return };
        let node = &self.nodes[n];
        let p = self.points[node.idx];
        let d2 = p.squared_distance(&query);

        if d2 <= r2 {
            if heap.len() < k {
                heap.push(HeapEntry {
                    dist2: d2,
                    idx: node.idx,
                });
            } else if let Some(worst) = heap.peek() {
                if d2 < worst.dist2 {
                    heap.pop();
                    heap.push(HeapEntry {
                        dist2: d2,
                        idx: node.idx,
                    });
                }
            }
        }

        let axis_diff = query.get(node.axis as usize) - p.get(node.axis as usize);
        let (near, far) = if axis_diff < 0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        self.visit(near, query, k, r2, heap);

        let plane_dist2 = (axis_diff as i64) * (axis_diff as i64);
        let should_visit_far = plane_dist2 <= r2
            && (heap.len() < k || heap.peek().map(|w| plane_dist2 < w.dist2).unwrap_or(true));
        if should_visit_far {
            self.visit(far, query, k, r2, heap);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> Vec<Point3D> {
        let mut v = Vec::new();
        for x in 0..4 {
            for y in 0..4 {
                v.push(Point3D::new(x, y, 0));
            }
        }
        v
    }

    #[test]
    fn nearest_neighbour_is_self_when_present() {
        let pts = grid();
        let tree = KdTree::build(&pts);
        let result = tree.search(Point3D::new(2, 2, 0), 1);
        assert_eq!(pts[result[0]], Point3D::new(2, 2, 0));
    }

    #[test]
    fn k_nn_returns_k_nearest_sorted() {
        let pts = grid();
        let tree = KdTree::build(&pts);
        let result = tree.search(Point3D::new(0, 0, 0), 3);
        assert_eq!(result.len(), 3);
        let mut dists: Vec<i64> = result.iter().map(|&i| pts[i].squared_distance(&Point3D::new(0, 0, 0))).collect();
        let sorted = {
            let mut d = dists.clone();
            d.sort();
            d
        };
        assert_eq!(dists, sorted);
        dists.sort();
        assert_eq!(dists[0], 0);
    }

    #[test]
    fn radius_search_excludes_far_points() {
        let pts = grid();
        let tree = KdTree::build(&pts);
        let result = tree.search_radius(Point3D::new(0, 0, 0), 16, 2);
        for idx in &result {
            assert!(pts[*idx].squared_distance(&Point3D::new(0, 0, 0)) <= 2);
        }
        assert!(!result.is_empty());
    }
}
