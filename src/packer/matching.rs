//! Inter-frame patch matching by projection-plane + bounding-box IoU
//! (spec §4.4 item 2), used to carry a patch's index across frames for
//! inter-prediction in the patch-frame descriptor (component C10).

use crate::patch::Patch;

/// Minimum IoU for two patches in consecutive frames to be considered
/// the same tracked patch.
pub const IOU_THRESHOLD: f64 = 0.2;

/// A patch in `current` matched to its predecessor in `previous`.
#[derive(Debug, Clone, Copy)]
pub struct PatchMatch {
    pub current_index: usize,
    pub previous_index: usize,
    pub iou: f64,
}

fn iou(a: &Patch, b: &Patch) -> f64 {
    if a.projection_axis.0 != b.projection_axis.0 {
        return 0.0;
    }
    let (a_w, a_h) = a.oriented_size();
    let (b_w, b_h) = b.oriented_size();

    let a_min = (a.u1, a.v1);
    let a_max = (a.u1 + a_w as i32, a.v1 + a_h as i32);
    let b_min = (b.u1, b.v1);
    let b_max = (b.u1 + b_w as i32, b.v1 + b_h as i32);

    let ix0 = a_min.0.max(b_min.0);
    let iy0 = a_min.1.max(b_min.1);
    let ix1 = a_max.0.min(b_max.0);
    let iy1 = a_max.1.min(b_max.1);

    let intersection = (ix1 - ix0).max(0) as f64 * (iy1 - iy0).max(0) as f64;
    if intersection == 0.0 {
        return 0.0;
    }
    let area_a = (a_w * a_h) as f64;
    let area_b = (b_w * b_h) as f64;
    intersection / (area_a + area_b - intersection)
}

/// Greedily matches each patch in `current` to the highest-IoU patch in
/// `previous` that clears [`IOU_THRESHOLD`], each previous patch used at
/// most once. Ties favour the lower `previous` index, matching the
/// deterministic ordering spec §4.4 requires of a reproducible encoder.
pub fn match_patches_by_iou(previous: &[Patch], current: &[Patch]) -> Vec<PatchMatch> {
    let mut candidates: Vec<PatchMatch> = Vec::new();
    for (ci, c) in current.iter().enumerate() {
        for (pi, p) in previous.iter().enumerate() {
            let score = iou(c, p);
            if score >= IOU_THRESHOLD {
                candidates.push(PatchMatch {
                    current_index: ci,
                    previous_index: pi,
                    iou: score,
                });
            }
        }
    }

    candidates.sort_by(|a, b| {
        b.iou
            .partial_cmp(&a.iou)
            .unwrap()
            .then(a.previous_index.cmp(&b.previous_index))
    });

    let mut used_previous = vec![false; previous.len()];
    let mut used_current = vec![false; current.len()];
    let mut matches = Vec::new();
    for candidate in candidates {
        if used_previous[candidate.previous_index] || used_current[candidate.current_index] {
            continue;
        }
        used_previous[candidate.previous_index] = true;
        used_current[candidate.current_index] = true;
        matches.push(candidate);
    }
    matches.sort_by_key(|m| m.current_index);
    matches
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ProjectionAxis;

    fn patch_at(index: u32, u1: i32, v1: i32, w: usize, h: usize) -> Patch {
        let mut p = Patch::new(index, ProjectionAxis(0), w, h);
        p.u1 = u1;
        p.v1 = v1;
        p
    }

    #[test]
    fn identical_patches_match_with_iou_one() {
        let previous = vec![patch_at(0, 0, 0, 10, 10)];
        let current = vec![patch_at(0, 0, 0, 10, 10)];
        let matches = match_patches_by_iou(&previous, &current);
        assert_eq!(matches.len(), 1);
        assert!((matches[0].iou - 1.0).abs() < 1e-9);
    }

    #[test]
    fn disjoint_patches_do_not_match() {
        let previous = vec![patch_at(0, 0, 0, 10, 10)];
        let current = vec![patch_at(0, 100, 100, 10, 10)];
        assert!(match_patches_by_iou(&previous, &current).is_empty());
    }

    #[test]
    fn each_previous_patch_used_at_most_once() {
        let previous = vec![patch_at(0, 0, 0, 10, 10)];
        let current = vec![patch_at(0, 0, 0, 10, 10), patch_at(1, 1, 1, 10, 10)];
        let matches = match_patches_by_iou(&previous, &current);
        assert_eq!(matches.len(), 1);
    }
}
