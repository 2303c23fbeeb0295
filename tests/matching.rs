//! Inter-frame patch matching integration tests (spec §8 property 4: a
//! patch that moves slightly between frames keeps the same tracked
//! identity via IoU matching).

use vpcc_core::packer::match_patches_by_iou;
use vpcc_core::patch::{Patch, ProjectionAxis};

fn patch_at(index: u32, u1: i32, v1: i32, w: usize, h: usize) -> Patch {
    let mut p = Patch::new(index, ProjectionAxis(0), w, h);
    p.u1 = u1;
    p.v1 = v1;
    p
}

#[test]
fn a_patch_that_shifts_slightly_is_still_matched() {
    let previous = vec![patch_at(0, 0, 0, 20, 20), patch_at(1, 100, 100, 10, 10)];
    let current = vec![patch_at(0, 2, 1, 20, 20), patch_at(1, 300, 300, 10, 10)];

    let matches = match_patches_by_iou(&previous, &current);
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].current_index, 0);
    assert_eq!(matches[0].previous_index, 0);
}

#[test]
fn matching_is_one_to_one() {
    let previous = vec![patch_at(0, 0, 0, 20, 20)];
    let current = vec![patch_at(0, 0, 0, 20, 20), patch_at(1, 1, 1, 20, 20)];
    let matches = match_patches_by_iou(&previous, &current);
    assert_eq!(matches.len(), 1);
    let mut seen_previous = std::collections::HashSet::new();
    for m in &matches {
        assert!(seen_previous.insert(m.previous_index));
    }
}
