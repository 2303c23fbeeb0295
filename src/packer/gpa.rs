//! Global Patch Allocation (spec §4.4 "Global Patch Allocation (GPA)").
//!
//! GPA packs matched patches across a sub-GOF (group of frames) jointly: a
//! "track" follows one real-world surface as it is re-matched frame to
//! frame, its union-patch (block-wise OR of every member's occupancy) is
//! packed once, and each frame's matching patch just inherits the union's
//! placement. A sub-context ends once the tracked set degrades past one of
//! three conditions (spec §4.4), at which point the caller starts a fresh
//! [`GpaSubContext`] for the next frame.

use super::matching::match_patches_by_iou;
use crate::patch::{Patch, PatchOrientation};

/// One track: a patch followed across consecutive frames by IoU matching,
/// plus the union-patch footprint those frames share on the canvas.
pub struct GpaTrack {
    size_u0: usize,
    size_v0: usize,
    occupancy: Vec<bool>,
    first_member_area: usize,
    member_frames: Vec<usize>,
    member_patch_indices: Vec<usize>,
    placed_u0: usize,
    placed_v0: usize,
    placed_orientation: PatchOrientation,
}

impl GpaTrack {
    fn new(patch: &Patch, frame: usize, patch_index: usize) -> Self {
        Self {
            size_u0: patch.size_u0,
            size_v0: patch.size_v0,
            occupancy: patch.occupancy.clone(),
            first_member_area: patch.size_u0 * patch.size_v0,
            member_frames: vec![frame],
            member_patch_indices: vec![patch_index],
            placed_u0: 0,
            placed_v0: 0,
            // The source's `keepGPARotation` flag is hardcoded true (spec
            // §9 open question): a track's orientation is fixed at its
            // first placement and never re-searched.
            placed_orientation: PatchOrientation::Default,
        }
    }

    /// Folds `patch` into this track's union footprint (spec §4.4: "the
    /// union-patch's bounding box and occupancy is the block-wise OR of
    /// all its members"), growing the bounding box if needed.
    fn union_with(&mut self, patch: &Patch, frame: usize, patch_index: usize) {
        let new_u = self.size_u0.max(patch.size_u0);
        let new_v = self.size_v0.max(patch.size_v0);
        if new_u != self.size_u0 || new_v != self.size_v0 {
            let mut grown = vec![false; new_u * new_v];
            for v in 0..self.size_v0 {
                for u in 0..self.size_u0 {
                    grown[v * new_u + u] = self.occupancy[v * self.size_u0 + u];
                }
            }
            self.occupancy = grown;
            self.size_u0 = new_u;
            self.size_v0 = new_v;
        }
        for v in 0..patch.size_v0 {
            for u in 0..patch.size_u0 {
                if patch.occupancy_at(u, v) {
                    self.occupancy[v * self.size_u0 + u] = true;
                }
            }
        }
        self.member_frames.push(frame);
        self.member_patch_indices.push(patch_index);
    }

    fn last_member(&self, frame: usize) -> Option<usize> {
        if self.member_frames.last() == Some(&frame) {
            self.member_patch_indices.last().copied()
        } else {
            None
        }
    }
}

/// Mutable cross-frame state for one GPA sub-context (spec §4.4); owned by
/// the caller and threaded through consecutive [`pack_gpa`] calls for
/// frames in the same sub-GOF. Start a new one whenever [`pack_gpa`]
/// reports the sub-context closed.
#[derive(Default)]
pub struct GpaSubContext {
    tracks: Vec<GpaTrack>,
    tracks_at_start: usize,
    frame_count: usize,
}

impl GpaSubContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track_count(&self) -> usize {
        self.tracks.len()
    }
}

/// Packs one frame's patches under GPA. `previous_patches` is the prior
/// frame's already-packed patch list used for IoU matching (spec §4.4
/// item 2, `thresholdIOU = 0.2`) — `None` for a sub-context's first frame.
/// Matched patches fold into their track's union footprint; unmatched
/// patches start new tracks. Every track's union-patch is then (re)packed
/// from scratch and each current-frame member inherits its track's
/// placement and (fixed, per `keepGPARotation`) orientation.
///
/// Returns the packed canvas size in blocks and whether this call closed
/// the sub-context per spec §4.4's three termination conditions: union-
/// patch count dropping below 15% of the tracks the sub-context started
/// with, the union canvas exceeding `min_height`, or a track's union
/// footprint growing unreasonably large relative to its first member (the
/// "bad GPA-packing flag", a heuristic stand-in for the source's internal
/// packing-failure signal — see DESIGN.md).
pub fn pack_gpa(
    ctx: &mut GpaSubContext,
    previous_patches: Option<&[Patch]>,
    patches: &mut [Patch],
    min_width: usize,
    min_height: usize,
) -> (usize, usize, bool) {
    let matches = previous_patches.map(|prev| match_patches_by_iou(prev, patches)).unwrap_or_default();
    let previous_frame = ctx.frame_count.saturating_sub(1);

    if ctx.is_empty() {
        for (i, patch) in patches.iter().enumerate() {
            ctx.tracks.push(GpaTrack::new(patch, ctx.frame_count, i));
        }
        ctx.tracks_at_start = ctx.tracks.len();
    } else {
        let mut matched_current = vec![false; patches.len()];
        for m in &matches {
            if let Some(track) = ctx
                .tracks
                .iter_mut()
                .find(|t| t.last_member(previous_frame) == Some(m.previous_index))
            {
                track.union_with(&patches[m.current_index], ctx.frame_count, m.current_index);
                matched_current[m.current_index] = true;
            }
        }
        for (i, patch) in patches.iter().enumerate() {
            if !matched_current[i] {
                ctx.tracks.push(GpaTrack::new(patch, ctx.frame_count, i));
            }
        }
    }

    let mut canvas = super::Canvas::new(min_width.max(1), min_height.max(1));
    let mut order: Vec<usize> = (0..ctx.tracks.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(ctx.tracks[i].size_u0 * ctx.tracks[i].size_v0));
    for idx in order {
        loop {
            let (size_u, size_v) = (ctx.tracks[idx].size_u0, ctx.tracks[idx].size_v0);
            let mut placed = false;
            'scan: for v0 in 0..canvas.height_blocks {
                for u0 in 0..canvas.width_blocks {
                    if canvas.is_free(u0, v0, size_u, size_v) {
                        canvas.claim(u0, v0, size_u, size_v);
                        ctx.tracks[idx].placed_u0 = u0;
                        ctx.tracks[idx].placed_v0 = v0;
                        placed = true;
                        break 'scan;
                    }
                }
            }
            if placed {
                break;
            }
            canvas.grow(canvas.width_blocks, canvas.height_blocks * 2);
        }
    }

    for track in &ctx.tracks {
        if let Some(patch_index) = track.last_member(ctx.frame_count) {
            let patch = &mut patches[patch_index];
            patch.orientation = track.placed_orientation;
            patch.u0 = track.placed_u0;
            patch.v0 = track.placed_v0;
        }
    }

    let closed = should_close_subcontext(ctx, &canvas, min_height);
    ctx.frame_count += 1;
    (canvas.width_blocks, canvas.height_blocks, closed)
}

fn should_close_subcontext(ctx: &GpaSubContext, canvas: &super::Canvas, min_height: usize) -> bool {
    let active = ctx.tracks.iter().filter(|t| t.last_member(ctx.frame_count).is_some()).count();
    let below_fifteen_percent = ctx.tracks_at_start > 0 && (active as f64) < 0.15 * ctx.tracks_at_start as f64;
    let exceeds_min_height = canvas.height_blocks > min_height.max(1);
    let bad_packing = ctx
        .tracks
        .iter()
        .any(|t| t.first_member_area > 0 && t.size_u0 * t.size_v0 > 4 * t.first_member_area);
    below_fifteen_percent || exceeds_min_height || bad_packing
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
    fn first_frame_starts_one_track_per_patch() {
        let mut ctx = GpaSubContext::new();
        let mut patches = vec![patch_at(0, 0, 0, 16, 16), patch_at(1, 100, 100, 16, 16)];
        let (_w, _h, closed) = pack_gpa(&mut ctx, None, &mut patches, 64, 64);
        assert_eq!(ctx.track_count(), 2);
        assert!(!closed);
    }

    #[test]
    fn a_matched_patch_across_frames_shares_one_track() {
        let mut ctx = GpaSubContext::new();
        let mut frame0 = vec![patch_at(0, 0, 0, 16, 16)];
        pack_gpa(&mut ctx, None, &mut frame0, 64, 64);

        let mut frame1 = vec![patch_at(0, 1, 1, 16, 16)];
        let (_w, _h, _closed) = pack_gpa(&mut ctx, Some(&frame0), &mut frame1, 64, 64);

        assert_eq!(ctx.track_count(), 1);
    }

    #[test]
    fn losing_most_tracks_closes_the_subcontext() {
        let mut ctx = GpaSubContext::new();
        let mut frame0 = vec![
            patch_at(0, 0, 0, 8, 8),
            patch_at(1, 50, 50, 8, 8),
            patch_at(2, 100, 100, 8, 8),
        ];
        pack_gpa(&mut ctx, None, &mut frame0, 64, 128);

        // Only one of three patches is still findable next frame — well
        // under the 15% floor once the other two start fresh tracks
        // instead of extending existing ones... but to trigger the
        // *drop* condition we need tracks to vanish, not just gain new
        // ones, so rebuild with only the first patch surviving at all.
        let mut frame1 = vec![patch_at(0, 1, 1, 8, 8)];
        let (_w, _h, closed) = pack_gpa(&mut ctx, Some(&frame0), &mut frame1, 64, 128);
        assert!(closed);
    }
}
