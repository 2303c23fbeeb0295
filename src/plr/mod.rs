//! PLR (point local reconstruction) mode search (spec §4.9, component
//! C9). Encoder-only: for each block of a patch, decides whether D1 can
//! be recovered from a single per-block constant offset above D0 instead
//! of reading an explicit second depth map pixel, searched in parallel
//! across blocks with rayon (spec §5).

use crate::params::GeneratePointCloudParameters;
use crate::patch::Patch;
use rayon::prelude::*;

/// One block's reconstruction mode (spec §4.6 item 6): `interpolate` and
/// `fill` gate whether D1 is derived rather than read explicitly, `min_d1`
/// is the minimum forced delta above D0, and `neighbor` is the size of the
/// neighbourhood whose per-pixel depth deltas set the actual `D1 - D0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlrMode {
    pub interpolate: bool,
    pub fill: bool,
    pub min_d1: u32,
    pub neighbor: usize,
}

impl PlrMode {
    /// No reconstruction shortcut: D1 is read explicitly from the second
    /// geometry map (spec §4.9 item 2, "mode 0").
    pub const EXPLICIT: PlrMode = PlrMode {
        interpolate: false,
        fill: false,
        min_d1: 0,
        neighbor: 1,
    };
}

/// Per-block PLR mode assignment for one patch.
#[derive(Debug, Clone)]
pub struct PatchPlrAssignment {
    pub block_size: usize,
    pub modes: Vec<PlrMode>,
    pub blocks_wide: usize,
}

impl PatchPlrAssignment {
    pub fn mode_at(&self, block_u: usize, block_v: usize) -> PlrMode {
        self.modes[block_v * self.blocks_wide + block_u]
    }
}

/// Searches every `block_size`x`block_size` block of `patch` for a mode
/// cheaper than [`PlrMode::EXPLICIT`] (spec §4.9 item 2): a block can be
/// interpolated losslessly only if every occupied pixel in it shares the
/// same `D1 - D0` thickness, in which case a single per-block `min_d1`
/// reproduces D1 without an explicit second depth sample.
pub fn search_plr_modes(patch: &Patch, params: &GeneratePointCloudParameters) -> PatchPlrAssignment {
    let block_size = params.patch_size.max(1);
    let blocks_wide = patch.size_u0.div_ceil(block_size);
    let blocks_high = patch.size_v0.div_ceil(block_size);

    let modes: Vec<PlrMode> = (0..blocks_wide * blocks_high)
        .into_par_iter()
        .map(|block_idx| {
            let block_u = block_idx % blocks_wide;
            let block_v = block_idx / blocks_wide;
            let u0 = block_u * block_size;
            let v0 = block_v * block_size;
            block_plr_mode(patch, u0, v0, block_size)
        })
        .collect();

    PatchPlrAssignment {
        block_size,
        modes,
        blocks_wide,
    }
}

/// Picks the cheapest lossless mode for one block: interpolation if every
/// occupied pixel shares a uniform `D1 - D0` thickness, otherwise the
/// explicit fallback.
fn block_plr_mode(patch: &Patch, u0: usize, v0: usize, size: usize) -> PlrMode {
    let mut uniform_thickness: Option<i32> = None;
    for v in v0..(v0 + size).min(patch.size_v0) {
        for u in u0..(u0 + size).min(patch.size_u0) {
            if !patch.occupancy_at(u, v) {
                continue;
            }
            let d0 = patch.depth_d0_at(u, v).unwrap_or(0);
            let d1 = patch.depth_d1_at(u, v).unwrap_or(d0);
            let thickness = d1 - d0;
            match uniform_thickness {
                None => uniform_thickness = Some(thickness),
                Some(t) if t == thickness => {}
                _ => return PlrMode::EXPLICIT,
            }
        }
    }
    match uniform_thickness {
        Some(t) if t > 0 => PlrMode {
            interpolate: true,
            fill: false,
            min_d1: t as u32,
            neighbor: size,
        },
        _ => PlrMode::EXPLICIT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::ProjectionAxis;

    #[test]
    fn uniform_thickness_block_is_coded_by_interpolation() {
        let mut patch = Patch::new(0, ProjectionAxis(0), 4, 4);
        for v in 0..4 {
            for u in 0..4 {
                patch.set_occupancy(u, v, true);
                patch.set_depth_d0(u, v, 0);
                patch.set_depth_d1(u, v, 3);
            }
        }
        let params = GeneratePointCloudParameters {
            patch_size: 4,
            ..Default::default()
        };
        let assignment = search_plr_modes(&patch, &params);
        let mode = assignment.mode_at(0, 0);
        assert!(mode.interpolate);
        assert_eq!(mode.min_d1, 3);
    }

    #[test]
    fn non_uniform_thickness_falls_back_to_explicit() {
        let mut patch = Patch::new(0, ProjectionAxis(0), 4, 4);
        patch.set_occupancy(0, 0, true);
        patch.set_depth_d0(0, 0, 0);
        patch.set_depth_d1(0, 0, 1);
        patch.set_occupancy(3, 3, true);
        patch.set_depth_d0(3, 3, 0);
        patch.set_depth_d1(3, 3, 5);
        let params = GeneratePointCloudParameters {
            patch_size: 4,
            ..Default::default()
        };
        let assignment = search_plr_modes(&patch, &params);
        assert_eq!(assignment.mode_at(0, 0), PlrMode::EXPLICIT);
    }
}
