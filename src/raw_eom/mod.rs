//! RAW and EOM (enhanced-occupancy-map) point handling (spec §4.8,
//! component C8).
//!
//! RAW points are points segmentation could not fit onto any patch;
//! they are coded directly as (x, y, z, colour) tuples, sorted by Morton
//! order for locality (spec §4.1). EOM points are the extra samples an
//! enhanced-delta-depth bitfield packs behind a patch's D0 surface, one
//! bit per depth offset 1..=10 above D0.

use crate::error::{CodecError, Result};
use crate::geom::{morton_encode, Colour, Point3D};

/// An EOM point packed into a patch's per-pixel bitfield: depth offset
/// `delta` above that pixel's D0 value (spec §4.8 item 2).
#[derive(Debug, Clone, Copy)]
pub struct EomPoint {
    pub frame_index: usize,
    pub patch_index: u32,
    pub u: usize,
    pub v: usize,
    pub delta: u32,
}

/// Maximum `D1 - D0` an EDD bitfield can represent (spec §7
/// `EOMBitcountViolation`).
pub const MAX_EDD_DELTA: u32 = 10;

/// Packs a sorted list of per-pixel depth deltas into the 10-bit EDD
/// bitfield spec §4.8 item 2 describes, one bit per `delta in 1..=10`.
/// Errors if any delta exceeds [`MAX_EDD_DELTA`].
pub fn pack_edd_bitfield(deltas: &[u32]) -> Result<u32> {
    let mut bits = 0u32;
    for &delta in deltas {
        if delta == 0 || delta > MAX_EDD_DELTA {
            return Err(CodecError::EOMBitcountViolation { delta });
        }
        bits |= 1 << (delta - 1);
    }
    Ok(bits)
}

/// Inverse of [`pack_edd_bitfield`]: the sorted depth deltas the bits
/// represent.
pub fn unpack_edd_bitfield(bits: u32) -> Vec<u32> {
    (1..=MAX_EDD_DELTA).filter(|&delta| bits & (1 << (delta - 1)) != 0).collect()
}

/// Sorts RAW points into Morton order so nearby points land close
/// together in the coded stream (spec §4.1, §4.8 item 1).
pub fn order_raw_points(points: &mut [(Point3D, Option<Colour>)], bit_depth: u32) {
    points.sort_by_key(|(p, _)| morton_encode(*p, bit_depth, 0));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pack_and_unpack_edd_round_trips() {
        let deltas = vec![1, 3, 10];
        let bits = pack_edd_bitfield(&deltas).unwrap();
        let mut back = unpack_edd_bitfield(bits);
        back.sort();
        assert_eq!(back, deltas);
    }

    #[test]
    fn delta_over_ten_is_rejected() {
        assert!(pack_edd_bitfield(&[11]).is_err());
    }

    #[test]
    fn delta_zero_is_rejected() {
        assert!(pack_edd_bitfield(&[0]).is_err());
    }

    #[test]
    fn raw_points_end_up_morton_ordered() {
        let mut points = vec![
            (Point3D::new(7, 7, 7), None),
            (Point3D::new(0, 0, 0), None),
            (Point3D::new(1, 0, 0), None),
        ];
        order_raw_points(&mut points, 10);
        assert_eq!(points[0].0, Point3D::new(0, 0, 0));
    }
}
