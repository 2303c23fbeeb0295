//! Morton (Z-order) encoding of 3D points, used to sort RAW points into
//! cache-friendly order (spec §4.1).
//!
//! Generalises the teacher's 2D `morton_encode_2d` in `spatial_layout.rs`
//! (bit-interleaving two coordinates into one `u32`) to three coordinates
//! and a configurable refinement depth, as spec §4.1 requires: "interleaving
//! the lower `(B3D-d)` bits of each coordinate".

use super::Point3D;

/// Encodes `p` as a 64-bit Morton key using the lower `bit_depth - depth`
/// bits of each coordinate, interleaved x,y,z (x in the lowest bit of each
/// triple, z in the highest).
pub fn morton_encode(p: Point3D, bit_depth: u32, depth: u32) -> u64 {
    let bits = bit_depth.saturating_sub(depth).min(21);
    let mask = if bits == 0 { 0 } else { (1u64 << bits) - 1 };
    let x = (p.x as u64) & mask;
    let y = (p.y as u64) & mask;
    let z = (p.z as u64) & mask;

    let mut result: u64 = 0;
    for i in 0..bits {
        result |= ((x >> i) & 1) << (3 * i);
        result |= ((y >> i) & 1) << (3 * i + 1);
        result |= ((z >> i) & 1) << (3 * i + 2);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_origin_as_zero() {
        assert_eq!(morton_encode(Point3D::new(0, 0, 0), 10, 0), 0);
    }

    #[test]
    fn interleaves_lowest_bits_first() {
        let a = morton_encode(Point3D::new(1, 0, 0), 10, 0);
        let b = morton_encode(Point3D::new(0, 1, 0), 10, 0);
        let c = morton_encode(Point3D::new(0, 0, 1), 10, 0);
        assert_eq!(a, 0b001);
        assert_eq!(b, 0b010);
        assert_eq!(c, 0b100);
    }

    #[test]
    fn distinct_points_get_distinct_keys() {
        let mut keys = std::collections::HashSet::new();
        for x in 0..4 {
            for y in 0..4 {
                for z in 0..4 {
                    keys.insert(morton_encode(Point3D::new(x, y, z), 10, 6));
                }
            }
        }
        assert_eq!(keys.len(), 64);
    }
}
