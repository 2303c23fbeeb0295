//! RAW/EOM point-handling integration tests (spec §8 property 5: EDD
//! bitfields never encode a depth delta outside 1..=10, and RAW points
//! survive being Morton-sorted exactly).

use vpcc_core::error::CodecError;
use vpcc_core::geom::Point3D;
use vpcc_core::raw_eom::{order_raw_points, pack_edd_bitfield, unpack_edd_bitfield};

#[test]
fn edd_bitfield_round_trips_for_every_valid_delta() {
    for delta in 1..=10u32 {
        let bits = pack_edd_bitfield(&[delta]).unwrap();
        assert_eq!(unpack_edd_bitfield(bits), vec![delta]);
    }
}

#[test]
fn edd_bitfield_rejects_delta_above_ten() {
    let err = pack_edd_bitfield(&[11]).unwrap_err();
    match err {
        CodecError::EOMBitcountViolation { delta } => assert_eq!(delta, 11),
        other => panic!("expected EOMBitcountViolation, got {other:?}"),
    }
}

#[test]
fn raw_point_reordering_preserves_the_multiset() {
    let mut points: Vec<(Point3D, Option<vpcc_core::geom::Colour>)> = (0..64)
        .map(|i| (Point3D::new(i % 8, (i / 8) % 8, 0), None))
        .collect();
    let mut expected: Vec<Point3D> = points.iter().map(|(p, _)| *p).collect();
    expected.sort_by_key(|p| (p.x, p.y, p.z));

    order_raw_points(&mut points, 10);
    let mut actual: Vec<Point3D> = points.iter().map(|(p, _)| *p).collect();
    actual.sort_by_key(|p| (p.x, p.y, p.z));

    assert_eq!(actual, expected);
}
