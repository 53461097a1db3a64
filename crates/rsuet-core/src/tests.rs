use crate::{EdgeIdx, NodeIdx, Point};

#[test]
fn invalid_is_default() {
    assert_eq!(NodeIdx::default(), NodeIdx::INVALID);
    assert!(!NodeIdx::INVALID.is_valid());
    assert!(NodeIdx(0).is_valid());
}

#[test]
fn index_roundtrips_through_usize() {
    let e = EdgeIdx(7);
    let as_usize: usize = e.into();
    assert_eq!(as_usize, 7);
    assert_eq!(EdgeIdx::try_from(7usize).unwrap(), e);
}

#[test]
fn point_distance_is_symmetric() {
    let a = Point::new(0.0, 0.0);
    let b = Point::new(3.0, 4.0);
    assert!((a.distance(b) - 5.0).abs() < 1e-9);
    assert!((a.distance(b) - b.distance(a)).abs() < 1e-12);
}

#[test]
fn default_point_is_origin() {
    assert_eq!(Point::default(), Point::ORIGIN);
}
