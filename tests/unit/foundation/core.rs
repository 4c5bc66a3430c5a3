use super::*;

#[test]
fn transform_round_trips_through_affine() {
    let t = Transform2x3([[0.5, -1.0, 10.0], [2.0, 0.25, -3.0]]);
    let affine = t.to_affine();
    assert_eq!(affine * Point::new(1.0, 0.0), Point::new(10.5, -1.0));
    assert_eq!(affine * Point::new(0.0, 1.0), Point::new(9.0, -2.75));
    assert_eq!(Transform2x3::from_affine(affine), t);
}

#[test]
fn identity_matches_kurbo_identity() {
    assert_eq!(Transform2x3::IDENTITY.to_affine(), Affine::IDENTITY);
    assert_eq!(Transform2x3::default(), Transform2x3::IDENTITY);
}

#[test]
fn transform_serializes_as_nested_rows() {
    let json = serde_json::to_string(&Transform2x3::IDENTITY).unwrap();
    assert_eq!(json, "[[1.0,0.0,0.0],[0.0,1.0,0.0]]");
}

#[test]
fn channel_bytes_round_and_clamp() {
    assert_eq!(Rgba::new(1.0, 0.5, 0.0, 1.2).to_bytes(), [255, 128, 0, 255]);
    assert_eq!(Rgba::new(-0.1, 0.2, 0.4, 0.0).to_bytes(), [0, 51, 102, 0]);
}
