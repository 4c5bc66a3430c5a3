use super::*;

#[test]
fn solid_paint_wire_shape() {
    let p = Paint::solid(Rgba::new(1.0, 0.0, 0.0, 0.5));
    assert_eq!(
        serde_json::to_value(&p).unwrap(),
        serde_json::json!({"type": "SOLID", "color": {"r": 1.0, "g": 0.0, "b": 0.0, "a": 0.5}})
    );
}

#[test]
fn image_paint_uses_camel_case_fields() {
    let p: Paint =
        serde_json::from_str(r#"{"type":"IMAGE","scaleMode":"FIT","imageHash":"abc"}"#).unwrap();
    assert_eq!(p, Paint::image("abc", ScaleMode::Fit));
}

#[test]
fn gradient_kinds_share_one_payload() {
    let g = GradientPaint {
        gradient_stops: vec![ColorStop {
            position: 0.0,
            color: Rgba::BLACK,
        }],
        gradient_transform: Transform2x3::IDENTITY,
    };
    let p = Paint::gradient(GradientKind::GradientAngular, g.clone());
    let json = serde_json::to_value(&p).unwrap();
    assert_eq!(json["type"], "GRADIENT_ANGULAR");
    assert_eq!(json["gradientStops"][0]["position"], 0.0);

    let (kind, payload) = p.as_gradient().unwrap();
    assert_eq!(kind, GradientKind::GradientAngular);
    assert_eq!(payload, &g);
    assert!(p.as_solid().is_none());
}

#[test]
fn mixed_paint_holds_indirect_constituents() {
    let json = r#"{
        "type": "MIXED_PAINT",
        "values": [
            {"type": "SOLID", "color": {"r": 0, "g": 0, "b": 0, "a": 1}},
            {"type": "VARIABLE", "id": "abc", "fallback": {"type": "IMAGE", "scaleMode": "FILL", "imageHash": "abc"}}
        ]
    }"#;
    let p: Paint = serde_json::from_str(json).unwrap();
    let Paint::MixedPaint { values } = p else {
        panic!("expected mixed paint");
    };
    assert_eq!(values[0], Indirect::Value(Paint::solid(Rgba::BLACK)));
    assert_eq!(values[1].variable_id(), Some("abc"));
}
