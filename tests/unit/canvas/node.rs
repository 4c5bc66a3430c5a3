use super::*;

#[test]
fn node_id_round_trips_through_text() {
    let id: NodeId = "12:345".parse().unwrap();
    assert_eq!(id, NodeId::new(12, 345));
    assert_eq!(id.to_string(), "12:345");
    assert_eq!(serde_json::to_string(&id).unwrap(), r#""12:345""#);
    assert!("12".parse::<NodeId>().is_err());
    assert!("a:b".parse::<NodeId>().is_err());
}

#[test]
fn mixed_serializes_as_marker() {
    let m: Mixed<f64> = Mixed::Mixed;
    assert_eq!(serde_json::to_string(&m).unwrap(), r#""MIXED""#);
    let back: Mixed<f64> = serde_json::from_str(r#""MIXED""#).unwrap();
    assert!(back.is_mixed());
    let v: Mixed<f64> = serde_json::from_str("16").unwrap();
    assert_eq!(v.value(), Some(&16.0));
}

#[test]
fn stroke_weight_is_mixed_when_edges_differ() {
    let mut node = SceneNode::new(NativeKind::Rectangle);
    assert_eq!(node.stroke_weight(), Mixed::Value(1.0));
    node.stroke_weights.left = 3.0;
    assert!(node.stroke_weight().is_mixed());
    node.set_stroke_weight(2.0);
    assert_eq!(node.stroke_weight(), Mixed::Value(2.0));
}

#[test]
fn solid_paint_folds_opacity_on_request() {
    let p = NativePaint::solid(Rgb::WHITE, 0.25);
    assert_eq!(p.solid_rgba(), Some(Rgba::new(1.0, 1.0, 1.0, 0.25)));
    assert_eq!(NativePaint::image(None, ScaleMode::Fill).solid_rgba(), None);
}

#[test]
fn scene_node_defaults_fill_missing_fields() {
    let node: SceneNode = serde_json::from_str(
        r#"{"type":"TEXT","name":"Label","text":{"characters":"Hi","fontSize":"MIXED"}}"#,
    )
    .unwrap();
    assert!(node.visible);
    let text = node.text.unwrap();
    assert_eq!(text.characters, "Hi");
    assert!(text.font_size.is_mixed());
    assert_eq!(text.font_name, Mixed::Value(FontName::default()));
}

#[test]
fn paint_stack_accepts_mixed_marker() {
    let node: SceneNode = serde_json::from_str(r#"{"type":"RECTANGLE","fills":"MIXED"}"#).unwrap();
    assert!(node.fills.is_mixed());
    assert!(node.fill_stack().is_err());
}
