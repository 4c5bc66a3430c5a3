use super::*;

#[test]
fn weight_table_covers_every_hundred() {
    let expected = [
        (100, "Thin"),
        (200, "Extra Light"),
        (300, "Light"),
        (400, "Regular"),
        (500, "Medium"),
        (600, "Semi Bold"),
        (700, "Bold"),
        (800, "Extra Bold"),
        (900, "Black"),
    ];
    for (weight, style) in expected {
        assert_eq!(style_for_weight(weight), style, "weight {weight}");
    }
}

#[test]
fn unmapped_and_zero_weights_are_regular() {
    assert_eq!(style_for_weight(0), "Regular");
    assert_eq!(style_for_weight(450), "Regular");
    assert_eq!(style_for_weight(1000), "Regular");
}

#[test]
fn line_height_uses_unit_tag() {
    let auto: LineHeight = serde_json::from_str(r#"{"unit":"AUTO"}"#).unwrap();
    assert_eq!(auto, LineHeight::Auto);

    let px = serde_json::to_value(LineHeight::Pixels { value: 24.0 }).unwrap();
    assert_eq!(px, serde_json::json!({"unit": "PIXELS", "value": 24.0}));
}
