use super::*;

#[test]
fn bare_literal_is_a_value() {
    let v: Indirect<String> = serde_json::from_str(r#""hello""#).unwrap();
    assert_eq!(v, Indirect::Value("hello".to_string()));
    assert_eq!(v.kind(), IndirectKind::Value);
    assert_eq!(serde_json::to_string(&v).unwrap(), r#""hello""#);
}

#[test]
fn constant_and_variable_carry_type_tags() {
    let c: Indirect<String> = serde_json::from_str(r#"{"type":"CONSTANT","value":"x"}"#).unwrap();
    assert_eq!(c, Indirect::Constant("x".to_string()));

    let v: Indirect<String> =
        serde_json::from_str(r#"{"type":"VARIABLE","id":"k","fallback":"y"}"#).unwrap();
    assert_eq!(v.variable_id(), Some("k"));
    assert_eq!(v.literal(), "y");

    let json = serde_json::to_value(&v).unwrap();
    assert_eq!(
        json,
        serde_json::json!({"type": "VARIABLE", "id": "k", "fallback": "y"})
    );
}

#[test]
fn literal_resolves_through_every_form() {
    let forms = [
        Indirect::Value(3_u32),
        Indirect::Constant(3),
        Indirect::variable("id", 3),
    ];
    for form in &forms {
        assert_eq!(*form.literal(), 3);
    }
    assert!(forms[0].is_value());
    assert!(!forms[2].is_value());
}

#[test]
fn tagged_object_payload_is_not_mistaken_for_a_literal() {
    #[derive(Debug, PartialEq, serde::Serialize, serde::Deserialize)]
    #[serde(tag = "type")]
    enum Shape {
        #[serde(rename = "SQUARE")]
        Square { side: f64 },
    }

    let lit: Indirect<Shape> = serde_json::from_str(r#"{"type":"SQUARE","side":2.0}"#).unwrap();
    assert_eq!(lit, Indirect::Value(Shape::Square { side: 2.0 }));

    let var: Indirect<Shape> = serde_json::from_str(
        r#"{"type":"VARIABLE","id":"s","fallback":{"type":"SQUARE","side":1.0}}"#,
    )
    .unwrap();
    assert_eq!(var, Indirect::variable("s", Shape::Square { side: 1.0 }));
}
