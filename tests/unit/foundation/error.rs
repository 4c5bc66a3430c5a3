use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        WorldviewError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        WorldviewError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        WorldviewError::asset("x")
            .to_string()
            .contains("asset error:")
    );
    assert!(
        WorldviewError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        WorldviewError::config("x")
            .to_string()
            .contains("config error:")
    );
}

#[test]
fn extract_error_names_the_node() {
    let err = ExtractError::new(NodeId::new(1, 7), ExtractErrorKind::MixedFills);
    assert_eq!(err.to_string(), "fills are mixed (node 1:7)");

    let wrapped = WorldviewError::from(err);
    assert!(wrapped.to_string().starts_with("extraction error:"));
}

#[test]
fn unsupported_kind_uses_wire_name() {
    let kind = ExtractErrorKind::UnsupportedKind(NativeKind::Slice);
    assert_eq!(kind.to_string(), "unsupported node type: SLICE");
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = WorldviewError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
