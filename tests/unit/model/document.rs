use super::*;
use crate::model::paint::ScaleMode;

#[test]
fn image_asset_is_adjacently_tagged() {
    let pre = ImageAsset::Preprocessed(ImagePaint {
        scale_mode: ScaleMode::Fill,
        image_hash: "h".to_string(),
    });
    assert_eq!(
        serde_json::to_value(&pre).unwrap(),
        serde_json::json!({"type": "PREPROCESSED", "value": {"scaleMode": "FILL", "imageHash": "h"}})
    );

    let post: ImageAsset = serde_json::from_str(
        r#"{"type":"POSTPROCESSED","value":{"url":"https://cdn/x.png","description":"logo"}}"#,
    )
    .unwrap();
    assert_eq!(
        post,
        ImageAsset::Postprocessed(RemoteImage {
            url: "https://cdn/x.png".to_string(),
            description: "logo".to_string(),
        })
    );
}

#[test]
fn asset_payload_is_bytes_or_handle() {
    let assets: Assets = serde_json::from_str(r#"{"a":[1,2,3],"b":"VariableID:1"}"#).unwrap();
    assert_eq!(assets["a"].as_bytes(), Some(&[1_u8, 2, 3][..]));
    assert_eq!(assets["b"].as_handle(), Some("VariableID:1"));
}

#[test]
fn theme_counts_owning_dictionaries() {
    let mut theme = Theme::default();
    assert!(theme.is_empty());
    theme.characters.insert("Hi".into(), "Hi".into());
    assert_eq!(theme.entries_for("Hi"), 1);
    assert_eq!(theme.entries_for("missing"), 0);
}

#[test]
fn empty_theme_dictionaries_default_when_absent() {
    let screen: Screen = serde_json::from_str(
        r#"{"name":"Home","root":{"type":"GROUP","id":"1","name":"g","x":0,"y":0,"width":1,"height":1,"children":null}}"#,
    )
    .unwrap();
    assert!(screen.meta.theme.is_empty());
    assert_eq!(screen.description, "");
}
