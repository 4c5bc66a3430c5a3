use super::*;

use crate::model::document::{App, ScreenMeta, Theme};
use crate::model::paint::{ImagePaint, ScaleMode};

const SCREEN: &str = r#"{"name":"Home","root":{"type":"GROUP","id":"1","name":"g","x":0,"y":0,"width":1,"height":1,"children":null}}"#;

fn screen_with_images(keys: &[&str]) -> Screen {
    let mut screen: Screen = serde_json::from_str(SCREEN).unwrap();
    let mut theme = Theme::default();
    for key in keys {
        theme.images.insert(
            key.to_string(),
            ImageAsset::Preprocessed(ImagePaint {
                scale_mode: ScaleMode::Fill,
                image_hash: key.to_string(),
            }),
        );
    }
    screen.meta = ScreenMeta { theme };
    screen
}

#[test]
fn statuses_map_to_distinct_classes() {
    assert_eq!(classify_status(200), Ok(()));
    assert_eq!(classify_status(201), Ok(()));
    assert_eq!(classify_status(403), Err(TransportError::Forbidden));
    assert_eq!(classify_status(422), Err(TransportError::UnprocessableEntity));
    assert_eq!(classify_status(503), Err(TransportError::ServerError));
    assert_eq!(classify_status(500), Err(TransportError::Internal(500)));
    assert_eq!(classify_status(404).unwrap_err().status(), Some(404));
}

#[test]
fn every_class_has_its_own_message() {
    let errors = [
        TransportError::Network("refused".into()),
        TransportError::BadRequest("shape".into()),
        TransportError::Forbidden,
        TransportError::UnprocessableEntity,
        TransportError::ServerError,
        TransportError::Internal(500),
    ];
    let messages: std::collections::BTreeSet<String> =
        errors.iter().map(ToString::to_string).collect();
    assert_eq!(messages.len(), errors.len());
    assert_eq!(
        TransportError::Forbidden.to_string(),
        "Forbidden. Please try again later"
    );
}

#[test]
fn download_parses_screens() {
    let body = format!(r#"{{"screens":[{SCREEN}]}}"#);
    let response = parse_download_response(200, &body).unwrap();
    assert_eq!(response.screens.len(), 1);
    assert_eq!(response.screens[0].name, "Home");
}

#[test]
fn malformed_download_is_a_bad_request() {
    let err = parse_download_response(200, r#"{"screens":[{"name":"Home"}]}"#).unwrap_err();
    assert!(matches!(err, TransportError::BadRequest(_)));
    let err = parse_download_response(200, "not json").unwrap_err();
    assert!(matches!(err, TransportError::BadRequest(_)));
}

#[test]
fn download_only_accepts_ok() {
    assert_eq!(
        parse_download_response(403, "").unwrap_err(),
        TransportError::Forbidden
    );
    assert_eq!(
        parse_download_response(201, r#"{"screens":[]}"#).unwrap_err(),
        TransportError::Internal(201)
    );
}

#[test]
fn upload_responses_parse() {
    let assets = parse_upload_assets_response(
        201,
        r#"{"hero":{"url":"https://cdn/hero.png","description":"a hero"}}"#,
    )
    .unwrap();
    assert_eq!(assets["hero"].url, "https://cdn/hero.png");

    let epoch = parse_upload_epoch_response(201, r#"{"collection_id":"c-1"}"#).unwrap();
    assert_eq!(epoch.collection_id, "c-1");

    assert!(matches!(
        parse_upload_epoch_response(200, r#"{"id":"c-1"}"#),
        Err(TransportError::BadRequest(_))
    ));
    assert_eq!(
        parse_upload_assets_response(422, "{}").unwrap_err(),
        TransportError::UnprocessableEntity
    );
}

#[test]
fn upload_response_rewrites_matching_images_in_every_app() {
    let mut epoch = Epoch {
        name: "1".into(),
        apps: vec![
            App {
                name: "A".into(),
                screens: vec![screen_with_images(&["hero", "logo"])],
                ..App::default()
            },
            App {
                name: "B".into(),
                screens: vec![screen_with_images(&["hero"])],
                ..App::default()
            },
        ],
    };
    let mut response = UploadAssetsResponse::new();
    response.insert(
        "hero".into(),
        RemoteImage {
            url: "https://cdn/hero.png".into(),
            description: "hero".into(),
        },
    );

    assert_eq!(apply_upload_response(&mut epoch, &response), 2);
    for screen in epoch.screens() {
        assert!(matches!(
            screen.meta.theme.images["hero"],
            ImageAsset::Postprocessed(ref remote) if remote.url == "https://cdn/hero.png"
        ));
    }
    assert!(matches!(
        epoch.apps[0].screens[0].meta.theme.images["logo"],
        ImageAsset::Preprocessed(_)
    ));
}

#[test]
fn download_request_carries_settings() {
    let settings = Settings {
        temperature: 0.2,
        threshold: 0.9,
        timeout: 10,
    };
    let request = DownloadRequest::new("make a finance app", &settings);
    assert_eq!(
        serde_json::to_value(&request).unwrap(),
        serde_json::json!({"prompt": "make a finance app", "temperature": 0.2, "threshold": 0.9})
    );
}
