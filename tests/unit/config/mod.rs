use super::*;

use crate::model::document::AssetPayload;

fn temp_path(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!("worldview-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    dir.join(name)
}

#[test]
fn defaults_match_the_first_run_values() {
    let settings = Settings::default();
    assert_eq!(settings.temperature, 0.5);
    assert_eq!(settings.threshold, 0.5);
    assert_eq!(settings.timeout, 50);
    settings.validate().unwrap();
}

#[test]
fn missing_fields_take_defaults() {
    let settings = Settings::from_toml("timeout = 120\n").unwrap();
    assert_eq!(settings.timeout, 120);
    assert_eq!(settings.temperature, 0.5);
    assert_eq!(settings.threshold, 0.5);
}

#[test]
fn out_of_range_values_are_rejected() {
    let err = Settings::from_toml("temperature = 1.5\n").unwrap_err();
    assert!(err.to_string().starts_with("config error:"), "{err}");
    assert!(err.to_string().contains("temperature"));

    let err = Settings::from_toml("threshold = -0.1\n").unwrap_err();
    assert!(err.to_string().contains("threshold"));

    let err = Settings::from_toml("timeout = 501\n").unwrap_err();
    assert!(err.to_string().contains("timeout"));

    assert!(Settings::from_toml("timeout = 500\ntemperature = 1.0\nthreshold = 0.0\n").is_ok());
}

#[test]
fn malformed_toml_is_a_config_error() {
    let err = Settings::from_toml("timeout = \"soon\"").unwrap_err();
    assert!(matches!(err, WorldviewError::Config(_)));
}

#[test]
fn save_then_load_keeps_values() {
    let path = temp_path("roundtrip.toml");
    let settings = Settings {
        temperature: 0.25,
        threshold: 0.75,
        timeout: 0,
    };
    settings.save(&path).unwrap();
    assert_eq!(Settings::load(&path).unwrap(), settings);
}

#[test]
fn save_refuses_invalid_settings() {
    let path = temp_path("invalid.toml");
    let settings = Settings {
        timeout: 900,
        ..Settings::default()
    };
    assert!(settings.save(&path).is_err());
}

#[test]
fn load_or_default_falls_back() {
    let missing = temp_path("does-not-exist.toml");
    assert_eq!(Settings::load_or_default(&missing), Settings::default());

    let invalid = temp_path("out-of-range.toml");
    std::fs::write(&invalid, "temperature = 3.0\n").unwrap();
    assert_eq!(Settings::load_or_default(&invalid), Settings::default());
}

#[test]
fn render_settings_use_timeout_as_pacing() {
    let settings = Settings {
        timeout: 80,
        ..Settings::default()
    };
    let mut assets = Assets::new();
    assets.insert("hero".into(), AssetPayload::Handle("abc".into()));

    let render = settings.render_settings(Some(assets.clone()));
    assert_eq!(render.pacing_delay_ms, 80);
    assert_eq!(render.assets, Some(assets));
    assert!(settings.render_settings(None).assets.is_none());
}
