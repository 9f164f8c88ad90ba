//! Integration tests for TOML configuration loading.
//!
//! Uses figment::Jail for safe, sandboxed env var and file manipulation.

use eco_config::EcoConfig;
use eco_core::Coordinate;
use eco_core::enums::{Language, OverlapPolicy};
use figment::{
    Figment, Jail,
    providers::{Env, Format, Serialized, Toml},
};
use pretty_assertions::assert_eq;
use std::path::PathBuf;

#[test]
fn loads_backend_and_location_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
base_url = "https://eco.example.org/api"
timeout_secs = 12

[location]
latitude = 19.076
longitude = 72.8777
timeout_ms = 2500
"#,
        )?;

        let config: EcoConfig = Figment::from(Serialized::defaults(EcoConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        assert_eq!(config.backend.base_url, "https://eco.example.org/api");
        assert_eq!(config.backend.timeout_secs, 12);
        assert!(config.location.is_configured());
        assert_eq!(config.location.timeout_ms, 2500);
        assert!(config.location.high_accuracy);
        assert!(config.validate().is_ok());
        Ok(())
    });
}

#[test]
fn loads_session_identity_and_general_from_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[identity]
id = "673fc7f4f1867ab46b0a8c01"
display_name = "Test User"
contact = "+919876543210"

[session]
overlap = "supersede"
max_recording_secs = 30
state_path = "./state.json"

[general]
language = "hi"
"#,
        )?;

        let config: EcoConfig = Figment::from(Serialized::defaults(EcoConfig::default()))
            .merge(Toml::file("config.toml"))
            .extract()?;

        let seed = config.identity.seed().expect("seed identity");
        assert_eq!(seed.id, "673fc7f4f1867ab46b0a8c01");
        assert_eq!(config.session.overlap, OverlapPolicy::Supersede);
        assert_eq!(config.session.max_recording_secs, 30);
        assert_eq!(config.general.language, Language::Hi);
        Ok(())
    });
}

#[test]
fn env_overrides_toml() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
[backend]
base_url = "https://from-toml.example.org/api"
"#,
        )?;
        jail.set_env("ECOSORT_BACKEND__BASE_URL", "https://from-env.example.org/api");
        jail.set_env("ECOSORT_LOCATION__TIMEOUT_MS", "1200");

        let config: EcoConfig = Figment::from(Serialized::defaults(EcoConfig::default()))
            .merge(Toml::file("config.toml"))
            .merge(Env::prefixed("ECOSORT_").split("__"))
            .extract()?;

        assert_eq!(config.backend.base_url, "https://from-env.example.org/api");
        assert_eq!(config.location.timeout_ms, 1200);
        Ok(())
    });
}

#[test]
fn project_local_file_is_picked_up_by_figment() {
    Jail::expect_with(|jail| {
        std::fs::create_dir_all(jail.directory().join(".ecosort"))
            .map_err(|e| e.to_string())?;
        jail.create_file(
            ".ecosort/config.toml",
            r#"
[general]
default_weight_kg = 2.5
"#,
        )?;

        let config: EcoConfig = EcoConfig::figment().extract()?;
        assert!((config.general.default_weight_kg - 2.5).abs() < f64::EPSILON);
        Ok(())
    });
}

#[test]
fn load_rejects_out_of_range_fixed_location() {
    Jail::expect_with(|jail| {
        jail.set_env("ECOSORT_LOCATION__LATITUDE", "123.0");
        jail.set_env("ECOSORT_LOCATION__LONGITUDE", "10.0");

        let result = EcoConfig::load();
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn invalid_overlap_policy_fails_extraction() {
    Jail::expect_with(|jail| {
        jail.set_env("ECOSORT_SESSION__OVERLAP", "queue");
        let result: Result<EcoConfig, _> = EcoConfig::figment().extract();
        assert!(result.is_err());
        Ok(())
    });
}

#[test]
fn config_file_outside_the_project_resolves_state_and_fallback() {
    let dir = tempfile::tempdir().expect("tempdir");
    let state = dir.path().join("state").join("session.json");
    let file = dir.path().join("ecosort.toml");
    std::fs::write(
        &file,
        format!(
            r#"
[location]
fallback_latitude = 12.9716
fallback_longitude = 77.5946

[session]
state_path = "{}"
"#,
            state.display()
        ),
    )
    .expect("write config");

    let config: EcoConfig = Figment::from(Serialized::defaults(EcoConfig::default()))
        .merge(Toml::file(&file))
        .extract()
        .expect("extract");

    assert_eq!(config.location.fallback(), Coordinate::new(12.9716, 77.5946));
    assert!(!config.location.is_configured());
    assert_eq!(config.session.state_path(), Some(PathBuf::from(&state)));
    assert!(config.validate().is_ok());
}
