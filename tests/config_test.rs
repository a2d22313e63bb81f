//! Integration tests for Settings config loading with layered merge semantics.
//!
//! These tests use temp directories for the local layer only; a global config
//! on the test machine would sit underneath and is overridden key by key.

use std::fs;

use tempfile::TempDir;

use seltree::application::ApplicationError;
use seltree::config::{local_config_path, Settings};
use seltree::domain::ResolveOrder;

#[test]
fn given_local_config_when_load_then_overrides_specified_keys() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        r#"
sort_by_position = true
always_expand = false
path_separator = "::"

[glyphs]
full = "[*]"
"#,
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    assert_eq!(settings.resolve_order(), ResolveOrder::ByPosition);
    assert!(!settings.always_expand);
    assert_eq!(settings.path_separator, "::");
    assert_eq!(settings.glyphs.full, "[*]");
}

#[test]
fn given_local_default_snapshot_with_env_var_when_load_then_expanded() {
    let dir = TempDir::new().unwrap();
    fs::write(
        local_config_path(dir.path()),
        "default_snapshot = \"$HOME/inspections/latest.toml\"\n",
    )
    .unwrap();

    let settings = Settings::load(Some(dir.path())).expect("load settings");

    let snapshot = settings.default_snapshot.expect("default snapshot set");
    assert!(!snapshot.to_string_lossy().contains("$HOME"));
    assert!(snapshot.ends_with("inspections/latest.toml"));
}

#[test]
fn given_malformed_local_config_when_load_then_config_error() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "always_expand = \"sometimes\"\n").unwrap();

    let err = Settings::load(Some(dir.path())).unwrap_err();

    assert!(matches!(err, ApplicationError::Config { .. }));
}

#[test]
fn given_effective_settings_when_rendering_toml_then_parses_back() {
    let dir = TempDir::new().unwrap();
    fs::write(local_config_path(dir.path()), "path_separator = \">\"\n").unwrap();
    let settings = Settings::load(Some(dir.path())).unwrap();

    let text = settings.to_toml().unwrap();
    let parsed: Settings = toml::from_str(&text).unwrap();

    assert_eq!(parsed, settings);
}
