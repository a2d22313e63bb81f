//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/seltree/seltree.toml`
//! 3. Local config: `<snapshot_dir>/.seltree.toml`
//! 4. Environment variables: `SELTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{ResolveOrder, Status};

/// Checkbox glyphs used when rendering a tree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GlyphConfig {
    pub full: String,
    pub partial: String,
    pub clear: String,
}

impl Default for GlyphConfig {
    fn default() -> Self {
        Self {
            full: "[x]".into(),
            partial: "[~]".into(),
            clear: "[ ]".into(),
        }
    }
}

impl GlyphConfig {
    pub fn for_status(&self, status: Status) -> &str {
        match status {
            Status::Full => &self.full,
            Status::Partial => &self.partial,
            Status::Clear => &self.clear,
        }
    }
}

/// Raw glyph config for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawGlyphConfig {
    pub full: Option<String>,
    pub partial: Option<String>,
    pub clear: Option<String>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub default_snapshot: Option<PathBuf>,
    pub sort_by_position: Option<bool>,
    pub always_expand: Option<bool>,
    pub path_separator: Option<String>,
    pub glyphs: RawGlyphConfig,
}

/// Unified configuration for seltree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Snapshot used when a command is given none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_snapshot: Option<PathBuf>,
    /// Sort sibling items by source position when resolving selections
    pub sort_by_position: bool,
    /// Expand the whole tree on load instead of restoring saved expansion
    pub always_expand: bool,
    /// Separator of label paths on the command line
    pub path_separator: String,
    /// Checkbox glyphs
    pub glyphs: GlyphConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_snapshot: None,
            sort_by_position: false,
            always_expand: true,
            path_separator: "/".into(),
            glyphs: GlyphConfig::default(),
        }
    }
}

/// Get the XDG config directory for seltree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "seltree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("seltree.toml"))
}

/// Get the path to the local config file next to snapshots.
pub fn local_config_path(snapshot_dir: &Path) -> PathBuf {
    snapshot_dir.join(".seltree.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

/// Expand `~`, `$VAR` and `${VAR}`; unexpandable input is kept as-is.
fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    shellexpand::full(raw.as_ref())
        .map(|s| PathBuf::from(s.into_owned()))
        .unwrap_or_else(|_| path.to_path_buf())
}

impl Settings {
    pub fn resolve_order(&self) -> ResolveOrder {
        if self.sort_by_position {
            ResolveOrder::ByPosition
        } else {
            ResolveOrder::Insertion
        }
    }

    fn expand_paths(&mut self) {
        if let Some(path) = self.default_snapshot.take() {
            self.default_snapshot = Some(expand_path(&path));
        }
    }

    /// Overlay wins wherever it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            default_snapshot: overlay
                .default_snapshot
                .clone()
                .or_else(|| self.default_snapshot.clone()),
            sort_by_position: overlay.sort_by_position.unwrap_or(self.sort_by_position),
            always_expand: overlay.always_expand.unwrap_or(self.always_expand),
            path_separator: overlay
                .path_separator
                .clone()
                .unwrap_or_else(|| self.path_separator.clone()),
            glyphs: GlyphConfig {
                full: overlay
                    .glyphs
                    .full
                    .clone()
                    .unwrap_or_else(|| self.glyphs.full.clone()),
                partial: overlay
                    .glyphs
                    .partial
                    .clone()
                    .unwrap_or_else(|| self.glyphs.partial.clone()),
                clear: overlay
                    .glyphs
                    .clear
                    .clone()
                    .unwrap_or_else(|| self.glyphs.clear.clone()),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `snapshot_dir` - Optional directory holding a local `.seltree.toml`
    pub fn load(snapshot_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        if let Some(dir) = snapshot_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        current = Self::apply_env_overrides(current)?;
        current.expand_paths();

        Ok(current)
    }

    /// Apply SELTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let builder = Config::builder().add_source(
            Environment::with_prefix("SELTREE")
                .prefix_separator("_")
                .separator("__"),
        );

        let config = builder.build().map_err(config_err)?;

        if let Ok(val) = config.get_string("default_snapshot") {
            settings.default_snapshot = Some(PathBuf::from(val));
        }
        if let Ok(val) = config.get_bool("sort_by_position") {
            settings.sort_by_position = val;
        }
        if let Ok(val) = config.get_bool("always_expand") {
            settings.always_expand = val;
        }
        if let Ok(val) = config.get_string("path_separator") {
            settings.path_separator = val;
        }
        if let Ok(val) = config.get_string("glyphs.full") {
            settings.glyphs.full = val;
        }
        if let Ok(val) = config.get_string("glyphs.partial") {
            settings.glyphs.partial = val;
        }
        if let Ok(val) = config.get_string("glyphs.clear") {
            settings.glyphs.clear = val;
        }

        Ok(settings)
    }

    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: e.to_string(),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        r#"# seltree configuration
# Global: $XDG_CONFIG_HOME/seltree/seltree.toml
# Local:  <snapshot dir>/.seltree.toml
# Env:    SELTREE_<KEY>, nested keys with "__" (SELTREE_GLYPHS__FULL)

# Snapshot used when a command is given none (~ and $VAR are expanded)
# default_snapshot = "~/inspections/latest.toml"

# Sort sibling items by source position (last first) when resolving
sort_by_position = false

# Expand the whole tree on load instead of restoring saved expansion
always_expand = true

# Separator of label paths on the command line
path_separator = "/"

[glyphs]
full = "[x]"
partial = "[~]"
clear = "[ ]"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
