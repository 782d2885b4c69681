//! Editor configuration for SceneKit
//!
//! Supports JSON and TOML file formats stored in the per-user config
//! directory. Every field has a default, so partial files load.
//!
//! Configuration is organized into logical sections:
//! - Handle geometry (sizes, offsets, hit tolerance)
//! - Gesture thresholds
//! - Connection routing constants
//! - Clipboard paste stacking
//! - Node and text creation defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult, SettingsError, SettingsResult};

/// Handle geometry, in world units
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandleSettings {
    /// Side length of square scale/endpoint handles
    pub handle_size: f64,
    /// Radius of the rotate and bezier-control handles
    pub rotate_handle_radius: f64,
    /// Distance of the rotate handle above the box top-center
    pub rotate_handle_offset: f64,
    /// Distance of a line's rotate handle along its normal
    pub line_rotate_offset: f64,
    /// Extra slack when hit-testing handles and bodies
    pub hit_tolerance: f64,
}

impl Default for HandleSettings {
    fn default() -> Self {
        Self {
            handle_size: 8.0,
            rotate_handle_radius: 6.0,
            rotate_handle_offset: 20.0,
            line_rotate_offset: 24.0,
            hit_tolerance: 4.0,
        }
    }
}

/// Gesture thresholds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Screen pixels before a marquee materialises
    pub marquee_threshold_px: f64,
    /// Screen pixels before a connector press becomes a connection drag
    pub connect_threshold_px: f64,
    /// Floor for width/height during non-uniform scaling
    pub min_dimension: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            marquee_threshold_px: 6.0,
            connect_threshold_px: 4.0,
            min_dimension: 1.0,
        }
    }
}

/// Bezier routing between node connectors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoutingSettings {
    /// Shortest default control handle
    pub min_handle_length: f64,
    /// Control handle length as a share of endpoint distance
    pub handle_length_ratio: f64,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            min_handle_length: 40.0,
            handle_length_ratio: 0.35,
        }
    }
}

/// Clipboard behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClipboardSettings {
    /// Diagonal step between repeated pastes without a pointer position
    pub paste_step: f64,
}

impl Default for ClipboardSettings {
    fn default() -> Self {
        Self { paste_step: 20.0 }
    }
}

/// Defaults for newly created nodes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeSettings {
    pub width: f64,
    pub height: f64,
    pub corner_radius: f64,
    /// Hit radius around each connector dot
    pub connector_radius: f64,
    pub input_count: usize,
    pub output_count: usize,
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            width: 160.0,
            height: 90.0,
            corner_radius: 12.0,
            connector_radius: 5.0,
            input_count: 1,
            output_count: 1,
        }
    }
}

/// Defaults for newly created text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextSettings {
    pub font_size: f64,
    pub font_family: String,
    pub fill: String,
}

impl Default for TextSettings {
    fn default() -> Self {
        Self {
            font_size: 18.0,
            font_family: "system-ui, -apple-system, Segoe UI, Roboto, Arial, sans-serif"
                .to_string(),
            fill: "rgba(0, 0, 0, 0.8)".to_string(),
        }
    }
}

/// Complete editor configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub handles: HandleSettings,
    pub gestures: GestureSettings,
    pub routing: RoutingSettings,
    pub clipboard: ClipboardSettings,
    pub node: NodeSettings,
    pub text: TextSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Json,
    Toml,
}

fn format_of(path: &Path) -> ConfigResult<Format> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => Ok(Format::Json),
        Some("toml") => Ok(Format::Toml),
        other => Err(ConfigError::UnsupportedFormat(
            other.unwrap_or("<none>").to_string(),
        )),
    }
}

fn positive(key: &str, value: f64) -> ConfigResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::out_of_range(key, value, "positive"))
    }
}

impl EditorConfig {
    /// Create new config with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Load config from file (JSON or TOML)
    pub fn load_from_file(path: &Path) -> SettingsResult<Self> {
        let format = format_of(path)?;
        let content = std::fs::read_to_string(path)
            .map_err(|source| SettingsError::Read {
                path: path.to_path_buf(),
                source,
            })?;

        let config: Self = match format {
            Format::Json => serde_json::from_str(&content)?,
            Format::Toml => toml::from_str(&content)?,
        };

        config.validate()?;
        tracing::info!("Loaded editor config from {}", path.display());
        Ok(config)
    }

    /// Save config to file (JSON or TOML)
    pub fn save_to_file(&self, path: &Path) -> SettingsResult<()> {
        self.validate()?;

        let content = match format_of(path)? {
            Format::Json => serde_json::to_string_pretty(self)?,
            Format::Toml => toml::to_string_pretty(self)?,
        };

        std::fs::write(path, content)
            .map_err(|source| SettingsError::Write {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!("Saved editor config to {}", path.display());
        Ok(())
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default(path: &Path) -> SettingsResult<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> ConfigResult<()> {
        let h = &self.handles;
        positive("handles.handle_size", h.handle_size)?;
        positive("handles.rotate_handle_radius", h.rotate_handle_radius)?;
        positive("handles.rotate_handle_offset", h.rotate_handle_offset)?;
        positive("handles.line_rotate_offset", h.line_rotate_offset)?;
        positive("handles.hit_tolerance", h.hit_tolerance)?;

        let g = &self.gestures;
        positive("gestures.marquee_threshold_px", g.marquee_threshold_px)?;
        positive("gestures.connect_threshold_px", g.connect_threshold_px)?;
        positive("gestures.min_dimension", g.min_dimension)?;

        positive("routing.min_handle_length", self.routing.min_handle_length)?;
        let ratio = self.routing.handle_length_ratio;
        if !(ratio > 0.0 && ratio <= 1.0) {
            return Err(ConfigError::out_of_range(
                "routing.handle_length_ratio",
                ratio,
                "in (0, 1]",
            ));
        }

        positive("clipboard.paste_step", self.clipboard.paste_step)?;

        positive("node.width", self.node.width)?;
        positive("node.height", self.node.height)?;
        positive("node.connector_radius", self.node.connector_radius)?;
        if self.node.corner_radius < 0.0 || !self.node.corner_radius.is_finite() {
            return Err(ConfigError::out_of_range(
                "node.corner_radius",
                self.node.corner_radius,
                "non-negative",
            ));
        }

        positive("text.font_size", self.text.font_size)?;

        Ok(())
    }
}

/// Per-user config file location, e.g. `~/.config/scenekit/editor.toml`.
pub fn default_config_path() -> SettingsResult<PathBuf> {
    let dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
    Ok(dir.join("scenekit").join("editor.toml"))
}

/// Create the parent directory of `path` if missing.
pub fn ensure_config_dir(path: &Path) -> SettingsResult<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|source| SettingsError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}
