//! SceneKit Settings Crate
//!
//! Editor configuration: handle geometry, gesture thresholds, routing
//! constants and creation defaults, persisted as JSON or TOML.

pub mod config;
pub mod error;

pub use config::{
    default_config_path, ensure_config_dir, ClipboardSettings, EditorConfig, GestureSettings,
    HandleSettings, NodeSettings, RoutingSettings, TextSettings,
};
pub use error::{ConfigError, ConfigResult, SettingsError, SettingsResult};
