//! # SceneKit
//!
//! Transform, selection and layout engine for an interactive 2D vector-scene
//! and flow-graph editor. Hosts feed pointer and keyboard events into a
//! [`Workbench`] and render the entity list, handle layout, marquee and
//! connection preview it exposes.
//!
//! ## Architecture
//!
//! SceneKit is organized as a workspace with multiple crates:
//!
//! 1. **scenekit-core** - Geometry kernel, error types, event bus
//! 2. **scenekit-settings** - Editor configuration and persistence
//! 3. **scenekit-designer** - Entity model, selection, handles, gestures, clipboard
//! 4. **scenekit** - Facade crate re-exporting the above plus logging setup
//!
//! ## Features
//!
//! - **Shapes and Nodes**: Circles, rectangles, lines, text and flow-graph nodes
//! - **Handles**: Corner scale, rotate, line endpoint and bezier control handles
//! - **Group Transforms**: Rigid group rotation with a persistent pivot
//! - **Connections**: Drag-to-connect with live bezier routing
//! - **Clipboard**: Copy/paste with connection remapping, JSON payloads
//! - **Change Events**: Category-filtered structural notifications

pub use scenekit_core::{
    distance, rotate_point, rotate_point_deg, BoundingBox, ConnectorKind, Corner, EntityId,
    EventBus, EventCategory, EventFilter, Point, Result, SceneError, SceneEvent,
    SubscriptionId,
};

pub use scenekit_settings::{
    ClipboardSettings, EditorConfig, GestureSettings, HandleSettings, NodeSettings,
    RoutingSettings, TextSettings,
};

pub use scenekit_designer as designer;
pub use scenekit_designer::{
    ConnectorRef, EntityDescriptor, HandleDescriptor, HandleLayout, KeyEvent, Modifiers,
    PointerButton, PointerEvent, SceneObject, Shape, ShapeDescriptor, ShapeType, Workbench,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Build date (set at compile time)
pub const BUILD_DATE: &str = env!("BUILD_DATE");

/// Initialize logging with the default configuration
///
/// Sets up structured logging with:
/// - Console output with pretty formatting
/// - RUST_LOG environment variable support, INFO when unset
pub fn init_logging() -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(tracing::Level::INFO.to_string()));

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stdout)
        .with_target(true)
        .with_level(true)
        .with_line_number(true)
        .pretty();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    tracing::debug!("SceneKit {} ({}) logging initialised", VERSION, BUILD_DATE);
    Ok(())
}

/// Creates a workbench from the per-user config file, falling back to
/// defaults when it does not exist.
pub fn workbench_from_user_config() -> anyhow::Result<Workbench> {
    let path = scenekit_settings::default_config_path()?;
    Ok(Workbench::new(EditorConfig::load_or_default(&path)?))
}
