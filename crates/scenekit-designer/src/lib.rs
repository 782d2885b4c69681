//! # SceneKit Designer
//!
//! The interaction engine of a 2D vector scene editor: the entity model,
//! selection, on-canvas handles, transform gestures, node-graph connections,
//! marquee selection and clipboard.
//!
//! ## Core Components
//!
//! ### Scene
//! - **Model**: Circles, rectangles, lines, text, nodes and connections
//! - **Registry**: Id-keyed entity store with draw order and hit testing
//! - **Graph**: Connect, disconnect and cascading delete for nodes
//! - **Routing**: Cubic bezier routes between node connectors
//!
//! ### Interaction
//! - **Selection**: Ordered selection with group rotation and pivot
//! - **Handles**: Scale, rotate, endpoint and bezier-control affordances
//! - **Transform**: Drag, scale, resize and rotate gesture state machine
//! - **Connectors**: Drag-to-connect and connector selection
//! - **Marquee**: Drag-rectangle selection
//! - **Clipboard**: Descriptor-based copy and paste
//!
//! ## Architecture
//!
//! ```text
//! Workbench (Event routing)
//!   ├── ElementRegistry (Entities, draw order)
//!   ├── SelectionService (Selection, group transform)
//!   ├── TransformController / ConnectorController / MarqueeSelection
//!   ├── Clipboard + EntityFactory
//!   └── EventBus (Structural change notifications)
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use scenekit_designer::{PointerEvent, ShapeType, Workbench};
//! use scenekit_core::Point;
//!
//! let mut bench = Workbench::default();
//! let id = bench.create(ShapeType::Rectangle, Point::new(100.0, 100.0)).unwrap();
//!
//! // Click the body to select it, then drag it.
//! bench.pointer_down(&PointerEvent::at(100.0, 100.0));
//! bench.pointer_move(&PointerEvent::at(120.0, 100.0));
//! bench.pointer_up(&PointerEvent::at(120.0, 100.0));
//!
//! assert_eq!(bench.selection(), &[id]);
//! ```

pub mod clipboard;
pub mod connector;
pub mod factory;
pub mod graph;
pub mod handles;
pub mod input;
pub mod marquee;
pub mod model;
pub mod registry;
pub mod routing;
pub mod selection;
pub mod transform;
pub mod workbench;

// Re-export the types hosts work with
pub use clipboard::{Clipboard, ClipboardPayload};
pub use connector::{connector_at, ConnectorController, ConnectorGesture, ConnectorOutcome, RemovedConnector};
pub use factory::{ConnectionDescriptor, EntityDescriptor, EntityFactory, ShapeDescriptor};
pub use graph::ConnectorRef;
pub use handles::{
    layout_for_selection, ControlPoint, Endpoint, GuideSegment, Handle, HandleDescriptor,
    HandleLayout, HandleShape, SelectionOutline,
};
pub use input::{KeyEvent, Modifiers, PointerButton, PointerEvent};
pub use marquee::{entities_in_rect, MarqueeSelection};
pub use model::{
    ConnectionRoute, SceneCircle, SceneConnection, SceneLine, SceneNode, SceneObject,
    SceneRectangle, SceneShape, SceneText, Shape, ShapeType, TextExtent,
};
pub use registry::ElementRegistry;
pub use selection::SelectionService;
pub use transform::{Gesture, TransformController};
pub use workbench::Workbench;
