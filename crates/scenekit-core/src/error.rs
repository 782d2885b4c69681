//! Error handling for SceneKit
//!
//! Geometry and gesture code is total and never returns these. They cover
//! the structural operations a host can ask for that may be rejected:
//! - entity lookups by id
//! - connector and connection edits on nodes
//! - clipboard payload (de)serialisation
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

use crate::EntityId;

/// Which side of a node a connector sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorKind {
    /// Left edge, receives connections.
    Input,
    /// Right edge, starts connections.
    Output,
}

impl ConnectorKind {
    pub fn opposite(self) -> ConnectorKind {
        match self {
            ConnectorKind::Input => ConnectorKind::Output,
            ConnectorKind::Output => ConnectorKind::Input,
        }
    }
}

impl std::fmt::Display for ConnectorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectorKind::Input => write!(f, "input"),
            ConnectorKind::Output => write!(f, "output"),
        }
    }
}

/// Scene error type
#[derive(Error, Debug)]
pub enum SceneError {
    /// No live entity carries this id
    #[error("Entity {id} not found")]
    EntityNotFound {
        /// The missing id.
        id: EntityId,
    },

    /// Operation needs a node but the entity is another shape
    #[error("Entity {id} is not a node")]
    NotANode {
        /// The offending id.
        id: EntityId,
    },

    /// Connector index past the node's connector count
    #[error("Node {node} has no {kind} connector {index} (count {count})")]
    ConnectorOutOfRange {
        /// The node id.
        node: EntityId,
        /// Input or output side.
        kind: ConnectorKind,
        /// The requested index.
        index: usize,
        /// How many connectors that side has.
        count: usize,
    },

    /// Both ends of a connection on the same node
    #[error("Cannot connect node {node} to itself")]
    SelfConnection {
        /// The node id.
        node: EntityId,
    },

    /// Connections run output to input only
    #[error("Cannot connect {from} connector to {to} connector")]
    IncompatibleConnectors {
        /// Kind at the press point.
        from: ConnectorKind,
        /// Kind at the release point.
        to: ConnectorKind,
    },

    /// An id already present in the registry
    #[error("Entity id {id} already in use")]
    DuplicateId {
        /// The clashing id.
        id: EntityId,
    },

    /// Clipboard payload could not be encoded or decoded
    #[error("Clipboard payload error: {0}")]
    Clipboard(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl SceneError {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        SceneError::Other(msg.into())
    }

    pub fn not_found(id: EntityId) -> Self {
        SceneError::EntityNotFound { id }
    }

    /// Check if this is a lookup failure
    pub fn is_not_found(&self) -> bool {
        matches!(self, SceneError::EntityNotFound { .. })
    }

    /// Check if this is a rejected connection attempt
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            SceneError::SelfConnection { .. } | SceneError::IncompatibleConnectors { .. }
        )
    }
}

/// Result type using SceneError
pub type Result<T> = std::result::Result<T, SceneError>;
