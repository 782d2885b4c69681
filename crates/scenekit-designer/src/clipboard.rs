//! Descriptor-based copy and paste.
//!
//! The payload is plain data, serialisable to JSON so a host can put it on
//! the system clipboard. Pasting rebuilds entities through the factory and
//! reconnects copied connections through a source-id map.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use scenekit_core::{BoundingBox, ConnectorKind, EntityId, Point, Result};
use scenekit_settings::RoutingSettings;

use crate::factory::{ConnectionDescriptor, EntityDescriptor, EntityFactory};
use crate::graph::{self, ConnectorRef};
use crate::registry::ElementRegistry;
use crate::selection::SelectionService;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    #[serde(default)]
    pub entities: Vec<EntityDescriptor>,
    #[serde(default)]
    pub connections: Vec<ConnectionDescriptor>,
}

impl ClipboardPayload {
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.connections.is_empty()
    }

    /// Combined footprint of the copied entities.
    pub fn bounds(&self) -> Option<BoundingBox> {
        self.entities
            .iter()
            .map(EntityDescriptor::bounding_box)
            .reduce(|acc, bbox| acc.union(&bbox))
    }
}

#[derive(Debug, Clone)]
pub struct Clipboard {
    payload: ClipboardPayload,
    paste_count: u32,
    paste_step: f64,
}

impl Default for Clipboard {
    fn default() -> Self {
        Self::new(20.0)
    }
}

impl Clipboard {
    pub fn new(paste_step: f64) -> Self {
        Self {
            payload: ClipboardPayload::default(),
            paste_count: 0,
            paste_step,
        }
    }

    pub fn payload(&self) -> &ClipboardPayload {
        &self.payload
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn paste_count(&self) -> u32 {
        self.paste_count
    }

    /// Copies the selection. Connections come along only when both of their
    /// nodes are selected; a selected connection on its own is not copied.
    ///
    /// An empty selection empties the clipboard. Returns the number of
    /// entity descriptors captured.
    pub fn copy(&mut self, registry: &ElementRegistry, selection: &SelectionService) -> usize {
        self.paste_count = 0;
        let selected = selection.selected();

        let entities: Vec<EntityDescriptor> = selected
            .iter()
            .filter_map(|id| registry.get(*id))
            .filter_map(EntityDescriptor::describe)
            .collect();

        let mut seen = Vec::new();
        let mut connections = Vec::new();
        for id in selected {
            let Ok(node) = registry.node(*id) else {
                continue;
            };
            for conn_id in &node.connections {
                if seen.contains(conn_id) {
                    continue;
                }
                let Some(conn) = registry.get(*conn_id).and_then(|o| o.shape.as_connection()) else {
                    continue;
                };
                if selection.is_selected(conn.from_node) && selection.is_selected(conn.to_node) {
                    seen.push(*conn_id);
                    connections.push(ConnectionDescriptor::describe(*conn_id, conn));
                }
            }
        }

        tracing::debug!(
            "Copied {} entities and {} connections",
            entities.len(),
            connections.len()
        );
        let count = entities.len();
        self.payload = ClipboardPayload {
            entities,
            connections,
        };
        count
    }

    /// Offset the next paste is placed at.
    ///
    /// A finite pointer centres the payload on it. Without one, pastes
    /// stack diagonally by `paste_step` per repeat.
    fn next_offset(&mut self, pointer: Option<Point>) -> (f64, f64) {
        match pointer.filter(Point::is_finite) {
            Some(p) => match self.payload.bounds() {
                Some(bounds) => {
                    let c = bounds.center();
                    (p.x - c.x, p.y - c.y)
                }
                None => (0.0, 0.0),
            },
            None => {
                self.paste_count += 1;
                let d = self.paste_step * f64::from(self.paste_count);
                (d, d)
            }
        }
    }

    /// Pastes the payload and makes the pasted entities the selection.
    ///
    /// Connections whose endpoints were not both pasted are dropped. Returns
    /// the new ids, entities first, then connections.
    pub fn paste(
        &mut self,
        registry: &mut ElementRegistry,
        selection: &mut SelectionService,
        factory: &EntityFactory,
        pointer: Option<Point>,
        routing: &RoutingSettings,
    ) -> Result<Vec<EntityId>> {
        if self.payload.is_empty() {
            return Ok(Vec::new());
        }
        let (dx, dy) = self.next_offset(pointer);

        let mut pasted = Vec::new();
        let mut id_map: HashMap<EntityId, EntityId> = HashMap::new();
        for descriptor in &self.payload.entities {
            let shape = factory.from_descriptor(&descriptor.translated(dx, dy));
            let id = registry.add(shape);
            if let Some(source) = descriptor.source_id {
                id_map.insert(source, id);
            }
            pasted.push(id);
        }

        for descriptor in &self.payload.connections {
            let (Some(from), Some(to)) = (
                id_map.get(&descriptor.from_node),
                id_map.get(&descriptor.to_node),
            ) else {
                tracing::debug!("Dropping connection with an endpoint outside the paste");
                continue;
            };
            let endpoints = [
                ConnectorRef::new(*from, ConnectorKind::Output, descriptor.from_index),
                ConnectorRef::new(*to, ConnectorKind::Input, descriptor.to_index),
            ];
            if let Some(Err(e)) = endpoints
                .iter()
                .map(|c| graph::check_connector(registry, *c))
                .find(|r| r.is_err())
            {
                tracing::warn!("Skipping pasted connection: {}", e);
                continue;
            }
            let id = graph::add_connection(registry, descriptor.build(*from, *to), routing)?;
            pasted.push(id);
        }

        if !pasted.is_empty() {
            selection.set_selection(registry, pasted.iter().copied());
        }
        tracing::info!("Pasted {} entities at offset ({:.1}, {:.1})", pasted.len(), dx, dy);
        Ok(pasted)
    }

    pub fn clear(&mut self) {
        self.payload = ClipboardPayload::default();
        self.paste_count = 0;
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.payload)?)
    }

    /// Replaces the payload with one read from JSON.
    pub fn load_json(&mut self, json: &str) -> Result<()> {
        self.payload = serde_json::from_str(json)?;
        self.paste_count = 0;
        Ok(())
    }
}
