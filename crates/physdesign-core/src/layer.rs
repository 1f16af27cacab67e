use serde::{Deserialize, Serialize};

use crate::geometry::Dbu;
use crate::ids::{LayerId, SpacingId};
use crate::registry::NamedRegistry;

/// Kind of technology layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LayerType {
    Routing,
    Cut,
    Masterslice,
    Overlap,
    Implant,
    Invalid,
}

impl LayerType {
    pub const COUNT: usize = 6;

    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "ROUTING" => LayerType::Routing,
            "CUT" => LayerType::Cut,
            "MASTERSLICE" => LayerType::Masterslice,
            "OVERLAP" => LayerType::Overlap,
            "IMPLANT" => LayerType::Implant,
            _ => LayerType::Invalid,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }
}

/// Preferred routing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerDirection {
    Horizontal,
    Vertical,
    Unknown,
}

impl LayerDirection {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "HORIZONTAL" => LayerDirection::Horizontal,
            "VERTICAL" => LayerDirection::Vertical,
            _ => LayerDirection::Unknown,
        }
    }
}

/// A technology layer, with dimensions in library units.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalLayer {
    pub id: LayerId,
    pub name: String,
    pub layer_type: LayerType,
    pub direction: LayerDirection,
    pub pitch: Dbu,
    pub spacing: Dbu,
    pub width: Dbu,
    /// Position among layers of the same type, counted from zero.
    pub relative_index: usize,
}

/// A minimum spacing between two layers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalSpacing {
    pub id: SpacingId,
    pub layer1: Option<LayerId>,
    pub layer2: Option<LayerId>,
    pub distance: Dbu,
}

/// All technology layers in definition order.
///
/// Ids are shared by every layer type; the relative index is per type.
#[derive(Debug, Clone)]
pub struct LayerStack {
    layers: NamedRegistry<LayerId, PhysicalLayer>,
    per_type: [usize; LayerType::COUNT],
}

impl LayerStack {
    pub fn new() -> Self {
        Self {
            layers: NamedRegistry::new("Layer"),
            per_type: [0; LayerType::COUNT],
        }
    }

    /// Add a layer. Returns `None` (with a warning) if the name is taken.
    pub fn add_layer(
        &mut self,
        name: &str,
        layer_type: LayerType,
        direction: LayerDirection,
        pitch: Dbu,
        spacing: Dbu,
        width: Dbu,
    ) -> Option<LayerId> {
        let relative_index = self.per_type[layer_type.slot()];
        let id = self.layers.insert_with(name, |id| PhysicalLayer {
            id,
            name: name.to_string(),
            layer_type,
            direction,
            pitch,
            spacing,
            width,
            relative_index,
        })?;
        self.per_type[layer_type.slot()] += 1;
        Some(id)
    }

    pub fn get_layer(&self, id: LayerId) -> Option<&PhysicalLayer> {
        self.layers.get(id)
    }

    pub fn layer_id(&self, name: &str) -> Option<LayerId> {
        self.layers.id_of(name)
    }

    pub fn get_layer_by_name(&self, name: &str) -> Option<&PhysicalLayer> {
        self.layers.get_by_name(name)
    }

    /// The lowest routing layer, if any was defined.
    pub fn lowest_routing_layer(&self) -> Option<LayerId> {
        self.layers
            .iter()
            .find(|(_, l)| l.layer_type == LayerType::Routing && l.relative_index == 0)
            .map(|(id, _)| id)
    }

    pub fn all_layers(&self) -> &[PhysicalLayer] {
        self.layers.values()
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    pub fn num_layers(&self, layer_type: LayerType) -> usize {
        self.per_type[layer_type.slot()]
    }

    pub fn reserve(&mut self, additional: usize) {
        self.layers.reserve(additional);
    }
}

impl Default for LayerStack {
    fn default() -> Self {
        Self::new()
    }
}
