use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Dbu, DbuXy, Dimension};
use crate::ids::LayerId;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    N,
    S,
    W,
    E,
    FN,
    FS,
    FW,
    FE,
}

impl Orientation {
    pub fn from_name(name: &str) -> Option<Self> {
        let orientation = match name.to_ascii_uppercase().as_str() {
            "N" | "R0" => Orientation::N,
            "S" | "R180" => Orientation::S,
            "W" | "R90" => Orientation::W,
            "E" | "R270" => Orientation::E,
            "FN" | "MY" => Orientation::FN,
            "FS" | "MX" => Orientation::FS,
            "FW" | "MX90" => Orientation::FW,
            "FE" | "MY90" => Orientation::FE,
            _ => return None,
        };
        Some(orientation)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PhysicalInstanceKind {
    Cell,
    Port,
    Module,
}

/// Placement state of a cell, port or module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalInstance {
    pub kind: PhysicalInstanceKind,
    pub fixed: bool,
    pub block: bool,
    pub placed: bool,
    /// The cell master has a primary-layer obstacle.
    pub has_layer_bounds: bool,
    pub orientation: Orientation,
    pub initial_position: DbuXy,
    pub bounds: Bounds,
    /// Only set for ports.
    pub port_layer: Option<LayerId>,
}

impl PhysicalInstance {
    pub(crate) fn new(kind: PhysicalInstanceKind, bounds: Bounds) -> Self {
        Self {
            kind,
            fixed: false,
            block: false,
            placed: false,
            has_layer_bounds: false,
            orientation: Orientation::N,
            initial_position: bounds.lower,
            bounds,
            port_layer: None,
        }
    }

    /// Lower corner of the placement rectangle.
    pub fn position(&self) -> DbuXy {
        self.bounds.lower
    }

    pub fn coordinate(&self, dim: Dimension) -> Dbu {
        self.bounds.lower[dim]
    }

    pub fn center(&self) -> DbuXy {
        self.bounds.center()
    }

    pub fn size(&self) -> DbuXy {
        self.bounds.length()
    }

    pub fn area(&self) -> Dbu {
        self.bounds.area()
    }

    pub fn is_movable(&self) -> bool {
        !self.fixed
    }

    pub fn has_moved(&self) -> bool {
        self.initial_position != self.position()
    }
}

/// Per-pin geometry, kept only when physical pins are enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalPin {
    /// Offset from the owning instance's lower corner.
    pub displacement: DbuXy,
    /// Library pin bound relative to the instance's lower corner.
    pub layer_bounds: Bounds,
    pub layer: Option<LayerId>,
}
