//! Library-level physical records: sites, vias, cell masters and their pins.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Dbu, DbuXy, Polygon};
use crate::ids::{LayerId, SiteId, ViaId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SiteClass {
    Core,
    Pad,
    Invalid,
}

impl SiteClass {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "CORE" => SiteClass::Core,
            "PAD" => SiteClass::Pad,
            _ => SiteClass::Invalid,
        }
    }
}

/// A placement site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalSite {
    pub id: SiteId,
    pub name: String,
    pub size: DbuXy,
    pub class: SiteClass,
}

impl PhysicalSite {
    pub fn width(&self) -> Dbu {
        self.size.x
    }

    pub fn height(&self) -> Dbu {
        self.size.y
    }
}

/// The shapes of a via on one layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalViaLayer {
    pub layer: Option<LayerId>,
    pub bounds: Vec<Bounds>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalVia {
    pub id: ViaId,
    pub name: String,
    pub layers: Vec<PhysicalViaLayer>,
}

/// Cell master class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MacroClass {
    Core,
    Block,
    Pad,
    Cover,
    Ring,
    Endcap,
    Invalid,
}

impl MacroClass {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "CORE" => MacroClass::Core,
            "BLOCK" => MacroClass::Block,
            "PAD" => MacroClass::Pad,
            "COVER" => MacroClass::Cover,
            "RING" => MacroClass::Ring,
            "ENDCAP" => MacroClass::Endcap,
            _ => MacroClass::Invalid,
        }
    }
}

/// A layer-tagged blockage on a cell master.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalObstacle {
    pub id: usize,
    pub layer: Option<LayerId>,
    pub bounds: Vec<Bounds>,
}

/// Physical view of a library cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalLibraryCell {
    pub size: DbuXy,
    pub macro_class: MacroClass,
    pub obstacles: Vec<PhysicalObstacle>,
    /// Index of the obstacle on the lowest routing layer.
    pub layer_bound_index: Option<usize>,
}

impl PhysicalLibraryCell {
    pub fn is_macro_block(&self) -> bool {
        self.macro_class == MacroClass::Block
    }

    pub fn area(&self) -> Dbu {
        self.size.x * self.size.y
    }

    /// The primary-layer obstacle, if the cell has one.
    pub fn layer_obstacle(&self) -> Option<&PhysicalObstacle> {
        self.layer_bound_index.and_then(|i| self.obstacles.get(i))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PinDirection {
    Input,
    Output,
    InOut,
    Invalid,
}

impl PinDirection {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "INPUT" => PinDirection::Input,
            "OUTPUT" => PinDirection::Output,
            "INOUT" => PinDirection::InOut,
            _ => PinDirection::Invalid,
        }
    }
}

/// One port of a library pin: shapes on a single layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalPinPort {
    pub id: usize,
    pub layer: Option<LayerId>,
    pub bounds: Vec<Bounds>,
    pub polygons: Vec<Polygon>,
}

/// Physical view of a library pin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalLibraryPin {
    pub direction: PinDirection,
    pub ports: Vec<PhysicalPinPort>,
    /// Bounding box over every port shape, relative to the cell origin.
    pub layer_bound: Bounds,
}

impl PhysicalLibraryPin {
    pub fn new(direction: PinDirection) -> Self {
        Self {
            direction,
            ports: Vec::new(),
            layer_bound: Bounds::empty(),
        }
    }

    /// Append a port and grow the aggregate bound over its shapes.
    pub fn add_port(&mut self, layer: Option<LayerId>, bounds: Vec<Bounds>, polygons: Vec<Polygon>) {
        for rect in &bounds {
            self.layer_bound.extend_to_point(rect.lower);
            self.layer_bound.extend_to_point(rect.upper);
        }
        for poly in &polygons {
            for p in &poly.points {
                self.layer_bound.extend_to_point(*p);
            }
        }
        let id = self.ports.len();
        self.ports.push(PhysicalPinPort {
            id,
            layer,
            bounds,
            polygons,
        });
    }

    /// Offset of the pin from its cell's lower corner; zero without shapes.
    pub fn displacement(&self) -> DbuXy {
        if self.layer_bound.is_empty() {
            DbuXy::default()
        } else {
            self.layer_bound.center()
        }
    }

    /// The first port's layer.
    pub fn layer(&self) -> Option<LayerId> {
        self.ports.first().and_then(|p| p.layer)
    }
}
