//! Already-parsed, language-neutral description records.
//!
//! Library records carry floating micron values; design records carry
//! integer coordinates in the design resolution.

use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Dbu, DbuXy};

/// A rectangle in microns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct DoubleRect {
    pub lower: [f64; 2],
    pub upper: [f64; 2],
}

impl DoubleRect {
    pub fn new(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            lower: [x0.min(x1), y0.min(y1)],
            upper: [x0.max(x1), y0.max(y1)],
        }
    }
}

// ── Library ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LibraryDescriptor {
    /// Database units per micron declared by the library.
    pub database_units: Option<Dbu>,
    pub sites: Vec<SiteDescriptor>,
    pub layers: Vec<LayerDescriptor>,
    pub vias: Vec<ViaDescriptor>,
    pub spacings: Vec<SpacingDescriptor>,
    pub macros: Vec<MacroDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteDescriptor {
    pub name: String,
    pub class: String,
    pub size: [f64; 2],
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerDescriptor {
    pub name: String,
    pub layer_type: String,
    pub direction: String,
    pub pitch: f64,
    pub spacing: f64,
    pub width: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViaLayerDescriptor {
    pub layer: String,
    pub rects: Vec<DoubleRect>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViaDescriptor {
    pub name: String,
    pub layers: Vec<ViaLayerDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SpacingDescriptor {
    pub layer1: String,
    pub layer2: String,
    pub distance: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleDescriptor {
    pub layer: String,
    pub rects: Vec<DoubleRect>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PortDescriptor {
    pub layer: String,
    pub rects: Vec<DoubleRect>,
    pub polygons: Vec<Vec<[f64; 2]>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PinDescriptor {
    pub name: String,
    pub direction: String,
    pub ports: Vec<PortDescriptor>,
}

/// A cell master.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MacroDescriptor {
    pub name: String,
    pub class: String,
    pub size: [f64; 2],
    pub pins: Vec<PinDescriptor>,
    pub obstacles: Vec<ObstacleDescriptor>,
}

// ── Design ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignDescriptor {
    pub name: String,
    /// Database units per micron declared by the design.
    pub database_units: Dbu,
    pub die: Bounds,
    pub components: Vec<ComponentDescriptor>,
    pub ports: Vec<IoPortDescriptor>,
    pub rows: Vec<RowDescriptor>,
    pub regions: Vec<RegionDescriptor>,
    pub groups: Vec<GroupDescriptor>,
    pub nets: Vec<NetDescriptor>,
}

/// Placement of a cell instance.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ComponentDescriptor {
    pub name: String,
    pub position: DbuXy,
    pub orientation: String,
    pub fixed: bool,
    pub placed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct IoPortDescriptor {
    pub name: String,
    pub position: DbuXy,
    pub layer: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RowDescriptor {
    pub name: String,
    pub site: String,
    pub origin: DbuXy,
    pub orientation: String,
    pub num_x: Dbu,
    pub num_y: Dbu,
}

impl Default for RowDescriptor {
    fn default() -> Self {
        Self {
            name: String::new(),
            site: String::new(),
            origin: DbuXy::default(),
            orientation: String::new(),
            num_x: 1,
            num_y: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegionDescriptor {
    pub name: String,
    pub region_type: String,
    pub rects: Vec<Bounds>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDescriptor {
    pub name: String,
    pub patterns: Vec<String>,
    pub region: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetDescriptor {
    pub name: String,
    pub wires: Vec<WireDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireDescriptor {
    pub segments: Vec<WireSegmentDescriptor>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct WireSegmentDescriptor {
    pub layer: String,
    pub points: Vec<DbuXy>,
    pub via: Option<String>,
    pub rect: Option<Bounds>,
    /// Half the layer width when absent.
    pub extension_begin: Option<Dbu>,
    pub extension_end: Option<Dbu>,
}
