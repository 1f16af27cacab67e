use serde::{Deserialize, Serialize};

use crate::geometry::{Bounds, Dbu, DbuXy};
use crate::ids::{GroupId, RegionId, RowId, SiteId};
use crate::instance::Orientation;

/// A placement row of repeated sites.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalRow {
    pub id: RowId,
    pub name: String,
    pub site: SiteId,
    pub origin: DbuXy,
    pub orientation: Orientation,
    /// Site width and height.
    pub step: DbuXy,
    pub num_sites: DbuXy,
    pub bounds: Bounds,
}

impl PhysicalRow {
    pub fn width(&self) -> Dbu {
        self.step.x * self.num_sites.x
    }

    pub fn height(&self) -> Dbu {
        self.step.y * self.num_sites.y
    }

    pub fn area(&self) -> Dbu {
        self.bounds.area()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RegionType {
    Fence,
    Guide,
    Invalid,
}

impl RegionType {
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_uppercase().as_str() {
            "FENCE" => RegionType::Fence,
            "GUIDE" => RegionType::Guide,
            _ => RegionType::Invalid,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalRegion {
    pub id: RegionId,
    pub name: String,
    pub region_type: RegionType,
    pub bounds: Vec<Bounds>,
}

/// Instances matching any of `patterns` are constrained to `region`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalGroup {
    pub id: GroupId,
    pub name: String,
    pub patterns: Vec<String>,
    pub region: Option<RegionId>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PhysicalDie {
    pub bounds: Bounds,
}
