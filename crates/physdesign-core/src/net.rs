use serde::{Deserialize, Serialize};

use crate::geometry::{Boundary, Bounds, Dbu, DbuXy, Dimension};
use crate::ids::{LayerId, PinId, ViaId};

/// A run of routed wire on one layer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicalWireSegment {
    /// Path points, with begin/end extensions already applied.
    pub points: Vec<DbuXy>,
    pub layer: Option<LayerId>,
    pub via: Option<ViaId>,
    pub rectangle: Option<Bounds>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicalWire {
    pub segments: Vec<PhysicalWireSegment>,
}

/// A library via dropped at a point of a routed wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhysicalViaInstance {
    pub via: ViaId,
    pub position: DbuXy,
}

/// Geometry of a net: pin bounding box, boundary pins and routing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhysicalNet {
    pub bounds: Bounds,
    /// Pin achieving each extreme, indexed `[boundary][dimension]`.
    bound_pins: [[Option<PinId>; 2]; 2],
    pub wires: Vec<PhysicalWire>,
    pub vias: Vec<PhysicalViaInstance>,
}

fn slot(boundary: Boundary, dim: Dimension) -> (usize, usize) {
    let b = match boundary {
        Boundary::Lower => 0,
        Boundary::Upper => 1,
    };
    let d = match dim {
        Dimension::X => 0,
        Dimension::Y => 1,
    };
    (b, d)
}

impl PhysicalNet {
    /// Half-perimeter wirelength per dimension.
    pub fn hpwl(&self) -> DbuXy {
        self.bounds.length()
    }

    pub fn hpwl_along(&self, dim: Dimension) -> Dbu {
        self.bounds.length_along(dim)
    }

    /// The pin recorded at one extreme of the bounding box.
    ///
    /// Only tracked when net pin boundaries are enabled.
    pub fn bound_pin(&self, boundary: Boundary, dim: Dimension) -> Option<PinId> {
        let (b, d) = slot(boundary, dim);
        self.bound_pins[b][d]
    }

    pub(crate) fn set_bound_pin(&mut self, boundary: Boundary, dim: Dimension, pin: PinId) {
        let (b, d) = slot(boundary, dim);
        self.bound_pins[b][d] = Some(pin);
    }

    pub fn num_wires(&self) -> usize {
        self.wires.len()
    }
}

/// Extend a wire path by `begin` and `end` along its first and last legs.
pub(crate) fn extend_path(points: &mut [DbuXy], begin: Dbu, end: Dbu) {
    if points.len() < 2 {
        return;
    }
    if begin > 0 {
        let (p0, p1) = (points[0], points[1]);
        points[0] = p0 + step(p1, p0).scale(begin);
    }
    if end > 0 {
        let k = points.len() - 1;
        let (p0, p1) = (points[k - 1], points[k]);
        points[k] = p1 + step(p0, p1).scale(end);
    }
}

/// Unit step pointing from `from` towards `to`, per axis.
fn step(from: DbuXy, to: DbuXy) -> DbuXy {
    DbuXy::new((to.x - from.x).signum(), (to.y - from.y).signum())
}
