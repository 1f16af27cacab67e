use rstar::{RTree, RTreeObject, AABB};

use crate::geometry::Bounds;
use crate::ids::InstanceId;

/// An entry in the R-tree spatial index, referencing an instance.
#[derive(Debug, Clone)]
pub struct SpatialEntry {
    pub instance: InstanceId,
    pub bounds: Bounds,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        envelope_of(&self.bounds)
    }
}

fn envelope_of(bounds: &Bounds) -> AABB<[i64; 2]> {
    AABB::from_corners(
        [bounds.lower.x, bounds.lower.y],
        [bounds.upper.x, bounds.upper.y],
    )
}

/// Spatial index over instance rectangles.
///
/// A snapshot: it does not follow later placement changes.
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self { tree: RTree::new() }
    }

    pub fn build(entries: Vec<SpatialEntry>) -> Self {
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Entries whose interior intersects the interior of `area`.
    pub fn query_overlapping(&self, area: &Bounds) -> Vec<&SpatialEntry> {
        self.tree
            .locate_in_envelope_intersecting(&envelope_of(area))
            .filter(|e| e.bounds.overlaps(area))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
