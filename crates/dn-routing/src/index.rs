//! Nearest-warehouse lookup.
//!
//! An R-tree (via `rstar`) over warehouse positions answers "which warehouse
//! is closest to this point" in O(log W).  Parcels use it to resolve their
//! first-mile and last-mile warehouses at creation.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use dn_core::Point;

// ── R-tree entry ──────────────────────────────────────────────────────────────

#[derive(Clone)]
struct WarehouseEntry {
    point: [f64; 2],
    index: usize,
}

impl RTreeObject for WarehouseEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for WarehouseEntry {
    /// Squared Euclidean distance in km².
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        dx * dx + dy * dy
    }
}

// ── WarehouseIndex ────────────────────────────────────────────────────────────

/// Spatial index over warehouse positions.  Returns positions in the slice
/// the index was built from.
pub struct WarehouseIndex {
    tree: RTree<WarehouseEntry>,
}

impl WarehouseIndex {
    /// Bulk-load the index from warehouse positions.
    pub fn new(positions: &[Point]) -> Self {
        let entries = positions
            .iter()
            .enumerate()
            .map(|(index, p)| WarehouseEntry { point: [p.x, p.y], index })
            .collect();
        Self { tree: RTree::bulk_load(entries) }
    }

    /// Index of the warehouse nearest to `pos`, or `None` if the index is
    /// empty.
    pub fn nearest(&self, pos: Point) -> Option<usize> {
        self.tree.nearest_neighbor(&[pos.x, pos.y]).map(|e| e.index)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
