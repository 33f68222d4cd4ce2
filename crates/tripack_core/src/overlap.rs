//! Overlap detection between tile footprints and the boundary.
//!
//! Independent of the neighbor search: a tile can have a nearest neighbor
//! in a sector and simultaneously overlap that same tile, another tile, or
//! a polygon edge.

use crate::field::TilePose;
use crate::geometry::{self, Polygon};

/// Per-tile overlap lists for one step.
#[derive(Debug, Clone, PartialEq)]
pub struct Overlaps {
    /// For each tile, indices of other tiles whose footprints intersect it.
    pub tiles: Vec<Vec<usize>>,
    /// For each tile, indices of polygon edges its footprint intersects.
    pub edges: Vec<Vec<usize>>,
}

impl Overlaps {
    /// True when no tile overlaps anything.
    pub fn is_clear(&self) -> bool {
        self.tiles.iter().all(Vec::is_empty) && self.edges.iter().all(Vec::is_empty)
    }
}

/// Run the pairwise tile/tile and tile/edge intersection tests over a pose
/// snapshot.
pub fn detect(polygon: &Polygon, poses: &[TilePose]) -> Overlaps {
    let mut tiles = vec![Vec::new(); poses.len()];
    let mut edges = vec![Vec::new(); poses.len()];

    for (i, p1) in poses.iter().enumerate() {
        for (j, p2) in poses.iter().enumerate() {
            if i != j
                && geometry::tiles_intersect(p1.position, p1.angle_deg, p2.position, p2.angle_deg)
            {
                tiles[i].push(j);
            }
        }
        for e in 0..polygon.len() {
            let (u, v) = polygon.edge(e);
            if geometry::tile_intersects_segment(p1.position, p1.angle_deg, u, v) {
                edges[i].push(e);
            }
        }
    }

    Overlaps { tiles, edges }
}
