//! Error types for tile placement.

use std::fmt;

/// Errors that can occur while setting up or stepping a placement.
#[derive(Debug, Clone, PartialEq)]
pub enum PlacementError {
    /// Polygon has fewer than 3 vertices.
    DegeneratePolygon { vertices: usize },
    /// Polygon has an edge shorter than the epsilon threshold.
    DegenerateEdge { index: usize },
    /// Tile edge length must be strictly positive.
    InvalidEdgeLength { edge_length: f64 },
    /// A candidate point escaped all three sectors of a tile even after
    /// the widened threshold. Signals malformed orientation data or a
    /// broken geometric invariant.
    UnresolvedSector { tile: usize },
    /// A vector with magnitude below epsilon could not be normalized.
    DegenerateGeometry { context: &'static str },
    /// Rejection sampling failed to land inside the polygon within the
    /// configured attempt budget.
    SamplingExhausted { attempts: u32 },
}

impl fmt::Display for PlacementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlacementError::DegeneratePolygon { vertices } => {
                write!(f, "polygon needs at least 3 vertices, got {}", vertices)
            }
            PlacementError::DegenerateEdge { index } => {
                write!(f, "polygon edge {} is shorter than epsilon", index)
            }
            PlacementError::InvalidEdgeLength { edge_length } => {
                write!(f, "tile edge length must be positive, got {}", edge_length)
            }
            PlacementError::UnresolvedSector { tile } => {
                write!(f, "no sector resolved for tile {} after widened threshold", tile)
            }
            PlacementError::DegenerateGeometry { context } => {
                write!(f, "degenerate geometry: {}", context)
            }
            PlacementError::SamplingExhausted { attempts } => {
                write!(f, "no point inside polygon after {} sampling attempts", attempts)
            }
        }
    }
}

impl std::error::Error for PlacementError {}

/// Result type for placement operations.
pub type PlacementResult<T> = Result<T, PlacementError>;
