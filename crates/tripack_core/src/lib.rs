//! Force-relaxed packing of triangular tiles inside a simple polygon.
//!
//! Given a polygon and a target tile edge length, the algorithm places a
//! candidate number of rigid, three-fold-symmetric tiles (equilateral
//! triangle footprints) and relaxes them iteratively: each step computes a
//! corrective linear and angular velocity per tile from its three sector
//! neighbors, its overlaps with other tiles, and its overlaps with the
//! polygon boundary. When the configuration stagnates at an energy level
//! that indicates the tile count is infeasible, the worst-offending tile is
//! removed and convergence state resets.
//!
//! Pose storage and velocity integration are delegated to a [`BodyStore`]
//! collaborator; geometric predicates are built on `parry2d`. The crate
//! ships a plain explicit-Euler store for deterministic tests, while
//! `tripack_physics` provides the rapier-backed store used in production.
//!
//! ```ignore
//! use tripack_core::{Placement, PlacementConfig, Point, store::EulerBodyStore};
//!
//! let square = vec![
//!     Point::new(0.0, 0.0),
//!     Point::new(10.0, 0.0),
//!     Point::new(10.0, 10.0),
//!     Point::new(0.0, 10.0),
//! ];
//! let config = PlacementConfig { seed: Some(42), ..Default::default() };
//! let mut placement = Placement::new(square, 1.0, config, EulerBodyStore::new())?;
//! let poses = placement.run()?;
//! ```

pub mod angle;
pub mod config;
pub mod convergence;
pub mod density;
pub mod error;
pub mod field;
pub mod force;
pub mod geometry;
pub mod neighbor;
pub mod overlap;
pub mod simulation;
pub mod store;

/// 2D point in world or normalized coordinates.
pub type Point = parry2d_f64::na::Point2<f64>;
/// 2D vector.
pub type Vector = parry2d_f64::na::Vector2<f64>;

/// Magnitudes below this are treated as degenerate throughout the crate.
pub const EPSILON: f64 = 1e-9;

/// Footprint area of one tile in normalized units (circumradius 1).
pub const TILE_AREA: f64 = 3.0 * 1.732_050_807_568_877_2 / 4.0;

pub use config::{AreaEstimation, PlacementConfig, DEFAULT_AREA_SAMPLES, DEFAULT_STEP_BUDGET};
pub use error::{PlacementError, PlacementResult};
pub use field::{TileField, TilePose};
pub use geometry::Polygon;
pub use simulation::{Placement, StepReport};
pub use store::{BodyStore, Pose};
