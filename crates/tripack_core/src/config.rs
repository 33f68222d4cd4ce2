//! Placement configuration.
//!
//! Every tunable the relaxation relies on lives here with a documented
//! default, so property tests can vary them independently and runs can be
//! replayed from a recorded seed.

/// How the polygon area used for the initial tile count is estimated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaEstimation {
    /// Shoelace formula over the polygon vertices.
    Exact,
    /// Monte-Carlo estimate: sample the bounding box and count hits.
    Sampled { samples: u32 },
}

/// Configuration for a placement run.
#[derive(Debug, Clone)]
pub struct PlacementConfig {
    /// Half-angle of a tile's facing sector in degrees (default: 60).
    /// A neighbor candidate must lie within this cone of a sector heading.
    pub sector_half_angle: f64,

    /// Widened half-angle retried when no candidate passes the primary
    /// test (default: 70). Failure after this is a distinguished error.
    pub widened_sector_half_angle: f64,

    /// Quality gate for tile removal (default: 0.85). No tile is ever
    /// removed while the packing quality K is at or above this value.
    pub quality_gate: f64,

    /// Stop once K reaches this value and no removal is pending
    /// (default: None, run until the step budget is spent).
    pub target_quality: Option<f64>,

    /// Matched-edge midpoint distance below which a neighbor pair counts
    /// as near-perfect contact, biasing the tile's removal rank
    /// (default: 0.15).
    pub contact_bonus_distance: f64,

    /// Sector-midpoint distance to a boundary edge below which the tile
    /// picks up a removal-rank bonus (default: 0.1).
    pub edge_contact_bonus_distance: f64,

    /// Steps without an energy improvement before stagnation alone can
    /// trigger a removal (default: 7200).
    pub stagnation_limit: u32,

    /// Total step budget for [`run`](crate::Placement::run)
    /// (default: None, which falls back to 60_000).
    pub step_budget: Option<u64>,

    /// Explicit tile count, overriding the area-derived estimate
    /// (default: None).
    pub tile_count: Option<usize>,

    /// Removal never drops the population below this floor (default: 1).
    pub min_tile_count: usize,

    /// RNG seed (default: None, derived from the system clock).
    pub seed: Option<u64>,

    /// Area estimator used for the initial tile count (default: exact).
    pub area_estimation: AreaEstimation,

    /// Depth of the band behind a boundary edge used to measure how far a
    /// tile's footprint reaches past it, in normalized units (default: 4).
    pub boundary_band_depth: f64,

    /// Integration timestep handed to the body store (default: 1/60).
    pub dt: f64,

    /// Rejection-sampling attempts per tile before giving up
    /// (default: 10_000).
    pub sampling_attempts: u32,
}

/// Default sample count for the Monte-Carlo area estimator.
pub const DEFAULT_AREA_SAMPLES: u32 = 0xfff;

/// Step budget used by `run` when none is configured.
pub const DEFAULT_STEP_BUDGET: u64 = 60_000;

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            sector_half_angle: 60.0,
            widened_sector_half_angle: 70.0,
            quality_gate: 0.85,
            target_quality: None,
            contact_bonus_distance: 0.15,
            edge_contact_bonus_distance: 0.1,
            stagnation_limit: 7200,
            step_budget: None,
            tile_count: None,
            min_tile_count: 1,
            seed: None,
            area_estimation: AreaEstimation::Exact,
            boundary_band_depth: 4.0,
            dt: 1.0 / 60.0,
            sampling_attempts: 10_000,
        }
    }
}
