//! Simulation loop: initialization, stepping and stop conditions.
//!
//! Coordinates are normalized up front so every tile has circumradius 1:
//! the input polygon is scaled by `sqrt(3) / edge_length`. The initial
//! tile count is the normalized area divided by the footprint area of one
//! tile, unless the configuration overrides it. All mutable run state
//! (energy history, pause accumulator, RNG stream) lives on the
//! [`Placement`] so independent runs can coexist and tests can build
//! deterministic fixtures.

use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{AreaEstimation, PlacementConfig, DEFAULT_STEP_BUDGET};
use crate::convergence::ConvergenceTracker;
use crate::density::{self, DensityAdjuster};
use crate::error::{PlacementError, PlacementResult};
use crate::field::{TileField, TilePose};
use crate::force;
use crate::geometry::Polygon;
use crate::neighbor;
use crate::overlap;
use crate::store::BodyStore;
use crate::{Point, Vector, EPSILON, TILE_AREA};

/// Diagnostics for one completed step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub frame: u64,
    pub tile_count: usize,
    /// Halved energy after this step.
    pub energy: f64,
    /// Packing quality K of this step.
    pub quality: f64,
    /// Whether a tile was removed at the end of this step.
    pub removed: bool,
}

/// A placement run: polygon, tile field, collaborating body store and all
/// convergence state.
pub struct Placement<S: BodyStore> {
    config: PlacementConfig,
    polygon: Polygon,
    store: S,
    field: TileField<S::Handle>,
    tracker: ConvergenceTracker,
    adjuster: DensityAdjuster,
    rng: StdRng,
    seed: u64,
    quality: f64,
}

impl<S: BodyStore> Placement<S> {
    /// Validate the polygon, derive the tile count and populate the field
    /// by rejection sampling inside the polygon's bounding box.
    ///
    /// The polygon is rejected before any body is created.
    pub fn new(
        vertices: Vec<Point>,
        edge_length: f64,
        config: PlacementConfig,
        mut store: S,
    ) -> PlacementResult<Self> {
        if !(edge_length > 0.0) {
            return Err(PlacementError::InvalidEdgeLength { edge_length });
        }
        let polygon = Polygon::new(vertices)?.scaled(3f64.sqrt() / edge_length);

        let seed = config.seed.unwrap_or_else(time_seed);
        let mut rng = StdRng::seed_from_u64(seed);

        let area = match config.area_estimation {
            AreaEstimation::Exact => polygon.area(),
            AreaEstimation::Sampled { samples } => polygon.sampled_area(samples, &mut rng),
        };
        let tile_count = config
            .tile_count
            .unwrap_or((area / TILE_AREA) as usize)
            .max(config.min_tile_count.max(1));
        info!(
            "placing {} tiles in polygon of normalized area {:.6} (seed {})",
            tile_count, area, seed
        );

        store.install_boundary(&polygon);

        let (lb, rt) = polygon.bounding_box();
        let mut handles = Vec::with_capacity(tile_count);
        for _ in 0..tile_count {
            let position = sample_inside(&polygon, lb, rt, config.sampling_attempts, &mut rng)?;
            let angle = rng.gen::<f64>() * std::f64::consts::TAU;
            handles.push(store.create(position, angle));
        }

        Ok(Self {
            config,
            polygon,
            store,
            field: TileField::new(handles),
            tracker: ConvergenceTracker::new(),
            adjuster: DensityAdjuster::new(),
            rng,
            seed,
            quality: 1.0,
        })
    }

    /// The seed this run is replayable from.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn tile_count(&self) -> usize {
        self.field.len()
    }

    /// Packing quality K of the most recent step; 1 before any step.
    pub fn quality(&self) -> f64 {
        self.quality
    }

    /// The normalized polygon the run works in.
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    /// Current tile poses in normalized coordinates.
    pub fn poses(&self) -> Vec<TilePose> {
        self.field.snapshot(&self.store)
    }

    /// One full step: neighbor search, overlap detection, force pass,
    /// velocity hand-off and integration, convergence bookkeeping and
    /// possibly a removal. Poses are snapshotted once, so force math for
    /// every tile sees the same consistent configuration.
    pub fn step(&mut self) -> PlacementResult<StepReport> {
        let poses = self.field.snapshot(&self.store);
        let neighbors = neighbor::find_neighbors(&self.config, &poses)?;
        let overlaps = overlap::detect(&self.polygon, &poses);
        let pass = force::step_forces(&self.config, &self.polygon, &poses, &neighbors, &overlaps)?;

        for i in 0..self.field.len() {
            self.store.set_velocity(
                self.field.handle(i),
                pass.linear[i],
                pass.angular_deg[i].to_radians(),
            );
        }
        self.store.step(self.config.dt);

        self.tracker.observe(pass.energy);
        self.adjuster.observe(&self.tracker, &mut self.rng);
        self.quality = pass.quality;

        let candidate = density::select_candidate(&pass.removal);
        let removed = if self.adjuster.should_remove(
            &self.config,
            &self.tracker,
            self.field.len(),
            pass.quality,
            candidate,
        ) {
            let index = candidate.expect("gate requires a candidate");
            self.remove_tile(index);
            true
        } else {
            false
        };

        let report = StepReport {
            frame: self.tracker.frame,
            tile_count: self.field.len(),
            energy: self.tracker.energy,
            quality: pass.quality,
            removed,
        };
        debug!(
            "frame {}, {} tiles, E = {:.6}, K = {:.6}",
            report.frame, report.tile_count, report.energy, report.quality
        );
        Ok(report)
    }

    /// Step until the budget is spent or the target quality is reached,
    /// returning the final poses.
    pub fn run(&mut self) -> PlacementResult<Vec<TilePose>> {
        self.run_until(|_| false)
    }

    /// Like [`run`](Self::run), with a cooperative stop check evaluated
    /// between steps so a caller can halt early and keep the best-so-far
    /// configuration.
    pub fn run_until(
        &mut self,
        mut stop: impl FnMut(&StepReport) -> bool,
    ) -> PlacementResult<Vec<TilePose>> {
        let budget = self.config.step_budget.unwrap_or(DEFAULT_STEP_BUDGET);
        while self.tracker.frame < budget {
            let report = self.step()?;
            if stop(&report) {
                break;
            }
            if let Some(target) = self.config.target_quality {
                // Removal is off the table once K clears the gate, so the
                // configuration is final.
                if report.quality >= target && report.quality >= self.config.quality_gate {
                    break;
                }
            }
        }
        Ok(self.poses())
    }

    /// Destroy the worst offender and reset convergence state. Swap-remove
    /// keeps the field dense; indices are only meaningful within a step
    /// anyway.
    fn remove_tile(&mut self, index: usize) {
        debug!(
            "removing tile {} of {} at frame {}",
            index,
            self.field.len(),
            self.tracker.frame
        );
        let handle = self.field.swap_remove(index);
        self.store.destroy(handle);
        for i in 0..self.field.len() {
            self.store
                .set_velocity(self.field.handle(i), Vector::new(0.0, 0.0), 0.0);
        }
        self.adjuster.reset();
        self.tracker.reset_minimum();
    }
}

fn time_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

fn sample_inside<R: Rng>(
    polygon: &Polygon,
    lb: Point,
    rt: Point,
    attempts: u32,
    rng: &mut R,
) -> PlacementResult<Point> {
    let width = rt.x - lb.x;
    let height = rt.y - lb.y;
    if width < EPSILON || height < EPSILON {
        return Err(PlacementError::DegenerateGeometry {
            context: "flat polygon bounding box",
        });
    }
    for _ in 0..attempts {
        let p = Point::new(rng.gen_range(lb.x..rt.x), rng.gen_range(lb.y..rt.y));
        if polygon.contains(&p) {
            return Ok(p);
        }
    }
    Err(PlacementError::SamplingExhausted { attempts })
}
