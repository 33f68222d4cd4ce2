//! Tile-count adaptation: deciding when the population is infeasible and
//! which tile to sacrifice.
//!
//! Tiles are ranked ascending by (contact-bonus count, removal score); the
//! deletion candidate is the first whose absolute score reaches the mean
//! absolute score, a median-like robust pick of the worst offender that a
//! single extreme outlier cannot dominate.
//!
//! The removal gate is deliberately sluggish. Each step a uniform draw is
//! compared against `exp(1 - E / E_prev)`, so the pause accumulator mostly
//! grows while energy is rising; removal triggers only once the packing
//! quality K is below the quality gate AND either the accumulator exceeds
//! the square of the tile count or the stagnation counter exceeds its
//! budget. The exponential comparison is a tunable heuristic, not a
//! statistically derived stopping rule.

use rand::Rng;

use crate::config::PlacementConfig;
use crate::convergence::ConvergenceTracker;
use crate::force::RemovalRank;

/// Stochastic pause accumulator plus the removal decision logic.
#[derive(Debug, Clone, Default)]
pub struct DensityAdjuster {
    pause: u64,
}

impl DensityAdjuster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current pause accumulator value.
    pub fn pause(&self) -> u64 {
        self.pause
    }

    /// Advance the pause accumulator for one step. Draws from the RNG
    /// unconditionally so a run's random stream does not depend on the
    /// energy trajectory.
    pub fn observe<R: Rng>(&mut self, tracker: &ConvergenceTracker, rng: &mut R) {
        let draw: f64 = rng.gen();
        let ratio = if tracker.prev_energy.is_finite() && tracker.prev_energy > 0.0 {
            tracker.energy / tracker.prev_energy
        } else if tracker.prev_energy == 0.0 && tracker.energy > 0.0 {
            // Energy reappearing after a fully relaxed step: the ratio
            // blows up and the comparison degenerates to `0 < draw`.
            f64::INFINITY
        } else {
            0.0
        };
        if (1.0 - ratio).exp() < draw {
            self.pause += 1;
        }
    }

    /// Should the candidate be removed this step?
    pub fn should_remove(
        &self,
        config: &PlacementConfig,
        tracker: &ConvergenceTracker,
        tile_count: usize,
        quality: f64,
        candidate: Option<usize>,
    ) -> bool {
        if candidate.is_none() || quality >= config.quality_gate {
            return false;
        }
        if tile_count <= config.min_tile_count {
            return false;
        }
        let pause_threshold = (tile_count * tile_count) as u64;
        self.pause > pause_threshold || tracker.stagnation > config.stagnation_limit
    }

    /// Reset after a removal.
    pub fn reset(&mut self) {
        self.pause = 0;
    }
}

/// Pick the deletion candidate from this step's removal ranks.
///
/// Ascending sort by (bonus, score); first entry whose |score| is at least
/// the mean |score|. `None` when the field is empty or every score is
/// zero-mean degenerate.
pub fn select_candidate(removal: &[RemovalRank]) -> Option<usize> {
    if removal.is_empty() {
        return None;
    }
    let mut order: Vec<usize> = (0..removal.len()).collect();
    order.sort_by(|&a, &b| {
        removal[a]
            .bonus
            .cmp(&removal[b].bonus)
            .then(removal[a].score.total_cmp(&removal[b].score))
    });
    let mean: f64 =
        removal.iter().map(|r| r.score.abs()).sum::<f64>() / removal.len() as f64;
    order
        .into_iter()
        .find(|&i| removal[i].score.abs() >= mean)
}
