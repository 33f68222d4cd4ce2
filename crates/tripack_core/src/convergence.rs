//! Energy history and stagnation bookkeeping.

/// Tracks the energy metric across steps.
///
/// The force pass counts every violating pair from both sides, so the raw
/// energy is halved here before comparison. `min_energy` and the
/// stagnation counter reset whenever the density adjuster removes a tile,
/// since the reachable minimum changes with the population.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    /// Current (halved) energy.
    pub energy: f64,
    /// Energy of the previous step; drives the stochastic pause gate.
    pub prev_energy: f64,
    /// Lowest energy seen since the last removal.
    pub min_energy: f64,
    /// Steps since `min_energy` last improved.
    pub stagnation: u32,
    /// Total steps taken.
    pub frame: u64,
}

impl ConvergenceTracker {
    pub fn new() -> Self {
        Self {
            energy: f64::INFINITY,
            prev_energy: f64::INFINITY,
            min_energy: f64::INFINITY,
            stagnation: 0,
            frame: 0,
        }
    }

    /// Fold one force pass's raw energy into the history.
    pub fn observe(&mut self, raw_energy: f64) {
        let energy = raw_energy / 2.0;
        self.prev_energy = self.energy;
        self.energy = energy;
        self.frame += 1;
        if energy < self.min_energy {
            self.stagnation = 0;
        } else {
            self.stagnation += 1;
        }
        self.min_energy = self.min_energy.min(energy);
    }

    /// Forget the minimum after a removal; the frame counter keeps running.
    pub fn reset_minimum(&mut self) {
        self.min_energy = f64::INFINITY;
        self.prev_energy = f64::INFINITY;
        self.stagnation = 0;
    }
}

impl Default for ConvergenceTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn energy_is_halved_and_tracked() {
        let mut tracker = ConvergenceTracker::new();
        tracker.observe(10.0);
        assert_eq!(tracker.energy, 5.0);
        assert_eq!(tracker.min_energy, 5.0);
        assert_eq!(tracker.stagnation, 0);
        assert_eq!(tracker.frame, 1);
    }

    #[test]
    fn stagnation_counts_steps_without_improvement() {
        let mut tracker = ConvergenceTracker::new();
        tracker.observe(10.0);
        tracker.observe(12.0);
        tracker.observe(12.0);
        assert_eq!(tracker.stagnation, 2);
        assert_eq!(tracker.min_energy, 5.0);
        // An improvement resets the counter.
        tracker.observe(8.0);
        assert_eq!(tracker.stagnation, 0);
        assert_eq!(tracker.min_energy, 4.0);
    }

    #[test]
    fn reset_minimum_clears_history_but_not_frames() {
        let mut tracker = ConvergenceTracker::new();
        tracker.observe(10.0);
        tracker.observe(11.0);
        tracker.reset_minimum();
        assert_eq!(tracker.min_energy, f64::INFINITY);
        assert_eq!(tracker.stagnation, 0);
        assert_eq!(tracker.frame, 2);
    }
}
