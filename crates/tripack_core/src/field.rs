//! The live tile collection.
//!
//! `TileField` owns one body-store handle per tile. Membership only ever
//! shrinks: tiles are created once at initialization and removed one at a
//! time by the density adjuster via swap-remove, so indices are stable
//! within a step but not across removals.

use crate::store::BodyStore;
use crate::Point;

/// Pose snapshot of one tile, in normalized coordinates and degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TilePose {
    pub position: Point,
    pub angle_deg: f64,
}

/// Handles of the live tiles, indexed by tile id for the current step.
#[derive(Debug, Clone)]
pub struct TileField<H: Copy> {
    handles: Vec<H>,
}

impl<H: Copy> TileField<H> {
    pub fn new(handles: Vec<H>) -> Self {
        Self { handles }
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    pub fn handle(&self, index: usize) -> H {
        self.handles[index]
    }

    pub fn handles(&self) -> &[H] {
        &self.handles
    }

    /// Remove tile `index` by swapping in the last handle, returning the
    /// removed handle so the caller can destroy the backing body.
    pub fn swap_remove(&mut self, index: usize) -> H {
        self.handles.swap_remove(index)
    }

    /// Read every tile's pose from the store. The snapshot is taken once
    /// per step; all force math for the step works off it so poses stay
    /// consistent while forces are computed.
    pub fn snapshot<S>(&self, store: &S) -> Vec<TilePose>
    where
        S: BodyStore<Handle = H>,
    {
        self.handles
            .iter()
            .map(|&h| {
                let pose = store.pose(h);
                TilePose {
                    position: pose.position,
                    angle_deg: pose.angle.to_degrees(),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::EulerBodyStore;

    #[test]
    fn swap_remove_keeps_remaining_handles() {
        let mut store = EulerBodyStore::new();
        let a = store.create(Point::new(0.0, 0.0), 0.0);
        let b = store.create(Point::new(1.0, 0.0), 0.0);
        let c = store.create(Point::new(2.0, 0.0), 0.0);
        let mut field = TileField::new(vec![a, b, c]);

        let removed = field.swap_remove(0);
        assert_eq!(removed, a);
        assert_eq!(field.len(), 2);
        assert_eq!(field.handle(0), c);
        assert_eq!(field.handle(1), b);
    }

    #[test]
    fn snapshot_converts_angles_to_degrees() {
        let mut store = EulerBodyStore::new();
        let h = store.create(Point::new(3.0, 4.0), std::f64::consts::PI);
        let field = TileField::new(vec![h]);
        let poses = field.snapshot(&store);
        assert_eq!(poses.len(), 1);
        assert!((poses[0].angle_deg - 180.0).abs() < 1e-9);
        assert!((poses[0].position.x - 3.0).abs() < 1e-12);
    }
}
