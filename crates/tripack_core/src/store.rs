//! Rigid-body store collaborator contract.
//!
//! The relaxation never integrates poses itself. Each step it hands every
//! tile a linear and angular velocity and asks the store to advance all
//! bodies by one timestep. The production store wraps a physics engine
//! (see `tripack_physics`); [`EulerBodyStore`] is a plain explicit-Euler
//! integrator that keeps unit tests deterministic and dependency-free.

use crate::geometry::Polygon;
use crate::{Point, Vector};

/// Position and orientation of one body. Angles are radians; the
/// algorithm's degree math converts at this boundary.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Point,
    pub angle: f64,
}

/// Owns body poses and integrates velocities into new poses.
///
/// Handles are opaque; the caller keeps them in a
/// [`TileField`](crate::TileField) and must destroy each created body
/// exactly once.
pub trait BodyStore {
    type Handle: Copy + PartialEq;

    /// Create a body at `position` with orientation `angle` (radians).
    fn create(&mut self, position: Point, angle: f64) -> Self::Handle;

    /// Destroy a body. The handle must not be used afterwards.
    fn destroy(&mut self, handle: Self::Handle);

    /// Current pose of a body.
    fn pose(&self, handle: Self::Handle) -> Pose;

    /// Set the velocities integrated by the next [`step`](Self::step).
    /// Angular velocity is radians per second.
    fn set_velocity(&mut self, handle: Self::Handle, linear: Vector, angular: f64);

    /// Install the polygon boundary as static collision geometry. Stores
    /// without their own collision handling can ignore this; the force
    /// model corrects boundary violations regardless.
    fn install_boundary(&mut self, _polygon: &Polygon) {}

    /// Advance all bodies by `dt` seconds using their current velocities.
    fn step(&mut self, dt: f64);
}

#[derive(Debug, Clone, Copy)]
struct EulerBody {
    position: Point,
    angle: f64,
    linear: Vector,
    angular: f64,
}

/// Minimal store integrating poses with explicit Euler steps.
///
/// No collision handling, no damping. Handles are indices into a
/// tombstoned slot vector, so destroying a body never invalidates other
/// handles.
#[derive(Debug, Default)]
pub struct EulerBodyStore {
    bodies: Vec<Option<EulerBody>>,
}

impl EulerBodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live bodies.
    pub fn body_count(&self) -> usize {
        self.bodies.iter().filter(|b| b.is_some()).count()
    }
}

impl BodyStore for EulerBodyStore {
    type Handle = usize;

    fn create(&mut self, position: Point, angle: f64) -> usize {
        self.bodies.push(Some(EulerBody {
            position,
            angle,
            linear: Vector::new(0.0, 0.0),
            angular: 0.0,
        }));
        self.bodies.len() - 1
    }

    fn destroy(&mut self, handle: usize) {
        self.bodies[handle] = None;
    }

    fn pose(&self, handle: usize) -> Pose {
        let body = self.bodies[handle].as_ref().expect("destroyed body handle");
        Pose {
            position: body.position,
            angle: body.angle,
        }
    }

    fn set_velocity(&mut self, handle: usize, linear: Vector, angular: f64) {
        let body = self.bodies[handle].as_mut().expect("destroyed body handle");
        body.linear = linear;
        body.angular = angular;
    }

    fn step(&mut self, dt: f64) {
        for body in self.bodies.iter_mut().flatten() {
            body.position += body.linear * dt;
            body.angle += body.angular * dt;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn euler_store_integrates_velocities() {
        let mut store = EulerBodyStore::new();
        let h = store.create(Point::new(0.0, 0.0), 0.0);
        store.set_velocity(h, Vector::new(1.0, -2.0), 0.5);
        store.step(2.0);
        let pose = store.pose(h);
        assert!((pose.position.x - 2.0).abs() < 1e-12);
        assert!((pose.position.y + 4.0).abs() < 1e-12);
        assert!((pose.angle - 1.0).abs() < 1e-12);
    }

    #[test]
    fn destroy_leaves_other_handles_valid() {
        let mut store = EulerBodyStore::new();
        let a = store.create(Point::new(0.0, 0.0), 0.0);
        let b = store.create(Point::new(5.0, 5.0), 1.0);
        store.destroy(a);
        assert_eq!(store.body_count(), 1);
        let pose = store.pose(b);
        assert!((pose.position.x - 5.0).abs() < 1e-12);
    }
}
