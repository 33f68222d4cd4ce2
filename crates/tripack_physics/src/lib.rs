//! Rapier-backed rigid-body store for tile placement.
//!
//! Wraps the full rapier pipeline behind the
//! [`BodyStore`](tripack_core::BodyStore) contract: one dynamic body per
//! tile with a small circle collider, and the polygon boundary installed
//! as static edge colliders. The placement algorithm does its own overlap
//! math, so the colliders only exist for the engine's internal
//! consistency; friction and restitution are zero to keep them from
//! fighting the corrective velocities.

use log::debug;
use rapier2d_f64::prelude as rapier;
use rapier::nalgebra::{Point2, Vector2};

use tripack_core::{BodyStore, Point, Polygon, Pose, Vector};

/// Collision radius of a tile body. Irrelevant to the force math but the
/// engine wants a non-zero shape.
pub const TILE_COLLIDER_RADIUS: f64 = 0.1;

/// Rapier physics world implementing the body-store contract.
pub struct RapierBodyStore {
    gravity: rapier::Vector<f64>,
    integration_parameters: rapier::IntegrationParameters,
    physics_pipeline: rapier::PhysicsPipeline,
    island_manager: rapier::IslandManager,
    broad_phase: rapier::DefaultBroadPhase,
    narrow_phase: rapier::NarrowPhase,
    rigid_body_set: rapier::RigidBodySet,
    collider_set: rapier::ColliderSet,
    impulse_joint_set: rapier::ImpulseJointSet,
    multibody_joint_set: rapier::MultibodyJointSet,
    ccd_solver: rapier::CCDSolver,
}

impl RapierBodyStore {
    /// A zero-gravity world; tiles move only by the velocities the force
    /// model sets.
    pub fn new() -> Self {
        Self {
            gravity: Vector2::new(0.0, 0.0),
            integration_parameters: rapier::IntegrationParameters::default(),
            physics_pipeline: rapier::PhysicsPipeline::new(),
            island_manager: rapier::IslandManager::new(),
            broad_phase: rapier::DefaultBroadPhase::new(),
            narrow_phase: rapier::NarrowPhase::new(),
            rigid_body_set: rapier::RigidBodySet::new(),
            collider_set: rapier::ColliderSet::new(),
            impulse_joint_set: rapier::ImpulseJointSet::new(),
            multibody_joint_set: rapier::MultibodyJointSet::new(),
            ccd_solver: rapier::CCDSolver::new(),
        }
    }

    /// Number of live rigid bodies, boundary body included.
    pub fn body_count(&self) -> usize {
        self.rigid_body_set.len()
    }
}

impl Default for RapierBodyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyStore for RapierBodyStore {
    type Handle = rapier::RigidBodyHandle;

    fn create(&mut self, position: Point, angle: f64) -> Self::Handle {
        let body = rapier::RigidBodyBuilder::dynamic()
            .translation(Vector2::new(position.x, position.y))
            .rotation(angle);
        let handle = self.rigid_body_set.insert(body);
        let collider = rapier::ColliderBuilder::ball(TILE_COLLIDER_RADIUS)
            .friction(0.0)
            .restitution(0.0)
            .density(1.0);
        self.collider_set
            .insert_with_parent(collider, handle, &mut self.rigid_body_set);
        handle
    }

    fn destroy(&mut self, handle: Self::Handle) {
        self.rigid_body_set.remove(
            handle,
            &mut self.island_manager,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            true,
        );
    }

    fn pose(&self, handle: Self::Handle) -> Pose {
        let body = &self.rigid_body_set[handle];
        let translation = body.translation();
        Pose {
            position: Point::new(translation.x, translation.y),
            angle: body.rotation().angle(),
        }
    }

    fn set_velocity(&mut self, handle: Self::Handle, linear: Vector, angular: f64) {
        let body = &mut self.rigid_body_set[handle];
        body.set_linvel(Vector2::new(linear.x, linear.y), true);
        body.set_angvel(angular, true);
    }

    fn install_boundary(&mut self, polygon: &Polygon) {
        let border = rapier::RigidBodyBuilder::fixed();
        let border_handle = self.rigid_body_set.insert(border);
        for i in 0..polygon.len() {
            let (u, v) = polygon.edge(i);
            let collider = rapier::ColliderBuilder::segment(
                Point2::new(u.x, u.y),
                Point2::new(v.x, v.y),
            )
            .friction(0.0)
            .restitution(0.0);
            self.collider_set.insert_with_parent(
                collider,
                border_handle,
                &mut self.rigid_body_set,
            );
        }
        debug!("installed boundary with {} edges", polygon.len());
    }

    fn step(&mut self, dt: f64) {
        self.integration_parameters.dt = dt;
        self.physics_pipeline.step(
            &self.gravity,
            &self.integration_parameters,
            &mut self.island_manager,
            &mut self.broad_phase,
            &mut self.narrow_phase,
            &mut self.rigid_body_set,
            &mut self.collider_set,
            &mut self.impulse_joint_set,
            &mut self.multibody_joint_set,
            &mut self.ccd_solver,
            None,
            &(),
            &(),
        );
    }
}
