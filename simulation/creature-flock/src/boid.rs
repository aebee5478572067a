//! Boid agents

use std::f32::consts::TAU;

use glam::{Mat4, Quat, Vec3};
use rand::Rng;

/// A single flocking agent
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Boid {
    pub position: Vec3,
    /// Displacement per tick
    pub velocity: Vec3,
    /// Steering accumulated during the current tick
    pub acceleration: Vec3,
}

impl Boid {
    pub fn new(position: Vec3, velocity: Vec3) -> Self {
        Self {
            position,
            velocity,
            acceleration: Vec3::ZERO,
        }
    }

    /// Distance to another boid
    pub fn distance(&self, other: &Self) -> f32 {
        self.position.distance(other.position)
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Direction of travel, or None when standing still
    pub fn heading(&self) -> Option<Vec3> {
        self.velocity.try_normalize()
    }

    /// Clamp the velocity to `max_speed`, keeping its direction
    pub fn limit_speed(&mut self, max_speed: f32) {
        if self.velocity.length() > max_speed {
            self.velocity = self.velocity.normalize_or_zero() * max_speed;
        }
    }

    /// Transform placing a model at this boid, turned to face its heading
    ///
    /// `forward` is the direction the model faces in its own space. A boid
    /// standing still keeps the model unrotated.
    pub fn instance_transform(&self, forward: Vec3) -> Mat4 {
        let rotation = match (forward.try_normalize(), self.heading()) {
            (Some(from), Some(to)) => Quat::from_rotation_arc(from, to),
            _ => Quat::IDENTITY,
        };
        Mat4::from_rotation_translation(rotation, self.position)
    }
}

/// Random direction, uniformly distributed over the unit sphere
pub fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.random_range(-1.0..=1.0);
    let phi: f32 = rng.random_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}
