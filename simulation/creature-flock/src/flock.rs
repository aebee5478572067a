//! The flock simulator
//!
//! Each tick applies, per boid and in order: cohesion, separation,
//! alignment, boundary handling, then integrates velocity and position.
//! Boids are updated in place one after another, so a boid sees the
//! already-moved state of the boids before it in the same tick.

use glam::{Mat4, Vec3};
use log::{debug, trace};
use rand::Rng;

use crate::boid::{Boid, random_unit_vector};
use crate::error::Result;
use crate::params::FlockParams;

/// A set of boids sharing one set of parameters
#[derive(Debug, Clone, PartialEq)]
pub struct FlockSimulator {
    params: FlockParams,
    boids: Vec<Boid>,
    ticks: u64,
}

impl FlockSimulator {
    /// Create an empty flock
    pub fn new(params: FlockParams) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            params,
            boids: Vec::new(),
            ticks: 0,
        })
    }

    /// Random boid inside the bounds, moving at full speed in a random
    /// direction
    ///
    /// The boid is not added to the flock.
    pub fn make_boid<R: Rng + ?Sized>(&self, rng: &mut R) -> Boid {
        let size = self.params.bounds.size();
        let offset = Vec3::new(
            size.x * rng.random::<f32>(),
            size.y * rng.random::<f32>(),
            size.z * rng.random::<f32>(),
        );

        Boid::new(
            self.params.bounds.min + offset,
            random_unit_vector(rng) * self.params.max_speed,
        )
    }

    /// Add `count` random boids
    pub fn spawn<R: Rng + ?Sized>(&mut self, count: usize, rng: &mut R) {
        self.boids.reserve(count);
        for _ in 0..count {
            let boid = self.make_boid(rng);
            self.boids.push(boid);
        }
        debug!("Spawned {} boids, flock size {}", count, self.boids.len());
    }

    pub fn add(&mut self, boid: Boid) {
        self.boids.push(boid);
    }

    pub fn boids(&self) -> &[Boid] {
        &self.boids
    }

    pub fn params(&self) -> &FlockParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.boids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boids.is_empty()
    }

    /// Number of completed updates
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Advance the simulation by one tick
    pub fn update(&mut self) {
        for i in 0..self.boids.len() {
            let steer = cohesion(i, &self.boids, &self.params)
                + separation(i, &self.boids, &self.params)
                + alignment(i, &self.boids, &self.params);

            let boid = &mut self.boids[i];
            boid.acceleration += steer;
            apply_edges(boid, &self.params);

            boid.velocity += boid.acceleration;
            boid.limit_speed(self.params.max_speed);
            boid.acceleration = Vec3::ZERO;

            boid.position += boid.velocity;
        }

        self.ticks += 1;
        trace!("Flock tick {} ({} boids)", self.ticks, self.boids.len());
    }

    /// Mean position of the flock
    pub fn centroid(&self) -> Option<Vec3> {
        if self.boids.is_empty() {
            return None;
        }
        let sum: Vec3 = self.boids.iter().map(|b| b.position).sum();
        Some(sum / self.boids.len() as f32)
    }

    /// Mean speed of the flock, 0 when empty
    pub fn average_speed(&self) -> f32 {
        if self.boids.is_empty() {
            return 0.0;
        }
        self.boids.iter().map(Boid::speed).sum::<f32>() / self.boids.len() as f32
    }

    /// Number of boids currently outside the bounds
    pub fn escaped(&self) -> usize {
        self.boids
            .iter()
            .filter(|b| !self.params.bounds.contains(b.position))
            .count()
    }

    /// Per-boid model transforms for instanced rendering
    pub fn instance_transforms(&self, forward: Vec3) -> Vec<Mat4> {
        self.boids
            .iter()
            .map(|b| b.instance_transform(forward))
            .collect()
    }
}

/// Neighbours of boid `i` within `radius`, excluding itself
fn neighbours(i: usize, boids: &[Boid], radius: f32) -> impl Iterator<Item = &Boid> {
    let me = boids[i];
    boids
        .iter()
        .enumerate()
        .filter(move |&(j, other)| j != i && me.distance(other) <= radius)
        .map(|(_, other)| other)
}

/// Steer toward the centre of mass of visible neighbours
fn cohesion(i: usize, boids: &[Boid], params: &FlockParams) -> Vec3 {
    let (sum, n) = neighbours(i, boids, params.perception)
        .fold((Vec3::ZERO, 0u32), |(sum, n), b| (sum + b.position, n + 1));
    if n == 0 {
        return Vec3::ZERO;
    }

    let center = sum / n as f32;
    (center - boids[i].position) * params.cohesion_factor
}

/// Push away from neighbours closer than the separation distance
///
/// Coincident neighbours have no direction to push along and are skipped.
fn separation(i: usize, boids: &[Boid], params: &FlockParams) -> Vec3 {
    let me = boids[i].position;
    let (sum, n) = neighbours(i, boids, params.separation_distance)
        .filter_map(|b| (b.position - me).try_normalize())
        .fold((Vec3::ZERO, 0u32), |(sum, n), dir| (sum - dir, n + 1));
    if n == 0 {
        return Vec3::ZERO;
    }

    (sum / n as f32).normalize_or_zero() * params.repel_force
}

/// Steer toward the average velocity of visible neighbours
fn alignment(i: usize, boids: &[Boid], params: &FlockParams) -> Vec3 {
    let (sum, n) = neighbours(i, boids, params.perception)
        .fold((Vec3::ZERO, 0u32), |(sum, n), b| (sum + b.velocity, n + 1));
    if n == 0 {
        return Vec3::ZERO;
    }

    (sum / n as f32 - boids[i].velocity) * params.alignment_factor
}

/// Point the velocity back inside on every axis where the boid has left the
/// bounds
fn apply_edges(boid: &mut Boid, params: &FlockParams) {
    let bounds = &params.bounds;
    for axis in 0..3 {
        if boid.position[axis] > bounds.max[axis] {
            boid.velocity[axis] = -params.repel_force;
        } else if boid.position[axis] < bounds.min[axis] {
            boid.velocity[axis] = params.repel_force;
        }
    }
}
