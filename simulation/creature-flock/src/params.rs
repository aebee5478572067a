//! Flock parameters

use glam::Vec3;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{FlockError, Result};

/// Radius within which neighbours count for cohesion and alignment
pub const DEFAULT_PERCEPTION: f32 = 6.0;
/// Velocity set on an axis when a boid leaves the bounds, and the magnitude
/// of the separation push
pub const DEFAULT_REPEL_FORCE: f32 = 0.0003;
pub const DEFAULT_COHESION_FACTOR: f32 = 0.000_004;
pub const DEFAULT_ALIGNMENT_FACTOR: f32 = 0.0001;
/// Neighbours closer than this push each other apart
pub const DEFAULT_SEPARATION_DISTANCE: f32 = 2.0;
/// Distance a boid may travel per tick
pub const DEFAULT_MAX_SPEED: f32 = 0.1;

/// Axis-aligned world box the flock is kept inside
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// Check if a point lies inside or on the box
    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    /// Check that the box is finite and not inverted
    pub fn validate(&self) -> Result<()> {
        for (axis, (min, max)) in ['x', 'y', 'z']
            .into_iter()
            .zip(self.min.to_array().into_iter().zip(self.max.to_array()))
        {
            if !min.is_finite() || !max.is_finite() || min > max {
                return Err(FlockError::InvalidBounds { axis, min, max });
            }
        }
        Ok(())
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min: Vec3::new(-50.0, 0.0, -50.0),
            max: Vec3::new(50.0, 30.0, 50.0),
        }
    }
}

/// Parameters of a flock simulation
///
/// Factors are per tick; speeds are distances per tick.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FlockParams {
    pub bounds: Bounds,
    pub max_speed: f32,
    pub perception: f32,
    pub separation_distance: f32,
    pub cohesion_factor: f32,
    pub alignment_factor: f32,
    pub repel_force: f32,
}

impl FlockParams {
    /// Default coefficients with the given bounds and speed limit
    pub fn new(bounds: Bounds, max_speed: f32) -> Self {
        Self {
            bounds,
            max_speed,
            ..Self::default()
        }
    }

    /// Check that every coefficient is finite and non-negative and the
    /// bounds are well formed
    pub fn validate(&self) -> Result<()> {
        let coefficients = [
            ("max_speed", self.max_speed),
            ("perception", self.perception),
            ("separation_distance", self.separation_distance),
            ("cohesion_factor", self.cohesion_factor),
            ("alignment_factor", self.alignment_factor),
            ("repel_force", self.repel_force),
        ];
        if let Some(&(name, value)) = coefficients
            .iter()
            .find(|(_, v)| !v.is_finite() || *v < 0.0)
        {
            return Err(FlockError::InvalidParameter { name, value });
        }

        self.bounds.validate()
    }
}

impl Default for FlockParams {
    fn default() -> Self {
        Self {
            bounds: Bounds::default(),
            max_speed: DEFAULT_MAX_SPEED,
            perception: DEFAULT_PERCEPTION,
            separation_distance: DEFAULT_SEPARATION_DISTANCE,
            cohesion_factor: DEFAULT_COHESION_FACTOR,
            alignment_factor: DEFAULT_ALIGNMENT_FACTOR,
            repel_force: DEFAULT_REPEL_FORCE,
        }
    }
}
