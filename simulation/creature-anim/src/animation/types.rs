//! Common types for the keyframe animation system

use glam::{Mat4, Quat, Vec3};

use super::interpolation::{find_keys, interpolation_factor, slerp};

/// A single timed sample of a channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Keyframe<T> {
    /// Time in clip ticks
    pub time: f32,
    /// Sampled value
    pub value: T,
}

impl<T> Keyframe<T> {
    /// Create a new keyframe
    pub const fn new(time: f32, value: T) -> Self {
        Self { time, value }
    }
}

/// Trait for types that can be interpolated between two keyframes
pub trait Lerp: Copy {
    /// Interpolate between self and other
    fn lerp(&self, other: &Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        self + (other - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        Vec3::lerp(*self, *other, t)
    }
}

impl Lerp for Quat {
    fn lerp(&self, other: &Self, t: f32) -> Self {
        // Rotations always take the spherical path
        slerp(*self, *other, t)
    }
}

/// Translation, rotation and scale of a node's bind-local transform
///
/// Used as the per-channel fallback when a track has no keys for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BindComponents {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl BindComponents {
    /// Decompose a bind-local matrix
    pub fn from_matrix(m: &Mat4) -> Self {
        let (scale, rotation, translation) = m.to_scale_rotation_translation();
        Self {
            translation,
            rotation,
            scale,
        }
    }
}

impl Default for BindComponents {
    fn default() -> Self {
        Self {
            translation: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

/// Position, rotation and scale keyframes for one animated node
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KeyframeTrack {
    pub position: Vec<Keyframe<Vec3>>,
    pub rotation: Vec<Keyframe<Quat>>,
    pub scale: Vec<Keyframe<Vec3>>,
}

impl KeyframeTrack {
    /// Create a track from its three channels
    ///
    /// Rotation keys are normalized so interpolation always works on unit
    /// quaternions.
    pub fn new(
        position: Vec<Keyframe<Vec3>>,
        rotation: Vec<Keyframe<Quat>>,
        scale: Vec<Keyframe<Vec3>>,
    ) -> Self {
        let rotation = rotation
            .into_iter()
            .map(|k| Keyframe::new(k.time, k.value.normalize()))
            .collect();
        Self {
            position,
            rotation,
            scale,
        }
    }

    /// Create a track with only a position channel
    pub fn from_positions(position: Vec<Keyframe<Vec3>>) -> Self {
        Self::new(position, Vec::new(), Vec::new())
    }

    /// Check if any channel has keyframes
    pub fn has_data(&self) -> bool {
        !self.position.is_empty() || !self.rotation.is_empty() || !self.scale.is_empty()
    }

    /// Check that every channel is sorted by time and finite
    pub fn validate(&self) -> std::result::Result<(), String> {
        check_channel("position", &self.position)?;
        check_channel("rotation", &self.rotation)?;
        check_channel("scale", &self.scale)
    }

    /// Sample the interpolated position, or the bind translation if the
    /// channel is empty
    pub fn sample_position(&self, t: f32, bind: &BindComponents) -> Vec3 {
        sample_channel(&self.position, t).unwrap_or(bind.translation)
    }

    /// Sample the interpolated rotation, or the bind rotation if the channel
    /// is empty
    pub fn sample_rotation(&self, t: f32, bind: &BindComponents) -> Quat {
        sample_channel(&self.rotation, t)
            .map(Quat::normalize)
            .unwrap_or(bind.rotation)
    }

    /// Sample the interpolated scale, or the bind scale if the channel is
    /// empty
    pub fn sample_scale(&self, t: f32, bind: &BindComponents) -> Vec3 {
        sample_channel(&self.scale, t).unwrap_or(bind.scale)
    }

    /// Local transform at time `t`, composed as translation * rotation * scale
    pub fn sample(&self, t: f32, bind: &BindComponents) -> Mat4 {
        Mat4::from_translation(self.sample_position(t, bind))
            * Mat4::from_quat(self.sample_rotation(t, bind))
            * Mat4::from_scale(self.sample_scale(t, bind))
    }
}

/// Interpolate a single channel at time `t`
///
/// Returns None for an empty channel.
pub fn sample_channel<T: Lerp>(keys: &[Keyframe<T>], t: f32) -> Option<T> {
    let (a, b) = find_keys(keys, t)?;
    let factor = interpolation_factor(a, b, t);
    Some(a.value.lerp(&b.value, factor))
}

fn check_channel<T>(name: &str, keys: &[Keyframe<T>]) -> std::result::Result<(), String> {
    if let Some(bad) = keys.iter().position(|k| !k.time.is_finite()) {
        return Err(format!("{name} key {bad} has a non-finite time"));
    }
    if let Some(i) = keys.windows(2).position(|w| w[1].time < w[0].time) {
        return Err(format!(
            "{name} keys are not sorted (key {} at {} follows {})",
            i + 1,
            keys[i + 1].time,
            keys[i].time
        ));
    }
    Ok(())
}
