//! Named animation clips

use log::warn;

use super::types::KeyframeTrack;
use crate::error::{AnimError, Result};
use crate::skeleton::NodeIndex;

/// Clip rate used when an asset declares a rate of zero
///
/// Asset converters commonly write 0 to mean "unspecified".
pub const DEFAULT_TICKS_PER_SECOND: f32 = 25.0;

/// A named, timed set of keyframe tracks for a skeleton
///
/// Tracks are stored in a table indexed by [`NodeIndex`], sized to the node
/// count of the skeleton the clip was built for. Nodes without a track use
/// their bind transform.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationClip {
    name: String,
    duration: f32,
    ticks_per_second: f32,
    tracks: Vec<Option<KeyframeTrack>>,
}

impl AnimationClip {
    /// Create an empty clip for a skeleton with `node_count` nodes
    ///
    /// `duration` is in ticks and must be positive. A `ticks_per_second` of 0
    /// is replaced by [`DEFAULT_TICKS_PER_SECOND`].
    pub fn new(
        name: impl Into<String>,
        duration: f32,
        ticks_per_second: f32,
        node_count: usize,
    ) -> Result<Self> {
        let name = name.into();

        if !duration.is_finite() || duration <= 0.0 {
            return Err(AnimError::InvalidClip {
                clip: name,
                reason: format!("duration must be positive, got {duration}"),
            });
        }
        if !ticks_per_second.is_finite() || ticks_per_second < 0.0 {
            return Err(AnimError::InvalidClip {
                clip: name,
                reason: format!("ticks per second must be non-negative, got {ticks_per_second}"),
            });
        }

        let ticks_per_second = if ticks_per_second == 0.0 {
            warn!(
                "Clip '{}' has no rate, using {} ticks per second",
                name, DEFAULT_TICKS_PER_SECOND
            );
            DEFAULT_TICKS_PER_SECOND
        } else {
            ticks_per_second
        };

        Ok(Self {
            name,
            duration,
            ticks_per_second,
            tracks: vec![None; node_count],
        })
    }

    /// Attach a track to a node
    ///
    /// Fails if the node is outside the skeleton or the keyframes are
    /// malformed. A second track for the same node replaces the first.
    pub fn insert_track(&mut self, node: NodeIndex, track: KeyframeTrack) -> Result<()> {
        let node_count = self.tracks.len();
        let slot = self.tracks.get_mut(node.0).ok_or_else(|| {
            AnimError::UnknownNode(format!(
                "clip '{}' animates node {} but the skeleton has {} nodes",
                self.name, node.0, node_count
            ))
        })?;

        track.validate().map_err(|reason| AnimError::InvalidTrack {
            node: format!("#{}", node.0),
            reason,
        })?;

        *slot = Some(track);
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Duration in ticks
    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn ticks_per_second(&self) -> f32 {
        self.ticks_per_second
    }

    /// Duration in seconds
    pub fn duration_seconds(&self) -> f32 {
        self.duration / self.ticks_per_second
    }

    /// Number of nodes the track table was sized for
    pub fn node_count(&self) -> usize {
        self.tracks.len()
    }

    /// Track for a node, if the clip animates it
    pub fn track(&self, node: NodeIndex) -> Option<&KeyframeTrack> {
        self.tracks.get(node.0).and_then(Option::as_ref)
    }

    /// Number of animated nodes
    pub fn animated_node_count(&self) -> usize {
        self.tracks.iter().filter(|t| t.is_some()).count()
    }

    /// Convert wall-clock seconds to a sample time inside the clip
    ///
    /// The clip always loops: `seconds * rate` wraps into `[0, duration)`,
    /// negative times included. A non-finite time samples the clip start.
    pub fn sample_time(&self, seconds: f32) -> f32 {
        let t = (seconds * self.ticks_per_second).rem_euclid(self.duration);
        // rem_euclid can round up to exactly `duration` for tiny negative inputs
        if t.is_finite() && t < self.duration {
            t
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Keyframe;
    use glam::Vec3;
    use test_case::test_case;

    #[test]
    fn test_rejects_zero_duration() {
        let err = AnimationClip::new("idle", 0.0, 1.0, 3).unwrap_err();
        assert!(matches!(err, AnimError::InvalidClip { .. }));
    }

    #[test]
    fn test_rejects_negative_rate() {
        assert!(AnimationClip::new("idle", 1.0, -2.0, 3).is_err());
    }

    #[test]
    fn test_zero_rate_uses_default() {
        let clip = AnimationClip::new("idle", 10.0, 0.0, 1).unwrap();
        assert_eq!(clip.ticks_per_second(), DEFAULT_TICKS_PER_SECOND);
    }

    #[test_case(0.5, 0.5 ; "inside")]
    #[test_case(1.25, 0.25 ; "wraps once")]
    #[test_case(7.75, 0.75 ; "wraps many")]
    #[test_case(-0.25, 0.75 ; "negative wraps backwards")]
    fn test_sample_time_loops(seconds: f32, expected: f32) {
        let clip = AnimationClip::new("walk", 1.0, 1.0, 1).unwrap();
        assert!((clip.sample_time(seconds) - expected).abs() < 1e-5);
    }

    #[test_case(f32::INFINITY ; "infinite")]
    #[test_case(f32::NEG_INFINITY ; "negative infinite")]
    #[test_case(f32::NAN ; "nan")]
    fn test_sample_time_non_finite(seconds: f32) {
        let clip = AnimationClip::new("walk", 1.0, 1.0, 1).unwrap();
        assert_eq!(clip.sample_time(seconds), 0.0);
    }

    #[test]
    fn test_sample_time_applies_rate() {
        let clip = AnimationClip::new("walk", 48.0, 24.0, 1).unwrap();
        assert!((clip.sample_time(0.5) - 12.0).abs() < 1e-5);
        assert!((clip.sample_time(2.5) - 12.0).abs() < 1e-4);
        assert!((clip.duration_seconds() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_insert_track_out_of_range() {
        let mut clip = AnimationClip::new("walk", 1.0, 1.0, 2).unwrap();
        let err = clip
            .insert_track(NodeIndex(5), KeyframeTrack::default())
            .unwrap_err();
        assert!(matches!(err, AnimError::UnknownNode(_)));
    }

    #[test]
    fn test_insert_track_rejects_unsorted() {
        let mut clip = AnimationClip::new("walk", 1.0, 1.0, 2).unwrap();
        let track = KeyframeTrack::from_positions(vec![
            Keyframe::new(1.0, Vec3::ZERO),
            Keyframe::new(0.0, Vec3::ONE),
        ]);
        assert!(matches!(
            clip.insert_track(NodeIndex(1), track),
            Err(AnimError::InvalidTrack { .. })
        ));
    }

    #[test]
    fn test_sparse_tracks() {
        let mut clip = AnimationClip::new("walk", 1.0, 1.0, 3).unwrap();
        clip.insert_track(NodeIndex(1), KeyframeTrack::default())
            .unwrap();

        assert!(clip.track(NodeIndex(0)).is_none());
        assert!(clip.track(NodeIndex(1)).is_some());
        assert!(clip.track(NodeIndex(9)).is_none());
        assert_eq!(clip.animated_node_count(), 1);
    }
}
