//! Playback state of a skinned object

use crate::object::ClipId;

/// Clip and sample time used by the most recent update
///
/// The sample time is in clip ticks, already wrapped into the clip's
/// duration. With no clip the skeleton sits in its bind pose at time 0.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlaybackState {
    /// Clip that drove the last update
    pub clip: Option<ClipId>,
    /// Sample time inside the clip, in ticks
    pub sample_time: f32,
}

impl PlaybackState {
    /// Playback of `clip` at an already normalized sample time
    pub fn playing(clip: ClipId, sample_time: f32) -> Self {
        Self {
            clip: Some(clip),
            sample_time,
        }
    }

    /// Bind pose, no clip
    pub fn bind_pose() -> Self {
        Self::default()
    }
}
