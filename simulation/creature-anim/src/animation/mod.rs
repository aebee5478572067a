//! Keyframe animation
//!
//! This module provides the time-varying half of the skeleton system:
//! - Keyframe channels and per-node tracks with bind-pose fallback
//! - Bracketing key search and linear / spherical interpolation
//! - Named clips with looping sample time
//! - Playback state of an object
//!
//! # Example
//!
//! ```rust
//! use creature_anim::animation::{BindComponents, Keyframe, KeyframeTrack};
//! use glam::Vec3;
//!
//! let track = KeyframeTrack::from_positions(vec![
//!     Keyframe::new(0.0, Vec3::ZERO),
//!     Keyframe::new(10.0, Vec3::new(10.0, 0.0, 0.0)),
//! ]);
//!
//! let local = track.sample(5.0, &BindComponents::default());
//! assert!((local.w_axis.x - 5.0).abs() < 1e-5);
//! ```

mod clip;
mod interpolation;
mod state;
mod types;

pub use clip::{AnimationClip, DEFAULT_TICKS_PER_SECOND};
pub use interpolation::{SLERP_LINEAR_THRESHOLD, find_keys, interpolation_factor, slerp};
pub use state::PlaybackState;
pub use types::{BindComponents, Keyframe, KeyframeTrack, Lerp, sample_channel};
