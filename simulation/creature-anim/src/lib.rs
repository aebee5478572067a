//! Skeletal animation and hierarchical transforms for skinned creatures
//!
//! Loads a creature from an in-memory [`ObjectAsset`], evaluates its
//! skeleton pose each frame from looping keyframe clips and exposes the
//! resulting joint matrices to an external renderer.
//!
//! # Example
//!
//! ```rust
//! use creature_anim::asset::{JointDesc, NodeDesc, ObjectAsset};
//! use creature_anim::SkinnedObject;
//! use glam::{Mat4, Vec3};
//!
//! let asset = ObjectAsset {
//!     name: "stick".to_string(),
//!     hierarchy: vec![
//!         NodeDesc::new("root", Mat4::IDENTITY).with_children(vec![1]),
//!         NodeDesc::new("bone", Mat4::from_translation(Vec3::Y)).with_joint(0),
//!     ],
//!     joints: vec![JointDesc::new(Mat4::from_translation(-Vec3::Y))],
//!     ..ObjectAsset::default()
//! };
//!
//! let mut object = SkinnedObject::from_asset(&asset)?;
//! object.update(Mat4::IDENTITY, None, 0.0);
//! assert!(object.skinning_matrices()[0].abs_diff_eq(Mat4::IDENTITY, 1e-6));
//! # Ok::<(), creature_anim::AnimError>(())
//! ```

pub mod animation;
pub mod asset;
pub mod error;
pub mod object;
pub mod render;
pub mod skeleton;
pub mod skinning;

// Re-export common types
pub use animation::{AnimationClip, Keyframe, KeyframeTrack};
pub use asset::ObjectAsset;
pub use error::{AnimError, Result};
pub use object::{ClipId, Material, SkinnedObject};
pub use render::{DebugRenderer, DrawCommand, MeshRenderer, RenderPass};
pub use skeleton::{JointId, MAX_JOINTS, NodeIndex, Skeleton};
pub use skinning::{MAX_WEIGHTS_PER_VERTEX, MeshInstance};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
