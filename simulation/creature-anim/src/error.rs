use thiserror::Error;

/// Error types for building skinned objects from object assets
///
/// Every variant describes a load-time structural problem. Per-frame
/// evaluation never fails: numerical degeneracies fall back to a defined
/// value instead.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimError {
    /// The node hierarchy is not a single tree rooted at node 0
    #[error("Invalid hierarchy: {0}")]
    InvalidHierarchy(String),

    /// Two nodes share a name, so name lookups would be ambiguous
    #[error("Duplicate node name: '{0}'")]
    DuplicateNodeName(String),

    /// A node refers to a joint id with no entry in the joint table
    #[error("Dangling joint reference: node '{node}' uses joint {joint}, but the joint table has {available} entries")]
    DanglingJoint {
        node: String,
        joint: u32,
        available: usize,
    },

    /// Two nodes are bound to the same joint id
    #[error("Duplicate joint id {joint}: bound by '{first}' and '{second}'")]
    DuplicateJoint {
        joint: u32,
        first: String,
        second: String,
    },

    /// A joint id does not fit in the fixed-size joint matrix array
    #[error("Joint id {joint} on node '{node}' exceeds the maximum of {max} joints")]
    TooManyJoints { node: String, joint: u32, max: usize },

    /// A clip or weight set refers to a node that does not exist
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// A weight set refers to a node that carries no joint binding
    #[error("Node '{0}' is not a joint")]
    NotAJoint(String),

    /// Keyframe data is unsorted or not finite
    #[error("Invalid track for node '{node}': {reason}")]
    InvalidTrack { node: String, reason: String },

    /// Clip metadata (duration, rate) is unusable
    #[error("Invalid clip '{clip}': {reason}")]
    InvalidClip { clip: String, reason: String },

    /// Weight data does not match the mesh it is bound to
    #[error("Invalid weights for mesh '{mesh}': {reason}")]
    InvalidWeights { mesh: String, reason: String },

    /// Mesh or instance data refers to something that does not exist
    #[error("Invalid mesh: {0}")]
    InvalidMesh(String),
}

/// Result type using AnimError
pub type Result<T> = std::result::Result<T, AnimError>;
