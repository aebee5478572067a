use thiserror::Error;

/// Error types for flock configuration
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FlockError {
    /// A coefficient is negative or not finite
    #[error("Invalid parameter '{name}': {value} (must be finite and non-negative)")]
    InvalidParameter { name: &'static str, value: f32 },

    /// The bounding box is inverted or not finite on an axis
    #[error("Invalid bounds on {axis} axis: min {min} > max {max}")]
    InvalidBounds { axis: char, min: f32, max: f32 },
}

/// Result type using FlockError
pub type Result<T> = std::result::Result<T, FlockError>;
