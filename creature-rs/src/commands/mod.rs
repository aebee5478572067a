//! Command implementations

pub mod flock;
pub mod object;
