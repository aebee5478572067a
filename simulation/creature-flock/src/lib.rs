//! Boids flocking simulation
//!
//! A [`FlockSimulator`] moves a set of [`Boid`]s inside an axis-aligned
//! box using cohesion, separation and alignment steering plus a boundary
//! rule that turns escaping boids back.
//!
//! # Example
//!
//! ```rust
//! use creature_flock::{FlockParams, FlockSimulator};
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//!
//! let mut rng = StdRng::seed_from_u64(7);
//! let mut flock = FlockSimulator::new(FlockParams::default())?;
//! flock.spawn(32, &mut rng);
//!
//! for _ in 0..100 {
//!     flock.update();
//! }
//! assert!(flock.boids().iter().all(|b| b.speed() <= flock.params().max_speed + 1e-6));
//! # Ok::<(), creature_flock::FlockError>(())
//! ```

pub mod boid;
pub mod error;
pub mod flock;
pub mod params;

pub use boid::{Boid, random_unit_vector};
pub use error::{FlockError, Result};
pub use flock::FlockSimulator;
pub use params::{Bounds, FlockParams};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
