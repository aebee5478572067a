//! Scenario tests for the flock simulator

use creature_flock::{Boid, Bounds, FlockError, FlockParams, FlockSimulator};
use glam::Vec3;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn still_params() -> FlockParams {
    FlockParams {
        bounds: Bounds::new(Vec3::splat(-10.0), Vec3::splat(10.0)),
        max_speed: 0.5,
        perception: 6.0,
        separation_distance: 1.0,
        cohesion_factor: 0.01,
        alignment_factor: 0.0,
        repel_force: 0.05,
    }
}

#[test]
fn test_rejects_invalid_params() {
    let params = FlockParams {
        max_speed: -1.0,
        ..FlockParams::default()
    };
    assert_eq!(
        FlockSimulator::new(params).unwrap_err(),
        FlockError::InvalidParameter {
            name: "max_speed",
            value: -1.0
        }
    );
}

#[test]
fn test_spawn_inside_bounds_at_full_speed() {
    init_logging();
    let params = FlockParams::default();
    let mut flock = FlockSimulator::new(params).unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    flock.spawn(200, &mut rng);

    assert_eq!(flock.len(), 200);
    assert_eq!(flock.escaped(), 0);
    for boid in flock.boids() {
        assert!((boid.speed() - params.max_speed).abs() < 1e-5);
        assert_eq!(boid.acceleration, Vec3::ZERO);
    }
}

#[test]
fn test_same_seed_same_flock() {
    let run = |seed| {
        let mut flock = FlockSimulator::new(FlockParams::default()).unwrap();
        flock.spawn(50, &mut StdRng::seed_from_u64(seed));
        for _ in 0..20 {
            flock.update();
        }
        flock.boids().to_vec()
    };
    assert_eq!(run(9), run(9));
}

#[test]
fn test_two_boids_drift_together() {
    init_logging();
    let mut flock = FlockSimulator::new(still_params()).unwrap();
    flock.add(Boid::new(Vec3::new(-2.0, 0.0, 0.0), Vec3::ZERO));
    flock.add(Boid::new(Vec3::new(2.0, 0.0, 0.0), Vec3::ZERO));

    let before = flock.boids()[0].distance(&flock.boids()[1]);
    flock.update();
    let after = flock.boids()[0].distance(&flock.boids()[1]);

    assert!(after < before, "{after} should be below {before}");
    assert!(flock.boids()[0].velocity.x > 0.0);
    assert!(flock.boids()[1].velocity.x < 0.0);
}

#[test]
fn test_escaped_boid_turns_back() {
    init_logging();
    let params = still_params();
    let mut flock = FlockSimulator::new(params).unwrap();
    flock.add(Boid::new(
        Vec3::new(12.0, -11.0, 0.0),
        Vec3::new(0.3, -0.3, 0.1),
    ));

    flock.update();
    let boid = flock.boids()[0];

    assert_eq!(boid.velocity.x, -params.repel_force);
    assert_eq!(boid.velocity.y, params.repel_force);
    assert_eq!(boid.velocity.z, 0.1);
    assert!(boid.position.x < 12.0);
    assert!(boid.position.y > -11.0);
}

#[test]
fn test_crowded_boids_spread() {
    let params = FlockParams {
        cohesion_factor: 0.0,
        ..still_params()
    };
    let mut flock = FlockSimulator::new(params).unwrap();
    flock.add(Boid::new(Vec3::ZERO, Vec3::ZERO));
    flock.add(Boid::new(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO));

    flock.update();
    let a = flock.boids()[0];
    let b = flock.boids()[1];
    assert!(a.velocity.z < 0.0);
    assert!(b.velocity.z > 0.0);
    assert!(a.distance(&b) > 0.5);
}

#[test]
fn test_instance_transforms_face_heading() {
    let mut flock = FlockSimulator::new(still_params()).unwrap();
    flock.add(Boid::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.2, 0.0, 0.0)));

    let transforms = flock.instance_transforms(Vec3::Z);
    let facing = transforms[0].transform_vector3(Vec3::Z);
    assert!((facing - Vec3::X).length() < 1e-5);
    assert!((transforms[0].w_axis.truncate() - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-6);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn speed_never_exceeds_limit(seed in any::<u64>(), count in 1usize..40, ticks in 1usize..30) {
        let mut flock = FlockSimulator::new(FlockParams::default()).unwrap();
        flock.spawn(count, &mut StdRng::seed_from_u64(seed));

        for _ in 0..ticks {
            flock.update();
            let limit = flock.params().max_speed + 1e-5;
            for boid in flock.boids() {
                prop_assert!(boid.speed() <= limit);
                prop_assert!(boid.position.is_finite());
                prop_assert_eq!(boid.acceleration, Vec3::ZERO);
            }
        }
        prop_assert_eq!(flock.ticks(), ticks as u64);
    }
}
