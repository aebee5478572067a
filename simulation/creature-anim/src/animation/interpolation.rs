//! Keyframe search and interpolation

use glam::Quat;

use super::types::Keyframe;

/// Above this dot product two rotations are treated as parallel and blended
/// linearly, since `acos` loses precision near 1.
pub const SLERP_LINEAR_THRESHOLD: f32 = 0.9995;

/// Find the pair of keyframes bracketing time `t`
///
/// Returns None if the channel has no keyframes. Outside the keyed range the
/// first or last key is returned twice, pinning the value; the same happens
/// for a single-key channel and for a non-finite `t`.
pub fn find_keys<T>(keys: &[Keyframe<T>], t: f32) -> Option<(&Keyframe<T>, &Keyframe<T>)> {
    let first = keys.first()?;
    let last = keys.last()?;

    if keys.len() == 1 || !t.is_finite() || t < first.time {
        return Some((first, first));
    }
    if t >= last.time {
        return Some((last, last));
    }

    // First key whose time exceeds t; guaranteed to be in 1..len here
    let upper = keys.partition_point(|k| k.time <= t);
    Some((&keys[upper - 1], &keys[upper]))
}

/// Interpolation factor of `t` between two keys
///
/// A zero-length interval (including the pinned pair returned by
/// [`find_keys`]) yields 0, so the value stays on the first key.
pub fn interpolation_factor<T>(a: &Keyframe<T>, b: &Keyframe<T>, t: f32) -> f32 {
    let span = b.time - a.time;
    if span <= 0.0 {
        return 0.0;
    }
    ((t - a.time) / span).clamp(0.0, 1.0)
}

/// Spherical linear interpolation between two rotations
///
/// Takes the shorter arc and falls back to a normalized linear blend for
/// nearly parallel inputs.
pub fn slerp(a: Quat, b: Quat, t: f32) -> Quat {
    let a = a.normalize();
    let mut b = b.normalize();

    let mut dot = a.dot(b);
    if dot < 0.0 {
        b = -b;
        dot = -dot;
    }

    if dot > SLERP_LINEAR_THRESHOLD {
        return (a + (b - a) * t).normalize();
    }

    let theta_0 = dot.acos();
    let theta = theta_0 * t;
    let sin_theta_0 = theta_0.sin();

    let s0 = (theta_0 - theta).sin() / sin_theta_0;
    let s1 = theta.sin() / sin_theta_0;

    (a * s0 + b * s1).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn keys(times: &[f32]) -> Vec<Keyframe<f32>> {
        times.iter().map(|&t| Keyframe::new(t, t * 10.0)).collect()
    }

    fn times(pair: Option<(&Keyframe<f32>, &Keyframe<f32>)>) -> Option<(f32, f32)> {
        pair.map(|(a, b)| (a.time, b.time))
    }

    #[test]
    fn test_find_keys_empty() {
        let k: Vec<Keyframe<f32>> = vec![];
        assert!(find_keys(&k, 0.0).is_none());
    }

    #[test]
    fn test_find_keys_single() {
        let k = keys(&[100.0]);
        assert_eq!(times(find_keys(&k, -5.0)), Some((100.0, 100.0)));
        assert_eq!(times(find_keys(&k, 100.0)), Some((100.0, 100.0)));
        assert_eq!(times(find_keys(&k, 1e9)), Some((100.0, 100.0)));
    }

    #[test]
    fn test_find_keys_multiple() {
        let k = keys(&[0.0, 100.0, 200.0, 300.0]);

        // Before first
        assert_eq!(times(find_keys(&k, -1.0)), Some((0.0, 0.0)));

        // Between keyframes
        assert_eq!(times(find_keys(&k, 50.0)), Some((0.0, 100.0)));
        assert_eq!(times(find_keys(&k, 150.0)), Some((100.0, 200.0)));
        assert_eq!(times(find_keys(&k, 250.0)), Some((200.0, 300.0)));

        // At keyframes
        assert_eq!(times(find_keys(&k, 0.0)), Some((0.0, 100.0)));
        assert_eq!(times(find_keys(&k, 100.0)), Some((100.0, 200.0)));

        // At and after last
        assert_eq!(times(find_keys(&k, 300.0)), Some((300.0, 300.0)));
        assert_eq!(times(find_keys(&k, 400.0)), Some((300.0, 300.0)));
    }

    #[test]
    fn test_find_keys_non_finite_time() {
        let k = keys(&[0.0, 1.0, 2.0]);
        assert_eq!(times(find_keys(&k, f32::NAN)), Some((0.0, 0.0)));
        assert_eq!(times(find_keys(&k, f32::INFINITY)), Some((0.0, 0.0)));
        assert_eq!(times(find_keys(&k, f32::NEG_INFINITY)), Some((0.0, 0.0)));
    }

    #[test]
    fn test_interpolation_factor() {
        let a = Keyframe::new(1.0, 0.0f32);
        let b = Keyframe::new(3.0, 0.0f32);
        assert!((interpolation_factor(&a, &b, 2.0) - 0.5).abs() < 1e-6);
        assert_eq!(interpolation_factor(&a, &a, 2.0), 0.0);
    }

    #[test]
    fn test_slerp_shorter_arc() {
        let a = Quat::IDENTITY;
        let b = -Quat::from_rotation_y(0.5);

        // b is the same rotation as -b; the midpoint must be a quarter turn
        // of 0.25 rad, not the long way round
        let mid = slerp(a, b, 0.5);
        let expected = Quat::from_rotation_y(0.25);
        assert!(mid.dot(expected).abs() > 0.9999);
    }

    #[test]
    fn test_slerp_nearly_parallel() {
        let a = Quat::from_rotation_x(0.0001);
        let b = Quat::from_rotation_x(0.0002);
        let mid = slerp(a, b, 0.5);
        assert!((mid.length() - 1.0).abs() < 1e-6);
        let expected = Quat::from_rotation_x(0.00015);
        assert!(mid.dot(expected) > 0.999_999);
    }

    #[test]
    fn test_slerp_rotates_vector_halfway() {
        let a = Quat::IDENTITY;
        let b = Quat::from_rotation_z(std::f32::consts::FRAC_PI_2);
        let mid = slerp(a, b, 0.5);
        let v = mid * Vec3::X;
        let half = std::f32::consts::FRAC_PI_4;
        assert!((v - Vec3::new(half.cos(), half.sin(), 0.0)).length() < 1e-5);
    }
}
