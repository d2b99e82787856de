use nalgebra::{Point3, Quaternion, UnitQuaternion, Vector3};
use rand::Rng;
use std::f64::consts::TAU;

/// Draws a rotation uniformly distributed over SO(3).
///
/// Uses Shoemake's subgroup algorithm: three uniform deviates map to a unit
/// quaternion with uniform density on the 3-sphere.
pub fn random_rotation(rng: &mut impl Rng) -> UnitQuaternion<f64> {
    let u1: f64 = rng.gen_range(0.0..1.0);
    let u2: f64 = rng.gen_range(0.0..1.0);
    let u3: f64 = rng.gen_range(0.0..1.0);

    let a = (1.0 - u1).sqrt();
    let b = u1.sqrt();
    let q = Quaternion::new(
        b * (TAU * u3).cos(),
        a * (TAU * u2).sin(),
        a * (TAU * u2).cos(),
        b * (TAU * u3).sin(),
    );
    UnitQuaternion::new_normalize(q)
}

/// Draws a point uniformly from the axis-aligned region `[lo, hi)`.
///
/// Axes where `hi <= lo` collapse onto `lo`.
pub fn random_point_in(lo: &Point3<f64>, hi: &Point3<f64>, rng: &mut impl Rng) -> Point3<f64> {
    let mut sample = |l: f64, h: f64| if h > l { rng.gen_range(l..h) } else { l };
    Point3::new(sample(lo.x, hi.x), sample(lo.y, hi.y), sample(lo.z, hi.z))
}

/// Squared distance between two points.
pub fn distance_squared(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm_squared()
}

/// Component-wise extent of an axis-aligned bounding box.
pub fn extent(lo: &Point3<f64>, hi: &Point3<f64>) -> Vector3<f64> {
    hi - lo
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn random_rotation_is_unit_and_seed_deterministic() {
        let mut rng1 = StdRng::seed_from_u64(7);
        let mut rng2 = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let q1 = random_rotation(&mut rng1);
            let q2 = random_rotation(&mut rng2);
            assert!((q1.quaternion().norm() - 1.0).abs() < 1e-12);
            assert_eq!(q1, q2);
        }
    }

    #[test]
    fn random_rotations_cover_the_sphere() {
        let mut rng = StdRng::seed_from_u64(42);
        let n = 4000;
        let mean = (0..n)
            .map(|_| random_rotation(&mut rng) * Vector3::z())
            .fold(Vector3::zeros(), |acc, v| acc + v)
            / n as f64;
        assert!(mean.norm() < 0.05, "mean direction {mean:?} is biased");
    }

    #[test]
    fn random_point_stays_inside_region() {
        let mut rng = StdRng::seed_from_u64(1);
        let lo = Point3::new(0.2, 0.5, 1.0);
        let hi = Point3::new(1.0, 0.6, 1.0);
        for _ in 0..200 {
            let p = random_point_in(&lo, &hi, &mut rng);
            assert!(p.x >= lo.x && p.x < hi.x);
            assert!(p.y >= lo.y && p.y < hi.y);
            assert_eq!(p.z, 1.0);
        }
    }

    #[test]
    fn distance_and_extent() {
        let a = Point3::new(0.0, 0.0, 0.0);
        let b = Point3::new(1.0, 2.0, 2.0);
        assert_eq!(distance_squared(&a, &b), 9.0);
        assert_eq!(extent(&a, &b), Vector3::new(1.0, 2.0, 2.0));
    }
}
