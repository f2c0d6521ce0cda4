//! Property tests for parameter folding and Bezier subdivision.

use mcad_geometry::bezier::{cubic_point, first_half, second_half};
use mcad_geometry::{fold_parameter, ParametricSurface, Torus};
use mcad_math::DVec3;
use proptest::prelude::*;

fn arb_point() -> impl Strategy<Value = DVec3> {
    (-10.0f64..10.0, -10.0f64..10.0, -10.0f64..10.0).prop_map(|(x, y, z)| DVec3::new(x, y, z))
}

proptest! {
    #[test]
    fn folded_parameter_is_in_range(x in -50.0f64..50.0, lo in -3.0f64..3.0, len in 0.1f64..5.0) {
        let range = (lo, lo + len);
        let f = fold_parameter(x, range, true);
        prop_assert!(f >= range.0 && f < range.1, "{} folded to {}", x, f);
        let periods = (x - f) / len;
        prop_assert!((periods - periods.round()).abs() < 1e-6);
    }

    #[test]
    fn clamped_parameter_is_in_range(x in -50.0f64..50.0) {
        let f = fold_parameter(x, (0.0, 1.0), false);
        prop_assert!((0.0..=1.0).contains(&f));
    }

    #[test]
    fn torus_point_is_periodic(u in -2.0f64..2.0, v in -2.0f64..2.0) {
        let torus = Torus::new(DVec3::ZERO, DVec3::Z, 2.0, 0.5);
        let a = torus.point_at(u, v);
        let b = torus.point_at(u + 1.0, v - 1.0);
        prop_assert!((a - b).length() < 1e-9);
    }

    #[test]
    fn halves_reproduce_cubic(
        p0 in arb_point(), p1 in arb_point(), p2 in arb_point(), p3 in arb_point(),
        t in 0.0f64..1.0,
    ) {
        let cp = [p0, p1, p2, p3];
        let left = first_half(&cp);
        let right = second_half(&cp);
        prop_assert!((cubic_point(&left, t) - cubic_point(&cp, 0.5 * t)).length() < 1e-9);
        prop_assert!((cubic_point(&right, t) - cubic_point(&cp, 0.5 + 0.5 * t)).length() < 1e-9);
    }
}
