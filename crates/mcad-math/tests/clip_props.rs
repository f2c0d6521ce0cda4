//! Property tests for parameter-space clipping.

use mcad_math::{clip_line, DVec2};
use proptest::prelude::*;

fn arb_inside() -> impl Strategy<Value = (f64, f64)> {
    (0.01f64..0.99, 0.01f64..0.99)
}

fn arb_outside_offset() -> impl Strategy<Value = (f64, f64)> {
    prop_oneof![
        (1.001f64..1.5, 0.01f64..0.99),
        (-0.5f64..-0.001, 0.01f64..0.99),
        (0.01f64..0.99, 1.001f64..1.5),
        (0.01f64..0.99, -0.5f64..-0.001),
    ]
}

proptest! {
    #[test]
    fn inside_segments_are_never_clipped(
        (ax, ay) in arb_inside(),
        (bx, by) in arb_inside(),
    ) {
        let r = clip_line(DVec2::new(ax, ay), DVec2::new(bx, by), (0.0, 1.0), (0.0, 1.0));
        prop_assert!(r.is_none());
    }

    #[test]
    fn exit_lies_on_boundary_and_entry_is_periodic_image(
        (ax, ay) in arb_inside(),
        (bx, by) in arb_outside_offset(),
    ) {
        let a = DVec2::new(ax, ay);
        let b = DVec2::new(bx, by);
        let r = clip_line(a, b, (0.0, 1.0), (0.0, 1.0)).expect("segment crosses the boundary");

        let on_edge = r.exit.x == 0.0 || r.exit.x == 1.0 || r.exit.y == 0.0 || r.exit.y == 1.0;
        prop_assert!(on_edge, "exit {:?} not on boundary", r.exit);

        // The exit point lies on the original segment.
        let ab = b - a;
        let t = (r.exit - a).dot(ab) / ab.length_squared();
        prop_assert!((0.0..=1.0).contains(&t));
        prop_assert!((a + ab * t - r.exit).length() < 1e-9);

        // Entry differs from exit by whole periods only.
        let shift = r.exit - r.entry;
        prop_assert!(shift.x == 0.0 || shift.x.abs() == 1.0);
        prop_assert!(shift.y == 0.0 || shift.y.abs() == 1.0);
        prop_assert!(shift != DVec2::ZERO);
    }
}
