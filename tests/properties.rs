use std::sync::Arc;

use beeswarm::layout::scales::extent;
use beeswarm::{Accessor, BandScale, Collide, ForceSet, LinearScale, NVec2, Parameters, Point, Simulation, SqrtScale};
use proptest::prelude::*;

fn categories(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("c{i}")).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn linear_scale_is_monotonic(
        d0 in -1e3f64..1e3,
        span in 1e-3f64..1e3,
        r0 in -1e3f64..1e3,
        width in 0.0f64..1e3,
        a in -2e3f64..2e3,
        b in -2e3f64..2e3,
    ) {
        let scale = LinearScale::new((d0, d0 + span), (r0, r0 + width));
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(scale.apply(lo) <= scale.apply(hi));
        prop_assert_eq!(scale.apply(d0), r0);
    }

    #[test]
    fn sqrt_radius_stays_in_range(lo in 1u64..1_000, extra in 0u64..100_000, pick in 0.0f64..=1.0) {
        let hi = lo + extra;
        let scale = SqrtScale::new((lo as f64, hi as f64), (1.0, 15.0));
        let w = lo as f64 + (hi - lo) as f64 * pick;
        let r = scale.apply(w);
        prop_assert!((1.0 - 1e-9..=15.0 + 1e-9).contains(&r), "radius {} for weight {}", r, w);
    }

    #[test]
    fn band_centers_are_ordered_and_inside(n in 1usize..8, padding in 0.0f64..0.9, r0 in 0.0f64..500.0, width in 10.0f64..1e3) {
        let band = BandScale::new(categories(n), (r0, r0 + width), padding);
        let centers: Vec<f64> = band.domain().iter().filter_map(|c| band.center(c)).collect();

        prop_assert_eq!(centers.len(), n);
        for pair in centers.windows(2) {
            prop_assert!(pair[0] < pair[1]);
        }
        for c in &centers {
            prop_assert!(*c > r0 && *c < r0 + width, "center {} outside [{}, {}]", c, r0, r0 + width);
        }
        prop_assert!(band.center("missing").is_none());
    }

    #[test]
    fn extent_matches_finite_bounds(values in prop::collection::vec(prop_oneof![-1e6f64..1e6, Just(f64::NAN), Just(f64::INFINITY)], 0..40)) {
        let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        match extent(values.iter().copied()) {
            None => prop_assert!(finite.is_empty()),
            Some((lo, hi)) => {
                prop_assert!(finite.iter().all(|v| *v >= lo && *v <= hi));
                prop_assert!(finite.contains(&lo) && finite.contains(&hi));
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn coincident_points_separate_without_nan(n in 2usize..20, r in 1.0f64..10.0, seed in any::<u64>()) {
        let points: Vec<Point> = (0..n)
            .map(|i| {
                let mut p = Point::new(format!("p{i}"), "Rural", 50.0, 100, r);
                p.x = NVec2::new(100.0, 100.0);
                p
            })
            .collect();
        let radius: Accessor = Arc::new(|p: &Point| p.radius);
        let params = Parameters { seed, ..Parameters::default() };
        let mut sim = Simulation::new(points, ForceSet::new().with(Collide::new(radius)), params, NVec2::zeros()).unwrap();

        let snapshot = sim.run(100);
        for m in &snapshot.markers {
            prop_assert!(m.x.is_finite() && m.y.is_finite());
        }
        let spread = snapshot.markers.iter().any(|m| m.x != 100.0 || m.y != 100.0);
        prop_assert!(spread);
    }
}
