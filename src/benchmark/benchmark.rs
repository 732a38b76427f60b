use std::sync::Arc;
use std::time::Instant;

use crate::simulation::forces::{Accessor, Collide, Force};
use crate::simulation::jitter::Jitter;
use crate::simulation::states::{NVec2, Point};

/// Deterministic cloud of `n` points packed tightly enough to collide
fn bench_points(n: usize) -> Vec<Point> {
    let spread = (n as f64).sqrt() * 6.0;
    (0..n)
        .map(|i| {
            let i_f = i as f64;
            let mut p = Point::new(format!("p{i}"), "Rural", 50.0, 100 + i as u64, 2.0 + (i % 7) as f64);
            p.x = NVec2::new((i_f * 0.37).sin() * spread, (i_f * 0.13).cos() * spread);
            p
        })
        .collect()
}

fn time_collide(spatial_index: bool, points: &[Point]) -> f64 {
    let radius: Accessor = Arc::new(|p: &Point| p.radius);
    let mut collide = Collide::new(radius).spatial_index(spatial_index);
    let mut pts = points.to_vec();
    let mut jitter = Jitter::new(1);

    if collide.initialize(&pts).is_err() {
        return f64::NAN;
    }

    // Warm up
    collide.apply(1.0, &mut pts, &mut jitter);

    let mut pts = points.to_vec();
    let t0 = Instant::now();
    collide.apply(1.0, &mut pts, &mut jitter);
    t0.elapsed().as_secs_f64()
}

/// Compare one collision pass with and without the quadtree for growing n
pub fn bench_collide() {
    let ns = [200, 400, 800, 1600, 3200, 6400];

    for n in ns {
        let points = bench_points(n);
        let dt_direct = time_collide(false, &points);
        let dt_tree = time_collide(true, &points);
        println!("N = {n:5}, direct = {:8.6} s, quadtree = {:8.6} s", dt_direct, dt_tree);
    }
}
