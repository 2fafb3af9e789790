use criterion::{criterion_group, criterion_main, Criterion};
use dstar_lite_grid::DStarLite;
use grid_util::Point;
use rand::prelude::*;
use std::hint::black_box;

fn random_search(n: usize, rng: &mut StdRng) -> DStarLite {
    let goal = Point::new(n as i32 - 1, n as i32 - 1);
    let agent = Point::new(0, 0);
    let mut search = DStarLite::new(n, n, goal, agent).unwrap();
    for x in 0..n as i32 {
        for y in 0..n as i32 {
            let p = Point::new(x, y);
            if p != goal && p != agent && rng.gen_bool(0.2) {
                search.toggle_obstacle(p).unwrap();
            }
        }
    }
    search
}

fn initial_solve(c: &mut Criterion) {
    for n in [32, 64, 128] {
        let mut rng = StdRng::seed_from_u64(0);
        let search = random_search(n, &mut rng);
        c.bench_function(format!("initial solve, {n}x{n}").as_str(), |b| {
            b.iter_batched_ref(
                || {
                    let mut fresh = DStarLite::new(n, n, search.goal(), search.agent()).unwrap();
                    for x in 0..n as i32 {
                        for y in 0..n as i32 {
                            let p = Point::new(x, y);
                            if search.grid().is_obstacle(p) {
                                fresh.set_obstacle(p, true).unwrap();
                            }
                        }
                    }
                    fresh
                },
                |fresh| black_box(fresh.compute_shortest_path()),
                criterion::BatchSize::LargeInput,
            )
        });
    }
}

fn incremental_toggle(c: &mut Criterion) {
    for n in [32, 64, 128] {
        let mut rng = StdRng::seed_from_u64(0);
        let mut search = random_search(n, &mut rng);
        search.compute_shortest_path().unwrap();
        c.bench_function(format!("toggle and repair, {n}x{n}").as_str(), |b| {
            b.iter(|| {
                let p = Point::new(rng.gen_range(1..n as i32 - 1), rng.gen_range(1..n as i32 - 1));
                let _ = search.toggle_obstacle(p);
                black_box(search.compute_shortest_path())
            })
        });
    }
}

criterion_group!(benches, initial_solve, incremental_toggle);
criterion_main!(benches);
