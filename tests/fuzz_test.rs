/// Fuzzes the incremental search by applying random obstacle toggles and agent moves to many
/// random grids. After every repair the g-value of the agent must equal the breadth-first
/// distance to the goal, and the goal must keep an rhs-value of zero.
mod common;

use common::{bfs_cost, bfs_distance};
use dstar_lite_grid::{DStarLite, Error};
use grid_util::Point;
use rand::prelude::*;

fn random_point(n: usize, rng: &mut StdRng) -> Point {
    Point::new(rng.gen_range(0..n) as i32, rng.gen_range(0..n) as i32)
}

fn random_search(n: usize, rng: &mut StdRng) -> DStarLite {
    let goal = random_point(n, rng);
    let agent = random_point(n, rng);
    let mut search = DStarLite::new(n, n, goal, agent).unwrap();
    for x in 0..n as i32 {
        for y in 0..n as i32 {
            let p = Point::new(x, y);
            if p != goal && p != agent && rng.gen_bool(0.3) {
                search.toggle_obstacle(p).unwrap();
            }
        }
    }
    search
}

fn check(search: &mut DStarLite) {
    search.compute_shortest_path().unwrap();
    let expected = bfs_cost(search);
    let agent = search.agent();
    // Show the grid if the costs disagree
    if search.grid().g(agent) != expected {
        println!("{}", search);
    }
    assert_eq!(search.grid().g(agent), expected);
    assert!(search.is_consistent(agent));
    assert_eq!(search.grid().rhs(search.goal()), 0.0);
    assert_eq!(search.goal_reachable(), expected.is_finite());
    match search.path() {
        Some(path) => assert_eq!(Some(path.len() - 1), bfs_distance(search)),
        None => assert!(!expected.is_finite()),
    }
}

#[test]
fn fuzz() {
    const N: usize = 8;
    const N_GRIDS: usize = 300;
    const N_EDITS: usize = 30;
    let mut rng = StdRng::seed_from_u64(0);
    for _ in 0..N_GRIDS {
        let mut search = random_search(N, &mut rng);
        check(&mut search);
        let mut travelled = 0.0;
        for _ in 0..N_EDITS {
            if rng.gen_bool(0.7) {
                match search.toggle_obstacle(random_point(N, &mut rng)) {
                    Ok(_) | Err(Error::ReservedCell(_)) => {}
                    Err(e) => panic!("unexpected error {e}"),
                }
            } else {
                let from = search.agent();
                match search.move_agent() {
                    Ok(to) => travelled += from.manhattan_distance(&to) as f64,
                    Err(Error::NoPassableNeighbor(_)) | Err(Error::AlreadyAtGoal(_)) => {}
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
            check(&mut search);
            assert_eq!(search.km(), travelled);
        }
    }
}

/// Solving from scratch and repairing incrementally must agree on every cell the agent can
/// observe through its neighbours.
#[test]
fn fuzz_incremental_matches_fresh() {
    const N: usize = 7;
    const N_GRIDS: usize = 200;
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..N_GRIDS {
        let mut incremental = random_search(N, &mut rng);
        incremental.compute_shortest_path().unwrap();
        for _ in 0..10 {
            let _ = incremental.toggle_obstacle(random_point(N, &mut rng));
        }
        incremental.compute_shortest_path().unwrap();

        let mut fresh =
            DStarLite::new(N, N, incremental.goal(), incremental.agent()).unwrap();
        for x in 0..N as i32 {
            for y in 0..N as i32 {
                let p = Point::new(x, y);
                if incremental.grid().is_obstacle(p) {
                    fresh.set_obstacle(p, true).unwrap();
                }
            }
        }
        fresh.compute_shortest_path().unwrap();
        let agent = incremental.agent();
        assert_eq!(incremental.grid().g(agent), fresh.grid().g(agent));
        assert_eq!(incremental.path().map(|p| p.len()), fresh.path().map(|p| p.len()));
    }
}
