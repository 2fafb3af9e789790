use dstar_lite_grid::DStarLite;
use grid_util::Point;
use std::collections::VecDeque;

/// Breadth-first search from the agent to the goal over the current obstacle layout.
pub fn bfs_distance(search: &DStarLite) -> Option<usize> {
    let grid = search.grid();
    let mut dist = vec![usize::MAX; grid.cell_count()];
    let ix = |p: Point| p.y as usize * grid.width() + p.x as usize;
    let mut queue = VecDeque::new();
    dist[ix(search.agent())] = 0;
    queue.push_back(search.agent());
    while let Some(p) = queue.pop_front() {
        if p == search.goal() {
            return Some(dist[ix(p)]);
        }
        for n in grid.neighbors(p) {
            if dist[ix(n)] == usize::MAX {
                dist[ix(n)] = dist[ix(p)] + 1;
                queue.push_back(n);
            }
        }
    }
    None
}

pub fn bfs_cost(search: &DStarLite) -> f64 {
    bfs_distance(search).map_or(f64::INFINITY, |d| d as f64)
}
