use core::fmt;
use grid_util::Point;
use itertools::Itertools;
use log::{debug, info, warn};

use crate::error::{Error, Result};
use crate::frontier::{Frontier, Key};
use crate::grid::CostGrid;
use crate::snapshot::{CellState, FrontierEntry, Snapshot};

/// Outcome of a single repair iteration, see [DStarLite::step].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    /// The agent cell is consistent and no queued key is smaller than its key.
    Converged,
    /// The queued key was outdated; the cell was re-keyed and stays queued.
    Requeued(Point),
    /// The cell was overconsistent and its g-value dropped to its rhs-value.
    Lowered(Point),
    /// The cell was underconsistent and its g-value was reset to infinity.
    Raised(Point),
}

/// Counters describing how much work the search has done since creation or the last reset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub vertex_updates: u64,
    pub expansions: u64,
    pub requeues: u64,
}

/// Incremental shortest-path search on a 4-connected unit-cost grid, rooted at the goal.
///
/// Costs are propagated outwards from the goal, so `g` of a cell is its distance to the goal.
/// The heuristic is the [Manhattan distance](https://en.wikipedia.org/wiki/Taxicab_geometry)
/// to the live agent position. Whenever the agent moves, `km` grows by the distance moved so
/// keys queued before the move stay comparable with keys computed after it.
pub struct DStarLite {
    grid: CostGrid,
    frontier: Frontier,
    km: f64,
    agent: Point,
    goal: Point,
    initial_agent: Point,
    stats: SearchStats,
}

impl DStarLite {
    pub fn new(width: usize, height: usize, goal: Point, agent: Point) -> Result<DStarLite> {
        if width == 0 || height == 0 || width > i32::MAX as usize || height > i32::MAX as usize {
            return Err(Error::InvalidDimensions { width, height });
        }
        let grid = CostGrid::new(width, height);
        for p in [goal, agent] {
            if !grid.in_bounds(p) {
                return Err(Error::OutOfBounds(p));
            }
        }
        let mut search = DStarLite {
            grid,
            frontier: Frontier::new(),
            km: 0.0,
            agent,
            goal,
            initial_agent: agent,
            stats: SearchStats::default(),
        };
        search.seed();
        info!(
            "Initialised {}x{} search from {} to goal {}",
            width, height, agent, goal
        );
        Ok(search)
    }

    fn seed(&mut self) {
        self.grid.set_rhs(self.goal, 0.0);
        self.grid.set_unknown(self.goal, false);
        let key = self.calculate_key(self.goal);
        self.frontier.clear();
        self.frontier.insert_or_update(key, self.goal);
    }

    /// Restores the state right after [new](Self::new): no obstacles, agent back on its initial
    /// position and `km` at zero.
    pub fn reset(&mut self) {
        self.grid = CostGrid::new(self.grid.width(), self.grid.height());
        self.km = 0.0;
        self.agent = self.initial_agent;
        self.stats = SearchStats::default();
        self.seed();
        info!("Reset search, agent back on {}", self.agent);
    }

    pub fn agent(&self) -> Point {
        self.agent
    }
    pub fn goal(&self) -> Point {
        self.goal
    }
    pub fn km(&self) -> f64 {
        self.km
    }
    pub fn grid(&self) -> &CostGrid {
        &self.grid
    }
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }
    pub fn stats(&self) -> SearchStats {
        self.stats
    }
    /// Total number of frontier mutations, including those of earlier sessions before a reset.
    pub fn frontier_mutations(&self) -> u64 {
        self.frontier.mutations()
    }
    pub fn is_consistent(&self, p: Point) -> bool {
        self.grid.is_consistent(p)
    }

    fn heuristic(&self, p: Point) -> f64 {
        p.manhattan_distance(&self.agent) as f64
    }

    pub fn calculate_key(&self, p: Point) -> Key {
        let m = self.grid.g(p).min(self.grid.rhs(p));
        Key::new(m + self.heuristic(p) + self.km, m)
    }

    /// Smallest `edge_cost + g` over the passable neighbours, infinite for obstacles.
    fn lookahead(&self, p: Point) -> f64 {
        if self.grid.is_obstacle(p) {
            return f64::INFINITY;
        }
        self.grid
            .neighbors(p)
            .into_iter()
            .map(|n| self.grid.edge_cost(p, n) + self.grid.g(n))
            .fold(f64::INFINITY, f64::min)
    }

    /// Recomputes the rhs-value of `p` from its neighbours (the goal keeps rhs 0) and fixes its
    /// frontier membership: inconsistent cells are queued with a fresh key, consistent ones are
    /// dropped.
    pub fn update_vertex(&mut self, p: Point) {
        self.stats.vertex_updates += 1;
        if p != self.goal {
            let rhs = self.lookahead(p);
            self.grid.set_rhs(p, rhs);
        }
        self.grid.set_unknown(p, false);
        if self.grid.is_consistent(p) {
            self.frontier.remove(&p);
        } else {
            let key = self.calculate_key(p);
            self.frontier.insert_or_update(key, p);
        }
    }

    /// Checks the termination condition of the repair without changing anything observable.
    pub fn is_converged(&self) -> bool {
        if !self.grid.is_consistent(self.agent) {
            return false;
        }
        let agent_key = self.calculate_key(self.agent);
        self.frontier
            .peek_min()
            .map_or(true, |(k_min, _)| k_min >= agent_key)
    }

    /// Performs one repair iteration. Returns [Step::Converged] without touching anything once
    /// the agent cell is locally consistent and no queued key is smaller than the agent's key.
    ///
    /// The neighbour updates rely on [update_vertex](Self::update_vertex) recomputing rhs from
    /// the current neighbour g-values, which covers both tightening around a lowered cell and
    /// the conditional recomputation around a raised one.
    pub fn step(&mut self) -> Result<Step> {
        let agent_key = self.calculate_key(self.agent);
        let agent_consistent = self.grid.is_consistent(self.agent);
        let (k_old, u) = match self.frontier.peek_min() {
            Some(top) => top,
            None if agent_consistent => return Ok(Step::Converged),
            None => {
                warn!(
                    "Frontier exhausted while {} is inconsistent (g = {}, rhs = {})",
                    self.agent,
                    self.grid.g(self.agent),
                    self.grid.rhs(self.agent)
                );
                return Err(Error::EmptyFrontier);
            }
        };
        if agent_consistent && k_old >= agent_key {
            return Ok(Step::Converged);
        }

        let k_new = self.calculate_key(u);
        if k_old < k_new {
            self.frontier.update_key(k_new, u)?;
            self.stats.requeues += 1;
            debug!("Requeued {} from {} to {}", u, k_old, k_new);
            return Ok(Step::Requeued(u));
        }

        self.stats.expansions += 1;
        let g_old = self.grid.g(u);
        let rhs = self.grid.rhs(u);
        if g_old > rhs {
            self.grid.set_g(u, rhs);
            self.frontier.pop();
            for s in self.grid.neighbors(u) {
                self.update_vertex(s);
            }
            debug!("Lowered {} to g = {}", u, rhs);
            Ok(Step::Lowered(u))
        } else {
            self.grid.set_g(u, f64::INFINITY);
            for s in self.grid.neighbors(u) {
                self.update_vertex(s);
            }
            self.update_vertex(u);
            debug!("Raised {} from g = {}", u, g_old);
            Ok(Step::Raised(u))
        }
    }

    /// Repairs until [step](Self::step) reports convergence and returns the number of
    /// iterations that changed something.
    pub fn compute_shortest_path(&mut self) -> Result<usize> {
        let mut iterations = 0;
        while self.step()? != Step::Converged {
            iterations += 1;
        }
        info!(
            "Converged after {} iterations, g({}) = {}",
            iterations,
            self.agent,
            self.grid.g(self.agent)
        );
        Ok(iterations)
    }

    fn check_editable(&self, p: Point) -> Result<()> {
        if !self.grid.in_bounds(p) {
            warn!("Rejected edit outside the grid at {}", p);
            return Err(Error::OutOfBounds(p));
        }
        if p == self.agent || p == self.goal {
            warn!("Rejected obstacle toggle on reserved cell {}", p);
            return Err(Error::ReservedCell(p));
        }
        Ok(())
    }

    /// Flips the obstacle state of `p` and returns the new state. The change is propagated one
    /// hop, to `p` and its passable neighbours; the next repair finishes the propagation.
    pub fn toggle_obstacle(&mut self, p: Point) -> Result<bool> {
        self.check_editable(p)?;
        let blocked = !self.grid.is_obstacle(p);
        if blocked {
            let previous_neighbours = self.grid.neighbors(p);
            self.grid.set_obstacle(p, true);
            self.grid.set_g(p, f64::INFINITY);
            self.grid.set_rhs(p, f64::INFINITY);
            self.frontier.remove(&p);
            for n in previous_neighbours {
                self.update_vertex(n);
            }
        } else {
            self.grid.set_obstacle(p, false);
            self.grid.set_unknown(p, true);
            self.update_vertex(p);
            for n in self.grid.neighbors(p) {
                self.update_vertex(n);
            }
        }
        info!("{} {}", if blocked { "Blocked" } else { "Cleared" }, p);
        Ok(blocked)
    }

    /// Sets the obstacle state of `p`, doing nothing if it already has that state.
    pub fn set_obstacle(&mut self, p: Point, blocked: bool) -> Result<()> {
        self.check_editable(p)?;
        if self.grid.is_obstacle(p) != blocked {
            self.toggle_obstacle(p)?;
        }
        Ok(())
    }

    /// Moves the agent to the passable neighbour with the smallest g-value, the first one in
    /// neighbour order on ties, and returns the new position.
    pub fn move_agent(&mut self) -> Result<Point> {
        if self.agent == self.goal {
            warn!("Agent is already on the goal {}", self.goal);
            return Err(Error::AlreadyAtGoal(self.goal));
        }
        let best = self
            .grid
            .neighbors(self.agent)
            .into_iter()
            .filter(|n| self.grid.g(*n).is_finite())
            .min_by(|a, b| self.grid.g(*a).total_cmp(&self.grid.g(*b)));
        let Some(next) = best else {
            warn!("No passable neighbour with finite cost around {}", self.agent);
            return Err(Error::NoPassableNeighbor(self.agent));
        };
        let previous = self.agent;
        self.agent = next;
        self.km += previous.manhattan_distance(&next) as f64;
        info!("Moved agent from {} to {}, km = {}", previous, next, self.km);
        Ok(next)
    }

    /// Checks if the goal lies on the same connected component as the agent. Takes `&mut self`
    /// because components split by a blocked cell are regenerated first.
    pub fn goal_reachable(&mut self) -> bool {
        self.grid.update();
        self.grid.reachable(self.agent, self.goal)
    }

    /// Follows decreasing g-values from the agent to the goal, both included. Only meaningful
    /// after a completed repair; returns [None] if the goal cannot be reached.
    pub fn path(&self) -> Option<Vec<Point>> {
        // Stale components are skipped here, the g-value check below still rejects a cut-off goal.
        if !self.grid.components_dirty && !self.grid.reachable(self.agent, self.goal) {
            info!("{} is not reachable from {}", self.goal, self.agent);
            return None;
        }
        if !self.grid.g(self.agent).is_finite() {
            return None;
        }
        let grid = &self.grid;
        let goal = self.goal;
        let max_len = grid.cell_count();
        let path: Vec<Point> = std::iter::successors(Some(self.agent), |&current| {
            if current == goal {
                return None;
            }
            grid.neighbors(current)
                .into_iter()
                .filter(|n| grid.g(*n) < grid.g(current))
                .min_by(|a, b| grid.g(*a).total_cmp(&grid.g(*b)))
        })
        .take(max_len)
        .collect();
        if path.last() == Some(&goal) {
            Some(path)
        } else {
            warn!("Greedy descent from {} stalled before the goal", self.agent);
            None
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        let cells = (0..self.grid.height() as i32)
            .map(|y| {
                (0..self.grid.width() as i32)
                    .map(|x| {
                        let p = Point::new(x, y);
                        CellState {
                            g: self.grid.g(p),
                            rhs: self.grid.rhs(p),
                            is_obstacle: self.grid.is_obstacle(p),
                            is_unknown: self.grid.is_unknown(p),
                            is_agent: p == self.agent,
                            is_goal: p == self.goal,
                            in_frontier: self.frontier.contains(&p),
                        }
                    })
                    .collect_vec()
            })
            .collect_vec();
        let frontier = self
            .frontier
            .entries()
            .into_iter()
            .map(|(key, point)| FrontierEntry { key, point })
            .collect_vec();
        Snapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            agent: self.agent,
            goal: self.goal,
            km: self.km,
            cells,
            frontier,
        }
    }
}

impl fmt::Display for DStarLite {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Grid (km = {}):", self.km)?;
        for y in 0..self.grid.height() as i32 {
            let row: String = (0..self.grid.width() as i32)
                .map(|x| {
                    let p = Point::new(x, y);
                    let g = self.grid.g(p);
                    if p == self.agent {
                        'A'
                    } else if p == self.goal {
                        'G'
                    } else if self.grid.is_obstacle(p) {
                        '#'
                    } else if self.grid.is_unknown(p) {
                        '?'
                    } else if !g.is_finite() {
                        '+'
                    } else {
                        char::from_digit((g as u32) % 10, 10).unwrap_or('.')
                    }
                })
                .collect();
            writeln!(f, "{}", row)?;
        }
        Ok(())
    }
}
