use crate::{EDGE_COST, N_NEIGHBOURS};
use grid_util::{Grid, Point, SimpleGrid};
use itertools::iproduct;
use petgraph::unionfind::UnionFind;
use smallvec::SmallVec;

/// Per-cell search state. Costs are measured towards the goal.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Cell {
    pub g: f64,
    pub rhs: f64,
    pub obstacle: bool,
    pub unknown: bool,
}

impl Default for Cell {
    fn default() -> Cell {
        Cell {
            g: f64::INFINITY,
            rhs: f64::INFINITY,
            obstacle: false,
            unknown: true,
        }
    }
}

impl Cell {
    pub fn is_consistent(&self) -> bool {
        self.g == self.rhs
    }
}

/// [CostGrid] stores a [Cell] for every position of a fixed-size 4-connected lattice. Like the
/// occupancy grids it is modelled on, it also maintains connected components in a [UnionFind]
/// so reachability questions do not need a flood fill.
#[derive(Clone, Debug)]
pub struct CostGrid {
    cells: SimpleGrid<Cell>,
    width: usize,
    height: usize,
    pub components: UnionFind<usize>,
    pub components_dirty: bool,
}

impl CostGrid {
    pub fn new(width: usize, height: usize) -> CostGrid {
        let mut grid = CostGrid {
            cells: SimpleGrid::new(width, height, Cell::default()),
            width,
            height,
            components: UnionFind::new(width * height),
            components_dirty: false,
        };
        grid.generate_components();
        grid
    }
    pub fn width(&self) -> usize {
        self.width
    }
    pub fn height(&self) -> usize {
        self.height
    }
    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }
    pub fn in_bounds(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && (p.x as usize) < self.width && (p.y as usize) < self.height
    }
    fn ix(&self, p: Point) -> usize {
        p.y as usize * self.width + p.x as usize
    }

    pub fn cell(&self, p: Point) -> Option<&Cell> {
        if self.in_bounds(p) {
            self.cells.values.get(self.ix(p))
        } else {
            None
        }
    }
    fn cell_mut(&mut self, p: Point) -> Option<&mut Cell> {
        if self.in_bounds(p) {
            let ix = self.ix(p);
            self.cells.values.get_mut(ix)
        } else {
            None
        }
    }

    // Reads outside the grid behave like an obstacle with infinite cost.
    pub fn g(&self, p: Point) -> f64 {
        self.cell(p).map_or(f64::INFINITY, |c| c.g)
    }
    pub fn rhs(&self, p: Point) -> f64 {
        self.cell(p).map_or(f64::INFINITY, |c| c.rhs)
    }
    pub fn is_obstacle(&self, p: Point) -> bool {
        self.cell(p).map_or(true, |c| c.obstacle)
    }
    pub fn is_unknown(&self, p: Point) -> bool {
        self.cell(p).map_or(true, |c| c.unknown)
    }
    pub fn is_consistent(&self, p: Point) -> bool {
        self.cell(p).map_or(true, Cell::is_consistent)
    }

    pub fn set_g(&mut self, p: Point, g: f64) {
        if let Some(cell) = self.cell_mut(p) {
            cell.g = g;
        }
    }
    pub fn set_rhs(&mut self, p: Point, rhs: f64) {
        if let Some(cell) = self.cell_mut(p) {
            cell.rhs = rhs;
        }
    }
    pub fn set_unknown(&mut self, p: Point, unknown: bool) {
        if let Some(cell) = self.cell_mut(p) {
            cell.unknown = unknown;
        }
    }

    /// Updates the obstacle flag of a position. Joins newly connected components when a cell is
    /// cleared and flags the components as dirty when a cell is blocked, since that may split a
    /// component in two.
    pub fn set_obstacle(&mut self, p: Point, blocked: bool) {
        if !self.in_bounds(p) {
            return;
        }
        if blocked {
            if !self.is_obstacle(p) {
                self.components_dirty = true;
            }
        } else {
            let p_ix = self.ix(p);
            for n in self.neighbors(p) {
                let n_ix = self.ix(n);
                self.components.union(p_ix, n_ix);
            }
        }
        if let Some(cell) = self.cell_mut(p) {
            cell.obstacle = blocked;
        }
    }

    /// All in-bounds 4-neighbours in the order up, down, left, right, obstacles included.
    pub fn adjacent(&self, p: Point) -> SmallVec<[Point; N_NEIGHBOURS]> {
        [
            Point::new(p.x, p.y - 1),
            Point::new(p.x, p.y + 1),
            Point::new(p.x - 1, p.y),
            Point::new(p.x + 1, p.y),
        ]
        .into_iter()
        .filter(|n| self.in_bounds(*n))
        .collect()
    }

    /// Passable 4-neighbours in the order up, down, left, right. Costs propagate only along these.
    pub fn neighbors(&self, p: Point) -> SmallVec<[Point; N_NEIGHBOURS]> {
        let mut neighbours = self.adjacent(p);
        neighbours.retain(|n| !self.is_obstacle(*n));
        neighbours
    }

    /// Unit cost between two adjacent passable cells, infinite otherwise.
    pub fn edge_cost(&self, a: Point, b: Point) -> f64 {
        if a.manhattan_distance(&b) == 1 && !self.is_obstacle(a) && !self.is_obstacle(b) {
            EDGE_COST
        } else {
            f64::INFINITY
        }
    }

    /// Checks if both points are passable and on the same component. Components must be up to
    /// date, see [update](Self::update).
    pub fn reachable(&self, a: Point, b: Point) -> bool {
        if self.is_obstacle(a) || self.is_obstacle(b) {
            return false;
        }
        self.components.equiv(self.ix(a), self.ix(b))
    }

    /// Regenerates the components if they are marked as dirty.
    pub fn update(&mut self) {
        if self.components_dirty {
            self.generate_components();
        }
    }

    /// Generates a new [UnionFind] structure and links up passable neighbours to the same components.
    pub fn generate_components(&mut self) {
        self.components = UnionFind::new(self.cell_count());
        self.components_dirty = false;
        for (y, x) in iproduct!(0..self.height as i32, 0..self.width as i32) {
            let point = Point::new(x, y);
            if self.is_obstacle(point) {
                continue;
            }
            let parent_ix = self.ix(point);
            // Right and down suffice, the other two directions are covered from the other side.
            for n in [Point::new(x + 1, y), Point::new(x, y + 1)] {
                if self.in_bounds(n) && !self.is_obstacle(n) {
                    let n_ix = self.ix(n);
                    self.components.union(parent_ix, n_ix);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neighbours_follow_fixed_order() {
        let grid = CostGrid::new(3, 3);
        let centre = Point::new(1, 1);
        let expected = [
            Point::new(1, 0),
            Point::new(1, 2),
            Point::new(0, 1),
            Point::new(2, 1),
        ];
        assert_eq!(grid.neighbors(centre).as_slice(), &expected);
    }

    #[test]
    fn neighbours_skip_border_and_obstacles() {
        let mut grid = CostGrid::new(3, 3);
        grid.set_obstacle(Point::new(1, 0), true);
        let corner = Point::new(0, 0);
        assert_eq!(grid.neighbors(corner).as_slice(), &[Point::new(0, 1)]);
        assert_eq!(grid.adjacent(corner).len(), 2);
    }

    #[test]
    fn edge_cost_is_unit_or_infinite() {
        let mut grid = CostGrid::new(3, 1);
        let a = Point::new(0, 0);
        let b = Point::new(1, 0);
        assert_eq!(grid.edge_cost(a, b), 1.0);
        assert_eq!(grid.edge_cost(a, Point::new(2, 0)), f64::INFINITY);
        grid.set_obstacle(b, true);
        assert_eq!(grid.edge_cost(a, b), f64::INFINITY);
    }

    #[test]
    fn cell_writes_read_back() {
        let mut grid = CostGrid::new(4, 3);
        let p = Point::new(3, 1);
        grid.set_g(p, 5.0);
        grid.set_rhs(p, 4.0);
        grid.set_unknown(p, false);
        let cell = grid.cell(p).unwrap();
        assert_eq!(cell.g, 5.0);
        assert_eq!(cell.rhs, 4.0);
        assert!(!cell.unknown);
        assert!(!cell.is_consistent());
        // Row-major storage, the neighbours of p are untouched.
        assert_eq!(grid.g(Point::new(2, 1)), f64::INFINITY);
        assert_eq!(grid.g(Point::new(3, 0)), f64::INFINITY);
        grid.set_g(Point::new(4, 1), 1.0);
        assert!(grid.cell(Point::new(4, 1)).is_none());
        assert_eq!(grid.g(Point::new(0, 2)), f64::INFINITY);
    }

    #[test]
    fn out_of_bounds_reads_as_obstacle() {
        let grid = CostGrid::new(2, 2);
        let outside = Point::new(-1, 0);
        assert!(grid.is_obstacle(outside));
        assert_eq!(grid.g(outside), f64::INFINITY);
        assert!(grid.cell(Point::new(2, 0)).is_none());
    }

    /// Blocking the middle column splits the grid into two components, clearing it joins them.
    #[test]
    fn components_split_and_join() {
        //  ___
        // | # |
        // | # |
        // | # |
        //  ___
        let mut grid = CostGrid::new(3, 3);
        let left = Point::new(0, 0);
        let right = Point::new(2, 2);
        assert!(grid.reachable(left, right));
        for y in 0..3 {
            grid.set_obstacle(Point::new(1, y), true);
        }
        assert!(grid.components_dirty);
        grid.update();
        assert!(!grid.reachable(left, right));
        grid.set_obstacle(Point::new(1, 2), false);
        assert!(grid.reachable(left, right));
    }
}
