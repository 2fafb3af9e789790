//! Read-only copies of the search state for observers such as a renderer.
use grid_util::Point;

use crate::frontier::Key;

/// State of one cell as seen from outside the engine.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CellState {
    pub g: f64,
    pub rhs: f64,
    pub is_obstacle: bool,
    pub is_unknown: bool,
    pub is_agent: bool,
    pub is_goal: bool,
    pub in_frontier: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrontierEntry {
    pub key: Key,
    pub point: Point,
}

/// Cells are stored row by row, `cells[y][x]`; the frontier is ordered by key.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    pub width: usize,
    pub height: usize,
    pub agent: Point,
    pub goal: Point,
    pub km: f64,
    pub cells: Vec<Vec<CellState>>,
    pub frontier: Vec<FrontierEntry>,
}

impl Snapshot {
    pub fn cell(&self, p: Point) -> Option<&CellState> {
        if p.x < 0 || p.y < 0 {
            return None;
        }
        self.cells.get(p.y as usize)?.get(p.x as usize)
    }

    /// Number of cells already touched by a repair.
    pub fn known_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_unknown)
            .count()
    }
}
