//! # dstar_lite_grid
//!
//! Incremental replanning on a dynamic grid with
//! [D* Lite](http://idm-lab.org/bib/abstracts/papers/aaai02b.pdf). The search is rooted at the
//! goal and repairs its cost estimates when obstacles appear or disappear or the agent moves,
//! instead of solving from scratch. Note that this assumes a uniform-cost 4-connected grid.
//!
//! [DStarLite] holds the search state and performs single repair iterations.
//! [Replanner] drives those iterations cooperatively so an observer can render intermediate
//! states, stop a run and resume it later.
//!
//! ```
//! use dstar_lite_grid::{DStarLite, ReplanConfig, Replanner};
//! use grid_util::Point;
//!
//! let engine = DStarLite::new(5, 5, Point::new(4, 4), Point::new(0, 0)).unwrap();
//! let mut planner = Replanner::new(engine, ReplanConfig::default());
//! planner.run_to_completion().unwrap();
//! assert_eq!(planner.engine().grid().g(Point::new(0, 0)), 8.0);
//! ```
pub mod engine;
pub mod error;
pub mod frontier;
pub mod grid;
pub mod replanner;
pub mod snapshot;

pub use engine::{DStarLite, SearchStats, Step};
pub use error::{Error, Result};
pub use frontier::{Frontier, Key};
pub use grid::{Cell, CostGrid};
pub use replanner::{CancelToken, ReplanConfig, Replanner, RunOutcome};
pub use snapshot::{CellState, FrontierEntry, Snapshot};

/// Cost of moving between two adjacent passable cells.
pub const EDGE_COST: f64 = 1.0;
/// Size of a 4-neighbourhood.
pub const N_NEIGHBOURS: usize = 4;
