//! Error type shared by the grid, frontier, engine and replanner.

use grid_util::Point;
use thiserror::Error;

/// Errors produced while editing or repairing a [DStarLite](crate::DStarLite) search.
///
/// Rejections (`ReservedCell`, `NoPassableNeighbor`, `AlreadyAtGoal`, `OutOfBounds`) leave the
/// search untouched. `EmptyFrontier` and `NonTerminating` abort the current repair.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    #[error("frontier is empty while the agent cell is still inconsistent")]
    EmptyFrontier,

    #[error("repair did not terminate within {iterations} iterations")]
    NonTerminating { iterations: usize },

    #[error("cell {0} is reserved for the agent or the goal")]
    ReservedCell(Point),

    #[error("no passable neighbour with finite cost around {0}")]
    NoPassableNeighbor(Point),

    #[error("agent is already on the goal {0}")]
    AlreadyAtGoal(Point),

    #[error("point {0} lies outside the grid")]
    OutOfBounds(Point),

    #[error("grid dimensions {width}x{height} are invalid")]
    InvalidDimensions { width: usize, height: usize },

    #[error("{0} is already queued in the frontier")]
    AlreadyQueued(Point),

    #[error("{0} is not queued in the frontier")]
    NotQueued(Point),
}

pub type Result<T> = std::result::Result<T, Error>;
