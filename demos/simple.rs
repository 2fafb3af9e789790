use dstar_lite_grid::{DStarLite, ReplanConfig, Replanner};
use grid_util::Point;

// In this example the agent walks to the goal on a 5x5 grid with shape
//  _____
// |A #  |
// |  #  |
// |  #  |
// |  #  |
// |    G|
//  _____
// where
// - # marks an obstacle
// - A marks the agent
// - G marks the goal
//
// Nodes have a 4-neighborhood

fn main() {
    let engine = DStarLite::new(5, 5, Point::new(4, 4), Point::new(0, 0)).unwrap();
    let mut planner = Replanner::new(engine, ReplanConfig::default());
    for y in 0..4 {
        planner.toggle_obstacle(Point::new(2, y)).unwrap();
    }
    let outcome = planner.run_to_completion().unwrap();
    println!("Converged after {} iterations", outcome.iterations());
    println!("{}", planner.engine());
    println!("Path:");
    for p in planner.path().unwrap() {
        println!("{:?}", p);
    }
}
