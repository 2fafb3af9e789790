use dstar_lite_grid::{DStarLite, Error, ReplanConfig, Replanner, Step};
use grid_util::Point;
use std::time::Duration;

// The agent walks from the top left to the bottom right corner of a 12x8 grid. Every third
// move a cell two steps ahead on its current path becomes blocked, forcing a repair. The
// observer prints how many cells each repair touched.

fn main() {
    let engine = DStarLite::new(12, 8, Point::new(11, 7), Point::new(0, 0)).unwrap();
    let config = ReplanConfig::default()
        .with_step_delay(Duration::from_millis(2))
        .with_max_iterations(10_000);
    let mut planner = Replanner::new(engine, config);
    let mut moves = 0;
    loop {
        let mut lowered = 0;
        let mut raised = 0;
        planner
            .run_with_observer(|_, step| match step {
                Step::Lowered(_) => lowered += 1,
                Step::Raised(_) => raised += 1,
                _ => {}
            })
            .unwrap();
        println!("Repair: {lowered} lowered, {raised} raised");
        println!("{}", planner.engine());
        if moves % 3 == 0 {
            if let Some(path) = planner.path() {
                if path.len() > 3 {
                    planner.toggle_obstacle(path[2]).unwrap();
                    planner.run_to_completion().unwrap();
                }
            }
        }
        match planner.move_agent() {
            Ok(p) => println!("Moved to {:?}", p),
            Err(Error::AlreadyAtGoal(p)) => {
                println!("Reached goal {:?} after {} moves", p, moves);
                break;
            }
            Err(e) => {
                println!("Stopped: {}", e);
                break;
            }
        }
        moves += 1;
    }
}
