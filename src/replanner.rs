//! Cooperative driver around [DStarLite]. The engine's [step](DStarLite::step) is a plain state
//! transition; pacing, observation, cancellation and the iteration cap all live here.
use grid_util::Point;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crate::engine::{DStarLite, Step};
use crate::error::{Error, Result};
use crate::snapshot::Snapshot;

/// Runtime settings of a [Replanner]. The default runs without delay or iteration cap.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReplanConfig {
    /// Pause after every repair iteration, for observers that animate the search.
    pub step_delay: Option<Duration>,
    /// Repair iterations allowed per run before it is reported as non-terminating.
    pub max_iterations: Option<usize>,
}

impl ReplanConfig {
    pub fn with_step_delay(mut self, delay: Duration) -> ReplanConfig {
        self.step_delay = Some(delay);
        self
    }
    pub fn with_max_iterations(mut self, max_iterations: usize) -> ReplanConfig {
        self.max_iterations = Some(max_iterations);
        self
    }
}

/// Shared stop flag, polled at the top of every iteration of a run.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
    /// Re-arms the token so the next run is not stopped immediately.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    Converged { iterations: usize },
    /// Stopped through the [CancelToken]; a later run resumes where this one stopped.
    Cancelled { iterations: usize },
}

impl RunOutcome {
    pub fn iterations(&self) -> usize {
        match *self {
            RunOutcome::Converged { iterations } | RunOutcome::Cancelled { iterations } => {
                iterations
            }
        }
    }
    pub fn is_converged(&self) -> bool {
        matches!(self, RunOutcome::Converged { .. })
    }
}

/// Owns a [DStarLite] search and drives its repair one iteration at a time. Edits go through
/// the replanner so callers never touch the grid or frontier directly.
pub struct Replanner {
    engine: DStarLite,
    config: ReplanConfig,
    cancel: CancelToken,
}

impl Replanner {
    pub fn new(engine: DStarLite, config: ReplanConfig) -> Replanner {
        Replanner {
            engine,
            config,
            cancel: CancelToken::new(),
        }
    }
    pub fn engine(&self) -> &DStarLite {
        &self.engine
    }
    pub fn into_engine(self) -> DStarLite {
        self.engine
    }
    pub fn config(&self) -> &ReplanConfig {
        &self.config
    }
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }
    pub fn snapshot(&self) -> Snapshot {
        self.engine.snapshot()
    }

    /// Exactly one repair iteration. The cancel token is not consulted: it stops the run loops,
    /// while an explicit single step is always carried out.
    pub fn step(&mut self) -> Result<Step> {
        self.engine.step()
    }

    pub fn run_to_completion(&mut self) -> Result<RunOutcome> {
        self.run_with_observer(|_, _| {})
    }

    /// Repairs until convergence, calling `observer` after every iteration that changed the
    /// search. The observer always sees a state with completed vertex updates.
    pub fn run_with_observer<F>(&mut self, mut observer: F) -> Result<RunOutcome>
    where
        F: FnMut(&DStarLite, Step),
    {
        let mut iterations = 0;
        loop {
            if self.cancel.is_cancelled() {
                info!("Repair cancelled after {} iterations", iterations);
                return Ok(RunOutcome::Cancelled { iterations });
            }
            if self.engine.is_converged() {
                debug!("Repair converged after {} iterations", iterations);
                return Ok(RunOutcome::Converged { iterations });
            }
            if let Some(max_iterations) = self.config.max_iterations {
                if iterations >= max_iterations {
                    warn!("Repair exceeded {} iterations", max_iterations);
                    return Err(Error::NonTerminating { iterations });
                }
            }
            let step = self.engine.step()?;
            if step == Step::Converged {
                return Ok(RunOutcome::Converged { iterations });
            }
            iterations += 1;
            observer(&self.engine, step);
            if let Some(delay) = self.config.step_delay {
                std::thread::sleep(delay);
            }
        }
    }

    /// One sense-plan-act cycle: repair, then move the agent one cell. A cancelled repair does
    /// not move and returns [None].
    pub fn advance(&mut self) -> Result<Option<Point>> {
        match self.run_to_completion()? {
            RunOutcome::Converged { .. } => self.engine.move_agent().map(Some),
            RunOutcome::Cancelled { .. } => Ok(None),
        }
    }

    pub fn toggle_obstacle(&mut self, p: Point) -> Result<bool> {
        self.engine.toggle_obstacle(p)
    }
    pub fn set_obstacle(&mut self, p: Point, blocked: bool) -> Result<()> {
        self.engine.set_obstacle(p, blocked)
    }
    pub fn move_agent(&mut self) -> Result<Point> {
        self.engine.move_agent()
    }
    pub fn path(&self) -> Option<Vec<Point>> {
        self.engine.path()
    }
    pub fn reset(&mut self) {
        self.engine.reset();
    }
}
