//! Swarm simulation engine
//!
//! Owns the points, the active forces and the cooling schedule. Two ways to
//! drive it:
//! - batch: [`Simulation::run`] ticks a fixed budget and returns a snapshot
//! - streaming: [`Simulation::frame`] ticks once per call (one call per
//!   animation frame) and hands each result to the installed [`TickObserver`]
//!
//! Every `restart`/`set_observer` bumps a generation counter. A [`TickLoop`]
//! handle from an older generation turns into a no-op, which is how a new
//! grouping transition cancels the one still animating.

use tracing::debug;

use crate::error::Result;
use crate::simulation::forces::ForceSet;
use crate::simulation::integrator::relax_step;
use crate::simulation::jitter::Jitter;
use crate::simulation::params::{unit_interval, Parameters};
use crate::simulation::states::{NVec2, Point, Snapshot, Swarm};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimState {
    Idle, // nothing ticked yet, or no points at all
    Running,
    Settled,
}

/// Receives a snapshot after every streamed tick
pub trait TickObserver {
    fn on_tick(&mut self, snapshot: &Snapshot);
}

impl<F> TickObserver for F
where
    F: FnMut(&Snapshot),
{
    fn on_tick(&mut self, snapshot: &Snapshot) {
        self(snapshot)
    }
}

/// Handle to one interactive tick loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickLoop {
    generation: u64,
}

impl TickLoop {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    Ticked, // one tick ran, more to come
    Settled, // the loop is finished (the final tick may have just run)
    Superseded, // a newer restart owns the simulation; nothing ran
}

pub struct Simulation {
    swarm: Swarm,
    forces: ForceSet,
    params: Parameters,
    jitter: Jitter,
    state: SimState,
    generation: u64,
    observer: Option<Box<dyn TickObserver + Send + Sync>>,
}

impl Simulation {
    /// Build a simulation; unplaced points get spiral seeds around `center`
    pub fn new(points: Vec<Point>, mut forces: ForceSet, params: Parameters, center: NVec2) -> Result<Self> {
        params.validate()?;

        let mut swarm = Swarm::new(points);
        swarm.seed_positions(center);
        forces.initialize(&swarm.points)?;

        debug!(points = swarm.len(), forces = ?forces, "simulation created");

        Ok(Self {
            jitter: Jitter::new(params.seed),
            swarm,
            forces,
            params,
            state: SimState::Idle,
            generation: 0,
            observer: None,
        })
    }

    pub fn swarm(&self) -> &Swarm {
        &self.swarm
    }

    pub fn points(&self) -> &[Point] {
        &self.swarm.points
    }

    pub fn alpha(&self) -> f64 {
        self.params.alpha
    }

    pub fn state(&self) -> SimState {
        self.state
    }

    pub fn snapshot(&self) -> Snapshot {
        self.swarm.snapshot()
    }

    /// Advance one tick; a no-op on an empty swarm
    pub fn tick(&mut self) {
        if self.swarm.is_empty() {
            return;
        }
        relax_step(&mut self.swarm, &mut self.forces, &mut self.params, &mut self.jitter);
        self.state = if self.params.is_settled() { SimState::Settled } else { SimState::Running };
    }

    /// Batch mode: exactly `ticks` ticks, no observer calls
    pub fn run(&mut self, ticks: usize) -> Snapshot {
        if self.swarm.is_empty() {
            return self.snapshot();
        }
        for _ in 0..ticks {
            self.tick();
        }
        self.state = SimState::Settled;
        debug!(ticks, alpha = self.params.alpha, "batch run finished");
        self.snapshot()
    }

    /// Swap in a new force set and reheat to `alpha`
    ///
    /// Positions and velocities are untouched, so the next frames move points
    /// smoothly from where they are. Older loop handles are superseded.
    pub fn restart(&mut self, mut forces: ForceSet, alpha: f64) -> Result<TickLoop> {
        unit_interval("alpha", alpha)?;
        forces.initialize(&self.swarm.points)?;
        self.forces = forces;
        self.reheat(alpha)
    }

    /// Reheat with the current forces
    pub fn reheat(&mut self, alpha: f64) -> Result<TickLoop> {
        unit_interval("alpha", alpha)?;
        self.params.alpha = alpha;
        self.generation += 1;
        self.state = if self.swarm.is_empty() { SimState::Idle } else { SimState::Running };

        debug!(generation = self.generation, alpha, forces = ?self.forces, "simulation restarted");
        Ok(TickLoop { generation: self.generation })
    }

    /// Install the per-tick observer, superseding any running loop
    pub fn set_observer<O>(&mut self, observer: O) -> TickLoop
    where
        O: TickObserver + Send + Sync + 'static,
    {
        self.observer = Some(Box::new(observer));
        self.generation += 1;
        if self.state == SimState::Idle && !self.swarm.is_empty() {
            self.state = SimState::Running;
        }
        TickLoop { generation: self.generation }
    }

    pub fn is_current(&self, handle: TickLoop) -> bool {
        handle.generation == self.generation
    }

    /// One scheduled frame of an interactive loop
    pub fn frame(&mut self, handle: TickLoop) -> FrameStatus {
        if !self.is_current(handle) {
            return FrameStatus::Superseded;
        }
        if self.state != SimState::Running {
            return FrameStatus::Settled;
        }

        self.tick();

        if let Some(observer) = self.observer.as_mut() {
            let snapshot = self.swarm.snapshot();
            observer.on_tick(&snapshot);
        }

        match self.state {
            SimState::Running => FrameStatus::Ticked,
            _ => FrameStatus::Settled,
        }
    }

    /// Drive `handle` until it settles, is superseded, or `max_frames` run
    /// Returns the number of frames that ticked
    pub fn drive(&mut self, handle: TickLoop, max_frames: usize) -> usize {
        let mut ticked = 0;
        for _ in 0..max_frames {
            let before = self.swarm.ticks;
            let status = self.frame(handle);
            if self.swarm.ticks != before {
                ticked += 1;
            }
            if status != FrameStatus::Ticked {
                break;
            }
        }
        ticked
    }
}
