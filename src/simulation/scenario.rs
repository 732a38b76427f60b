//! Build a runnable swarm scenario from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces the runtime bundle:
//! - the `Resolver` fitted to the coerced records
//! - the `Simulation` seeded with one point per record
//! - the current `GroupingMode` and the strengths used to rebuild forces
//!
//! With the `viewer` feature the bundle is a Bevy `Resource`, read and
//! ticked by the viewer systems.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::configuration::config::ScenarioConfig;
use crate::error::Result;
use crate::layout::dataset::{coerce_records, LoadReport};
use crate::layout::resolver::{ChartArea, CollideSettings, ForceStrengths, GroupingMode, Resolver};
use crate::simulation::engine::{FrameStatus, Simulation, TickLoop, TickObserver};
use crate::simulation::states::Snapshot;

#[cfg_attr(feature = "viewer", derive(bevy::prelude::Resource))]
pub struct Scenario {
    pub resolver: Arc<Resolver>,
    pub simulation: Simulation,
    pub mode: GroupingMode,
    pub strengths: ForceStrengths,
    pub collide: CollideSettings,
    pub area: ChartArea,
    pub categories: Vec<String>,
    pub ticks: usize, // batch budget for `layout`
    pub restart_alpha: f64,
    pub report: LoadReport,
    active_loop: Option<TickLoop>,
}

impl Scenario {
    pub fn build_scenario(cfg: ScenarioConfig) -> Result<Self> {
        cfg.validate()?;

        let (records, report) = coerce_records(&cfg.records);
        if !report.rejected.is_empty() {
            warn!(rejected = report.rejected.len(), accepted = report.accepted, "some records were dropped");
        }

        let resolver_cfg = cfg.resolver_config();
        for r in records.iter().filter(|r| !resolver_cfg.categories.contains(&r.category)) {
            warn!(name = %r.name, category = %r.category, "unknown category, no grouped x target");
        }

        let resolver = Arc::new(Resolver::new(&resolver_cfg, &records));
        let mode = cfg.layout.initial_mode;
        let strengths = cfg.strengths();
        let collide = cfg.collide_settings();
        let area = resolver_cfg.area;

        let forces = Resolver::forces(&resolver, mode, &strengths, &collide);
        let simulation = Simulation::new(resolver.points(&records), forces, cfg.parameters(), area.center())?;

        info!(points = records.len(), ?mode, "scenario built");

        Ok(Self {
            resolver,
            simulation,
            mode,
            strengths,
            collide,
            area,
            categories: resolver_cfg.categories,
            ticks: cfg.engine.ticks,
            restart_alpha: cfg.engine.restart_alpha,
            report,
            active_loop: None,
        })
    }

    /// Static layout: run the batch budget for the current mode
    pub fn layout(&mut self) -> Snapshot {
        self.simulation.run(self.ticks)
    }

    /// Switch grouping and reheat; previously returned loops are superseded
    pub fn set_mode(&mut self, mode: GroupingMode) -> Result<TickLoop> {
        let forces = Resolver::forces(&self.resolver, mode, &self.strengths, &self.collide);
        let handle = self.simulation.restart(forces, self.restart_alpha)?;
        self.mode = mode;
        self.active_loop = Some(handle);
        debug!(?mode, generation = handle.generation(), "grouping changed");
        Ok(handle)
    }

    pub fn toggle(&mut self) -> Result<TickLoop> {
        self.set_mode(self.mode.toggled())
    }

    /// Install a per-tick observer; it takes over the running transition
    pub fn set_observer<O>(&mut self, observer: O) -> TickLoop
    where
        O: TickObserver + Send + Sync + 'static,
    {
        let handle = self.simulation.set_observer(observer);
        self.active_loop = Some(handle);
        handle
    }

    /// Tick the most recent transition once; `Settled` when there is none
    pub fn frame(&mut self) -> FrameStatus {
        match self.active_loop {
            Some(handle) => self.simulation.frame(handle),
            None => FrameStatus::Settled,
        }
    }

    /// Index of `category` in the configured band order
    pub fn category_index(&self, category: &str) -> Option<usize> {
        self.categories.iter().position(|c| c == category)
    }
}
