pub mod error;
pub mod simulation;
pub mod layout;
pub mod configuration;
pub mod benchmark;
#[cfg(feature = "viewer")]
pub mod visualization;

pub use error::{Error, Result};

pub use simulation::states::{Point, Swarm, NVec2, Marker, Snapshot};
pub use simulation::forces::{Accessor, Force, ForceKind, ForceSet, PositionX, PositionY, Collide};
pub use simulation::engine::{Simulation, SimState, TickLoop, TickObserver, FrameStatus};
pub use simulation::params::Parameters;
pub use simulation::integrator::relax_step;
pub use simulation::scenario::Scenario;

pub use layout::dataset::{coerce_records, RawRecord, Record, RecordIssue, LoadReport};
pub use layout::resolver::{Resolver, ResolverConfig, ChartArea, GroupingMode, ForceStrengths, ModeStrengths, CollideSettings, Targets};
pub use layout::scales::{BandScale, LinearScale, SqrtScale};

pub use configuration::config::{EngineConfig, LayoutConfig, ScenarioConfig};

pub use benchmark::benchmark::bench_collide;

#[cfg(feature = "viewer")]
pub use visualization::beeswarm_vis2d::run_2d;
