//! Configuration types for loading swarm scenarios from YAML.
//!
//! A scenario consists of:
//!
//! - [`EngineConfig`] – tick budget, cooling and collision options
//! - [`LayoutConfig`] – chart geometry, categories, scale ranges, force strengths
//! - `records`        – raw vote rows, inline and/or from `data_file`
//!
//! # YAML format
//!
//! ```yaml
//! engine:
//!   ticks: 200              # batch budget for the first layout
//!   alpha_decay: 0.022      # alpha *= 1 - alpha_decay per tick
//!   velocity_decay: 0.6     # fraction of velocity kept per tick
//!   restart_alpha: 0.5      # alpha after a grouping toggle
//!   collide_iterations: 1
//!   spatial_index: true     # quadtree (true) or direct pairwise scan (false)
//!   seed: 1                 # jitter seed
//!
//! layout:
//!   width: 800
//!   height: 800
//!   margin: { top: 20, right: 20, bottom: 100, left: 80 }
//!   categories: ["Rural", "Intermédiaire (périurbain dense et centres ruraux)", "Urbain"]
//!   all_label: "Tout"
//!   band_padding: 0.5
//!   value_padding: 5.0
//!   value_floor: 0.0        # optional, pins the bottom of the yes_pct axis
//!   radius_range: [1.0, 15.0]
//!   collide_padding: 2.0
//!   initial_mode: all       # or "grouped"
//!   strengths:
//!     all: { x: 0.5, y: 0.5 }
//!     grouped: { x: 0.7, y: 0.5 }
//!     collide: 1.0
//!
//! data_file: communes.yaml  # optional, relative to this file
//! records:
//!   - { name: "Bulle", yes_pct: "58.2", voters: "9123", category: "Urbain" }
//! ```
//!
//! Numeric record fields stay strings here; coercion happens in
//! [`crate::layout::dataset`].

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Error, Result};
use crate::layout::dataset::RawRecord;
use crate::layout::resolver::{ChartArea, CollideSettings, ForceStrengths, GroupingMode, ModeStrengths, ResolverConfig};
use crate::simulation::params::{unit_interval, Parameters};

/// Simulation settings
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EngineConfig {
    pub ticks: usize, // batch tick budget
    pub alpha_decay: f64, // cooling rate per tick
    pub alpha_min: f64, // interactive loops stop below this alpha
    pub velocity_decay: f64, // velocity multiplier per tick
    pub restart_alpha: f64, // alpha used when the grouping changes
    pub collide_iterations: usize, // collision passes per tick
    pub spatial_index: bool, // `true` - quadtree candidates, `false` - direct N^2 scan
    pub alpha_scaled_collide: bool, // scale collision pushes by alpha; leaves overlaps once settled
    pub seed: u64, // jitter seed for coincident points
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            ticks: 300,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            alpha_min: 0.001,
            velocity_decay: 0.6,
            restart_alpha: 0.5,
            collide_iterations: 1,
            spatial_index: true,
            alpha_scaled_collide: false,
            seed: 1,
        }
    }
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct MarginConfig {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

#[derive(Deserialize, Debug, Clone, Copy)]
#[serde(default)]
pub struct StrengthsConfig {
    pub all: ModeStrengths, // x/y pull while ungrouped
    pub grouped: ModeStrengths, // x/y pull while grouped by category
    pub collide: f64, // collision strength
}

impl Default for StrengthsConfig {
    fn default() -> Self {
        Self {
            all: ModeStrengths { x: 0.5, y: 0.5 },
            grouped: ModeStrengths { x: 0.7, y: 0.5 },
            collide: 1.0,
        }
    }
}

/// Chart geometry and scale configuration
#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct LayoutConfig {
    pub width: f64,
    pub height: f64,
    pub margin: MarginConfig,
    pub categories: Vec<String>, // band order when grouped
    pub all_label: String, // the single band when ungrouped
    pub band_padding: f64, // fraction of a band step left empty
    pub value_padding: f64, // added on both ends of the yes_pct domain
    pub value_floor: Option<f64>, // replaces the padded minimum when set
    pub radius_range: [f64; 2], // marker radius for min/max voters
    pub collide_padding: f64, // extra separation per marker
    pub initial_mode: GroupingMode,
    pub strengths: StrengthsConfig,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 800.0,
            margin: MarginConfig { top: 20.0, right: 20.0, bottom: 100.0, left: 80.0 },
            categories: vec![
                "Rural".to_owned(),
                "Intermédiaire (périurbain dense et centres ruraux)".to_owned(),
                "Urbain".to_owned(),
            ],
            all_label: "Tout".to_owned(),
            band_padding: 0.5,
            value_padding: 5.0,
            value_floor: None,
            radius_range: [1.0, 15.0],
            collide_padding: 2.0,
            initial_mode: GroupingMode::All,
            strengths: StrengthsConfig::default(),
        }
    }
}

impl LayoutConfig {
    pub fn area(&self) -> ChartArea {
        ChartArea {
            left: self.margin.left,
            top: self.margin.top,
            right: self.width - self.margin.right,
            bottom: self.height - self.margin.bottom,
        }
    }
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Default)]
pub struct ScenarioConfig {
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub data_file: Option<PathBuf>,
    #[serde(default)]
    pub records: Vec<RawRecord>,
}

impl ScenarioConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|source| Error::Yaml { path: "<inline>".to_owned(), source })
    }

    /// Read a scenario file; `data_file` rows are appended after inline rows
    pub fn load(path: &Path) -> Result<Self> {
        let mut cfg: ScenarioConfig = read_yaml(path)?;

        if let Some(data_file) = cfg.data_file.take() {
            let data_path = path.parent().unwrap_or_else(|| Path::new(".")).join(data_file);
            let rows: Vec<RawRecord> = read_yaml(&data_path)?;
            cfg.records.extend(rows);
        }

        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        self.parameters().validate()?;
        unit_interval("restart_alpha", self.engine.restart_alpha)?;

        let strengths = &self.layout.strengths;
        unit_interval("strengths.all.x", strengths.all.x)?;
        unit_interval("strengths.all.y", strengths.all.y)?;
        unit_interval("strengths.grouped.x", strengths.grouped.x)?;
        unit_interval("strengths.grouped.y", strengths.grouped.y)?;
        unit_interval("strengths.collide", strengths.collide)?;
        unit_interval("band_padding", self.layout.band_padding)?;

        let area = self.layout.area();
        positive("plot width", area.right - area.left)?;
        positive("plot height", area.bottom - area.top)?;
        non_negative("radius_range.min", self.layout.radius_range[0])?;
        non_negative("radius_range.max", self.layout.radius_range[1])?;
        non_negative("value_padding", self.layout.value_padding)?;
        non_negative("collide_padding", self.layout.collide_padding)?;
        if let Some(floor) = self.layout.value_floor {
            if !floor.is_finite() {
                return Err(Error::InvalidParameter { name: "value_floor", value: floor, reason: "must be finite" });
            }
        }
        Ok(())
    }

    pub fn parameters(&self) -> Parameters {
        Parameters {
            alpha: 1.0,
            alpha_min: self.engine.alpha_min,
            alpha_decay: self.engine.alpha_decay,
            velocity_decay: self.engine.velocity_decay,
            seed: self.engine.seed,
        }
    }

    pub fn resolver_config(&self) -> ResolverConfig {
        ResolverConfig {
            area: self.layout.area(),
            categories: self.layout.categories.clone(),
            all_label: self.layout.all_label.clone(),
            band_padding: self.layout.band_padding,
            value_padding: self.layout.value_padding,
            value_floor: self.layout.value_floor,
            radius_range: (self.layout.radius_range[0], self.layout.radius_range[1]),
        }
    }

    pub fn strengths(&self) -> ForceStrengths {
        let s = self.layout.strengths;
        ForceStrengths { all: s.all, grouped: s.grouped, collide: s.collide }
    }

    pub fn collide_settings(&self) -> CollideSettings {
        CollideSettings {
            padding: self.layout.collide_padding,
            iterations: self.engine.collide_iterations,
            spatial_index: self.engine.spatial_index,
            alpha_scaled: self.engine.alpha_scaled_collide,
        }
    }
}

fn read_yaml<T>(path: &Path) -> Result<T>
where
    T: for<'de> Deserialize<'de>,
{
    let display = path.display().to_string();
    let file = File::open(path).map_err(|source| Error::Io { path: display.clone(), source })?;
    serde_yaml::from_reader(BufReader::new(file)).map_err(|source| Error::Yaml { path: display, source })
}

fn positive(name: &'static str, value: f64) -> Result<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value, reason: "must be positive" })
    }
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value >= 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(Error::InvalidParameter { name, value, reason: "must not be negative" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = ScenarioConfig::from_yaml_str("{}").unwrap();
        assert_eq!(cfg.engine.ticks, 300);
        assert_eq!(cfg.layout.categories.len(), 3);
        assert!(cfg.records.is_empty());
        cfg.validate().unwrap();
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let cfg = ScenarioConfig::from_yaml_str(
            r#"
engine:
  ticks: 50
layout:
  initial_mode: grouped
  strengths:
    collide: 0.7
records:
  - { name: "Riaz", yes_pct: "61.5", voters: "1400", category: "Rural" }
"#,
        )
        .unwrap();

        assert_eq!(cfg.engine.ticks, 50);
        assert_eq!(cfg.engine.velocity_decay, 0.6);
        assert_eq!(cfg.layout.initial_mode, GroupingMode::Grouped);
        assert_eq!(cfg.layout.strengths.collide, 0.7);
        assert_eq!(cfg.layout.strengths.grouped.x, 0.7);
        assert_eq!(cfg.records[0].voters, "1400");
    }

    #[test]
    fn out_of_range_strength_is_rejected() {
        let cfg = ScenarioConfig::from_yaml_str("layout:\n  strengths:\n    all: { x: 1.5, y: 0.5 }\n").unwrap();
        let err = cfg.validate().unwrap_err();
        assert!(matches!(err, Error::InvalidParameter { name: "strengths.all.x", .. }));
    }

    #[test]
    fn margins_larger_than_chart_are_rejected() {
        let cfg = ScenarioConfig::from_yaml_str("layout:\n  width: 50\n").unwrap();
        assert!(cfg.validate().is_err());
    }
}
