//! Layout parameter resolver
//!
//! Turns records into points and points into force targets:
//! - `target_x`: band center of the point's category, or of the single
//!   "all" band when ungrouped
//! - `target_y`: yes-vote percentage on an inverted linear scale
//! - `radius`: voter count on a square-root scale
//!
//! Scales are fixed at construction from an explicit [`ResolverConfig`].

use std::sync::Arc;

use serde::Deserialize;

use crate::layout::dataset::Record;
use crate::layout::scales::{extent, BandScale, LinearScale, SqrtScale};
use crate::simulation::forces::{Accessor, Collide, ForceSet, PositionX, PositionY};
use crate::simulation::states::{NVec2, Point};

/// Value domain used when there are no records at all
const FALLBACK_VALUE_DOMAIN: (f64, f64) = (0.0, 100.0);

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum GroupingMode {
    #[default]
    All,
    Grouped,
}

impl GroupingMode {
    pub fn toggled(self) -> Self {
        match self {
            GroupingMode::All => GroupingMode::Grouped,
            GroupingMode::Grouped => GroupingMode::All,
        }
    }
}

/// Plot area in pixels, y growing downwards
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartArea {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ChartArea {
    pub fn center(&self) -> NVec2 {
        NVec2::new((self.left + self.right) * 0.5, (self.top + self.bottom) * 0.5)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolverConfig {
    pub area: ChartArea,
    pub categories: Vec<String>,
    pub all_label: String,
    pub band_padding: f64,
    pub value_padding: f64,
    pub value_floor: Option<f64>, // fixed lower end of the value domain
    pub radius_range: (f64, f64),
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct ModeStrengths {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceStrengths {
    pub all: ModeStrengths,
    pub grouped: ModeStrengths,
    pub collide: f64,
}

impl ForceStrengths {
    pub fn for_mode(&self, mode: GroupingMode) -> ModeStrengths {
        match mode {
            GroupingMode::All => self.all,
            GroupingMode::Grouped => self.grouped,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollideSettings {
    pub padding: f64, // added to every marker radius
    pub iterations: usize,
    pub spatial_index: bool,
    pub alpha_scaled: bool,
}

impl Default for CollideSettings {
    fn default() -> Self {
        Self {
            padding: 0.0,
            iterations: 1,
            spatial_index: true,
            alpha_scaled: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Targets {
    pub x: f64,
    pub y: f64,
    pub radius: f64,
}

#[derive(Debug, Clone)]
pub struct Resolver {
    all_band: BandScale,
    grouped_band: BandScale,
    all_label: String,
    value: LinearScale,
    size: SqrtScale,
}

impl Resolver {
    /// Fit the value and size domains to `records`
    pub fn new(config: &ResolverConfig, records: &[Record]) -> Self {
        let area = config.area;
        let x_range = (area.left, area.right);

        let value_domain = extent(records.iter().map(|r| r.yes_pct))
            .map(|(lo, hi)| (config.value_floor.unwrap_or(lo - config.value_padding), hi + config.value_padding))
            .unwrap_or(FALLBACK_VALUE_DOMAIN);
        let weight_domain = extent(records.iter().map(|r| r.voters as f64)).unwrap_or((1.0, 1.0));

        Self {
            all_band: BandScale::new(vec![config.all_label.clone()], x_range, config.band_padding),
            grouped_band: BandScale::new(config.categories.clone(), x_range, config.band_padding),
            all_label: config.all_label.clone(),
            value: LinearScale::new(value_domain, (area.bottom, area.top)),
            size: SqrtScale::new(weight_domain, config.radius_range),
        }
    }

    pub fn value_scale(&self) -> &LinearScale {
        &self.value
    }

    /// NaN for a category outside the configured set (no x-force then)
    pub fn target_x(&self, category: &str, mode: GroupingMode) -> f64 {
        let center = match mode {
            GroupingMode::All => self.all_band.center(&self.all_label),
            GroupingMode::Grouped => self.grouped_band.center(category),
        };
        center.unwrap_or(f64::NAN)
    }

    pub fn target_y(&self, value: f64) -> f64 {
        self.value.apply(value)
    }

    pub fn radius(&self, weight: u64) -> f64 {
        self.size.apply(weight as f64)
    }

    /// Every target the forces read for `p` under `mode`
    pub fn resolve(&self, p: &Point, mode: GroupingMode) -> Targets {
        Targets {
            x: self.target_x(&p.category, mode),
            y: self.target_y(p.value),
            radius: self.radius(p.weight),
        }
    }

    /// Unplaced points, one per record, in record order
    pub fn points(&self, records: &[Record]) -> Vec<Point> {
        records
            .iter()
            .map(|r| Point::new(r.name.clone(), r.category.clone(), r.yes_pct, r.voters, self.radius(r.voters)))
            .collect()
    }

    /// x/y pulls for `mode` plus collision on `radius + padding`
    pub fn forces(resolver: &Arc<Resolver>, mode: GroupingMode, strengths: &ForceStrengths, collide: &CollideSettings) -> ForceSet {
        let pull = strengths.for_mode(mode);

        let for_x = Arc::clone(resolver);
        let target_x: Accessor = Arc::new(move |p: &Point| for_x.resolve(p, mode).x);
        let for_y = Arc::clone(resolver);
        let target_y: Accessor = Arc::new(move |p: &Point| for_y.resolve(p, mode).y);
        let padding = collide.padding;
        let radius: Accessor = Arc::new(move |p: &Point| p.radius + padding);

        ForceSet::new()
            .with(PositionX::new(target_x, pull.x))
            .with(PositionY::new(target_y, pull.y))
            .with(
                Collide::new(radius)
                    .strength(strengths.collide)
                    .iterations(collide.iterations)
                    .spatial_index(collide.spatial_index)
                    .alpha_scaled(collide.alpha_scaled),
            )
    }
}
