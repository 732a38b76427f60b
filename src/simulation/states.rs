//! Core state types for the swarm simulation.
//!
//! - `Point` / `Swarm`: mutable per-marker state owned by the engine
//! - `Marker` / `Snapshot`: read-only copies handed to renderers and observers
//!
//! Positions and velocities use `NVec2` (pixel space, y grows downwards).

use nalgebra::Vector2;
use serde::Serialize;

pub type NVec2 = Vector2<f64>;

#[derive(Debug, Clone)]
pub struct Point {
    pub id: String, // municipality name
    pub category: String, // urban/rural class
    pub value: f64, // yes-vote percentage
    pub weight: u64, // voter count
    pub radius: f64, // marker radius from the size scale
    pub x: NVec2, // position
    pub v: NVec2, // velocity
}

impl Point {
    /// Unplaced point with zero velocity; the engine seeds real positions
    pub fn new(id: impl Into<String>, category: impl Into<String>, value: f64, weight: u64, radius: f64) -> Self {
        Self {
            id: id.into(),
            category: category.into(),
            value,
            weight,
            radius,
            x: NVec2::new(f64::NAN, f64::NAN),
            v: NVec2::zeros(),
        }
    }

    /// `false` until the point has been given a position
    pub fn is_placed(&self) -> bool {
        self.x.x.is_finite() && self.x.y.is_finite()
    }

    /// Position after the pending velocity is applied
    pub fn predicted(&self) -> NVec2 {
        self.x + self.v
    }
}

#[derive(Debug, Clone, Default)]
pub struct Swarm {
    pub points: Vec<Point>, // every marker in the chart
    pub ticks: u64, // ticks executed since construction
}

impl Swarm {
    pub fn new(points: Vec<Point>) -> Self {
        Self { points, ticks: 0 }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Place unpositioned points on a phyllotaxis spiral around `center`
    /// Spiral spacing keeps every seed distinct, so no pair starts coincident
    pub fn seed_positions(&mut self, center: NVec2) {
        let initial_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
        for (i, p) in self.points.iter_mut().enumerate() {
            if p.is_placed() {
                continue;
            }
            let radius = 10.0 * (0.5 + i as f64).sqrt();
            let angle = i as f64 * initial_angle;
            p.x = center + NVec2::new(radius * angle.cos(), radius * angle.sin());
            p.v = NVec2::zeros();
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.ticks,
            markers: self.points.iter().map(Marker::from).collect(),
        }
    }
}

/// Everything a renderer needs to draw one marker and its tooltip
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Marker {
    pub id: String,
    pub x: f64,
    pub y: f64,
    pub radius: f64,
    pub category: String,
    pub value: f64,
    pub weight: u64,
}

impl From<&Point> for Marker {
    fn from(p: &Point) -> Self {
        Self {
            id: p.id.clone(),
            x: p.x.x,
            y: p.x.y,
            radius: p.radius,
            category: p.category.clone(),
            value: p.value,
            weight: p.weight,
        }
    }
}

impl Marker {
    /// Tooltip line, e.g. `Commune: Gruyères | Oui %: 61.2% | Votants: 1234 | Catégorie: Rural`
    pub fn tooltip(&self) -> String {
        format!("Commune: {} | Oui %: {:.1}% | Votants: {} | Catégorie: {}", self.id, self.value, self.weight, self.category)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub markers: Vec<Marker>,
}

impl Snapshot {
    /// Largest pairwise penetration `r_i + r_j + 2 * padding - d_ij`, or `0.0` when nothing overlaps
    pub fn max_overlap(&self, padding: f64) -> f64 {
        let mut worst: f64 = 0.0;
        for (i, a) in self.markers.iter().enumerate() {
            for b in &self.markers[i + 1..] {
                let d = ((a.x - b.x).powi(2) + (a.y - b.y).powi(2)).sqrt();
                worst = worst.max(a.radius + b.radius + 2.0 * padding - d);
            }
        }
        worst
    }

    pub fn find(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }
}
