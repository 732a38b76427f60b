//! Force contributors for the swarm engine
//!
//! Every force writes into point velocities, never positions. A `ForceSet`
//! keys its terms by `ForceKind`, so installing a second x-force replaces the
//! first, and iteration order (x, then y, then collision) is fixed by the enum.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{Error, Result};
use crate::simulation::jitter::Jitter;
use crate::simulation::quadtree::CollisionTree;
use crate::simulation::states::{NVec2, Point};

/// Per-point scalar read from a `Point` (a target coordinate or a radius)
pub type Accessor = Arc<dyn Fn(&Point) -> f64 + Send + Sync>;

/// Which slot a force occupies in a [`ForceSet`]
/// Declaration order is application order within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ForceKind {
    X,
    Y,
    Collide,
}

/// Trait for force terms operating on a slice of points
/// `initialize` runs whenever the term is installed or the point set changes;
/// `apply` adds this term's contribution to every `v`
pub trait Force {
    fn kind(&self) -> ForceKind;

    fn initialize(&mut self, _points: &[Point]) -> Result<()> {
        Ok(())
    }

    fn apply(&mut self, alpha: f64, points: &mut [Point], jitter: &mut Jitter);
}

/// Active forces, one per [`ForceKind`]
#[derive(Default)]
pub struct ForceSet {
    terms: BTreeMap<ForceKind, Box<dyn Force + Send + Sync>>,
}

impl ForceSet {
    /// Create an empty force set
    pub fn new() -> Self {
        Self { terms: BTreeMap::new() }
    }

    /// Add a force term, replacing any term of the same kind
    pub fn with<T>(mut self, term: T) -> Self
    where
        T: Force + Send + Sync + 'static,
    {
        self.insert(term);
        self
    }

    pub fn insert<T>(&mut self, term: T)
    where
        T: Force + Send + Sync + 'static,
    {
        self.terms.insert(term.kind(), Box::new(term));
    }

    pub fn kinds(&self) -> impl Iterator<Item = ForceKind> + '_ {
        self.terms.keys().copied()
    }

    /// Re-evaluate every term's per-point cache against `points`
    pub fn initialize(&mut self, points: &[Point]) -> Result<()> {
        for term in self.terms.values_mut() {
            term.initialize(points)?;
        }
        Ok(())
    }

    /// Run every term once, directional forces before collision
    pub fn apply_all(&mut self, alpha: f64, points: &mut [Point], jitter: &mut Jitter) {
        for term in self.terms.values_mut() {
            term.apply(alpha, points, jitter);
        }
    }
}

impl fmt::Debug for ForceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.terms.keys()).finish()
    }
}

/// Evaluate `target` for every point, mapping non-finite results to `None`
fn cache_targets(target: &Accessor, points: &[Point]) -> Vec<Option<f64>> {
    points
        .iter()
        .map(|p| Some(target(p)).filter(|t| t.is_finite()))
        .collect()
}

/// Pulls each point's x towards `target(p)`
/// Points whose target is NaN or infinite feel no x-force at all
pub struct PositionX {
    target: Accessor,
    strength: f64,
    targets: Vec<Option<f64>>,
}

impl PositionX {
    pub fn new(target: Accessor, strength: f64) -> Self {
        Self { target, strength, targets: Vec::new() }
    }
}

impl Force for PositionX {
    fn kind(&self) -> ForceKind {
        ForceKind::X
    }

    fn initialize(&mut self, points: &[Point]) -> Result<()> {
        self.targets = cache_targets(&self.target, points);
        Ok(())
    }

    fn apply(&mut self, alpha: f64, points: &mut [Point], _jitter: &mut Jitter) {
        if self.targets.len() != points.len() {
            self.targets = cache_targets(&self.target, points);
        }
        let k = self.strength * alpha;
        for (p, target) in points.iter_mut().zip(&self.targets) {
            if let Some(t) = target {
                p.v.x += (t - p.x.x) * k;
            }
        }
    }
}

/// Pulls each point's y towards `target(p)`, same NaN rule as [`PositionX`]
pub struct PositionY {
    target: Accessor,
    strength: f64,
    targets: Vec<Option<f64>>,
}

impl PositionY {
    pub fn new(target: Accessor, strength: f64) -> Self {
        Self { target, strength, targets: Vec::new() }
    }
}

impl Force for PositionY {
    fn kind(&self) -> ForceKind {
        ForceKind::Y
    }

    fn initialize(&mut self, points: &[Point]) -> Result<()> {
        self.targets = cache_targets(&self.target, points);
        Ok(())
    }

    fn apply(&mut self, alpha: f64, points: &mut [Point], _jitter: &mut Jitter) {
        if self.targets.len() != points.len() {
            self.targets = cache_targets(&self.target, points);
        }
        let k = self.strength * alpha;
        for (p, target) in points.iter_mut().zip(&self.targets) {
            if let Some(t) = target {
                p.v.y += (t - p.x.y) * k;
            }
        }
    }
}

/// Pairwise circle separation
///
/// Works on predicted positions (`x + v`) so it corrects overlaps the
/// directional forces are about to create this very tick. Each overlapping
/// pair is pushed apart along the line between centers; point `i` takes
/// `r_j² / (r_i² + r_j²)` of the push so larger markers move less.
pub struct Collide {
    radius: Accessor,
    strength: f64,
    iterations: usize,
    spatial_index: bool,
    alpha_scaled: bool,
    radii: Vec<f64>,
}

impl Collide {
    /// Full-strength, single-iteration collision using the quadtree
    pub fn new(radius: Accessor) -> Self {
        Self {
            radius,
            strength: 1.0,
            iterations: 1,
            spatial_index: true,
            alpha_scaled: false,
            radii: Vec::new(),
        }
    }

    pub fn strength(mut self, strength: f64) -> Self {
        self.strength = strength;
        self
    }

    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations.max(1);
        self
    }

    /// `false` falls back to scanning every pair directly
    pub fn spatial_index(mut self, enabled: bool) -> Self {
        self.spatial_index = enabled;
        self
    }

    /// Multiply the push by alpha, so separation weakens as the layout cools
    ///
    /// Off by default. With it on, a settled layout can keep overlaps of
    /// several pixels.
    pub fn alpha_scaled(mut self, enabled: bool) -> Self {
        self.alpha_scaled = enabled;
        self
    }

    fn resolve_radii(&self, points: &[Point]) -> Result<Vec<f64>> {
        points
            .iter()
            .map(|p| {
                let r = (self.radius)(p);
                if r < 0.0 {
                    Err(Error::NegativeRadius { id: p.id.clone(), radius: r })
                } else if r.is_finite() {
                    Ok(r)
                } else {
                    debug!(id = %p.id, "non-finite collision radius, point excluded from collisions");
                    Ok(0.0)
                }
            })
            .collect()
    }

    fn separate(&self, points: &mut [Point], i: usize, j: usize, pi: NVec2, scale: f64, jitter: &mut Jitter) {
        let ri = self.radii[i];
        let rj = self.radii[j];
        let r = ri + rj;
        if r <= 0.0 {
            return;
        }

        let mut d = pi - points[j].predicted();
        let mut l = d.norm_squared();
        if l >= r * r {
            return;
        }

        // Exact coincidence on an axis gives no direction to push along
        if d.x == 0.0 {
            d.x = jitter.offset();
            l += d.x * d.x;
        }
        if d.y == 0.0 {
            d.y = jitter.offset();
            l += d.y * d.y;
        }

        let l = l.sqrt();
        let push = d * ((r - l) / l * scale);
        let share = rj * rj / (ri * ri + rj * rj);

        points[i].v += push * share;
        points[j].v -= push * (1.0 - share);
    }
}

impl Force for Collide {
    fn kind(&self) -> ForceKind {
        ForceKind::Collide
    }

    fn initialize(&mut self, points: &[Point]) -> Result<()> {
        self.radii = self.resolve_radii(points)?;
        Ok(())
    }

    fn apply(&mut self, alpha: f64, points: &mut [Point], jitter: &mut Jitter) {
        let n = points.len();
        if n < 2 {
            return;
        }
        if self.radii.len() != n {
            // Only reachable if the term was never initialized; clamp instead of failing mid-tick
            self.radii = points.iter().map(|p| (self.radius)(p)).map(|r| if r.is_finite() { r.max(0.0) } else { 0.0 }).collect();
        }

        let scale = if self.alpha_scaled { self.strength * alpha } else { self.strength };
        let mut candidates = Vec::new();

        for _ in 0..self.iterations {
            let tree = self.spatial_index.then(|| {
                let predicted: Vec<NVec2> = points.iter().map(Point::predicted).collect();
                CollisionTree::build(&predicted, &self.radii)
            });

            for i in 0..n {
                let pi = points[i].predicted();
                match &tree {
                    Some(tree) => tree.candidates(i, pi, self.radii[i], &mut candidates),
                    None => {
                        candidates.clear();
                        candidates.extend(i + 1..n);
                    }
                }
                for &j in &candidates {
                    self.separate(points, i, j, pi, scale, jitter);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point_at(id: &str, x: f64, y: f64, radius: f64) -> Point {
        let mut p = Point::new(id, "Rural", 50.0, 100, radius);
        p.x = NVec2::new(x, y);
        p
    }

    #[test]
    fn directional_force_skips_nan_targets() {
        let mut points = vec![point_at("a", 0.0, 0.0, 1.0), point_at("b", 0.0, 0.0, 1.0)];
        let target: Accessor = Arc::new(|p: &Point| if p.id == "a" { 10.0 } else { f64::NAN });
        let mut fx = PositionX::new(target, 0.5);
        fx.initialize(&points).unwrap();
        fx.apply(1.0, &mut points, &mut Jitter::new(1));

        assert_eq!(points[0].v.x, 5.0);
        assert_eq!(points[1].v.x, 0.0);
    }

    #[test]
    fn collide_rejects_negative_radius() {
        let points = vec![point_at("neg", 0.0, 0.0, -3.0)];
        let mut collide = Collide::new(Arc::new(|p: &Point| p.radius));
        let err = collide.initialize(&points).unwrap_err();
        assert!(matches!(err, Error::NegativeRadius { .. }));
    }

    #[test]
    fn collide_pushes_equal_points_symmetrically() {
        let mut points = vec![point_at("a", 0.0, 0.0, 5.0), point_at("b", 6.0, 0.0, 5.0)];
        let mut collide = Collide::new(Arc::new(|p: &Point| p.radius));
        collide.initialize(&points).unwrap();
        collide.apply(1.0, &mut points, &mut Jitter::new(1));

        assert!((points[0].v.x + 2.0).abs() < 1e-12);
        assert!((points[1].v.x - 2.0).abs() < 1e-12);
    }

    #[test]
    fn alpha_scaled_push_weakens_with_alpha() {
        let mut points = vec![point_at("a", 0.0, 0.0, 5.0), point_at("b", 6.0, 0.0, 5.0)];
        let mut collide = Collide::new(Arc::new(|p: &Point| p.radius)).alpha_scaled(true);
        collide.initialize(&points).unwrap();
        collide.apply(0.5, &mut points, &mut Jitter::new(1));

        assert!((points[0].v.x + 1.0).abs() < 1e-12);
        assert!((points[1].v.x - 1.0).abs() < 1e-12);
    }

    #[test]
    fn set_replaces_by_kind() {
        let target: Accessor = Arc::new(|_: &Point| 0.0);
        let set = ForceSet::new()
            .with(PositionX::new(target.clone(), 0.1))
            .with(PositionX::new(target.clone(), 0.9))
            .with(Collide::new(target.clone()))
            .with(PositionY::new(target, 0.1));

        assert_eq!(set.kinds().collect::<Vec<_>>(), vec![ForceKind::X, ForceKind::Y, ForceKind::Collide]);
    }
}
