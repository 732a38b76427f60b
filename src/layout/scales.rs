//! Scales mapping data space onto pixel space
//!
//! Each scale is a plain value configured once and then only read. Every
//! degenerate domain (empty, zero-width, non-finite) maps onto the middle of
//! the range so nothing downstream ever sees NaN from a scale.

/// `[min, max]` of the finite values, `None` when there are none
pub fn extent<I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = f64>,
{
    values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Ordered categories onto equal, padded bands
///
/// Inner and outer padding are both `padding` (a fraction of the step) and
/// the bands are centered in the range.
#[derive(Debug, Clone, PartialEq)]
pub struct BandScale {
    domain: Vec<String>,
    range: (f64, f64),
    padding: f64,
}

impl BandScale {
    pub fn new(domain: Vec<String>, range: (f64, f64), padding: f64) -> Self {
        Self {
            domain,
            range,
            padding: padding.clamp(0.0, 1.0),
        }
    }

    pub fn domain(&self) -> &[String] {
        &self.domain
    }

    fn step(&self) -> f64 {
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        (r1 - r0) / (n - self.padding + 2.0 * self.padding).max(1.0)
    }

    pub fn bandwidth(&self) -> f64 {
        self.step() * (1.0 - self.padding)
    }

    /// Left edge of the band for `key`
    pub fn position(&self, key: &str) -> Option<f64> {
        let index = self.domain.iter().position(|d| d == key)?;
        let n = self.domain.len() as f64;
        let (r0, r1) = self.range;
        let step = self.step();
        let start = r0 + (r1 - r0 - step * (n - self.padding)) * 0.5;
        Some(start + step * index as f64)
    }

    /// Band center for `key`, `None` for keys outside the domain
    pub fn center(&self, key: &str) -> Option<f64> {
        self.position(key).map(|p| p + self.bandwidth() / 2.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    pub fn apply(&self, v: f64) -> f64 {
        interpolate(normalize(self.domain, v), self.range)
    }
}

/// Linear over `sqrt(v)`, so a marker's area tracks its value
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SqrtScale {
    domain: (f64, f64),
    range: (f64, f64),
}

impl SqrtScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { domain, range }
    }

    pub fn apply(&self, v: f64) -> f64 {
        let (d0, d1) = self.domain;
        interpolate(normalize((signed_sqrt(d0), signed_sqrt(d1)), signed_sqrt(v)), self.range)
    }
}

fn signed_sqrt(v: f64) -> f64 {
    v.signum() * v.abs().sqrt()
}

fn normalize((d0, d1): (f64, f64), v: f64) -> f64 {
    let span = d1 - d0;
    if span == 0.0 || !span.is_finite() || !v.is_finite() {
        0.5
    } else {
        (v - d0) / span
    }
}

fn interpolate(t: f64, (r0, r1): (f64, f64)) -> f64 {
    r0 + (r1 - r0) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn categories() -> Vec<String> {
        vec!["Rural".into(), "Intermédiaire".into(), "Urbain".into()]
    }

    #[test]
    fn band_centers_are_evenly_spaced() {
        let band = BandScale::new(categories(), (0.0, 300.0), 0.0);
        assert_eq!(band.center("Rural"), Some(50.0));
        assert_eq!(band.center("Intermédiaire"), Some(150.0));
        assert_eq!(band.center("Urbain"), Some(250.0));
        assert_eq!(band.center("Montagne"), None);
    }

    #[test]
    fn single_band_sits_in_the_middle() {
        let band = BandScale::new(vec!["Tout".into()], (0.0, 680.0), 0.5);
        let center = band.center("Tout").unwrap();
        assert!((center - 340.0).abs() < 1e-9);
    }

    #[test]
    fn padded_bands_keep_symmetry() {
        let band = BandScale::new(categories(), (80.0, 780.0), 0.1);
        let left = band.center("Rural").unwrap() - 80.0;
        let right = 780.0 - band.center("Urbain").unwrap();
        assert!((left - right).abs() < 1e-9);
    }

    #[test]
    fn linear_scale_inverts_for_screen_space() {
        let y = LinearScale::new((20.0, 80.0), (700.0, 20.0));
        assert_eq!(y.apply(20.0), 700.0);
        assert_eq!(y.apply(80.0), 20.0);
        assert!(y.apply(70.0) < y.apply(30.0));
    }

    #[test]
    fn degenerate_domains_map_to_range_midpoint() {
        assert_eq!(LinearScale::new((5.0, 5.0), (0.0, 10.0)).apply(5.0), 5.0);
        assert_eq!(SqrtScale::new((400.0, 400.0), (1.0, 15.0)).apply(400.0), 8.0);
        assert_eq!(LinearScale::new((0.0, 1.0), (0.0, 10.0)).apply(f64::NAN), 5.0);
    }

    #[test]
    fn sqrt_scale_hits_range_ends() {
        let size = SqrtScale::new((100.0, 10_000.0), (1.0, 15.0));
        assert!((size.apply(100.0) - 1.0).abs() < 1e-12);
        assert!((size.apply(10_000.0) - 15.0).abs() < 1e-12);
    }

    #[test]
    fn extent_ignores_non_finite() {
        assert_eq!(extent([3.0, f64::NAN, -1.0, 7.0]), Some((-1.0, 7.0)));
        assert_eq!(extent(Vec::<f64>::new()), None);
    }
}
