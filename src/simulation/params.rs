//! Cooling and damping parameters for the simulation
//!
//! `Parameters` holds runtime settings:
//! - current `alpha` and the `alpha_min` settle threshold,
//! - geometric `alpha_decay` applied after every tick,
//! - `velocity_decay` (fraction of velocity kept each tick),
//! - the jitter seed used to split exactly coincident points

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct Parameters {
    pub alpha: f64, // current cooling factor
    pub alpha_min: f64, // settle threshold
    pub alpha_decay: f64, // alpha *= 1 - alpha_decay per tick
    pub velocity_decay: f64, // velocity multiplier per tick
    pub seed: u64, // deterministic jitter seed
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            alpha_min: 0.001,
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            velocity_decay: 0.6,
            seed: 1,
        }
    }
}

impl Parameters {
    pub fn validate(&self) -> Result<()> {
        unit_interval("alpha", self.alpha)?;
        unit_interval("alpha_min", self.alpha_min)?;
        unit_interval("alpha_decay", self.alpha_decay)?;
        unit_interval("velocity_decay", self.velocity_decay)?;
        Ok(())
    }

    /// Geometric cooling step
    pub fn cool(&mut self) {
        self.alpha *= 1.0 - self.alpha_decay;
    }

    pub fn is_settled(&self) -> bool {
        self.alpha < self.alpha_min
    }
}

pub(crate) fn unit_interval(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::InvalidParameter {
            name,
            value,
            reason: "must lie in [0, 1]",
        })
    }
}
