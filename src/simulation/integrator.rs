//! Fixed-step relaxation for the swarm
//!
//! One call = one tick. Velocity-Verlet style with damping instead of a time
//! step: forces kick the velocity, the velocity is damped, then drifts the
//! position, and finally the system cools.

use tracing::trace;

use super::forces::ForceSet;
use super::jitter::Jitter;
use super::params::Parameters;
use super::states::Swarm;

/// Advance the swarm by one tick
///
/// 1. kick: every force adds `(target - x) * strength * alpha` (collision last)
/// 2. damp: `v *= velocity_decay`
/// 3. drift: `x += v`
/// 4. cool: `alpha *= 1 - alpha_decay`
pub fn relax_step(swarm: &mut Swarm, forces: &mut ForceSet, params: &mut Parameters, jitter: &mut Jitter) {
    if swarm.is_empty() {
        return;
    }

    forces.apply_all(params.alpha, &mut swarm.points, jitter);

    for p in swarm.points.iter_mut() {
        p.v *= params.velocity_decay;
        p.x += p.v;
    }

    swarm.ticks += 1;
    params.cool();

    trace!(tick = swarm.ticks, alpha = params.alpha, "relax step");
}
