//! Ground queries
//!
//! The locomotion model never touches level geometry directly; it asks a
//! [`GroundOracle`] to cast a short ray straight down.

use glam::Vec3;

use crate::consts::{CONTACT_EPSILON, GROUND_HEIGHT};

/// Downward ray queries against ground geometry
pub trait GroundOracle {
    /// Cast a ray down from `origin`. Returns the hit distance if ground lies
    /// within `max_distance`.
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<f32>;

    /// Ground within `probe_distance` below `origin`
    fn is_grounded(&self, origin: Vec3, probe_distance: f32) -> bool {
        self.probe_down(origin, probe_distance).is_some()
    }
}

/// Infinite horizontal plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatGround {
    pub height: f32,
}

impl Default for FlatGround {
    fn default() -> Self {
        Self {
            height: GROUND_HEIGHT,
        }
    }
}

impl GroundOracle for FlatGround {
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        let distance = origin.y - self.height;
        // A ray starting under the surface does not hit it
        if distance < -CONTACT_EPSILON || distance > max_distance {
            return None;
        }
        Some(distance.max(0.0))
    }
}

/// Closures work as oracles, handy for scripted tests
impl<F> GroundOracle for F
where
    F: Fn(Vec3, f32) -> Option<f32>,
{
    fn probe_down(&self, origin: Vec3, max_distance: f32) -> Option<f32> {
        self(origin, max_distance)
    }
}
