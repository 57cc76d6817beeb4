//! Swerve Runner - an endless runner simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (tile content generation, locomotion, collisions)
//! - `tuning`: Data-driven game balance
//! - `progression`: Score, high score and speed ramp
//! - `settings`: Persisted player preferences
//! - `persistence`: Key/value storage backends
//! - `camera`: Third-person follow camera

pub mod camera;
pub mod persistence;
pub mod progression;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use progression::Progression;
pub use settings::Settings;
pub use tuning::{Difficulty, Tuning};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (50 Hz physics)
    pub const SIM_DT: f32 = 1.0 / 50.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Default world gravity (m/s², negative is down)
    pub const GRAVITY: f32 = -9.81;

    /// Height of the flat track surface
    pub const GROUND_HEIGHT: f32 = 0.0;

    /// Tolerance for "resting on" checks against the ground surface
    pub const CONTACT_EPSILON: f32 = 1e-4;
}
