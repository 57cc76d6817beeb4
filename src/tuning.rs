//! Data-driven game balance
//!
//! Every knob the simulation reads lives here. Defaults match the shipped
//! game; a JSON file can override any subset of fields.

use std::path::Path;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::GRAVITY;
use crate::sim::placement::min_passable_slots;

/// Difficulty presets (only the speed ramp differs)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Novice,
    #[default]
    Amateur,
    Experienced,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Novice => "Novice",
            Difficulty::Amateur => "Amateur",
            Difficulty::Experienced => "Experienced",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "novice" | "easy" => Some(Difficulty::Novice),
            "amateur" | "normal" => Some(Difficulty::Amateur),
            "experienced" | "hard" => Some(Difficulty::Experienced),
            _ => None,
        }
    }

    /// Forward speed added per collected point
    pub fn speed_inc_per_point(&self) -> f32 {
        match self {
            Difficulty::Novice => 0.005,
            Difficulty::Amateur => 0.01,
            Difficulty::Experienced => 0.02,
        }
    }
}

/// Errors raised when tuning invariants are violated.
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("{field} must be at least {min:.3} (got {value:.3})")]
    MinViolation {
        field: &'static str,
        min: f32,
        value: f32,
    },
    #[error("{field} must be between {min:.3} and {max:.3} (got {value:.3})")]
    RangeViolation {
        field: &'static str,
        min: f32,
        max: f32,
        value: f32,
    },
    #[error("coins per tile range invalid (min {min} > max {max})")]
    CoinRange { min: u32, max: u32 },
    #[error(
        "{slots} obstacle slots cannot guarantee a free lane (need 0 or at least {required})"
    )]
    Unpassable { slots: usize, required: usize },
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Player movement parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionTuning {
    /// Initial forward speed (m/s)
    pub speed: f32,
    /// Lateral metres per unit of horizontal swipe delta
    pub swerve_sensitivity: f32,
    /// Lateral offset is clamped to [-max_lateral, max_lateral]
    pub max_lateral: f32,
    /// Vertical velocity set on jump launch
    pub jump_velocity: f32,
    /// Gravity scale while airborne (> 1 gives a snappier arc)
    pub fall_multiplier: f32,
    /// Length of the downward grounded probe
    pub ground_probe_distance: f32,
    /// Minimum vertical swipe delta that triggers a jump
    pub jump_delta_threshold: f32,
    /// World gravity (negative is down)
    pub gravity: f32,
}

impl Default for LocomotionTuning {
    fn default() -> Self {
        Self {
            speed: 5.0,
            swerve_sensitivity: 0.01,
            max_lateral: 2.0,
            jump_velocity: 5.0,
            fall_multiplier: 2.5,
            ground_probe_distance: 0.2,
            jump_delta_threshold: 0.02,
            gravity: GRAVITY,
        }
    }
}

impl LocomotionTuning {
    pub fn validate(&self) -> Result<(), TuningError> {
        ensure_min("locomotion.speed", self.speed, 0.0)?;
        ensure_min("locomotion.swerve_sensitivity", self.swerve_sensitivity, 0.0)?;
        ensure_min("locomotion.max_lateral", self.max_lateral, 0.0)?;
        ensure_min("locomotion.jump_velocity", self.jump_velocity, 0.0)?;
        ensure_min("locomotion.fall_multiplier", self.fall_multiplier, 1.0)?;
        ensure_min("locomotion.ground_probe_distance", self.ground_probe_distance, 0.0)?;
        ensure_min("locomotion.jump_delta_threshold", self.jump_delta_threshold, 0.0)?;
        if !(self.gravity < 0.0) {
            return Err(TuningError::RangeViolation {
                field: "locomotion.gravity",
                min: f32::MIN,
                max: 0.0,
                value: self.gravity,
            });
        }
        Ok(())
    }
}

/// Tile content policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlacementTuning {
    /// Chance that the primary obstacle is the tall variant
    pub tall_obstacle_chance: f32,
    /// Fewest coins attempted per tile
    pub coins_min: u32,
    /// Most coins attempted per tile
    pub coins_max: u32,
}

impl Default for PlacementTuning {
    fn default() -> Self {
        Self {
            tall_obstacle_chance: 0.1,
            coins_min: 1,
            coins_max: 2,
        }
    }
}

/// Track segment geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackTuning {
    /// Forward length of one tile
    pub tile_length: f32,
    /// Tiles kept spawned ahead of the player
    pub initial_tiles: u32,
    /// Leading tiles spawned without content
    pub safe_start_tiles: u32,
    /// Delay between a tile's exit trigger and its removal
    pub retire_delay_secs: f32,
    /// Obstacle lane points, relative to the tile origin
    pub obstacle_slots: Vec<Vec3>,
    /// Coin points, relative to the tile origin
    pub coin_slots: Vec<Vec3>,
}

impl TrackTuning {
    fn default_obstacle_slots() -> Vec<Vec3> {
        (0..9)
            .map(|i| Vec3::new(-2.0 + i as f32 * 0.5, 0.0, 5.0))
            .collect()
    }

    fn default_coin_slots() -> Vec<Vec3> {
        let mut slots = Vec::with_capacity(9);
        for row in 0..3 {
            for lane in 0..3 {
                slots.push(Vec3::new(
                    -1.5 + lane as f32 * 1.5,
                    0.5,
                    1.5 + row as f32 * 3.0,
                ));
            }
        }
        slots
    }
}

impl Default for TrackTuning {
    fn default() -> Self {
        Self {
            tile_length: 10.0,
            initial_tiles: 8,
            safe_start_tiles: 1,
            retire_delay_secs: 1.0,
            obstacle_slots: Self::default_obstacle_slots(),
            coin_slots: Self::default_coin_slots(),
        }
    }
}

/// Collision extents (half sizes, boxes sit on the ground)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryTuning {
    pub player_half_extents: Vec3,
    /// Low obstacles are short enough to clear with a jump
    pub low_obstacle_half_extents: Vec3,
    pub tall_obstacle_half_extents: Vec3,
    pub coin_half_extents: Vec3,
}

impl Default for GeometryTuning {
    fn default() -> Self {
        Self {
            player_half_extents: Vec3::new(0.3, 0.5, 0.3),
            low_obstacle_half_extents: Vec3::new(0.2, 0.2, 0.2),
            tall_obstacle_half_extents: Vec3::new(0.2, 1.5, 0.2),
            coin_half_extents: Vec3::new(0.25, 0.25, 0.25),
        }
    }
}

/// Score-driven speed ramp
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionTuning {
    pub speed_inc_per_point: f32,
}

impl Default for ProgressionTuning {
    fn default() -> Self {
        Self {
            speed_inc_per_point: Difficulty::Amateur.speed_inc_per_point(),
        }
    }
}

/// Complete tuning set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub locomotion: LocomotionTuning,
    pub placement: PlacementTuning,
    pub track: TrackTuning,
    pub geometry: GeometryTuning,
    pub progression: ProgressionTuning,
}

impl Tuning {
    /// Parse and validate tuning from JSON (missing fields take defaults)
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Apply a difficulty preset's speed ramp
    pub fn with_difficulty(mut self, difficulty: Difficulty) -> Self {
        self.progression.speed_inc_per_point = difficulty.speed_inc_per_point();
        self
    }

    pub fn validate(&self) -> Result<(), TuningError> {
        self.locomotion.validate()?;

        let p = &self.placement;
        ensure_range("placement.tall_obstacle_chance", p.tall_obstacle_chance, 0.0, 1.0)?;
        if p.coins_min > p.coins_max {
            return Err(TuningError::CoinRange {
                min: p.coins_min,
                max: p.coins_max,
            });
        }

        let t = &self.track;
        ensure_min("track.tile_length", t.tile_length, f32::EPSILON)?;
        ensure_min("track.retire_delay_secs", t.retire_delay_secs, 0.0)?;

        // Zero slots means "no obstacles"; anything in between risks a sealed tile
        let slots = t.obstacle_slots.len();
        let required = min_passable_slots(p.tall_obstacle_chance);
        if slots > 0 && slots < required {
            return Err(TuningError::Unpassable { slots, required });
        }

        ensure_min(
            "progression.speed_inc_per_point",
            self.progression.speed_inc_per_point,
            0.0,
        )?;
        Ok(())
    }
}

fn ensure_min(field: &'static str, value: f32, min: f32) -> Result<(), TuningError> {
    // Written negated so NaN fails too
    if !(value >= min) {
        return Err(TuningError::MinViolation { field, min, value });
    }
    Ok(())
}

fn ensure_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), TuningError> {
    if !(value >= min && value <= max) {
        return Err(TuningError::RangeViolation {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}
