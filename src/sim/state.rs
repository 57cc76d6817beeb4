//! Run state
//!
//! The composition root for one play session: tile stream, player,
//! progression and the run's RNG, wired together explicitly at startup.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::locomotion::{Locomotion, MotionPhase, SetupError};
use super::oracle::{FlatGround, GroundOracle};
use super::placement::ObstacleKind;
use super::tile::TileStream;
use crate::progression::Progression;
use crate::tuning::Tuning;

/// Things that happened during a tick, in order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum RunEvent {
    TileSpawned { tile: u32 },
    /// The player ran off the far edge of a tile
    TileExited { tile: u32 },
    TileRetired { tile: u32 },
    Jumped,
    PointCollected { score: u64 },
    NewHighScore { score: u64 },
    /// Fired once per life
    Died {
        score: u64,
        distance: f32,
        obstacle: ObstacleKind,
    },
    Paused,
    Resumed,
    Restarted,
}

/// One play session
#[derive(Debug)]
pub struct RunState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub stream: TileStream,
    pub player: Locomotion,
    pub progression: Progression,
    /// Simulation tick counter (only advances while alive)
    pub time_ticks: u64,
    pub(crate) rng: Pcg32,
}

impl RunState {
    /// New run on flat ground
    pub fn new(seed: u64, tuning: Tuning, high_score: u64) -> Result<Self, SetupError> {
        Self::with_ground(seed, tuning, high_score, FlatGround::default())
    }

    /// New run with a custom ground oracle
    pub fn with_ground(
        seed: u64,
        tuning: Tuning,
        high_score: u64,
        ground: impl GroundOracle + 'static,
    ) -> Result<Self, SetupError> {
        tuning.validate()?;

        let player = Locomotion::builder(tuning.locomotion.clone())
            .ground(ground)
            .build()?;
        let progression = Progression::new(tuning.progression.speed_inc_per_point, high_score);

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut stream = TileStream::new(tuning.track.clone(), tuning.placement.clone());
        stream.reset(&mut rng);

        log::info!("Run started with seed {}", seed);
        Ok(Self {
            seed,
            tuning,
            stream,
            player,
            progression,
            time_ticks: 0,
            rng,
        })
    }

    pub fn phase(&self) -> MotionPhase {
        self.player.phase()
    }

    /// Distance travelled from the start
    pub fn distance(&self) -> f32 {
        self.player.position().z - self.player.baseline().position.z
    }

    /// Retry: player back to the start, score to zero, fresh track
    pub fn restart(&mut self) {
        self.player.reset_to_start();
        self.progression.reset_score();
        self.stream.reset(&mut self.rng);
        self.time_ticks = 0;
        log::info!("Run restarted (high score {})", self.progression.high_score());
    }
}
