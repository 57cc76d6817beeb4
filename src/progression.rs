//! Score and speed ramp
//!
//! Counts collected points, tracks the best run, and tells the caller how
//! much forward speed each point is worth. The high score is persisted
//! through a [`Store`].

use serde::{Deserialize, Serialize};

use crate::persistence::{self, PersistenceError, Store};

/// Result of collecting one point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointOutcome {
    pub score: u64,
    /// Speed to add to the player
    pub speed_gain: f32,
    /// This point set a new best
    pub new_high_score: bool,
}

/// Persisted part of the progression
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScore {
    pub score: u64,
}

/// Score counter with high score tracking
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Progression {
    score: u64,
    high_score: u64,
    speed_inc_per_point: f32,
}

impl Progression {
    /// Store key
    pub const STORAGE_KEY: &'static str = "high_score";

    pub fn new(speed_inc_per_point: f32, high_score: u64) -> Self {
        Self {
            score: 0,
            high_score,
            speed_inc_per_point,
        }
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn speed_inc_per_point(&self) -> f32 {
        self.speed_inc_per_point
    }

    /// Count a collected point
    pub fn increment_score(&mut self) -> PointOutcome {
        self.score += 1;
        let new_high_score = self.score > self.high_score;
        if new_high_score {
            self.high_score = self.score;
        }
        PointOutcome {
            score: self.score,
            speed_gain: self.speed_inc_per_point,
            new_high_score,
        }
    }

    /// Back to zero for a retry; the high score stays
    pub fn reset_score(&mut self) {
        self.score = 0;
    }

    /// Read the saved high score (zero if nothing is stored)
    pub fn load_high_score(store: &dyn Store) -> Result<u64, PersistenceError> {
        let saved: Option<HighScore> = persistence::load_json(store, Self::STORAGE_KEY)?;
        Ok(saved.map(|h| h.score).unwrap_or(0))
    }

    pub fn save_high_score(&self, store: &mut dyn Store) -> Result<(), PersistenceError> {
        persistence::save_json(
            store,
            Self::STORAGE_KEY,
            &HighScore {
                score: self.high_score,
            },
        )?;
        log::info!("High score saved ({})", self.high_score);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;

    #[test]
    fn test_increment_reports_speed_gain() {
        let mut p = Progression::new(0.02, 0);
        let outcome = p.increment_score();
        assert_eq!(outcome.score, 1);
        assert_eq!(outcome.speed_gain, 0.02);
        assert!(outcome.new_high_score);
    }

    #[test]
    fn test_high_score_only_moves_up() {
        let mut p = Progression::new(0.01, 3);
        assert!(!p.increment_score().new_high_score);
        assert!(!p.increment_score().new_high_score);
        assert!(!p.increment_score().new_high_score);
        assert!(p.increment_score().new_high_score);
        assert_eq!(p.high_score(), 4);

        p.reset_score();
        assert_eq!(p.score(), 0);
        assert_eq!(p.high_score(), 4);
    }

    #[test]
    fn test_high_score_round_trips_through_store() {
        let mut store = MemoryStore::default();
        assert_eq!(Progression::load_high_score(&store).unwrap(), 0);

        let mut p = Progression::new(0.01, 0);
        for _ in 0..7 {
            p.increment_score();
        }
        p.save_high_score(&mut store).unwrap();
        assert_eq!(Progression::load_high_score(&store).unwrap(), 7);
    }
}
