//! Player locomotion
//!
//! Forward motion is a scalar speed applied every fixed step. Lateral motion
//! comes only from swerve input and is clamped to the track. Vertical motion
//! is a simple ballistic integration with extra gravity while airborne, so
//! the fall is faster than the rise.
//!
//! Swerve events are queued as they arrive and drained in arrival order at
//! the next input pass. Each event is applied and clamped on its own.

use std::collections::VecDeque;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::oracle::GroundOracle;
use crate::consts::CONTACT_EPSILON;
use crate::tuning::{LocomotionTuning, TuningError};

/// Whether the player is currently simulated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MotionPhase {
    /// Moving and accepting input
    Alive,
    /// Frozen, input dropped, resumable
    Paused,
    /// Frozen until an explicit reset
    Dead,
}

/// One swipe sample: pointer delta since the previous sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SwerveInput {
    pub dx: f32,
    pub dy: f32,
}

impl SwerveInput {
    pub fn new(dx: f32, dy: f32) -> Self {
        Self { dx, dy }
    }
}

/// State restored by [`Locomotion::reset_to_start`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Baseline {
    pub position: Vec3,
    pub speed: f32,
}

/// What one input pass did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputReport {
    /// Events consumed from the queue
    pub applied: usize,
    /// Events that launched a jump
    pub launches: usize,
}

/// Errors raised while wiring up a locomotion model
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("locomotion requires a ground oracle")]
    MissingGroundOracle,
    #[error("invalid locomotion tuning: {0}")]
    InvalidTuning(#[from] TuningError),
}

/// Builder for [`Locomotion`]. The ground oracle is mandatory.
pub struct LocomotionBuilder {
    tuning: LocomotionTuning,
    start: Vec3,
    ground: Option<Box<dyn GroundOracle>>,
}

impl LocomotionBuilder {
    pub fn new(tuning: LocomotionTuning) -> Self {
        Self {
            tuning,
            start: Vec3::ZERO,
            ground: None,
        }
    }

    /// Starting position, recorded as the baseline
    pub fn start_at(mut self, position: Vec3) -> Self {
        self.start = position;
        self
    }

    pub fn ground(mut self, oracle: impl GroundOracle + 'static) -> Self {
        self.ground = Some(Box::new(oracle));
        self
    }

    pub fn build(self) -> Result<Locomotion, SetupError> {
        self.tuning.validate()?;
        let ground = self.ground.ok_or(SetupError::MissingGroundOracle)?;
        let baseline = Baseline {
            position: self.start,
            speed: self.tuning.speed,
        };
        Ok(Locomotion {
            position: baseline.position,
            velocity: Vec3::ZERO,
            speed: baseline.speed,
            phase: MotionPhase::Alive,
            baseline,
            pending: VecDeque::new(),
            ground,
            tuning: self.tuning,
        })
    }
}

/// The player's motion model
pub struct Locomotion {
    /// x lateral, y vertical (feet), z forward
    position: Vec3,
    /// Only the vertical component is integrated
    velocity: Vec3,
    speed: f32,
    phase: MotionPhase,
    baseline: Baseline,
    pending: VecDeque<SwerveInput>,
    ground: Box<dyn GroundOracle>,
    tuning: LocomotionTuning,
}

impl std::fmt::Debug for Locomotion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Locomotion")
            .field("position", &self.position)
            .field("velocity", &self.velocity)
            .field("speed", &self.speed)
            .field("phase", &self.phase)
            .field("pending", &self.pending.len())
            .finish()
    }
}

impl Locomotion {
    pub fn builder(tuning: LocomotionTuning) -> LocomotionBuilder {
        LocomotionBuilder::new(tuning)
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn phase(&self) -> MotionPhase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase == MotionPhase::Alive
    }

    pub fn baseline(&self) -> Baseline {
        self.baseline
    }

    pub fn tuning(&self) -> &LocomotionTuning {
        &self.tuning
    }

    /// Swerve events waiting for the next input pass
    pub fn pending_inputs(&self) -> usize {
        self.pending.len()
    }

    /// Short downward probe from the feet
    pub fn is_grounded(&self) -> bool {
        self.ground
            .is_grounded(self.position, self.tuning.ground_probe_distance)
    }

    /// Queue a swerve event. Dropped (returns false) unless alive.
    pub fn push_swerve(&mut self, input: SwerveInput) -> bool {
        if !self.is_alive() {
            return false;
        }
        self.pending.push_back(input);
        true
    }

    /// Drain queued swerve events in arrival order
    pub fn process_inputs(&mut self) -> InputReport {
        let mut report = InputReport::default();
        if !self.is_alive() {
            return report;
        }
        while let Some(input) = self.pending.pop_front() {
            report.applied += 1;
            if self.apply_swerve(input) {
                report.launches += 1;
            }
        }
        report
    }

    /// Returns true if the event launched a jump
    fn apply_swerve(&mut self, input: SwerveInput) -> bool {
        let launched = input.dy > self.tuning.jump_delta_threshold && self.is_grounded();
        if launched {
            self.velocity.y = self.tuning.jump_velocity;
        }

        let max = self.tuning.max_lateral;
        let x = self.position.x + input.dx * self.tuning.swerve_sensitivity;
        // Non-finite input must not poison the position
        self.position.x = if x.is_finite() {
            x.clamp(-max, max)
        } else {
            self.position.x.clamp(-max, max)
        };
        launched
    }

    /// Advance one fixed physics step
    pub fn step(&mut self, dt: f32) {
        if !self.is_alive() {
            return;
        }

        self.position.z += self.speed * dt;

        let gravity = self.tuning.gravity;
        let grounded = self.is_grounded();
        let resting = self.velocity.y <= 0.0
            && self.ground.probe_down(self.position, CONTACT_EPSILON).is_some();
        if resting {
            // Contact cancels gravity
            self.velocity.y = 0.0;
        } else {
            self.velocity.y += gravity * dt;
            if !grounded {
                self.velocity.y += gravity * (self.tuning.fall_multiplier - 1.0) * dt;
            }
        }

        let rise = self.velocity.y * dt;
        if rise < 0.0 {
            // Land instead of tunnelling through the surface
            if let Some(hit) = self.ground.probe_down(self.position, -rise) {
                self.position.y -= hit;
                self.velocity.y = 0.0;
                return;
            }
        }
        self.position.y += rise;
    }

    /// Input pass followed by a physics step
    pub fn tick(&mut self, dt: f32) -> InputReport {
        let report = self.process_inputs();
        self.step(dt);
        report
    }

    /// Add to the forward speed
    pub fn increase_speed(&mut self, amount: f32) {
        self.speed += amount;
    }

    /// Kill the player. Returns true only for the call that ended this life.
    pub fn die(&mut self) -> bool {
        if self.phase == MotionPhase::Dead {
            return false;
        }
        self.phase = MotionPhase::Dead;
        self.pending.clear();
        true
    }

    /// Freeze while alive
    pub fn pause(&mut self) -> bool {
        if self.phase != MotionPhase::Alive {
            return false;
        }
        self.phase = MotionPhase::Paused;
        self.pending.clear();
        true
    }

    pub fn resume(&mut self) -> bool {
        if self.phase != MotionPhase::Paused {
            return false;
        }
        self.phase = MotionPhase::Alive;
        true
    }

    /// Restore the baseline snapshot and come back to life
    pub fn reset_to_start(&mut self) {
        self.position = self.baseline.position;
        self.velocity = Vec3::ZERO;
        self.speed = self.baseline.speed;
        self.pending.clear();
        self.phase = MotionPhase::Alive;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::oracle::FlatGround;
    use proptest::prelude::*;

    fn player() -> Locomotion {
        Locomotion::builder(LocomotionTuning::default())
            .ground(FlatGround::default())
            .build()
            .unwrap()
    }

    fn airborne_player() -> Locomotion {
        Locomotion::builder(LocomotionTuning::default())
            .start_at(Vec3::new(0.0, 3.0, 0.0))
            .ground(|_: Vec3, _: f32| -> Option<f32> { None })
            .build()
            .unwrap()
    }

    #[test]
    fn test_missing_ground_fails_at_setup() {
        let err = Locomotion::builder(LocomotionTuning::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, SetupError::MissingGroundOracle));
    }

    #[test]
    fn test_invalid_tuning_fails_at_setup() {
        let tuning = LocomotionTuning {
            max_lateral: -1.0,
            ..Default::default()
        };
        let err = Locomotion::builder(tuning)
            .ground(FlatGround::default())
            .build()
            .unwrap_err();
        assert!(matches!(err, SetupError::InvalidTuning(_)));
    }

    #[test]
    fn test_forward_motion_per_step() {
        let mut p = player();
        for _ in 0..50 {
            p.step(SIM_DT);
        }
        // One second at 5 m/s
        assert!((p.position().z - 5.0).abs() < 1e-3);
        assert_eq!(p.position().y, 0.0);
        assert!(p.is_grounded());
    }

    #[test]
    fn test_swerve_applies_sensitivity() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(50.0, 0.0));
        let report = p.process_inputs();
        assert_eq!(report.applied, 1);
        assert!((p.position().x - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_swerve_clamps_to_track() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(1.0e6, 0.0));
        p.process_inputs();
        assert_eq!(p.position().x, 2.0);

        p.push_swerve(SwerveInput::new(-1.0e9, 0.0));
        p.process_inputs();
        assert_eq!(p.position().x, -2.0);
    }

    #[test]
    fn test_events_apply_in_order_each_clamped() {
        let mut p = player();
        // +300 clamps at 2.0, then -100 moves back to 1.0
        p.push_swerve(SwerveInput::new(300.0, 0.0));
        p.push_swerve(SwerveInput::new(-100.0, 0.0));
        assert_eq!(p.pending_inputs(), 2);
        let report = p.process_inputs();
        assert_eq!(report.applied, 2);
        assert_eq!(p.pending_inputs(), 0);
        assert!((p.position().x - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_jump_launches_when_grounded() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(0.0, 0.5));
        let report = p.process_inputs();
        assert_eq!(report.launches, 1);
        assert_eq!(p.velocity().y, 5.0);
    }

    #[test]
    fn test_small_swipe_does_not_jump() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(10.0, 0.01));
        let report = p.process_inputs();
        assert_eq!(report.launches, 0);
        assert_eq!(p.velocity().y, 0.0);
    }

    #[test]
    fn test_no_double_jump() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(0.0, 1.0));
        p.tick(SIM_DT);

        // Climb clear of the probe distance
        while p.position().y <= 0.3 {
            p.tick(SIM_DT);
        }
        assert!(!p.is_grounded());

        let vy = p.velocity().y;
        p.push_swerve(SwerveInput::new(0.0, 1.0));
        let report = p.process_inputs();
        assert_eq!(report.launches, 0);
        assert_eq!(p.velocity().y, vy);
    }

    #[test]
    fn test_airborne_swipe_never_launches() {
        let mut p = airborne_player();
        p.push_swerve(SwerveInput::new(0.0, 10.0));
        assert_eq!(p.process_inputs().launches, 0);
    }

    #[test]
    fn test_jump_arc_lands_back_on_ground() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(0.0, 1.0));
        let mut apex = 0.0f32;
        let mut left_ground = false;
        for _ in 0..200 {
            p.tick(SIM_DT);
            apex = apex.max(p.position().y);
            left_ground |= !p.is_grounded();
        }
        assert!(left_ground);
        assert!(apex > 0.3);
        assert_eq!(p.position().y, 0.0);
        assert_eq!(p.velocity().y, 0.0);
    }

    #[test]
    fn test_fall_is_faster_than_rise() {
        // Airborne body under plain gravity vs. with the fall multiplier
        let plain = LocomotionTuning {
            fall_multiplier: 1.0,
            ..Default::default()
        };
        let never = |_: Vec3, _: f32| -> Option<f32> { None };
        let mut a = Locomotion::builder(plain)
            .start_at(Vec3::new(0.0, 10.0, 0.0))
            .ground(never)
            .build()
            .unwrap();
        let mut b = airborne_player();

        a.step(SIM_DT);
        b.step(SIM_DT);
        let g = LocomotionTuning::default().gravity;
        assert!((a.velocity().y - g * SIM_DT).abs() < 1e-5);
        assert!((b.velocity().y - g * 2.5 * SIM_DT).abs() < 1e-5);
    }

    #[test]
    fn test_dead_ignores_input_and_physics() {
        let mut p = player();
        assert!(p.die());
        assert!(!p.die(), "death reported once per life");

        assert!(!p.push_swerve(SwerveInput::new(100.0, 1.0)));
        let before = p.position();
        p.tick(SIM_DT);
        assert_eq!(p.position(), before);
        assert_eq!(p.phase(), MotionPhase::Dead);
    }

    #[test]
    fn test_pause_and_resume() {
        let mut p = player();
        p.push_swerve(SwerveInput::new(100.0, 0.0));
        assert!(p.pause());
        assert_eq!(p.pending_inputs(), 0);
        p.step(SIM_DT);
        assert_eq!(p.position().z, 0.0);

        assert!(p.resume());
        p.step(SIM_DT);
        assert!(p.position().z > 0.0);
        assert!(!p.resume());
    }

    #[test]
    fn test_reset_restores_baseline() {
        let start = Vec3::new(0.5, 0.0, -3.0);
        let mut p = Locomotion::builder(LocomotionTuning::default())
            .start_at(start)
            .ground(FlatGround::default())
            .build()
            .unwrap();

        p.increase_speed(3.0);
        p.push_swerve(SwerveInput::new(120.0, 1.0));
        for _ in 0..37 {
            p.tick(SIM_DT);
        }
        p.die();

        p.reset_to_start();
        assert_eq!(p.position(), start);
        assert_eq!(p.speed(), 5.0);
        assert_eq!(p.velocity(), Vec3::ZERO);
        assert_eq!(p.phase(), MotionPhase::Alive);
        assert_eq!(p.baseline().position, start);
    }

    #[test]
    fn test_increase_speed_is_additive() {
        let mut p = player();
        p.increase_speed(0.01);
        p.increase_speed(0.01);
        assert!((p.speed() - 5.02).abs() < 1e-6);
    }

    proptest! {
        #[test]
        fn prop_lateral_offset_stays_clamped(
            deltas in prop::collection::vec((-1.0e7f32..1.0e7, -1.0f32..1.0), 0..40),
        ) {
            let mut p = player();
            for (dx, dy) in deltas {
                p.push_swerve(SwerveInput::new(dx, dy));
                p.tick(SIM_DT);
                let x = p.position().x;
                prop_assert!((-2.0..=2.0).contains(&x));
            }
        }
    }
}
