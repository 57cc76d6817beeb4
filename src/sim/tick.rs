//! Fixed timestep simulation tick
//!
//! Core game loop that advances a run deterministically: input, player
//! physics, tile stream, then contacts.

use super::collision::{Aabb, CollisionOracle, Contact, TrackCollider};
use super::locomotion::{MotionPhase, SwerveInput};
use super::state::{RunEvent, RunState};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Swipe samples received since the last tick, oldest first
    pub swerves: Vec<SwerveInput>,
    /// Pause toggle
    pub pause: bool,
    /// Retry after death
    pub restart: bool,
}

/// Advance the run by one fixed timestep, colliding against its own track
pub fn tick(state: &mut RunState, input: &TickInput, dt: f32) -> Vec<RunEvent> {
    let mut events = Vec::new();
    let Some(body) = advance(state, input, dt, &mut events) else {
        return events;
    };
    let contacts = TrackCollider::new(&mut state.stream, &state.tuning.geometry).contacts(&body);
    resolve_contacts(state, &contacts, &mut events);
    events
}

/// Same as [`tick`] but contacts come from `oracle`
pub fn tick_with(
    state: &mut RunState,
    input: &TickInput,
    dt: f32,
    oracle: &mut dyn CollisionOracle,
) -> Vec<RunEvent> {
    let mut events = Vec::new();
    let Some(body) = advance(state, input, dt, &mut events) else {
        return events;
    };
    let contacts = oracle.contacts(&body);
    resolve_contacts(state, &contacts, &mut events);
    events
}

/// Everything up to collision. Returns the player's box if the player moved.
fn advance(
    state: &mut RunState,
    input: &TickInput,
    dt: f32,
    events: &mut Vec<RunEvent>,
) -> Option<Aabb> {
    // Handle pause toggle
    if input.pause {
        match state.phase() {
            MotionPhase::Alive => {
                state.player.pause();
                events.push(RunEvent::Paused);
            }
            MotionPhase::Paused => {
                state.player.resume();
                events.push(RunEvent::Resumed);
            }
            MotionPhase::Dead => {}
        }
    }

    if input.restart && state.phase() == MotionPhase::Dead {
        state.restart();
        events.push(RunEvent::Restarted);
    }

    // Don't tick if paused or dead; their input is dropped
    if state.phase() != MotionPhase::Alive {
        return None;
    }

    for swerve in &input.swerves {
        state.player.push_swerve(*swerve);
    }
    let report = state.player.tick(dt);
    if report.launches > 0 {
        events.push(RunEvent::Jumped);
    }
    state.time_ticks += 1;

    let stream = state
        .stream
        .update(state.player.position().z, dt, &mut state.rng);
    events.extend(stream.exited.into_iter().map(|tile| RunEvent::TileExited { tile }));
    events.extend(stream.spawned.into_iter().map(|tile| RunEvent::TileSpawned { tile }));
    events.extend(stream.retired.into_iter().map(|tile| RunEvent::TileRetired { tile }));

    Some(TrackCollider::player_box(
        &state.tuning.geometry,
        state.player.position(),
    ))
}

fn resolve_contacts(state: &mut RunState, contacts: &[Contact], events: &mut Vec<RunEvent>) {
    for contact in contacts {
        if !state.player.is_alive() {
            break;
        }
        match *contact {
            Contact::Coin { .. } => {
                let outcome = state.progression.increment_score();
                state.player.increase_speed(outcome.speed_gain);
                events.push(RunEvent::PointCollected {
                    score: outcome.score,
                });
                if outcome.new_high_score {
                    events.push(RunEvent::NewHighScore {
                        score: outcome.score,
                    });
                }
            }
            Contact::Obstacle { kind, .. } => {
                if state.player.die() {
                    log::info!(
                        "Player died at {:.1} m with score {}",
                        state.distance(),
                        state.progression.score()
                    );
                    events.push(RunEvent::Died {
                        score: state.progression.score(),
                        distance: state.distance(),
                        obstacle: kind,
                    });
                }
            }
        }
    }
}
