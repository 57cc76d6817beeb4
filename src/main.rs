//! Swerve Runner entry point
//!
//! Headless native driver: runs the fixed-step loop with a simple autopilot
//! standing in for the player's swipes, retries on death, and persists the
//! high score and settings.

use std::path::PathBuf;
use std::process::ExitCode;

use glam::Vec3;

use swerve_runner::camera::FollowCamera;
use swerve_runner::consts::*;
use swerve_runner::persistence::{FileStore, MemoryStore, Store};
use swerve_runner::sim::{MotionPhase, RunEvent, RunState, SwerveInput, TickInput, tick};
use swerve_runner::{Difficulty, Progression, Settings, Tuning};

const USAGE: &str = "usage: swerve-runner [--seed N] [--secs S] [--tuning FILE] \
                     [--difficulty novice|amateur|experienced] [--data-dir DIR]";

/// Simulated display refresh
const FRAME_DT: f32 = 1.0 / 60.0;
/// How far ahead the autopilot looks for obstacles (m)
const LOOKAHEAD: f32 = 6.0;
/// Most lateral distance the autopilot asks for in one frame (m)
const MAX_STEER_PER_FRAME: f32 = 0.15;

struct Options {
    seed: u64,
    secs: f32,
    tuning: Option<PathBuf>,
    difficulty: Option<Difficulty>,
    data_dir: Option<PathBuf>,
}

fn parse_args() -> Result<Options, String> {
    let mut opts = Options {
        seed: 0x5eed,
        secs: 60.0,
        tuning: None,
        difficulty: None,
        data_dir: None,
    };

    let mut args = std::env::args().skip(1);
    while let Some(flag) = args.next() {
        let mut value = || args.next().ok_or_else(|| format!("{flag} needs a value"));
        match flag.as_str() {
            "--seed" => {
                opts.seed = value()?.parse().map_err(|e| format!("bad --seed: {e}"))?;
            }
            "--secs" => {
                opts.secs = value()?.parse().map_err(|e| format!("bad --secs: {e}"))?;
            }
            "--tuning" => opts.tuning = Some(PathBuf::from(value()?)),
            "--difficulty" => {
                let name = value()?;
                opts.difficulty = Some(
                    Difficulty::from_str(&name).ok_or_else(|| format!("unknown difficulty {name}"))?,
                );
            }
            "--data-dir" => opts.data_dir = Some(PathBuf::from(value()?)),
            "-h" | "--help" => return Err(String::new()),
            other => return Err(format!("unknown argument {other}")),
        }
    }
    Ok(opts)
}

/// Steer toward the nearest lane with nothing in it; hop low obstacles that
/// cannot be dodged in time.
fn autopilot(state: &RunState) -> Option<SwerveInput> {
    let locomotion = state.player.tuning();
    if locomotion.swerve_sensitivity <= 0.0 {
        return None;
    }

    let pos = state.player.position();
    let geometry = &state.tuning.geometry;
    let clearance = geometry.player_half_extents.x + geometry.tall_obstacle_half_extents.x + 0.05;

    let ahead: Vec<_> = state
        .stream
        .tiles()
        .flat_map(|t| t.obstacles().iter())
        .filter(|o| o.position.z + 0.5 > pos.z && o.position.z < pos.z + LOOKAHEAD)
        .collect();
    let blocking = |x: f32| {
        ahead
            .iter()
            .filter(|o| (o.position.x - x).abs() < clearance)
            .min_by(|a, b| a.position.z.total_cmp(&b.position.z))
    };

    let max = locomotion.max_lateral;
    let target = state
        .tuning
        .track
        .obstacle_slots
        .iter()
        .map(|s| s.x.clamp(-max, max))
        .chain([pos.x])
        .filter(|&x| blocking(x).is_none())
        .min_by(|a, b| (a - pos.x).abs().total_cmp(&(b - pos.x).abs()))
        .unwrap_or(pos.x);

    let steer = (target - pos.x).clamp(-MAX_STEER_PER_FRAME, MAX_STEER_PER_FRAME);
    let jump = blocking(pos.x)
        .is_some_and(|o| o.kind.is_low() && o.position.z - pos.z < 1.2 && steer.abs() < 0.01);

    let dy = if jump {
        locomotion.jump_delta_threshold * 2.0 + 0.01
    } else {
        0.0
    };
    if steer == 0.0 && dy == 0.0 {
        return None;
    }
    Some(SwerveInput::new(steer / locomotion.swerve_sensitivity, dy))
}

fn run(opts: Options) -> Result<(), Box<dyn std::error::Error>> {
    let mut store: Box<dyn Store> = match &opts.data_dir {
        Some(dir) => Box::new(FileStore::open(dir)?),
        None => Box::new(MemoryStore::default()),
    };

    let mut settings = Settings::load(&*store);
    if let Some(difficulty) = opts.difficulty {
        settings.difficulty = Some(difficulty);
        if let Err(e) = settings.save(&mut *store) {
            log::error!("Failed to save settings: {}", e);
        }
    }

    let tuning = match &opts.tuning {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let tuning = settings.apply(tuning);

    let high_score = Progression::load_high_score(&*store).unwrap_or_else(|e| {
        log::warn!("Ignoring unreadable high score: {}", e);
        0
    });

    log::info!(
        "Swerve Runner (headless) starting: seed {}, {} difficulty, {:.0}s",
        opts.seed,
        settings.difficulty_name(),
        opts.secs
    );
    let mut state = RunState::new(opts.seed, tuning, high_score)?;
    let camera = FollowCamera::new(
        Vec3::new(0.0, 4.0, -6.0),
        state.player.position(),
        FollowCamera::DEFAULT_FOLLOW_FACTOR,
    );

    let mut input = TickInput::default();
    let mut accumulator = 0.0;
    let mut elapsed = 0.0;
    let mut deaths = 0u32;
    let mut best_distance = 0.0f32;

    while elapsed < opts.secs {
        elapsed += FRAME_DT;
        accumulator += FRAME_DT;

        if state.phase() == MotionPhase::Alive {
            input.swerves.extend(autopilot(&state));
        }

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            for event in tick(&mut state, &input, SIM_DT) {
                match event {
                    RunEvent::Died { score, distance, obstacle } => {
                        deaths += 1;
                        best_distance = best_distance.max(distance);
                        log::info!(
                            "Run {} over: {:.1} m, score {}, hit {:?}",
                            deaths,
                            distance,
                            score,
                            obstacle
                        );
                        if let Err(e) = state.progression.save_high_score(&mut *store) {
                            log::error!("Failed to save high score: {}", e);
                        }
                    }
                    RunEvent::NewHighScore { score } => log::debug!("New high score {}", score),
                    other => log::trace!("{:?}", other),
                }
            }
            accumulator -= SIM_DT;
            substeps += 1;

            // Clear one-shot inputs after processing
            input.swerves.clear();
            input.restart = false;
        }

        if state.phase() == MotionPhase::Dead {
            input.restart = true;
        }

        let view = camera.follow(state.player.position());
        log::trace!("Camera at ({:.2}, {:.2}, {:.2})", view.x, view.y, view.z);
    }

    best_distance = best_distance.max(state.distance());
    if let Err(e) = state.progression.save_high_score(&mut *store) {
        log::error!("Failed to save high score: {}", e);
    }

    println!(
        "{:.0}s simulated: {} deaths, best distance {:.1} m, high score {}",
        elapsed,
        deaths,
        best_distance,
        state.progression.high_score()
    );
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let opts = match parse_args() {
        Ok(opts) => opts,
        Err(msg) => {
            if !msg.is_empty() {
                eprintln!("{msg}");
            }
            eprintln!("{USAGE}");
            return ExitCode::FAILURE;
        }
    };

    match run(opts) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
