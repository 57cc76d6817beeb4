//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (tiles rear to front, placements in decision order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod locomotion;
pub mod oracle;
pub mod placement;
pub mod state;
pub mod tick;
pub mod tile;

pub use collision::{Aabb, CollisionOracle, Contact, TrackCollider};
pub use locomotion::{
    Baseline, InputReport, Locomotion, LocomotionBuilder, MotionPhase, SetupError, SwerveInput,
};
pub use oracle::{FlatGround, GroundOracle};
pub use placement::{
    ObstacleKind, ObstaclePlacement, ObstaclePlan, OccupancyMask, PlacementRole,
    min_passable_slots, pick_unoccupied, plan_coins, plan_obstacles,
};
pub use state::{RunEvent, RunState};
pub use tick::{TickInput, tick, tick_with};
pub use tile::{Coin, Obstacle, StreamReport, Tile, TileStream};
