//! Collision detection against tile content
//!
//! Everything is an axis-aligned box: the player, obstacles and coins. The
//! simulation only sees [`Contact`]s through the [`CollisionOracle`] trait,
//! so tests can script collisions without any geometry.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::placement::ObstacleKind;
use super::tile::TileStream;
use crate::tuning::GeometryTuning;

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn from_center(center: Vec3, half_extents: Vec3) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    /// Box standing on `base` (bottom face centred on it)
    pub fn from_base(base: Vec3, half_extents: Vec3) -> Self {
        Self::from_center(base + Vec3::Y * half_extents.y, half_extents)
    }

    /// Overlap test; touching faces do not count
    #[inline]
    pub fn intersects(&self, other: &Aabb) -> bool {
        self.min.cmplt(other.max).all() && other.min.cmplt(self.max).all()
    }
}

/// Something the player ran into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Contact {
    Obstacle { tile: u32, kind: ObstacleKind },
    /// Reported once; the coin is consumed
    Coin { tile: u32, slot: usize },
}

/// Source of contacts for the player's body
pub trait CollisionOracle {
    fn contacts(&mut self, body: &Aabb) -> Vec<Contact>;
}

/// Collision oracle over the spawned track
pub struct TrackCollider<'a> {
    pub stream: &'a mut TileStream,
    pub geometry: &'a GeometryTuning,
}

impl<'a> TrackCollider<'a> {
    pub fn new(stream: &'a mut TileStream, geometry: &'a GeometryTuning) -> Self {
        Self { stream, geometry }
    }

    /// Box for the player standing at `feet`
    pub fn player_box(geometry: &GeometryTuning, feet: Vec3) -> Aabb {
        Aabb::from_base(feet, geometry.player_half_extents)
    }

    fn obstacle_half_extents(&self, kind: ObstacleKind) -> Vec3 {
        if kind.is_low() {
            self.geometry.low_obstacle_half_extents
        } else {
            self.geometry.tall_obstacle_half_extents
        }
    }
}

impl CollisionOracle for TrackCollider<'_> {
    fn contacts(&mut self, body: &Aabb) -> Vec<Contact> {
        let mut contacts = Vec::new();
        let coin_half = self.geometry.coin_half_extents;

        // Coins first so a pickup on the fatal tick still counts
        for tile in self.stream.tiles_mut() {
            let tile_id = tile.id;
            for coin in tile.coins_mut().iter_mut().filter(|c| !c.collected) {
                if Aabb::from_center(coin.position, coin_half).intersects(body) {
                    coin.collected = true;
                    contacts.push(Contact::Coin {
                        tile: tile_id,
                        slot: coin.slot,
                    });
                }
            }
        }

        for tile in self.stream.tiles() {
            for obstacle in tile.obstacles() {
                let bounds =
                    Aabb::from_base(obstacle.position, self.obstacle_half_extents(obstacle.kind));
                if bounds.intersects(body) {
                    contacts.push(Contact::Obstacle {
                        tile: tile.id,
                        kind: obstacle.kind,
                    });
                }
            }
        }

        contacts
    }
}

/// Scripted contacts, one batch per call
#[cfg(test)]
#[derive(Debug, Clone, Default)]
pub struct ScriptedCollisions {
    pub batches: std::collections::VecDeque<Vec<Contact>>,
}

#[cfg(test)]
impl CollisionOracle for ScriptedCollisions {
    fn contacts(&mut self, _body: &Aabb) -> Vec<Contact> {
        self.batches.pop_front().unwrap_or_default()
    }
}
