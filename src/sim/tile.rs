//! Track tiles and the stream that keeps them coming
//!
//! A tile is one forward segment of track with its own obstacle and coin
//! slot sets. It is populated once, fires its exit trigger once when the
//! player leaves it, and is removed a short grace period later.

use std::collections::VecDeque;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::placement::{ObstacleKind, PlacementRole, plan_coins, plan_obstacles};
use crate::tuning::{PlacementTuning, TrackTuning};

/// A spawned obstacle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub kind: ObstacleKind,
    pub role: PlacementRole,
    pub slot: usize,
    /// World position of the obstacle's base
    pub position: Vec3,
}

/// A spawned coin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub slot: usize,
    /// World position of the coin's centre
    pub position: Vec3,
    pub collected: bool,
}

/// One segment of track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tile {
    pub id: u32,
    /// Rear edge of the tile, centred on the track
    pub origin: Vec3,
    pub length: f32,
    /// World positions of the obstacle lane points
    obstacle_slots: Vec<Vec3>,
    /// World positions of the coin points
    coin_slots: Vec<Vec3>,
    obstacles: Vec<Obstacle>,
    coins: Vec<Coin>,
    obstacles_planned: bool,
    coins_planned: bool,
    exited: bool,
}

impl Tile {
    pub fn new(id: u32, origin: Vec3, track: &TrackTuning) -> Self {
        Self {
            id,
            origin,
            length: track.tile_length,
            obstacle_slots: track.obstacle_slots.iter().map(|s| origin + *s).collect(),
            coin_slots: track.coin_slots.iter().map(|s| origin + *s).collect(),
            obstacles: Vec::new(),
            coins: Vec::new(),
            obstacles_planned: false,
            coins_planned: false,
            exited: false,
        }
    }

    pub fn end_z(&self) -> f32 {
        self.origin.z + self.length
    }

    pub fn contains_z(&self, z: f32) -> bool {
        z >= self.origin.z && z < self.end_z()
    }

    pub fn obstacle_slots(&self) -> &[Vec3] {
        &self.obstacle_slots
    }

    pub fn coin_slots(&self) -> &[Vec3] {
        &self.coin_slots
    }

    pub fn obstacles(&self) -> &[Obstacle] {
        &self.obstacles
    }

    pub fn coins(&self) -> &[Coin] {
        &self.coins
    }

    pub(crate) fn coins_mut(&mut self) -> &mut [Coin] {
        &mut self.coins
    }

    pub fn has_exited(&self) -> bool {
        self.exited
    }

    /// Plan and instantiate obstacles. Only the first call does anything.
    pub fn spawn_obstacles<R: Rng + ?Sized>(&mut self, tall_chance: f32, rng: &mut R) -> usize {
        if self.obstacles_planned {
            log::warn!("Tile {} already has obstacles", self.id);
            return 0;
        }
        self.obstacles_planned = true;

        let plan = plan_obstacles(self.obstacle_slots.len(), tall_chance, rng);
        self.obstacles = plan
            .placements
            .iter()
            .map(|p| Obstacle {
                kind: p.kind,
                role: p.role,
                slot: p.slot,
                position: self.obstacle_slots[p.slot],
            })
            .collect();
        self.obstacles.len()
    }

    /// Plan and instantiate coins. Only the first call does anything.
    pub fn spawn_coins<R: Rng + ?Sized>(
        &mut self,
        placement: &PlacementTuning,
        rng: &mut R,
    ) -> usize {
        if self.coins_planned {
            log::warn!("Tile {} already has coins", self.id);
            return 0;
        }
        self.coins_planned = true;

        let slots = plan_coins(
            self.coin_slots.len(),
            placement.coins_min,
            placement.coins_max,
            rng,
        );
        self.coins = slots
            .into_iter()
            .map(|slot| Coin {
                slot,
                position: self.coin_slots[slot],
                collected: false,
            })
            .collect();
        self.coins.len()
    }

    /// Obstacles first, then coins
    pub fn populate<R: Rng + ?Sized>(&mut self, placement: &PlacementTuning, rng: &mut R) {
        self.spawn_obstacles(placement.tall_obstacle_chance, rng);
        self.spawn_coins(placement, rng);
    }

    /// Exit trigger: true exactly once, when the player first passes the far edge
    pub fn check_exit(&mut self, player_z: f32) -> bool {
        if self.exited || player_z < self.end_z() {
            return false;
        }
        self.exited = true;
        true
    }
}

/// What a stream update changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamReport {
    pub spawned: Vec<u32>,
    pub exited: Vec<u32>,
    pub retired: Vec<u32>,
}

/// A tile waiting out its grace period
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct Retirement {
    tile_id: u32,
    remaining: f32,
}

/// Appends tiles ahead of the player and retires the ones behind
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TileStream {
    track: TrackTuning,
    placement: PlacementTuning,
    /// Ordered rear to front
    tiles: VecDeque<Tile>,
    retiring: Vec<Retirement>,
    next_id: u32,
    next_origin_z: f32,
}

impl TileStream {
    /// Empty stream; call [`TileStream::reset`] to lay down the opening tiles
    pub fn new(track: TrackTuning, placement: PlacementTuning) -> Self {
        Self {
            track,
            placement,
            tiles: VecDeque::new(),
            retiring: Vec::new(),
            next_id: 1,
            next_origin_z: 0.0,
        }
    }

    /// Drop every tile and lay out the opening stretch again
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.tiles.clear();
        self.retiring.clear();
        self.next_origin_z = 0.0;

        for i in 0..self.track.initial_tiles {
            self.spawn_tile(i >= self.track.safe_start_tiles, rng);
        }
        log::info!(
            "Tile stream reset: {} tiles, {} without content",
            self.tiles.len(),
            self.track.safe_start_tiles.min(self.track.initial_tiles)
        );
    }

    /// Append a tile at the leading edge, optionally populating it
    pub fn spawn_tile<R: Rng + ?Sized>(&mut self, populate: bool, rng: &mut R) -> u32 {
        let id = self.next_id;
        self.next_id += 1;

        let origin = Vec3::new(0.0, 0.0, self.next_origin_z);
        self.next_origin_z += self.track.tile_length;

        let mut tile = Tile::new(id, origin, &self.track);
        if populate {
            tile.populate(&self.placement, rng);
        }
        log::debug!(
            "Spawned tile {} at z={:.1} ({} obstacles, {} coins)",
            id,
            origin.z,
            tile.obstacles().len(),
            tile.coins().len()
        );
        self.tiles.push_back(tile);
        id
    }

    /// Fire exit triggers, chain successors and expire grace timers
    pub fn update<R: Rng + ?Sized>(&mut self, player_z: f32, dt: f32, rng: &mut R) -> StreamReport {
        let mut report = StreamReport::default();

        // Tick timers scheduled on earlier updates
        for retirement in &mut self.retiring {
            retirement.remaining -= dt;
        }
        let (expired, waiting): (Vec<_>, Vec<_>) = std::mem::take(&mut self.retiring)
            .into_iter()
            .partition(|r| r.remaining <= 0.0);
        self.retiring = waiting;
        for retirement in expired {
            self.tiles.retain(|t| t.id != retirement.tile_id);
            log::debug!("Retired tile {}", retirement.tile_id);
            report.retired.push(retirement.tile_id);
        }

        let exited: Vec<u32> = self
            .tiles
            .iter_mut()
            .filter_map(|t| t.check_exit(player_z).then_some(t.id))
            .collect();
        for tile_id in exited {
            report.spawned.push(self.spawn_tile(true, rng));
            self.retiring.push(Retirement {
                tile_id,
                remaining: self.track.retire_delay_secs,
            });
            report.exited.push(tile_id);
        }

        report
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub(crate) fn tiles_mut(&mut self) -> impl Iterator<Item = &mut Tile> {
        self.tiles.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn tile(&self, id: u32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.id == id)
    }

    /// Tile under a forward position
    pub fn tile_at(&self, z: f32) -> Option<&Tile> {
        self.tiles.iter().find(|t| t.contains_z(z))
    }

    /// Far edge of the frontmost tile
    pub fn leading_edge(&self) -> f32 {
        self.next_origin_z
    }

    /// Tiles whose exit has fired but which are still in the world
    pub fn retiring_count(&self) -> usize {
        self.retiring.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    fn stream(seed: u64) -> (TileStream, Pcg32) {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut s = TileStream::new(TrackTuning::default(), PlacementTuning::default());
        s.reset(&mut rng);
        (s, rng)
    }

    #[test]
    fn test_populate_runs_once() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut tile = Tile::new(1, Vec3::ZERO, &TrackTuning::default());
        tile.populate(&PlacementTuning::default(), &mut rng);
        let obstacles = tile.obstacles().to_vec();
        let coins = tile.coins().to_vec();
        assert!(!obstacles.is_empty());
        assert!((1..=2).contains(&coins.len()));

        tile.populate(&PlacementTuning::default(), &mut rng);
        assert_eq!(tile.obstacles(), obstacles.as_slice());
        assert_eq!(tile.coins(), coins.as_slice());
    }

    #[test]
    fn test_instances_sit_on_slot_positions() {
        let mut rng = Pcg32::seed_from_u64(11);
        let origin = Vec3::new(0.0, 0.0, 40.0);
        let mut tile = Tile::new(3, origin, &TrackTuning::default());
        tile.populate(&PlacementTuning::default(), &mut rng);

        for o in tile.obstacles() {
            assert_eq!(o.position, tile.obstacle_slots()[o.slot]);
            assert!(tile.contains_z(o.position.z));
        }
        let slots: HashSet<_> = tile.coins().iter().map(|c| c.slot).collect();
        assert_eq!(slots.len(), tile.coins().len());
        for c in tile.coins() {
            assert_eq!(c.position, tile.coin_slots()[c.slot]);
        }
    }

    #[test]
    fn test_missing_slots_leave_tile_empty() {
        let mut rng = Pcg32::seed_from_u64(2);
        let track = TrackTuning {
            obstacle_slots: Vec::new(),
            coin_slots: Vec::new(),
            ..Default::default()
        };
        let mut tile = Tile::new(1, Vec3::ZERO, &track);
        tile.populate(&PlacementTuning::default(), &mut rng);
        assert!(tile.obstacles().is_empty());
        assert!(tile.coins().is_empty());
    }

    #[test]
    fn test_exit_trigger_fires_once() {
        let mut tile = Tile::new(1, Vec3::ZERO, &TrackTuning::default());
        assert!(!tile.check_exit(9.9));
        assert!(tile.check_exit(10.0));
        assert!(!tile.check_exit(12.0));
        assert!(tile.has_exited());
    }

    #[test]
    fn test_reset_lays_out_safe_start() {
        let (s, _) = stream(1);
        assert_eq!(s.len(), 8);
        assert_eq!(s.leading_edge(), 80.0);

        let first = s.tiles().next().unwrap();
        assert!(first.obstacles().is_empty());
        assert!(first.coins().is_empty());
        assert!(s.tiles().skip(1).all(|t| !t.obstacles().is_empty()));
        assert_eq!(s.tile_at(15.0).map(|t| t.id), Some(2));
    }

    #[test]
    fn test_exit_chains_successor_and_retires_after_grace() {
        let (mut s, mut rng) = stream(9);

        let report = s.update(5.0, 0.02, &mut rng);
        assert!(report.spawned.is_empty());

        let report = s.update(10.5, 0.02, &mut rng);
        assert_eq!(report.exited, vec![1]);
        assert_eq!(report.spawned, vec![9]);
        assert_eq!(s.len(), 9);
        assert_eq!(s.retiring_count(), 1);
        assert_eq!(s.leading_edge(), 90.0);

        // Still present inside the grace period
        let mut retired = Vec::new();
        for _ in 0..49 {
            retired.extend(s.update(10.6, 0.02, &mut rng).retired);
        }
        assert!(retired.is_empty());
        assert!(s.tile(1).is_some());

        // 1 second later it is gone
        let mut retired = Vec::new();
        for _ in 0..2 {
            retired.extend(s.update(10.6, 0.02, &mut rng).retired);
        }
        assert_eq!(retired, vec![1]);
        assert!(s.tile(1).is_none());
        assert_eq!(s.len(), 8);
    }

    #[test]
    fn test_same_seed_same_track() {
        let (a, _) = stream(77);
        let (b, _) = stream(77);
        let layout = |s: &TileStream| {
            s.tiles()
                .map(|t| (t.obstacles().to_vec(), t.coins().to_vec()))
                .collect::<Vec<_>>()
        };
        assert_eq!(layout(&a), layout(&b));
    }
}
