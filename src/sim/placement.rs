//! Procedural tile content
//!
//! Decides which obstacles and coins a freshly spawned tile gets and which
//! lane slots they occupy. Obstacle and coin slots are separate sets, each
//! planned against its own occupancy mask that lives only for one call.
//!
//! Tall obstacles reserve the slots on either side of them. That reservation
//! is what keeps a tile passable: later placements can only land on slots
//! nobody has claimed yet.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Obstacle variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    /// Low barrier, primary variant
    LowA,
    /// Low barrier, secondary variant
    LowB,
    /// Tall wall that cannot be jumped
    Tall,
}

impl ObstacleKind {
    /// Whether placing this kind also reserves its neighbouring slots
    pub fn reserves_neighbors(&self) -> bool {
        matches!(self, ObstacleKind::Tall)
    }

    /// Whether a jump can clear this obstacle
    pub fn is_low(&self) -> bool {
        !matches!(self, ObstacleKind::Tall)
    }
}

/// Which placement attempt produced an obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlacementRole {
    Primary,
    Secondary,
    Tertiary,
}

/// One planned obstacle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObstaclePlacement {
    pub slot: usize,
    pub kind: ObstacleKind,
    pub role: PlacementRole,
}

/// Result of planning one tile's obstacles
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ObstaclePlan {
    /// Placements in the order they were decided
    pub placements: Vec<ObstaclePlacement>,
    /// Slots left unreserved once planning finished
    pub free_slots: Vec<usize>,
}

impl ObstaclePlan {
    /// At least one lane was left open
    pub fn is_passable(&self) -> bool {
        !self.free_slots.is_empty()
    }
}

/// Per-call slot reservations
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancyMask {
    occupied: Vec<bool>,
}

impl OccupancyMask {
    /// All slots free
    pub fn new(slot_count: usize) -> Self {
        Self {
            occupied: vec![false; slot_count],
        }
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn is_occupied(&self, slot: usize) -> bool {
        self.occupied.get(slot).copied().unwrap_or(true)
    }

    pub fn as_slice(&self) -> &[bool] {
        &self.occupied
    }

    /// Mark a single slot. Out-of-range indices are ignored.
    pub fn occupy(&mut self, slot: usize) {
        if let Some(cell) = self.occupied.get_mut(slot) {
            *cell = true;
        }
    }

    /// Mark a slot and its immediate left/right neighbours (clamped at the edges)
    pub fn occupy_with_neighbors(&mut self, slot: usize) {
        self.occupy(slot);
        if let Some(left) = slot.checked_sub(1) {
            self.occupy(left);
        }
        self.occupy(slot + 1);
    }

    /// Reserve the footprint of an obstacle kind
    pub fn reserve(&mut self, slot: usize, kind: ObstacleKind) {
        if kind.reserves_neighbors() {
            self.occupy_with_neighbors(slot);
        } else {
            self.occupy(slot);
        }
    }

    pub fn free_slots(&self) -> Vec<usize> {
        free_indices(&self.occupied)
    }

    /// Uniformly random free slot
    pub fn pick<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<usize> {
        pick_unoccupied(&self.occupied, rng)
    }
}

fn free_indices(occupied: &[bool]) -> Vec<usize> {
    occupied
        .iter()
        .enumerate()
        .filter(|(_, taken)| !**taken)
        .map(|(i, _)| i)
        .collect()
}

/// Pick an index whose mask entry is `false`, uniformly among the candidates.
///
/// Returns `None` when every entry is occupied (including an empty mask).
/// The mask is never modified.
pub fn pick_unoccupied<R: Rng + ?Sized>(occupied: &[bool], rng: &mut R) -> Option<usize> {
    let candidates = free_indices(occupied);
    if candidates.is_empty() {
        return None;
    }
    Some(candidates[rng.random_range(0..candidates.len())])
}

/// Smallest obstacle slot count that always leaves a free lane.
///
/// Worst case the primary Tall reserves 3 slots, the secondary 1 and the
/// tertiary Tall another 3. Without a Tall primary the worst case is 1 + 1 + 3.
pub fn min_passable_slots(tall_chance: f32) -> usize {
    if tall_chance > 0.0 { 8 } else { 6 }
}

/// Plan up to three obstacles for a tile with `slot_count` lanes.
///
/// 1. Primary: Tall with probability `tall_chance`, else LowA, on any slot.
/// 2. Secondary: LowB on a free slot, if any.
/// 3. Tertiary: Tall on a free slot, if any.
pub fn plan_obstacles<R: Rng + ?Sized>(
    slot_count: usize,
    tall_chance: f32,
    rng: &mut R,
) -> ObstaclePlan {
    if slot_count == 0 {
        log::warn!("No obstacle slots configured; tile gets no obstacles");
        return ObstaclePlan::default();
    }

    let mut mask = OccupancyMask::new(slot_count);
    let mut placements = Vec::with_capacity(3);

    let primary_kind = if rng.random::<f32>() < tall_chance {
        ObstacleKind::Tall
    } else {
        ObstacleKind::LowA
    };
    // First placement ignores occupancy, there is none yet
    let primary_slot = rng.random_range(0..slot_count);
    mask.reserve(primary_slot, primary_kind);
    placements.push(ObstaclePlacement {
        slot: primary_slot,
        kind: primary_kind,
        role: PlacementRole::Primary,
    });

    for (kind, role) in [
        (ObstacleKind::LowB, PlacementRole::Secondary),
        (ObstacleKind::Tall, PlacementRole::Tertiary),
    ] {
        // A full tile just means less content
        let Some(slot) = mask.pick(rng) else {
            continue;
        };
        mask.reserve(slot, kind);
        placements.push(ObstaclePlacement { slot, kind, role });
    }

    ObstaclePlan {
        placements,
        free_slots: mask.free_slots(),
    }
}

/// Plan coin slots for a tile: draw a count in `coins_min..=coins_max`,
/// clamp it to `slot_count`, then pick that many distinct slots.
pub fn plan_coins<R: Rng + ?Sized>(
    slot_count: usize,
    coins_min: u32,
    coins_max: u32,
    rng: &mut R,
) -> Vec<usize> {
    if slot_count == 0 {
        log::warn!("No coin slots configured; tile gets no coins");
        return Vec::new();
    }

    let (lo, hi) = if coins_min <= coins_max {
        (coins_min, coins_max)
    } else {
        (coins_max, coins_min)
    };
    let target = (rng.random_range(lo..=hi) as usize).min(slot_count);

    let mut mask = OccupancyMask::new(slot_count);
    let mut slots = Vec::with_capacity(target);
    while slots.len() < target {
        let Some(slot) = mask.pick(rng) else {
            break;
        };
        mask.occupy(slot);
        slots.push(slot);
    }
    slots
}
