//! Third-person follow camera
//!
//! Keeps a fixed forward offset and height, and follows only a fraction of
//! the player's lateral movement so swerving does not whip the view around.

use glam::Vec3;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FollowCamera {
    /// 0 = ignore lateral movement, 1 = track it exactly
    pub x_follow_factor: f32,
    initial_camera_x: f32,
    initial_player_x: f32,
    offset_z: f32,
    fixed_y: f32,
}

impl FollowCamera {
    pub const DEFAULT_FOLLOW_FACTOR: f32 = 0.4;

    /// Capture the offsets between the starting camera and player positions
    pub fn new(camera: Vec3, player: Vec3, x_follow_factor: f32) -> Self {
        Self {
            x_follow_factor: x_follow_factor.clamp(0.0, 1.0),
            initial_camera_x: camera.x,
            initial_player_x: player.x,
            offset_z: camera.z - player.z,
            fixed_y: camera.y,
        }
    }

    /// Camera position for the current player position
    pub fn follow(&self, player: Vec3) -> Vec3 {
        let delta_x = player.x - self.initial_player_x;
        Vec3::new(
            self.initial_camera_x + delta_x * self.x_follow_factor,
            self.fixed_y,
            player.z + self.offset_z,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_follow_damps_lateral_motion() {
        let cam = FollowCamera::new(
            Vec3::new(0.0, 4.0, -6.0),
            Vec3::ZERO,
            FollowCamera::DEFAULT_FOLLOW_FACTOR,
        );
        let pos = cam.follow(Vec3::new(2.0, 1.0, 30.0));
        assert!((pos.x - 0.8).abs() < 1e-6);
        assert_eq!(pos.y, 4.0);
        assert_eq!(pos.z, 24.0);
    }

    #[test]
    fn test_follow_factor_is_clamped() {
        let cam = FollowCamera::new(Vec3::ZERO, Vec3::ZERO, 3.0);
        assert_eq!(cam.x_follow_factor, 1.0);
        assert_eq!(cam.follow(Vec3::new(-1.5, 0.0, 0.0)).x, -1.5);
    }
}
