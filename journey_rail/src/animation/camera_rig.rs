// animation/camera_rig.rs - Trailing camera that follows the rail with its own lag

use serde::Serialize;

use super::Vec3;
use crate::path::Curve;
use crate::types::CameraTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

impl CameraPose {
    /// Unit view direction
    pub fn forward(&self) -> Vec3 {
        (self.look_at - self.position).normalize()
    }
}

/// Camera rig driven by smoothed progress.
///
/// The ideal position trails the path point along the negative tangent and rises above it.
/// The actual position approaches the ideal one by `smoothing` per tick, so camera motion lags
/// the already-smoothed progress. The look-at target is not smoothed.
#[derive(Debug, Clone)]
pub struct CameraRig {
    tuning: CameraTuning,
    pose: CameraPose,
}

impl CameraRig {
    pub fn new(tuning: CameraTuning, curve: &Curve) -> Self {
        let pose = CameraPose {
            position: Vec3::from(tuning.initial_position),
            look_at: curve.position_at(0.0),
        };
        Self { tuning, pose }
    }

    /// Ideal pose for `progress` without any lag.
    pub fn target_pose(&self, curve: &Curve, progress: f64) -> CameraPose {
        let u = progress.clamp(0.0, 1.0);
        let anchor = curve.position_at(u);
        let direction = curve.tangent_at(u);

        let mut position = anchor - direction * self.tuning.back_offset + Vec3::UP * self.tuning.height;
        if self.tuning.side_offset != 0.0 {
            position = position + direction.cross(Vec3::UP).normalize() * self.tuning.side_offset;
        }

        CameraPose {
            position,
            look_at: anchor + direction * self.tuning.look_ahead,
        }
    }

    pub fn update(&mut self, curve: &Curve, progress: f64) -> CameraPose {
        let target = self.target_pose(curve, progress);
        self.pose = CameraPose {
            position: self.pose.position.lerp(target.position, self.tuning.smoothing),
            look_at: target.look_at,
        };
        self.pose
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    pub fn fov_degrees(&self) -> f64 {
        self.tuning.fov_degrees
    }
}
