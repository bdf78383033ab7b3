// animation/mod.rs - Per-tick animation system driving the path-rail scene

pub mod tween;
pub mod scheduler;
pub mod progress;
pub mod camera_rig;
pub mod environment_blender;
pub mod checkpoint_navigator;
pub mod overlay_fade;
pub mod orchestrator;

pub use tween::*;
pub use scheduler::*;
pub use progress::*;
pub use camera_rig::*;
pub use environment_blender::*;
pub use checkpoint_navigator::*;
pub use overlay_fade::*;
pub use orchestrator::*;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// PLAYBACK STATE
// ============================================================================

/// Tween playback control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Playing,
    Stopped,
    Finished,
}

// ============================================================================
// CORE MATH TYPES
// ============================================================================

/// 3D vector in scene space
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vec3 {
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    #[inline]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }

    /// Exponential approach step: moves `factor` of the remaining distance toward `target`.
    #[inline]
    pub fn lerp(self, target: Vec3, factor: f64) -> Vec3 {
        let f = factor.clamp(0.0, 1.0);
        self + (target - self) * f
    }

    #[inline]
    pub fn length(self) -> f64 {
        self.length_squared().sqrt()
    }

    #[inline]
    pub fn length_squared(self) -> f64 {
        self.dot(self)
    }

    #[inline]
    pub fn distance(self, other: Vec3) -> f64 {
        (other - self).length()
    }

    /// Unit vector, or zero for degenerate input
    #[inline]
    pub fn normalize(self) -> Vec3 {
        let len_sq = self.length_squared();
        if len_sq > 1e-24 {
            self * (1.0 / len_sq.sqrt())
        } else {
            Vec3::zero()
        }
    }

    #[inline]
    pub fn dot(self, other: Vec3) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    #[inline]
    pub fn cross(self, other: Vec3) -> Vec3 {
        Vec3::new(
            self.y * other.z - self.z * other.y,
            self.z * other.x - self.x * other.z,
            self.x * other.y - self.y * other.x,
        )
    }

    /// Reflect across the plane whose normal is `n` (not required to be unit length).
    #[inline]
    pub fn reflect_across(self, n: Vec3) -> Vec3 {
        let nn = n.length_squared();
        if nn < 1e-24 {
            return self;
        }
        self - n * (2.0 * n.dot(self) / nn)
    }

    #[inline]
    pub fn to_f32_array(self) -> [f32; 3] {
        [self.x as f32, self.y as f32, self.z as f32]
    }
}

impl std::ops::Add for Vec3 {
    type Output = Vec3;
    #[inline]
    fn add(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x + other.x, self.y + other.y, self.z + other.z)
    }
}

impl std::ops::Sub for Vec3 {
    type Output = Vec3;
    #[inline]
    fn sub(self, other: Vec3) -> Vec3 {
        Vec3::new(self.x - other.x, self.y - other.y, self.z - other.z)
    }
}

impl std::ops::Neg for Vec3 {
    type Output = Vec3;
    #[inline]
    fn neg(self) -> Vec3 {
        Vec3::new(-self.x, -self.y, -self.z)
    }
}

impl std::ops::Mul<f64> for Vec3 {
    type Output = Vec3;
    #[inline]
    fn mul(self, scalar: f64) -> Vec3 {
        Vec3::new(self.x * scalar, self.y * scalar, self.z * scalar)
    }
}

impl From<[f64; 3]> for Vec3 {
    #[inline]
    fn from(arr: [f64; 3]) -> Self {
        Vec3::new(arr[0], arr[1], arr[2])
    }
}

impl From<Vec3> for [f64; 3] {
    #[inline]
    fn from(v: Vec3) -> [f64; 3] {
        [v.x, v.y, v.z]
    }
}

// ============================================================================
// ROTATION
// ============================================================================

/// Unit quaternion
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quat {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Quat {
    pub const IDENTITY: Quat = Quat { x: 0.0, y: 0.0, z: 0.0, w: 1.0 };

    /// Rotation taking the world axes onto the given orthonormal columns.
    pub fn from_basis(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Quat {
        let (m00, m01, m02) = (x_axis.x, y_axis.x, z_axis.x);
        let (m10, m11, m12) = (x_axis.y, y_axis.y, z_axis.y);
        let (m20, m21, m22) = (x_axis.z, y_axis.z, z_axis.z);
        let trace = m00 + m11 + m22;

        let q = if trace > 0.0 {
            let s = 0.5 / (trace + 1.0).sqrt();
            Quat { w: 0.25 / s, x: (m21 - m12) * s, y: (m02 - m20) * s, z: (m10 - m01) * s }
        } else if m00 > m11 && m00 > m22 {
            let s = 2.0 * (1.0 + m00 - m11 - m22).sqrt();
            Quat { w: (m21 - m12) / s, x: 0.25 * s, y: (m01 + m10) / s, z: (m02 + m20) / s }
        } else if m11 > m22 {
            let s = 2.0 * (1.0 + m11 - m00 - m22).sqrt();
            Quat { w: (m02 - m20) / s, x: (m01 + m10) / s, y: 0.25 * s, z: (m12 + m21) / s }
        } else {
            let s = 2.0 * (1.0 + m22 - m00 - m11).sqrt();
            Quat { w: (m10 - m01) / s, x: (m02 + m20) / s, y: (m12 + m21) / s, z: 0.25 * s }
        };
        q.normalize()
    }

    pub fn normalize(self) -> Quat {
        let len = (self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w).sqrt();
        if len < 1e-12 {
            return Quat::IDENTITY;
        }
        Quat { x: self.x / len, y: self.y / len, z: self.z / len, w: self.w / len }
    }

    pub fn rotate(self, v: Vec3) -> Vec3 {
        let qv = Vec3::new(self.x, self.y, self.z);
        let uv = qv.cross(v);
        let uuv = qv.cross(uv);
        v + uv * (2.0 * self.w) + uuv * 2.0
    }
}

impl Default for Quat {
    fn default() -> Self {
        Self::IDENTITY
    }
}

// ============================================================================
// COLOR TYPE
// ============================================================================

/// Linear RGB color as written to the renderer
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    pub const WHITE: Color = Color::rgb(1.0, 1.0, 1.0);

    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Per-channel exponential approach toward `target`.
    #[inline]
    pub fn lerp(self, target: Color, factor: f32) -> Color {
        let f = factor.clamp(0.0, 1.0);
        Color::rgb(
            self.r + (target.r - self.r) * f,
            self.g + (target.g - self.g) * f,
            self.b + (target.b - self.b) * f,
        )
    }

    /// Largest per-channel absolute difference
    #[inline]
    pub fn max_channel_distance(self, other: Color) -> f32 {
        (self.r - other.r)
            .abs()
            .max((self.g - other.g).abs())
            .max((self.b - other.b).abs())
    }

    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, 1.0]
    }

    /// Hex form `#rrggbb`
    pub fn to_hex(self) -> String {
        let channel = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("#{:02x}{:02x}{:02x}", channel(self.r), channel(self.g), channel(self.b))
    }
}

/// Parse failure for hex colors; the loader wraps it with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexColorError(pub String);

impl FromStr for Color {
    type Err = HexColorError;

    /// Accepts `#rgb` and `#rrggbb` (leading `#` optional).
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let hex = s.trim().trim_start_matches('#');
        // from_str_radix alone would accept a leading sign
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(HexColorError(s.to_string()));
        }
        let expanded: String = match hex.len() {
            3 => hex.chars().flat_map(|c| [c, c]).collect(),
            6 => hex.to_string(),
            _ => return Err(HexColorError(s.to_string())),
        };
        let value =
            u32::from_str_radix(&expanded, 16).map_err(|_| HexColorError(s.to_string()))?;
        let channel = |shift: u32| ((value >> shift) & 0xff) as f32 / 255.0;
        Ok(Color::rgb(channel(16), channel(8), channel(0)))
    }
}

// ============================================================================
// UTILITY FUNCTIONS
// ============================================================================

/// Exponential approach for scalars, factor clamped to [0, 1]
#[inline]
pub fn lerp(a: f64, b: f64, factor: f64) -> f64 {
    a + (b - a) * factor.clamp(0.0, 1.0)
}

#[inline]
pub fn lerp_f32(a: f32, b: f32, factor: f32) -> f32 {
    a + (b - a) * factor.clamp(0.0, 1.0)
}
