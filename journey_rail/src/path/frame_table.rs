// path/frame_table.rs - Precomputed rotation-minimizing frames along the rail

use serde::Serialize;

use crate::animation::{Quat, Vec3};
use crate::error_handling::{Result, SceneError};
use super::Curve;

/// Orthonormal frame; `binormal = tangent × normal`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OrientationFrame {
    pub tangent: Vec3,
    pub normal: Vec3,
    pub binormal: Vec3,
}

impl OrientationFrame {
    /// Keeps the tangent exactly, squeezes drift out of the normal and rebuilds the binormal.
    fn reorthonormalize(tangent: Vec3, normal: Vec3) -> Self {
        let tangent = tangent.normalize();
        let mut normal = (normal - tangent * tangent.dot(normal)).normalize();
        if normal.length_squared() < 0.5 {
            normal = seed_normal(tangent);
        }
        Self {
            tangent,
            normal,
            binormal: tangent.cross(normal).normalize(),
        }
    }

    /// Rotation whose local X/Y/Z axes are normal/binormal/tangent
    pub fn rotation(&self) -> Quat {
        Quat::from_basis(self.normal, self.binormal, self.tangent)
    }
}

/// Normal perpendicular to `tangent`, built from the world axis it is least aligned with
fn seed_normal(tangent: Vec3) -> Vec3 {
    let (ax, ay, az) = (tangent.x.abs(), tangent.y.abs(), tangent.z.abs());
    let axis = if ax <= ay && ax <= az {
        Vec3::new(1.0, 0.0, 0.0)
    } else if ay <= az {
        Vec3::new(0.0, 1.0, 0.0)
    } else {
        Vec3::new(0.0, 0.0, 1.0)
    };
    (axis - tangent * tangent.dot(axis)).normalize()
}

/// Fixed-resolution frame table sampled at uniform arc-length steps.
///
/// Lookup is nearest-sample, not interpolated: orientation is quantized to
/// `1 / sample_count` of the rail. Callers wanting smoother orientation need a
/// larger table.
#[derive(Debug, Clone)]
pub struct FrameTable {
    frames: Vec<OrientationFrame>,
}

impl FrameTable {
    /// Sweep `sample_count` frames using double reflection (Wang et al. 2008).
    pub fn build(curve: &Curve, sample_count: usize) -> Result<Self> {
        if sample_count < 2 {
            return Err(SceneError::InvalidParameter {
                name: "frame_samples",
                reason: format!("{sample_count} is below the minimum of 2"),
            });
        }

        let last = (sample_count - 1) as f64;
        let mut frames = Vec::with_capacity(sample_count);

        let first_tangent = curve.tangent_at(0.0);
        frames.push(OrientationFrame::reorthonormalize(first_tangent, seed_normal(first_tangent)));
        let mut prev_position = curve.position_at(0.0);

        for i in 1..sample_count {
            let u = i as f64 / last;
            let position = curve.position_at(u);
            let tangent = curve.tangent_at(u);
            let prev = frames[i - 1];

            // First reflection maps the previous point onto the next, second aligns the tangents
            let v1 = position - prev_position;
            let normal_l = prev.normal.reflect_across(v1);
            let tangent_l = prev.tangent.reflect_across(v1);
            let normal = normal_l.reflect_across(tangent - tangent_l);

            frames.push(OrientationFrame::reorthonormalize(tangent, normal));
            prev_position = position;
        }

        Ok(Self { frames })
    }

    /// Nearest sample for `t`: index `floor(clamp(t) * len)`, clamped to the table.
    pub fn frame_at(&self, t: f64) -> OrientationFrame {
        let count = self.frames.len();
        let index = (t.clamp(0.0, 1.0) * count as f64).floor() as usize;
        self.frames[index.min(count - 1)]
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[OrientationFrame] {
        &self.frames
    }
}
