// renderer_adapter.rs - Copies per-tick scene state into renderer-owned uniforms

use bytemuck::{Pod, Zeroable};

use crate::animation::FrameOutput;

/// 112B std140-like uniform block for the scene shader
#[repr(C, align(16))]
#[derive(Debug, Default, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SceneUniforms {
    // 0..16
    pub camera_position: [f32; 3],
    pub progress: f32,
    // 16..32
    pub camera_target: [f32; 3],
    pub light_intensity: f32,
    // 32..80
    pub background: [f32; 4],
    pub fog_color: [f32; 4],
    pub light_color: [f32; 4],
    // 80..96
    pub fog_near: f32,
    pub fog_far: f32,
    pub overlay_alpha: f32,
    pub deferred_released: u32,
    // 96..112
    pub scatter_progress: f32,
    pub _pad: [f32; 3],
}

static_assertions::const_assert_eq!(std::mem::size_of::<SceneUniforms>(), 112);
static_assertions::const_assert_eq!(std::mem::align_of::<SceneUniforms>(), 16);

impl SceneUniforms {
    pub fn from_frame(frame: &FrameOutput) -> Self {
        let env = &frame.environment;
        Self {
            camera_position: frame.camera.position.to_f32_array(),
            progress: frame.progress.smoothed_progress as f32,
            camera_target: frame.camera.look_at.to_f32_array(),
            light_intensity: env.light_intensity,
            background: env.background.to_array(),
            fog_color: env.fog_color.to_array(),
            light_color: env.light_color.to_array(),
            fog_near: env.fog_near,
            fog_far: env.fog_far,
            overlay_alpha: if frame.overlay.visible { frame.overlay.alpha } else { 0.0 },
            deferred_released: frame.deferred_released as u32,
            scatter_progress: frame.scatter_progress,
            _pad: [0.0; 3],
        }
    }
}

/// Renderer-side consumer of scene state. The core never holds renderer objects; a sink copies
/// plain values out of each frame.
pub trait SceneSink {
    fn apply(&mut self, frame: &FrameOutput);
}

/// Keeps the latest uniform block ready for a buffer upload.
#[derive(Debug, Default)]
pub struct UniformWriter {
    uniforms: SceneUniforms,
    writes: u64,
}

impl UniformWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn uniforms(&self) -> &SceneUniforms {
        &self.uniforms
    }

    /// Bytes for `queue.write_buffer`
    pub fn bytes(&self) -> &[u8] {
        bytemuck::bytes_of(&self.uniforms)
    }

    pub fn writes(&self) -> u64 {
        self.writes
    }
}

impl SceneSink for UniformWriter {
    fn apply(&mut self, frame: &FrameOutput) {
        self.uniforms = SceneUniforms::from_frame(frame);
        self.writes += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::SceneOrchestrator;
    use std::time::Duration;

    #[test]
    fn test_writer_packs_latest_frame() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let mut writer = UniformWriter::new();

        let mut frame = scene.tick(Duration::from_millis(16));
        for _ in 0..10 {
            frame = scene.tick(Duration::from_millis(16));
            writer.apply(&frame);
        }
        assert_eq!(writer.writes(), 10);

        let uniforms = writer.uniforms();
        assert_eq!(uniforms.camera_position, frame.camera.position.to_f32_array());
        assert_eq!(uniforms.background, frame.environment.background.to_array());
        assert_eq!(uniforms.background[3], 1.0);
        assert_eq!(uniforms.fog_near, 10.0);
        assert_eq!(uniforms.fog_far, 40.0);
        assert_eq!(uniforms.overlay_alpha, 1.0);
        assert_eq!(uniforms.deferred_released, 0);
        assert_eq!(uniforms.scatter_progress, 0.0);
        assert_eq!(writer.bytes().len(), 112);
    }

    #[test]
    fn test_byte_layout() {
        let uniforms = SceneUniforms {
            progress: 0.5,
            deferred_released: 1,
            scatter_progress: 0.25,
            ..SceneUniforms::zeroed()
        };
        let bytes = bytemuck::bytes_of(&uniforms);
        assert_eq!(&bytes[12..16], &0.5_f32.to_ne_bytes());
        assert_eq!(&bytes[92..96], &1_u32.to_ne_bytes());
        assert_eq!(&bytes[96..100], &0.25_f32.to_ne_bytes());
    }
}
