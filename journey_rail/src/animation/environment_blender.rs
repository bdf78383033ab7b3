// animation/environment_blender.rs - Background, fog and light blending toward the active section

use serde::Serialize;

use super::{lerp_f32, Color};
use crate::error_handling::{Result, SceneError};
use crate::sections::Environment;
use crate::types::EnvironmentTuning;

/// Global scene look, owned by value and copied into the renderer each tick
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnvironmentState {
    pub background: Color,
    pub fog_color: Color,
    pub fog_near: f32,
    pub fog_far: f32,
    pub light_color: Color,
    pub light_intensity: f32,
}

impl EnvironmentState {
    /// Largest remaining gap to `target` over every blended channel
    pub fn distance_to(&self, target: &Environment) -> f32 {
        self.background
            .max_channel_distance(target.background)
            .max(self.fog_color.max_channel_distance(target.fog_color))
            .max(self.light_color.max_channel_distance(target.accent))
            .max((self.light_intensity - target.light_intensity).abs())
    }
}

pub struct EnvironmentBlender {
    tuning: EnvironmentTuning,
    state: EnvironmentState,
}

impl EnvironmentBlender {
    /// Starts from the first section's background and fog with the configured initial light.
    pub fn new(tuning: EnvironmentTuning, initial: &Environment) -> Result<Self> {
        let light_color = tuning
            .initial_light_color
            .parse::<Color>()
            .map_err(|_| SceneError::InvalidColor {
                section: "tuning.environment".to_string(),
                value: tuning.initial_light_color.clone(),
            })?;

        let state = EnvironmentState {
            background: initial.background,
            fog_color: initial.fog_color,
            fog_near: tuning.fog_near,
            fog_far: tuning.fog_far,
            light_color,
            light_intensity: tuning.initial_light_intensity,
        };
        Ok(Self { tuning, state })
    }

    /// One blend step. Each channel keeps its own factor, so convergence is geometric and never
    /// exact.
    pub fn update(&mut self, target: &Environment) -> EnvironmentState {
        let t = &self.tuning;
        let s = &mut self.state;
        s.background = s.background.lerp(target.background, t.background_factor);
        s.fog_color = s.fog_color.lerp(target.fog_color, t.fog_factor);
        s.light_intensity = lerp_f32(s.light_intensity, target.light_intensity, t.light_intensity_factor);
        s.light_color = s.light_color.lerp(target.accent, t.light_color_factor);
        *s
    }

    pub fn state(&self) -> EnvironmentState {
        self.state
    }
}
