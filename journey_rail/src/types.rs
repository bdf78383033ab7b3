// types.rs - Serialized scene configuration (control points, sections, tuning)
use serde::{Deserialize, Serialize};

use crate::animation::Easing;
use crate::path::CurveKind;

/// Whole scene as authored on disk
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub name: String,
    pub curve: CurveConfig,
    pub sections: Vec<SectionConfig>,
    #[serde(default)]
    pub tuning: TuningConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurveConfig {
    pub control_points: Vec<[f64; 3]>,
    #[serde(default)]
    pub kind: CurveKind,
    #[serde(default = "default_tension")]
    pub tension: f64,
    #[serde(default = "default_frame_samples")]
    pub frame_samples: usize,
    #[serde(default = "default_arc_length_divisions")]
    pub arc_length_divisions: usize,
}

fn default_tension() -> f64 {
    0.5
}

fn default_frame_samples() -> usize {
    400
}

fn default_arc_length_divisions() -> usize {
    200
}

/// One chapter of the rail
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionConfig {
    pub id: String,
    #[serde(default)]
    pub title: String,
    pub t_start: f64,
    pub t_end: f64,
    pub env: EnvironmentConfig,
    /// Whether the overlay UI has a detail panel for this chapter
    #[serde(default)]
    pub panel: bool,
}

/// Hex colors plus directional light intensity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnvironmentConfig {
    pub background: String,
    pub fog_color: String,
    pub light_intensity: f32,
    pub accent: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TuningConfig {
    pub progress: ProgressTuning,
    pub camera: CameraTuning,
    pub environment: EnvironmentTuning,
    pub navigator: NavigatorTuning,
    pub deferred_release: Option<DeferredReleaseConfig>,
    pub overlay: OverlayTuning,
    pub scatter: ScatterTuning,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressTuning {
    /// Fraction of the remaining distance covered per tick
    pub smoothing: f64,
    /// Minimum progress change before observers hear about it
    pub notify_threshold: f64,
    /// Half-width around a section midpoint where its panel is shown
    pub panel_range: f64,
}

impl Default for ProgressTuning {
    fn default() -> Self {
        Self {
            smoothing: 0.08,
            notify_threshold: 0.002,
            panel_range: 0.08,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraTuning {
    pub height: f64,
    pub back_offset: f64,
    pub side_offset: f64,
    pub look_ahead: f64,
    pub smoothing: f64,
    pub initial_position: [f64; 3],
    pub fov_degrees: f64,
}

impl Default for CameraTuning {
    fn default() -> Self {
        Self {
            height: 3.0,
            back_offset: 4.0,
            side_offset: 0.0,
            look_ahead: 3.0,
            smoothing: 0.02,
            initial_position: [0.0, 3.0, 10.0],
            fov_degrees: 50.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentTuning {
    pub background_factor: f32,
    pub fog_factor: f32,
    pub light_intensity_factor: f32,
    pub light_color_factor: f32,
    pub fog_near: f32,
    pub fog_far: f32,
    pub initial_light_intensity: f32,
    pub initial_light_color: String,
}

impl Default for EnvironmentTuning {
    fn default() -> Self {
        Self {
            background_factor: 0.05,
            fog_factor: 0.05,
            light_intensity_factor: 0.05,
            light_color_factor: 0.05,
            fog_near: 10.0,
            fog_far: 40.0,
            initial_light_intensity: 1.0,
            initial_light_color: "#ffffff".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NavigatorTuning {
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for NavigatorTuning {
    fn default() -> Self {
        Self {
            duration_ms: 1800,
            easing: Easing::CubicInOut,
        }
    }
}

/// Entering `section` releases deferred scene content after `delay_ms`, once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeferredReleaseConfig {
    pub section: String,
    #[serde(default = "default_release_delay_ms")]
    pub delay_ms: u64,
}

fn default_release_delay_ms() -> u64 {
    1900
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayTuning {
    pub loaded_fade_delay_ms: u64,
    pub fallback_fade_ms: u64,
    pub fade_delay_ms: u64,
    pub fade_duration_ms: u64,
    pub loading_bar_end_delay_ms: u64,
}

impl Default for OverlayTuning {
    fn default() -> Self {
        Self {
            loaded_fade_delay_ms: 500,
            fallback_fade_ms: 4000,
            fade_delay_ms: 1000,
            fade_duration_ms: 3000,
            loading_bar_end_delay_ms: 500,
        }
    }
}

/// Particle scatter ramp (0 -> 1) started once when the scene mounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScatterTuning {
    pub delay_ms: u64,
    pub duration_ms: u64,
    pub easing: Easing,
}

impl Default for ScatterTuning {
    fn default() -> Self {
        Self {
            delay_ms: 1000,
            duration_ms: 3000,
            easing: Easing::CubicOut,
        }
    }
}
