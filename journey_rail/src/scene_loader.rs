// scene_loader.rs - Load, validate and export scene configuration

use std::fs;
use std::path::Path;

use crate::animation::Vec3;
use crate::error_handling::{check_factor, Result, SceneError};
use crate::path::{section_markers, Curve, FrameTable, PathMarker};
use crate::sections::SectionRegistry;
use crate::types::{SceneConfig, TuningConfig};

/// The authored rail shipped with the crate
pub const BUILTIN_SCENE: &str = include_str!("../scenes/journey_rail.json");

/// Validated, immutable scene: everything the per-tick code reads but never writes
#[derive(Debug, Clone)]
pub struct SceneDefinition {
    pub name: String,
    pub curve: Curve,
    pub frames: FrameTable,
    pub sections: SectionRegistry,
    pub markers: Vec<PathMarker>,
    pub tuning: TuningConfig,
}

impl SceneDefinition {
    pub fn from_config(config: &SceneConfig) -> Result<Self> {
        validate_tuning(&config.tuning)?;

        let points = config.curve.control_points.iter().copied().map(Vec3::from).collect();
        let curve = Curve::new(
            points,
            config.curve.kind,
            config.curve.tension,
            config.curve.arc_length_divisions,
        )?;
        let frames = FrameTable::build(&curve, config.curve.frame_samples)?;
        let sections = SectionRegistry::from_configs(&config.sections)?;

        if let Some(release) = &config.tuning.deferred_release {
            if sections.index_of(&release.section).is_none() {
                return Err(SceneError::UnknownSection(release.section.clone()));
            }
        }

        let markers = section_markers(&curve, &frames, &sections);

        log::info!(
            "Scene '{}' ready: {} control points, curve length {:.2}, {} frames, {} sections",
            config.name,
            curve.control_points().len(),
            curve.length(),
            frames.len(),
            sections.len()
        );

        Ok(Self {
            name: config.name.clone(),
            curve,
            frames,
            sections,
            markers,
            tuning: config.tuning.clone(),
        })
    }

    pub fn builtin() -> Result<Self> {
        Self::from_config(&SceneConfig::builtin()?)
    }
}

impl SceneConfig {
    pub fn builtin() -> Result<Self> {
        parse_config(BUILTIN_SCENE)
    }
}

pub fn parse_config(json: &str) -> Result<SceneConfig> {
    Ok(serde_json::from_str(json)?)
}

pub fn from_json_str(json: &str) -> Result<SceneDefinition> {
    SceneDefinition::from_config(&parse_config(json)?)
}

pub fn load_config(path: impl AsRef<Path>) -> Result<SceneConfig> {
    let path = path.as_ref();
    log::info!("Loading scene configuration from {:?}", path);
    let json = fs::read_to_string(path)?;
    parse_config(&json)
}

pub fn load_from_path(path: impl AsRef<Path>) -> Result<SceneDefinition> {
    SceneDefinition::from_config(&load_config(path)?)
}

pub fn export_config(config: &SceneConfig) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

pub fn write_config(config: &SceneConfig, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, export_config(config)?)?;
    log::info!("Wrote scene configuration to {:?}", path);
    Ok(())
}

fn validate_tuning(tuning: &TuningConfig) -> Result<()> {
    check_factor("progress.smoothing", tuning.progress.smoothing)?;
    check_factor("camera.smoothing", tuning.camera.smoothing)?;

    let env = &tuning.environment;
    check_factor("environment.background_factor", env.background_factor as f64)?;
    check_factor("environment.fog_factor", env.fog_factor as f64)?;
    check_factor("environment.light_intensity_factor", env.light_intensity_factor as f64)?;
    check_factor("environment.light_color_factor", env.light_color_factor as f64)?;

    non_negative("progress.notify_threshold", tuning.progress.notify_threshold)?;
    non_negative("progress.panel_range", tuning.progress.panel_range)?;
    non_negative("environment.fog_near", env.fog_near as f64)?;
    if !(env.fog_far.is_finite() && env.fog_far >= env.fog_near) {
        return Err(SceneError::InvalidParameter {
            name: "environment.fog_far",
            reason: format!("{} is below fog_near {}", env.fog_far, env.fog_near),
        });
    }

    let camera = &tuning.camera;
    let offsets = [camera.height, camera.back_offset, camera.side_offset, camera.look_ahead];
    if offsets.iter().chain(camera.initial_position.iter()).any(|v| !v.is_finite()) {
        return Err(SceneError::InvalidParameter {
            name: "camera",
            reason: "offsets and initial position must be finite".to_string(),
        });
    }
    if !(camera.fov_degrees > 0.0 && camera.fov_degrees < 180.0) {
        return Err(SceneError::InvalidParameter {
            name: "camera.fov_degrees",
            reason: format!("{} is outside (0, 180)", camera.fov_degrees),
        });
    }
    Ok(())
}

fn non_negative(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidParameter {
            name,
            reason: format!("{value} must be a finite, non-negative number"),
        })
    }
}
