// lib.rs - Library exports for journey-rail
// Path-driven scene progression: spline rail, sections, progress machine, camera rig,
// environment blending and checkpoint navigation

pub mod animation;
pub mod error_handling;
pub mod path;
pub mod renderer_adapter;
pub mod scene_loader;
pub mod sections;
pub mod types;

// Re-export commonly used types
pub use animation::{
    CameraPose, Color, EnvironmentState, FrameOutput, SceneOrchestrator, SectionHook, StepDirection,
    StepOutcome, Vec3,
};
pub use error_handling::{Result, SceneError};
pub use path::{Curve, CurveKind, FrameTable, OrientationFrame, PathMarker};
pub use renderer_adapter::{SceneSink, SceneUniforms, UniformWriter};
pub use scene_loader::SceneDefinition;
pub use sections::{Section, SectionRegistry};
pub use types::SceneConfig;
