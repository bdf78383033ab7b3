// animation/orchestrator.rs - Per-tick coordination of the rail scene
//
// Fixed tick order: navigator tween -> progress machine -> camera rig -> environment blender
// -> loading overlay -> particle scatter.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{
    CameraPose, CameraRig, CheckpointNavigator, EnvironmentBlender, EnvironmentState,
    LoadingOverlay, NavigatorState, OverlayState, ProgressMachine, ProgressUpdate, SectionHook,
    StepDirection, StepOutcome, Tween,
};
use crate::error_handling::Result;
use crate::path::{Curve, FrameTable, PathMarker};
use crate::scene_loader::SceneDefinition;
use crate::sections::SectionRegistry;
use crate::types::SceneConfig;

/// Everything a renderer or UI needs after one tick
#[derive(Debug, Clone, Serialize)]
pub struct FrameOutput {
    pub frame: u64,
    pub elapsed_ms: u64,
    #[serde(flatten)]
    pub progress: ProgressUpdate,
    pub camera: CameraPose,
    pub environment: EnvironmentState,
    pub navigator: NavigatorState,
    pub checkpoint_index: usize,
    pub deferred_released: bool,
    pub overlay: OverlayState,
    pub scatter_progress: f32,
}

/// Owns every per-tick subsystem of one scene. Single-threaded: all mutation happens in `tick`
/// and the control methods, never concurrently.
pub struct SceneOrchestrator {
    name: String,
    curve: Curve,
    frames: FrameTable,
    markers: Vec<PathMarker>,

    progress: ProgressMachine,
    camera: CameraRig,
    environment: EnvironmentBlender,
    navigator: CheckpointNavigator,
    overlay: LoadingOverlay,
    scatter: Tween<f32>,

    target: f64,
    frame: u64,
    elapsed: Duration,
    torn_down: bool,
}

impl SceneOrchestrator {
    pub fn from_definition(scene: SceneDefinition) -> Result<Self> {
        let SceneDefinition {
            name,
            curve,
            frames,
            sections,
            markers,
            tuning,
        } = scene;

        let camera = CameraRig::new(tuning.camera, &curve);
        let environment =
            EnvironmentBlender::new(tuning.environment, &sections.first().environment)?;
        let navigator = CheckpointNavigator::new(sections.checkpoints(), &tuning.navigator)?;
        let overlay = LoadingOverlay::new(tuning.overlay);
        let scatter = Tween::new(0.0_f32, 1.0, Duration::from_millis(tuning.scatter.duration_ms))
            .with_delay(Duration::from_millis(tuning.scatter.delay_ms))
            .with_easing(tuning.scatter.easing);

        let mut progress = ProgressMachine::new(sections, tuning.progress);
        if let Some(release) = &tuning.deferred_release {
            let delay = Duration::from_millis(release.delay_ms);
            progress = progress.with_deferred_release(&release.section, delay)?;
        }

        log::info!(
            "Orchestrator ready for '{}' with {} checkpoints",
            name,
            navigator.checkpoints().len()
        );

        Ok(Self {
            name,
            curve,
            frames,
            markers,
            progress,
            camera,
            environment,
            navigator,
            overlay,
            scatter,
            target: 0.0,
            frame: 0,
            elapsed: Duration::ZERO,
            torn_down: false,
        })
    }

    pub fn from_config(config: &SceneConfig) -> Result<Self> {
        Self::from_definition(SceneDefinition::from_config(config)?)
    }

    pub fn builtin() -> Result<Self> {
        Self::from_definition(SceneDefinition::builtin()?)
    }

    /// Advance the whole scene by one render tick.
    pub fn tick(&mut self, dt: Duration) -> FrameOutput {
        if let Some(target) = self.navigator.update(dt) {
            self.target = target;
        }

        let progress = self.progress.advance(self.target, dt);
        let camera = self.camera.update(&self.curve, progress.smoothed_progress);
        let environment = self.environment.update(&self.progress.active_section().environment);
        let overlay = self.overlay.update(dt);
        self.scatter.update(dt);

        self.frame += 1;
        self.elapsed += dt;

        FrameOutput {
            frame: self.frame,
            elapsed_ms: self.elapsed.as_millis() as u64,
            progress,
            camera,
            environment,
            navigator: self.navigator.state(),
            checkpoint_index: self.navigator.current_index(),
            deferred_released: self.progress.deferred_released(),
            overlay,
            scatter_progress: *self.scatter.current(),
        }
    }

    /// Externally driven target (e.g. scroll). An in-flight navigator tween overwrites it on
    /// the next tick.
    pub fn set_target_progress(&mut self, target: f64) {
        if !target.is_nan() {
            self.target = target.clamp(0.0, 1.0);
        }
    }

    pub fn step(&mut self, direction: StepDirection) -> StepOutcome {
        if self.torn_down {
            return StepOutcome::Busy;
        }
        self.navigator.step(direction, self.target)
    }

    pub fn step_forward(&mut self) -> StepOutcome {
        self.step(StepDirection::Forward)
    }

    pub fn step_backward(&mut self) -> StepOutcome {
        self.step(StepDirection::Backward)
    }

    pub fn is_animating(&self) -> bool {
        self.navigator.is_animating()
    }

    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(f64, &str) + Send + 'static,
    {
        self.progress.on_progress(callback);
    }

    pub fn on_section_enter(&mut self, section_id: &str, hook: SectionHook) -> Result<()> {
        self.progress.on_section_enter(section_id, hook)
    }

    /// Loading progress in percent, forwarded to the overlay.
    pub fn set_load_progress(&mut self, percent: f32) {
        self.overlay.set_load_progress(percent);
    }

    /// Tell the overlay there are no assets to wait for.
    pub fn set_nothing_to_load(&mut self) {
        self.overlay.set_nothing_to_load();
    }

    /// Cancel the pending deferred release, kill any navigator tween, disarm the overlay and
    /// freeze the particle scatter.
    pub fn teardown(&mut self) {
        if self.torn_down {
            return;
        }
        self.progress.teardown();
        self.navigator.cancel();
        self.overlay.teardown();
        self.scatter.stop();
        self.torn_down = true;
        log::info!("Scene '{}' torn down after {} frames", self.name, self.frame);
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn fov_degrees(&self) -> f64 {
        self.camera.fov_degrees()
    }

    pub fn environment_state(&self) -> EnvironmentState {
        self.environment.state()
    }

    pub fn overlay_state(&self) -> OverlayState {
        self.overlay.state()
    }

    pub fn scatter_progress(&self) -> f32 {
        *self.scatter.current()
    }

    pub fn target_progress(&self) -> f64 {
        self.target
    }

    pub fn smoothed_progress(&self) -> f64 {
        self.progress.smoothed()
    }

    pub fn active_section_id(&self) -> Arc<str> {
        self.progress.active_section().id.clone()
    }

    pub fn checkpoint_index(&self) -> usize {
        self.navigator.current_index()
    }

    pub fn deferred_released(&self) -> bool {
        self.progress.deferred_released()
    }

    pub fn markers(&self) -> &[PathMarker] {
        &self.markers
    }

    pub fn curve(&self) -> &Curve {
        &self.curve
    }

    pub fn frames(&self) -> &FrameTable {
        &self.frames
    }

    pub fn sections(&self) -> &SectionRegistry {
        self.progress.sections()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::SceneError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    const FRAME: Duration = Duration::from_millis(16);

    fn run_until_idle(scene: &mut SceneOrchestrator) -> FrameOutput {
        let mut output = scene.tick(FRAME);
        while scene.is_animating() {
            output = scene.tick(FRAME);
        }
        output
    }

    #[test]
    fn test_step_through_every_checkpoint() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let checkpoints = scene.sections().checkpoints();

        for (index, expected) in checkpoints.iter().enumerate().skip(1) {
            assert!(matches!(scene.step_forward(), StepOutcome::Started { .. }));
            let output = run_until_idle(&mut scene);
            assert_eq!(output.progress.target_progress, *expected);
            assert_eq!(output.checkpoint_index, index);
        }
        let last = checkpoints[checkpoints.len() - 1];
        assert_eq!(scene.target_progress(), last);
        assert_eq!(scene.step_forward(), StepOutcome::AtBoundary);

        for _ in 0..300 {
            scene.tick(FRAME);
        }
        assert!((scene.smoothed_progress() - last).abs() < 1e-6);
        assert_eq!(&*scene.active_section_id(), "interests");
        assert!(scene.deferred_released());
    }

    #[test]
    fn test_steps_are_exclusive() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        scene.step_forward();
        scene.tick(FRAME);
        assert!(scene.is_animating());
        assert_eq!(scene.step_forward(), StepOutcome::Busy);
        assert_eq!(scene.checkpoint_index(), 1);

        let output = run_until_idle(&mut scene);
        assert_eq!(output.progress.target_progress, scene.sections().checkpoints()[1]);
        assert_eq!(output.navigator, NavigatorState::Idle);
    }

    #[test]
    fn test_panel_flag_near_checkpoint() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        scene.set_target_progress(0.165);
        let mut output = scene.tick(FRAME);
        for _ in 0..300 {
            output = scene.tick(FRAME);
        }
        assert!(output.progress.panel_active);

        // The last section has no panel.
        scene.set_target_progress(0.95);
        for _ in 0..300 {
            output = scene.tick(FRAME);
        }
        assert!(!output.progress.panel_active);
    }

    #[test]
    fn test_notifications_and_hooks_flow_through() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let sections = Arc::new(Mutex::new(Vec::new()));
        let sink = sections.clone();
        scene.on_progress(move |_, id| {
            let mut seen = sink.lock().unwrap();
            if seen.last().map(|last: &String| last != id).unwrap_or(true) {
                seen.push(id.to_string());
            }
        });

        let entries = Arc::new(AtomicUsize::new(0));
        let counter = entries.clone();
        scene
            .on_section_enter("accounts", SectionHook::once(move |_| {
                counter.fetch_add(1, Ordering::SeqCst);
            }))
            .unwrap();
        assert!(matches!(
            scene.on_section_enter("missing", SectionHook::every(|_| {})),
            Err(SceneError::UnknownSection(_))
        ));

        scene.set_target_progress(1.0);
        for _ in 0..400 {
            scene.tick(FRAME);
        }
        assert_eq!(*sections.lock().unwrap(), vec!["projects", "accounts", "interests"]);
        assert_eq!(entries.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_environment_follows_active_section() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let start = scene.environment_state();
        assert_eq!(start.background, scene.sections().first().environment.background);

        scene.set_target_progress(0.5);
        for _ in 0..600 {
            scene.tick(FRAME);
        }
        let accounts = &scene.sections().get(1).unwrap().environment;
        assert!(scene.environment_state().distance_to(accounts) < 1e-3);
    }

    #[test]
    fn test_teardown_stops_side_effects() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        scene.set_load_progress(100.0);
        scene.set_target_progress(1.0);
        for _ in 0..30 {
            scene.tick(FRAME);
        }
        assert_eq!(&*scene.active_section_id(), "interests");
        assert!(matches!(scene.step_forward(), StepOutcome::Started { .. }));
        assert!(scene.is_animating());

        scene.teardown();
        assert!(!scene.is_animating());
        assert_eq!(scene.step_forward(), StepOutcome::Busy);

        for _ in 0..600 {
            let output = scene.tick(FRAME);
            assert!(!output.deferred_released);
            assert!(output.overlay.visible);
        }
    }

    #[test]
    fn test_scatter_ramps_once_after_mount() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let tick = Duration::from_millis(100);
        assert_eq!(scene.scatter_progress(), 0.0);

        // Held at zero through the 1000 ms delay, independent of any release.
        for _ in 0..10 {
            assert_eq!(scene.tick(tick).scatter_progress, 0.0);
        }

        let mut last = 0.0;
        for _ in 0..29 {
            let value = scene.tick(tick).scatter_progress;
            assert!(value > last && value < 1.0);
            last = value;
        }
        assert_eq!(scene.tick(tick).scatter_progress, 1.0);
        assert!(!scene.deferred_released());

        for _ in 0..20 {
            assert_eq!(scene.tick(tick).scatter_progress, 1.0);
        }
    }

    #[test]
    fn test_teardown_freezes_scatter() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let tick = Duration::from_millis(100);
        for _ in 0..20 {
            scene.tick(tick);
        }
        let frozen = scene.scatter_progress();
        assert!(frozen > 0.0 && frozen < 1.0);

        scene.teardown();
        for _ in 0..50 {
            assert_eq!(scene.tick(tick).scatter_progress, frozen);
        }
    }

    #[test]
    fn test_frame_output_serializes() {
        let mut scene = SceneOrchestrator::builtin().unwrap();
        let output = scene.tick(FRAME);
        let value = serde_json::to_value(&output).unwrap();
        assert_eq!(value["frame"], 1);
        assert_eq!(value["active_section_id"], "projects");
        assert!(value["camera"]["position"]["x"].is_number());
        assert_eq!(value["navigator"], "idle");
        assert_eq!(value["scatter_progress"], 0.0);
    }
}
