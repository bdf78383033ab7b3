// animation/overlay_fade.rs - Loading overlay: delayed fade-out and loading bar state

use std::time::Duration;

use serde::Serialize;

use super::{Easing, ScheduledEvent, Tween};
use crate::types::OverlayTuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct OverlayState {
    pub alpha: f32,
    pub visible: bool,
    pub fading: bool,
    pub load_progress: f32,
    pub bar_ended: bool,
}

/// Overlay shown while assets load.
///
/// The fade starts `loaded_fade_delay` after the last progress change once loading is complete,
/// or `fallback_fade` after the last change regardless. It then holds for `fade_delay` and
/// tweens alpha 1 -> 0 over `fade_duration`, after which the overlay is hidden. Everything runs
/// on the tick clock so teardown can disarm it.
#[derive(Debug, Clone)]
pub struct LoadingOverlay {
    tuning: OverlayTuning,
    clock: Duration,
    last_change: Duration,
    load_progress: f32,
    nothing_to_load: bool,
    fade: Option<Tween<f32>>,
    bar_end: Option<ScheduledEvent>,
    state: OverlayState,
    torn_down: bool,
}

impl LoadingOverlay {
    pub fn new(tuning: OverlayTuning) -> Self {
        Self {
            tuning,
            clock: Duration::ZERO,
            last_change: Duration::ZERO,
            load_progress: 0.0,
            nothing_to_load: false,
            fade: None,
            bar_end: None,
            state: OverlayState {
                alpha: 1.0,
                visible: true,
                fading: false,
                load_progress: 0.0,
                bar_ended: false,
            },
            torn_down: false,
        }
    }

    /// Loading progress in percent. Only actual changes restart the fade timers.
    pub fn set_load_progress(&mut self, percent: f32) {
        let percent = if percent.is_nan() { 0.0 } else { percent.clamp(0.0, 100.0) };
        if percent == self.load_progress || self.torn_down {
            return;
        }
        self.load_progress = percent;
        self.state.load_progress = percent;
        self.last_change = self.clock;

        if self.is_loaded() {
            if self.bar_end.is_none() && !self.state.bar_ended {
                let delay = Duration::from_millis(self.tuning.loading_bar_end_delay_ms);
                self.bar_end = Some(ScheduledEvent::at(self.clock + delay));
            }
        } else {
            self.bar_end = None;
            self.state.bar_ended = false;
        }
    }

    /// No assets are pending: the overlay counts as loaded and fades after the loaded delay.
    pub fn set_nothing_to_load(&mut self) {
        if self.nothing_to_load || self.torn_down {
            return;
        }
        self.nothing_to_load = true;
        self.last_change = self.clock;
    }

    pub fn update(&mut self, dt: Duration) -> OverlayState {
        self.clock += dt;
        if self.torn_down {
            return self.state;
        }

        if let Some(event) = self.bar_end.as_mut() {
            if event.poll(self.clock) {
                self.bar_end = None;
                self.state.bar_ended = true;
            }
        }

        if let Some(fade) = self.fade.as_mut() {
            fade.update(dt);
            self.state.alpha = *fade.current();
            if !fade.is_active() && self.state.visible {
                self.state.visible = false;
                self.state.fading = false;
                log::debug!("Loading overlay hidden");
            }
        } else if self.fade_due() {
            self.start_fade();
        }

        self.state
    }

    fn fade_due(&self) -> bool {
        let quiet = self.clock.saturating_sub(self.last_change);
        let loaded_delay = Duration::from_millis(self.tuning.loaded_fade_delay_ms);
        let fallback = Duration::from_millis(self.tuning.fallback_fade_ms);
        (self.is_loaded() && quiet >= loaded_delay) || quiet >= fallback
    }

    fn start_fade(&mut self) {
        log::debug!(
            "Loading overlay fading out (loaded: {}, progress {:.0}%)",
            self.is_loaded(),
            self.load_progress
        );
        let fade = Tween::new(1.0_f32, 0.0, Duration::from_millis(self.tuning.fade_duration_ms))
            .with_delay(Duration::from_millis(self.tuning.fade_delay_ms))
            .with_easing(Easing::QuadOut);
        self.fade = Some(fade);
        self.state.fading = true;
    }

    /// Disarm every pending timer and freeze the overlay where it is.
    pub fn teardown(&mut self) {
        if let Some(fade) = self.fade.as_mut() {
            fade.stop();
        }
        self.bar_end = None;
        self.state.fading = false;
        self.torn_down = true;
    }

    pub fn is_loaded(&self) -> bool {
        self.nothing_to_load || self.load_progress >= 100.0
    }

    pub fn state(&self) -> OverlayState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    fn run(overlay: &mut LoadingOverlay, ticks: usize) -> OverlayState {
        let mut state = overlay.state();
        for _ in 0..ticks {
            state = overlay.update(TICK);
        }
        state
    }

    #[test]
    fn test_fade_after_load_completes() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        overlay.set_load_progress(100.0);

        // 500 ms quiet period starts the fade, which then holds for 1000 ms.
        let state = run(&mut overlay, 5);
        assert!(state.fading);
        let state = run(&mut overlay, 10);
        assert_eq!(state.alpha, 1.0);

        let state = run(&mut overlay, 1);
        assert!(state.alpha < 1.0);

        // 3000 ms tween: 29 more ticks leaves it partly visible, the 30th hides it.
        let state = run(&mut overlay, 28);
        assert!(state.visible && state.alpha > 0.0);
        let state = run(&mut overlay, 1);
        assert!(!state.visible);
        assert_eq!(state.alpha, 0.0);
    }

    #[test]
    fn test_fallback_fade_without_load() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        overlay.set_load_progress(40.0);
        assert!(!run(&mut overlay, 39).fading);
        assert!(run(&mut overlay, 1).fading);
    }

    #[test]
    fn test_nothing_to_load_fades_after_loaded_delay() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        overlay.set_nothing_to_load();
        assert!(overlay.is_loaded());
        assert!(!run(&mut overlay, 4).fading);
        assert!(run(&mut overlay, 1).fading);

        // Without that signal an idle overlay waits for the fallback.
        let mut idle = LoadingOverlay::new(OverlayTuning::default());
        assert!(!run(&mut idle, 39).fading);
        assert!(run(&mut idle, 1).fading);
    }

    #[test]
    fn test_progress_changes_restart_the_quiet_period() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        for percent in [10.0, 20.0, 30.0, 40.0, 50.0, 60.0] {
            overlay.set_load_progress(percent);
            assert!(!run(&mut overlay, 30).fading);
        }
        // Repeating the same value is not a change.
        overlay.set_load_progress(60.0);
        assert!(run(&mut overlay, 10).fading);
    }

    #[test]
    fn test_loading_bar_end_and_reset() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        overlay.set_load_progress(100.0);
        assert!(!run(&mut overlay, 4).bar_ended);
        assert!(run(&mut overlay, 1).bar_ended);

        overlay.set_load_progress(80.0);
        assert!(!overlay.state().bar_ended);
    }

    #[test]
    fn test_teardown_disarms_timers() {
        let mut overlay = LoadingOverlay::new(OverlayTuning::default());
        overlay.set_load_progress(100.0);
        overlay.teardown();
        let state = run(&mut overlay, 100);
        assert!(state.visible);
        assert!(!state.fading && !state.bar_ended);
        assert_eq!(state.alpha, 1.0);
    }
}
