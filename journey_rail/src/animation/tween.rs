// animation/tween.rs - Tick-driven tween with GSAP-style easing

use std::time::Duration;
use serde::{Deserialize, Serialize};
use super::{lerp, lerp_f32, PlaybackState};

// ============================================================================
// EASING FUNCTIONS
// ============================================================================

/// Easing curves. `power1` is quad, `power2` is cubic, `power3` is quart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    QuadIn,
    QuadOut,
    QuadInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    QuartIn,
    QuartOut,
    QuartInOut,
    SineInOut,
}

impl Easing {
    /// Map normalized time to eased progress; input is clamped to [0, 1].
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => power_in(t, 2),
            Easing::QuadOut => power_out(t, 2),
            Easing::QuadInOut => power_in_out(t, 2),
            Easing::CubicIn => power_in(t, 3),
            Easing::CubicOut => power_out(t, 3),
            Easing::CubicInOut => power_in_out(t, 3),
            Easing::QuartIn => power_in(t, 4),
            Easing::QuartOut => power_out(t, 4),
            Easing::QuartInOut => power_in_out(t, 4),
            Easing::SineInOut => 0.5 - 0.5 * (std::f32::consts::PI * t).cos(),
        }
    }
}

#[inline]
fn power_in(t: f32, exp: i32) -> f32 {
    t.powi(exp)
}

#[inline]
fn power_out(t: f32, exp: i32) -> f32 {
    1.0 - (1.0 - t).powi(exp)
}

#[inline]
fn power_in_out(t: f32, exp: i32) -> f32 {
    if t < 0.5 {
        0.5 * (2.0 * t).powi(exp)
    } else {
        1.0 - 0.5 * (2.0 - 2.0 * t).powi(exp)
    }
}

// ============================================================================
// INTERPOLATABLE TRAIT
// ============================================================================

/// Types a tween can drive
pub trait Interpolate: Clone + Send + Sync + 'static {
    fn interpolate(&self, other: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp_f32(*self, *other, t)
    }
}

impl Interpolate for f64 {
    #[inline]
    fn interpolate(&self, other: &Self, t: f32) -> Self {
        lerp(*self, *other, t as f64)
    }
}

// ============================================================================
// TWEEN IMPLEMENTATION
// ============================================================================

/// Single fixed-duration tween advanced by the render tick
#[derive(Debug, Clone)]
pub struct Tween<T: Interpolate> {
    start: T,
    end: T,
    current: T,
    duration: Duration,
    elapsed: Duration,
    delay: Duration,
    delay_elapsed: Duration,
    easing: Easing,
    state: PlaybackState,
}

impl<T: Interpolate> Tween<T> {
    pub fn new(start: T, end: T, duration: Duration) -> Self {
        Self {
            start: start.clone(),
            end,
            current: start,
            duration,
            elapsed: Duration::ZERO,
            delay: Duration::ZERO,
            delay_elapsed: Duration::ZERO,
            easing: Easing::Linear,
            state: PlaybackState::Playing,
        }
    }

    pub fn with_easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Hold at `start` for `delay` before the clock begins
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn current(&self) -> &T {
        &self.current
    }

    pub fn end(&self) -> &T {
        &self.end
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Kill the tween where it stands; `current` keeps its last value.
    pub fn stop(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Stopped;
        }
    }

    /// Normalized (uneased) time in [0, 1]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return if self.state == PlaybackState::Finished { 1.0 } else { 0.0 };
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Advance by `dt`; returns true while still playing.
    pub fn update(&mut self, dt: Duration) -> bool {
        if self.state != PlaybackState::Playing {
            return false;
        }

        // A tick spent in the delay does not also advance the clock
        if self.delay_elapsed < self.delay {
            self.delay_elapsed += dt;
            return true;
        }

        self.elapsed += dt;

        if self.duration.is_zero() || self.elapsed >= self.duration {
            self.elapsed = self.duration;
            self.current = self.end.clone();
            self.state = PlaybackState::Finished;
            return false;
        }

        let t = self.easing.apply(self.progress());
        self.current = self.start.interpolate(&self.end, t);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_easing_endpoints() {
        for easing in [
            Easing::Linear,
            Easing::QuadInOut,
            Easing::CubicOut,
            Easing::CubicInOut,
            Easing::QuartIn,
            Easing::SineInOut,
        ] {
            assert_abs_diff_eq!(easing.apply(0.0), 0.0, epsilon = 1e-6);
            assert_abs_diff_eq!(easing.apply(1.0), 1.0, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_in_out_is_symmetric_about_midpoint() {
        for easing in [Easing::QuadInOut, Easing::CubicInOut, Easing::QuartInOut] {
            assert_abs_diff_eq!(easing.apply(0.5), 0.5, epsilon = 1e-6);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert_abs_diff_eq!(a + b, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_easing_is_monotonic() {
        let mut last = 0.0;
        for i in 1..=100 {
            let v = Easing::CubicInOut.apply(i as f32 / 100.0);
            assert!(v >= last);
            last = v;
        }
    }

    #[test]
    fn test_tween_update() {
        let mut tween = Tween::new(0.0f32, 100.0, Duration::from_millis(100));

        assert!(tween.update(Duration::from_millis(50)));
        assert_abs_diff_eq!(*tween.current(), 50.0, epsilon = 1.0);

        assert!(!tween.update(Duration::from_millis(50)));
        assert_eq!(tween.state(), PlaybackState::Finished);
        assert_eq!(*tween.current(), 100.0);
    }

    #[test]
    fn test_tween_lands_exactly_on_end() {
        let mut tween = Tween::new(0.5f64, 0.95, Duration::from_millis(1800))
            .with_easing(Easing::CubicInOut);
        while tween.update(Duration::from_millis(16)) {}
        assert_eq!(*tween.current(), 0.95);
    }

    #[test]
    fn test_tween_delay_holds_start() {
        let mut tween = Tween::new(1.0f32, 0.0, Duration::from_millis(100))
            .with_delay(Duration::from_millis(50));

        assert!(tween.update(Duration::from_millis(50)));
        assert_eq!(*tween.current(), 1.0);

        assert!(tween.update(Duration::from_millis(50)));
        assert_abs_diff_eq!(*tween.current(), 0.5, epsilon = 0.01);
    }

    #[test]
    fn test_stopped_tween_keeps_value() {
        let mut tween = Tween::new(0.0f64, 1.0, Duration::from_millis(100));
        tween.update(Duration::from_millis(30));
        let held = *tween.current();
        tween.stop();
        assert!(!tween.update(Duration::from_millis(30)));
        assert_eq!(*tween.current(), held);
        assert_eq!(tween.state(), PlaybackState::Stopped);
    }
}
