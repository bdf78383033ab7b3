// animation/checkpoint_navigator.rs - Discrete checkpoint stepping with one tween in flight

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{Easing, Tween};
use crate::error_handling::{Result, SceneError};
use crate::types::NavigatorTuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Forward,
    Backward,
}

impl FromStr for StepDirection {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "forward" | "next" => Ok(StepDirection::Forward),
            "backward" | "back" | "prev" => Ok(StepDirection::Backward),
            other => Err(format!("unknown step direction '{other}'")),
        }
    }
}

impl fmt::Display for StepDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepDirection::Forward => f.write_str("forward"),
            StepDirection::Backward => f.write_str("backward"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigatorState {
    Idle,
    Animating,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Started { from: f64, to: f64, index: usize },
    /// Already at the first or last checkpoint
    AtBoundary,
    /// A transition is in flight; the request was dropped
    Busy,
}

/// Steps the authoritative target progress between checkpoints.
///
/// While a tween runs every further step is rejected, not queued.
#[derive(Debug, Clone)]
pub struct CheckpointNavigator {
    checkpoints: Vec<f64>,
    index: usize,
    tween: Option<Tween<f64>>,
    duration: Duration,
    easing: Easing,
}

impl CheckpointNavigator {
    pub fn new(checkpoints: Vec<f64>, tuning: &NavigatorTuning) -> Result<Self> {
        if checkpoints.is_empty() {
            return Err(SceneError::InvalidParameter {
                name: "checkpoints",
                reason: "no checkpoints to navigate".to_string(),
            });
        }
        if let Some(bad) = checkpoints.iter().find(|c| !(0.0..=1.0).contains(*c)) {
            return Err(SceneError::InvalidParameter {
                name: "checkpoints",
                reason: format!("{bad} is outside [0, 1]"),
            });
        }
        Ok(Self {
            checkpoints,
            index: 0,
            tween: None,
            duration: Duration::from_millis(tuning.duration_ms),
            easing: tuning.easing,
        })
    }

    pub fn step(&mut self, direction: StepDirection, current_target: f64) -> StepOutcome {
        if self.is_animating() {
            log::warn!("Ignoring {direction} step: transition to checkpoint {} in flight", self.index);
            return StepOutcome::Busy;
        }

        let last = self.checkpoints.len() - 1;
        let next = match direction {
            StepDirection::Forward => (self.index + 1).min(last),
            StepDirection::Backward => self.index.saturating_sub(1),
        };
        if next == self.index {
            log::debug!("Already at checkpoint {next}, {direction} step is a no-op");
            return StepOutcome::AtBoundary;
        }

        let from = current_target.clamp(0.0, 1.0);
        let to = self.checkpoints[next];
        self.index = next;
        self.tween = Some(Tween::new(from, to, self.duration).with_easing(self.easing));
        log::debug!("Stepping {direction} to checkpoint {next}: {from:.3} -> {to:.3}");

        StepOutcome::Started { from, to, index: next }
    }

    pub fn step_forward(&mut self, current_target: f64) -> StepOutcome {
        self.step(StepDirection::Forward, current_target)
    }

    pub fn step_backward(&mut self, current_target: f64) -> StepOutcome {
        self.step(StepDirection::Backward, current_target)
    }

    /// Advance the in-flight tween; yields the new target progress while one is running,
    /// including the exact checkpoint value on the completing tick.
    pub fn update(&mut self, dt: Duration) -> Option<f64> {
        let tween = self.tween.as_mut()?;
        tween.update(dt);
        let value = *tween.current();
        if !tween.is_active() {
            self.tween = None;
            log::debug!("Reached checkpoint {} at {value:.3}", self.index);
        }
        Some(value)
    }

    /// Kill the in-flight tween and return to Idle; the target stays where the tween left it.
    pub fn cancel(&mut self) {
        if let Some(mut tween) = self.tween.take() {
            tween.stop();
            log::debug!("Cancelled transition to checkpoint {}", self.index);
        }
    }

    pub fn is_animating(&self) -> bool {
        self.tween.is_some()
    }

    pub fn state(&self) -> NavigatorState {
        if self.is_animating() {
            NavigatorState::Animating
        } else {
            NavigatorState::Idle
        }
    }

    pub fn current_index(&self) -> usize {
        self.index
    }

    pub fn checkpoints(&self) -> &[f64] {
        &self.checkpoints
    }
}
