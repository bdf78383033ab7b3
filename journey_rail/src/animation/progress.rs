// animation/progress.rs - Authoritative smoothed progress and section-entry transitions

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::{lerp, DeferredRelease};
use crate::error_handling::{Result, SceneError};
use crate::sections::{Section, SectionRegistry};
use crate::types::ProgressTuning;

/// Observer of `(smoothed progress, active section id)`, rate-limited.
pub type ProgressCallback = Box<dyn FnMut(f64, &str) + Send>;

/// Crossing from one section into another
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionTransition {
    pub from: Arc<str>,
    pub to: Arc<str>,
}

/// Side effect attached to entering a section.
pub enum SectionHook {
    /// Runs on the first entry, then is dropped.
    Once(Box<dyn FnOnce(&SectionTransition) + Send>),
    /// Runs on every entry.
    Every(Box<dyn FnMut(&SectionTransition) + Send>),
}

impl SectionHook {
    pub fn once<F>(hook: F) -> Self
    where
        F: FnOnce(&SectionTransition) + Send + 'static,
    {
        SectionHook::Once(Box::new(hook))
    }

    pub fn every<F>(hook: F) -> Self
    where
        F: FnMut(&SectionTransition) + Send + 'static,
    {
        SectionHook::Every(Box::new(hook))
    }
}

/// Result of one `advance` call
#[derive(Debug, Clone, Serialize)]
pub struct ProgressUpdate {
    pub smoothed_progress: f64,
    pub target_progress: f64,
    pub active_section_id: Arc<str>,
    pub transition: Option<SectionTransition>,
    /// Observers were called this tick
    pub notified: bool,
    /// Deferred content was released this tick
    pub released_now: bool,
    pub panel_active: bool,
}

/// Owns `targetProgress`/`smoothedProgress` and the active section; mutated only by `advance`.
pub struct ProgressMachine {
    sections: SectionRegistry,
    tuning: ProgressTuning,

    target: f64,
    smoothed: f64,
    active: usize,
    last_notified: Option<(f64, usize)>,
    clock: Duration,

    listeners: Vec<ProgressCallback>,
    hooks: HashMap<usize, Vec<SectionHook>>,
    deferred: Option<DeferredRelease>,
}

impl ProgressMachine {
    pub fn new(sections: SectionRegistry, tuning: ProgressTuning) -> Self {
        let active = sections.active_index_for(0.0);
        Self {
            sections,
            tuning,
            target: 0.0,
            smoothed: 0.0,
            active,
            last_notified: None,
            clock: Duration::ZERO,
            listeners: Vec::new(),
            hooks: HashMap::new(),
            deferred: None,
        }
    }

    /// Release deferred content `delay` after the first entry into `section_id`.
    pub fn with_deferred_release(mut self, section_id: &str, delay: Duration) -> Result<Self> {
        let index = self.section_index(section_id)?;
        let id = self.sections.get(index).map(|s| s.id.clone()).unwrap_or_else(|| Arc::from(section_id));
        self.deferred = Some(DeferredRelease::new(index, id, delay));
        Ok(self)
    }

    pub fn on_progress<F>(&mut self, callback: F)
    where
        F: FnMut(f64, &str) + Send + 'static,
    {
        self.listeners.push(Box::new(callback));
    }

    pub fn on_section_enter(&mut self, section_id: &str, hook: SectionHook) -> Result<()> {
        let index = self.section_index(section_id)?;
        self.hooks.entry(index).or_default().push(hook);
        Ok(())
    }

    /// One tick: clamp the target, approach it by the smoothing factor, resolve the section,
    /// fire transition hooks, poll the deferred release and notify observers if warranted.
    pub fn advance(&mut self, target: f64, dt: Duration) -> ProgressUpdate {
        self.clock += dt;
        if !target.is_nan() {
            self.target = target.clamp(0.0, 1.0);
        }
        self.smoothed = lerp(self.smoothed, self.target, self.tuning.smoothing).clamp(0.0, 1.0);

        let index = self.sections.active_index_for(self.smoothed);
        let transition = (index != self.active).then(|| self.enter_section(index));

        let released_now = match self.deferred.as_mut() {
            Some(deferred) => deferred.poll(self.clock),
            None => false,
        };

        let section_id = self.active_section().id.clone();
        let notified = self.should_notify();
        if notified {
            for listener in &mut self.listeners {
                listener(self.smoothed, &section_id);
            }
            self.last_notified = Some((self.smoothed, self.active));
        }

        ProgressUpdate {
            smoothed_progress: self.smoothed,
            target_progress: self.target,
            active_section_id: section_id,
            transition,
            notified,
            released_now,
            panel_active: self.panel_active(),
        }
    }

    fn enter_section(&mut self, index: usize) -> SectionTransition {
        let from = self.active_section().id.clone();
        self.active = index;
        let transition = SectionTransition {
            from,
            to: self.active_section().id.clone(),
        };
        log::debug!(
            "Section transition {} -> {} at progress {:.4}",
            transition.from,
            transition.to,
            self.smoothed
        );

        if let Some(hooks) = self.hooks.remove(&index) {
            let mut kept = Vec::with_capacity(hooks.len());
            for hook in hooks {
                match hook {
                    SectionHook::Once(hook) => hook(&transition),
                    SectionHook::Every(mut hook) => {
                        hook(&transition);
                        kept.push(SectionHook::Every(hook));
                    }
                }
            }
            if !kept.is_empty() {
                self.hooks.insert(index, kept);
            }
        }

        if let Some(deferred) = self.deferred.as_mut() {
            deferred.on_section_enter(index, self.clock);
        }
        transition
    }

    fn should_notify(&self) -> bool {
        match self.last_notified {
            None => true,
            Some((progress, section)) => {
                section != self.active || (self.smoothed - progress).abs() > self.tuning.notify_threshold
            }
        }
    }

    fn section_index(&self, section_id: &str) -> Result<usize> {
        self.sections
            .index_of(section_id)
            .ok_or_else(|| SceneError::UnknownSection(section_id.to_string()))
    }

    /// Disarm the pending deferred release.
    pub fn teardown(&mut self) {
        if let Some(deferred) = self.deferred.as_mut() {
            deferred.cancel();
        }
    }

    pub fn smoothed(&self) -> f64 {
        self.smoothed
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_section(&self) -> &Section {
        self.sections.get(self.active).unwrap_or_else(|| self.sections.first())
    }

    pub fn panel_active(&self) -> bool {
        self.sections.panel_active(self.active, self.smoothed, self.tuning.panel_range)
    }

    pub fn sections(&self) -> &SectionRegistry {
        &self.sections
    }

    pub fn clock(&self) -> Duration {
        self.clock
    }

    pub fn deferred_released(&self) -> bool {
        self.deferred.as_ref().map(DeferredRelease::is_released).unwrap_or(false)
    }

    pub fn deferred_pending(&self) -> bool {
        self.deferred.as_ref().map(DeferredRelease::is_pending).unwrap_or(false)
    }
}
