// animation/scheduler.rs - One-shot events on the tick clock

use std::sync::Arc;
use std::time::Duration;

/// Fires once when the tick clock reaches `fire_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledEvent {
    fire_at: Duration,
    fired: bool,
}

impl ScheduledEvent {
    pub fn at(fire_at: Duration) -> Self {
        Self { fire_at, fired: false }
    }

    pub fn fire_at(&self) -> Duration {
        self.fire_at
    }

    pub fn has_fired(&self) -> bool {
        self.fired
    }

    /// True on the first poll at or after `fire_at`, false forever after.
    pub fn poll(&mut self, now: Duration) -> bool {
        if self.fired || now < self.fire_at {
            return false;
        }
        self.fired = true;
        true
    }
}

/// Releases deferred scene content a fixed delay after the first entry into one section.
///
/// At most one release per scene lifetime: re-entering the section while a release is
/// pending or after it happened schedules nothing.
#[derive(Debug, Clone)]
pub struct DeferredRelease {
    section: usize,
    section_id: Arc<str>,
    delay: Duration,
    pending: Option<ScheduledEvent>,
    released: bool,
    cancelled: bool,
}

impl DeferredRelease {
    pub fn new(section: usize, section_id: Arc<str>, delay: Duration) -> Self {
        Self {
            section,
            section_id,
            delay,
            pending: None,
            released: false,
            cancelled: false,
        }
    }

    pub fn on_section_enter(&mut self, section: usize, now: Duration) {
        if section != self.section || self.released || self.cancelled || self.pending.is_some() {
            return;
        }
        log::debug!(
            "Entered '{}', releasing deferred content in {:?}",
            self.section_id,
            self.delay
        );
        self.pending = Some(ScheduledEvent::at(now + self.delay));
    }

    /// Returns true on the tick the release happens.
    pub fn poll(&mut self, now: Duration) -> bool {
        let Some(event) = self.pending.as_mut() else {
            return false;
        };
        if !event.poll(now) {
            return false;
        }
        self.pending = None;
        self.released = true;
        log::info!("Deferred content released after entering '{}'", self.section_id);
        true
    }

    /// Disarm on teardown; nothing fires afterwards.
    pub fn cancel(&mut self) {
        if self.pending.take().is_some() {
            log::debug!("Cancelled pending release for '{}'", self.section_id);
        }
        self.cancelled = true;
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn section(&self) -> usize {
        self.section
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_event_fires_once() {
        let mut event = ScheduledEvent::at(ms(100));
        assert!(!event.poll(ms(99)));
        assert!(event.poll(ms(100)));
        assert!(!event.poll(ms(200)));
        assert!(event.has_fired());
    }

    #[test]
    fn test_release_after_delay() {
        let mut release = DeferredRelease::new(2, Arc::from("interests"), ms(1900));
        release.on_section_enter(1, ms(0));
        assert!(!release.is_pending());

        release.on_section_enter(2, ms(100));
        assert!(release.is_pending());
        assert!(!release.poll(ms(1999)));
        assert!(release.poll(ms(2000)));
        assert!(release.is_released());
    }

    #[test]
    fn test_reentry_does_not_reschedule() {
        let mut release = DeferredRelease::new(0, Arc::from("a"), ms(500));
        release.on_section_enter(0, ms(0));
        release.on_section_enter(0, ms(400));
        assert!(release.poll(ms(500)));

        release.on_section_enter(0, ms(1000));
        assert!(!release.is_pending());
        assert!(!release.poll(ms(5000)));
    }

    #[test]
    fn test_cancel_prevents_release() {
        let mut release = DeferredRelease::new(0, Arc::from("a"), ms(500));
        release.on_section_enter(0, ms(0));
        release.cancel();
        assert!(!release.poll(ms(1000)));
        release.on_section_enter(0, ms(1000));
        assert!(!release.poll(ms(3000)));
        assert!(!release.is_released());
    }
}
