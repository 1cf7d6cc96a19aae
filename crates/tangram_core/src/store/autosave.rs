//! Trailing-edge debounce primitive for autosave.
//!
//! # Responsibility
//! - Coalesce bursts of scene mutations into a single pending save.
//! - Report when the pending save is due so the host loop can run it.
//!
//! # Invariants
//! - At most one save is pending at a time; requests while armed are
//!   absorbed without extending the deadline.
//! - The saved snapshot is taken when the deadline expires, not when the
//!   first request arrived; callers pass the scene at fire time.

use std::time::{Duration, Instant};

/// Delay between the first mutation in a burst and the persisted save.
pub const DEFAULT_AUTOSAVE_DELAY: Duration = Duration::from_millis(100);

/// Single-slot trailing-edge debounce.
#[derive(Debug)]
pub struct AutosaveScheduler {
    delay: Duration,
    deadline: Option<Instant>,
}

impl AutosaveScheduler {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Arms the scheduler if idle. Requests while a save is already pending
    /// coalesce into it.
    pub fn request(&mut self, now: Instant) {
        if self.deadline.is_none() {
            self.deadline = Some(now + self.delay);
        }
    }

    /// Disarms and reports `true` once the pending deadline has passed.
    pub fn fire_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }
}

impl Default for AutosaveScheduler {
    fn default() -> Self {
        Self::new(DEFAULT_AUTOSAVE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::AutosaveScheduler;
    use std::time::{Duration, Instant};

    const DELAY: Duration = Duration::from_millis(100);

    #[test]
    fn fires_once_after_the_delay() {
        let mut scheduler = AutosaveScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.request(start);
        assert!(!scheduler.fire_due(start));
        assert!(!scheduler.fire_due(start + Duration::from_millis(99)));
        assert!(scheduler.fire_due(start + DELAY));
        // Disarmed after firing.
        assert!(!scheduler.fire_due(start + Duration::from_secs(1)));
    }

    #[test]
    fn repeated_requests_coalesce_without_extending_the_deadline() {
        let mut scheduler = AutosaveScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.request(start);
        scheduler.request(start + Duration::from_millis(50));
        scheduler.request(start + Duration::from_millis(90));

        // Still due at the original deadline, and exactly once.
        assert!(scheduler.fire_due(start + DELAY));
        assert!(!scheduler.fire_due(start + 2 * DELAY));
    }

    #[test]
    fn cancel_clears_the_pending_save() {
        let mut scheduler = AutosaveScheduler::new(DELAY);
        let start = Instant::now();

        scheduler.request(start);
        assert!(scheduler.is_pending());
        scheduler.cancel();
        assert!(!scheduler.is_pending());
        assert!(!scheduler.fire_due(start + 2 * DELAY));
    }
}
