//! Scroll-event debouncer: leading-edge fire, trailing coalesce.
//!
//! Pure timing state, no business logic. The first scroll event of a burst
//! fires immediately so the opposite side is not a full frame late; every
//! further event inside the window collapses into a single trailing fire.
//! The owning actor polls `take_if_ready` and sleeps `sleep_duration`
//! between events, so cancellation is just a state reset.

use std::time::{Duration, Instant};

/// Leading + trailing debouncer over one timing window.
#[derive(Debug)]
pub struct ScrollDebouncer {
    window: Duration,
    last_fire: Option<Instant>,
    trailing_pending: bool,
}

impl ScrollDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_fire: None,
            trailing_pending: false,
        }
    }

    /// Record a scroll event. Returns `true` when the caller should fire
    /// immediately (leading edge), `false` when the event was coalesced
    /// into the pending trailing fire.
    pub fn on_event(&mut self) -> bool {
        let now = Instant::now();
        match self.last_fire {
            Some(fired) if now.duration_since(fired) < self.window => {
                self.trailing_pending = true;
                false
            }
            _ => {
                self.last_fire = Some(now);
                self.trailing_pending = false;
                true
            }
        }
    }

    /// Take the trailing fire if its window has elapsed.
    pub fn take_if_ready(&mut self) -> bool {
        if !self.trailing_pending {
            return false;
        }
        let Some(fired) = self.last_fire else {
            // Pending without a leading fire cannot happen; clear defensively
            self.trailing_pending = false;
            return false;
        };
        if fired.elapsed() < self.window {
            return false;
        }
        self.trailing_pending = false;
        self.last_fire = Some(Instant::now());
        true
    }

    /// Whether a trailing fire is still owed.
    pub fn is_pending(&self) -> bool {
        self.trailing_pending
    }

    /// Drop any pending trailing fire and forget the burst.
    pub fn cancel(&mut self) {
        self.trailing_pending = false;
        self.last_fire = None;
    }

    /// Precise sleep until the trailing fire could be ready.
    pub fn sleep_duration(&self) -> Duration {
        if !self.trailing_pending {
            return Duration::from_secs(86400);
        }
        let Some(fired) = self.last_fire else {
            return Duration::from_secs(86400);
        };
        self.window
            .saturating_sub(fired.elapsed())
            .max(Duration::from_millis(1))
    }
}
