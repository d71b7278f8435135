//! Echo-suppression lock shared by both controllers.
//!
//! Each controller arms its lock after an outbound sync (or while applying
//! an inbound one) so that the reflected event its own action provokes is
//! recognized and dropped instead of ping-ponged back. The lock expires on
//! its own after the block window: expiry is checked lazily at every use
//! site, so no timer task exists and a missing "settled" signal can deafen
//! a side to genuine user input for at most one window.

use std::time::{Duration, Instant};

/// Which side caused the scroll currently being propagated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollSource {
    Editor,
    Preview,
}

impl ScrollSource {
    pub fn label(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Preview => "preview",
        }
    }
}

/// Tagged lock state: `Inactive` or `Active(source, expires_at)`.
///
/// Modeled explicitly rather than as ad hoc booleans so the suppression
/// invariant stays auditable and testable away from any UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncLock {
    Inactive,
    Active {
        source: ScrollSource,
        expires_at: Instant,
    },
}

impl SyncLock {
    pub fn new() -> Self {
        Self::Inactive
    }

    /// Arm for `window` starting now, replacing any previous state.
    pub fn arm(&mut self, source: ScrollSource, window: Duration) {
        *self = Self::Active {
            source,
            expires_at: Instant::now() + window,
        };
    }

    /// Release immediately (teardown, disable, failed apply).
    pub fn release(&mut self) {
        *self = Self::Inactive;
    }

    /// Source currently holding the lock, `None` if inactive or expired.
    pub fn active_source(&self) -> Option<ScrollSource> {
        match self {
            Self::Inactive => None,
            Self::Active { source, expires_at } => {
                (Instant::now() < *expires_at).then_some(*source)
            }
        }
    }

    /// True if an unexpired lock held by `source` should suppress the
    /// event being considered.
    pub fn blocks(&self, source: ScrollSource) -> bool {
        self.active_source() == Some(source)
    }
}

impl Default for SyncLock {
    fn default() -> Self {
        Self::new()
    }
}
