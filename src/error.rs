//! Error taxonomy for the sync engine.
//!
//! Nothing in this crate lets an error abort the hosting session: every
//! operation is best-effort and self-correcting on the next natural event.
//! These types exist so failures can be logged with precision and asserted
//! on in tests, not so they can propagate.

use thiserror::Error;

use crate::surface::{DocumentId, LogicalLine};

/// Errors surfaced by editor/preview capability implementations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// No editor instance matches the tracked document.
    ///
    /// Transient: the lock is released immediately and the next real
    /// scroll event retries naturally.
    #[error("no editor available for document `{0}`")]
    EditorUnavailable(DocumentId),

    /// No rendered node carries the requested line tag.
    ///
    /// Expected for mid-paragraph lines that the renderer never tags;
    /// treated as a no-op with the lock still released on schedule.
    #[error("no rendered node tagged with line {0}")]
    LineNotRendered(LogicalLine),

    /// The duplex channel to the opposite side is gone or full.
    ///
    /// The message is dropped without retry; the next scroll event
    /// naturally resends the current position.
    #[error("sync transport unavailable")]
    TransportUnavailable,

    /// A single resource failed to release during teardown.
    ///
    /// Caught per-resource so one failing listener cannot leak the rest.
    #[error("teardown failed for {0}")]
    Teardown(String),
}
