//! Actor Event Definitions
//!
//! Events the embedding application feeds into each actor. Protocol
//! messages between the two sides are [`SyncMessage`]s and travel on the
//! duplex channel, never through these enums.
//!
//! [`SyncMessage`]: crate::protocol::SyncMessage

use smallvec::SmallVec;

use crate::surface::{DocumentId, IntersectionEvent, LogicalLine};

/// Events for the host (editor-side) actor.
#[derive(Debug)]
pub enum HostEvent {
    /// The editor's visible range changed.
    ViewportChanged {
        document: DocumentId,
        top_line: LogicalLine,
    },
    /// The renderer produced fresh HTML; forwarded to the render side as
    /// `updateContent`.
    ContentRendered { html: String },
    /// Toggle synchronization on both sides.
    SetEnabled(bool),
    /// End the session.
    Shutdown,
}

/// Events for the render (preview-side) actor.
#[derive(Debug)]
pub enum RenderEvent {
    /// A native viewport scroll notification fired.
    Scrolled,
    /// A batch of intersection transitions from the viewport observer.
    Intersections(SmallVec<[IntersectionEvent; 8]>),
    /// End the session.
    Shutdown,
}
