//! Capability traits at the editor/preview boundary.
//!
//! The sync engine never touches an editor buffer or a DOM directly. Both
//! sides are reached through narrow traits so the state machines can be
//! driven in tests by fakes that fire events synchronously:
//!
//! - [`EditorSurface`]: visible-range control of one editor document
//! - [`PreviewSurface`]: line-tagged node lookup and instantaneous scroll
//! - [`ViewportObserver`]: native viewport-intersection subscription
//!
//! Intersection notifications do not flow through a callback on the trait;
//! they arrive as [`IntersectionEvent`] batches on the render actor's event
//! channel, which keeps the tracker single-threaded and re-entrancy free.

use std::fmt;

use crate::error::SyncError;

/// Index of a line in the original source document.
///
/// The shared synchronization key between editor positions and rendered
/// nodes. Wire payloads carry `i64` so out-of-range inbound values can be
/// clamped before they become a `LogicalLine`.
pub type LogicalLine = u32;

/// Identity of one rendered node, assigned at enumeration time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identity of the document under sync.
///
/// Host-side viewport events carry one of these; events for any other
/// document are ignored by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for DocumentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for DocumentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Editor side
// =============================================================================

/// Editor integration boundary for one document.
pub trait EditorSurface {
    /// Total number of lines in the document, used for inbound clamping.
    fn line_count(&self) -> u32;

    /// Move the viewport so `line` becomes the first visible line.
    ///
    /// Top-alignment, no centering: avoids an extra position calculation
    /// and keeps the editor/preview mapping trivially comparable.
    fn reveal_line_at_top(&mut self, line: LogicalLine) -> Result<(), SyncError>;
}

// =============================================================================
// Preview side
// =============================================================================

/// Rendered-preview boundary: line-tagged node lookup and scrolling.
pub trait PreviewSurface {
    /// All nodes carrying a line tag, in document order.
    fn line_tagged_nodes(&self) -> Vec<(NodeId, LogicalLine)>;

    /// Instantaneous (non-animated) scroll of the node tagged exactly
    /// `line` to the viewport's top edge.
    ///
    /// Exact match only; `Err(LineNotRendered)` when the line was never
    /// block-tagged by the renderer.
    fn scroll_line_to_top(&mut self, line: LogicalLine) -> Result<(), SyncError>;

    /// Replace the rendered content wholesale (`updateContent`).
    fn replace_content(&mut self, html: &str);
}

/// Native viewport-intersection subscription.
///
/// A thin seam over `IntersectionObserver`-style primitives so the tracker
/// can be unit-tested with a fake that fires events synchronously.
pub trait ViewportObserver {
    /// Shrink the effective viewport by `percent` on the top and bottom
    /// edges. Nodes barely clipped at an edge then never count as visible,
    /// which avoids flicker at viewport boundaries.
    fn set_margin_percent(&mut self, percent: u8);

    /// Start receiving intersection transitions for `node`.
    fn observe(&mut self, node: NodeId);

    /// Stop receiving transitions for `node`.
    fn unobserve(&mut self, node: NodeId) -> Result<(), SyncError>;

    /// Drop every subscription at once.
    fn disconnect(&mut self) -> Result<(), SyncError>;
}

/// One intersection transition reported by the observer.
///
/// `top`/`bottom` are pixel offsets of the node's bounding rect relative to
/// the viewport's top edge; `ratio` is the visible fraction under the
/// configured margin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionEvent {
    pub node: NodeId,
    pub is_intersecting: bool,
    pub top: f32,
    pub bottom: f32,
    pub ratio: f32,
}

impl IntersectionEvent {
    /// An entering transition.
    pub fn enter(node: NodeId, top: f32, bottom: f32, ratio: f32) -> Self {
        Self {
            node,
            is_intersecting: true,
            top,
            bottom,
            ratio,
        }
    }

    /// A leaving transition. Geometry is the last known rect.
    pub fn leave(node: NodeId, top: f32, bottom: f32) -> Self {
        Self {
            node,
            is_intersecting: false,
            top,
            bottom,
            ratio: 0.0,
        }
    }
}
