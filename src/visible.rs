//! Visible-line cache fed by viewport-intersection transitions.
//!
//! Not a snapshot: every entry is the most recent notification for its
//! node, so staleness is bounded by the observer's own latency rather than
//! by any polling loop. Scroll handling only reads this cache; mutating it
//! never triggers a sync by itself.

use rustc_hash::FxHashMap;

use crate::surface::LogicalLine;

/// Last-known intersection geometry for one visible line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntersectionRecord {
    /// Offset of the node's top edge from the viewport top, in pixels.
    pub top: f32,
    /// Offset of the node's bottom edge from the viewport top, in pixels.
    pub bottom: f32,
    /// Visible fraction under the configured margin, 0..1.
    pub ratio: f32,
}

/// LogicalLine → latest intersection record for nodes currently
/// intersecting the (margin-shrunk) viewport.
#[derive(Debug, Default)]
pub struct VisibleLineSet {
    entries: FxHashMap<LogicalLine, IntersectionRecord>,
}

impl VisibleLineSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `line`'s node is intersecting, replacing any previous
    /// geometry. Duplicate-tagged nodes overwrite each other; only
    /// existence and position matter, not node identity.
    pub fn insert(&mut self, line: LogicalLine, record: IntersectionRecord) {
        self.entries.insert(line, record);
    }

    /// Record that `line`'s node stopped intersecting.
    pub fn remove(&mut self, line: LogicalLine) {
        self.entries.remove(&line);
    }

    /// Discard everything (content swap, teardown).
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The line whose node sits highest in the viewport without being
    /// scrolled above it.
    ///
    /// Candidates are entries with `top >= 0`; nodes above the top edge
    /// are excluded even while the margin still marks them intersecting.
    /// Minimum `top` wins; on a tie the first candidate encountered is
    /// kept (distinct nodes rarely share an identical top offset).
    pub fn select_top_visible_line(&self) -> Option<LogicalLine> {
        let mut best: Option<(LogicalLine, f32)> = None;
        for (&line, record) in &self.entries {
            if record.top < 0.0 {
                continue;
            }
            match best {
                Some((_, top)) if record.top >= top => {}
                _ => best = Some((line, record.top)),
            }
        }
        best.map(|(line, _)| line)
    }
}
