//! Line-tagged node enumeration over rendered HTML.
//!
//! The external renderer guarantees that every block-level output node
//! carries a `data-line` attribute with its best-known originating source
//! line. This module parses an `updateContent` payload with `tl` and
//! exposes those tags as a [`PreviewSurface`]: enumeration in document
//! order plus exact-line scroll-target resolution.
//!
//! Headless by design: geometry comes from the viewport observer, never
//! from the parser. The resolved scroll target is recorded for the
//! embedding render surface to act on.

use rustc_hash::FxHashMap;

use crate::error::SyncError;
use crate::surface::{LogicalLine, NodeId, PreviewSurface};

/// Attribute carrying the originating source line.
const LINE_ATTR: &str = "data-line";

/// A parsed preview document with its line-tagged nodes.
#[derive(Debug, Default)]
pub struct HtmlPreviewDom {
    /// `data-line`-tagged nodes in document order.
    nodes: Vec<(NodeId, LogicalLine)>,
    /// Exact line → first node tagged with it.
    by_line: FxHashMap<LogicalLine, NodeId>,
    /// Last node requested at the viewport top, for the embedder.
    scroll_target: Option<(NodeId, LogicalLine)>,
}

impl HtmlPreviewDom {
    pub fn new(html: &str) -> Self {
        let mut dom = Self::default();
        dom.replace_content(html);
        dom
    }

    /// The node the engine last asked to align with the viewport top.
    pub fn scroll_target(&self) -> Option<(NodeId, LogicalLine)> {
        self.scroll_target
    }

    /// Number of line-tagged nodes in the current content.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn collect_tags(&mut self, html: &str) {
        self.nodes.clear();
        self.by_line.clear();
        self.scroll_target = None;

        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            crate::log!("render"; "content parse failed; no nodes tracked");
            return;
        };

        // dom.nodes() yields every node in document order, including the
        // nested ones; ids are positional and only valid for this render
        for (index, node) in dom.nodes().iter().enumerate() {
            let Some(tag) = node.as_tag() else {
                continue;
            };
            let Some(value) = tag
                .attributes()
                .iter()
                .find(|(key, _)| key.as_ref() == LINE_ATTR)
                .and_then(|(_, value)| value)
            else {
                continue;
            };
            let Ok(line) = value.parse::<LogicalLine>() else {
                crate::debug!("render"; "ignoring malformed {} value: {}", LINE_ATTR, value);
                continue;
            };

            let id = NodeId(index as u64);
            self.nodes.push((id, line));
            self.by_line.entry(line).or_insert(id);
        }
    }
}

impl PreviewSurface for HtmlPreviewDom {
    fn line_tagged_nodes(&self) -> Vec<(NodeId, LogicalLine)> {
        self.nodes.clone()
    }

    fn scroll_line_to_top(&mut self, line: LogicalLine) -> Result<(), SyncError> {
        match self.by_line.get(&line) {
            Some(&node) => {
                self.scroll_target = Some((node, line));
                Ok(())
            }
            None => Err(SyncError::LineNotRendered(line)),
        }
    }

    fn replace_content(&mut self, html: &str) {
        self.collect_tags(html);
    }
}
