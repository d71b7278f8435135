//! Scroll Sync Message Protocol
//!
//! Defines the JSON message format exchanged between the host (editor) side
//! and the render (preview) side.
//!
//! # Message Types
//!
//! - `syncScrollToLine`: editor scrolled; preview should follow
//! - `previewScrolledToLine`: preview scrolled; editor should follow
//! - `updateScrollSyncState`: toggle sync on/off
//! - `updateContent`: full content replace; triggers re-enumeration
//!
//! The transport is an opaque duplex channel: FIFO per direction, no
//! ordering guarantee between the two directions, no back-pressure.

use serde::{Deserialize, Serialize};

/// Sync message sent over the duplex channel.
///
/// Line payloads are `i64` on the wire: a peer may send values outside the
/// document, and each receiving side decides whether to clamp (editor) or
/// treat as unmatched (preview).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SyncMessage {
    /// Editor scrolled; preview should follow (host → render).
    SyncScrollToLine { line: i64 },

    /// Preview scrolled; editor should follow (render → host).
    PreviewScrolledToLine { line: i64 },

    /// Toggle synchronization on or off (host → render).
    UpdateScrollSyncState { enabled: bool },

    /// Full content replacement (host → render).
    UpdateContent { content: String },
}

impl SyncMessage {
    /// Create a host → render scroll message.
    pub fn sync_scroll_to_line(line: u32) -> Self {
        Self::SyncScrollToLine { line: line.into() }
    }

    /// Create a render → host scroll message.
    pub fn preview_scrolled_to_line(line: u32) -> Self {
        Self::PreviewScrolledToLine { line: line.into() }
    }

    /// Create a sync-state toggle message.
    pub fn update_state(enabled: bool) -> Self {
        Self::UpdateScrollSyncState { enabled }
    }

    /// Create a content replacement message.
    pub fn update_content(content: impl Into<String>) -> Self {
        Self::UpdateContent {
            content: content.into(),
        }
    }

    /// Serialize to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self)
            .unwrap_or_else(|_| r#"{"type":"updateScrollSyncState","enabled":false}"#.to_string())
    }

    /// Parse from JSON string
    pub fn from_json(s: &str) -> Option<Self> {
        serde_json::from_str(s).ok()
    }
}
