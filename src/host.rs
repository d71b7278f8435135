//! Host Sync Controller - editor side of the protocol.
//!
//! Keeps the editor's visible top line consistent with the preview. Pure,
//! synchronous state machine: viewport events come in, at most one outbound
//! [`SyncMessage`] comes out, and inbound lines are applied through the
//! [`EditorSurface`] seam. The actor layer owns the channel IO.
//!
//! ```text
//! viewport change --> on_viewport_changed --> syncScrollToLine -->
//! previewScrolledToLine --> on_inbound_line --> editor.reveal_line_at_top
//! ```

use std::time::Duration;

use crate::config::SyncConfig;
use crate::lock::{ScrollSource, SyncLock};
use crate::protocol::SyncMessage;
use crate::surface::{DocumentId, EditorSurface, LogicalLine};

/// Editor-side sync controller for one document.
pub struct HostSyncController<E: EditorSurface> {
    editor: E,
    document: DocumentId,
    block_window: Duration,
    enabled: bool,
    lock: SyncLock,
    current_top_line: Option<LogicalLine>,
}

impl<E: EditorSurface> HostSyncController<E> {
    pub fn new(editor: E, document: DocumentId, config: &SyncConfig) -> Self {
        Self {
            editor,
            document,
            block_window: config.block_window(),
            enabled: true,
            lock: SyncLock::new(),
            current_top_line: None,
        }
    }

    /// The editor's visible range changed; `top_line` is the new first
    /// visible line.
    ///
    /// Returns the outbound message for the render side, or `None` when
    /// the event is disabled, for another document, an echo of a
    /// preview-driven scroll, or a repeat of the current line.
    pub fn on_viewport_changed(
        &mut self,
        document: &DocumentId,
        top_line: LogicalLine,
    ) -> Option<SyncMessage> {
        if !self.enabled || document != &self.document {
            return None;
        }
        if self.lock.blocks(ScrollSource::Preview) {
            crate::debug!("host"; "viewport change suppressed (preview lock)");
            return None;
        }
        if self.current_top_line == Some(top_line) {
            return None;
        }

        self.current_top_line = Some(top_line);
        self.lock.arm(ScrollSource::Editor, self.block_window);
        Some(SyncMessage::sync_scroll_to_line(top_line))
    }

    /// A `previewScrolledToLine` message arrived from the render side.
    ///
    /// Clamps into the document and top-aligns the editor viewport.
    /// Failures are logged and degrade to a no-op; they never escape.
    pub fn on_inbound_line(&mut self, line: i64) {
        if !self.enabled {
            return;
        }
        if self.lock.blocks(ScrollSource::Editor) {
            crate::debug!("host"; "inbound line {} suppressed (own echo window)", line);
            return;
        }

        self.lock.arm(ScrollSource::Preview, self.block_window);

        let count = self.editor.line_count();
        if count == 0 {
            crate::debug!("host"; "inbound line {} dropped: empty document", line);
            self.lock.release();
            return;
        }
        let clamped = line.clamp(0, i64::from(count) - 1) as LogicalLine;

        if let Err(e) = self.editor.reveal_line_at_top(clamped) {
            crate::log!("host"; "scroll to line {} failed: {}", clamped, e);
            // Next real scroll event retries naturally
            self.lock.release();
            return;
        }
        self.current_top_line = Some(clamped);
    }

    /// Toggle synchronization. Disabling clears the lock so a stale echo
    /// window cannot outlive the toggle; enabling sends nothing until the
    /// next natural event.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.lock.release();
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_top_line(&self) -> Option<LogicalLine> {
        self.current_top_line
    }

    pub fn document(&self) -> &DocumentId {
        &self.document
    }

    pub fn editor(&self) -> &E {
        &self.editor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::SyncError;

    struct FakeEditor {
        lines: u32,
        revealed: Vec<LogicalLine>,
        fail: bool,
    }

    impl FakeEditor {
        fn new(lines: u32) -> Self {
            Self {
                lines,
                revealed: Vec::new(),
                fail: false,
            }
        }
    }

    impl EditorSurface for FakeEditor {
        fn line_count(&self) -> u32 {
            self.lines
        }

        fn reveal_line_at_top(&mut self, line: LogicalLine) -> Result<(), SyncError> {
            if self.fail {
                return Err(SyncError::EditorUnavailable(DocumentId::from("gone.md")));
            }
            self.revealed.push(line);
            Ok(())
        }
    }

    fn controller(lines: u32) -> HostSyncController<FakeEditor> {
        HostSyncController::new(
            FakeEditor::new(lines),
            DocumentId::from("doc.md"),
            &SyncConfig::default(),
        )
    }

    fn doc() -> DocumentId {
        DocumentId::from("doc.md")
    }

    #[test]
    fn test_viewport_change_emits_and_records() {
        let mut host = controller(100);
        let msg = host.on_viewport_changed(&doc(), 42);
        assert_eq!(msg, Some(SyncMessage::SyncScrollToLine { line: 42 }));
        assert_eq!(host.current_top_line(), Some(42));
    }

    #[test]
    fn test_repeat_line_is_deduped() {
        let mut host = controller(100);
        assert!(host.on_viewport_changed(&doc(), 42).is_some());
        std::thread::sleep(Duration::from_millis(35));
        assert_eq!(host.on_viewport_changed(&doc(), 42), None);
    }

    #[test]
    fn test_other_document_ignored() {
        let mut host = controller(100);
        assert_eq!(
            host.on_viewport_changed(&DocumentId::from("other.md"), 5),
            None
        );
    }

    #[test]
    fn test_disabled_ignores_everything() {
        let mut host = controller(100);
        host.set_enabled(false);
        assert_eq!(host.on_viewport_changed(&doc(), 5), None);
        host.on_inbound_line(5);
        assert!(host.editor().revealed.is_empty());
    }

    #[test]
    fn test_inbound_clamps_high_and_low() {
        let mut host = controller(10);
        host.on_inbound_line(9999);
        assert_eq!(host.editor().revealed, vec![9]);
        assert_eq!(host.current_top_line(), Some(9));

        std::thread::sleep(Duration::from_millis(35));
        host.on_inbound_line(-3);
        assert_eq!(host.editor().revealed, vec![9, 0]);
        assert_eq!(host.current_top_line(), Some(0));
    }

    #[test]
    fn test_own_echo_window_suppresses_inbound() {
        let mut host = controller(100);
        // Outbound sync arms the editor lock...
        assert!(host.on_viewport_changed(&doc(), 42).is_some());
        // ...so a reflected inbound inside the window is dropped
        host.on_inbound_line(42);
        assert!(host.editor().revealed.is_empty());
    }

    #[test]
    fn test_inbound_suppresses_echo_viewport_event() {
        let mut host = controller(100);
        host.on_inbound_line(30);
        assert_eq!(host.editor().revealed, vec![30]);
        // The reveal itself fires a viewport event; preview lock eats it
        assert_eq!(host.on_viewport_changed(&doc(), 30), None);
        assert_eq!(host.on_viewport_changed(&doc(), 31), None);
    }

    #[test]
    fn test_lock_expires_within_block_window() {
        let config = SyncConfig {
            block_window_ms: 10,
            ..SyncConfig::default()
        };
        let mut host = HostSyncController::new(FakeEditor::new(100), doc(), &config);

        host.on_inbound_line(30);
        std::thread::sleep(Duration::from_millis(20));
        // Window over: genuine user scrolling is processed again
        assert!(host.on_viewport_changed(&doc(), 55).is_some());
    }

    #[test]
    fn test_editor_failure_releases_lock_immediately() {
        let mut host = controller(100);
        host.editor.fail = true;
        host.on_inbound_line(30);
        assert_eq!(host.current_top_line(), None);
        // Lock was released, not left to expire: the very next viewport
        // event goes through
        assert!(host.on_viewport_changed(&doc(), 12).is_some());
    }

    #[test]
    fn test_empty_document_drops_inbound() {
        let mut host = controller(0);
        host.on_inbound_line(5);
        assert!(host.editor().revealed.is_empty());
        assert!(host.on_viewport_changed(&doc(), 1).is_some());
    }
}
