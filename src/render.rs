//! Render Visibility Tracker - preview side of the protocol.
//!
//! Keeps the preview's visible top line consistent with the editor using
//! passive visibility observation instead of on-demand geometry queries:
//! intersection transitions maintain the [`VisibleLineSet`] cache, and the
//! scroll handler only ever reads that cache.
//!
//! # Phases
//!
//! ```text
//! Uninitialized --start--> Tracking --content swap--> Settling --deadline--> Tracking
//! ```
//!
//! A content swap disconnects the observer and clears every per-render
//! structure before the settle delay, so stale entries referencing removed
//! nodes cannot survive into the next render.

use std::time::{Duration, Instant};

use rustc_hash::FxHashMap;

use crate::config::SyncConfig;
use crate::debounce::ScrollDebouncer;
use crate::lock::{ScrollSource, SyncLock};
use crate::protocol::SyncMessage;
use crate::surface::{IntersectionEvent, LogicalLine, NodeId, PreviewSurface, ViewportObserver};
use crate::visible::{IntersectionRecord, VisibleLineSet};

/// Observation lifecycle for one rendered document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TrackerPhase {
    /// No content observed yet.
    Uninitialized,
    /// Content swapped; waiting for the new DOM to settle.
    Settling { deadline: Instant },
    /// Nodes enumerated and observed; cache is live.
    Tracking,
}

/// Preview-side sync controller.
pub struct RenderVisibilityTracker<P: PreviewSurface, O: ViewportObserver> {
    preview: P,
    observer: O,
    block_window: Duration,
    settle_delay: Duration,
    margin_percent: u8,
    enabled: bool,
    lock: SyncLock,
    current_top_line: Option<LogicalLine>,
    visible: VisibleLineSet,
    /// Observed node → originating line, rebuilt at each enumeration.
    nodes: FxHashMap<NodeId, LogicalLine>,
    debouncer: ScrollDebouncer,
    phase: TrackerPhase,
}

impl<P: PreviewSurface, O: ViewportObserver> RenderVisibilityTracker<P, O> {
    pub fn new(preview: P, observer: O, config: &SyncConfig) -> Self {
        Self {
            preview,
            observer,
            block_window: config.block_window(),
            settle_delay: config.settle_delay(),
            margin_percent: config.margin_percent,
            enabled: true,
            lock: SyncLock::new(),
            current_top_line: None,
            visible: VisibleLineSet::new(),
            nodes: FxHashMap::default(),
            debouncer: ScrollDebouncer::new(config.scroll_debounce()),
            phase: TrackerPhase::Uninitialized,
        }
    }

    /// Enumerate line-tagged nodes and start observing them.
    ///
    /// Called once when content first becomes available, and again after
    /// every settle delay. An empty document is fine: the tracker just
    /// never selects a top line.
    pub fn start(&mut self) {
        self.observer.set_margin_percent(self.margin_percent);
        for (node, line) in self.preview.line_tagged_nodes() {
            self.nodes.insert(node, line);
            self.observer.observe(node);
        }
        self.phase = TrackerPhase::Tracking;
        crate::debug!("render"; "tracking {} line-tagged nodes", self.nodes.len());
    }

    /// Full content replacement (`updateContent`).
    ///
    /// Tears down observation and schedules re-enumeration after the
    /// settle delay; [`poll`](Self::poll) performs the restart.
    pub fn on_content_replaced(&mut self, html: &str) {
        self.teardown_observation();
        self.visible.clear();
        self.nodes.clear();
        self.current_top_line = None;
        self.preview.replace_content(html);
        self.phase = TrackerPhase::Settling {
            deadline: Instant::now() + self.settle_delay,
        };
    }

    /// A batch of intersection transitions from the observer.
    ///
    /// Pure cache mutation; never emits. Notifications that race a content
    /// swap (unknown node, or tracker not in Tracking) are stale and
    /// dropped.
    pub fn on_intersections(&mut self, events: &[IntersectionEvent]) {
        if self.phase != TrackerPhase::Tracking {
            return;
        }
        for event in events {
            let Some(&line) = self.nodes.get(&event.node) else {
                continue;
            };
            if event.is_intersecting {
                self.visible.insert(
                    line,
                    IntersectionRecord {
                        top: event.top,
                        bottom: event.bottom,
                        ratio: event.ratio,
                    },
                );
            } else {
                self.visible.remove(line);
            }
        }
    }

    /// A viewport scroll notification.
    ///
    /// Leading-edge fire on the first event of a burst, trailing coalesce
    /// for the rest (collected by [`poll`](Self::poll)).
    pub fn on_scroll(&mut self) -> Option<SyncMessage> {
        if !self.enabled {
            return None;
        }
        if self.lock.blocks(ScrollSource::Editor) {
            crate::debug!("render"; "scroll suppressed (editor lock)");
            return None;
        }
        if self.debouncer.on_event() {
            self.emit_top_line()
        } else {
            None
        }
    }

    /// Service due timers: the settle deadline and the trailing debounce
    /// fire. The owning actor calls this whenever
    /// [`sleep_duration`](Self::sleep_duration) elapses.
    pub fn poll(&mut self) -> Option<SyncMessage> {
        if let TrackerPhase::Settling { deadline } = self.phase
            && Instant::now() >= deadline
        {
            self.start();
        }
        if self.debouncer.take_if_ready() {
            if !self.enabled || self.lock.blocks(ScrollSource::Editor) {
                return None;
            }
            return self.emit_top_line();
        }
        None
    }

    /// How long the actor may sleep before a timer needs servicing.
    pub fn sleep_duration(&self) -> Duration {
        let debounce = self.debouncer.sleep_duration();
        match self.phase {
            TrackerPhase::Settling { deadline } => debounce
                .min(deadline.saturating_duration_since(Instant::now()))
                .max(Duration::from_millis(1)),
            _ => debounce,
        }
    }

    /// A `syncScrollToLine` message arrived from the host side.
    ///
    /// Exact-match only: a line the renderer never block-tagged is a
    /// logged no-op, and the lock still releases on schedule.
    pub fn on_inbound_line(&mut self, line: i64) {
        if !self.enabled {
            return;
        }
        if self.lock.blocks(ScrollSource::Preview) {
            crate::debug!("render"; "inbound line {} suppressed (own echo window)", line);
            return;
        }

        self.lock.arm(ScrollSource::Editor, self.block_window);

        let Ok(line) = LogicalLine::try_from(line) else {
            crate::debug!("render"; "inbound line {} out of range", line);
            return;
        };
        self.current_top_line = Some(line);
        if let Err(e) = self.preview.scroll_line_to_top(line) {
            crate::debug!("render"; "inbound scroll skipped: {}", e);
        }
    }

    /// Toggle synchronization. Disabling clears the lock and the pending
    /// debounce fire; re-enabling sends nothing until the next natural
    /// event re-establishes sync.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.lock.release();
            self.debouncer.cancel();
        }
    }

    /// Release every observation resource. Individual failures are logged
    /// and skipped so one bad listener cannot leak the rest.
    pub fn dispose(&mut self) {
        self.teardown_observation();
        self.visible.clear();
        self.nodes.clear();
        self.debouncer.cancel();
        self.lock.release();
        self.phase = TrackerPhase::Uninitialized;
    }

    fn teardown_observation(&mut self) {
        for node in self.nodes.keys() {
            if let Err(e) = self.observer.unobserve(*node) {
                crate::log!("warning"; "unobserve {} failed: {}", node, e);
            }
        }
        if let Err(e) = self.observer.disconnect() {
            crate::log!("warning"; "observer disconnect failed: {}", e);
        }
    }

    /// Compute the current top line and emit if it changed.
    fn emit_top_line(&mut self) -> Option<SyncMessage> {
        let top = self.visible.select_top_visible_line()?;
        if self.current_top_line == Some(top) {
            return None;
        }
        self.current_top_line = Some(top);
        self.lock.arm(ScrollSource::Preview, self.block_window);
        Some(SyncMessage::preview_scrolled_to_line(top))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn current_top_line(&self) -> Option<LogicalLine> {
        self.current_top_line
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    #[cfg(test)]
    fn is_tracking(&self) -> bool {
        self.phase == TrackerPhase::Tracking
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::error::SyncError;

    struct FakePreview {
        nodes: Vec<(NodeId, LogicalLine)>,
        next_nodes: Vec<(NodeId, LogicalLine)>,
        scrolled: Vec<LogicalLine>,
    }

    impl FakePreview {
        fn with_lines(lines: &[LogicalLine]) -> Self {
            Self {
                nodes: tag(lines),
                next_nodes: Vec::new(),
                scrolled: Vec::new(),
            }
        }
    }

    fn tag(lines: &[LogicalLine]) -> Vec<(NodeId, LogicalLine)> {
        lines
            .iter()
            .enumerate()
            .map(|(i, &line)| (NodeId(i as u64), line))
            .collect()
    }

    impl PreviewSurface for FakePreview {
        fn line_tagged_nodes(&self) -> Vec<(NodeId, LogicalLine)> {
            self.nodes.clone()
        }

        fn scroll_line_to_top(&mut self, line: LogicalLine) -> Result<(), SyncError> {
            if self.nodes.iter().any(|(_, l)| *l == line) {
                self.scrolled.push(line);
                Ok(())
            } else {
                Err(SyncError::LineNotRendered(line))
            }
        }

        fn replace_content(&mut self, _html: &str) {
            self.nodes = std::mem::take(&mut self.next_nodes);
        }
    }

    #[derive(Default)]
    struct FakeObserver {
        margin: u8,
        observed: Vec<NodeId>,
        disconnects: usize,
        fail_disconnect: bool,
    }

    impl ViewportObserver for FakeObserver {
        fn set_margin_percent(&mut self, percent: u8) {
            self.margin = percent;
        }

        fn observe(&mut self, node: NodeId) {
            self.observed.push(node);
        }

        fn unobserve(&mut self, node: NodeId) -> Result<(), SyncError> {
            self.observed.retain(|n| *n != node);
            Ok(())
        }

        fn disconnect(&mut self) -> Result<(), SyncError> {
            self.disconnects += 1;
            if self.fail_disconnect {
                return Err(SyncError::Teardown("observer".to_string()));
            }
            self.observed.clear();
            Ok(())
        }
    }

    fn tracker(lines: &[LogicalLine]) -> RenderVisibilityTracker<FakePreview, FakeObserver> {
        tracker_with(lines, SyncConfig::default())
    }

    fn tracker_with(
        lines: &[LogicalLine],
        config: SyncConfig,
    ) -> RenderVisibilityTracker<FakePreview, FakeObserver> {
        let mut t = RenderVisibilityTracker::new(
            FakePreview::with_lines(lines),
            FakeObserver::default(),
            &config,
        );
        t.start();
        t
    }

    fn enter(node: u64, top: f32) -> IntersectionEvent {
        IntersectionEvent::enter(NodeId(node), top, top + 20.0, 1.0)
    }

    #[test]
    fn test_start_observes_all_nodes_with_margin() {
        let t = tracker(&[0, 5, 9]);
        assert_eq!(t.observer.observed.len(), 3);
        assert_eq!(t.observer.margin, 10);
        assert!(t.is_tracking());
    }

    #[test]
    fn test_leading_scroll_emits_top_line() {
        let mut t = tracker(&[3, 7, 9]);
        // Node indices follow the tag order: 0→line 3, 1→line 7, 2→line 9
        t.on_intersections(&[enter(0, 50.0), enter(1, -10.0), enter(2, 5.0)]);

        let msg = t.on_scroll();
        assert_eq!(msg, Some(SyncMessage::PreviewScrolledToLine { line: 9 }));
        assert_eq!(t.current_top_line(), Some(9));
    }

    #[test]
    fn test_burst_coalesces_to_trailing_fire() {
        let config = SyncConfig {
            scroll_debounce_ms: 20,
            block_window_ms: 5,
            ..SyncConfig::default()
        };
        let mut t = tracker_with(&[1, 2], config);
        t.on_intersections(&[enter(0, 0.0), enter(1, 30.0)]);

        assert!(t.on_scroll().is_some()); // leading
        // Let the preview lock from the leading fire expire, then scroll on
        std::thread::sleep(Duration::from_millis(8));
        t.on_intersections(&[IntersectionEvent::leave(NodeId(0), -40.0, -20.0)]);
        assert!(t.on_scroll().is_none()); // coalesced
        assert!(t.on_scroll().is_none());

        std::thread::sleep(Duration::from_millis(25));
        let msg = t.poll();
        assert_eq!(msg, Some(SyncMessage::PreviewScrolledToLine { line: 2 }));
    }

    #[test]
    fn test_unchanged_top_line_is_not_resent() {
        let config = SyncConfig {
            block_window_ms: 5,
            scroll_debounce_ms: 1,
            ..SyncConfig::default()
        };
        let mut t = tracker_with(&[1, 2], config);
        t.on_intersections(&[enter(0, 10.0)]);

        assert!(t.on_scroll().is_some());
        std::thread::sleep(Duration::from_millis(10));
        // Same visible set, same top line: nothing to say
        assert_eq!(t.on_scroll(), None);
    }

    #[test]
    fn test_empty_document_never_emits() {
        let mut t = tracker(&[]);
        assert_eq!(t.on_scroll(), None);
    }

    #[test]
    fn test_inbound_line_scrolls_exact_match_and_arms_lock() {
        let mut t = tracker(&[0, 42, 80]);
        t.on_inbound_line(42);

        assert_eq!(t.preview().scrolled, vec![42]);
        assert_eq!(t.current_top_line(), Some(42));
        // Within the block window the resulting native scroll notification
        // must not produce an outbound message
        assert_eq!(t.on_scroll(), None);
    }

    #[test]
    fn test_inbound_miss_is_noop_with_lock_still_armed() {
        let mut t = tracker(&[0, 42]);
        t.on_inbound_line(13);

        assert!(t.preview().scrolled.is_empty());
        assert_eq!(t.current_top_line(), Some(13));
        assert_eq!(t.on_scroll(), None); // editor lock armed regardless
    }

    #[test]
    fn test_inbound_suppressed_during_own_echo_window() {
        let mut t = tracker(&[1, 2]);
        t.on_intersections(&[enter(0, 0.0)]);
        assert!(t.on_scroll().is_some()); // arms preview lock

        t.on_inbound_line(2);
        assert!(t.preview().scrolled.is_empty());
    }

    #[test]
    fn test_lock_expiry_restores_inbound_processing() {
        let config = SyncConfig {
            block_window_ms: 10,
            ..SyncConfig::default()
        };
        let mut t = tracker_with(&[1, 2], config);
        t.on_intersections(&[enter(0, 0.0)]);
        assert!(t.on_scroll().is_some());

        std::thread::sleep(Duration::from_millis(20));
        t.on_inbound_line(2);
        assert_eq!(t.preview().scrolled, vec![2]);
    }

    #[test]
    fn test_disable_cancels_pending_debounce_without_replay() {
        let mut t = tracker(&[1, 2]);
        t.on_intersections(&[enter(0, 0.0), enter(1, 30.0)]);
        assert!(t.on_scroll().is_some());
        t.on_intersections(&[IntersectionEvent::leave(NodeId(0), -40.0, -20.0)]);
        assert!(t.on_scroll().is_none()); // trailing fire now pending

        t.set_enabled(false);
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(t.poll(), None);

        // Re-enabling does not replay the cancelled sync either
        t.set_enabled(true);
        assert_eq!(t.poll(), None);
    }

    #[test]
    fn test_content_swap_clears_state_and_resettles() {
        let config = SyncConfig {
            settle_delay_ms: 10,
            ..SyncConfig::default()
        };
        let mut t = tracker_with(&[1, 2], config);
        t.on_intersections(&[enter(0, 0.0)]);
        t.preview.next_nodes = tag(&[100, 200]);

        t.on_content_replaced("<p data-line=\"100\"></p>");
        assert!(!t.is_tracking());
        assert_eq!(t.current_top_line(), None);

        // Intersections racing the swap are stale and must be dropped
        t.on_intersections(&[enter(0, 5.0)]);
        assert_eq!(t.on_scroll(), None);

        std::thread::sleep(Duration::from_millis(15));
        assert_eq!(t.poll(), None); // restart itself sends nothing
        assert!(t.is_tracking());
        assert_eq!(t.nodes.len(), 2);
        assert_eq!(t.nodes.get(&NodeId(0)), Some(&100));
    }

    #[test]
    fn test_dispose_survives_failing_disconnect() {
        let mut t = tracker(&[1, 2, 3]);
        t.observer.fail_disconnect = true;

        t.dispose();
        assert_eq!(t.observer.disconnects, 1);
        assert!(t.nodes.is_empty());
        assert!(t.visible.is_empty());
        assert_eq!(t.on_scroll(), None); // Uninitialized: empty set, no emit
    }

    #[test]
    fn test_leave_event_excludes_line() {
        let mut t = tracker(&[5, 6]);
        t.on_intersections(&[enter(0, 10.0), enter(1, 40.0)]);
        t.on_intersections(&[IntersectionEvent::leave(NodeId(0), -20.0, -5.0)]);

        let msg = t.on_scroll();
        assert_eq!(msg, Some(SyncMessage::PreviewScrolledToLine { line: 6 }));
    }
}
