//! Render Actor - drives the preview-side visibility tracker.
//!
//! One `tokio::select!` loop over three sources: embedder events, inbound
//! protocol messages, and the tracker's own timers (settle deadline,
//! trailing debounce). The tracker exposes a precise `sleep_duration`, so
//! the timer branch wakes exactly when something is due and cancellation
//! is just tracker state.

use tokio::sync::mpsc;

use super::messages::RenderEvent;
use crate::channel::Endpoint;
use crate::protocol::SyncMessage;
use crate::render::RenderVisibilityTracker;
use crate::surface::{PreviewSurface, ViewportObserver};

/// Render Actor - preview side of one session.
pub struct RenderActor<P: PreviewSurface, O: ViewportObserver> {
    events: mpsc::Receiver<RenderEvent>,
    endpoint: Endpoint,
    tracker: RenderVisibilityTracker<P, O>,
}

impl<P: PreviewSurface, O: ViewportObserver> RenderActor<P, O> {
    pub fn new(
        events: mpsc::Receiver<RenderEvent>,
        endpoint: Endpoint,
        tracker: RenderVisibilityTracker<P, O>,
    ) -> Self {
        Self {
            events,
            endpoint,
            tracker,
        }
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let mut events = self.events;
        let mut endpoint = self.endpoint;
        let mut tracker = self.tracker;

        // Content may already be present when the session starts
        tracker.start();

        loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => {
                    match event {
                        RenderEvent::Scrolled => {
                            if let Some(msg) = tracker.on_scroll() {
                                send(&endpoint, msg);
                            }
                        }
                        RenderEvent::Intersections(batch) => {
                            tracker.on_intersections(&batch);
                        }
                        RenderEvent::Shutdown => break,
                    }
                }
                msg = endpoint.recv() => {
                    let Some(msg) = msg else {
                        crate::debug!("render"; "host side gone, stopping");
                        break;
                    };
                    handle_inbound(&mut tracker, msg);
                }
                _ = tokio::time::sleep(tracker.sleep_duration()) => {
                    if let Some(msg) = tracker.poll() {
                        send(&endpoint, msg);
                    }
                }
            }
        }

        tracker.dispose();
        crate::debug!("render"; "stopped");
    }
}

/// Process one inbound protocol message.
fn handle_inbound<P: PreviewSurface, O: ViewportObserver>(
    tracker: &mut RenderVisibilityTracker<P, O>,
    msg: SyncMessage,
) {
    match msg {
        SyncMessage::SyncScrollToLine { line } => tracker.on_inbound_line(line),
        SyncMessage::UpdateScrollSyncState { enabled } => tracker.set_enabled(enabled),
        SyncMessage::UpdateContent { content } => tracker.on_content_replaced(&content),
        other => {
            crate::debug!("render"; "unexpected inbound message: {:?}", other);
        }
    }
}

/// Fire-and-forget send; a drop is logged and the next natural scroll
/// resends the position.
fn send(endpoint: &Endpoint, msg: SyncMessage) {
    if let Err(e) = endpoint.send(msg) {
        crate::log!("render"; "sync message dropped: {}", e);
    }
}
