//! Host Actor - drives the editor-side controller.
//!
//! One `tokio::select!` loop over two sources: embedder events and inbound
//! protocol messages. All controller state is mutated inside this task, so
//! the host side stays single-threaded by construction.

use tokio::sync::mpsc;

use super::messages::HostEvent;
use crate::channel::Endpoint;
use crate::host::HostSyncController;
use crate::protocol::SyncMessage;
use crate::surface::EditorSurface;

/// Host Actor - editor side of one session.
pub struct HostActor<E: EditorSurface> {
    events: mpsc::Receiver<HostEvent>,
    endpoint: Endpoint,
    controller: HostSyncController<E>,
}

impl<E: EditorSurface> HostActor<E> {
    pub fn new(
        events: mpsc::Receiver<HostEvent>,
        endpoint: Endpoint,
        controller: HostSyncController<E>,
    ) -> Self {
        Self {
            events,
            endpoint,
            controller,
        }
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let mut events = self.events;
        let mut endpoint = self.endpoint;
        let mut controller = self.controller;

        loop {
            tokio::select! {
                biased;
                Some(event) = events.recv() => {
                    if !handle_event(&mut controller, &endpoint, event) {
                        break;
                    }
                }
                msg = endpoint.recv() => {
                    let Some(msg) = msg else {
                        crate::debug!("host"; "render side gone, stopping");
                        break;
                    };
                    handle_inbound(&mut controller, msg);
                }
            }
        }
        crate::debug!("host"; "stopped");
    }
}

/// Process one embedder event. Returns `false` on shutdown.
fn handle_event<E: EditorSurface>(
    controller: &mut HostSyncController<E>,
    endpoint: &Endpoint,
    event: HostEvent,
) -> bool {
    match event {
        HostEvent::ViewportChanged { document, top_line } => {
            if let Some(msg) = controller.on_viewport_changed(&document, top_line) {
                send(endpoint, msg);
            }
        }
        HostEvent::ContentRendered { html } => {
            send(endpoint, SyncMessage::update_content(html));
        }
        HostEvent::SetEnabled(enabled) => {
            controller.set_enabled(enabled);
            send(endpoint, SyncMessage::update_state(enabled));
        }
        HostEvent::Shutdown => return false,
    }
    true
}

/// Process one inbound protocol message.
fn handle_inbound<E: EditorSurface>(controller: &mut HostSyncController<E>, msg: SyncMessage) {
    match msg {
        SyncMessage::PreviewScrolledToLine { line } => controller.on_inbound_line(line),
        other => {
            crate::debug!("host"; "unexpected inbound message: {:?}", other);
        }
    }
}

/// Fire-and-forget send; a drop is logged and the next natural event
/// resends the position.
fn send(endpoint: &Endpoint, msg: SyncMessage) {
    if let Err(e) = endpoint.send(msg) {
        crate::log!("host"; "sync message dropped: {}", e);
    }
}
