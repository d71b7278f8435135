//! Session Coordinator - wires up one sync session.
//!
//! # Responsibility
//!
//! A thin orchestrator: creates the duplex channel and the per-side event
//! queues, spawns both actors, and tears the session down. Protocol logic
//! lives in `host` and `render`, not here.
//!
//! ```text
//! HostActor <==duplex==> RenderActor
//!     ^                       ^
//!  host events           render events
//! ```

use anyhow::Result;
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::host::HostActor;
use super::messages::{HostEvent, RenderEvent};
use super::render::RenderActor;
use crate::channel;
use crate::config::SyncConfig;
use crate::host::HostSyncController;
use crate::render::RenderVisibilityTracker;
use crate::surface::{DocumentId, EditorSurface, PreviewSurface, ViewportObserver};

/// A running sync session: one editor document, one preview surface.
///
/// Explicitly constructed, explicitly disposed; nothing here is a global,
/// so multiple concurrent sessions can coexist in tests and embedders.
pub struct SyncSession {
    host_tx: mpsc::Sender<HostEvent>,
    render_tx: mpsc::Sender<RenderEvent>,
    host_handle: JoinHandle<()>,
    render_handle: JoinHandle<()>,
}

impl SyncSession {
    /// Validate the config, wire the channels, and spawn both actors.
    pub fn spawn<E, P, O>(
        editor: E,
        document: DocumentId,
        preview: P,
        observer: O,
        config: SyncConfig,
    ) -> Result<Self>
    where
        E: EditorSurface + Send + 'static,
        P: PreviewSurface + Send + 'static,
        O: ViewportObserver + Send + 'static,
    {
        config.validate()?;

        let (host_endpoint, render_endpoint) = channel::duplex(config.channel_buffer);
        let (host_tx, host_rx) = mpsc::channel::<HostEvent>(config.channel_buffer);
        let (render_tx, render_rx) = mpsc::channel::<RenderEvent>(config.channel_buffer);

        let controller = HostSyncController::new(editor, document.clone(), &config);
        let tracker = RenderVisibilityTracker::new(preview, observer, &config);

        let host_actor = HostActor::new(host_rx, host_endpoint, controller);
        let render_actor = RenderActor::new(render_rx, render_endpoint, tracker);

        let host_handle = tokio::spawn(host_actor.run());
        let render_handle = tokio::spawn(render_actor.run());

        crate::debug!("sync"; "session started for {}", document);

        Ok(Self {
            host_tx,
            render_tx,
            host_handle,
            render_handle,
        })
    }

    /// Queue for editor-side events.
    pub fn host_events(&self) -> mpsc::Sender<HostEvent> {
        self.host_tx.clone()
    }

    /// Queue for preview-side events.
    pub fn render_events(&self) -> mpsc::Sender<RenderEvent> {
        self.render_tx.clone()
    }

    /// Block on an external shutdown signal, then dispose.
    ///
    /// Poll-based because the signal side is a plain crossbeam channel
    /// (Ctrl+C handlers and non-async embedders).
    pub async fn run_until_shutdown(self, shutdown_rx: Receiver<()>) {
        loop {
            if shutdown_rx.try_recv().is_ok() {
                crate::debug!("sync"; "shutdown signal received");
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        }
        self.dispose().await;
    }

    /// End the session: both actors drain, the tracker releases its
    /// observations, and the tasks are reaped with a bounded wait.
    pub async fn dispose(self) {
        let _ = self.host_tx.send(HostEvent::Shutdown).await;
        let _ = self.render_tx.send(RenderEvent::Shutdown).await;

        let timeout = std::time::Duration::from_millis(500);
        let _ = tokio::time::timeout(timeout, self.host_handle).await;
        let _ = tokio::time::timeout(timeout, self.render_handle).await;
        crate::debug!("sync"; "session disposed");
    }
}
