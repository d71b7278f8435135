//! Duplex message channel between the host and render sides.
//!
//! Two bounded mpsc queues, one per direction. FIFO within a direction,
//! nothing guaranteed across directions — an inbound message can arrive
//! after the lock that anticipated it has already expired, and the
//! controllers are written to tolerate that.
//!
//! Sends never block and never retry: if the peer is gone or the queue is
//! full the message is dropped and logged, and the next natural scroll
//! event resends the current position.

use tokio::sync::mpsc;

use crate::error::SyncError;
use crate::protocol::SyncMessage;

/// One side of the duplex channel.
pub struct Endpoint {
    tx: mpsc::Sender<SyncMessage>,
    rx: mpsc::Receiver<SyncMessage>,
    /// "host" or "render", for log lines only
    side: &'static str,
}

impl Endpoint {
    /// Fire-and-forget send toward the opposite side.
    pub fn send(&self, msg: SyncMessage) -> Result<(), SyncError> {
        self.tx.try_send(msg).map_err(|e| {
            crate::debug!("channel"; "{} send dropped: {}", self.side, e);
            SyncError::TransportUnavailable
        })
    }

    /// Receive the next inbound message, `None` once the peer is gone.
    pub async fn recv(&mut self) -> Option<SyncMessage> {
        self.rx.recv().await
    }

    /// Non-blocking receive, for synchronous test drivers.
    pub fn try_recv(&mut self) -> Option<SyncMessage> {
        self.rx.try_recv().ok()
    }
}

/// Create a connected pair of endpoints: `(host, render)`.
pub fn duplex(buffer: usize) -> (Endpoint, Endpoint) {
    let (host_tx, render_rx) = mpsc::channel(buffer);
    let (render_tx, host_rx) = mpsc::channel(buffer);
    (
        Endpoint {
            tx: host_tx,
            rx: host_rx,
            side: "host",
        },
        Endpoint {
            tx: render_tx,
            rx: render_rx,
            side: "render",
        },
    )
}
