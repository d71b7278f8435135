//! Actor layer for one sync session.
//!
//! Two actors, one per execution context, joined by the duplex protocol
//! channel:
//!
//! ```text
//! editor events --> HostActor <==duplex==> RenderActor <-- viewport events
//!                  (controller)            (visibility tracker)
//! ```
//!
//! # Module Structure
//!
//! - `messages` - Embedder-facing event types for each side
//! - `host` - Drives the host sync controller
//! - `render` - Drives the render visibility tracker
//! - `coordinator` - Wires up channels, spawns and disposes the session

pub mod coordinator;
pub mod host;
pub mod messages;
pub mod render;

pub use coordinator::SyncSession;
