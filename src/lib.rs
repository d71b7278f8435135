//! linesync - bidirectional scroll synchronization between a text editor
//! and a rendered preview.
//!
//! When the user scrolls one side, the other follows to the matching
//! logical document line, without feedback loops and without on-demand
//! layout queries:
//!
//! ```text
//! editor viewport ──> HostSyncController ──syncScrollToLine──────┐
//!       ^                                                        v
//!       │                                          RenderVisibilityTracker
//!       └──────previewScrolledToLine<── (intersection-fed cache) ┘
//! ```
//!
//! Both sides run the same loop-prevention pattern: an explicit
//! [`SyncLock`](lock::SyncLock) armed after every outbound sync suppresses
//! the echo its own scroll provokes, and auto-expires after a short block
//! window so genuine input is never deaf for long.
//!
//! The state machines ([`host`], [`render`]) are pure and synchronous;
//! the [`actor`] layer runs one tokio task per side and connects them
//! through the duplex [`channel`]. Editor and preview are reached only
//! through the capability traits in [`surface`].

#[macro_use]
pub mod logger;

pub mod actor;
pub mod channel;
pub mod config;
pub mod debounce;
pub mod dom;
pub mod error;
pub mod host;
pub mod lock;
pub mod protocol;
pub mod render;
pub mod surface;
pub mod visible;

pub use actor::SyncSession;
pub use actor::messages::{HostEvent, RenderEvent};
pub use config::SyncConfig;
pub use dom::HtmlPreviewDom;
pub use error::SyncError;
pub use host::HostSyncController;
pub use protocol::SyncMessage;
pub use render::RenderVisibilityTracker;
pub use surface::{
    DocumentId, EditorSurface, IntersectionEvent, LogicalLine, NodeId, PreviewSurface,
    ViewportObserver,
};
