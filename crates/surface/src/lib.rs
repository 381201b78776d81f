//! The embedding surface: the host-side binding between a report
//! configuration and the frame that shows it.
//!
//! [`EmbeddingSurface`] is a synchronous state machine. It composes the
//! frame address, bumps the content [`Generation`] on every reload, routes
//! height messages into the reconciler and renders a [`FrameView`].
//! [`SurfaceRuntime`] runs one on tokio with a shrink-window timer.
//!
//! [`Generation`]: reportframe_core::Generation

pub mod address;
pub mod runtime;
pub mod surface;

pub use address::AddressCache;
pub use runtime::{FramePort, SurfaceEvent, SurfaceHandle, SurfaceRuntime};
pub use surface::{
    EmbeddingSurface, FRAME_TITLE, FrameView, HostContext, PLACEHOLDER_MESSAGE, SurfaceEffect,
};
