//! # ReportFrame Core
//!
//! Domain types and seams shared by every ReportFrame crate.
//! This crate has **no framework dependencies** beyond serialization and
//! time; the address composer, reporter agent, reconciler and embedding
//! surface all depend inward on it.
//!
//! ## Design Philosophy
//!
//! The embedded report content and the host never share memory. Everything
//! crossing that boundary is a value defined here:
//! - [`HeightMessage`] is the wire payload the content posts to its parent
//! - [`InboundMessage`] is that payload as the host receives it, tagged with
//!   the [`Generation`] of the content load that produced it
//! - [`ParentChannel`] is the one-way delivery seam
//!
//! Timers are driven through the [`Clock`] seam so state machines can be
//! tested without sleeping.

pub mod channel;
pub mod clock;
pub mod error;
pub mod height;
pub mod report;

// Re-export key types at crate root for ergonomics
pub use channel::{ParentChannel, RecordingChannel};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{AddressError, Error, ParameterError, Result};
pub use height::{Generation, HeightMessage, HeightSample, InboundMessage};
pub use report::{
    DEFAULT_DECLARED_HEIGHT, DisplayOptions, MAX_DECLARED_HEIGHT, MIN_DECLARED_HEIGHT,
    ReportConfiguration, ToolbarSuppression, Zoom, ZoomParseError,
};
