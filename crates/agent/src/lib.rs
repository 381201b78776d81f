//! The reporter agent: runs inside the embedded report content.
//!
//! The agent follows a **Probe → Measure → Post** cycle:
//!
//! 1. **Probe** the layout for the structure the viewer rendered
//! 2. **Measure** it with the matching [`MeasurementStrategy`]
//! 3. **Post** `{ "reportHeight": h }` to the parent over a [`ParentChannel`]
//!
//! It does this once when the content loads and then on a fixed cadence,
//! since report content can keep growing after load. When the content is the
//! top-level page the agent does nothing.
//!
//! [`ParentChannel`]: reportframe_core::ParentChannel

pub mod document;
pub mod layout;
pub mod reporter;
pub mod strategy;

pub use document::{AgentSelectors, ContentDocument, DocumentProbe, ElementNode};
pub use layout::{BoxMetrics, ContentProbe, LayoutSnapshot, ViewerLayout, ViewerRow};
pub use reporter::{AgentHandle, ReporterAgent};
pub use strategy::MeasurementStrategy;

