//! What the agent can observe about the content it runs inside.

use serde::{Deserialize, Serialize};

/// Scroll and offset height of one element.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxMetrics {
    #[serde(default)]
    pub scroll_height: u32,
    #[serde(default)]
    pub offset_height: u32,
}

impl BoxMetrics {
    pub fn new(scroll_height: u32, offset_height: u32) -> Self {
        Self {
            scroll_height,
            offset_height,
        }
    }

    /// The larger of scroll and offset height.
    pub fn extent(&self) -> u32 {
        self.scroll_height.max(self.offset_height)
    }
}

/// One row of the viewer's structural table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerRow {
    pub offset_height: u32,
    /// Whether this row hosts the visible report content region.
    #[serde(default)]
    pub contains_visible_content: bool,
}

/// The viewer chrome: toolbar and parameter rows plus the content region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerLayout {
    #[serde(default)]
    pub rows: Vec<ViewerRow>,
    #[serde(default)]
    pub visible_content: Option<BoxMetrics>,
}

/// A point-in-time view of the structures the measurement policy cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    /// The rendered report element, when it sits directly in the body.
    #[serde(default)]
    pub report_content: Option<BoxMetrics>,
    /// The viewer table, when the toolbar chrome is rendered.
    #[serde(default)]
    pub viewer: Option<ViewerLayout>,
    #[serde(default)]
    pub body: BoxMetrics,
    #[serde(default)]
    pub root: BoxMetrics,
}

/// Read access to the content's layout.
pub trait ContentProbe: Send + Sync {
    /// False when the content is the top-level page rather than a frame.
    fn is_embedded(&self) -> bool;

    fn snapshot(&self) -> LayoutSnapshot;
}
