//! Measurement policy: which structure defines the report's height.

use serde::Serialize;

use crate::layout::{LayoutSnapshot, ViewerLayout};

/// The layout variants the viewer renders, selected by structural probing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementStrategy {
    /// Toolbar suppressed: the report element sits directly in the body.
    ReportContent,
    /// Toolbar rendered: chrome rows plus the visible content region.
    ViewerChrome,
    /// Nothing recognized: measure the whole document.
    WholeDocument,
}

impl MeasurementStrategy {
    /// Pick the strategy for a layout.
    pub fn probe(snapshot: &LayoutSnapshot) -> Self {
        if snapshot.report_content.is_some() {
            return MeasurementStrategy::ReportContent;
        }
        match &snapshot.viewer {
            Some(viewer) if viewer.visible_content.is_some() => MeasurementStrategy::ViewerChrome,
            _ => MeasurementStrategy::WholeDocument,
        }
    }

    /// Measure `snapshot` with this strategy, falling back to the whole
    /// document when the structure it needs is absent.
    pub fn measure(&self, snapshot: &LayoutSnapshot) -> u32 {
        let measured = match self {
            MeasurementStrategy::ReportContent => snapshot.report_content.map(|c| c.extent()),
            MeasurementStrategy::ViewerChrome => snapshot.viewer.as_ref().and_then(chrome_height),
            MeasurementStrategy::WholeDocument => None,
        };
        measured.unwrap_or_else(|| whole_document_height(snapshot))
    }

    /// Probe and measure in one step.
    pub fn measure_snapshot(snapshot: &LayoutSnapshot) -> (Self, u32) {
        let strategy = Self::probe(snapshot);
        (strategy, strategy.measure(snapshot))
    }
}

/// Rows other than the content row contribute their offset height; the
/// content region contributes its full scroll height.
fn chrome_height(viewer: &ViewerLayout) -> Option<u32> {
    let content = viewer.visible_content?;
    let chrome: u32 = viewer
        .rows
        .iter()
        .filter(|row| !row.contains_visible_content)
        .map(|row| row.offset_height)
        .sum();
    Some(chrome.saturating_add(content.scroll_height))
}

fn whole_document_height(snapshot: &LayoutSnapshot) -> u32 {
    snapshot.body.extent().max(snapshot.root.extent())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{BoxMetrics, ViewerRow};

    fn document(body: u32, root: u32) -> LayoutSnapshot {
        LayoutSnapshot {
            body: BoxMetrics::new(body, body),
            root: BoxMetrics::new(root, root),
            ..LayoutSnapshot::default()
        }
    }

    #[test]
    fn report_content_wins_when_present() {
        let snapshot = LayoutSnapshot {
            report_content: Some(BoxMetrics::new(1130, 1100)),
            ..document(2000, 2000)
        };
        assert_eq!(
            MeasurementStrategy::measure_snapshot(&snapshot),
            (MeasurementStrategy::ReportContent, 1130)
        );
    }

    #[test]
    fn viewer_chrome_sums_other_rows_and_content_scroll() {
        let snapshot = LayoutSnapshot {
            viewer: Some(ViewerLayout {
                rows: vec![
                    ViewerRow { offset_height: 30, contains_visible_content: false },
                    ViewerRow { offset_height: 64, contains_visible_content: false },
                    ViewerRow { offset_height: 400, contains_visible_content: true },
                ],
                visible_content: Some(BoxMetrics::new(1250, 400)),
            }),
            ..document(500, 500)
        };
        assert_eq!(
            MeasurementStrategy::measure_snapshot(&snapshot),
            (MeasurementStrategy::ViewerChrome, 30 + 64 + 1250)
        );
    }

    #[test]
    fn viewer_without_content_region_falls_back() {
        let snapshot = LayoutSnapshot {
            viewer: Some(ViewerLayout {
                rows: vec![ViewerRow { offset_height: 30, contains_visible_content: false }],
                visible_content: None,
            }),
            ..document(640, 700)
        };
        assert_eq!(
            MeasurementStrategy::measure_snapshot(&snapshot),
            (MeasurementStrategy::WholeDocument, 700)
        );
    }

    #[test]
    fn whole_document_takes_largest_extent() {
        let snapshot = LayoutSnapshot {
            body: BoxMetrics::new(900, 300),
            root: BoxMetrics::new(850, 950),
            ..LayoutSnapshot::default()
        };
        assert_eq!(MeasurementStrategy::WholeDocument.measure(&snapshot), 950);
    }

    #[test]
    fn mismatched_strategy_falls_back_to_document() {
        assert_eq!(MeasurementStrategy::ViewerChrome.measure(&document(420, 410)), 420);
    }
}
