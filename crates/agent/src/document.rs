//! A serializable element tree and the probe that reads it.
//!
//! The tree stands in for the live document: operators capture one from a
//! report page (or write one by hand) and the agent measures it with the
//! same selectors it would use in the browser.

use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::layout::{BoxMetrics, ContentProbe, LayoutSnapshot, ViewerLayout, ViewerRow};

/// One element and its descendants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub scroll_height: u32,
    #[serde(default)]
    pub offset_height: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn new(scroll_height: u32, offset_height: u32) -> Self {
        Self {
            id: None,
            scroll_height,
            offset_height,
            children: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_child(mut self, child: ElementNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn metrics(&self) -> BoxMetrics {
        BoxMetrics::new(self.scroll_height, self.offset_height)
    }

    /// Depth-first search over this node and its descendants.
    pub fn find(&self, predicate: &dyn Fn(&ElementNode) -> bool) -> Option<&ElementNode> {
        if predicate(self) {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.find(predicate))
    }

    fn id_is(&self, id: &str) -> bool {
        self.id.as_deref() == Some(id)
    }

    fn id_starts_with(&self, prefix: &str) -> bool {
        self.id.as_deref().is_some_and(|id| id.starts_with(prefix))
    }
}

/// A captured report document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentDocument {
    /// True when the document is the top-level page, not a frame.
    #[serde(default)]
    pub top_level: bool,
    #[serde(default)]
    pub root: ElementNode,
    #[serde(default)]
    pub body: ElementNode,
}

/// Element ids the measurement policy looks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSelectors {
    pub report_content_id: String,
    pub viewer_container_id: String,
    pub visible_content_prefix: String,
}

impl Default for AgentSelectors {
    fn default() -> Self {
        Self::from_config(&reportframe_config::AgentConfig::default())
    }
}

impl AgentSelectors {
    pub fn from_config(config: &reportframe_config::AgentConfig) -> Self {
        Self {
            report_content_id: config.report_content_id.clone(),
            viewer_container_id: config.viewer_container_id.clone(),
            visible_content_prefix: config.visible_content_prefix.clone(),
        }
    }

    /// Reduce a document to the structures the policy measures.
    pub fn snapshot(&self, document: &ContentDocument) -> LayoutSnapshot {
        let report_content = document
            .body
            .children
            .iter()
            .find(|child| child.id_is(&self.report_content_id))
            .map(ElementNode::metrics);

        let viewer = document
            .body
            .find(&|node: &ElementNode| node.id_is(&self.viewer_container_id))
            .map(|container| self.viewer_layout(container));

        LayoutSnapshot {
            report_content,
            viewer,
            body: document.body.metrics(),
            root: document.root.metrics(),
        }
    }

    fn viewer_layout(&self, container: &ElementNode) -> ViewerLayout {
        let prefix = self.visible_content_prefix.as_str();
        let is_visible_content = |node: &ElementNode| node.id_starts_with(prefix);

        let rows = container
            .children
            .iter()
            .map(|row| ViewerRow {
                offset_height: row.offset_height,
                contains_visible_content: row.find(&is_visible_content).is_some(),
            })
            .collect();

        ViewerLayout {
            rows,
            visible_content: container.find(&is_visible_content).map(ElementNode::metrics),
        }
    }
}

/// A [`ContentProbe`] over a document that can be replaced as it "renders".
#[derive(Debug)]
pub struct DocumentProbe {
    selectors: AgentSelectors,
    document: RwLock<ContentDocument>,
}

impl DocumentProbe {
    pub fn new(document: ContentDocument, selectors: AgentSelectors) -> Self {
        Self {
            selectors,
            document: RwLock::new(document),
        }
    }

    /// Swap in a newer rendering of the document.
    pub fn update(&self, document: ContentDocument) {
        match self.document.write() {
            Ok(mut current) => *current = document,
            Err(poisoned) => *poisoned.into_inner() = document,
        }
    }
}

impl ContentProbe for DocumentProbe {
    fn is_embedded(&self) -> bool {
        self.document
            .read()
            .map(|document| !document.top_level)
            .unwrap_or(false)
    }

    fn snapshot(&self) -> LayoutSnapshot {
        match self.document.read() {
            Ok(document) => self.selectors.snapshot(&document),
            Err(poisoned) => self.selectors.snapshot(&poisoned.into_inner()),
        }
    }
}
