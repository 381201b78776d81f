//! `reportframe measure` — Measure a captured report document.

use std::path::Path;

use reportframe_agent::{AgentSelectors, ContentDocument, MeasurementStrategy};
use reportframe_core::HeightMessage;

pub async fn run(
    config_path: Option<&Path>,
    document_path: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let document: ContentDocument = super::read_json(document_path)?;
    let selectors = AgentSelectors::from_config(&config.agent);

    let (strategy, height) = measure(&selectors, &document);

    if json {
        let output = serde_json::json!({
            "strategy": strategy,
            "height": height,
            "embedded": !document.top_level,
            "message": HeightMessage::new(height).to_payload(),
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    println!("📏 {}", document_path.display());
    println!("   Strategy:  {}", describe(strategy));
    println!("   Height:    {height}px");
    if document.top_level {
        println!("   ⚠️  Document is a top-level page; the agent would not report from it");
    }
    Ok(())
}

fn measure(selectors: &AgentSelectors, document: &ContentDocument) -> (MeasurementStrategy, u32) {
    MeasurementStrategy::measure_snapshot(&selectors.snapshot(document))
}

fn describe(strategy: MeasurementStrategy) -> &'static str {
    match strategy {
        MeasurementStrategy::ReportContent => "report content (toolbar hidden)",
        MeasurementStrategy::ViewerChrome => "viewer chrome + visible content",
        MeasurementStrategy::WholeDocument => "whole document",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reportframe_agent::ElementNode;

    #[test]
    fn measures_with_configured_selectors() {
        let mut agent = reportframe_config::AgentConfig::default();
        agent.report_content_id = "reportBody".into();
        let selectors = AgentSelectors::from_config(&agent);

        let document = ContentDocument {
            top_level: false,
            root: ElementNode::new(500, 500),
            body: ElementNode::new(500, 500)
                .with_child(ElementNode::new(1720, 1700).with_id("reportBody")),
        };

        assert_eq!(
            measure(&selectors, &document),
            (MeasurementStrategy::ReportContent, 1720)
        );
        assert_eq!(
            measure(&AgentSelectors::default(), &document),
            (MeasurementStrategy::WholeDocument, 500)
        );
    }
}
