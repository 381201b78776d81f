//! `reportframe simulate` — Run the surface and a reporter agent together.
//!
//! The document stands in for the report page loaded in the frame. The agent
//! measures it and posts to the surface exactly as it would in a browser.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use reportframe_agent::{AgentSelectors, ContentDocument, DocumentProbe, ReporterAgent};
use reportframe_composer::Composer;
use reportframe_reconciler::ReconcilePolicy;
use reportframe_surface::{EmbeddingSurface, FrameView, HostContext, SurfaceRuntime};
use tracing::warn;

pub async fn run(
    config_path: Option<&Path>,
    document_path: &Path,
    seconds: u64,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let document: ContentDocument = super::read_json(document_path)?;

    let surface = EmbeddingSurface::mount(
        config.report.to_configuration(),
        Composer::from_config(&config.composer),
        ReconcilePolicy::from_config(&config.sync),
        HostContext::from_config(&config.host),
    );
    let handle = SurfaceRuntime::spawn(surface);
    print_view(&handle.view());

    let Some(port) = handle.current_port() else {
        handle.unmount().await;
        return Ok(());
    };

    let probe = Arc::new(DocumentProbe::new(
        document,
        AgentSelectors::from_config(&config.agent),
    ));
    let agent = ReporterAgent::from_config(&config.agent, probe, Arc::new(port)).spawn();
    if agent.is_none() {
        warn!("Document is a top-level page, nothing will be reported");
    }

    let mut views = handle.subscribe();
    let deadline = tokio::time::sleep(Duration::from_secs(seconds));
    tokio::pin!(deadline);

    loop {
        tokio::select! {
            _ = &mut deadline => break,
            changed = views.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = views.borrow_and_update().clone();
                print_view(&view);
            }
        }
    }

    if let Some(agent) = agent {
        agent.stop().await;
    }
    handle.unmount().await;
    Ok(())
}

fn print_view(view: &FrameView) {
    match view {
        FrameView::Placeholder { message } => println!("ℹ️  {message}"),
        FrameView::Frame {
            src,
            height,
            generation,
            ..
        } => println!("🖼️  [{generation}] {height}px  {src}"),
    }
}
