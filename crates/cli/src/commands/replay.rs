//! `reportframe replay` — Run a scripted timeline through the embedding surface.
//!
//! A timeline is a JSON file:
//!
//! ```json
//! {
//!   "report": { "raw_address": "https://host/reports/report?/Sales" },
//!   "events": [
//!     { "at_ms": 0,    "event": "sample", "height": 1200 },
//!     { "at_ms": 1000, "event": "zoom", "zoom": "Page Width" },
//!     { "at_ms": 1500, "event": "sample", "height": 700 }
//!   ]
//! }
//! ```
//!
//! Time is simulated, so a five second shrink window replays instantly.

use std::path::Path;
use std::time::{Duration, Instant};

use reportframe_composer::Composer;
use reportframe_config::AppConfig;
use reportframe_core::{Clock, Generation, InboundMessage, ManualClock, ReportConfiguration, Zoom};
use reportframe_reconciler::{ReconcilePolicy, SampleOutcome};
use reportframe_surface::{EmbeddingSurface, HostContext, SurfaceEffect};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct Timeline {
    /// Replaces `[report]` from the config file when present.
    #[serde(default)]
    pub report: Option<ReportConfiguration>,
    #[serde(default)]
    pub events: Vec<TimelineEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TimelineEntry {
    pub at_ms: u64,
    #[serde(flatten)]
    pub event: TimelineEvent,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    /// A height report from the frame's content.
    Sample {
        height: u32,
        /// Defaults to the generation currently loaded.
        #[serde(default)]
        generation: Option<u64>,
    },
    /// An arbitrary payload from the frame's content.
    Message {
        payload: serde_json::Value,
        #[serde(default)]
        generation: Option<u64>,
    },
    Address { address: String },
    Zoom { zoom: Zoom },
    Toolbar { show: bool },
    ParameterPane { show: bool },
    CustomParameters { parameters: String },
    Height { height: u32 },
    AutoFit { enabled: bool },
}

/// One line of replay output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReplayStep {
    pub at_ms: u64,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SampleOutcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_height: Option<u32>,
    pub generation: Generation,
}

pub async fn run(
    config_path: Option<&Path>,
    timeline_path: &Path,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config(config_path)?;
    let timeline: Timeline = super::read_json(timeline_path)?;

    let steps = replay(&config, timeline);

    for step in &steps {
        if json {
            println!("{}", serde_json::to_string(step)?);
        } else {
            let height = step
                .frame_height
                .map(|h| format!("{h}px"))
                .unwrap_or_else(|| "placeholder".into());
            let outcome = step
                .outcome
                .map(|o| format!(" → {}", describe(&o)))
                .unwrap_or_default();
            println!(
                "[{:>7} ms] {:<32} {}{}  (frame {height})",
                step.at_ms, step.action, step.generation, outcome
            );
        }
    }

    if !json {
        if let Some(last) = steps.last() {
            println!();
            match last.frame_height {
                Some(h) => println!("✅ Final frame height: {h}px"),
                None => println!("⚠️  No report address configured"),
            }
        }
    }
    Ok(())
}

/// Run `timeline` against a freshly mounted surface on a manual clock.
pub fn replay(config: &AppConfig, timeline: Timeline) -> Vec<ReplayStep> {
    let clock = ManualClock::new();
    let start = clock.now();

    let mut report = timeline
        .report
        .unwrap_or_else(|| config.report.to_configuration());
    let mut surface = EmbeddingSurface::mount(
        report.clone(),
        Composer::from_config(&config.composer),
        ReconcilePolicy::from_config(&config.sync),
        HostContext::from_config(&config.host),
    );
    let mut shrink_deadline: Option<Instant> = None;

    let mut events = timeline.events;
    events.sort_by_key(|entry| entry.at_ms);

    let mut steps = Vec::with_capacity(events.len());
    for entry in events {
        let at = start + Duration::from_millis(entry.at_ms);

        if let Some(deadline) = shrink_deadline.filter(|deadline| *deadline <= at) {
            advance_to(&clock, deadline);
            if surface.shrink_window_elapsed(deadline) {
                let at_ms = millis_since(start, deadline);
                steps.push(step(&surface, at_ms, "shrink window closed", None));
            }
            shrink_deadline = surface.shrink_window_expiry();
        }
        advance_to(&clock, at);
        let now = clock.now();

        let (action, outcome) = match entry.event {
            TimelineEvent::Sample { height, generation } => {
                let generation = generation.map(Generation).unwrap_or(surface.generation());
                let outcome = surface.receive(InboundMessage::height(generation, height), now);
                (format!("sample {height} from {generation}"), outcome)
            }
            TimelineEvent::Message {
                payload,
                generation,
            } => {
                let generation = generation.map(Generation).unwrap_or(surface.generation());
                let outcome = surface.receive(InboundMessage::new(generation, payload), now);
                ("message".to_string(), outcome)
            }
            other => {
                let action = apply_setting(&mut report, other);
                for effect in surface.configure(report.clone(), now) {
                    if let SurfaceEffect::ArmShrinkWindow { deadline } = effect {
                        shrink_deadline = Some(deadline);
                    }
                }
                (action, None)
            }
        };

        steps.push(step(&surface, entry.at_ms, &action, outcome));
    }

    steps
}

fn apply_setting(report: &mut ReportConfiguration, event: TimelineEvent) -> String {
    match event {
        TimelineEvent::Address { address } => {
            report.raw_address = address.trim().to_string();
            "address changed".into()
        }
        TimelineEvent::Zoom { zoom } => {
            report.zoom = Some(zoom);
            format!("zoom {}", zoom.label())
        }
        TimelineEvent::Toolbar { show } => {
            report.show_toolbar = show;
            format!("toolbar {}", if show { "shown" } else { "hidden" })
        }
        TimelineEvent::ParameterPane { show } => {
            report.show_parameters = show;
            format!("parameters {}", if show { "shown" } else { "collapsed" })
        }
        TimelineEvent::CustomParameters { parameters } => {
            report.custom_parameters = parameters;
            "custom parameters changed".into()
        }
        TimelineEvent::Height { height } => {
            report.declared_height = height;
            format!("declared height {height}")
        }
        TimelineEvent::AutoFit { enabled } => {
            report.auto_fit = enabled;
            format!("auto-fit {}", if enabled { "on" } else { "off" })
        }
        TimelineEvent::Sample { .. } | TimelineEvent::Message { .. } => "message".into(),
    }
}

fn step(
    surface: &EmbeddingSurface,
    at_ms: u64,
    action: &str,
    outcome: Option<SampleOutcome>,
) -> ReplayStep {
    ReplayStep {
        at_ms,
        action: action.to_string(),
        outcome,
        frame_height: surface.view().height(),
        generation: surface.generation(),
    }
}

fn advance_to(clock: &ManualClock, at: Instant) {
    let now = clock.now();
    if at > now {
        clock.advance(at - now);
    }
}

fn millis_since(start: Instant, at: Instant) -> u64 {
    at.saturating_duration_since(start).as_millis() as u64
}

fn describe(outcome: &SampleOutcome) -> String {
    match outcome {
        SampleOutcome::Accepted { display_height } => format!("accepted, frame {display_height}px"),
        SampleOutcome::SuppressedShrink { diff } => format!("shrink of {diff}px suppressed"),
        SampleOutcome::SuppressedJitter { diff } => format!("jitter of {diff}px ignored"),
        SampleOutcome::IgnoredAutoFitDisabled => "ignored, auto-fit off".into(),
        SampleOutcome::IgnoredStaleGeneration { received, .. } => {
            format!("ignored, content gen-{received} was replaced")
        }
    }
}
