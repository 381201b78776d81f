//! The embedding surface state machine.

use std::time::Instant;

use reportframe_composer::Composer;
use reportframe_core::{Generation, InboundMessage, ReportConfiguration};
use reportframe_reconciler::{HeightReconciler, ReconcilePolicy, SampleOutcome};
use serde::Serialize;
use tracing::{debug, info};

use crate::address::AddressCache;

/// Shown instead of a frame while no address is configured.
pub const PLACEHOLDER_MESSAGE: &str = "Please configure the Report URL in the web part properties.";

/// Accessible title of the frame.
pub const FRAME_TITLE: &str = "SSRS Report Viewer";

/// What the host page tells the surface about where it renders.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HostContext {
    pub dark_theme: bool,
    /// Rendered inside a Teams tab.
    pub teams: bool,
}

impl HostContext {
    pub fn from_config(config: &reportframe_config::HostConfig) -> Self {
        Self {
            dark_theme: config.dark_theme,
            teams: config.teams_context,
        }
    }
}

/// What the host should render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameView {
    Placeholder {
        message: String,
    },
    Frame {
        src: String,
        height: u32,
        generation: Generation,
        title: String,
        teams: bool,
        dark_theme: bool,
    },
}

impl FrameView {
    pub fn height(&self) -> Option<u32> {
        match self {
            FrameView::Frame { height, .. } => Some(*height),
            FrameView::Placeholder { .. } => None,
        }
    }

    pub fn generation(&self) -> Option<Generation> {
        match self {
            FrameView::Frame { generation, .. } => Some(*generation),
            FrameView::Placeholder { .. } => None,
        }
    }
}

/// Side effects a configuration change asks of whoever drives the surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceEffect {
    /// Load `src` into the frame; content of earlier generations is gone.
    Reload { src: String, generation: Generation },
    /// Call [`EmbeddingSurface::shrink_window_elapsed`] at `deadline`.
    ArmShrinkWindow { deadline: Instant },
}

/// Binds one report configuration to a frame: composes its address, tracks
/// the content generation and reconciles reported heights.
#[derive(Debug, Clone)]
pub struct EmbeddingSurface {
    config: ReportConfiguration,
    addresses: AddressCache,
    address: String,
    reconciler: HeightReconciler,
    host: HostContext,
}

impl EmbeddingSurface {
    /// Mount the surface: compose the address and load generation 1.
    pub fn mount(
        mut config: ReportConfiguration,
        composer: Composer,
        policy: ReconcilePolicy,
        host: HostContext,
    ) -> Self {
        config.declared_height = ReportConfiguration::clamp_height(config.declared_height);
        let mut addresses = AddressCache::new(composer);
        let address = addresses.address_for(&config).to_string();
        let mut reconciler = HeightReconciler::new(policy, config.declared_height, config.auto_fit);

        if !address.is_empty() {
            reconciler.begin_generation(Generation::default().next());
            info!(src = %address, height = config.declared_height, "Mounted report frame");
        } else {
            info!("Mounted without a report address");
        }

        Self {
            config,
            addresses,
            address,
            reconciler,
            host,
        }
    }

    /// Apply a new configuration record.
    pub fn configure(&mut self, mut new: ReportConfiguration, now: Instant) -> Vec<SurfaceEffect> {
        new.declared_height = ReportConfiguration::clamp_height(new.declared_height);
        let old = std::mem::replace(&mut self.config, new);
        let new = &self.config;
        let mut effects = Vec::new();

        let address = self.addresses.address_for(new).to_string();
        if address != self.address {
            let generation = self.reconciler.generation().next();
            self.reconciler.begin_generation(generation);
            self.address = address;
            if !self.address.is_empty() {
                info!(src = %self.address, %generation, "Report address changed, reloading frame");
                effects.push(SurfaceEffect::Reload {
                    src: self.address.clone(),
                    generation,
                });
            }
        }

        if new.declared_height != old.declared_height {
            self.reconciler.on_declared_height_changed(new.declared_height);
        }

        if new.display_options() != old.display_options() {
            let deadline = self.reconciler.on_settings_changed(now);
            effects.push(SurfaceEffect::ArmShrinkWindow { deadline });
        }

        if new.auto_fit != old.auto_fit {
            self.reconciler.set_auto_fit(new.auto_fit);
        }

        effects
    }

    /// Handle a message from embedded content.
    ///
    /// Returns `None` when the payload is not a height message.
    pub fn receive(&mut self, message: InboundMessage, now: Instant) -> Option<SampleOutcome> {
        let Some(sample) = message.sample() else {
            debug!(generation = %message.generation, "Ignoring message without a usable reportHeight");
            return None;
        };
        Some(self.reconciler.on_sample(message.generation, &sample, now))
    }

    /// The shrink-window timer fired. Returns whether the window closed.
    pub fn shrink_window_elapsed(&mut self, now: Instant) -> bool {
        self.reconciler.on_shrink_window_elapsed(now)
    }

    pub fn view(&self) -> FrameView {
        if self.address.is_empty() {
            return FrameView::Placeholder {
                message: PLACEHOLDER_MESSAGE.to_string(),
            };
        }
        FrameView::Frame {
            src: self.address.clone(),
            height: self.reconciler.display_height(),
            generation: self.reconciler.generation(),
            title: FRAME_TITLE.to_string(),
            teams: self.host.teams,
            dark_theme: self.host.dark_theme,
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn configuration(&self) -> &ReportConfiguration {
        &self.config
    }

    pub fn generation(&self) -> Generation {
        self.reconciler.generation()
    }

    pub fn reconciler(&self) -> &HeightReconciler {
        &self.reconciler
    }

    pub fn shrink_window_expiry(&self) -> Option<Instant> {
        self.reconciler.shrink_window_expiry()
    }
}
