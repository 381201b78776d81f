//! Height reconciliation — from raw height samples to a stable frame height.
//!
//! The embedded report reports its height every second, and those
//! measurements are noisy: they jitter by a few pixels, collapse briefly while
//! the report navigates, and keep arriving from content that has already
//! been replaced. [`HeightReconciler`] owns the synchronization state and
//! decides which samples move the frame.
//!
//! ## Rules
//!
//! 1. A drop of more than `shrink_guard` pixels is ignored unless a display
//!    setting changed within the last `shrink_window`.
//! 2. A change of at most `jitter_tolerance` pixels is ignored, so that a
//!    re-render perturbing the next measurement cannot oscillate.
//! 3. Anything else is accepted; the frame becomes `sample + display_buffer`.
//!
//! The state record and its transitions live in [`state`] and are pure; this
//! type adds generation tracking, the auto-fit switch and the derived display
//! height.

pub mod policy;
pub mod state;

use std::time::Instant;

use reportframe_core::{Generation, HeightSample};
use serde::Serialize;
use tracing::debug;

pub use policy::ReconcilePolicy;
pub use state::{SampleDecision, SyncState};

/// What happened to one sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SampleOutcome {
    Accepted { display_height: u32 },
    SuppressedShrink { diff: i64 },
    SuppressedJitter { diff: i64 },
    IgnoredAutoFitDisabled,
    IgnoredStaleGeneration { received: u64, current: u64 },
}

impl SampleOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, SampleOutcome::Accepted { .. })
    }
}

/// Owner of the synchronization state for one embedding surface.
#[derive(Debug, Clone)]
pub struct HeightReconciler {
    policy: ReconcilePolicy,
    state: SyncState,
    declared_height: u32,
    display_height: u32,
    auto_fit: bool,
    generation: Generation,
}

impl HeightReconciler {
    pub fn new(policy: ReconcilePolicy, declared_height: u32, auto_fit: bool) -> Self {
        Self {
            policy,
            state: SyncState::mounted(declared_height),
            declared_height,
            display_height: declared_height,
            auto_fit,
            generation: Generation::default(),
        }
    }

    /// The content was reloaded; samples from earlier loads are stale from now on.
    pub fn begin_generation(&mut self, generation: Generation) {
        debug!(%generation, "Tracking new content generation");
        self.generation = generation;
    }

    /// Toolbar, parameters or zoom changed. Returns when the shrink window closes.
    pub fn on_settings_changed(&mut self, now: Instant) -> Instant {
        self.state = self
            .state
            .settings_changed(self.declared_height, now, &self.policy);
        let expiry = now + self.policy.shrink_window;
        debug!(
            last_accepted = self.state.last_accepted_height,
            window_ms = self.policy.shrink_window.as_millis() as u64,
            "Display settings changed, allowing height to shrink"
        );
        expiry
    }

    /// The shrink-window timer fired. Returns whether the window closed.
    pub fn on_shrink_window_elapsed(&mut self, now: Instant) -> bool {
        let before = self.state.shrink_allowed;
        self.state = self.state.shrink_window_elapsed(now);
        let closed = before && !self.state.shrink_allowed;
        if closed {
            debug!("Shrink window closed");
        }
        closed
    }

    /// The host set a new declared height; it applies immediately.
    pub fn on_declared_height_changed(&mut self, declared_height: u32) {
        self.declared_height = declared_height;
        self.display_height = declared_height;
        self.state = self.state.declared_height_changed(declared_height);
        debug!(declared_height, "Declared height changed");
    }

    /// Turn sample consumption on or off. The display height is left as is.
    pub fn set_auto_fit(&mut self, enabled: bool) {
        if self.auto_fit != enabled {
            debug!(enabled, "Auto-fit toggled");
        }
        self.auto_fit = enabled;
    }

    /// Feed one raw sample from content of `generation`.
    pub fn on_sample(
        &mut self,
        generation: Generation,
        sample: &HeightSample,
        now: Instant,
    ) -> SampleOutcome {
        if !self.auto_fit {
            return SampleOutcome::IgnoredAutoFitDisabled;
        }

        if generation != self.generation {
            debug!(
                received = %generation,
                current = %self.generation,
                "Ignoring height from replaced content"
            );
            return SampleOutcome::IgnoredStaleGeneration {
                received: generation.0,
                current: self.generation.0,
            };
        }

        let decision = self.state.evaluate(sample.value, now, &self.policy);
        debug!(
            new_height = sample.value,
            last_height = self.state.last_accepted_height,
            allow_shrink = self.state.shrink_allowed_at(now),
            ?decision,
            "Height update received"
        );

        match decision {
            SampleDecision::RejectShrink { diff } => SampleOutcome::SuppressedShrink { diff },
            SampleDecision::RejectJitter { diff } => SampleOutcome::SuppressedJitter { diff },
            SampleDecision::Accept => {
                self.state = self.state.accepted(sample.value);
                self.display_height = sample.value.saturating_add(self.policy.display_buffer);
                debug!(display_height = self.display_height, "Applying height change");
                SampleOutcome::Accepted {
                    display_height: self.display_height,
                }
            }
        }
    }

    pub fn display_height(&self) -> u32 {
        self.display_height
    }

    pub fn last_accepted_height(&self) -> u32 {
        self.state.last_accepted_height
    }

    pub fn shrink_allowed(&self, now: Instant) -> bool {
        self.state.shrink_allowed_at(now)
    }

    /// When the pending shrink-window timer should fire, if one is pending.
    pub fn shrink_window_expiry(&self) -> Option<Instant> {
        self.state.shrink_window_expiry
    }

    pub fn auto_fit(&self) -> bool {
        self.auto_fit
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn reconciler(declared: u32) -> HeightReconciler {
        HeightReconciler::new(ReconcilePolicy::default(), declared, true)
    }

    fn feed(r: &mut HeightReconciler, value: u32, now: Instant) -> SampleOutcome {
        let generation = r.generation();
        r.on_sample(generation, &HeightSample::new(value), now)
    }

    #[test]
    fn mount_uses_declared_height() {
        let r = reconciler(800);
        assert_eq!(r.display_height(), 800);
        assert_eq!(r.last_accepted_height(), 800);
        assert!(!r.shrink_allowed(Instant::now()));
        assert_eq!(r.shrink_window_expiry(), None);
    }

    #[test]
    fn jitter_is_discarded_and_growth_accepted() {
        let mut r = reconciler(800);
        let now = Instant::now();
        assert_eq!(feed(&mut r, 800, now), SampleOutcome::SuppressedJitter { diff: 0 });
        assert_eq!(feed(&mut r, 802, now), SampleOutcome::SuppressedJitter { diff: 2 });
        assert_eq!(
            feed(&mut r, 900, now),
            SampleOutcome::Accepted { display_height: 925 }
        );
        assert_eq!(r.last_accepted_height(), 900);
        assert_eq!(r.display_height(), 925);
    }

    #[test]
    fn large_drop_is_suppressed_outside_shrink_window() {
        let mut r = reconciler(800);
        let now = Instant::now();
        feed(&mut r, 900, now);
        assert_eq!(
            feed(&mut r, 700, now),
            SampleOutcome::SuppressedShrink { diff: -200 }
        );
        assert_eq!(r.display_height(), 925);
    }

    #[test]
    fn large_drop_is_accepted_after_zoom_change() {
        let mut r = reconciler(800);
        let start = Instant::now();
        feed(&mut r, 900, start);

        let expiry = r.on_settings_changed(start);
        assert_eq!(expiry, start + Duration::from_secs(5));

        let outcome = feed(&mut r, 700, start + Duration::from_secs(2));
        assert_eq!(outcome, SampleOutcome::Accepted { display_height: 725 });
    }

    #[test]
    fn acceptance_does_not_consume_shrink_window() {
        let mut r = reconciler(800);
        let start = Instant::now();
        r.on_settings_changed(start);
        feed(&mut r, 1400, start);
        assert!(feed(&mut r, 600, start + Duration::from_secs(1)).is_accepted());
        assert!(r.shrink_allowed(start + Duration::from_secs(1)));
    }

    #[test]
    fn shrink_window_closes_after_timer() {
        let mut r = reconciler(800);
        let start = Instant::now();
        r.on_settings_changed(start);
        feed(&mut r, 1400, start);

        assert!(r.on_shrink_window_elapsed(start + Duration::from_secs(5)));
        assert_eq!(
            feed(&mut r, 600, start + Duration::from_secs(6)),
            SampleOutcome::SuppressedShrink { diff: -800 }
        );
    }

    #[test]
    fn late_timer_still_treats_passed_expiry_as_closed() {
        let mut r = reconciler(800);
        let start = Instant::now();
        r.on_settings_changed(start);
        feed(&mut r, 1400, start);
        assert!(matches!(
            feed(&mut r, 600, start + Duration::from_secs(7)),
            SampleOutcome::SuppressedShrink { .. }
        ));
    }

    #[test]
    fn declared_height_change_bypasses_filtering() {
        let mut r = reconciler(800);
        let now = Instant::now();
        feed(&mut r, 1500, now);
        r.on_declared_height_changed(1000);
        assert_eq!(r.display_height(), 1000);
        assert_eq!(r.last_accepted_height(), 1000);
        assert_eq!(
            feed(&mut r, 1003, now),
            SampleOutcome::SuppressedJitter { diff: 3 }
        );
    }

    #[test]
    fn settings_change_restarts_from_declared_height() {
        let mut r = reconciler(800);
        let now = Instant::now();
        feed(&mut r, 1500, now);
        r.on_settings_changed(now);
        assert_eq!(r.last_accepted_height(), 800);
        assert_eq!(r.display_height(), 1525);
    }

    #[test]
    fn auto_fit_toggle_freezes_and_resumes() {
        let mut r = reconciler(800);
        let now = Instant::now();
        feed(&mut r, 900, now);

        r.set_auto_fit(false);
        assert_eq!(feed(&mut r, 1200, now), SampleOutcome::IgnoredAutoFitDisabled);
        assert_eq!(feed(&mut r, 400, now), SampleOutcome::IgnoredAutoFitDisabled);
        assert_eq!(r.display_height(), 925);

        r.set_auto_fit(true);
        assert_eq!(feed(&mut r, 903, now), SampleOutcome::SuppressedJitter { diff: 3 });
        assert_eq!(
            feed(&mut r, 1200, now),
            SampleOutcome::Accepted { display_height: 1225 }
        );
    }

    #[test]
    fn auto_fit_disabled_tracks_declared_height_only() {
        let mut r = HeightReconciler::new(ReconcilePolicy::default(), 800, false);
        assert_eq!(feed(&mut r, 1200, Instant::now()), SampleOutcome::IgnoredAutoFitDisabled);
        r.on_declared_height_changed(1100);
        assert_eq!(r.display_height(), 1100);
    }

    #[test]
    fn samples_from_replaced_content_are_ignored() {
        let mut r = reconciler(800);
        let now = Instant::now();
        let old = r.generation();
        r.begin_generation(old.next());

        let outcome = r.on_sample(old, &HeightSample::new(1500), now);
        assert_eq!(
            outcome,
            SampleOutcome::IgnoredStaleGeneration {
                received: 0,
                current: 1
            }
        );
        assert_eq!(r.display_height(), 800);
    }

    #[test]
    fn custom_policy_thresholds_apply() {
        let policy = ReconcilePolicy {
            jitter_tolerance: 20,
            shrink_guard: 100,
            display_buffer: 0,
            shrink_window: Duration::from_secs(1),
        };
        let mut r = HeightReconciler::new(policy, 800, true);
        let now = Instant::now();
        assert!(matches!(feed(&mut r, 815, now), SampleOutcome::SuppressedJitter { .. }));
        assert_eq!(feed(&mut r, 730, now), SampleOutcome::Accepted { display_height: 730 });
    }
}
