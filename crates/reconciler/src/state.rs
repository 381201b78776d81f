//! Synchronization state and its pure transitions.
//!
//! Nothing here reads a clock or touches a timer: every transition takes the
//! current instant as an argument and returns the next state.

use std::time::Instant;

use crate::policy::ReconcilePolicy;

/// What the reconciler remembers between samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncState {
    /// Last raw sample that was accepted (no display buffer applied).
    pub last_accepted_height: u32,
    /// Whether large drops are currently believed to be genuine.
    pub shrink_allowed: bool,
    /// When the current shrink-allowance window closes.
    pub shrink_window_expiry: Option<Instant>,
}

/// The verdict on one raw sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleDecision {
    Accept,
    /// A large drop outside a shrink window, presumed transient.
    RejectShrink { diff: i64 },
    /// A change within the jitter tolerance.
    RejectJitter { diff: i64 },
}

impl SyncState {
    /// State at mount: nothing accepted yet beyond the declared height.
    pub fn mounted(declared_height: u32) -> Self {
        Self {
            last_accepted_height: declared_height,
            shrink_allowed: false,
            shrink_window_expiry: None,
        }
    }

    /// A display setting changed: start over from the declared height and
    /// allow shrinking until the (replaced) window closes.
    pub fn settings_changed(
        &self,
        declared_height: u32,
        now: Instant,
        policy: &ReconcilePolicy,
    ) -> Self {
        Self {
            last_accepted_height: declared_height,
            shrink_allowed: true,
            shrink_window_expiry: Some(now + policy.shrink_window),
        }
    }

    /// The shrink-window timer fired.
    ///
    /// A timer from a window that has since been replaced fires before the
    /// current expiry and leaves the window open.
    pub fn shrink_window_elapsed(&self, now: Instant) -> Self {
        match self.shrink_window_expiry {
            Some(expiry) if expiry <= now => Self {
                shrink_allowed: false,
                shrink_window_expiry: None,
                ..*self
            },
            _ => *self,
        }
    }

    /// The host changed the declared height directly.
    pub fn declared_height_changed(&self, declared_height: u32) -> Self {
        Self {
            last_accepted_height: declared_height,
            ..*self
        }
    }

    /// A sample was accepted.
    pub fn accepted(&self, value: u32) -> Self {
        Self {
            last_accepted_height: value,
            ..*self
        }
    }

    /// Whether shrinking is allowed at `now`, treating a passed expiry as
    /// closed even if its timer has not fired yet.
    pub fn shrink_allowed_at(&self, now: Instant) -> bool {
        self.shrink_allowed && self.shrink_window_expiry.is_none_or(|expiry| now < expiry)
    }

    /// Judge a raw sample against this state.
    pub fn evaluate(&self, value: u32, now: Instant, policy: &ReconcilePolicy) -> SampleDecision {
        let diff = i64::from(value) - i64::from(self.last_accepted_height);

        if diff < -i64::from(policy.shrink_guard) && !self.shrink_allowed_at(now) {
            return SampleDecision::RejectShrink { diff };
        }

        if diff.abs() <= i64::from(policy.jitter_tolerance) {
            return SampleDecision::RejectJitter { diff };
        }

        SampleDecision::Accept
    }
}
