//! Filtering thresholds.

use std::time::Duration;

/// Thresholds applied to incoming height samples.
///
/// The defaults are the values the viewer has shipped with; operators tune
/// them through the `[sync]` configuration section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconcilePolicy {
    /// Changes of at most this many pixels are measurement jitter.
    pub jitter_tolerance: u32,
    /// Drops larger than this are ignored unless shrinking is allowed.
    pub shrink_guard: u32,
    /// Added to an accepted height for borders and margins.
    pub display_buffer: u32,
    /// How long shrinking stays allowed after a display setting changes.
    pub shrink_window: Duration,
}

impl Default for ReconcilePolicy {
    fn default() -> Self {
        Self {
            jitter_tolerance: 5,
            shrink_guard: 50,
            display_buffer: 25,
            shrink_window: Duration::from_secs(5),
        }
    }
}

impl ReconcilePolicy {
    pub fn from_config(config: &reportframe_config::SyncConfig) -> Self {
        Self {
            jitter_tolerance: config.jitter_tolerance_px,
            shrink_guard: config.shrink_guard_px,
            display_buffer: config.display_buffer_px,
            shrink_window: config.shrink_window(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_defaults_match_policy_defaults() {
        let from_config = ReconcilePolicy::from_config(&reportframe_config::SyncConfig::default());
        assert_eq!(from_config, ReconcilePolicy::default());
    }
}
