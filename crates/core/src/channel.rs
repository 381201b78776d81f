//! ParentChannel — the one-way seam from embedded content to its host.
//!
//! Delivery is fire-and-forget: no acknowledgement, no retry. Implementations
//! must tolerate the host having gone away and never block the caller.

use crate::height::HeightMessage;
use std::sync::Mutex;

/// Posts messages from the embedded content to the immediate parent context.
pub trait ParentChannel: Send + Sync {
    /// Deliver one message. Failures are swallowed by the implementation.
    fn post(&self, message: &HeightMessage);
}

/// A channel that keeps every posted message; useful for tests and dry runs.
#[derive(Debug, Default)]
pub struct RecordingChannel {
    posted: Mutex<Vec<HeightMessage>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Heights posted so far, in order.
    pub fn heights(&self) -> Vec<u32> {
        self.posted
            .lock()
            .map(|posted| posted.iter().map(|m| m.report_height).collect())
            .unwrap_or_default()
    }
}

impl ParentChannel for RecordingChannel {
    fn post(&self, message: &HeightMessage) {
        if let Ok(mut posted) = self.posted.lock() {
            posted.push(*message);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_channel_keeps_order() {
        let channel = RecordingChannel::new();
        channel.post(&HeightMessage::new(10));
        channel.post(&HeightMessage::new(10));
        channel.post(&HeightMessage::new(30));
        assert_eq!(channel.heights(), vec![10, 10, 30]);
    }
}
