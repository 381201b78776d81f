//! Height signals crossing from embedded content to the host.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifies one load of the embedded content.
///
/// The host bumps the generation every time it reloads the frame; messages
/// tagged with an older generation come from content that has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct Generation(pub u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Generation(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gen-{}", self.0)
    }
}

/// The payload posted by the reporter agent: `{ "reportHeight": <integer> }`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightMessage {
    #[serde(rename = "reportHeight")]
    pub report_height: u32,
}

impl HeightMessage {
    pub fn new(report_height: u32) -> Self {
        Self { report_height }
    }

    /// Interpret an arbitrary message from the channel.
    ///
    /// Returns `None` for anything that is not an object with a numeric,
    /// finite, non-negative `reportHeight`; other traffic on the channel is
    /// not ours to interpret.
    pub fn from_payload(payload: &serde_json::Value) -> Option<Self> {
        let height = payload.as_object()?.get("reportHeight")?;
        if let Some(h) = height.as_u64() {
            return u32::try_from(h).ok().map(Self::new);
        }
        let h = height.as_f64()?;
        if !h.is_finite() || h < 0.0 || h > f64::from(u32::MAX) {
            return None;
        }
        Some(Self::new(h.round() as u32))
    }

    pub fn to_payload(&self) -> serde_json::Value {
        serde_json::json!({ "reportHeight": self.report_height })
    }
}

/// A measurement accepted off the channel, stamped on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeightSample {
    pub value: u32,
    pub observed_at: DateTime<Utc>,
}

impl HeightSample {
    pub fn new(value: u32) -> Self {
        Self {
            value,
            observed_at: Utc::now(),
        }
    }
}

impl From<HeightMessage> for HeightSample {
    fn from(message: HeightMessage) -> Self {
        Self::new(message.report_height)
    }
}

/// A raw message as received by the host, tagged with its content generation.
#[derive(Debug, Clone, PartialEq)]
pub struct InboundMessage {
    pub generation: Generation,
    pub payload: serde_json::Value,
}

impl InboundMessage {
    pub fn new(generation: Generation, payload: serde_json::Value) -> Self {
        Self {
            generation,
            payload,
        }
    }

    /// A well-formed height message for `generation`.
    pub fn height(generation: Generation, report_height: u32) -> Self {
        Self::new(generation, HeightMessage::new(report_height).to_payload())
    }

    /// The height sample carried by this message, if it is one.
    pub fn sample(&self) -> Option<HeightSample> {
        HeightMessage::from_payload(&self.payload).map(HeightSample::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn height_message_uses_wire_field_name() {
        let json = serde_json::to_string(&HeightMessage::new(812)).unwrap();
        assert_eq!(json, r#"{"reportHeight":812}"#);
    }

    #[test]
    fn from_payload_accepts_integer_and_float_heights() {
        assert_eq!(
            HeightMessage::from_payload(&json!({ "reportHeight": 640 })),
            Some(HeightMessage::new(640))
        );
        assert_eq!(
            HeightMessage::from_payload(&json!({ "reportHeight": 640.6 })),
            Some(HeightMessage::new(641))
        );
    }

    #[test]
    fn from_payload_ignores_unrelated_messages() {
        assert!(HeightMessage::from_payload(&json!("hello")).is_none());
        assert!(HeightMessage::from_payload(&json!({ "type": "resize" })).is_none());
        assert!(HeightMessage::from_payload(&json!({ "reportHeight": "800" })).is_none());
        assert!(HeightMessage::from_payload(&json!({ "reportHeight": -20 })).is_none());
        assert!(HeightMessage::from_payload(&json!({ "reportHeight": null })).is_none());
    }

    #[test]
    fn extra_fields_are_not_interpreted() {
        let payload = json!({ "reportHeight": 900, "source": "viewer" });
        assert_eq!(
            HeightMessage::from_payload(&payload),
            Some(HeightMessage::new(900))
        );
    }

    #[test]
    fn generations_are_ordered() {
        let first = Generation::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.to_string(), "gen-1");
    }

    #[test]
    fn inbound_height_round_trips_to_sample() {
        let message = InboundMessage::height(Generation(3), 777);
        assert_eq!(message.sample().map(|s| s.value), Some(777));
    }
}
