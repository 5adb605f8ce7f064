//! The decoded CGM measurement.

use serde::{Deserialize, Serialize};

/// A single decoded measurement: value, unit and the time the source
/// notification was posted.
///
/// Readings are only produced by an [`Extractor`](crate::extract::Extractor),
/// which guarantees a non-empty unit token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    value: f64,
    unit: String,
    timestamp_millis: i64,
}

impl Reading {
    pub fn new(value: f64, unit: impl Into<String>, timestamp_millis: i64) -> Self {
        Self {
            value,
            unit: unit.into(),
            timestamp_millis,
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Post time of the notification this reading was decoded from (epoch ms).
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp_millis
    }
}

/// Payload delivered to observers for every decoded reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadingBroadcast {
    pub reading: Reading,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_serializes_reading() {
        let broadcast = ReadingBroadcast {
            reading: Reading::new(5.5, "mmol/l", 1_700_000_000_000),
        };
        let json = serde_json::to_value(&broadcast).unwrap();
        assert_eq!(json["reading"]["value"], 5.5);
        assert_eq!(json["reading"]["unit"], "mmol/l");
        assert_eq!(json["reading"]["timestamp_millis"], 1_700_000_000_000i64);
    }
}
