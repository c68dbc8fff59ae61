//! Outbound event types and detection-record building.
//!
//! Wire format is newline-delimited JSON: each message serializes to one
//! UTF-8 JSON object terminated by `\n`; the aggregator frames on newline
//! boundaries. Timestamps are ISO-8601 text.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::detect::DetectorOutput;
use crate::zones::ZoneSet;

/// Status string carried by heartbeats.
pub const STATUS_ONLINE: &str = "online";

/// Confidence used when the detector emitted fewer scores than boxes.
pub const FALLBACK_CONFIDENCE: f32 = 0.8;

/// A zone-annotated person detection, immutable once built.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DetectionRecord {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
    pub center_x: i32,
    pub center_y: i32,
    pub zone: String,
    pub confidence: f32,
    pub timestamp: DateTime<Utc>,
}

/// Messages sent from the node to the aggregator.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    CameraRegistration {
        camera_id: String,
        timestamp: DateTime<Utc>,
    },
    PersonDetection {
        camera_id: String,
        detections: Vec<DetectionRecord>,
        timestamp: DateTime<Utc>,
    },
    Heartbeat {
        camera_id: String,
        status: String,
        timestamp: DateTime<Utc>,
    },
}

impl OutboundMessage {
    pub fn registration(camera_id: &str) -> Self {
        Self::CameraRegistration {
            camera_id: camera_id.to_string(),
            timestamp: Utc::now(),
        }
    }

    pub fn detection(camera_id: &str, detections: Vec<DetectionRecord>) -> Self {
        Self::PersonDetection {
            camera_id: camera_id.to_string(),
            detections,
            timestamp: Utc::now(),
        }
    }

    pub fn heartbeat(camera_id: &str) -> Self {
        Self::Heartbeat {
            camera_id: camera_id.to_string(),
            status: STATUS_ONLINE.to_string(),
            timestamp: Utc::now(),
        }
    }

    /// Serialize to the wire framing: one JSON object plus a trailing newline.
    pub fn to_wire(&self) -> Result<Vec<u8>> {
        let mut bytes = serde_json::to_vec(self)?;
        bytes.push(b'\n');
        Ok(bytes)
    }
}

/// Convert raw detector output into zone-annotated detection records.
///
/// For each box: compute the integer center, keep the box only when its width
/// lies in `[min_size, max_size]` (height is not filtered), classify the
/// center against the zone set, and drop boxes whose center lands in no
/// enabled zone. The score is looked up by the box's index in the detector
/// output; a missing score falls back to [`FALLBACK_CONFIDENCE`]. Output
/// preserves the input order of surviving boxes, and every record in one call
/// shares a single capture timestamp.
pub fn build_records(
    output: &DetectorOutput,
    zones: &ZoneSet,
    min_size: i32,
    max_size: i32,
) -> Vec<DetectionRecord> {
    let timestamp = Utc::now();
    let mut records = Vec::new();

    for (index, raw) in output.boxes.iter().enumerate() {
        if raw.width < min_size || raw.width > max_size {
            continue;
        }

        // Integer centers; saturating so a garbage box from the detector can
        // never take the pipeline down.
        let center_x = raw.x.saturating_add(raw.width / 2);
        let center_y = raw.y.saturating_add(raw.height / 2);

        let Some(zone) = zones.classify(center_x, center_y) else {
            continue;
        };

        let confidence = output
            .scores
            .get(index)
            .copied()
            .unwrap_or(FALLBACK_CONFIDENCE);

        records.push(DetectionRecord {
            x: raw.x,
            y: raw.y,
            width: raw.width,
            height: raw.height,
            center_x,
            center_y,
            zone: zone.to_string(),
            confidence,
            timestamp,
        });
    }

    records
}
