//! Zone configuration and point classification.
//!
//! Zones are named axis-aligned rectangles in frame-pixel coordinates. A
//! `ZoneSet` is an ordered, immutable snapshot of the current configuration:
//! the aggregator-driven update path swaps in a whole new set between cycles
//! instead of mutating zones in place.

use serde::{Deserialize, Serialize};

/// Named rectangular region of interest in frame-pixel coordinates.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Zone {
    pub name: String,

    /// Zones missing the flag in config are treated as disabled.
    #[serde(default)]
    pub enabled: bool,

    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Zone {
    /// True when the point lies inside the rectangle, boundaries included.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        self.x <= x && x <= self.x + self.width && self.y <= y && y <= self.y + self.height
    }
}

/// Ordered, immutable set of zones.
///
/// Iteration order is configuration order. Overlapping zones are resolved by
/// first match, so configuration order is the tie-break.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ZoneSet {
    zones: Vec<Zone>,
}

impl ZoneSet {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self { zones }
    }

    /// Classify a point against the zone set.
    ///
    /// Returns the name of the first enabled zone (in configuration order)
    /// containing the point, or `None` when no enabled zone matches.
    pub fn classify(&self, x: i32, y: i32) -> Option<&str> {
        self.zones
            .iter()
            .filter(|zone| zone.enabled)
            .find(|zone| zone.contains(x, y))
            .map(|zone| zone.name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}
