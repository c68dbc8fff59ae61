/// Axis-aligned bounding box from the detector, in original-frame coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RawDetection {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Output of one detector pass over a frame.
///
/// `scores` parallels `boxes` by index, but backends may emit fewer scores
/// than boxes. Consumers must bounds-check score lookups.
#[derive(Clone, Debug, Default)]
pub struct DetectorOutput {
    pub boxes: Vec<RawDetection>,
    pub scores: Vec<f32>,
}

impl DetectorOutput {
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
