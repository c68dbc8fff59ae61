use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{DetectorOutput, RawDetection};

/// Per-byte delta above which a sampled pixel counts as changed.
const CHANGE_THRESHOLD: u8 = 32;
/// Sample every Nth byte when scanning for changes.
const SAMPLE_STEP: usize = 25;
/// Minimum changed fraction before a box is reported.
const MIN_CHANGED_FRACTION: f32 = 0.01;

/// Frame-differencing backend.
///
/// Remembers the previous frame and reports one bounding box covering the
/// region of pixels that changed beyond a threshold. The score is the changed
/// fraction of sampled pixels, capped at 1.0. Assumes tightly packed RGB rows.
pub struct DiffBackend {
    previous: Option<Vec<u8>>,
}

impl DiffBackend {
    pub fn new() -> Self {
        Self { previous: None }
    }
}

impl Default for DiffBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for DiffBackend {
    fn name(&self) -> &'static str {
        "diff"
    }

    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectorOutput> {
        let Some(previous) = self.previous.replace(pixels.to_vec()) else {
            return Ok(DetectorOutput::default());
        };
        if previous.len() != pixels.len() || width == 0 || height == 0 {
            return Ok(DetectorOutput::default());
        }

        let width = width as usize;
        let mut changed = 0usize;
        let mut sampled = 0usize;
        let mut min_x = usize::MAX;
        let mut max_x = 0usize;
        let mut min_y = usize::MAX;
        let mut max_y = 0usize;

        for i in (0..pixels.len()).step_by(SAMPLE_STEP) {
            sampled += 1;
            if pixels[i].abs_diff(previous[i]) <= CHANGE_THRESHOLD {
                continue;
            }
            changed += 1;
            let pixel = i / 3;
            let x = pixel % width;
            let y = pixel / width;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        if sampled == 0 {
            return Ok(DetectorOutput::default());
        }
        let fraction = changed as f32 / sampled as f32;
        if fraction < MIN_CHANGED_FRACTION {
            return Ok(DetectorOutput::default());
        }

        Ok(DetectorOutput {
            boxes: vec![RawDetection {
                x: min_x as i32,
                y: min_y as i32,
                width: (max_x - min_x) as i32,
                height: (max_y - min_y) as i32,
            }],
            scores: vec![fraction.min(1.0)],
        })
    }
}
