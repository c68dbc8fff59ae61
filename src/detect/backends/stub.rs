use anyhow::Result;

use crate::detect::backend::DetectorBackend;
use crate::detect::result::{DetectorOutput, RawDetection};

const BOX_WIDTH: i32 = 80;
const BOX_HEIGHT: i32 = 160;
const STEP: u64 = 16;

/// Stub backend for demos and tests. Emits one synthetic person box that
/// walks across the frame, with a fixed score.
pub struct StubBackend {
    frame_count: u64,
}

impl StubBackend {
    pub fn new() -> Self {
        Self { frame_count: 0 }
    }
}

impl Default for StubBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectorBackend for StubBackend {
    fn name(&self) -> &'static str {
        "stub"
    }

    fn detect(&mut self, _pixels: &[u8], width: u32, height: u32) -> Result<DetectorOutput> {
        self.frame_count += 1;

        let span = (width as i32 - BOX_WIDTH).max(1) as u64;
        let x = (self.frame_count.wrapping_mul(STEP) % span) as i32;
        let y = (height as i32 - BOX_HEIGHT).max(0) / 2;

        Ok(DetectorOutput {
            boxes: vec![RawDetection {
                x,
                y,
                width: BOX_WIDTH,
                height: BOX_HEIGHT,
            }],
            scores: vec![0.9],
        })
    }
}
