//! Frame ingestion sources.
//!
//! The camera and its driver are external collaborators; this module defines
//! the seam they plug into plus a synthetic source for `stub://` URLs so the
//! daemon and tests run without hardware. Sources produce `Frame` instances
//! that flow through the detection pipeline and are discarded at the end of
//! the cycle.

use anyhow::{bail, Result};

/// A captured frame handed to the detector. Tightly packed RGB rows.
pub struct Frame {
    pub pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Source of frames for the node loop.
pub trait FrameSource: Send {
    /// Capture the next frame. `Ok(None)` means the source is exhausted and
    /// the loop should wind down; `Err` is transient and skips one cycle.
    fn next_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the underlying device. Must be safe to call repeatedly.
    fn release(&mut self) {}
}

/// Configuration for a camera source.
#[derive(Clone, Debug)]
pub struct CameraConfig {
    /// Source URL (e.g. `stub://camera0`).
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            url: "stub://camera0".to_string(),
            width: 1920,
            height: 1080,
            target_fps: 30,
        }
    }
}

/// Open a frame source for the configured URL.
///
/// `stub://` URLs produce a synthetic source; real capture backends live
/// outside this crate and register their own schemes.
pub fn open_source(config: &CameraConfig) -> Result<Box<dyn FrameSource>> {
    if config.url.starts_with("stub://") {
        return Ok(Box::new(SyntheticSource::new(config.clone())));
    }
    bail!("unsupported camera url scheme: {}", config.url)
}

/// Synthetic frame source for `stub://` URLs.
///
/// Generates deterministic pattern pixels with an occasional scene change so
/// frame-differencing backends see motion.
pub struct SyntheticSource {
    config: CameraConfig,
    frame_count: u64,
    scene_state: u8,
    released: bool,
}

impl SyntheticSource {
    pub fn new(config: CameraConfig) -> Self {
        log::info!("SyntheticSource: opened {}", config.url);
        Self {
            config,
            frame_count: 0,
            scene_state: 0,
            released: false,
        }
    }

    fn generate_pixels(&mut self) -> Vec<u8> {
        let pixel_count = (self.config.width * self.config.height * 3) as usize;

        // Shift the scene every 50 frames to simulate object entry.
        if self.frame_count % 50 == 0 {
            self.scene_state = self.scene_state.wrapping_add(1);
        }

        let mut pixels = vec![0u8; pixel_count];
        for (i, pixel) in pixels.iter_mut().enumerate() {
            *pixel = ((i as u64 + self.scene_state as u64 * 64) % 256) as u8;
        }
        pixels
    }
}

impl FrameSource for SyntheticSource {
    fn next_frame(&mut self) -> Result<Option<Frame>> {
        self.frame_count += 1;
        let pixels = self.generate_pixels();
        Ok(Some(Frame {
            pixels,
            width: self.config.width,
            height: self.config.height,
        }))
    }

    fn release(&mut self) {
        if !self.released {
            self.released = true;
            log::info!("SyntheticSource: released {}", self.config.url);
        }
    }
}
