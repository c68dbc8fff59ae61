use anyhow::Result;

use crate::detect::result::DetectorOutput;

/// Detector backend trait.
///
/// Implementations receive a read-only pixel slice and return bounding boxes
/// with a parallel score sequence. The slice is ephemeral; backends that need
/// frame history (frame differencing) keep their own copies.
pub trait DetectorBackend: Send {
    /// Backend identifier, used for config selection.
    fn name(&self) -> &'static str;

    /// Run detection on a frame.
    fn detect(&mut self, pixels: &[u8], width: u32, height: u32) -> Result<DetectorOutput>;

    /// Optional warm-up hook.
    fn warm_up(&mut self) -> Result<()> {
        Ok(())
    }
}
