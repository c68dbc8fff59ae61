//! Per-frame cycle orchestration.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crate::detect::DetectorBackend;
use crate::event::{build_records, OutboundMessage};
use crate::heartbeat::HeartbeatScheduler;
use crate::ingest::FrameSource;
use crate::transport::{Connect, StreamClient};
use crate::zones::ZoneSet;

const INITIAL_CONNECT_ATTEMPTS: u32 = 3;
const HEALTH_LOG_INTERVAL: Duration = Duration::from_secs(5);

/// Size bounds applied to detector boxes (width only).
#[derive(Clone, Copy, Debug)]
pub struct SizeBounds {
    pub min: i32,
    pub max: i32,
}

/// The node loop: pull frame, detect, classify, build, send; heartbeat on the
/// side; one cycle at a time.
///
/// Cycle N+1 never starts before cycle N's send completed or failed, so
/// back-pressure is implicit. All per-cycle failures are absorbed: a frame
/// read error or detector error skips the cycle, a send error is handled
/// inside the stream client.
pub struct Node<C: Connect> {
    camera_id: String,
    source: Box<dyn FrameSource>,
    detector: Arc<Mutex<dyn DetectorBackend>>,
    zones: ZoneSet,
    size_bounds: SizeBounds,
    client: StreamClient<C>,
    heartbeat: HeartbeatScheduler,
    cycle_pause: Duration,
    frames_processed: u64,
    released: bool,
}

impl<C: Connect> Node<C> {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        camera_id: &str,
        source: Box<dyn FrameSource>,
        detector: Arc<Mutex<dyn DetectorBackend>>,
        zones: ZoneSet,
        size_bounds: SizeBounds,
        client: StreamClient<C>,
        heartbeat: HeartbeatScheduler,
        cycle_pause: Duration,
    ) -> Self {
        Self {
            camera_id: camera_id.to_string(),
            source,
            detector,
            zones,
            size_bounds,
            client,
            heartbeat,
            cycle_pause,
            frames_processed: 0,
            released: false,
        }
    }

    /// Swap in a new zone snapshot. Takes effect from the next cycle; the
    /// classifier never observes a partially updated set.
    pub fn update_zones(&mut self, zones: ZoneSet) {
        log::info!("zone configuration updated ({} zones)", zones.len());
        self.zones = zones;
    }

    /// Run until the flag clears or the frame source ends. Cleanup runs on
    /// every exit path.
    pub fn run(&mut self, running: &AtomicBool) {
        if let Err(e) = self.client.connect(INITIAL_CONNECT_ATTEMPTS) {
            // Not fatal: the send path keeps retrying indefinitely.
            log::warn!("{:#}; will keep retrying on the send path", e);
        }

        log::info!("camera node {} running", self.camera_id);
        self.run_cycles(running);
        self.shutdown();
    }

    fn run_cycles(&mut self, running: &AtomicBool) {
        let mut last_health_log = Instant::now();

        while running.load(Ordering::SeqCst) {
            let frame = match self.source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => {
                    log::info!("frame source ended");
                    break;
                }
                Err(e) => {
                    log::warn!("failed to read frame: {:#}", e);
                    continue;
                }
            };
            self.frames_processed += 1;

            let output = {
                let mut detector = match self.detector.lock() {
                    Ok(guard) => guard,
                    Err(_) => {
                        log::error!("detector lock poisoned, skipping cycle");
                        continue;
                    }
                };
                match detector.detect(&frame.pixels, frame.width, frame.height) {
                    Ok(output) => output,
                    Err(e) => {
                        log::warn!("detection failed: {:#}", e);
                        continue;
                    }
                }
            };

            let records = build_records(
                &output,
                &self.zones,
                self.size_bounds.min,
                self.size_bounds.max,
            );
            if !records.is_empty() {
                let count = records.len();
                if self
                    .client
                    .send(&OutboundMessage::detection(&self.camera_id, records))
                {
                    log::debug!("sent {} detections", count);
                }
            }

            if self.heartbeat.due() {
                self.client.send(&OutboundMessage::heartbeat(&self.camera_id));
            }

            if last_health_log.elapsed() >= HEALTH_LOG_INTERVAL {
                let stats = self.client.stats();
                log::info!(
                    "health: frames={} state={:?} sent={} send_failures={}",
                    self.frames_processed,
                    self.client.state(),
                    stats.messages_sent,
                    stats.send_failures
                );
                last_health_log = Instant::now();
            }

            std::thread::sleep(self.cycle_pause);
        }
    }

    /// Cleanup: close the stream client, release the frame source. Idempotent
    /// and invoked from `run` and `Drop`, so it executes no matter how the
    /// loop ended.
    pub fn shutdown(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.client.close();
        self.source.release();
        log::info!("camera node {} stopped", self.camera_id);
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }
}

impl<C: Connect> Drop for Node<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
