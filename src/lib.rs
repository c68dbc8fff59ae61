//! Lookout camera node.
//!
//! An edge node that captures video frames, classifies detected persons into
//! configured spatial zones, and streams newline-delimited JSON events to a
//! central aggregator over a persistent TCP connection, recovering
//! automatically from connection loss.
//!
//! # Module Structure
//!
//! - `ingest`: frame sources (`stub://` synthetic; real capture is external)
//! - `detect`: detector backends producing boxes plus a parallel score sequence
//! - `zones`: zone configuration and point classification
//! - `event`: outbound message types and detection-record building
//! - `transport`: reliable aggregator stream client
//! - `heartbeat`: periodic liveness signal timing
//! - `node`: per-frame cycle orchestration and shutdown sequencing
//! - `config`: startup configuration (file, env, CLI layering)

pub mod config;
pub mod detect;
pub mod event;
pub mod heartbeat;
pub mod ingest;
pub mod node;
pub mod transport;
pub mod zones;

pub use config::NodeConfig;
pub use detect::{BackendRegistry, DetectorBackend, DetectorOutput, DiffBackend, RawDetection, StubBackend};
pub use event::{build_records, DetectionRecord, OutboundMessage, FALLBACK_CONFIDENCE, STATUS_ONLINE};
pub use heartbeat::HeartbeatScheduler;
pub use ingest::{open_source, CameraConfig, Frame, FrameSource, SyntheticSource};
pub use node::{Node, SizeBounds};
pub use transport::{Connect, ConnectionState, StreamClient, StreamStats, TcpConnector};
pub use zones::{Zone, ZoneSet};
