//! lookoutd - Lookout camera node daemon.
//!
//! This daemon:
//! 1. Captures frames from the configured source
//! 2. Runs the selected person-detection backend on each frame
//! 3. Classifies detections into configured zones
//! 4. Streams detection events and heartbeats to the central aggregator
//! 5. Reconnects with a fixed delay whenever the aggregator link drops

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use lookout_node::{
    ingest, BackendRegistry, DiffBackend, HeartbeatScheduler, Node, NodeConfig, SizeBounds,
    StreamClient, StubBackend, TcpConnector,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Zone detection camera node")]
struct Args {
    /// Path to the JSON config file.
    #[arg(long, env = "LOOKOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Unique camera identifier.
    #[arg(long)]
    camera_id: Option<String>,

    /// Central aggregator host.
    #[arg(long)]
    server_host: Option<String>,

    /// Central aggregator port.
    #[arg(long)]
    server_port: Option<u16>,

    /// Camera source URL (e.g. stub://camera0).
    #[arg(long)]
    camera: Option<String>,

    /// Detector backend name.
    #[arg(long)]
    detector: Option<String>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = NodeConfig::load_from(args.config.as_deref())?;
    if let Some(camera_id) = args.camera_id {
        cfg.camera_id = camera_id;
    }
    if let Some(host) = args.server_host {
        cfg.server_host = host;
    }
    if let Some(port) = args.server_port {
        cfg.server_port = port;
    }
    if let Some(url) = args.camera {
        cfg.camera.url = url;
    }
    if let Some(backend) = args.detector {
        cfg.detector_backend = backend;
    }
    cfg.validate()?;

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = running.clone();
    ctrlc::set_handler(move || {
        log::info!("shutdown signal received");
        handler_flag.store(false, Ordering::SeqCst);
    })
    .context("install shutdown handler")?;

    let mut registry = BackendRegistry::new();
    registry.register(StubBackend::new());
    registry.register(DiffBackend::new());
    let detector = registry.select(&cfg.detector_backend)?;
    detector
        .lock()
        .map_err(|_| anyhow::anyhow!("detector backend lock poisoned"))?
        .warm_up()
        .context("warm up detector backend")?;

    let source = ingest::open_source(&cfg.camera)?;
    let connector = TcpConnector::new(&cfg.server_host, cfg.server_port);
    let client = StreamClient::new(connector, &cfg.camera_id, cfg.retry_delay);
    let heartbeat = HeartbeatScheduler::new(cfg.heartbeat_period);

    log::info!(
        "camera node {} -> {}:{} (camera {}, detector {})",
        cfg.camera_id,
        cfg.server_host,
        cfg.server_port,
        cfg.camera.url,
        cfg.detector_backend
    );

    let mut node = Node::new(
        &cfg.camera_id,
        source,
        detector,
        cfg.zones.clone(),
        SizeBounds {
            min: cfg.min_person_size,
            max: cfg.max_person_size,
        },
        client,
        heartbeat,
        cfg.cycle_pause,
    );
    node.run(&running);

    Ok(())
}
