use anyhow::{anyhow, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

use crate::ingest::CameraConfig;
use crate::zones::{Zone, ZoneSet};

const DEFAULT_SERVER_HOST: &str = "192.168.1.100";
const DEFAULT_SERVER_PORT: u16 = 8888;
const DEFAULT_DETECTOR: &str = "stub";
const DEFAULT_MIN_PERSON_SIZE: i32 = 50;
const DEFAULT_MAX_PERSON_SIZE: i32 = 200;
const DEFAULT_HEARTBEAT_SECS: u64 = 30;
const DEFAULT_RETRY_DELAY_SECS: u64 = 5;
const DEFAULT_CYCLE_PAUSE_MS: u64 = 100;

#[derive(Debug, Deserialize, Default)]
struct NodeConfigFile {
    camera_id: Option<String>,
    server: Option<ServerConfigFile>,
    camera: Option<CameraConfigFile>,
    detection: Option<DetectionConfigFile>,
    zones: Option<Vec<Zone>>,
    timing: Option<TimingConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
struct ServerConfigFile {
    host: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Deserialize, Default)]
struct CameraConfigFile {
    url: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    target_fps: Option<u32>,
}

#[derive(Debug, Deserialize, Default)]
struct DetectionConfigFile {
    backend: Option<String>,
    min_person_size: Option<i32>,
    max_person_size: Option<i32>,
}

#[derive(Debug, Deserialize, Default)]
struct TimingConfigFile {
    heartbeat_secs: Option<u64>,
    retry_delay_secs: Option<u64>,
    cycle_pause_ms: Option<u64>,
}

/// Resolved node configuration. Layering: file, then `LOOKOUT_*` environment
/// overrides, then CLI flags applied by the binary. Validation failures are
/// fatal at startup.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub camera_id: String,
    pub server_host: String,
    pub server_port: u16,
    pub camera: CameraConfig,
    pub detector_backend: String,
    pub min_person_size: i32,
    pub max_person_size: i32,
    pub zones: ZoneSet,
    pub heartbeat_period: Duration,
    pub retry_delay: Duration,
    pub cycle_pause: Duration,
}

impl NodeConfig {
    /// Load using the `LOOKOUT_CONFIG` path when set.
    pub fn load() -> Result<Self> {
        let config_path = std::env::var("LOOKOUT_CONFIG").ok();
        Self::load_from(config_path.as_deref().map(Path::new))
    }

    /// Load from an explicit config file path, or defaults when `None`.
    ///
    /// The result has environment overrides applied but is NOT yet validated;
    /// callers apply their own overrides and then call [`NodeConfig::validate`].
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let file_cfg = match path {
            Some(path) => read_config_file(path)?,
            None => NodeConfigFile::default(),
        };
        let mut cfg = Self::from_file(file_cfg);
        cfg.apply_env()?;
        Ok(cfg)
    }

    fn from_file(file: NodeConfigFile) -> Self {
        let server = file.server.unwrap_or_default();
        let camera_file = file.camera.unwrap_or_default();
        let detection = file.detection.unwrap_or_default();
        let timing = file.timing.unwrap_or_default();
        let camera_defaults = CameraConfig::default();

        Self {
            camera_id: file.camera_id.unwrap_or_default(),
            server_host: server
                .host
                .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
            server_port: server.port.unwrap_or(DEFAULT_SERVER_PORT),
            camera: CameraConfig {
                url: camera_file.url.unwrap_or(camera_defaults.url),
                width: camera_file.width.unwrap_or(camera_defaults.width),
                height: camera_file.height.unwrap_or(camera_defaults.height),
                target_fps: camera_file.target_fps.unwrap_or(camera_defaults.target_fps),
            },
            detector_backend: detection
                .backend
                .unwrap_or_else(|| DEFAULT_DETECTOR.to_string()),
            min_person_size: detection.min_person_size.unwrap_or(DEFAULT_MIN_PERSON_SIZE),
            max_person_size: detection.max_person_size.unwrap_or(DEFAULT_MAX_PERSON_SIZE),
            zones: ZoneSet::new(file.zones.unwrap_or_else(default_zones)),
            heartbeat_period: Duration::from_secs(
                timing.heartbeat_secs.unwrap_or(DEFAULT_HEARTBEAT_SECS),
            ),
            retry_delay: Duration::from_secs(
                timing.retry_delay_secs.unwrap_or(DEFAULT_RETRY_DELAY_SECS),
            ),
            cycle_pause: Duration::from_millis(
                timing.cycle_pause_ms.unwrap_or(DEFAULT_CYCLE_PAUSE_MS),
            ),
        }
    }

    fn apply_env(&mut self) -> Result<()> {
        if let Ok(camera_id) = std::env::var("LOOKOUT_CAMERA_ID") {
            if !camera_id.trim().is_empty() {
                self.camera_id = camera_id;
            }
        }
        if let Ok(host) = std::env::var("LOOKOUT_SERVER_HOST") {
            if !host.trim().is_empty() {
                self.server_host = host;
            }
        }
        if let Ok(port) = std::env::var("LOOKOUT_SERVER_PORT") {
            self.server_port = port
                .parse()
                .map_err(|_| anyhow!("LOOKOUT_SERVER_PORT must be a port number"))?;
        }
        if let Ok(url) = std::env::var("LOOKOUT_CAMERA_URL") {
            if !url.trim().is_empty() {
                self.camera.url = url;
            }
        }
        if let Ok(backend) = std::env::var("LOOKOUT_DETECTOR") {
            if !backend.trim().is_empty() {
                self.detector_backend = backend;
            }
        }
        if let Ok(heartbeat) = std::env::var("LOOKOUT_HEARTBEAT_SECS") {
            let seconds: u64 = heartbeat
                .parse()
                .map_err(|_| anyhow!("LOOKOUT_HEARTBEAT_SECS must be an integer number of seconds"))?;
            self.heartbeat_period = Duration::from_secs(seconds);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.camera_id.trim().is_empty() {
            return Err(anyhow!(
                "camera_id is required (config file, LOOKOUT_CAMERA_ID, or --camera-id)"
            ));
        }
        if self.server_host.trim().is_empty() {
            return Err(anyhow!("server host must not be empty"));
        }
        if self.server_port == 0 {
            return Err(anyhow!("server port must be nonzero"));
        }
        if self.detector_backend.trim().is_empty() {
            return Err(anyhow!("detector backend must not be empty"));
        }
        if self.min_person_size < 0 {
            return Err(anyhow!("min_person_size must not be negative"));
        }
        if self.max_person_size < self.min_person_size {
            return Err(anyhow!(
                "max_person_size ({}) must be >= min_person_size ({})",
                self.max_person_size,
                self.min_person_size
            ));
        }
        if self.camera.width == 0 || self.camera.height == 0 {
            return Err(anyhow!("camera dimensions must be nonzero"));
        }
        if self.camera.target_fps == 0 {
            return Err(anyhow!("camera target_fps must be nonzero"));
        }
        if self.heartbeat_period.as_secs() == 0 {
            return Err(anyhow!("heartbeat period must be greater than zero"));
        }

        let mut names = HashSet::new();
        for zone in self.zones.iter() {
            if zone.name.trim().is_empty() {
                return Err(anyhow!("zone names must not be empty"));
            }
            if zone.width < 0 || zone.height < 0 {
                return Err(anyhow!(
                    "zone '{}' has negative dimensions",
                    zone.name
                ));
            }
            if !names.insert(zone.name.as_str()) {
                return Err(anyhow!("duplicate zone name '{}'", zone.name));
            }
        }
        Ok(())
    }
}

/// Zones used when the config file defines none.
fn default_zones() -> Vec<Zone> {
    vec![
        Zone {
            name: "entry".to_string(),
            enabled: true,
            x: 100,
            y: 200,
            width: 300,
            height: 100,
        },
        Zone {
            name: "exit".to_string(),
            enabled: true,
            x: 500,
            y: 200,
            width: 300,
            height: 100,
        },
    ]
}

fn read_config_file(path: &Path) -> Result<NodeConfigFile> {
    let raw = std::fs::read_to_string(path)
        .map_err(|e| anyhow!("failed to read config file {}: {}", path.display(), e))?;
    let cfg = serde_json::from_str(&raw)
        .map_err(|e| anyhow!("invalid config file {}: {}", path.display(), e))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> NodeConfig {
        let mut cfg = NodeConfig::from_file(NodeConfigFile::default());
        cfg.camera_id = "cam-1".to_string();
        cfg
    }

    #[test]
    fn defaults_match_the_deployment_baseline() {
        let cfg = NodeConfig::from_file(NodeConfigFile::default());

        assert_eq!(cfg.server_host, "192.168.1.100");
        assert_eq!(cfg.server_port, 8888);
        assert_eq!(cfg.min_person_size, 50);
        assert_eq!(cfg.max_person_size, 200);
        assert_eq!(cfg.heartbeat_period, Duration::from_secs(30));
        assert_eq!(cfg.retry_delay, Duration::from_secs(5));
        assert_eq!(cfg.cycle_pause, Duration::from_millis(100));
        assert_eq!(cfg.zones.len(), 2);
        assert_eq!(cfg.zones.classify(170, 250), Some("entry"));
        assert_eq!(cfg.zones.classify(600, 250), Some("exit"));
    }

    #[test]
    fn missing_camera_id_is_rejected() {
        let cfg = NodeConfig::from_file(NodeConfigFile::default());
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn valid_config_passes_validation() {
        assert!(base_config().validate().is_ok());
    }

    #[test]
    fn inverted_size_bounds_are_rejected() {
        let mut cfg = base_config();
        cfg.min_person_size = 300;
        cfg.max_person_size = 200;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn negative_zone_dimensions_are_rejected() {
        let mut cfg = base_config();
        cfg.zones = ZoneSet::new(vec![Zone {
            name: "bad".to_string(),
            enabled: true,
            x: 0,
            y: 0,
            width: -1,
            height: 10,
        }]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn duplicate_zone_names_are_rejected() {
        let mut cfg = base_config();
        cfg.zones = ZoneSet::new(vec![
            Zone {
                name: "entry".to_string(),
                enabled: true,
                x: 0,
                y: 0,
                width: 10,
                height: 10,
            },
            Zone {
                name: "entry".to_string(),
                enabled: false,
                x: 20,
                y: 20,
                width: 10,
                height: 10,
            },
        ]);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_heartbeat_period_is_rejected() {
        let mut cfg = base_config();
        cfg.heartbeat_period = Duration::ZERO;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zone_order_from_file_is_preserved() {
        let file: NodeConfigFile = serde_json::from_str(
            r#"{
                "camera_id": "cam-1",
                "zones": [
                    {"name": "b", "enabled": true, "x": 0, "y": 0, "width": 100, "height": 100},
                    {"name": "a", "enabled": true, "x": 0, "y": 0, "width": 100, "height": 100}
                ]
            }"#,
        )
        .expect("parse");

        let cfg = NodeConfig::from_file(file);
        assert_eq!(cfg.zones.classify(50, 50), Some("b"));
    }
}
