use std::sync::Mutex;
use std::time::Duration;

use tempfile::NamedTempFile;

use lookout_node::config::NodeConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_env() {
    for key in [
        "LOOKOUT_CONFIG",
        "LOOKOUT_CAMERA_ID",
        "LOOKOUT_SERVER_HOST",
        "LOOKOUT_SERVER_PORT",
        "LOOKOUT_CAMERA_URL",
        "LOOKOUT_DETECTOR",
        "LOOKOUT_HEARTBEAT_SECS",
    ] {
        std::env::remove_var(key);
    }
}

#[test]
fn loads_config_from_file_and_env_overrides() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    let json = r#"{
        "camera_id": "cam-entrance",
        "server": {
            "host": "10.0.0.5",
            "port": 9100
        },
        "camera": {
            "url": "stub://entrance",
            "width": 1280,
            "height": 720,
            "target_fps": 15
        },
        "detection": {
            "backend": "diff",
            "min_person_size": 40,
            "max_person_size": 180
        },
        "zones": [
            {"name": "lobby", "enabled": true, "x": 0, "y": 0, "width": 640, "height": 720},
            {"name": "desk", "enabled": false, "x": 640, "y": 0, "width": 640, "height": 720}
        ],
        "timing": {
            "heartbeat_secs": 10,
            "retry_delay_secs": 2,
            "cycle_pause_ms": 50
        }
    }"#;
    std::io::Write::write_all(&mut file, json.as_bytes()).expect("write config");

    std::env::set_var("LOOKOUT_CONFIG", file.path());
    std::env::set_var("LOOKOUT_SERVER_HOST", "10.0.0.9");
    std::env::set_var("LOOKOUT_HEARTBEAT_SECS", "45");

    let cfg = NodeConfig::load().expect("load config");
    cfg.validate().expect("valid config");

    assert_eq!(cfg.camera_id, "cam-entrance");
    assert_eq!(cfg.server_host, "10.0.0.9");
    assert_eq!(cfg.server_port, 9100);
    assert_eq!(cfg.camera.url, "stub://entrance");
    assert_eq!(cfg.camera.width, 1280);
    assert_eq!(cfg.camera.target_fps, 15);
    assert_eq!(cfg.detector_backend, "diff");
    assert_eq!(cfg.min_person_size, 40);
    assert_eq!(cfg.max_person_size, 180);
    assert_eq!(cfg.heartbeat_period, Duration::from_secs(45));
    assert_eq!(cfg.retry_delay, Duration::from_secs(2));
    assert_eq!(cfg.cycle_pause, Duration::from_millis(50));
    assert_eq!(cfg.zones.len(), 2);
    assert_eq!(cfg.zones.classify(100, 100), Some("lobby"));
    assert_eq!(cfg.zones.classify(700, 100), None);

    clear_env();
}

#[test]
fn defaults_apply_without_a_config_file() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOOKOUT_CAMERA_ID", "cam-default");

    let cfg = NodeConfig::load().expect("load config");
    cfg.validate().expect("valid config");

    assert_eq!(cfg.camera_id, "cam-default");
    assert_eq!(cfg.server_port, 8888);
    assert_eq!(cfg.zones.classify(170, 250), Some("entry"));

    clear_env();
}

#[test]
fn malformed_config_file_is_fatal() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    let mut file = NamedTempFile::new().expect("temp config");
    std::io::Write::write_all(&mut file, b"{not json").expect("write config");
    std::env::set_var("LOOKOUT_CONFIG", file.path());

    assert!(NodeConfig::load().is_err());

    clear_env();
}

#[test]
fn bad_port_env_override_is_fatal() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_env();

    std::env::set_var("LOOKOUT_SERVER_PORT", "not-a-port");

    assert!(NodeConfig::load().is_err());

    clear_env();
}
