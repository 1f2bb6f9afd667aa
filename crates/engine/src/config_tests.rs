use super::*;
use std::io::Write;

#[test]
fn defaults_are_a_small_deterministic_run() {
    let config = SimConfig::default();
    assert_eq!(config.processes, 3);
    assert_eq!(config.writes, 1);
    assert_eq!(config.jitter, Duration::ZERO);
    assert!(config.validate().is_ok());
    assert_eq!(config.expected_total(), 3);
}

#[test]
fn builders_override_fields() {
    let config = SimConfig::new(4, 2)
        .with_hold(Duration::from_millis(5))
        .with_jitter(Duration::from_millis(3));
    assert_eq!(config.hold, Duration::from_millis(5));
    assert_eq!(config.jitter, Duration::from_millis(3));
    assert_eq!(config.expected_total(), 8);
}

#[test]
fn write_overrides_take_precedence_per_process() {
    let config = SimConfig::new(4, 5).with_writes_per_process([0, 2]);
    assert_eq!(config.writes_for(ProcessId(0)), 0);
    assert_eq!(config.writes_for(ProcessId(1)), 2);
    assert_eq!(config.writes_for(ProcessId(2)), 5);
    assert_eq!(config.writes_for(ProcessId(3)), 5);
    assert_eq!(config.expected_total(), 12);
}

#[test]
fn zero_processes_is_rejected() {
    let config = SimConfig::new(0, 1);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn more_overrides_than_processes_is_rejected() {
    let config = SimConfig::new(2, 1).with_writes_per_process([1, 1, 1]);
    assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
}

#[test]
fn toml_round_trip_preserves_durations() {
    let config = SimConfig::new(5, 2).with_hold(Duration::from_millis(7));
    let raw = toml::to_string(&config).unwrap();
    let parsed: SimConfig = toml::from_str(&raw).unwrap();
    assert_eq!(parsed.processes, 5);
    assert_eq!(parsed.hold, Duration::from_millis(7));
}

#[test]
fn config_file_loads_with_defaults_for_missing_fields() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "processes = 4\nwrites = 2").unwrap();

    let config = SimConfig::from_toml_file(file.path()).unwrap();
    assert_eq!(config.processes, 4);
    assert_eq!(config.writes, 2);
    assert_eq!(config.hold, Duration::from_millis(20));
    assert_eq!(config.jitter, Duration::ZERO);
}

#[test]
fn missing_config_file_is_an_io_error() {
    let result = SimConfig::from_toml_file("/nonexistent/lockstep.toml");
    assert!(matches!(result, Err(ConfigError::Io(_))));
}
