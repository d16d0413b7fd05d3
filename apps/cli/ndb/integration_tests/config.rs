use ndb::app::prepare_config;
use ndb::cli::Args;
use ndb::error::NdbError;

use ndb_core::config::NdbConfig;

use clap::Parser;
use tempfile::TempDir;

fn args_for(dir: &TempDir, extra: &[&str]) -> Args {
    let config_dir = dir.path().to_string_lossy().to_string();
    let mut argv = vec!["ndb", "--config-dir", config_dir.as_str()];
    argv.extend_from_slice(extra);
    Args::try_parse_from(argv).unwrap()
}

/// **VALUE**: Flags override the config file, which overrides the defaults.
///
/// **BUG THIS CATCHES**: Would catch overrides applied before loading, which
/// would let the file silently win over the command line.
#[test]
fn given_saved_config_and_port_flag_when_preparing_then_flag_wins() {
    // GIVEN: A config file with a custom host and port
    let dir = TempDir::new().unwrap();
    let mut saved = NdbConfig::default();
    saved.inspector.host = String::from("192.168.1.20");
    saved.inspector.port = 9300;
    saved.save(dir.path()).unwrap();

    // WHEN: Preparing with a --port flag
    let config = prepare_config(&args_for(&dir, &["--port", "9444"])).unwrap();

    // THEN: The flag replaces the port, the file still supplies the host
    assert_eq!(config.inspector.port, 9444);
    assert_eq!(config.inspector.host, "192.168.1.20");
}

#[test]
fn given_empty_config_dir_when_preparing_then_defaults() {
    let dir = TempDir::new().unwrap();

    let config = prepare_config(&args_for(&dir, &[])).unwrap();

    assert_eq!(config, NdbConfig::default());
}

/// **VALUE**: Invalid overrides are caught before any network activity.
///
/// **BUG THIS CATCHES**: Would catch skipping validation after overrides,
/// which would send a port-0 request or start with an unusable log level.
#[test]
fn given_invalid_override_when_preparing_then_config_error() {
    // GIVEN: Overrides that do not validate
    let dir = TempDir::new().unwrap();

    // WHEN: Preparing with port 0 or a bogus level
    let zero_port = prepare_config(&args_for(&dir, &["--port", "0"]));
    let bad_level = prepare_config(&args_for(&dir, &["--log-level", "loud"]));

    // THEN: Both are config errors
    assert!(matches!(zero_port, Err(NdbError::Config { .. })));
    assert!(matches!(bad_level, Err(NdbError::Config { .. })));
}

#[test]
fn given_corrupt_config_file_when_preparing_then_config_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("config.json"), "{ nope").unwrap();

    let result = prepare_config(&args_for(&dir, &[]));

    assert!(matches!(result, Err(NdbError::Config { .. })));
}
