// tests/params_test.rs
use std::time::Duration;

use pqc_initiator::{ConfigError, Error, HandshakeParameters, ParameterSet, Result, TransportConfig};

#[test]
fn test_load_full_record() -> Result<()> {
    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(
        file.path(),
        r#"{
            "d": "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f",
            "z": "ff",
            "parameter_set": "ml_kem_1024",
            "comment": "unknown fields are ignored",
            "connections": {
                "port": 5000,
                "host": "0.0.0.0",
                "connect_timeout_ms": 1500,
                "receive_timeout_ms": 30000
            }
        }"#,
    )?;

    let params = HandshakeParameters::load(file.path())?;
    assert_eq!(params.seed_d.len(), 32);
    assert_eq!(params.seed_d[31], 0x1f);
    assert_eq!(params.seed_z.expose(), &[0xff]);
    assert_eq!(params.listen_port, 5000);
    assert_eq!(params.listen_host, "0.0.0.0");
    assert_eq!(params.parameter_set, ParameterSet::MlKem1024);
    assert_eq!(
        params.transport,
        TransportConfig {
            connect_timeout: Some(Duration::from_millis(1500)),
            accept_timeout: Some(Duration::from_secs(30)),
            read_timeout: Some(Duration::from_secs(30)),
        }
    );
    Ok(())
}

#[test]
fn test_seeds_are_redacted_in_debug_output() -> Result<()> {
    let file = tempfile::NamedTempFile::new()?;
    std::fs::write(file.path(), r#"{"d": "deadbeef", "z": "cafe", "connections": {"port": 5000}}"#)?;

    let params = HandshakeParameters::load(file.path())?;
    let debug = format!("{:?}", params);
    assert!(!debug.contains("deadbeef"));
    assert!(!debug.contains("222, 173"));
    Ok(())
}

#[test]
fn test_load_errors_name_the_file() -> Result<()> {
    let dir = tempfile::tempdir()?;

    let missing = dir.path().join("alice_params.json");
    match HandshakeParameters::load(&missing) {
        Err(Error::Config(ConfigError::NotFound { path })) => assert_eq!(path, missing),
        other => panic!("expected NotFound, got {:?}", other),
    }

    // A directory exists but cannot be read as a file.
    assert!(matches!(
        HandshakeParameters::load(dir.path()),
        Err(Error::Config(ConfigError::Unreadable { .. }))
    ));

    let malformed = dir.path().join("malformed.json");
    std::fs::write(&malformed, "d = 00")?;
    let err = HandshakeParameters::load(&malformed).unwrap_err();
    assert!(matches!(err, Error::Config(ConfigError::Malformed { .. })));
    assert!(err.to_string().contains("malformed.json"), "{}", err);
    Ok(())
}

#[test]
fn test_validation_order() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("alice_params.json");

    // Several problems at once: the first check in order wins.
    std::fs::write(&path, r#"{"d": "", "parameter_set": "nope", "connections": {"port": 1}}"#)?;
    assert!(matches!(
        HandshakeParameters::load(&path),
        Err(Error::Config(ConfigError::MissingSeed { field: "d" }))
    ));

    std::fs::write(&path, r#"{"d": "00", "z": "11", "parameter_set": "nope", "connections": {"port": 1}}"#)?;
    assert!(matches!(
        HandshakeParameters::load(&path),
        Err(Error::Config(ConfigError::InvalidPort(1)))
    ));

    std::fs::write(&path, r#"{"d": "00", "z": "11", "parameter_set": "nope", "connections": {"port": 5000}}"#)?;
    assert!(matches!(
        HandshakeParameters::load(&path),
        Err(Error::Config(ConfigError::UnknownParameterSet(_)))
    ));
    Ok(())
}
