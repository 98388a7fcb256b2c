//! Integration tests for settings resolution
//!
//! Note: Uses serial_test crate to prevent ENV variable race conditions.

use ipgeo_batch::config::{
    CliOverrides, LookupSettings, DEFAULT_OUTPUT, ENDPOINT_ENV, POOL_SIZE_ENV, RATE_LIMIT_ENV,
    TIMEOUT_ENV,
};
use ipgeo_batch::services::lookup_client::DEFAULT_ENDPOINT;
use ipgeo_batch::{Error, Field, FieldSet, ResolutionEngine};
use ipgeo_common::config::TomlConfig;
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn clear_env() {
    for name in [ENDPOINT_ENV, POOL_SIZE_ENV, TIMEOUT_ENV, RATE_LIMIT_ENV] {
        env::remove_var(name);
    }
}

#[test]
#[serial]
fn test_defaults_without_any_source() {
    clear_env();
    let settings = LookupSettings::resolve(&CliOverrides::default(), &TomlConfig::default()).unwrap();

    assert_eq!(settings.endpoint, DEFAULT_ENDPOINT);
    assert_eq!(settings.pool_size, ResolutionEngine::default_pool_size());
    assert_eq!(settings.timeout, Duration::from_secs(15));
    assert_eq!(settings.requests_per_minute, 0);
    assert_eq!(settings.fields, FieldSet::catalog());
    assert_eq!(settings.output, PathBuf::from(DEFAULT_OUTPUT));
}

#[test]
#[serial]
fn test_cli_beats_env_beats_toml() {
    clear_env();
    let toml = TomlConfig {
        endpoint: Some("http://toml.example/json".to_string()),
        pool_size: Some(2),
        timeout_secs: Some(7),
        requests_per_minute: Some(30),
        fields: Some(vec!["isp".to_string()]),
        ..Default::default()
    };
    env::set_var(POOL_SIZE_ENV, "6");
    env::set_var(TIMEOUT_ENV, "9");

    let cli = CliOverrides {
        pool_size: Some(12),
        fields: Some(vec!["country".to_string(), "city".to_string()]),
        ..Default::default()
    };
    let settings = LookupSettings::resolve(&cli, &toml).unwrap();
    clear_env();

    assert_eq!(settings.pool_size, 12);
    assert_eq!(settings.timeout, Duration::from_secs(9));
    assert_eq!(settings.endpoint, "http://toml.example/json");
    assert_eq!(settings.requests_per_minute, 30);
    assert_eq!(
        settings.fields.iter().collect::<Vec<_>>(),
        vec![Field::Country, Field::City]
    );
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    let cli = CliOverrides {
        pool_size: Some(0),
        ..Default::default()
    };
    assert!(LookupSettings::resolve(&cli, &TomlConfig::default()).is_err());

    let cli = CliOverrides {
        fields: Some(vec!["country".to_string(), "asn".to_string()]),
        ..Default::default()
    };
    assert!(matches!(
        LookupSettings::resolve(&cli, &TomlConfig::default()),
        Err(Error::UnknownField(name)) if name == "asn"
    ));

    env::set_var(TIMEOUT_ENV, "soon");
    assert!(matches!(
        LookupSettings::resolve(&CliOverrides::default(), &TomlConfig::default()),
        Err(Error::Common(_))
    ));
    clear_env();
}

#[test]
#[serial]
fn test_build_engine_and_round_trip_to_toml() {
    clear_env();
    let cli = CliOverrides {
        endpoint: Some("http://127.0.0.1:9/json".to_string()),
        pool_size: Some(3),
        requests_per_minute: Some(45),
        ..Default::default()
    };
    let settings = LookupSettings::resolve(&cli, &TomlConfig::default()).unwrap();

    let engine = settings.build_engine().unwrap();
    assert_eq!(engine.pool_size(), 3);
    assert!(engine.client().is_rate_limited());

    let toml = settings.to_toml_config();
    let again = LookupSettings::resolve(&CliOverrides::default(), &toml).unwrap();
    assert_eq!(again.endpoint, settings.endpoint);
    assert_eq!(again.pool_size, 3);
    assert_eq!(again.fields, settings.fields);
}

#[test]
#[serial]
fn test_bad_endpoint_fails_engine_build() {
    clear_env();
    let cli = CliOverrides {
        endpoint: Some("::not a url::".to_string()),
        ..Default::default()
    };
    let settings = LookupSettings::resolve(&cli, &TomlConfig::default()).unwrap();
    assert!(matches!(settings.build_engine(), Err(Error::Client(_))));
}
