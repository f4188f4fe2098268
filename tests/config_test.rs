// ABOUTME: Integration tests for environment-based client configuration
// ABOUTME: Mutates process environment, so every test is serialized
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 DOM360

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

use dom360_chat::config::{
    ClientConfig, ENV_API_URL, ENV_CONNECT_TIMEOUT, ENV_DATA_DIR, ENV_REQUEST_TIMEOUT,
};
use dom360_chat::errors::ClientError;
use dom360_chat::logging::{LogFormat, LoggingConfig, DEFAULT_SERVICE_NAME};
use serial_test::serial;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

fn clear_env() {
    for var in [ENV_API_URL, ENV_REQUEST_TIMEOUT, ENV_CONNECT_TIMEOUT, ENV_DATA_DIR] {
        env::remove_var(var);
    }
}

#[test]
#[serial]
fn test_defaults_without_environment() {
    clear_env();
    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.api_base_url, "http://localhost:3001");
    assert_eq!(config.request_timeout, Duration::from_secs(30));
    assert_eq!(config.connect_timeout, Duration::from_secs(10));
    assert!(config.data_dir.ends_with("dom360"));
}

#[test]
#[serial]
fn test_environment_overrides() {
    clear_env();
    env::set_var(ENV_API_URL, "https://api.dom360.com/");
    env::set_var(ENV_REQUEST_TIMEOUT, "45");
    env::set_var(ENV_CONNECT_TIMEOUT, "5");
    env::set_var(ENV_DATA_DIR, "/var/lib/dom360-test");

    let config = ClientConfig::from_env().unwrap();
    assert_eq!(config.api_base_url, "https://api.dom360.com");
    assert_eq!(config.url("/api/chat"), "https://api.dom360.com/api/chat");
    assert_eq!(config.request_timeout, Duration::from_secs(45));
    assert_eq!(config.connect_timeout, Duration::from_secs(5));
    assert_eq!(config.data_dir, PathBuf::from("/var/lib/dom360-test"));
    clear_env();
}

#[test]
#[serial]
fn test_invalid_values_are_rejected() {
    clear_env();
    env::set_var(ENV_REQUEST_TIMEOUT, "soon");
    assert!(matches!(ClientConfig::from_env(), Err(ClientError::Validation(_))));

    env::set_var(ENV_REQUEST_TIMEOUT, "0");
    assert!(matches!(ClientConfig::from_env(), Err(ClientError::Validation(_))));

    env::remove_var(ENV_REQUEST_TIMEOUT);
    env::set_var(ENV_API_URL, "ftp://dom360.com");
    assert!(matches!(ClientConfig::from_env(), Err(ClientError::Validation(_))));
    clear_env();
}

#[test]
#[serial]
fn test_logging_config_from_environment() {
    env::set_var("LOG_FORMAT", "json");
    env::set_var("SERVICE_NAME", "sdr-desktop");
    let config = LoggingConfig::from_env();
    assert_eq!(config.format, LogFormat::Json);
    assert_eq!(config.service_name, "sdr-desktop");

    env::remove_var("LOG_FORMAT");
    env::remove_var("SERVICE_NAME");
    let config = LoggingConfig::from_env();
    assert_eq!(config.format, LogFormat::Pretty);
    assert_eq!(config.service_name, DEFAULT_SERVICE_NAME);
}
