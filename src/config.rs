//! # Configuration Module
//!
//! Serve configuration loaded from an optional TOML file and environment variables.
//!
//! ## Environment Variables
//!
//! Environment variables override values read from the file:
//!
//! - `WEBSERVE_ADDRESS` - bind address (default `0.0.0.0`)
//! - `WEBSERVE_PORT` - bind port (default `8080`)
//! - `WEBSERVE_STACK_SIZE` - coroutine stack size, decimal `16384` or hex `0x4000`
//!   (default `0x4000`)
//! - `WEBSERVE_READY_TIMEOUT_MS` - how long callers wait for the listener to accept
//!   connections (default `250`)
//!
//! ## File Format
//!
//! ```toml
//! address = "127.0.0.1"
//! port = 9000
//! document = "<h1>hello</h1>"
//! stack_size = "0x8000"
//! ```
//!
//! Stack size affects memory per connection coroutine:
//! total = stack_size × concurrent connections.

use crate::document::DEFAULT_DOCUMENT;
use crate::server::{DEFAULT_ADDRESS, DEFAULT_PORT};
use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::env;
use std::path::Path;
use std::time::Duration;

const DEFAULT_STACK_SIZE: usize = 0x4000;
const DEFAULT_READY_TIMEOUT_MS: u64 = 250;

/// Settings for the serve binary and the controller it drives.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServeConfig {
    pub address: String,
    pub port: u16,
    pub document: String,
    /// Stack size for coroutines in bytes
    #[serde(deserialize_with = "deserialize_stack_size")]
    pub stack_size: usize,
    pub ready_timeout_ms: u64,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            document: DEFAULT_DOCUMENT.to_string(),
            stack_size: DEFAULT_STACK_SIZE,
            ready_timeout_ms: DEFAULT_READY_TIMEOUT_MS,
        }
    }
}

impl ServeConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid serve configuration")
    }

    /// Read `path` (if given), then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)
                    .with_context(|| format!("cannot read {}", path.display()))?;
                Self::from_toml_str(&content)
                    .with_context(|| format!("in {}", path.display()))?
            }
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Apply the coroutine settings to the `may` runtime.
    ///
    /// Takes effect for coroutines spawned afterwards, so call it before the first start.
    pub fn apply_runtime(&self) {
        may::config().set_stack_size(self.stack_size);
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    fn apply_env(&mut self) {
        if let Ok(address) = env::var("WEBSERVE_ADDRESS") {
            self.address = address;
        }
        if let Some(port) = env::var("WEBSERVE_PORT").ok().and_then(|s| s.parse().ok()) {
            self.port = port;
        }
        if let Some(size) = env::var("WEBSERVE_STACK_SIZE")
            .ok()
            .and_then(|s| parse_stack_size(&s))
        {
            self.stack_size = size;
        }
        if let Some(ms) = env::var("WEBSERVE_READY_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
        {
            self.ready_timeout_ms = ms;
        }
    }
}

/// Parse a decimal or `0x`-prefixed hexadecimal byte count.
pub fn parse_stack_size(val: &str) -> Option<usize> {
    let val = val.trim();
    if let Some(hex) = val.strip_prefix("0x") {
        usize::from_str_radix(hex, 16).ok()
    } else {
        val.parse().ok()
    }
}

fn deserialize_stack_size<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Int(usize),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Int(n) => Ok(n),
        Raw::Text(s) => parse_stack_size(&s)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid stack size '{}'", s))),
    }
}
