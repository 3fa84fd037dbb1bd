//! # Runtime Configuration
//!
//! Defaults, overridden by environment variables, overridden by CLI flags.
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PI_WORKERS` | CPU count | Worker threads |
//! | `PI_SCHEDULE` | `dynamic` | `static` or `dynamic` |
//! | `PI_FORMULA` | `bbp` | Formula used to compute; verification uses the other |
//! | `PI_PRECISION` | `fixed128` | `fixed128` or `double` |
//! | `PI_SYNC_WRITES` | `true` | fsync every store transition |
//! | `PI_LOG_LEVEL`, `PI_JSON_LOGS` | | See `pi-telemetry` |

use pi_01_digit_engine::{Formula, Precision};
use pi_02_block_store::StoreConfig;
use pi_telemetry::{parse_flag, TelemetryConfig};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;

use crate::errors::RuntimeError;

/// How the pool hands block positions to workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Schedule {
    /// Each worker owns a contiguous range of positions.
    Static,
    /// Workers pull the next free position from the store.
    #[default]
    Dynamic,
}

impl std::fmt::Display for Schedule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Schedule::Static => write!(f, "static"),
            Schedule::Dynamic => write!(f, "dynamic"),
        }
    }
}

impl FromStr for Schedule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "static" => Ok(Schedule::Static),
            "dynamic" => Ok(Schedule::Dynamic),
            other => Err(format!(
                "unknown schedule '{}' (expected static or dynamic)",
                other
            )),
        }
    }
}

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub workers: usize,
    pub schedule: Schedule,
    pub formula: Formula,
    pub precision: Precision,
    pub sync_writes: bool,
    pub telemetry: TelemetryConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            workers: num_cpus::get().max(1),
            schedule: Schedule::default(),
            formula: Formula::default(),
            precision: Precision::default(),
            sync_writes: true,
            telemetry: TelemetryConfig::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Result<Self, RuntimeError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, RuntimeError> {
        let defaults = Self::default();
        Ok(Self {
            workers: match lookup("PI_WORKERS") {
                Some(v) => parse_workers(&v)?,
                None => defaults.workers,
            },
            schedule: parse_var(&lookup, "PI_SCHEDULE")?.unwrap_or(defaults.schedule),
            formula: parse_var(&lookup, "PI_FORMULA")?.unwrap_or(defaults.formula),
            precision: parse_var(&lookup, "PI_PRECISION")?.unwrap_or(defaults.precision),
            sync_writes: lookup("PI_SYNC_WRITES")
                .map(|v| parse_flag(&v))
                .unwrap_or(defaults.sync_writes),
            telemetry: TelemetryConfig::from_lookup(&lookup),
        })
    }

    /// Store options for handles opened by the runtime.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            sync_writes: self.sync_writes,
            ..StoreConfig::default()
        }
    }
}

fn parse_workers(value: &str) -> Result<usize, RuntimeError> {
    match value.trim().parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(RuntimeError::Config(format!(
            "PI_WORKERS must be a positive integer, got '{}'",
            value
        ))),
    }
}

fn parse_var<T: FromStr<Err = String>>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, RuntimeError> {
    lookup(key)
        .map(|v| v.parse::<T>().map_err(|e| RuntimeError::Config(format!("{}: {}", key, e))))
        .transpose()
}
