//! # Pi Telemetry
//!
//! Structured logging for the Pi-Blocks runtime.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pi_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     init_telemetry(&TelemetryConfig::from_env()).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PI_LOG_LEVEL` | `info` | Log level filter |
//! | `RUST_LOG` | unset | Full filter directive, overrides `PI_LOG_LEVEL` |
//! | `PI_JSON_LOGS` | `false` | JSON lines instead of pretty output |
//! | `PI_SERVICE_NAME` | `pi-blocks` | Service name in the startup event |

mod config;
mod logging;

pub use config::{parse_flag, TelemetryConfig};
pub use logging::{build_filter, init_logging};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    init_logging(config)
}
