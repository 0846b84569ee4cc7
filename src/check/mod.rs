//! The check lifecycle: validate the configuration, run the probe and turn the
//! outcome into one report line and a status.

use std::fmt;

use crate::config::CheckConfig;
use crate::errors::{ConfigurationError, TransportError};
use crate::http_probe::prelude::*;

pub mod report;

/// Name printed at the start of every report line.
pub const CHECK_NAME: &str = "http-perf";

/// Result state of the check, mapped onto the conventional plugin exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    Warning,
    Critical,
}

impl Status {
    pub fn exit_code(self) -> u8 {
        match self {
            Status::Ok => 0,
            Status::Warning => 1,
            Status::Critical => 2,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Warning => "WARNING",
            Status::Critical => "CRITICAL",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What the check prints and how it exits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckResult {
    pub status: Status,
    pub output: String,
}

impl CheckResult {
    /// A WARNING result for input that could not be used. `context` says which
    /// step rejected it.
    pub fn configuration_error(context: &str, err: &ConfigurationError) -> Self {
        Self {
            status: Status::Warning,
            output: format!("{CHECK_NAME} {}: {context}: {}", Status::Warning, report(err)),
        }
    }

    pub fn transport_error(err: &TransportError) -> Self {
        Self {
            status: Status::Critical,
            output: format!(
                "{CHECK_NAME} {}: Error making request: {}",
                Status::Critical,
                report(err)
            ),
        }
    }
}

/// Check the configuration before any network activity.
pub fn validate(config: &CheckConfig) -> Result<(), ConfigurationError> {
    if config.url.is_empty() {
        return Err(ConfigurationError::MissingTarget);
    }

    // warnings must not be higher than criticals
    config.thresholds()?;

    if config.timeout_secs == 0 {
        return Err(ConfigurationError::InvalidTimeout { name: "timeout" });
    }
    if config.tls_timeout_ms == 0 {
        return Err(ConfigurationError::InvalidTimeout {
            name: "tls-timeout",
        });
    }

    config.target()?;
    Ok(())
}

/// Probe the configured target over `transport` and render the result.
pub async fn run<T: Transport>(config: &CheckConfig, transport: &T) -> CheckResult {
    let parts = config
        .target()
        .and_then(|url| config.thresholds().map(|thresholds| (url, thresholds)));
    let (url, thresholds) = match parts {
        Ok(parts) => parts,
        Err(err) => return CheckResult::configuration_error("error validating input", &err),
    };

    log::info!("Probing {url}");
    match probe_target(transport, &url, config.request_timeout(), &thresholds).await {
        ProbeOutcome::Failed(err) => {
            log::info!("Probe of {url} failed: {err}");
            CheckResult::transport_error(&err)
        }
        ProbeOutcome::Completed {
            status,
            metrics,
            http_status,
        } => {
            log::info!(
                "{url} answered {http_status} after {:.3}ms",
                metrics.total.as_secs_f64() * 1000.0
            );
            CheckResult {
                status,
                output: report::render(CHECK_NAME, status, &metrics, config.output_unit),
            }
        }
    }
}

/// Validate, build the real transport and run the probe.
pub async fn execute(config: &CheckConfig) -> CheckResult {
    if let Err(err) = validate(config) {
        return CheckResult::configuration_error("error validating input", &err);
    }

    let transport = match HyperTransport::from_config(config) {
        Ok(transport) => transport,
        Err(err) => return CheckResult::transport_error(&err),
    };

    run(config, &transport).await
}
