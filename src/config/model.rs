use std::net::IpAddr;
use std::time::Duration;

use url::Url;

use crate::check::Status;
use crate::errors::ConfigurationError;

pub const DEFAULT_URL: &str = "http://localhost:80/";
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_WARNING_SECS: f64 = 1.0;
pub const DEFAULT_CRITICAL_SECS: f64 = 2.0;
pub const DEFAULT_TLS_TIMEOUT_MS: u64 = 1000;

/// Unit used for the durations in the report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputUnit {
    #[default]
    Seconds,
    Milliseconds,
}

impl OutputUnit {
    pub fn from_output_in_ms(output_in_ms: bool) -> Self {
        if output_in_ms {
            OutputUnit::Milliseconds
        } else {
            OutputUnit::Seconds
        }
    }

    pub fn suffix(self) -> &'static str {
        match self {
            OutputUnit::Seconds => "s",
            OutputUnit::Milliseconds => "ms",
        }
    }
}

/// The fully resolved configuration of one check invocation.
///
/// Built once by [`crate::config::app_config::load_config`] and passed by
/// reference to both the validator and the executor.
#[derive(Debug, Clone, PartialEq)]
pub struct CheckConfig {
    /// The URL to probe.
    pub url: String,

    /// Overall request timeout, in seconds.
    pub timeout_secs: u64,

    /// TLS handshake timeout, in milliseconds.
    pub tls_timeout_ms: u64,

    /// Warning threshold for the total duration, in seconds.
    pub warning: f64,

    /// Critical threshold for the total duration, in seconds.
    pub critical: f64,

    pub output_unit: OutputUnit,

    /// Skip certificate and host name verification.
    pub insecure_skip_verify: bool,

    /// Name servers to resolve the target with. Empty means the system resolver.
    pub dns_servers: Vec<IpAddr>,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            tls_timeout_ms: DEFAULT_TLS_TIMEOUT_MS,
            warning: DEFAULT_WARNING_SECS,
            critical: DEFAULT_CRITICAL_SECS,
            output_unit: OutputUnit::Seconds,
            insecure_skip_verify: false,
            dns_servers: Vec::new(),
        }
    }
}

impl CheckConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn tls_timeout(&self) -> Duration {
        Duration::from_millis(self.tls_timeout_ms)
    }

    /// Parse the target URL, accepting only http and https targets with a host.
    pub fn target(&self) -> Result<Url, ConfigurationError> {
        if self.url.is_empty() {
            return Err(ConfigurationError::MissingTarget);
        }
        let url = Url::parse(&self.url).map_err(|source| ConfigurationError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigurationError::UnsupportedScheme {
                    scheme: other.to_string(),
                });
            }
        }
        if url.host().is_none() {
            return Err(ConfigurationError::MissingHost {
                url: self.url.clone(),
            });
        }
        Ok(url)
    }

    /// Convert both thresholds to durations, checking their ordering.
    pub fn thresholds(&self) -> Result<Thresholds, ConfigurationError> {
        if self.warning > self.critical {
            return Err(ConfigurationError::ThresholdOrdering {
                warning: self.warning,
                critical: self.critical,
            });
        }
        Ok(Thresholds {
            warning: threshold("warning", self.warning)?,
            critical: threshold("critical", self.critical)?,
        })
    }
}

fn threshold(name: &'static str, value: f64) -> Result<Duration, ConfigurationError> {
    Duration::try_from_secs_f64(value)
        .map_err(|_| ConfigurationError::InvalidThreshold { name, value })
}

/// The two ordered duration boundaries. `warning <= critical` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Thresholds {
    pub warning: Duration,
    pub critical: Duration,
}

impl Thresholds {
    /// Both comparisons are strict: a duration equal to a threshold stays in the
    /// lower tier.
    pub fn classify(&self, total: Duration) -> Status {
        if total > self.critical {
            Status::Critical
        } else if total > self.warning {
            Status::Warning
        } else {
            Status::Ok
        }
    }
}
