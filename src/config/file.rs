use std::net::IpAddr;
use std::path::Path;

use serde::Deserialize;

use crate::errors::ConfigurationError;

/// Values read from an optional YAML config file.
/// Every field is optional; anything left out falls through to the defaults,
/// and anything given on the command line or in the environment wins.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    /// The URL of the target to probe.
    pub url: Option<String>,

    /// Overall request timeout in seconds.
    pub timeout: Option<u64>,

    /// Warning threshold in seconds.
    pub warning: Option<f64>,

    /// Critical threshold in seconds.
    pub critical: Option<f64>,

    pub output_in_ms: Option<bool>,

    pub insecure_skip_verify: Option<bool>,

    /// TLS handshake timeout in milliseconds.
    pub tls_timeout: Option<u64>,

    /// Name servers used instead of the system resolver.
    #[serde(default)]
    pub dns_servers: Vec<IpAddr>,
}

impl FileConfig {
    pub fn from_yaml(path: &Path, yaml: &str) -> Result<Self, ConfigurationError> {
        serde_yaml::from_str(yaml).map_err(|source| ConfigurationError::ParseConfigFile {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let yaml =
            std::fs::read_to_string(path).map_err(|source| ConfigurationError::ReadConfigFile {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_yaml(path, &yaml)
    }
}
