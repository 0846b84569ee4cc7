//! Error types for the check.
//!
//! Two domains exist. [`ConfigurationError`] covers everything detected before
//! the first network call and always maps to a WARNING result.
//! [`TransportError`] covers everything that goes wrong while the request is in
//! flight and always maps to CRITICAL.

use std::error::Error as StdError;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Invalid or missing input.
#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("missing target: --url or CHECK_URL environment variable is required")]
    MissingTarget,

    #[error(
        "threshold ordering: warning threshold ({warning}s) must not exceed critical threshold ({critical}s)"
    )]
    ThresholdOrdering { warning: f64, critical: f64 },

    #[error("invalid threshold: {name} must be a finite, non-negative number of seconds (got {value})")]
    InvalidThreshold { name: &'static str, value: f64 },

    #[error("invalid timeout: {name} must be greater than zero")]
    InvalidTimeout { name: &'static str },

    #[error("invalid target url {url:?}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported url scheme {scheme:?}: only http and https are supported")]
    UnsupportedScheme { scheme: String },

    #[error("target url {url:?} has no host")]
    MissingHost { url: String },

    #[error("failed to read config file {}", path.display())]
    ReadConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {}", path.display())]
    ParseConfigFile {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Anything that fails while the probe is in flight.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("dns lookup for {host} failed")]
    Dns {
        host: String,
        #[source]
        source: BoxError,
    },

    #[error("no addresses found for {host}")]
    NoAddresses { host: String },

    #[error("connect to {addr} failed")]
    Connect {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("connect to {addr} timed out after {timeout:?}")]
    ConnectTimeout { addr: SocketAddr, timeout: Duration },

    #[error("tls handshake with {host} failed")]
    Tls {
        host: String,
        #[source]
        source: native_tls::Error,
    },

    #[error("tls handshake with {host} timed out after {timeout:?}")]
    TlsTimeout { host: String, timeout: Duration },

    #[error("failed to build request")]
    Request(#[source] BoxError),

    #[error("http exchange failed")]
    Http(#[from] hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to set up tls connector")]
    TlsSetup(#[source] native_tls::Error),
}
