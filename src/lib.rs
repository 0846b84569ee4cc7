//! An active-probe HTTP latency check.
//!
//! One GET request is sent to the configured target while the instants of its
//! lifecycle events (DNS lookup, TCP connect, TLS handshake, connection
//! acquisition, first response byte) are recorded. The total duration is
//! classified against a warning and a critical threshold and reported as one
//! line of performance data.

pub mod check;
pub mod config;
pub mod errors;
pub mod http_probe;
