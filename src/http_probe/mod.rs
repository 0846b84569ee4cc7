pub mod probe;
pub mod result;
pub mod timestamps;
pub mod transport;

pub mod prelude {
    pub use super::probe::{ProbeOutcome, probe_target};
    pub use super::report;
    pub use super::result::DurationMetrics;
    pub use super::timestamps::{PhaseEvent, PhaseTimestamps};
    pub use super::transport::{HyperTransport, Transport};
}

use std::fmt::Write;

/// Render an error and its chain of sources as one line.
pub fn report(mut err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = format!("{}", err);
    while let Some(src) = err.source() {
        let _ = write!(s, ": {}", src);
        err = src;
    }
    s.replace(['\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ConfigurationError;

    #[test]
    fn test_report_joins_sources_on_one_line() {
        let err = ConfigurationError::ReadConfigFile {
            path: "/etc/http-perf.yml".into(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such\nfile"),
        };
        assert_eq!(
            report(&err),
            "failed to read config file /etc/http-perf.yml: no such file"
        );
    }
}
