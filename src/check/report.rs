use std::time::Duration;

use super::Status;
use crate::config::OutputUnit;
use crate::http_probe::result::DurationMetrics;

/// Render the report line of a completed probe:
///
/// ```text
/// <name> <STATUS>: <total><unit> | dns_duration=<d>, tls_handshake_duration=<d>, connect_duration=<d>, first_byte_duration=<d>, total_request_duration=<d>
/// ```
///
/// Performance data uses 6 decimals in seconds and 2 in milliseconds; the
/// headline total always uses 6.
pub fn render(
    check_name: &str,
    status: Status,
    metrics: &DurationMetrics,
    unit: OutputUnit,
) -> String {
    let value = match unit {
        OutputUnit::Seconds => seconds,
        OutputUnit::Milliseconds => millis,
    };
    let precision = match unit {
        OutputUnit::Seconds => 6,
        OutputUnit::Milliseconds => 2,
    };

    format!(
        "{check_name} {status}: {total:.6}{suffix} | dns_duration={dns:.precision$}, tls_handshake_duration={tls:.precision$}, connect_duration={connect:.precision$}, first_byte_duration={first_byte:.precision$}, total_request_duration={total:.precision$}",
        suffix = unit.suffix(),
        total = value(metrics.total),
        dns = value(metrics.dns),
        tls = value(metrics.tls_handshake),
        connect = value(metrics.connect),
        first_byte = value(metrics.first_byte),
    )
}

fn seconds(duration: Duration) -> f64 {
    duration.as_secs_f64()
}

fn millis(duration: Duration) -> f64 {
    duration.as_nanos() as f64 / 1_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metrics() -> DurationMetrics {
        DurationMetrics {
            dns: Duration::from_micros(12_346),
            tls_handshake: Duration::from_millis(40),
            connect: Duration::from_micros(1_500),
            first_byte: Duration::from_millis(600),
            total: Duration::from_millis(790),
        }
    }

    #[test]
    fn test_render_in_seconds() {
        assert_eq!(
            render("http-perf", Status::Ok, &metrics(), OutputUnit::Seconds),
            "http-perf OK: 0.790000s | dns_duration=0.012346, \
             tls_handshake_duration=0.040000, connect_duration=0.001500, \
             first_byte_duration=0.600000, total_request_duration=0.790000"
        );
    }

    #[test]
    fn test_render_in_milliseconds() {
        assert_eq!(
            render("http-perf", Status::Warning, &metrics(), OutputUnit::Milliseconds),
            "http-perf WARNING: 790.000000ms | dns_duration=12.35, tls_handshake_duration=40.00, \
             connect_duration=1.50, first_byte_duration=600.00, total_request_duration=790.00"
        );
    }

    #[test]
    fn test_unset_phases_render_as_zero() {
        let metrics = DurationMetrics {
            total: Duration::from_millis(2100),
            ..Default::default()
        };
        let line = render("http-perf", Status::Critical, &metrics, OutputUnit::Seconds);
        assert!(line.starts_with("http-perf CRITICAL: 2.100000s | "));
        assert!(line.contains("tls_handshake_duration=0.000000"));
        assert!(line.contains("dns_duration=0.000000"));
    }

    #[test]
    fn test_render_is_deterministic() {
        let first = render("http-perf", Status::Ok, &metrics(), OutputUnit::Milliseconds);
        let second = render("http-perf", Status::Ok, &metrics(), OutputUnit::Milliseconds);
        assert_eq!(first, second);
    }
}
