use std::time::Duration;

use super::timestamps::{PhaseEvent, PhaseTimestamps};

/// The five durations reported for a completed probe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DurationMetrics {
    pub dns: Duration,
    pub tls_handshake: Duration,
    pub connect: Duration,
    /// From connection acquisition to the first response byte. Excludes the time
    /// spent resolving, connecting and handshaking.
    pub first_byte: Duration,
    pub total: Duration,
}

impl DurationMetrics {
    /// Derive the sub-phase durations from `timestamps`. `total` is measured by
    /// the caller and taken as is.
    pub fn from_timestamps(timestamps: &PhaseTimestamps, total: Duration) -> Self {
        Self {
            dns: timestamps.between(PhaseEvent::DnsStart, PhaseEvent::DnsDone),
            tls_handshake: timestamps.between(PhaseEvent::TlsStart, PhaseEvent::TlsDone),
            connect: timestamps.between(PhaseEvent::ConnectStart, PhaseEvent::ConnectDone),
            first_byte: timestamps
                .between(PhaseEvent::GotConnection, PhaseEvent::FirstResponseByte),
            total,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Instant;

    use super::*;

    #[test]
    fn test_metrics_from_recorded_phases() {
        let timestamps = PhaseTimestamps::new();
        let base = Instant::now();
        let at = |ms| base + Duration::from_millis(ms);
        timestamps.record_at(PhaseEvent::Start, at(0));
        timestamps.record_at(PhaseEvent::DnsStart, at(1));
        timestamps.record_at(PhaseEvent::DnsDone, at(11));
        timestamps.record_at(PhaseEvent::ConnectStart, at(12));
        timestamps.record_at(PhaseEvent::ConnectDone, at(32));
        timestamps.record_at(PhaseEvent::TlsStart, at(33));
        timestamps.record_at(PhaseEvent::TlsDone, at(73));
        timestamps.record_at(PhaseEvent::GotConnection, at(74));
        timestamps.record_at(PhaseEvent::FirstResponseByte, at(154));

        let metrics = DurationMetrics::from_timestamps(&timestamps, Duration::from_millis(160));
        assert_eq!(metrics.dns, Duration::from_millis(10));
        assert_eq!(metrics.connect, Duration::from_millis(20));
        assert_eq!(metrics.tls_handshake, Duration::from_millis(40));
        assert_eq!(metrics.first_byte, Duration::from_millis(80));
        assert_eq!(metrics.total, Duration::from_millis(160));
    }

    #[test]
    fn test_only_total_when_no_phase_fired() {
        let metrics =
            DurationMetrics::from_timestamps(&PhaseTimestamps::new(), Duration::from_millis(5));
        assert_eq!(
            metrics,
            DurationMetrics {
                total: Duration::from_millis(5),
                ..Default::default()
            }
        );
    }
}
