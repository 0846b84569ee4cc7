use std::sync::Arc;
use std::time::{Duration, Instant};

use url::Url;

use super::result::DurationMetrics;
use super::timestamps::{PhaseEvent, PhaseTimestamps};
use super::transport::Transport;
use crate::check::Status;
use crate::config::Thresholds;
use crate::errors::TransportError;

/// How a single probe ended.
#[derive(Debug)]
pub enum ProbeOutcome {
    /// The request never produced a response. Always CRITICAL, no metrics.
    Failed(TransportError),
    Completed {
        status: Status,
        metrics: DurationMetrics,
        http_status: u16,
    },
}

/// Send one timed GET request for `url` over `transport` and classify its total
/// duration against `thresholds`.
///
/// The whole exchange is bounded by `request_timeout`; running out of time is a
/// transport failure like any other. A fresh [`PhaseTimestamps`] is created for
/// every call and only read after the exchange has finished.
pub async fn probe_target<T: Transport>(
    transport: &T,
    url: &Url,
    request_timeout: Duration,
    thresholds: &Thresholds,
) -> ProbeOutcome {
    let timestamps = Arc::new(PhaseTimestamps::new());

    let start = Instant::now();
    timestamps.record_at(PhaseEvent::Start, start);
    let result =
        tokio::time::timeout(request_timeout, transport.send(url, Arc::clone(&timestamps))).await;
    let total = start.elapsed();

    let http_status = match result {
        Ok(Ok(http_status)) => http_status,
        Ok(Err(err)) => return ProbeOutcome::Failed(err),
        Err(_) => return ProbeOutcome::Failed(TransportError::Timeout(request_timeout)),
    };

    ProbeOutcome::Completed {
        status: thresholds.classify(total),
        metrics: DurationMetrics::from_timestamps(&timestamps, total),
        http_status,
    }
}
