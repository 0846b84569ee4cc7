use std::sync::OnceLock;
use std::time::{Duration, Instant};

/// A lifecycle event of one HTTP transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseEvent {
    Start,
    DnsStart,
    DnsDone,
    ConnectStart,
    ConnectDone,
    TlsStart,
    TlsDone,
    GotConnection,
    FirstResponseByte,
}

impl PhaseEvent {
    #[cfg(test)]
    pub(crate) const ALL: [PhaseEvent; 9] = [
        PhaseEvent::Start,
        PhaseEvent::DnsStart,
        PhaseEvent::DnsDone,
        PhaseEvent::ConnectStart,
        PhaseEvent::ConnectDone,
        PhaseEvent::TlsStart,
        PhaseEvent::TlsDone,
        PhaseEvent::GotConnection,
        PhaseEvent::FirstResponseByte,
    ];

    fn index(self) -> usize {
        self as usize
    }
}

/// The instants at which the events of one probe occurred.
///
/// Each slot is a write-once cell: the first [`record`](Self::record) of an
/// event wins and later ones are ignored. Slots are written by whichever task
/// or thread the transport runs its machinery on, and read by the executor only
/// after the dispatch future has completed. A fresh value is created per probe.
#[derive(Debug, Default)]
pub struct PhaseTimestamps {
    slots: [OnceLock<Instant>; 9],
}

impl PhaseTimestamps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `event` as happening now. Ignored if it was already recorded.
    pub fn record(&self, event: PhaseEvent) {
        self.record_at(event, Instant::now());
    }

    pub fn record_at(&self, event: PhaseEvent, at: Instant) {
        if self.slots[event.index()].set(at).is_ok() {
            log::debug!("phase event {:?}", event);
        }
    }

    pub fn get(&self, event: PhaseEvent) -> Option<Instant> {
        self.slots[event.index()].get().copied()
    }

    /// Time between two events, or zero when either of them never happened.
    pub fn between(&self, from: PhaseEvent, to: PhaseEvent) -> Duration {
        match (self.get(from), self.get(to)) {
            (Some(from), Some(to)) => to.saturating_duration_since(from),
            _ => Duration::ZERO,
        }
    }
}
