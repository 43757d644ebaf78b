//! Trade event publication.
//!
//! Every option lifecycle transition produces a [`TradeEvent`] describing
//! what happened, to which option, and on whose behalf. Events are handed to
//! an [`EventSink`] outside the venue's critical section; publication is
//! fire and forget and can never fail a trade.

use crate::ids::{AccountId, MarketId, OptionId};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Mutex, PoisonError};
use tracing::info;

/// The lifecycle transition an event describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    /// A pending option was created by its maker.
    Created,
    /// A pending option was matched by its counterparty.
    Filled,
    /// A pending option was cancelled by its creator.
    Cancelled,
    /// An active option was exercised by its buyer.
    Exercised,
    /// An expired option's escrow was reclaimed by its writer.
    Reclaimed,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Created => "created",
            Self::Filled => "filled",
            Self::Cancelled => "cancelled",
            Self::Exercised => "exercised",
            Self::Reclaimed => "reclaimed",
        };
        write!(f, "{name}")
    }
}

/// A record of one option lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeEvent {
    /// Which transition occurred.
    pub kind: EventKind,
    /// Option the transition applied to.
    pub option_id: OptionId,
    /// Market the option trades in.
    pub market_id: MarketId,
    /// Account that triggered the transition.
    pub actor: AccountId,
    /// Strike price per whole underlying token.
    pub strike_price: u64,
    /// Number of whole underlying tokens covered.
    pub underlying_amount: u64,
    /// Premium leg of the option's terms.
    pub premium_value: u64,
    /// Collateral leg of the option's terms.
    pub collateral_value: u64,
    /// Caller-supplied clock reading, milliseconds since the UNIX epoch.
    pub timestamp_ms: u64,
}

impl TradeEvent {
    /// Serializes the event as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns a `serde_json` error when serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

/// Receiver of trade events.
///
/// Implementations must tolerate being called from multiple threads and must
/// not panic; the venue publishes outside its lock and ignores the outcome.
pub trait EventSink: Send + Sync {
    /// Delivers one event.
    fn publish(&self, event: &TradeEvent);
}

/// Sink that forwards events to the `tracing` subscriber.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn publish(&self, event: &TradeEvent) {
        info!(
            target: "premarket_options::events",
            kind = %event.kind,
            option = %event.option_id,
            market = %event.market_id,
            actor = %event.actor,
            strike_price = event.strike_price,
            underlying_amount = event.underlying_amount,
            premium_value = event.premium_value,
            collateral_value = event.collateral_value,
            timestamp_ms = event.timestamp_ms,
            "trade event"
        );
    }
}

/// Sink that buffers events in memory.
///
/// Useful in tests and simulations that need to assert on the event stream.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TradeEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every event published so far.
    #[must_use]
    pub fn events(&self) -> Vec<TradeEvent> {
        self.lock().clone()
    }

    /// Removes and returns every buffered event.
    pub fn drain(&self) -> Vec<TradeEvent> {
        std::mem::take(&mut *self.lock())
    }

    /// Number of buffered events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` when no events are buffered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<TradeEvent>> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EventSink for MemorySink {
    fn publish(&self, event: &TradeEvent) {
        self.lock().push(*event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(kind: EventKind) -> TradeEvent {
        TradeEvent {
            kind,
            option_id: OptionId::new(),
            market_id: MarketId::new(),
            actor: AccountId::new(),
            strike_price: 10_000_000,
            underlying_amount: 5,
            premium_value: 10_000_000,
            collateral_value: 40_000_000,
            timestamp_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn test_memory_sink_records_in_order() {
        let sink = MemorySink::new();
        sink.publish(&sample_event(EventKind::Created));
        sink.publish(&sample_event(EventKind::Filled));
        let events = sink.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].kind, EventKind::Created);
        assert_eq!(events[1].kind, EventKind::Filled);
    }

    #[test]
    fn test_memory_sink_drain_empties_buffer() {
        let sink = MemorySink::new();
        sink.publish(&sample_event(EventKind::Exercised));
        let drained = sink.drain();
        assert_eq!(drained.len(), 1);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_event_json_names_fields() {
        let event = sample_event(EventKind::Cancelled);
        let json = event.to_json().unwrap();
        assert!(json.contains("\"kind\":\"Cancelled\""));
        assert!(json.contains("\"strike_price\":10000000"));
        assert!(json.contains("\"timestamp_ms\":1700000000000"));
    }

    #[test]
    fn test_event_kind_display() {
        assert_eq!(EventKind::Created.to_string(), "created");
        assert_eq!(EventKind::Reclaimed.to_string(), "reclaimed");
    }
}
