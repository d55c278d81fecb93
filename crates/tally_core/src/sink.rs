//! Diagnostic event delivery.
//!
//! Rejected or failed operations produce a [`LedgerEvent`] carrying the
//! message, the unit involved (if any) and the operation name. Events go to
//! an [`EventSink`] chosen when the ledger is built; [`TracingSink`] is the
//! default.

use crate::types::UnitId;
use std::fmt;

/// A diagnostic event emitted by the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEvent {
    /// Human-readable description.
    pub message: String,
    /// Unit the event concerns, if any.
    pub unit: Option<UnitId>,
    /// Ledger operation that produced the event.
    pub operation: &'static str,
}

impl LedgerEvent {
    /// Creates an event.
    pub fn new(message: impl Into<String>, unit: Option<UnitId>, operation: &'static str) -> Self {
        Self {
            message: message.into(),
            unit,
            operation,
        }
    }
}

impl fmt::Display for LedgerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.unit {
            Some(unit) => write!(f, "{} (unit {unit}, {})", self.message, self.operation),
            None => write!(f, "{} ({})", self.message, self.operation),
        }
    }
}

/// Receives diagnostic events from a ledger.
///
/// Implementations must be cheap and must not call back into the ledger.
pub trait EventSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: &LedgerEvent);
}

/// Forwards events to `tracing` at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &LedgerEvent) {
        tracing::warn!(
            unit = event.unit,
            operation = event.operation,
            "{}",
            event.message
        );
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &LedgerEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_with_unit() {
        let event = LedgerEvent::new("unit already exists", Some(4), "add_unit");
        assert_eq!(event.to_string(), "unit already exists (unit 4, add_unit)");
    }

    #[test]
    fn display_without_unit() {
        let event = LedgerEvent::new("gate drain timed out", None, "save");
        assert_eq!(event.to_string(), "gate drain timed out (save)");
    }

    #[test]
    fn builtin_sinks_accept_events() {
        let event = LedgerEvent::new("unit not found", Some(1), "get_unit");
        TracingSink.record(&event);
        NullSink.record(&event);
    }
}
