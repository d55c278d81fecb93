//! Recording event sink.

use parking_lot::Mutex;
use tally_core::{EventSink, LedgerEvent, UnitId};

/// An [`EventSink`] that keeps every event for later inspection.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<LedgerEvent>>,
}

impl RecordingSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of every recorded event, oldest first.
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.events.lock().clone()
    }

    /// Returns the number of recorded events.
    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    /// Returns true if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.events.lock().is_empty()
    }

    /// Returns the events produced by one ledger operation.
    pub fn for_operation(&self, operation: &str) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.operation == operation)
            .cloned()
            .collect()
    }

    /// Returns the events concerning one unit.
    pub fn for_unit(&self, unit: UnitId) -> Vec<LedgerEvent> {
        self.events
            .lock()
            .iter()
            .filter(|event| event.unit == Some(unit))
            .cloned()
            .collect()
    }

    /// Forgets every recorded event.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl EventSink for RecordingSink {
    fn record(&self, event: &LedgerEvent) {
        self.events.lock().push(event.clone());
    }
}
