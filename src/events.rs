//! Event sinks for per-record reconciliation events.
//!
//! The processor reports duplicates, missing targets, and fatal record errors
//! through an injected [`EventSink`] instead of writing to a global console.

use crate::record::FeedRecord;
use log::{error, warn};
use std::error::Error;

/// Receiver for the three reconciliation event kinds.
pub trait EventSink {
    /// An insert targeted an account that already exists.
    fn duplicate(&mut self, record: &FeedRecord);

    /// An update or delete matched no account.
    fn missing_target(&mut self, record: &FeedRecord, action: &str);

    /// A record failed fatally; its chunk is about to be rolled back.
    fn error(&mut self, record: &FeedRecord, detail: &dyn Error);
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn duplicate(&mut self, record: &FeedRecord) {
        (**self).duplicate(record)
    }

    fn missing_target(&mut self, record: &FeedRecord, action: &str) {
        (**self).missing_target(record, action)
    }

    fn error(&mut self, record: &FeedRecord, detail: &dyn Error) {
        (**self).error(record, detail)
    }
}

/// Sink that writes events through the `log` facade.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn duplicate(&mut self, record: &FeedRecord) {
        warn!("[DUPLICATE] {}", record);
    }

    fn missing_target(&mut self, record: &FeedRecord, action: &str) {
        warn!("[MISSING] {} for: {}", action, record);
    }

    fn error(&mut self, record: &FeedRecord, detail: &dyn Error) {
        error!("[ERROR] Record: {}, Error: {}", record, detail);
    }
}

/// A captured reconciliation event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedEvent {
    Duplicate(FeedRecord),
    MissingTarget { record: FeedRecord, action: String },
    Error { record: FeedRecord, detail: String },
}

/// Sink that keeps every event in memory, in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    events: Vec<FeedEvent>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[FeedEvent] {
        &self.events
    }

    pub fn into_events(self) -> Vec<FeedEvent> {
        self.events
    }
}

impl EventSink for RecordingSink {
    fn duplicate(&mut self, record: &FeedRecord) {
        self.events.push(FeedEvent::Duplicate(record.clone()));
    }

    fn missing_target(&mut self, record: &FeedRecord, action: &str) {
        self.events.push(FeedEvent::MissingTarget {
            record: record.clone(),
            action: action.to_string(),
        });
    }

    fn error(&mut self, record: &FeedRecord, detail: &dyn Error) {
        self.events.push(FeedEvent::Error {
            record: record.clone(),
            detail: detail.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;

    #[test]
    fn test_recording_sink_keeps_order() {
        let mut sink = RecordingSink::new();
        let dup = FeedRecord::insert("A", "Alice", "111");
        let missing = FeedRecord::delete("B");

        sink.duplicate(&dup);
        sink.missing_target(&missing, "Delete");
        sink.error(&missing, &FeedError::InvalidConfiguration("boom".to_string()));

        assert_eq!(
            sink.events(),
            &[
                FeedEvent::Duplicate(dup),
                FeedEvent::MissingTarget {
                    record: missing.clone(),
                    action: "Delete".to_string(),
                },
                FeedEvent::Error {
                    record: missing,
                    detail: "Invalid configuration: boom".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_mutable_reference_forwards_events() {
        fn emit<E: EventSink>(mut sink: E) {
            sink.duplicate(&FeedRecord::insert("A", "Alice", "111"));
        }

        let mut sink = RecordingSink::new();
        emit(&mut sink);
        assert_eq!(sink.events().len(), 1);
    }
}
