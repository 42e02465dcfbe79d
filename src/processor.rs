//! Top-level feed driver.
//!
//! Partitions the feed and applies chunks strictly in order, each under its
//! own transaction. A fatal error stops the run at the failing chunk: chunks
//! committed before it stay committed, and no later chunk is attempted.

use crate::coordinator::{apply_chunk, ChunkReport};
use crate::error::Result;
use crate::events::EventSink;
use crate::feed::read_feed;
use crate::partition::partition;
use crate::record::FeedRecord;
use crate::store::AccountStore;
use log::{debug, error, info};
use std::io::{Read, Write};

/// Progress counters for one run.
///
/// Remains readable after a failed run, so callers can tell how many chunks
/// were committed before the failure.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Chunks the feed was partitioned into.
    pub total_chunks: usize,

    /// Chunks committed so far.
    pub committed_chunks: usize,

    /// Records that changed the store, across committed chunks.
    pub records_applied: usize,

    /// Duplicate inserts across committed chunks.
    pub duplicates: usize,

    /// Missing-target records across committed chunks.
    pub missing: usize,
}

impl RunStats {
    fn record_chunk(&mut self, report: ChunkReport) {
        self.committed_chunks += 1;
        self.records_applied += report.applied;
        self.duplicates += report.duplicates;
        self.missing += report.missing;
    }
}

/// The account feed processor.
///
/// Owns the account store and the event sink for the duration of a run.
pub struct FeedProcessor<S, E> {
    store: S,
    sink: E,
    stats: RunStats,
}

impl<S: AccountStore, E: EventSink> FeedProcessor<S, E> {
    /// Creates a processor over `store`, reporting events to `sink`.
    pub fn new(store: S, sink: E) -> Self {
        FeedProcessor {
            store,
            sink,
            stats: RunStats::default(),
        }
    }

    /// Applies `feed` in chunks of `chunk_size` records.
    ///
    /// Fails with `InvalidConfiguration` before touching the store if
    /// `chunk_size` is zero. Any fatal record error is returned unchanged
    /// after its chunk has been rolled back.
    pub fn process(&mut self, feed: &[FeedRecord], chunk_size: usize) -> Result<RunStats> {
        self.stats = RunStats::default();
        let chunks = partition(feed, chunk_size)?;
        self.stats.total_chunks = chunks.len();

        for (index, chunk) in chunks.iter().enumerate() {
            debug!("Chunk {}/{}: {} record(s)", index + 1, chunks.len(), chunk.len());

            match apply_chunk(&mut self.store, &mut self.sink, chunk) {
                Ok(report) => self.stats.record_chunk(report),
                Err(err) => {
                    error!(
                        "Chunk {}/{} rolled back; {} chunk(s) committed before failure: {}",
                        index + 1,
                        chunks.len(),
                        self.stats.committed_chunks,
                        err
                    );
                    return Err(err);
                }
            }
        }

        info!(
            "Feed applied: {} chunk(s), {} record(s) applied, {} duplicate(s), {} missing",
            self.stats.committed_chunks,
            self.stats.records_applied,
            self.stats.duplicates,
            self.stats.missing
        );
        Ok(self.stats)
    }

    /// Reads a CSV feed in full, then applies it.
    pub fn process_csv<R: Read>(&mut self, reader: R, chunk_size: usize) -> Result<RunStats> {
        let feed = read_feed(reader)?;
        self.process(&feed, chunk_size)
    }

    /// Writes the committed account table to CSV, ordered by account id.
    pub fn write_output<W: Write>(&self, writer: W) -> Result<()> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["account_id", "name", "phone"])?;
        for account in self.store.accounts()? {
            csv_writer.write_record([
                account.account_id.as_str(),
                account.name.as_str(),
                account.phone.as_deref().unwrap_or(""),
            ])?;
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Counters for the current (or last) run.
    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sink(&self) -> &E {
        &self.sink
    }

    /// Releases the store and sink.
    pub fn into_parts(self) -> (S, E) {
        (self.store, self.sink)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;
    use crate::events::{FeedEvent, LogSink, RecordingSink};
    use crate::store::MemoryAccountStore;
    use std::io::Cursor;

    fn processor() -> FeedProcessor<MemoryAccountStore, RecordingSink> {
        FeedProcessor::new(MemoryAccountStore::new(), RecordingSink::new())
    }

    #[test]
    fn test_zero_chunk_size_fails_before_processing() {
        let mut processor = processor();
        let feed = vec![FeedRecord::insert("A", "Alice", "111")];

        let err = processor.process(&feed, 0).unwrap_err();

        assert!(matches!(err, FeedError::InvalidConfiguration(_)));
        assert!(processor.store().is_empty());
        assert_eq!(processor.stats(), &RunStats::default());
    }

    #[test]
    fn test_rejected_run_clears_previous_stats() {
        let mut processor = processor();
        processor
            .process(&[FeedRecord::insert("A", "Alice", "111")], 1)
            .unwrap();
        assert_eq!(processor.stats().committed_chunks, 1);

        let err = processor
            .process(&[FeedRecord::insert("B", "Bob", "222")], 0)
            .unwrap_err();

        assert!(matches!(err, FeedError::InvalidConfiguration(_)));
        assert_eq!(processor.stats(), &RunStats::default());
        assert!(processor.store().get("B").unwrap().is_none());
    }

    #[test]
    fn test_stats_accumulate_across_chunks() {
        let mut processor = processor();
        let feed = vec![
            FeedRecord::insert("A", "Alice", "111"),
            FeedRecord::insert("B", "Bob", "222"),
            FeedRecord::insert("A", "Again", "333"),
            FeedRecord::update_name("C", "Carol"),
            FeedRecord::update_phone("B", "999"),
        ];

        let stats = processor.process(&feed, 2).unwrap();

        assert_eq!(
            stats,
            RunStats {
                total_chunks: 3,
                committed_chunks: 3,
                records_applied: 3,
                duplicates: 1,
                missing: 1,
            }
        );
    }

    #[test]
    fn test_failed_chunk_stops_the_run() {
        let mut processor = processor();
        let feed = vec![
            FeedRecord::insert("A", "Alice", "111"),
            FeedRecord::insert("B", "Bob", "222"),
            FeedRecord::insert("C", "Carol", "333"),
            FeedRecord::new("C", None, None, "bogus"),
            FeedRecord::insert("D", "Dan", "444"),
        ];

        let err = processor.process(&feed, 2).unwrap_err();

        assert!(matches!(err, FeedError::UnknownOperation { .. }));
        assert_eq!(processor.stats().committed_chunks, 1);
        assert_eq!(processor.stats().total_chunks, 3);
        assert!(processor.store().get("A").unwrap().is_some());
        assert!(processor.store().get("C").unwrap().is_none());
        assert!(processor.store().get("D").unwrap().is_none());
        assert!(matches!(processor.sink().events(), [FeedEvent::Error { .. }]));
    }

    #[test]
    fn test_process_csv_and_write_output() {
        let csv = "operation,account_id,name,phone
insert,B,Bob,222
insert,A,Alice,111
update_phone,A,,999
delete,B,,";

        let mut processor = FeedProcessor::new(MemoryAccountStore::new(), LogSink);
        processor.process_csv(Cursor::new(csv), 10).unwrap();

        let mut output = Vec::new();
        processor.write_output(&mut output).unwrap();

        let output_str = String::from_utf8(output).unwrap();
        assert_eq!(output_str, "account_id,name,phone\nA,Alice,999\n");
    }
}
