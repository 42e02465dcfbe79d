//! Applies one chunk under a single transactional scope.
//!
//! # Guarantees
//!
//! After [`apply_chunk`] returns, the store either holds every applied
//! (non-duplicate, non-missing) operation of the chunk, or is unchanged from
//! before the call. A fatal error on any record rolls back all earlier records
//! of the same chunk.

use crate::dispatch::{dispatch, Outcome};
use crate::error::Result;
use crate::events::EventSink;
use crate::grouping::group_by_account;
use crate::record::FeedRecord;
use crate::store::{AccountStore, StoreScope};
use log::{debug, warn};

/// Per-chunk outcome counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkReport {
    /// Records that changed the store.
    pub applied: usize,

    /// Inserts skipped because the account already existed.
    pub duplicates: usize,

    /// Updates or deletes that matched no account.
    pub missing: usize,
}

/// Applies `chunk` to `store` atomically, reporting non-fatal events to `sink`.
///
/// Records are applied account group by account group, in first-appearance
/// order, each group in feed order.
pub fn apply_chunk<S, E>(store: &mut S, sink: &mut E, chunk: &[FeedRecord]) -> Result<ChunkReport>
where
    S: AccountStore,
    E: EventSink + ?Sized,
{
    let mut scope = store.begin_scope()?;
    let groups = group_by_account(chunk);
    debug!(
        "Applying chunk of {} record(s) across {} account(s)",
        chunk.len(),
        groups.len()
    );

    let mut report = ChunkReport::default();
    for record in groups.records() {
        match dispatch(&mut scope, record) {
            Ok(Outcome::Applied) => report.applied += 1,
            Ok(Outcome::Duplicate) => {
                sink.duplicate(record);
                report.duplicates += 1;
            }
            Ok(Outcome::MissingTarget(operation)) => {
                sink.missing_target(record, operation.action_name());
                report.missing += 1;
            }
            Err(err) => {
                sink.error(record, &err);
                if let Err(rollback_err) = scope.rollback() {
                    warn!("Rollback after failed record also failed: {}", rollback_err);
                }
                debug!("Chunk rolled back");
                return Err(err);
            }
        }
    }

    scope.commit()?;
    debug!(
        "Chunk committed: {} applied, {} duplicate(s), {} missing",
        report.applied, report.duplicates, report.missing
    );
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::Account;
    use crate::error::FeedError;
    use crate::events::{FeedEvent, RecordingSink};
    use crate::store::MemoryAccountStore;

    #[test]
    fn test_end_to_end_example_chunk() {
        let mut store = MemoryAccountStore::new();
        let mut sink = RecordingSink::new();
        let chunk = vec![
            FeedRecord::insert("A", "Alice", "111"),
            FeedRecord::update_phone("A", "222"),
            FeedRecord::insert("A", "Alice2", "333"),
            FeedRecord::delete("B"),
        ];

        let report = apply_chunk(&mut store, &mut sink, &chunk).unwrap();

        assert_eq!(
            report,
            ChunkReport {
                applied: 2,
                duplicates: 1,
                missing: 1
            }
        );
        assert_eq!(
            store.accounts().unwrap(),
            vec![Account::new("A", "Alice", Some("222".to_string()))]
        );
        assert_eq!(
            sink.events(),
            &[
                FeedEvent::Duplicate(chunk[2].clone()),
                FeedEvent::MissingTarget {
                    record: chunk[3].clone(),
                    action: "Delete".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_fatal_record_rolls_back_whole_chunk() {
        let mut store = MemoryAccountStore::new();
        let mut sink = RecordingSink::new();
        let chunk = vec![
            FeedRecord::insert("A", "Alice", "111"),
            FeedRecord::insert("B", "Bob", "222"),
            FeedRecord::new("C", None, None, "RENAME"),
        ];

        let err = apply_chunk(&mut store, &mut sink, &chunk).unwrap_err();

        assert!(matches!(err, FeedError::UnknownOperation { .. }));
        assert!(store.is_empty());
        assert!(matches!(
            sink.events(),
            [FeedEvent::Error { record, .. }] if record.account_id() == "C"
        ));
    }

    #[test]
    fn test_groups_apply_before_later_accounts() {
        let mut store = MemoryAccountStore::new();
        let mut sink = RecordingSink::new();
        // B's delete is grouped with B's insert, so it runs before A is inserted.
        let chunk = vec![
            FeedRecord::insert("B", "Bob", "1"),
            FeedRecord::delete("A"),
            FeedRecord::insert("A", "Alice", "2"),
            FeedRecord::delete("B"),
        ];

        apply_chunk(&mut store, &mut sink, &chunk).unwrap();

        assert!(store.get("B").unwrap().is_none());
        assert!(store.get("A").unwrap().is_some());
        assert_eq!(
            sink.events(),
            &[FeedEvent::MissingTarget {
                record: chunk[1].clone(),
                action: "Delete".to_string(),
            }]
        );
    }
}
