//! Per-record operation dispatch.
//!
//! Each handler issues exactly one store primitive and classifies the result.
//! Only two conditions are absorbed here: an insert for an existing account
//! (reported natively or as a duplicate-key failure) and an update or delete
//! that matched no rows. Every other failure is returned as fatal.

use crate::error::{FeedError, Result, StoreError};
use crate::record::{FeedRecord, OperationKind};
use crate::store::{InsertOutcome, StoreScope};

/// Non-fatal result of applying one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// The store changed as requested.
    Applied,

    /// Insert skipped: the account already exists.
    Duplicate,

    /// Update or delete matched no account.
    MissingTarget(OperationKind),
}

/// Applies one record inside `scope`.
///
/// Fails with [`FeedError::UnknownOperation`](crate::error::FeedError::UnknownOperation)
/// for an unrecognised tag, with [`FeedError::EmptyAccountId`] for a record
/// that names no account, and with the store's error for any store failure
/// other than a duplicate insert.
pub fn dispatch<S: StoreScope>(scope: &mut S, record: &FeedRecord) -> Result<Outcome> {
    let operation = record.operation()?;
    let account_id = record.account_id();
    if account_id.is_empty() {
        return Err(FeedError::EmptyAccountId {
            tag: record.tag().to_string(),
        });
    }

    match operation {
        OperationKind::Insert => insert(scope, record),
        OperationKind::UpdatePhone => {
            let rows = scope.update_phone(account_id, record.phone())?;
            Ok(rows_outcome(rows, operation))
        }
        OperationKind::UpdateName => {
            let rows = scope.update_name(account_id, record.name())?;
            Ok(rows_outcome(rows, operation))
        }
        OperationKind::Delete => {
            let rows = scope.delete(account_id)?;
            Ok(rows_outcome(rows, operation))
        }
    }
}

fn insert<S: StoreScope>(scope: &mut S, record: &FeedRecord) -> Result<Outcome> {
    match scope.insert_if_absent(record.account_id(), record.name(), record.phone()) {
        Ok(InsertOutcome::Inserted) => Ok(Outcome::Applied),
        Ok(InsertOutcome::AlreadyExists) => Ok(Outcome::Duplicate),
        Err(StoreError::DuplicateKey { .. }) => Ok(Outcome::Duplicate),
        Err(err) => Err(err.into()),
    }
}

fn rows_outcome(rows: usize, operation: OperationKind) -> Outcome {
    if rows == 0 {
        Outcome::MissingTarget(operation)
    } else {
        Outcome::Applied
    }
}
