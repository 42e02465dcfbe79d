//! The persistence boundary for account rows.
//!
//! The processor never owns persisted rows; it only issues commands through a
//! [`StoreScope`] obtained from an [`AccountStore`]. A scope is one atomic
//! unit of work: its effects become visible only on [`StoreScope::commit`],
//! and are discarded on [`StoreScope::rollback`] or when the scope is dropped
//! without being committed.

use crate::account::Account;
use crate::error::StoreResult;

mod memory;
mod sqlite;

pub use memory::MemoryAccountStore;
pub use sqlite::SqliteAccountStore;

/// Result of an insert-if-absent request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    AlreadyExists,
}

/// How a store handles an insert for an existing account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    /// Skip the row and report [`InsertOutcome::AlreadyExists`].
    #[default]
    Native,

    /// Fail with [`StoreError::DuplicateKey`](crate::error::StoreError::DuplicateKey)
    /// and leave the translation to the caller.
    Strict,
}

/// A store holding the account table.
pub trait AccountStore {
    /// Transactional context for one chunk.
    type Scope<'a>: StoreScope
    where
        Self: 'a;

    /// Opens a new transactional scope.
    fn begin_scope(&mut self) -> StoreResult<Self::Scope<'_>>;

    /// All committed accounts, ordered by account id.
    fn accounts(&self) -> StoreResult<Vec<Account>>;

    /// Looks up one committed account.
    fn get(&self, account_id: &str) -> StoreResult<Option<Account>>;
}

/// Row primitives available inside one transactional scope.
pub trait StoreScope {
    /// Inserts a new row unless `account_id` already exists.
    ///
    /// A missing `name` violates the table's NOT NULL constraint.
    fn insert_if_absent(
        &mut self,
        account_id: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> StoreResult<InsertOutcome>;

    /// Sets `phone`; returns the number of rows affected.
    fn update_phone(&mut self, account_id: &str, phone: Option<&str>) -> StoreResult<usize>;

    /// Sets `name`; returns the number of rows affected.
    fn update_name(&mut self, account_id: &str, name: Option<&str>) -> StoreResult<usize>;

    /// Removes the row; returns the number of rows affected.
    fn delete(&mut self, account_id: &str) -> StoreResult<usize>;

    /// Makes every change in this scope durable.
    fn commit(self) -> StoreResult<()>;

    /// Discards every change in this scope.
    fn rollback(self) -> StoreResult<()>;
}
