//! In-memory account store.
//!
//! Rows live in an ordered map. A scope writes through to the map and keeps
//! a journal of the previous value of every row it touched; rollback (or
//! dropping an uncommitted scope) replays the journal in reverse.

use super::{AccountStore, InsertMode, InsertOutcome, StoreScope};
use crate::account::Account;
use crate::error::{StoreError, StoreResult};
use log::debug;
use std::collections::BTreeMap;

/// Account store backed by a `BTreeMap`.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    rows: BTreeMap<String, Account>,
    insert_mode: InsertMode,
}

impl MemoryAccountStore {
    /// Creates an empty store using [`InsertMode::Native`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given insert mode.
    pub fn with_insert_mode(insert_mode: InsertMode) -> Self {
        MemoryAccountStore {
            rows: BTreeMap::new(),
            insert_mode,
        }
    }

    /// Number of committed rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl AccountStore for MemoryAccountStore {
    type Scope<'a> = MemoryScope<'a>;

    fn begin_scope(&mut self) -> StoreResult<MemoryScope<'_>> {
        Ok(MemoryScope {
            rows: &mut self.rows,
            insert_mode: self.insert_mode,
            journal: Vec::new(),
            finished: false,
        })
    }

    fn accounts(&self) -> StoreResult<Vec<Account>> {
        Ok(self.rows.values().cloned().collect())
    }

    fn get(&self, account_id: &str) -> StoreResult<Option<Account>> {
        Ok(self.rows.get(account_id).cloned())
    }
}

/// Transactional scope over a [`MemoryAccountStore`].
pub struct MemoryScope<'a> {
    rows: &'a mut BTreeMap<String, Account>,
    insert_mode: InsertMode,
    journal: Vec<(String, Option<Account>)>,
    finished: bool,
}

impl MemoryScope<'_> {
    fn remember(&mut self, account_id: &str) {
        let previous = self.rows.get(account_id).cloned();
        self.journal.push((account_id.to_string(), previous));
    }

    fn undo(&mut self) {
        let undone = self.journal.len();
        while let Some((account_id, previous)) = self.journal.pop() {
            match previous {
                Some(account) => {
                    self.rows.insert(account_id, account);
                }
                None => {
                    self.rows.remove(&account_id);
                }
            }
        }
        debug!("Memory scope rolled back {} change(s)", undone);
    }
}

impl StoreScope for MemoryScope<'_> {
    fn insert_if_absent(
        &mut self,
        account_id: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> StoreResult<InsertOutcome> {
        let name = name.ok_or_else(|| StoreError::Constraint {
            account_id: account_id.to_string(),
            message: "name must not be null".to_string(),
        })?;

        if self.rows.contains_key(account_id) {
            return match self.insert_mode {
                InsertMode::Native => Ok(InsertOutcome::AlreadyExists),
                InsertMode::Strict => Err(StoreError::DuplicateKey {
                    account_id: account_id.to_string(),
                }),
            };
        }

        self.remember(account_id);
        self.rows.insert(
            account_id.to_string(),
            Account::new(account_id, name, phone.map(str::to_string)),
        );
        Ok(InsertOutcome::Inserted)
    }

    fn update_phone(&mut self, account_id: &str, phone: Option<&str>) -> StoreResult<usize> {
        if !self.rows.contains_key(account_id) {
            return Ok(0);
        }

        self.remember(account_id);
        if let Some(account) = self.rows.get_mut(account_id) {
            account.phone = phone.map(str::to_string);
        }
        Ok(1)
    }

    fn update_name(&mut self, account_id: &str, name: Option<&str>) -> StoreResult<usize> {
        if !self.rows.contains_key(account_id) {
            return Ok(0);
        }

        let name = name.ok_or_else(|| StoreError::Constraint {
            account_id: account_id.to_string(),
            message: "name must not be null".to_string(),
        })?;

        self.remember(account_id);
        if let Some(account) = self.rows.get_mut(account_id) {
            account.name = name.to_string();
        }
        Ok(1)
    }

    fn delete(&mut self, account_id: &str) -> StoreResult<usize> {
        if !self.rows.contains_key(account_id) {
            return Ok(0);
        }

        self.remember(account_id);
        self.rows.remove(account_id);
        Ok(1)
    }

    fn commit(mut self) -> StoreResult<()> {
        self.journal.clear();
        self.finished = true;
        Ok(())
    }

    fn rollback(mut self) -> StoreResult<()> {
        self.undo();
        self.finished = true;
        Ok(())
    }
}

impl Drop for MemoryScope<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.undo();
        }
    }
}
