//! SQLite-backed account store.
//!
//! # Invariants
//! - Returned stores have the `accounts` schema fully applied.
//! - Schema version is tracked via `PRAGMA user_version`; databases written by
//!   a newer schema are rejected instead of being modified.
//! - An unversioned database is only adopted if it has no `accounts` table or
//!   one with exactly the expected columns.
//! - Every scope is an `IMMEDIATE` transaction; dropping an uncommitted scope
//!   rolls it back.

use super::{AccountStore, InsertMode, InsertOutcome, StoreScope};
use crate::account::Account;
use crate::error::{StoreError, StoreResult};
use log::{debug, error, info};
use rusqlite::{ffi, params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::path::Path;
use std::time::{Duration, Instant};

const SCHEMA_VERSION: u32 = 1;

const ACCOUNT_COLUMNS: [&str; 3] = ["account_id", "name", "phone"];

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS accounts (
    account_id TEXT PRIMARY KEY NOT NULL,
    name TEXT NOT NULL,
    phone TEXT
);";

/// Account store persisted in a SQLite database.
pub struct SqliteAccountStore {
    conn: Connection,
    insert_mode: InsertMode,
}

impl SqliteAccountStore {
    /// Opens (or creates) a database file and applies the schema.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=store status=start mode=file");

        let conn = Connection::open(path).map_err(|err| {
            error!(
                "event=db_open module=store status=error mode=file duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            StoreError::from(err)
        })?;

        Self::bootstrap(conn, "file", started_at)
    }

    /// Opens a private in-memory database and applies the schema.
    pub fn open_in_memory() -> StoreResult<Self> {
        let started_at = Instant::now();
        info!("event=db_open module=store status=start mode=memory");

        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn, "memory", started_at)
    }

    /// Sets how inserts for existing accounts are handled.
    pub fn with_insert_mode(mut self, insert_mode: InsertMode) -> Self {
        self.insert_mode = insert_mode;
        self
    }

    fn bootstrap(mut conn: Connection, mode: &str, started_at: Instant) -> StoreResult<Self> {
        match apply_schema(&mut conn) {
            Ok(()) => {
                info!(
                    "event=db_open module=store status=ok mode={} duration_ms={}",
                    mode,
                    started_at.elapsed().as_millis()
                );
                Ok(SqliteAccountStore {
                    conn,
                    insert_mode: InsertMode::default(),
                })
            }
            Err(err) => {
                error!(
                    "event=db_open module=store status=error mode={} duration_ms={} error={}",
                    mode,
                    started_at.elapsed().as_millis(),
                    err
                );
                Err(err)
            }
        }
    }
}

fn apply_schema(conn: &mut Connection) -> StoreResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;

    let current: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if current > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedSchemaVersion {
            found: current,
            supported: SCHEMA_VERSION,
        });
    }
    if current == SCHEMA_VERSION {
        return Ok(());
    }

    let tx = conn.transaction()?;
    let columns = existing_columns(&tx)?;
    if !columns.is_empty() && columns != ACCOUNT_COLUMNS {
        return Err(StoreError::IncompatibleSchema { columns });
    }
    tx.execute_batch(SCHEMA_SQL)?;
    tx.execute_batch(&format!("PRAGMA user_version = {};", SCHEMA_VERSION))?;
    tx.commit()?;
    Ok(())
}

/// Column names of an `accounts` table already present, in declaration order.
fn existing_columns(conn: &Connection) -> StoreResult<Vec<String>> {
    let mut stmt = conn.prepare("PRAGMA table_info(accounts);")?;
    let names = stmt.query_map([], |row| row.get::<_, String>("name"))?;

    let mut columns = Vec::new();
    for name in names {
        columns.push(name?);
    }
    Ok(columns)
}

fn parse_account_row(row: &Row<'_>) -> rusqlite::Result<Account> {
    Ok(Account {
        account_id: row.get("account_id")?,
        name: row.get("name")?,
        phone: row.get("phone")?,
    })
}

/// Maps driver constraint failures onto store errors.
fn classify(err: rusqlite::Error, account_id: &str) -> StoreError {
    if let rusqlite::Error::SqliteFailure(failure, message) = &err {
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            || failure.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
        {
            return StoreError::DuplicateKey {
                account_id: account_id.to_string(),
            };
        }
        if failure.extended_code == ffi::SQLITE_CONSTRAINT_NOTNULL {
            return StoreError::Constraint {
                account_id: account_id.to_string(),
                message: message.clone().unwrap_or_else(|| failure.to_string()),
            };
        }
    }
    StoreError::Sqlite(err)
}

impl AccountStore for SqliteAccountStore {
    type Scope<'a> = SqliteScope<'a>;

    fn begin_scope(&mut self) -> StoreResult<SqliteScope<'_>> {
        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(SqliteScope {
            tx,
            insert_mode: self.insert_mode,
        })
    }

    fn accounts(&self) -> StoreResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare("SELECT account_id, name, phone FROM accounts ORDER BY account_id;")?;
        let rows = stmt.query_map([], parse_account_row)?;

        let mut accounts = Vec::new();
        for account in rows {
            accounts.push(account?);
        }
        Ok(accounts)
    }

    fn get(&self, account_id: &str) -> StoreResult<Option<Account>> {
        let account = self
            .conn
            .query_row(
                "SELECT account_id, name, phone FROM accounts WHERE account_id = ?1;",
                [account_id],
                parse_account_row,
            )
            .optional()?;
        Ok(account)
    }
}

/// Transactional scope over a [`SqliteAccountStore`].
pub struct SqliteScope<'conn> {
    tx: Transaction<'conn>,
    insert_mode: InsertMode,
}

impl StoreScope for SqliteScope<'_> {
    fn insert_if_absent(
        &mut self,
        account_id: &str,
        name: Option<&str>,
        phone: Option<&str>,
    ) -> StoreResult<InsertOutcome> {
        let sql = match self.insert_mode {
            InsertMode::Native => {
                "INSERT INTO accounts (account_id, name, phone) VALUES (?1, ?2, ?3)
                 ON CONFLICT(account_id) DO NOTHING;"
            }
            InsertMode::Strict => "INSERT INTO accounts (account_id, name, phone) VALUES (?1, ?2, ?3);",
        };

        let inserted = self
            .tx
            .execute(sql, params![account_id, name, phone])
            .map_err(|err| classify(err, account_id))?;

        if inserted == 0 {
            Ok(InsertOutcome::AlreadyExists)
        } else {
            Ok(InsertOutcome::Inserted)
        }
    }

    fn update_phone(&mut self, account_id: &str, phone: Option<&str>) -> StoreResult<usize> {
        self.tx
            .execute(
                "UPDATE accounts SET phone = ?1 WHERE account_id = ?2;",
                params![phone, account_id],
            )
            .map_err(|err| classify(err, account_id))
    }

    fn update_name(&mut self, account_id: &str, name: Option<&str>) -> StoreResult<usize> {
        self.tx
            .execute(
                "UPDATE accounts SET name = ?1 WHERE account_id = ?2;",
                params![name, account_id],
            )
            .map_err(|err| classify(err, account_id))
    }

    fn delete(&mut self, account_id: &str) -> StoreResult<usize> {
        self.tx
            .execute(
                "DELETE FROM accounts WHERE account_id = ?1;",
                [account_id],
            )
            .map_err(|err| classify(err, account_id))
    }

    fn commit(self) -> StoreResult<()> {
        self.tx.commit()?;
        Ok(())
    }

    fn rollback(self) -> StoreResult<()> {
        self.tx.rollback()?;
        debug!("SQLite scope rolled back");
        Ok(())
    }
}
